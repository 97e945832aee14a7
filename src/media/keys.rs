use std::collections::HashMap;

use super::types::SourceKey;

/// Sequential short alphabetic keys: `AA`, `AB`, ... `AZ`, `BA`, ... `ZZ`, `AAA`
#[derive(Debug, Clone)]
pub struct KeyCounter {
    symbols: Vec<u8>,
}

impl KeyCounter {
    pub fn new() -> Self {
        Self {
            symbols: vec![b'A', b'A'],
        }
    }

    /// The key that the next call to `next_key` will hand out
    pub fn current(&self) -> SourceKey {
        SourceKey(self.symbols.iter().map(|&b| b as char).collect())
    }

    /// Hand out the current key and advance
    pub fn next_key(&mut self) -> SourceKey {
        let key = self.current();
        self.advance();
        key
    }

    fn advance(&mut self) {
        for symbol in self.symbols.iter_mut().rev() {
            if *symbol == b'Z' {
                *symbol = b'A';
            } else {
                *symbol += 1;
                return;
            }
        }
        // every position wrapped
        self.symbols.insert(0, b'A');
    }
}

impl Default for KeyCounter {
    fn default() -> Self {
        Self::new()
    }
}

/// Values stored under counter-assigned keys, kept in insertion order
#[derive(Debug, Clone)]
pub struct KeyedRegistry<T> {
    counter: KeyCounter,
    entries: Vec<T>,
    index: HashMap<SourceKey, usize>,
}

impl<T> KeyedRegistry<T> {
    pub fn new() -> Self {
        Self {
            counter: KeyCounter::new(),
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Store the value built for a fresh key and return that key
    pub fn insert_with<F>(&mut self, build: F) -> SourceKey
    where
        F: FnOnce(SourceKey) -> T,
    {
        let key = self.counter.next_key();
        self.index.insert(key.clone(), self.entries.len());
        self.entries.push(build(key.clone()));
        key
    }

    pub fn get(&self, key: &SourceKey) -> Option<&T> {
        self.index.get(key).map(|&i| &self.entries[i])
    }

    pub fn get_mut(&mut self, key: &SourceKey) -> Option<&mut T> {
        self.index.get(key).map(|&i| &mut self.entries[i])
    }

    pub fn contains(&self, key: &SourceKey) -> bool {
        self.index.contains_key(key)
    }

    /// Values in registration order
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T> Default for KeyedRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_sequence() {
        let mut counter = KeyCounter::new();
        let keys: Vec<String> = (0..28).map(|_| counter.next_key().0).collect();

        assert_eq!(keys[0], "AA");
        assert_eq!(keys[1], "AB");
        assert_eq!(keys[25], "AZ");
        assert_eq!(keys[26], "BA");
        assert_eq!(keys[27], "BB");
    }

    #[test]
    fn test_key_width_grows_after_zz() {
        let mut counter = KeyCounter::new();
        for _ in 0..(26 * 26 - 1) {
            counter.next_key();
        }
        assert_eq!(counter.next_key().0, "ZZ");
        assert_eq!(counter.next_key().0, "AAA");
        assert_eq!(counter.next_key().0, "AAB");
    }

    #[test]
    fn test_registry_lookup_and_order() {
        let mut registry = KeyedRegistry::new();
        let first = registry.insert_with(|key| format!("first:{}", key));
        let second = registry.insert_with(|key| format!("second:{}", key));

        assert_eq!(registry.get(&first).map(String::as_str), Some("first:AA"));
        assert_eq!(registry.get(&second).map(String::as_str), Some("second:AB"));
        assert!(!registry.contains(&SourceKey("ZZ".to_string())));

        let values: Vec<&String> = registry.iter().collect();
        assert_eq!(values, vec!["first:AA", "second:AB"]);
    }
}
