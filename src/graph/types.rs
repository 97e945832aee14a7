use std::fmt;
use std::path::PathBuf;

/// Stream kind of a leaf reference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Video,
    Audio,
}

impl StreamKind {
    /// Stream specifier tag used in `[<index>:<tag>]`
    pub fn tag(&self) -> char {
        match self {
            Self::Video => 'v',
            Self::Audio => 'a',
        }
    }

    /// Prefix the audio variant of a filter name with `a`
    pub fn filter_name(&self, name: &str) -> String {
        match self {
            Self::Video => name.to_string(),
            Self::Audio => format!("a{}", name),
        }
    }
}

/// A physical input as seen by the external tool: its `-i` position and path
#[derive(Debug, Clone, PartialEq)]
pub struct InputMedia {
    pub index: usize,
    pub file_path: PathBuf,
}

/// Leaf reference to one stream of one input
#[derive(Debug, Clone, PartialEq)]
pub struct SourceOf {
    pub source: InputMedia,
    pub kind: StreamKind,
}

/// A single filter: `name=args` or `name=k=v:k=v`
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub name: String,
    pub args: Option<String>,
    pub kwargs: Vec<(String, String)>,
}

impl Filter {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            args: None,
            kwargs: Vec::new(),
        }
    }

    pub fn with_args<S: Into<String>, A: Into<String>>(name: S, args: A) -> Self {
        Self {
            args: Some(args.into()),
            ..Self::new(name)
        }
    }

    /// Append a keyword argument; emission keeps insertion order
    pub fn kwarg<K: Into<String>, V: ToString>(mut self, key: K, value: V) -> Self {
        self.kwargs.push((key.into(), value.to_string()));
        self
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}=", self.name)?;
        if let Some(args) = &self.args {
            f.write_str(args)?;
        }
        for (i, (key, value)) in self.kwargs.iter().enumerate() {
            if i > 0 {
                f.write_str(":")?;
            }
            write!(f, "{}={}", key, value)?;
        }
        Ok(())
    }
}

/// Index of a node inside a `FilterGraph` arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub usize);

/// Internal node: children feed a filter chain that produces `outputs` streams
#[derive(Debug, Clone, PartialEq)]
pub struct MediaNode {
    pub children: Vec<NodeId>,
    pub filters: Vec<Filter>,
    pub outputs: usize,
    pub output_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Media(MediaNode),
    Source(SourceOf),
}

/// Arena-backed filter graph tree for one output
///
/// Children are always pushed before their parent, so the tree cannot
/// contain cycles.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterGraph {
    nodes: Vec<Node>,
    root: Option<NodeId>,
}

impl FilterGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    pub fn set_root(&mut self, id: NodeId) {
        self.root = Some(id);
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Every leaf reference, in arena order
    pub fn sources(&self) -> impl Iterator<Item = &SourceOf> {
        self.nodes.iter().filter_map(|node| match node {
            Node::Source(source) => Some(source),
            Node::Media(_) => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_display() {
        assert_eq!(Filter::with_args("setpts", "PTS-STARTPTS").to_string(), "setpts=PTS-STARTPTS");
        assert_eq!(
            Filter::new("trim").kwarg("start", 0).kwarg("end", 10.5).to_string(),
            "trim=start=0:end=10.5"
        );
    }

    #[test]
    fn test_audio_filter_names() {
        assert_eq!(StreamKind::Video.filter_name("trim"), "trim");
        assert_eq!(StreamKind::Audio.filter_name("trim"), "atrim");
        assert_eq!(StreamKind::Audio.tag(), 'a');
    }
}
