//! Tick-code parsing into per-team, per-run interval tables.
//!
//! Each timed line carries one or more `|`-separated tokens: run boundaries
//! such as `ab1cp0a` and speed changes such as `x2`.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use regex::Regex;
use tracing::{debug, info, warn};

use crate::error::{Result, TimingError};
use super::interval::{Endpoint, Interval, SpeedChange};
use super::resolver;

/// Identity of one run: a lower-cased team name and its counter (`ab12`)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RunCode {
    pub team: String,
    pub counter: u32,
}

impl RunCode {
    pub fn new<S: AsRef<str>>(team: S, counter: u32) -> Self {
        Self {
            team: team.as_ref().to_ascii_lowercase(),
            counter,
        }
    }
}

impl fmt::Display for RunCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.team, self.counter)
    }
}

impl FromStr for RunCode {
    type Err = TimingError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        let split = s
            .find(|c: char| c.is_ascii_digit())
            .ok_or_else(|| TimingError::InvalidRunCode { code: s.to_string() })?;
        let (team, digits) = s.split_at(split);

        if team.is_empty() || !team.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(TimingError::InvalidRunCode { code: s.to_string() });
        }
        let counter = digits
            .parse()
            .map_err(|_| TimingError::InvalidRunCode { code: s.to_string() })?;

        Ok(Self::new(team, counter))
    }
}

/// Position of an interval inside a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// The segment before the first checkpoint (`int` ticks)
    Intro,
    /// Checkpoint index (`cp<n>` ticks)
    Checkpoint(usize),
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Intro => write!(f, "int"),
            Self::Checkpoint(index) => write!(f, "cp{}", index),
        }
    }
}

/// All intervals recorded for one run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OneLevel {
    pub intro: Option<Interval>,
    pub checkpoints: Vec<Interval>,
}

impl OneLevel {
    /// Record one tick, growing the checkpoint list as needed
    pub fn set_time(&mut self, slot: Slot, endpoint: Endpoint, time: f64, source: &Path) {
        let interval = match slot {
            Slot::Intro => self.intro.get_or_insert_with(Interval::default),
            Slot::Checkpoint(index) => {
                if self.checkpoints.len() <= index {
                    self.checkpoints.resize_with(index + 1, Interval::default);
                }
                &mut self.checkpoints[index]
            }
        };
        interval.set_time(endpoint, time, source);
    }

    /// Intervals in playback order, intro first
    pub fn intervals(&self) -> Vec<Interval> {
        self.intro
            .iter()
            .chain(self.checkpoints.iter())
            .cloned()
            .collect()
    }

    /// Intervals in playback order, paired with their slot
    pub fn slots(&self) -> impl Iterator<Item = (Slot, &Interval)> {
        self.intro
            .iter()
            .map(|interval| (Slot::Intro, interval))
            .chain(
                self.checkpoints
                    .iter()
                    .enumerate()
                    .map(|(index, interval)| (Slot::Checkpoint(index), interval)),
            )
    }

    /// Fragment the run's intervals at every speed change
    pub fn resolve(&self, changes: &[SpeedChange]) -> Vec<Interval> {
        resolver::resolve(self.intervals(), changes)
    }

    /// Fail on the first interval that is missing a boundary
    pub fn check_complete(&self, code: &RunCode) -> Result<()> {
        for (slot, interval) in self.slots() {
            if let Some(missing) = interval.missing_endpoint() {
                return Err(TimingError::IncompleteInterval {
                    code: code.to_string(),
                    slot: slot.to_string(),
                    missing: missing.as_str(),
                }
                .into());
            }
        }
        Ok(())
    }
}

/// Runs of one team, keyed by counter
pub type TeamInfo = BTreeMap<u32, OneLevel>;

/// Collects tick codes from timing files into per-run intervals
///
/// Parsing only ever adds to or overwrites boundaries; no line depends on
/// another line beyond sharing a run identity.
pub struct TimeContainer {
    line_pattern: Regex,
    interval_pattern: Regex,
    speed_pattern: Regex,
    teams: BTreeMap<String, TeamInfo>,
    speed_changes: Vec<SpeedChange>,
}

impl TimeContainer {
    pub fn new() -> Self {
        Self {
            line_pattern: Regex::new(r"^\s*([0-9.]+)\s*=\s*(.+?)\s*$").expect("valid line pattern"),
            interval_pattern: Regex::new(r"(?i)^([a-z]+)(\d+)(?:cp(\d)|int)([ab])$")
                .expect("valid interval pattern"),
            speed_pattern: Regex::new(r"(?i)^x(\d)$").expect("valid speed pattern"),
            teams: BTreeMap::new(),
            speed_changes: Vec::new(),
        }
    }

    /// Parse a whole timing file recorded against `source`
    pub fn parse_file<P: AsRef<Path>, S: AsRef<Path>>(&mut self, path: P, source: S) -> Result<usize> {
        let path = path.as_ref();
        debug!("Reading timing file {:?}", path);
        let content = std::fs::read_to_string(path)?;
        Ok(self.parse_str(&content, source.as_ref()))
    }

    /// Parse timing text, returning the number of lines that carried a time
    pub fn parse_str(&mut self, content: &str, source: &Path) -> usize {
        content
            .lines()
            .filter(|line| self.parse_line(line, source))
            .count()
    }

    /// Parse one `<prefix>=<rest>` line
    ///
    /// Two layouts are accepted. `<index>=<time> <tokens>` when the first
    /// field after `=` is a number, otherwise `<time>=<tokens>`.
    pub fn parse_line(&mut self, line: &str, source: &Path) -> bool {
        let Some(caps) = self.line_pattern.captures(line) else {
            return false;
        };
        let prefix = caps.get(1).map_or("", |m| m.as_str());
        let rest = caps.get(2).map_or("", |m| m.as_str());

        let mut fields = rest.split_whitespace();
        let first = fields.next().unwrap_or("");
        let (time_text, tokens): (&str, Vec<&str>) = match first.parse::<f64>() {
            Ok(_) if rest.split_whitespace().count() > 1 => (first, fields.collect()),
            _ => (prefix, rest.split_whitespace().collect()),
        };

        let time = match time_text.parse::<f64>() {
            Ok(time) if time.is_finite() => time,
            _ => {
                warn!("Skipping line with invalid time {:?}: {}", time_text, line);
                return false;
            }
        };

        for token in tokens.iter().flat_map(|t| t.split('|')).filter(|t| !t.is_empty()) {
            self.apply_token(token, time, source);
        }
        true
    }

    fn apply_token(&mut self, token: &str, time: f64, source: &Path) {
        if let Some(caps) = self.interval_pattern.captures(token) {
            let team = caps[1].to_ascii_lowercase();
            let Ok(counter) = caps[2].parse::<u32>() else {
                warn!("Run counter out of range in tick {:?}", token);
                return;
            };
            let slot = match caps.get(3) {
                Some(cp) => Slot::Checkpoint(cp.as_str().parse().unwrap_or_default()),
                None => Slot::Intro,
            };
            let Some(endpoint) = caps[4].chars().next().and_then(Endpoint::from_flag) else {
                return;
            };

            self.teams
                .entry(team)
                .or_default()
                .entry(counter)
                .or_default()
                .set_time(slot, endpoint, time, source);
        } else if let Some(caps) = self.speed_pattern.captures(token) {
            let speed: f64 = caps[1].parse().unwrap_or_default();
            if speed <= 0.0 {
                warn!("Ignoring non-positive speed tick {:?} at {}", token, time);
                return;
            }
            self.speed_changes.push(SpeedChange::new(time, speed, source));
        } else {
            debug!("Ignoring unrecognized tick {:?} at {}", token, time);
        }
    }

    /// Every global speed change, in declaration order
    pub fn speed_changes(&self) -> &[SpeedChange] {
        &self.speed_changes
    }

    pub fn teams(&self) -> &BTreeMap<String, TeamInfo> {
        &self.teams
    }

    /// All runs in (team, counter) order
    pub fn runs(&self) -> impl Iterator<Item = (RunCode, &OneLevel)> {
        self.teams.iter().flat_map(|(team, info)| {
            info.iter()
                .map(move |(counter, level)| (RunCode::new(team, *counter), level))
        })
    }

    pub fn run(&self, code: &RunCode) -> Option<&OneLevel> {
        self.teams.get(&code.team)?.get(&code.counter)
    }

    /// Resolve one run's intervals against the global speed changes
    pub fn resolve_run(&self, code: &RunCode) -> Result<Vec<Interval>> {
        let level = self
            .run(code)
            .ok_or_else(|| TimingError::UnknownRun { code: code.to_string() })?;
        Ok(level.resolve(&self.speed_changes))
    }

    /// Resolve every run against the global speed changes
    pub fn resolve_all(&self) -> BTreeMap<RunCode, Vec<Interval>> {
        self.runs()
            .map(|(code, level)| {
                let intervals = level.resolve(&self.speed_changes);
                (code, intervals)
            })
            .collect()
    }

    /// Log every run with its checkpoint count and intervals
    pub fn summary(&self) {
        for (team, info) in &self.teams {
            info!("{}", team);
            for (counter, level) in info {
                let intervals: Vec<String> = level.intervals().iter().map(|i| i.to_string()).collect();
                info!(
                    "    {}{} : {} [{}]",
                    team,
                    counter,
                    level.checkpoints.len(),
                    intervals.join(", ")
                );
            }
        }
        if !self.speed_changes.is_empty() {
            info!("speed changes: {}", self.speed_changes.len());
        }
    }
}

impl Default for TimeContainer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn clip() -> PathBuf {
        PathBuf::from("clip.mp4")
    }

    #[test]
    fn test_run_code_parse() {
        let code: RunCode = "AB12".parse().unwrap();
        assert_eq!(code, RunCode::new("ab", 12));
        assert_eq!(code.to_string(), "ab12");

        assert!("12".parse::<RunCode>().is_err());
        assert!("ab".parse::<RunCode>().is_err());
        assert!("a-b1".parse::<RunCode>().is_err());
    }

    #[test]
    fn test_indexed_line_layout() {
        let mut container = TimeContainer::new();
        assert!(container.parse_line("17=12.5 ab1cp0a", &clip()));
        assert!(container.parse_line("18=20 ab1cp0b", &clip()));

        let level = container.run(&RunCode::new("ab", 1)).unwrap();
        assert_eq!(level.checkpoints[0].bounds(), Some((12.5, 20.0)));
        assert_eq!(level.checkpoints[0].source, Some(clip()));
    }

    #[test]
    fn test_time_prefix_layout_with_pipes() {
        let mut container = TimeContainer::new();
        container.parse_line("3.25=ab2cp0b|ab2cp1a|x2", &clip());

        let level = container.run(&RunCode::new("ab", 2)).unwrap();
        assert_eq!(level.checkpoints[0].end, Some(3.25));
        assert_eq!(level.checkpoints[1].start, Some(3.25));
        assert_eq!(container.speed_changes(), &[SpeedChange::new(3.25, 2.0, clip())]);
    }

    #[test]
    fn test_team_names_are_case_normalized() {
        let mut container = TimeContainer::new();
        container.parse_line("1=0 AB1cp0a", &clip());
        container.parse_line("2=5 ab1CP0B", &clip());

        assert_eq!(container.teams().len(), 1);
        let level = container.run(&"ab1".parse().unwrap()).unwrap();
        assert_eq!(level.checkpoints[0].bounds(), Some((0.0, 5.0)));
    }

    #[test]
    fn test_intro_slot_comes_first() {
        let mut container = TimeContainer::new();
        let text = "\
1=10 ab1cp0a
2=0 ab1inta
3=10 ab1intb
4=20 ab1cp0b
";
        assert_eq!(container.parse_str(text, &clip()), 4);

        let level = container.run(&RunCode::new("ab", 1)).unwrap();
        let bounds: Vec<_> = level.intervals().iter().map(|i| i.bounds().unwrap()).collect();
        assert_eq!(bounds, vec![(0.0, 10.0), (10.0, 20.0)]);
    }

    #[test]
    fn test_unrecognized_tokens_are_ignored() {
        let mut container = TimeContainer::new();
        assert!(container.parse_line("1=4 hello|ab1cp0a|x", &clip()));
        assert!(!container.parse_line("# comment", &clip()));
        assert!(!container.parse_line("1.2.3=ab1cp0b", &clip()));

        assert_eq!(container.teams().len(), 1);
        assert!(container.speed_changes().is_empty());
    }

    #[test]
    fn test_zero_speed_is_ignored() {
        let mut container = TimeContainer::new();
        container.parse_line("1=4 x0", &clip());
        assert!(container.speed_changes().is_empty());
    }

    #[test]
    fn test_resolve_all_end_to_end() {
        let mut container = TimeContainer::new();
        let text = "\
1=0 ab1cp0a
2=10 ab1cp0b|ab1cp1a
3=15 x2
4=20 ab1cp1b
";
        container.parse_str(text, &clip());

        let resolved = container.resolve_all();
        let run = &resolved[&RunCode::new("ab", 1)];
        let tagged: Vec<(f64, f64, f64)> = run
            .iter()
            .map(|i| (i.start.unwrap(), i.end.unwrap(), i.speed))
            .collect();
        assert_eq!(tagged, vec![(0.0, 10.0, 1.0), (10.0, 15.0, 1.0), (15.0, 20.0, 2.0)]);
    }

    #[test]
    fn test_check_complete_reports_missing_boundary() {
        let mut container = TimeContainer::new();
        container.parse_line("1=0 ab1cp0a", &clip());

        let code = RunCode::new("ab", 1);
        let err = container.run(&code).unwrap().check_complete(&code).unwrap_err();
        assert!(err.to_string().contains("cp0"));
        assert!(err.to_string().contains("end"));
    }

    #[test]
    fn test_parse_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.gbm");
        std::fs::write(&path, "1=0 ab1cp0a\n2=4 ab1cp0b\n").unwrap();

        let mut container = TimeContainer::new();
        let lines = container.parse_file(&path, clip()).unwrap();
        assert_eq!(lines, 2);
        assert!(container.resolve_run(&RunCode::new("ab", 1)).is_ok());
        assert!(container.resolve_run(&RunCode::new("cd", 1)).is_err());
    }
}
