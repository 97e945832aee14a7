//! Source spans and the speed changes that cut them.

use std::path::{Path, PathBuf};

/// Which boundary of an interval a tick sets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// Opening tick (`a` flag)
    Start,
    /// Closing tick (`b` flag)
    End,
}

impl Endpoint {
    /// Map the tick flag character to an endpoint
    pub fn from_flag(flag: char) -> Option<Self> {
        match flag.to_ascii_lowercase() {
            'a' => Some(Self::Start),
            'b' => Some(Self::End),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::End => "end",
        }
    }
}

/// A point-in-time speed change on one source recording
#[derive(Debug, Clone, PartialEq)]
pub struct SpeedChange {
    /// Time point in seconds from the start of the source
    pub time: f64,

    /// Playback speed from this point onward
    pub speed: f64,

    /// Recording the change applies to
    pub source: PathBuf,
}

impl SpeedChange {
    pub fn new<P: Into<PathBuf>>(time: f64, speed: f64, source: P) -> Self {
        Self {
            time,
            speed,
            source: source.into(),
        }
    }
}

/// A span of one source recording that has not yet become a media block
///
/// Both boundaries start unset and are filled in by tick codes as the timing
/// file is read. An interval is only usable once both are known.
#[derive(Debug, Clone, PartialEq)]
pub struct Interval {
    pub start: Option<f64>,
    pub end: Option<f64>,
    pub source: Option<PathBuf>,
    pub speed: f64,
}

impl Default for Interval {
    fn default() -> Self {
        Self {
            start: None,
            end: None,
            source: None,
            speed: 1.0,
        }
    }
}

impl Interval {
    /// Create a complete interval at normal speed
    pub fn new<P: Into<PathBuf>>(start: f64, end: f64, source: P) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
            source: Some(source.into()),
            speed: 1.0,
        }
    }

    /// Builder-style speed override
    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = speed;
        self
    }

    /// Set the open or close boundary and record the source it belongs to
    pub fn set_time(&mut self, endpoint: Endpoint, time: f64, source: &Path) {
        match endpoint {
            Endpoint::Start => self.start = Some(time),
            Endpoint::End => self.end = Some(time),
        }
        self.source = Some(source.to_path_buf());
    }

    /// Both boundaries, if both have been set
    pub fn bounds(&self) -> Option<(f64, f64)> {
        Some((self.start?, self.end?))
    }

    pub fn is_complete(&self) -> bool {
        self.bounds().is_some()
    }

    /// Length in source time, zero while incomplete
    pub fn duration(&self) -> f64 {
        self.bounds().map(|(start, end)| end - start).unwrap_or(0.0)
    }

    /// The first boundary that is still unset
    pub fn missing_endpoint(&self) -> Option<Endpoint> {
        if self.start.is_none() {
            Some(Endpoint::Start)
        } else if self.end.is_none() {
            Some(Endpoint::End)
        } else {
            None
        }
    }

    /// True iff the change is on this source and `start <= time < end`
    ///
    /// A change exactly at `end` belongs to whatever follows this interval.
    pub fn contains(&self, change: &SpeedChange) -> bool {
        if self.source.as_deref() != Some(change.source.as_path()) {
            return false;
        }

        match self.bounds() {
            Some((start, end)) => start <= change.time && change.time < end,
            None => false,
        }
    }

    /// Split at the change point
    ///
    /// A change at `start` only retags the speed. Otherwise the part before
    /// the change keeps the old speed and the rest takes the new one.
    pub fn split(&self, change: &SpeedChange) -> Vec<Interval> {
        if self.start == Some(change.time) {
            return vec![self.clone().with_speed(change.speed)];
        }

        let head = Interval {
            end: Some(change.time),
            ..self.clone()
        };
        let tail = Interval {
            start: Some(change.time),
            speed: change.speed,
            ..self.clone()
        };
        vec![head, tail]
    }
}

impl std::fmt::Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let show = |v: Option<f64>| v.map(|t| t.to_string()).unwrap_or_else(|| "?".to_string());
        write!(f, "{}-{}", show(self.start), show(self.end))?;
        if self.speed != 1.0 {
            write!(f, "@{}", self.speed)?;
        }
        Ok(())
    }
}
