use std::fmt;
use std::path::{Path, PathBuf};

/// Geometric filters a user can request on an output's video legs
#[derive(Debug, Clone, PartialEq)]
pub enum VisualFilter {
    /// Free rotation in degrees
    Rotate { degrees: f64 },

    /// Quarter-turn transpose, ffmpeg `dir` 0..=3
    Transpose { dir: u8 },

    /// Crop to a `width`x`height` rectangle at (`x`, `y`)
    Crop { width: u32, height: u32, x: u32, y: u32 },
}

impl VisualFilter {
    /// Parse a manifest filter spec such as `rotate=90`, `transpose=1`
    /// or `crop=640:480:0:0`. Returns `None` for anything else.
    pub fn parse(spec: &str) -> Option<Self> {
        let (name, value) = spec.trim().split_once('=')?;

        match name.to_ascii_lowercase().as_str() {
            "rotate" => {
                let degrees: f64 = value.parse().ok()?;
                degrees.is_finite().then_some(Self::Rotate { degrees })
            }
            "transpose" => {
                let dir: u8 = value.parse().ok()?;
                (dir <= 3).then_some(Self::Transpose { dir })
            }
            "crop" => {
                let parts: Vec<u32> = value
                    .split(':')
                    .map(|p| p.parse().ok())
                    .collect::<Option<_>>()?;
                match parts.as_slice() {
                    [width, height, x, y] => Some(Self::Crop {
                        width: *width,
                        height: *height,
                        x: *x,
                        y: *y,
                    }),
                    _ => None,
                }
            }
            _ => None,
        }
    }
}

/// Short alphabetic registry key (`AA`, `AB`, ...)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourceKey(pub String);

impl SourceKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A physical input file known to the controller
#[derive(Debug, Clone, PartialEq)]
pub struct InputSource {
    pub file_path: PathBuf,
    pub key: SourceKey,
}

/// One segment of an input, placed in an output's playback order
#[derive(Debug, Clone, PartialEq)]
pub struct MediaBlock {
    pub input_key: SourceKey,
    pub start_point: f64,
    pub end_point: f64,
    pub speed: f64,
    pub filter_list: Vec<VisualFilter>,
}

impl MediaBlock {
    pub fn duration(&self) -> f64 {
        self.end_point - self.start_point
    }

    /// Output length after the speed change
    pub fn playback_duration(&self) -> f64 {
        self.duration() / self.speed
    }
}

/// A render target and the blocks that make it up, in playback order
#[derive(Debug, Clone, PartialEq)]
pub struct OutputSource {
    pub file_path: PathBuf,
    pub key: SourceKey,
    pub media_block_list: Vec<MediaBlock>,
}

impl OutputSource {
    pub fn new<P: Into<PathBuf>>(file_path: P, key: SourceKey) -> Self {
        Self {
            file_path: file_path.into(),
            key,
            media_block_list: Vec::new(),
        }
    }

    /// Whether the output was already rendered by an earlier run
    pub fn is_exists(&self) -> bool {
        self.file_path.exists()
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    pub fn playback_duration(&self) -> f64 {
        self.media_block_list.iter().map(MediaBlock::playback_duration).sum()
    }
}
