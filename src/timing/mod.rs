//! # Timing Module
//!
//! Turns tick-coded timing files into per-run interval lists.
//!
//! ## Tick Codes
//!
//! - `<team><counter>cp<n><a|b>` opens (`a`) or closes (`b`) checkpoint `n` of a run
//! - `<team><counter>int<a|b>` opens or closes the run's intro segment
//! - `x<n>` changes playback speed from that time onward
//!
//! Speed changes are applied in the order they appear in the timing files,
//! not sorted by time. Files that declare them out of chronological order
//! get fragments that follow the declaration order.

pub mod interval;
pub mod manifest;
pub mod parser;
pub mod resolver;

pub use interval::{Endpoint, Interval, SpeedChange};
pub use manifest::{parse_manifest, read_manifest, OutputSpec};
pub use parser::{OneLevel, RunCode, Slot, TeamInfo, TimeContainer};
pub use resolver::resolve;
