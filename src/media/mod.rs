//! # Media Blocks
//!
//! Input and output registries and the media blocks that join them.

pub mod controller;
pub mod keys;
pub mod types;

pub use controller::{ConversionReport, MediaController};
pub use keys::{KeyCounter, KeyedRegistry};
pub use types::{InputSource, MediaBlock, OutputSource, SourceKey, VisualFilter};
