//! # Filter Graph
//!
//! Two independent passes over an output:
//!
//! 1. [`FilterBuilder`] lowers media blocks into a [`FilterGraph`] tree
//! 2. [`CommandBuilder`] serializes that tree into `-filter_complex` text
//!    and an ffmpeg argument list

pub mod command_builder;
pub mod filter_builder;
pub mod types;

pub use command_builder::{CommandBuilder, FfmpegCommand};
pub use filter_builder::FilterBuilder;
pub use types::{Filter, FilterGraph, InputMedia, MediaNode, Node, NodeId, SourceOf, StreamKind};
