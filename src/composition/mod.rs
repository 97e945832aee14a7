//! # Composition Engine
//!
//! The composition engine coordinates timing discovery, interval resolution,
//! block planning and conversion to render every output in a manifest.

pub mod engine;

// Re-exports for convenience
pub use engine::CompositionEngine;
