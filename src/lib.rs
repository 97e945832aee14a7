//! # Tick-Compositor
//!
//! Compile tick-coded run timings into ffmpeg trim/speed/concat filter graphs.
//!
//! Timing files mark where each run's checkpoints open and close in a
//! recording, plus point-in-time speed changes. This library resolves those
//! ticks into intervals, lowers them into a filter graph per output and
//! serializes that graph into an ffmpeg command line.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::path::Path;
//! use tick_compositor::{
//!     composition::CompositionEngine,
//!     config::Config,
//!     runner::FfmpegRunner,
//! };
//!
//! # fn main() -> anyhow::Result<()> {
//! let engine = CompositionEngine::new(Config::default());
//! let mut runner = FfmpegRunner::new();
//! engine.compose(Path::new("runs/"), Path::new("renders/"), &mut runner)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! The library is organized into several key modules:
//!
//! - [`timing`] - Tick-code parsing, intervals and speed-change resolution
//! - [`media`] - Input/output registries and media blocks
//! - [`graph`] - Filter graph lowering and command serialization
//! - [`runner`] - Execution of the compiled commands
//! - [`composition`] - Main pipeline over a folder of timing files
//! - [`config`] - Configuration management
//!
//! ## Building Graphs By Hand
//!
//! ```rust
//! use tick_compositor::{config::Config, media::MediaController};
//!
//! # fn main() -> tick_compositor::Result<()> {
//! let mut controller = MediaController::new();
//! let clip = controller.add_input_source("clip.mp4");
//! let out = controller.add_output_source("out.mp4");
//! controller.add_output_block(&clip, &out, 0.0, 10.0, 1.0)?;
//! controller.add_output_block(&clip, &out, 15.0, 20.0, 2.0)?;
//!
//! let command = controller.compile(&out, &Config::default())?;
//! assert!(command.filter_complex.ends_with("concat=n=2:v=1:a=1[z5][z6]"));
//! # Ok(())
//! # }
//! ```

pub mod composition;
pub mod config;
pub mod error;
pub mod graph;
pub mod media;
pub mod runner;
pub mod timing;

// Re-export commonly used types for convenience
pub use crate::{
    composition::CompositionEngine,
    config::Config,
    error::{CompositorError, Result},
    media::MediaController,
    runner::{CommandRunner, DryRunRunner, FfmpegRunner},
};
