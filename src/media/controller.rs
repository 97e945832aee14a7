use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{GraphError, Result};
use crate::graph::{CommandBuilder, FfmpegCommand, FilterBuilder};
use crate::runner::CommandRunner;
use crate::timing::Interval;
use super::keys::KeyedRegistry;
use super::types::{InputSource, MediaBlock, OutputSource, SourceKey, VisualFilter};

/// Outcome of one `convert` pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConversionReport {
    /// Outputs handed to the runner, in registration order
    pub converted: Vec<PathBuf>,

    /// Outputs skipped because they already exist or have no blocks
    pub skipped: Vec<PathBuf>,
}

/// Registry of inputs and outputs, and the media blocks that join them
pub struct MediaController {
    input_source: KeyedRegistry<InputSource>,
    output_source: KeyedRegistry<OutputSource>,
    input_paths: HashMap<PathBuf, SourceKey>,
}

impl MediaController {
    pub fn new() -> Self {
        Self {
            input_source: KeyedRegistry::new(),
            output_source: KeyedRegistry::new(),
            input_paths: HashMap::new(),
        }
    }

    /// Register an input file; repeated paths return the existing key
    pub fn add_input_source<P: AsRef<Path>>(&mut self, file_path: P) -> SourceKey {
        let file_path = file_path.as_ref();
        if let Some(key) = self.input_paths.get(file_path) {
            return key.clone();
        }

        let key = self.input_source.insert_with(|key| InputSource {
            file_path: file_path.to_path_buf(),
            key,
        });
        debug!("Input {} -> {:?}", key, file_path);
        self.input_paths.insert(file_path.to_path_buf(), key.clone());
        key
    }

    /// Register an output target; every call allocates a fresh key
    pub fn add_output_source<P: Into<PathBuf>>(&mut self, file_path: P) -> SourceKey {
        let file_path = file_path.into();
        debug!("Output {:?}", file_path);
        self.output_source
            .insert_with(|key| OutputSource::new(file_path, key))
    }

    /// Append a block with no visual filters
    pub fn add_output_block(
        &mut self,
        input_key: &SourceKey,
        output_key: &SourceKey,
        start: f64,
        end: f64,
        speed: f64,
    ) -> Result<()> {
        self.add_output_block_with_filters(input_key, output_key, start, end, speed, Vec::new())
    }

    /// Append a block to the output's playback order
    pub fn add_output_block_with_filters(
        &mut self,
        input_key: &SourceKey,
        output_key: &SourceKey,
        start: f64,
        end: f64,
        speed: f64,
        filter_list: Vec<VisualFilter>,
    ) -> Result<()> {
        if !self.input_source.contains(input_key) {
            return Err(GraphError::UnknownInput { key: input_key.to_string() }.into());
        }
        validate_block(start, end, speed)?;

        let output = self
            .output_source
            .get_mut(output_key)
            .ok_or_else(|| GraphError::UnknownOutput { key: output_key.to_string() })?;

        output.media_block_list.push(MediaBlock {
            input_key: input_key.clone(),
            start_point: start,
            end_point: end,
            speed,
            filter_list,
        });
        Ok(())
    }

    /// Register each interval's source and append it as a block
    ///
    /// Every interval is checked before anything is registered, so a failed
    /// call leaves the output's block list untouched. Returns the number of
    /// blocks appended.
    pub fn add_intervals(
        &mut self,
        output_key: &SourceKey,
        intervals: &[Interval],
        filter_list: &[VisualFilter],
    ) -> Result<usize> {
        if !self.output_source.contains(output_key) {
            return Err(GraphError::UnknownOutput { key: output_key.to_string() }.into());
        }

        let mut checked = Vec::with_capacity(intervals.len());
        for interval in intervals {
            let (Some((start, end)), Some(source)) = (interval.bounds(), interval.source.as_ref()) else {
                return Err(GraphError::InvalidBlock {
                    details: format!("interval {} has no complete range", interval),
                }
                .into());
            };
            validate_block(start, end, interval.speed)?;
            checked.push((source, start, end, interval.speed));
        }

        for (source, start, end, speed) in checked {
            let input_key = self.add_input_source(source);
            self.add_output_block_with_filters(
                &input_key,
                output_key,
                start,
                end,
                speed,
                filter_list.to_vec(),
            )?;
        }
        Ok(intervals.len())
    }

    pub fn input(&self, key: &SourceKey) -> Option<&InputSource> {
        self.input_source.get(key)
    }

    pub fn output(&self, key: &SourceKey) -> Option<&OutputSource> {
        self.output_source.get(key)
    }

    /// Outputs in registration order
    pub fn outputs(&self) -> impl Iterator<Item = &OutputSource> {
        self.output_source.iter()
    }

    pub fn input_count(&self) -> usize {
        self.input_source.len()
    }

    /// Run both graph passes for one output
    pub fn compile(&self, output_key: &SourceKey, config: &Config) -> Result<FfmpegCommand> {
        let output = self
            .output(output_key)
            .ok_or_else(|| GraphError::UnknownOutput { key: output_key.to_string() })?;
        self.compile_output(output, config)
    }

    fn compile_output(&self, output: &OutputSource, config: &Config) -> Result<FfmpegCommand> {
        let graph = FilterBuilder::new(&self.input_source, &config.graph).build(output)?;
        CommandBuilder::new(&graph).build(&config.ffmpeg)
    }

    /// Compile and run every output that still needs rendering
    ///
    /// Outputs are handled one at a time; the first runner failure stops the pass.
    pub fn convert<R: CommandRunner + ?Sized>(
        &self,
        runner: &mut R,
        config: &Config,
    ) -> Result<ConversionReport> {
        let mut report = ConversionReport::default();

        for output in self.outputs() {
            if !config.ffmpeg.overwrite_existing && output.is_exists() {
                info!("Skipping {:?}: already exists", output.file_path);
                report.skipped.push(output.file_path.clone());
                continue;
            }
            if output.media_block_list.is_empty() {
                warn!("Skipping {:?}: no media blocks", output.file_path);
                report.skipped.push(output.file_path.clone());
                continue;
            }

            let command = self.compile_output(output, config)?;
            info!(
                "Converting {} ({} blocks, {:.1}s)",
                output.key,
                output.media_block_list.len(),
                output.playback_duration()
            );
            runner.run(&command)?;
            report.converted.push(output.file_path.clone());
        }

        Ok(report)
    }
}

/// Ordered finite range and positive finite speed
fn validate_block(start: f64, end: f64, speed: f64) -> Result<()> {
    if !(start.is_finite() && end.is_finite() && start <= end) {
        return Err(GraphError::InvalidBlock {
            details: format!("range {}..{} is not ordered", start, end),
        }
        .into());
    }
    if !(speed.is_finite() && speed > 0.0) {
        return Err(GraphError::InvalidBlock {
            details: format!("speed {} must be positive", speed),
        }
        .into());
    }
    Ok(())
}

impl Default for MediaController {
    fn default() -> Self {
        Self::new()
    }
}
