use std::path::{Path, PathBuf};
use tracing::{info, debug, warn};

use crate::{
    config::Config,
    error::{Result, TimingError},
    media::{ConversionReport, MediaController},
    runner::CommandRunner,
    timing::{read_manifest, OutputSpec, TimeContainer},
};

/// Main composition engine that turns a folder of timing files into renders
///
/// The engine follows a clear pipeline:
/// 1. Timing Discovery - Find every timing file in the input folder
/// 2. Timing Parsing - Collect tick codes into per-run intervals
/// 3. Manifest Loading - Read which runs make up which output
/// 4. Block Planning - Resolve speed changes and register media blocks
/// 5. Conversion - Compile each output's graph and hand it to the runner
pub struct CompositionEngine {
    config: Config,
}

impl CompositionEngine {
    /// Create a new composition engine with the given configuration
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Main composition method - orchestrates the entire pipeline
    ///
    /// # Arguments
    ///
    /// * `input_dir` - Folder holding timing files, recordings and the manifest
    /// * `output_dir` - Folder that receives the rendered outputs; must already
    ///   exist when the runner writes files
    /// * `runner` - Executes each compiled command
    pub fn compose<R: CommandRunner + ?Sized>(
        &self,
        input_dir: &Path,
        output_dir: &Path,
        runner: &mut R,
    ) -> Result<ConversionReport> {
        info!("🎬 Starting composition");
        info!("   Input: {:?}", input_dir);
        info!("   Output: {:?}", output_dir);

        let controller = self.plan(input_dir, output_dir)?;

        // Pipeline Step 5: Conversion
        info!("🎞️  Step 5: Converting outputs...");
        let report = controller.convert(runner, &self.config)?;

        info!("🎉 Composition complete: {} converted, {} skipped",
              report.converted.len(), report.skipped.len());
        Ok(report)
    }

    /// Run steps 1-4 and return the populated controller without converting
    pub fn plan(&self, input_dir: &Path, output_dir: &Path) -> Result<MediaController> {
        let timings = self.load_timings(input_dir)?;

        // Pipeline Step 3: Manifest Loading
        let manifest_path = input_dir.join(&self.config.pipeline.manifest_name);
        info!("📋 Step 3: Reading manifest {:?}", manifest_path);
        let specs = read_manifest(&manifest_path)?;
        info!("   Outputs declared: {}", specs.len());

        // Pipeline Step 4: Block Planning
        info!("🧩 Step 4: Planning media blocks...");
        self.build_controller(&timings, &specs, output_dir)
    }

    // ==========================================
    // PIPELINE STEPS 1-2: TIMING DISCOVERY & PARSING
    // ==========================================

    /// Discover and parse every timing file in `input_dir`
    pub fn load_timings(&self, input_dir: &Path) -> Result<TimeContainer> {
        info!("🔎 Step 1: Discovering timing files...");
        let files = self.discover_timing_files(input_dir)?;

        info!("⏱️  Step 2: Parsing {} timing files...", files.len());
        let mut timings = TimeContainer::new();
        for file in &files {
            let source = self.source_for(file);
            let lines = timings.parse_file(file, &source)?;
            debug!("   {:?}: {} timed lines -> {:?}", file, lines, source);
        }

        info!("   ✅ Runs: {}, speed changes: {}",
              timings.runs().count(), timings.speed_changes().len());
        Ok(timings)
    }

    /// Timing files in `input_dir`, sorted by path
    pub fn discover_timing_files(&self, input_dir: &Path) -> Result<Vec<PathBuf>> {
        let extension = self.config.pipeline.timing_extension.as_str();

        let mut files: Vec<PathBuf> = std::fs::read_dir(input_dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file())
            .filter(|path| path.extension().and_then(|e| e.to_str()) == Some(extension))
            .collect();

        if files.is_empty() {
            return Err(TimingError::NoTimingFiles {
                path: input_dir.display().to_string()
            }.into());
        }

        files.sort();
        Ok(files)
    }

    /// The recording a timing file was logged against
    pub fn source_for(&self, timing_file: &Path) -> PathBuf {
        timing_file.with_extension(&self.config.pipeline.source_extension)
    }

    /// Target path of a manifest output
    pub fn output_path(&self, output_dir: &Path, name: &str) -> PathBuf {
        output_dir.join(format!("{}.{}", name, self.config.pipeline.output_extension))
    }

    // ==========================================
    // PIPELINE STEP 4: BLOCK PLANNING
    // ==========================================

    /// Register every manifest output and append its runs' resolved intervals
    pub fn build_controller(
        &self,
        timings: &TimeContainer,
        specs: &[OutputSpec],
        output_dir: &Path,
    ) -> Result<MediaController> {
        let mut controller = MediaController::new();

        for spec in specs {
            let output_key = controller.add_output_source(self.output_path(output_dir, &spec.name));
            let mut block_count = 0;

            if spec.runs.is_empty() {
                warn!("Output {} lists no runs", spec.name);
            }

            for code in &spec.runs {
                let level = timings
                    .run(code)
                    .ok_or_else(|| TimingError::UnknownRun { code: code.to_string() })?;
                level.check_complete(code)?;

                let intervals = level.resolve(timings.speed_changes());
                debug!("   {} -> {}", code,
                       intervals.iter().map(|i| i.to_string()).collect::<Vec<_>>().join(", "));

                block_count += controller.add_intervals(&output_key, &intervals, &spec.filters)?;
            }

            info!("   {} [{}]: {} runs, {} blocks",
                  spec.name, output_key, spec.runs.len(), block_count);
        }

        Ok(controller)
    }
}
