//! # Command Runners
//!
//! The external media tool is the only side effect of the pipeline. Runners
//! receive one finished command at a time and block until it completes.

use std::process::{Command, Stdio};

use tracing::{debug, info};

use crate::error::{ExecError, Result};
use crate::graph::FfmpegCommand;

/// Executes serialized commands
pub trait CommandRunner {
    fn run(&mut self, command: &FfmpegCommand) -> Result<()>;
}

/// Runs the real ffmpeg binary as a subprocess
#[derive(Debug, Default)]
pub struct FfmpegRunner;

impl FfmpegRunner {
    pub fn new() -> Self {
        Self
    }

    /// Whether `program -version` can be executed
    pub fn check_available(program: &str) -> bool {
        Command::new(program)
            .arg("-version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false)
    }
}

impl CommandRunner for FfmpegRunner {
    fn run(&mut self, command: &FfmpegCommand) -> Result<()> {
        info!("Rendering {:?} from {} inputs", command.output, command.inputs.len());
        debug!("{}", command.to_args().join(" "));

        let output = Command::new(&command.program)
            .args(command.arguments())
            .stdin(Stdio::null())
            .output()
            .map_err(|e| ExecError::SpawnFailed {
                program: command.program.clone(),
                reason: e.to_string(),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ExecError::ProcessFailed {
                program: command.program.clone(),
                status: output.status.to_string(),
                stderr: tail_lines(&stderr, 20),
            }
            .into());
        }

        Ok(())
    }
}

/// Last `count` lines of ffmpeg's stderr; the banner before them is noise
fn tail_lines(text: &str, count: usize) -> String {
    let lines: Vec<&str> = text.lines().collect();
    lines[lines.len().saturating_sub(count)..].join("\n")
}

/// Logs commands instead of executing them and keeps a copy of each
#[derive(Debug, Default)]
pub struct DryRunRunner {
    pub commands: Vec<FfmpegCommand>,
}

impl DryRunRunner {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CommandRunner for DryRunRunner {
    fn run(&mut self, command: &FfmpegCommand) -> Result<()> {
        info!("[dry-run] {}", command.to_args().join(" "));
        self.commands.push(command.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn command(program: &str) -> FfmpegCommand {
        FfmpegCommand {
            program: program.to_string(),
            inputs: vec![PathBuf::from("a.mp4")],
            filter_complex: "[0:v]setpts=PTS-STARTPTS[z1]".to_string(),
            maps: vec!["[z1]".to_string()],
            quality_flags: Vec::new(),
            output: PathBuf::from("out.mp4"),
            overwrite: false,
        }
    }

    #[test]
    fn test_dry_run_records_commands() {
        let mut runner = DryRunRunner::new();
        runner.run(&command("ffmpeg")).unwrap();
        runner.run(&command("ffmpeg")).unwrap();
        assert_eq!(runner.commands.len(), 2);
    }

    #[test]
    fn test_tail_lines() {
        assert_eq!(tail_lines("a\nb\nc", 2), "b\nc");
        assert_eq!(tail_lines("a", 5), "a");
    }

    #[test]
    fn test_missing_program_is_spawn_failure() {
        let mut runner = FfmpegRunner::new();
        let result = runner.run(&command("definitely-not-a-real-ffmpeg-binary"));
        assert!(matches!(
            result,
            Err(crate::error::CompositorError::Exec(ExecError::SpawnFailed { .. }))
        ));
        assert!(!FfmpegRunner::check_available("definitely-not-a-real-ffmpeg-binary"));
    }
}
