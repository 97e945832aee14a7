use std::path::Path;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Main configuration for the Tick-Compositor
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// External tool invocation settings
    pub ffmpeg: FfmpegConfig,

    /// Filter graph lowering settings
    pub graph: GraphConfig,

    /// File discovery and naming settings
    pub pipeline: PipelineConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::FileNotFound { path: path.display().to_string() })?;

        let config: Config = toml::from_str(&content)
            .map_err(|_| ConfigError::ParseFailed { path: path.display().to_string() })?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::InvalidValue {
                key: "config".to_string(),
                value: e.to_string()
            })?;

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.ffmpeg.validate()?;
        self.pipeline.validate()?;
        Ok(())
    }
}

/// External media tool configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FfmpegConfig {
    /// Program name or path of the media tool
    pub program: String,

    /// Fixed quality flags placed between the `-map` arguments and the output path
    pub quality_flags: Vec<String>,

    /// Re-render outputs whose file already exists
    pub overwrite_existing: bool,
}

impl Default for FfmpegConfig {
    fn default() -> Self {
        Self {
            program: "ffmpeg".to_string(),
            quality_flags: vec![
                "-b:v".to_string(),
                "10M".to_string(),
                "-b:a".to_string(),
                "320k".to_string(),
            ],
            overwrite_existing: false,
        }
    }
}

impl FfmpegConfig {
    fn validate(&self) -> Result<()> {
        if self.program.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "ffmpeg.program".to_string(),
                value: self.program.clone()
            }.into());
        }

        Ok(())
    }
}

/// Filter graph lowering configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Add a `minterpolate` pass after video speed changes
    pub motion_interpolation: bool,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            motion_interpolation: true,
        }
    }
}

/// Discovery and naming configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Extension of the tick-code timing files
    pub timing_extension: String,

    /// Extension of the recording that sits next to each timing file
    pub source_extension: String,

    /// Extension given to rendered outputs
    pub output_extension: String,

    /// File name of the output manifest inside the input folder
    pub manifest_name: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            timing_extension: "gbm".to_string(),
            source_extension: "mp4".to_string(),
            output_extension: "mp4".to_string(),
            manifest_name: "output.txt".to_string(),
        }
    }
}

impl PipelineConfig {
    fn validate(&self) -> Result<()> {
        let extensions = [
            ("pipeline.timing_extension", &self.timing_extension),
            ("pipeline.source_extension", &self.source_extension),
            ("pipeline.output_extension", &self.output_extension),
        ];

        for (key, value) in extensions {
            if value.is_empty() || value.starts_with('.') {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    value: value.clone()
                }.into());
            }
        }

        if self.manifest_name.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "pipeline.manifest_name".to_string(),
                value: self.manifest_name.clone()
            }.into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_roundtrip() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("test_config.toml");

        let mut original_config = Config::default();
        original_config.ffmpeg.overwrite_existing = true;
        original_config.graph.motion_interpolation = false;

        original_config.save_to_file(&file_path).unwrap();
        let loaded_config = Config::from_file(&file_path).unwrap();

        assert_eq!(original_config.ffmpeg.program, loaded_config.ffmpeg.program);
        assert_eq!(original_config.ffmpeg.quality_flags, loaded_config.ffmpeg.quality_flags);
        assert!(loaded_config.ffmpeg.overwrite_existing);
        assert!(!loaded_config.graph.motion_interpolation);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("partial.toml");
        std::fs::write(&file_path, "[pipeline]\nsource_extension = \"mkv\"\n").unwrap();

        let config = Config::from_file(&file_path).unwrap();
        assert_eq!(config.pipeline.source_extension, "mkv");
        assert_eq!(config.pipeline.timing_extension, "gbm");
        assert_eq!(config.ffmpeg.program, "ffmpeg");
    }

    #[test]
    fn test_missing_config_file() {
        let dir = tempdir().unwrap();
        let result = Config::from_file(dir.path().join("nope.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_program() {
        let mut config = Config::default();
        config.ffmpeg.program = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_extension() {
        let mut config = Config::default();
        config.pipeline.output_extension = ".mp4".to_string();
        assert!(config.validate().is_err());
    }
}
