use thiserror::Error;

/// Main error type for the Tick-Compositor library
#[derive(Error, Debug)]
pub enum CompositorError {
    #[error("Timing error: {0}")]
    Timing(#[from] TimingError),

    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Execution error: {0}")]
    Exec(#[from] ExecError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Generic error: {0}")]
    Generic(String),
}

/// Errors raised while reading tick codes and run manifests
#[derive(Error, Debug)]
pub enum TimingError {
    #[error("No timing files found in directory: {path}")]
    NoTimingFiles { path: String },

    #[error("Malformed run code: {code}")]
    InvalidRunCode { code: String },

    #[error("Run not found in timing data: {code}")]
    UnknownRun { code: String },

    #[error("Interval {slot} of run {code} is missing its {missing} boundary")]
    IncompleteInterval {
        code: String,
        slot: String,
        missing: &'static str,
    },
}

/// Errors raised while building or serializing the filter graph
#[derive(Error, Debug)]
pub enum GraphError {
    #[error("Unknown input source key: {key}")]
    UnknownInput { key: String },

    #[error("Unknown output source key: {key}")]
    UnknownOutput { key: String },

    #[error("Invalid media block: {details}")]
    InvalidBlock { details: String },

    #[error("No input registered for stream index {index}")]
    MissingInput { index: usize },

    #[error("Root graph node has no output path")]
    MissingOutputPath,

    #[error("Filter graph has no root node")]
    EmptyGraph,
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration file: {path}")]
    ParseFailed { path: String },

    #[error("Invalid configuration value: {key} = {value}")]
    InvalidValue { key: String, value: String },

    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },
}

/// Errors from invoking the external media tool
#[derive(Error, Debug)]
pub enum ExecError {
    #[error("Failed to spawn {program}: {reason}")]
    SpawnFailed { program: String, reason: String },

    #[error("{program} exited with {status}: {stderr}")]
    ProcessFailed {
        program: String,
        status: String,
        stderr: String,
    },
}

/// Convenience type alias for Results using CompositorError
pub type Result<T> = std::result::Result<T, CompositorError>;

impl CompositorError {
    /// Create a generic error with a custom message
    pub fn generic<S: Into<String>>(message: S) -> Self {
        Self::Generic(message.into())
    }

    /// Check if this error is recoverable (can be retried)
    ///
    /// Re-running the pipeline skips outputs that already exist, so a failed
    /// ffmpeg run can be retried without recomputing finished outputs.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Io(_) => true,
            Self::Exec(_) => true,
            _ => false,
        }
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::Exec(ExecError::SpawnFailed { program, .. }) => {
                format!("Could not start '{}'. Please check that FFmpeg is installed and on PATH.", program)
            }
            Self::Timing(TimingError::UnknownRun { code }) => {
                format!("Run '{}' is listed in the manifest but has no timing data.", code)
            }
            Self::Config(ConfigError::FileNotFound { path }) => {
                format!("Configuration file '{}' not found.", path)
            }
            _ => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exec_errors_are_recoverable() {
        let err: CompositorError = ExecError::ProcessFailed {
            program: "ffmpeg".to_string(),
            status: "exit status: 1".to_string(),
            stderr: String::new(),
        }
        .into();
        assert!(err.is_recoverable());

        let err: CompositorError = GraphError::EmptyGraph.into();
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_user_message_for_unknown_run() {
        let err: CompositorError = TimingError::UnknownRun { code: "ab3".to_string() }.into();
        assert!(err.user_message().contains("ab3"));
    }
}
