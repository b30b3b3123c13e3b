//! Producer error types

use std::io;

/// Error type for computing a result
#[derive(Debug)]
pub enum ProduceError {
    /// No text source is configured
    SourceUnavailable,
    /// Capturing or recognizing text failed
    Capture(String),
    /// The analyzer failed
    Analyze(String),
    /// An external command exited unsuccessfully
    Command {
        /// The command line that was run
        command: String,
        /// Exit code, if the process exited normally
        code: Option<i32>,
        /// Captured standard error (trimmed)
        stderr: String,
    },
    /// Spawning or talking to an external command failed
    Io(io::Error),
    /// The computation panicked
    Panicked(String),
    /// The computation was cancelled before it finished
    Cancelled,
}

impl std::fmt::Display for ProduceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProduceError::SourceUnavailable => write!(f, "No capture source configured"),
            ProduceError::Capture(msg) => write!(f, "Capture failed: {}", msg),
            ProduceError::Analyze(msg) => write!(f, "Analysis failed: {}", msg),
            ProduceError::Command {
                command,
                code,
                stderr,
            } => {
                match code {
                    Some(code) => write!(f, "Command `{}` exited with status {}", command, code)?,
                    None => write!(f, "Command `{}` was terminated by a signal", command)?,
                }
                if !stderr.is_empty() {
                    write!(f, ": {}", stderr)?;
                }
                Ok(())
            }
            ProduceError::Io(e) => write!(f, "I/O error: {}", e),
            ProduceError::Panicked(msg) => write!(f, "Worker panicked: {}", msg),
            ProduceError::Cancelled => write!(f, "Cancelled"),
        }
    }
}

impl std::error::Error for ProduceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ProduceError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for ProduceError {
    fn from(e: io::Error) -> Self {
        ProduceError::Io(e)
    }
}
