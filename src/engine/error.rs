use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Errors raised by the ORCA adapter and its collaborators.
///
/// A failed ORCA run is *not* an error: `optimize` reports it as `Ok(false)`.
/// These variants cover the cases the caller cannot recover from by
/// inspecting the output (filesystem, configuration, unreadable data).
#[derive(Error, Debug)]
pub enum OrcaError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Parse error in {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Unknown element symbol '{0}'")]
    UnknownElement(String),

    #[error("Executable '{0}' not found in PATH")]
    ExecutableNotFound(String),

    #[error("'{executable}' did not finish within {limit:?} and was killed")]
    Timeout { executable: String, limit: Duration },
}

impl OrcaError {
    pub(crate) fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, OrcaError>;
