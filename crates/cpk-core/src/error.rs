use std::path::PathBuf;

use thiserror::Error;

/// Hard failures of the outer layers.
///
/// Malformed log content is not represented here: a file with the wrong
/// usage-line count or dirty numeric cells simply contributes nothing.
#[derive(Error, Debug)]
pub enum CpkError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Invalid filename filter: {0}")]
    Filter(#[from] regex::Error),
}

impl CpkError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CpkError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, CpkError>;
