//! Publish error types.

use std::path::PathBuf;

/// Errors that prevent a label from being published.
///
/// The target file is left untouched in every case.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("failed to create directory {}: {source}", path.display())]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write temp file {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to replace {} with {}: {source}", target.display(), temp.display())]
    Replace {
        temp: PathBuf,
        target: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
