//! Reasons a cycle falls back to the default label.

use std::path::PathBuf;

/// Why a cycle published the default label instead of a derived one.
///
/// None of these fail the cycle.
#[derive(Debug, thiserror::Error)]
pub enum FallbackReason {
    #[error("source file {} unavailable: {source}", path.display())]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("source file {} is empty", path.display())]
    SourceEmpty { path: PathBuf },

    #[error("source file {} is not valid {encoding}", path.display())]
    Decode {
        path: PathBuf,
        encoding: &'static str,
    },

    #[error("no known extension found after offset {offset}")]
    ExtractionFailure { offset: usize },

    #[error("path {path} matches an exception")]
    FilteredOut { path: String },

    #[error("cannot derive a name from {path}")]
    EmptyName { path: String },
}

impl FallbackReason {
    /// Logs the reason at the severity it deserves.
    pub(crate) fn log(&self) {
        match self {
            Self::SourceUnavailable { source, .. }
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                tracing::warn!("{self}");
            }
            Self::SourceUnavailable { .. } | Self::Decode { .. } => {
                tracing::error!("{self}");
            }
            Self::SourceEmpty { .. } | Self::EmptyName { .. } => {
                tracing::warn!("{self}");
            }
            Self::ExtractionFailure { .. } | Self::FilteredOut { .. } => {
                tracing::debug!("{self}");
            }
        }
    }
}
