//! Crash-safe publication of the now playing label.
//!
//! The label is written to a sibling `<target>.tmp` file, flushed to disk and
//! renamed over the target, so readers see either the previous or the new
//! content in full.

mod atomic;
mod error;

pub use atomic::{Publisher, ensure_parent_dir, temp_path_for};
pub use error::PublishError;

/// Suffix appended to the target file name for the staging file.
pub const TEMP_SUFFIX: &str = ".tmp";
