//! Path extraction, exception filtering and label derivation.
//!
//! Turns the first line of a broadcast automation log into a short
//! "now playing" label. Everything here is pure string work; reading the
//! source file and publishing the result live in the `monitor` and
//! `publish` crates.

mod filter;
mod label;
mod path;

pub use filter::is_blocked;
pub use label::{derive_label, is_separator};
pub use path::extract_path;

/// Default character offset where the file path starts in a log line.
pub const DEFAULT_FILENAME_START: usize = 269;

/// Default terminator markers bounding the end of the embedded path.
pub const DEFAULT_KNOWN_EXTENSIONS: &[&str] =
    &[".mp3", ".wav", ".aac", ".flac", ".ogg", ".wma", ".m4a"];

/// Default block-list: paths containing any of these are never announced.
pub const DEFAULT_EXCEPTIONS: &[&str] = &[r"\Jingles", "/Jingles", r"\Promo", "/Promo"];
