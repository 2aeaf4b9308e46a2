//! Broadcast log monitor.
//!
//! Each cycle reads the first line of the source log, extracts the path of
//! the item on air, filters it against the exception list, derives a label
//! and publishes it. Problems with the source degrade to the default label;
//! only publish failures fail a cycle.

mod error;
mod monitor;
mod source;

pub use error::FallbackReason;
pub use monitor::{CycleResult, Monitor, Published, Settings};
pub use source::read_first_line;
