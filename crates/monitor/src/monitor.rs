//! Extract-filter-derive-publish cycle and the polling loop around it.

use std::path::PathBuf;
use std::time::Duration;

use encoding_rs::Encoding;
use nowplaying_extract::{derive_label, extract_path, is_blocked};
use nowplaying_publish::{PublishError, Publisher};
use tokio_util::sync::CancellationToken;

use crate::{FallbackReason, read_first_line};

/// Immutable settings for a monitor, built once at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Broadcast log whose first line names the item on air.
    pub source_path: PathBuf,
    /// Character offset where the embedded path starts.
    pub filename_start: usize,
    /// Terminator markers bounding the end of the path.
    pub known_extensions: Vec<String>,
    /// Paths containing any of these publish the default label.
    pub exceptions: Vec<String>,
    /// Label published whenever no name can be derived.
    pub default_label: String,
    /// Encoding of the source log.
    pub source_encoding: &'static Encoding,
    /// Idle time after each cycle.
    pub poll_interval: Duration,
}

/// Outcome of a successful cycle.
#[derive(Debug)]
pub struct Published {
    /// The label now stored in the destination file.
    pub label: String,
    /// Set when `label` is the default label.
    pub fallback: Option<FallbackReason>,
}

/// Result of one cycle: the published label, or why nothing was published.
pub type CycleResult = Result<Published, PublishError>;

/// Polls the source log and publishes the derived label.
pub struct Monitor {
    settings: Settings,
    publisher: Publisher,
}

impl Monitor {
    /// Creates a monitor publishing through `publisher`.
    pub fn new(settings: Settings, publisher: Publisher) -> Self {
        Self {
            settings,
            publisher,
        }
    }

    /// Returns the monitor settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Returns the publisher.
    pub fn publisher(&self) -> &Publisher {
        &self.publisher
    }

    /// Derives the label for the current source content.
    ///
    /// Stops at the first stage that cannot produce a name.
    pub fn resolve_label(&self) -> Result<String, FallbackReason> {
        let settings = &self.settings;

        let line = read_first_line(&settings.source_path, settings.source_encoding)?;

        let path = extract_path(&line, settings.filename_start, &settings.known_extensions)
            .ok_or(FallbackReason::ExtractionFailure {
                offset: settings.filename_start,
            })?;

        if is_blocked(Some(path.as_str()), &settings.exceptions) {
            return Err(FallbackReason::FilteredOut { path });
        }

        let label = derive_label(&path);
        if label.is_empty() {
            return Err(FallbackReason::EmptyName { path });
        }

        Ok(label)
    }

    /// Runs one cycle: resolves the label and publishes it.
    ///
    /// Source problems publish the default label; only publish failures
    /// return an error.
    pub fn run_cycle(&self) -> CycleResult {
        let (label, fallback) = match self.resolve_label() {
            Ok(label) => (label, None),
            Err(reason) => {
                reason.log();
                (self.settings.default_label.clone(), Some(reason))
            }
        };

        let label = self.publisher.publish(&label)?;
        Ok(Published { label, fallback })
    }

    /// Runs cycles until `cancel` is cancelled, idling for the poll interval
    /// after each one.
    ///
    /// The first cycle runs immediately. The idle gap is measured from the end
    /// of a cycle, so a slow cycle never shortens the next pause. Cancellation
    /// is observed between cycles, so a cycle in progress always finishes its
    /// publish step.
    pub async fn run<F>(&self, cancel: CancellationToken, mut on_cycle: F)
    where
        F: FnMut(&CycleResult),
    {
        while !cancel.is_cancelled() {
            let result = self.run_cycle();
            on_cycle(&result);

            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.settings.poll_interval) => {}
            }
        }

        tracing::debug!("monitor loop stopped");
    }
}
