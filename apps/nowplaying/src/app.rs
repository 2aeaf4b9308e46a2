//! Application orchestrator: startup checks, the poll loop and shutdown.

use anyhow::Context;
use nowplaying_monitor::{Monitor, Settings};
use nowplaying_publish::Publisher;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::status::Console;

/// Runs the monitor until Ctrl+C, announcing each cycle on `console`.
///
/// Fails before the loop starts when the configuration is invalid or the
/// output directory cannot be prepared.
pub async fn run<W>(config: Config, console: Console<W>) -> anyhow::Result<()>
where
    W: std::io::Write,
{
    let settings = config.settings()?;
    let publisher = config.publisher()?;

    startup_checks(&settings, &publisher)?;

    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => tracing::info!("SIGINT received, shutting down"),
            Err(e) => tracing::error!(error = %e, "failed to listen for Ctrl+C"),
        }
        ctrl_c.cancel();
    });

    let monitor = Monitor::new(settings, publisher);
    console.set_prefix(config.status_prefix.as_str());

    tracing::info!("monitor ready, press Ctrl+C to stop");
    monitor
        .run(cancel, |result| {
            console.update(result);
        })
        .await;

    console.clear();
    Ok(())
}

/// Logs the effective setup and prepares the output location.
fn startup_checks(settings: &Settings, publisher: &Publisher) -> anyhow::Result<()> {
    tracing::info!(
        source = %settings.source_path.display(),
        encoding = settings.source_encoding.name(),
        offset = settings.filename_start,
        "monitoring source file"
    );
    tracing::info!(
        output = %publisher.target().display(),
        encoding = publisher.encoding().name(),
        "publishing to output file"
    );
    tracing::info!(
        interval_secs = settings.poll_interval.as_secs(),
        default_label = %settings.default_label,
        "poll settings"
    );

    if let Some(dir) = settings
        .source_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty() && !p.exists())
    {
        tracing::warn!(path = %dir.display(), "source directory not found");
    }

    publisher.prepare().with_context(|| {
        format!(
            "cannot prepare output directory for {}, check permissions",
            publisher.target().display()
        )
    })?;
    publisher.discard_stale_temp();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_in(dir: &std::path::Path) -> Config {
        Config {
            source_path: dir.join("in").join("broad.int").to_string_lossy().into_owned(),
            output_path: dir.join("out").join("broad.txt").to_string_lossy().into_owned(),
            ..Config::default()
        }
    }

    #[test]
    fn startup_prepares_output_dir_and_drops_stale_temp() {
        let tmp = tempfile::tempdir().unwrap();
        let config = config_in(tmp.path());
        let settings = config.settings().unwrap();
        let publisher = config.publisher().unwrap();

        startup_checks(&settings, &publisher).unwrap();
        assert!(tmp.path().join("out").is_dir());

        std::fs::write(publisher.temp_path(), "stale").unwrap();
        startup_checks(&settings, &publisher).unwrap();
        assert!(!publisher.temp_path().exists());
    }

    #[test]
    fn startup_fails_when_output_dir_cannot_be_created() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("out");
        std::fs::write(&blocker, "not a directory").unwrap();
        let config = config_in(tmp.path());

        let err = startup_checks(&config.settings().unwrap(), &config.publisher().unwrap())
            .unwrap_err();
        assert!(err.to_string().contains("cannot prepare output directory"));
    }

    #[tokio::test]
    async fn run_rejects_invalid_config() {
        let tmp = tempfile::tempdir().unwrap();
        let mut config = config_in(tmp.path());
        config.known_extensions.clear();
        assert!(run(config, Console::new(Vec::new())).await.is_err());
    }
}
