//! Now playing daemon entry point.

mod app;
mod config;
mod status;

use tracing_subscriber::EnvFilter;

use crate::status::Console;

fn main() -> anyhow::Result<()> {
    // Logs and the status line share stdout through the console.
    let console = Console::new(std::io::stdout());

    // Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(console.clone())
        .init();

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "starting now playing monitor"
    );

    let config = config::Config::load()?;

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    rt.block_on(app::run(config, console))?;

    tracing::info!("monitor stopped");
    Ok(())
}
