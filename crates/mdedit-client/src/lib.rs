pub mod api;
pub mod autosave;
pub mod commands;
pub mod config;
pub mod controller;
pub mod editor;
pub mod error;
pub mod events;
pub mod export;
pub mod preview;
pub mod selection;
pub mod shell;
pub mod state;

#[cfg(test)]
mod testing;

use tracing_subscriber::{fmt, EnvFilter};

use crate::config::ClientConfig;
use crate::state::Session;

/// Install the global subscriber. Logs go to stderr so the shell owns stdout.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("mdedit_client=debug,mdedit_store=info,warn"));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}

/// Start a session from the environment and hand it to the shell.
pub async fn run() -> anyhow::Result<()> {
    tracing::info!("Starting Markdown Edit v{}", env!("CARGO_PKG_VERSION"));

    let config = ClientConfig::from_env();
    tracing::info!(
        server = %config.server_url,
        session = config.session_token.is_some(),
        autosave_ms = config.autosave_delay.as_millis() as u64,
        "Loaded configuration"
    );

    let session = Session::start(config).await?;
    shell::run(session).await
}
