//! # termrelay
//!
//! Shares one terminal program with many Telnet viewers.
//!
//! ## Architecture
//!
//! This is Layer 3 - the server binary that ties together:
//! - termrelay-core: Core types and configuration
//! - termrelay-emulator: Terminal emulation and screen encoding
//! - termrelay-session: Telnet sessions, relay clients and slots

use std::sync::Arc;

use termrelay::{CliOptions, RelayServer, USAGE};
use termrelay_session::PtySlot;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let options = CliOptions::parse(std::env::args().skip(1))?;
    if options.help {
        print!("{}", USAGE);
        return Ok(());
    }

    let config = options.load_config()?;

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.server.log_level)),
        )
        .init();

    tracing::info!("termrelay v{} starting...", env!("CARGO_PKG_VERSION"));

    let slot = PtySlot::from_config(&config).map_err(|e| {
        tracing::error!("Error starting program: {}", e);
        e
    })?;

    let server = Arc::new(RelayServer::new(config, slot));
    let listener = server.bind().await?;

    tracing::info!(
        "Relaying '{}' on {}",
        server.config().program.command,
        server.config().server.listen_address()
    );

    let runner = Arc::clone(&server);
    tokio::select! {
        result = runner.run(listener) => result?,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Interrupted, shutting down");
            server.shutdown();
        }
    }

    tracing::info!("termrelay shutting down");

    Ok(())
}
