//! plaza-server: authoritative presence server for a shared 2D world.
//!
//! Accepts WebSocket connections, admits participants into a bounded
//! world, relays their movement, and keeps disconnected participants
//! around as offline entries until the retention TTL runs out.

mod bootstrap;
mod cli;
mod connection;
mod protocol;

use std::sync::Arc;

use plaza_session::{PersistHandle, SystemClock};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

fn install_panic_hook(persistence: Option<PersistHandle>) {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        if let Some(handle) = &persistence {
            match handle.save_blocking() {
                Ok(count) => {
                    tracing::error!(participants = count, "Emergency snapshot written after panic");
                }
                Err(e) => {
                    tracing::error!("Emergency snapshot failed: {e}");
                }
            }
        }
        default_hook(info);
    }));
}

#[tokio::main]
async fn main() {
    let args = cli::parse();

    // Initialize logging
    let log_directive = args.log_level.as_deref().unwrap_or("plaza=info");
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(
                log_directive
                    .parse()
                    .unwrap_or_else(|_| "plaza=info".parse().expect("static directive")),
            ),
        )
        .init();

    tracing::info!("plaza-server v{} starting...", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(args).await {
        tracing::error!("{e}");
        std::process::exit(1);
    }
    tracing::info!("Shutdown complete");
}

async fn run(args: cli::Args) -> plaza_common::Result<()> {
    // Load config
    if let Some(ref path) = args.config {
        tracing::info!("Using config override: {}", path.display());
    }
    let mut config = plaza_config::load_config(args.config.as_deref())?;
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(host) = args.host {
        config.server.host = host;
    }
    tracing::debug!(config = %plaza_config::config_to_json(&config), "Effective config");

    let runtime = bootstrap::start(
        &config,
        &plaza_config::default_data_dir(),
        Arc::new(SystemClock),
    );
    install_panic_hook(runtime.world.persistence().cloned());

    let addr = config.server.bind_addr();
    let listener = TcpListener::bind(&addr).await?;

    tracing::info!(
        max_participants = config.world.max_participants,
        offline_ttl_secs = config.retention.offline_ttl_secs,
        "plaza-server listening on {}",
        addr
    );

    tokio::select! {
        _ = connection::serve(listener, runtime.world.clone()) => {}
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown requested");
        }
    }

    let count = bootstrap::shutdown(&runtime).await?;
    tracing::info!(participants = count, "Final snapshot written");
    Ok(())
}
