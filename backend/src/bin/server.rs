//! Exo Transit HTTP Server Binary
//!
//! This is the main entry point for the transit detection REST API server.
//! It loads configuration, sets up the HTTP router, and starts serving requests.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin exo-server
//!
//! # With a configuration file
//! EXO_CONFIG=exo.toml cargo run --bin exo-server
//! ```
//!
//! # Environment Variables
//!
//! - `EXO_CONFIG`: Path to a TOML configuration file (optional)
//! - `HOST`: Server host (default: 0.0.0.0)
//! - `PORT`: Server port (default: 8080)
//! - `RUST_LOG`: Log level (default: info)

use std::env;
use std::net::SocketAddr;

use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use exo_transit::config::AppConfig;
use exo_transit::http::{create_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    FmtSubscriber::builder()
        .with_max_level(
            env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::INFO),
        )
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("Starting Exo Transit HTTP Server");

    let config = AppConfig::load()?;
    info!(
        "Pipeline defaults: depth threshold {}, min duration {} samples, window {}",
        config.pipeline.depth_threshold,
        config.pipeline.min_duration_samples,
        config
            .pipeline
            .normalize_window
            .map(|w| w.to_string())
            .unwrap_or_else(|| "cadence-derived".to_string())
    );

    let addr: SocketAddr = config.bind_address().parse()?;

    // Create application state and router
    let state = AppState::new(config);
    let app = create_router(state);

    info!("Server listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
