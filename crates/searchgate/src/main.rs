//! Searchgate
//!
//! A message full-text search gateway in front of a pluggable search
//! backend.

use clap::Parser;
use searchgate_rest::{ServerConfig, create_app, init_logging};
use searchgate_engine::auth::AuthGate;
use searchgate_engine::build_engine;
use tracing::info;

/// Starts the Axum HTTP server.
async fn serve(app: axum::Router, addr: &str) -> anyhow::Result<()> {
    info!(address = %addr, "Server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let server_config = ServerConfig::parse();
    init_logging(&server_config.logging_level);

    // Configuration problems are fatal before any traffic is served.
    let config = match server_config.load_engine_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    info!(
        host = %config.server.host,
        port = config.server.port,
        engine = %config.search_engine.kind,
        index = %config.elasticsearch.index,
        auth = config.auth.enabled,
        "Starting searchgate"
    );

    let gate = match AuthGate::from_config(&config.auth) {
        Ok(gate) => gate,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    // Unimplemented engine kinds fail here, not at first request.
    let engine = build_engine(&config)?;

    if let Err(e) = engine_startup(&*engine).await {
        tracing::warn!(error = %e, "backend not ready at startup, continuing anyway");
    }

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let app = create_app(engine, gate, config, server_config.enable_cors);
    serve(app, &addr).await
}

/// Best-effort backend preparation: create the index mapping up front so
/// the first write does not pay for it. The gateway still starts when the
/// backend is down; writes heal the index later.
async fn engine_startup(engine: &dyn searchgate_engine::SearchEngine) -> anyhow::Result<()> {
    use searchgate_engine::HealthStatus;

    if let HealthStatus::Unreachable = engine.ping().await {
        anyhow::bail!("search backend unreachable");
    }
    engine.initialize().await?;
    info!("search backend ready");
    Ok(())
}
