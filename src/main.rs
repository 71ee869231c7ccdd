//! edoc-transfer: demo document-transfer portal
//!
//! Serves the signup, filing, signing and receipt pages from a single
//! process. All accounts live in memory and are lost on restart.

use clap::Parser;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use edoc_transfer::{create_router, AppState, Args, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    let log_level = args.log_level.clone();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("edoc_transfer={},tower_http=info", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting edoc-transfer");
    info!("Config file: {}", args.config);

    let mut config = Config::load(Path::new(&args.config))?;
    config.apply_args(&args);
    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        std::process::exit(1);
    }

    info!("Session TTL: {}s", config.session.ttl_secs);
    info!("Demo OTP enabled for signup verification");

    let addr = config.server.listen;
    let state = Arc::new(AppState::new(config));
    let app = create_router(state);

    info!("Portal listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
