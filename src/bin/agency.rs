//! Agency submission binary.
//!
//! Usage:
//!   agency [config-path]
//!
//! The config path defaults to `config.yaml`. `AGENCY_ID`,
//! `SERVER_ADDRESS` and `DATA_FILE` environment variables override the
//! file's values.

use std::sync::Arc;

use tokio::signal;
use tracing::{error, info};

use betwire::{BetwireError, CsvSource, Session, SessionConfig, TracingSink};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "betwire=info,agency=info".into()),
        )
        .init();

    if let Err(error) = run().await {
        error!(%error, "Session aborted");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), BetwireError> {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.yaml".to_string());
    let config = SessionConfig::from_file(&path)?;

    info!(
        agency_id = config.agency_id,
        server = %config.server_address,
        data_file = %config.data_file,
        "Starting agency session"
    );

    let source = CsvSource::open(&config.data_file)?;
    let mut session = Session::new(config, source, Arc::new(TracingSink));

    tokio::select! {
        result = session.run() => {
            let winners = result?;
            info!(winners = winners.len(), "Session complete");
            Ok(())
        }
        _ = shutdown_signal() => {
            info!("Interrupt received, shutting down");
            Ok(())
        }
    }
}

async fn shutdown_signal() {
    signal::ctrl_c()
        .await
        .expect("failed to install interrupt handler");
}
