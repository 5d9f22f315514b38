pub mod config;
pub mod error;

pub use config::{Config, RemoteConfig, SearchConfig, SyncConfig, SyncPolicy, ValidationResult};
pub use error::{AppError, ConfigError, DataError, InputError, NetworkError, ReqwestErrorExt};

use anyhow::Result;

/// Initialize logging for the application.
///
/// Logs are written to stderr so rendered output on stdout stays clean.
pub fn init() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    tracing::info!("Weathercards core initialized");
    Ok(())
}
