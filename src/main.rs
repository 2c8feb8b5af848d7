//! pulse: relay that turns raw heart rate and SpO2 samples into one averaged
//! reading per second and fans it out to connected viewers.
//!
//! Run with:  `RUST_LOG=info pulse`

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Structured logging. RUST_LOG controls verbosity (default: info).
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!("pulse v{} starting", env!("CARGO_PKG_VERSION"));

    let path = pulse_config::default_path();
    let config = pulse_config::load(&path)
        .with_context(|| format!("loading {}", path.display()))?;

    pulse_hub::run(&config.relay).await.map_err(Into::into)
}
