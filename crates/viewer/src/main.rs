//! pulse-viewer: live heart rate and SpO2 graphs fed by a pulse relay.
//!
//! Run with:  `RUST_LOG=info pulse-viewer`

use anyhow::Result;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!("pulse-viewer v{} starting", env!("CARGO_PKG_VERSION"));

    pulse_viewer::run().map_err(Into::into)
}
