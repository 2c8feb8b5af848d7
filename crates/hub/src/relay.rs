//! Relay process wiring: upstream source → aggregation scheduler → fan-out →
//! viewer server.

use crate::fanout::Hub;
use crate::server::{bind_viewers, spawn_server};
use pulse_config::{RelayConfig, SourceKind};
use pulse_core::Result;
use pulse_ingest::{bind_intake, spawn_aggregator, spawn_intake, spawn_simulated};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::info;

/// Upstream deliveries (one parsed line each) queued ahead of the scheduler.
const SAMPLE_QUEUE: usize = 1_024;

/// A running relay.  Dropping it leaves the tasks running; call
/// [`Relay::shutdown`] to stop them.
pub struct Relay {
    hub:         Hub,
    viewer_addr: SocketAddr,
    intake_addr: Option<SocketAddr>,
    tasks:       Vec<JoinHandle<()>>,
}

impl Relay {
    /// Bind every listener and spawn the pipeline tasks.
    pub async fn start(cfg: &RelayConfig) -> Result<Self> {
        // broadcast channels cannot be zero-sized
        let hub = Hub::new(cfg.channel_capacity.max(1));
        let (sample_tx, sample_rx) = mpsc::channel(SAMPLE_QUEUE);

        let viewers = bind_viewers(&cfg.listen).await?;
        let viewer_addr = viewers.local_addr()?;

        let mut tasks = Vec::with_capacity(3);
        let intake_addr = match cfg.source {
            SourceKind::Intake => {
                let listener = bind_intake(&cfg.intake).await?;
                let addr = listener.local_addr()?;
                tasks.push(spawn_intake(listener, sample_tx));
                Some(addr)
            }
            SourceKind::Simulated => {
                tasks.push(spawn_simulated(sample_tx));
                None
            }
        };

        tasks.push(spawn_aggregator(
            Duration::from_millis(cfg.tick_ms),
            sample_rx,
            hub.clone(),
        ));
        tasks.push(spawn_server(viewers, hub.clone()));

        Ok(Self {
            hub,
            viewer_addr,
            intake_addr,
            tasks,
        })
    }

    pub fn hub(&self) -> &Hub {
        &self.hub
    }

    pub fn viewer_addr(&self) -> SocketAddr {
        self.viewer_addr
    }

    /// `None` when running from the simulated source.
    pub fn intake_addr(&self) -> Option<SocketAddr> {
        self.intake_addr
    }

    pub fn shutdown(self) {
        for task in self.tasks {
            task.abort();
        }
        info!("Relay stopped");
    }
}

/// Run the relay until Ctrl-C.
pub async fn run(cfg: &RelayConfig) -> Result<()> {
    let relay = Relay::start(cfg).await?;
    info!(
        "Relay up: viewers on {}, tick {} ms",
        relay.viewer_addr(),
        cfg.tick_ms
    );

    tokio::signal::ctrl_c().await?;
    info!("Shutdown requested");
    relay.shutdown();
    Ok(())
}
