use crate::fanout::{Hub, Session};
use crate::wire::{encode_event, parse_command, Command};
use pulse_core::Result;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, trace, warn};

/// Bind the listener viewers connect to.
pub async fn bind_viewers(addr: &str) -> Result<TcpListener> {
    let listener = TcpListener::bind(addr).await?;
    info!("Viewer server listening on {}", listener.local_addr()?);
    Ok(listener)
}

/// Accept viewer connections and serve each one from its own task, so a
/// slow viewer only ever holds up itself.
pub fn spawn_server(listener: TcpListener, hub: Hub) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((stream, peer)) => {
                    info!("Viewer connected: {peer}");
                    let hub = hub.clone();
                    tokio::spawn(async move {
                        if let Err(e) = serve_viewer(stream, hub).await {
                            debug!("Viewer {peer} ended with error: {e}");
                        }
                        info!("Viewer disconnected: {peer}");
                    });
                }
                Err(e) => {
                    error!("Viewer accept failed: {e}");
                    tokio::time::sleep(Duration::from_millis(100)).await;
                }
            }
        }
    })
}

/// Pump commands in and topic lines out until either side goes away.
/// Dropping the session on return prunes this viewer from the fan-out.
async fn serve_viewer(stream: TcpStream, hub: Hub) -> Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut commands = BufReader::new(reader).lines();
    let mut session = Session::new();

    loop {
        tokio::select! {
            line = commands.next_line() => {
                let Some(line) = line? else {
                    return Ok(()); // viewer closed its side
                };
                if line.trim().is_empty() {
                    continue;
                }
                match parse_command(&line) {
                    Ok(Command::Subscribe(metric)) => {
                        if !session.subscribe(&hub, metric) {
                            debug!(%metric, "already subscribed");
                        }
                    }
                    Ok(Command::Unsubscribe(metric)) => {
                        session.unsubscribe(metric);
                    }
                    Err(e) => warn!("Ignoring viewer command: {e}"),
                }
            }
            event = session.recv() => {
                let Some(event) = event else {
                    return Ok(()); // hub shut down
                };
                let mut line = encode_event(event.reading());
                line.push('\n');
                writer.write_all(line.as_bytes()).await?;
                trace!(tick = event.tick, emitted_at = %event.emitted_at, "sent {}", line.trim_end());
            }
        }
    }
}
