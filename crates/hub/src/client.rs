use crate::wire::{parse_event, Command};
use pulse_core::{Message, Metric, PulseError, Reading, Result};
use std::collections::HashSet;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

/// One live connection from a viewer to the relay.
pub struct RelayConnection {
    lines:      Lines<BufReader<OwnedReadHalf>>,
    writer:     OwnedWriteHalf,
    subscribed: HashSet<Metric>,
}

impl RelayConnection {
    pub async fn connect(addr: &str) -> Result<Self> {
        let stream = TcpStream::connect(addr)
            .await
            .map_err(|e| PulseError::Transport(format!("connect {addr}: {e}")))?;
        let (reader, writer) = stream.into_split();

        Ok(Self {
            lines: BufReader::new(reader).lines(),
            writer,
            subscribed: HashSet::new(),
        })
    }

    /// Start receiving `metric`'s topic.  A no-op if already subscribed.
    pub async fn subscribe(&mut self, metric: Metric) -> Result<()> {
        if self.subscribed.insert(metric) {
            self.send(Command::Subscribe(metric)).await?;
        }
        Ok(())
    }

    /// Stop receiving `metric`'s topic.  A no-op if not subscribed.
    pub async fn unsubscribe(&mut self, metric: Metric) -> Result<()> {
        if self.subscribed.remove(&metric) {
            self.send(Command::Unsubscribe(metric)).await?;
        }
        Ok(())
    }

    async fn send(&mut self, command: Command) -> Result<()> {
        let mut line = command.encode();
        line.push('\n');
        self.writer
            .write_all(line.as_bytes())
            .await
            .map_err(|e| PulseError::Transport(format!("write: {e}")))
    }

    /// Next reading from the relay; `Ok(None)` once the relay hangs up.
    /// Unparseable lines are logged and skipped.
    pub async fn next_reading(&mut self) -> Result<Option<Reading>> {
        loop {
            let line = self
                .lines
                .next_line()
                .await
                .map_err(|e| PulseError::Transport(format!("read: {e}")))?;
            let Some(line) = line else {
                return Ok(None);
            };
            match parse_event(&line) {
                Ok(reading) => return Ok(Some(reading)),
                Err(e) => warn!("Skipping relay line: {e}"),
            }
        }
    }
}

/// Reconnecting relay client for the viewer.
pub struct RelayClient {
    server:    String,
    reconnect: Duration,
    topics:    Vec<Metric>,
}

impl RelayClient {
    pub fn new(server: impl Into<String>, reconnect: Duration) -> Self {
        Self {
            server: server.into(),
            reconnect,
            topics: Metric::ALL.to_vec(),
        }
    }

    /// Restrict the client to the given topics.
    #[must_use]
    pub fn with_topics(mut self, topics: &[Metric]) -> Self {
        self.topics = topics.to_vec();
        self
    }

    /// Spawn a background task that keeps a connection to the relay open and
    /// forwards bus [`Message`]s on the returned channel.
    ///
    /// The task reconnects automatically and stops when the receiver is dropped.
    pub fn spawn_listener(self) -> mpsc::Receiver<Message> {
        let (tx, rx) = mpsc::channel(32);

        tokio::spawn(async move {
            loop {
                match self.session(&tx).await {
                    Ok(true) => warn!(
                        "Relay connection lost; reconnecting in {}s…",
                        self.reconnect.as_secs()
                    ),
                    Ok(false) => return, // all receivers dropped
                    Err(e) => error!(
                        "Relay unavailable: {e}; retrying in {}s…",
                        self.reconnect.as_secs()
                    ),
                }

                if tx.send(Message::Disconnected).await.is_err() {
                    return;
                }
                tokio::time::sleep(self.reconnect).await;
            }
        });

        rx
    }

    /// Run one connection.  `Ok(false)` means the receiver went away.
    async fn session(&self, tx: &mpsc::Sender<Message>) -> Result<bool> {
        let mut conn = RelayConnection::connect(&self.server).await?;
        for &metric in &self.topics {
            conn.subscribe(metric).await?;
        }
        info!("Connected to relay at {}", self.server);
        if tx.send(Message::Connected).await.is_err() {
            return Ok(false);
        }

        while let Some(reading) = conn.next_reading().await? {
            if tx.send(Message::Reading(reading)).await.is_err() {
                return Ok(false);
            }
        }
        Ok(true)
    }
}
