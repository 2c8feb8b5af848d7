use crate::record::parse_line;
use pulse_core::{Metric, RawSample, Result};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Bind the upstream intake listener.
pub async fn bind_intake(addr: &str) -> Result<TcpListener> {
    let listener = TcpListener::bind(addr).await?;
    info!("Upstream intake listening on {}", listener.local_addr()?);
    Ok(listener)
}

/// Accept device-bridge connections and forward every parsed line to the
/// scheduler as one batch.  Each connection streams newline-delimited JSON
/// records.
///
/// The task stops when the scheduler side of `tx` is dropped.
pub fn spawn_intake(listener: TcpListener, tx: mpsc::Sender<Vec<RawSample>>) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((stream, peer)) => {
                    info!("Upstream connected: {peer}");
                    tokio::spawn(read_records(stream, tx.clone(), peer.to_string()));
                }
                Err(e) => {
                    error!("Intake accept failed: {e}");
                    tokio::time::sleep(Duration::from_millis(100)).await;
                }
            }
            if tx.is_closed() {
                break;
            }
        }
    })
}

async fn read_records(stream: TcpStream, tx: mpsc::Sender<Vec<RawSample>>, peer: String) {
    let mut lines = BufReader::new(stream).lines();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                warn!("Upstream {peer} read error: {e}");
                break;
            }
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        debug!("Upstream {peer}: {line}");

        let samples = match parse_line(line) {
            Ok(samples) => samples,
            Err(e) => {
                warn!("Upstream {peer}: skipping line: {e}");
                continue;
            }
        };
        if tx.send(samples).await.is_err() {
            return; // scheduler gone
        }
    }

    info!("Upstream disconnected: {peer}");
}

/// Generate plausible samples at irregular 20–120 ms intervals, for running
/// without a device attached.
pub fn spawn_simulated(tx: mpsc::Sender<Vec<RawSample>>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut rng = StdRng::from_entropy();
        info!("Simulated source started");

        loop {
            let delay = rng.gen_range(20..120);
            tokio::time::sleep(Duration::from_millis(delay)).await;

            let bpm  = 80.0 + rng.gen::<f64>() * 40.0;
            let spo2 = 95.0 + rng.gen::<f64>() * 4.0;
            let batch = vec![
                RawSample::new(Metric::HeartRate, Some(bpm)),
                RawSample::new(Metric::Spo2, Some(spo2)),
            ];
            if tx.send(batch).await.is_err() {
                return;
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncWriteExt;

    #[tokio::test]
    async fn intake_forwards_parsed_samples() {
        let listener = bind_intake("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, mut rx) = mpsc::channel(16);
        let task = spawn_intake(listener, tx);

        let mut device = TcpStream::connect(addr).await.unwrap();
        device
            .write_all(b"garbage\n{\"bpm\": 72.0}\n[{\"bpm\": 70}, {\"spo2\": 98}]\n")
            .await
            .unwrap();

        let single = rx.recv().await.unwrap();
        assert_eq!(
            single,
            vec![
                RawSample::new(Metric::HeartRate, Some(72.0)),
                RawSample::new(Metric::Spo2, None),
            ]
        );

        let batch = rx.recv().await.unwrap();
        assert_eq!(batch.len(), 4, "a whole line travels as one message");

        task.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn simulated_values_stay_in_range() {
        let (tx, mut rx) = mpsc::channel(16);
        let task = spawn_simulated(tx);

        for _ in 0..10 {
            for sample in rx.recv().await.unwrap() {
                let value = sample.value.unwrap();
                match sample.metric {
                    Metric::HeartRate => assert!((80.0..120.0).contains(&value)),
                    Metric::Spo2      => assert!((95.0..99.0).contains(&value)),
                }
            }
        }

        task.abort();
    }
}
