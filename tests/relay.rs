//! End-to-end: upstream intake → aggregation → fan-out → viewer windows.

use pulse_config::{GraphConfig, RelayConfig, SourceKind};
use pulse_core::{AppState, Metric, Reading};
use pulse_hub::{Relay, RelayConnection};
use pulse_renderer::{layout_window, ChartSpec, Viewport};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::time::timeout;

fn local_config(source: SourceKind) -> RelayConfig {
    RelayConfig {
        tick_ms: 200,
        listen: "127.0.0.1:0".into(),
        intake: "127.0.0.1:0".into(),
        source,
        channel_capacity: 16,
    }
}

async fn viewer_for(relay: &Relay, metric: Metric) -> RelayConnection {
    let mut conn = RelayConnection::connect(&relay.viewer_addr().to_string())
        .await
        .unwrap();
    conn.subscribe(metric).await.unwrap();
    while relay.hub().subscriber_count(metric) == 0 {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    conn
}

async fn next(conn: &mut RelayConnection) -> Reading {
    timeout(Duration::from_secs(5), conn.next_reading())
        .await
        .expect("relay went quiet")
        .unwrap()
        .expect("relay hung up")
}

#[tokio::test]
async fn samples_within_a_tick_arrive_as_their_mean() {
    let relay = Relay::start(&local_config(SourceKind::Intake)).await.unwrap();
    let mut viewer = viewer_for(&relay, Metric::HeartRate).await;

    let mut device = TcpStream::connect(relay.intake_addr().unwrap()).await.unwrap();
    device
        .write_all(b"[{\"bpm\":70},{\"bpm\":72,\"spo2\":null},{\"bpm\":74}]\n")
        .await
        .unwrap();

    let mut reading = next(&mut viewer).await;
    while reading.is_no_data() {
        reading = next(&mut viewer).await;
    }
    assert_eq!(reading.metric, Metric::HeartRate);
    assert_eq!(reading.value, 72.0);

    // Buffer was drained; the following tick has nothing to average.
    assert!(next(&mut viewer).await.is_no_data());

    relay.shutdown();
}

#[tokio::test]
async fn one_large_delivery_is_averaged_in_one_tick() {
    let relay = Relay::start(&RelayConfig { tick_ms: 50, ..local_config(SourceKind::Intake) })
        .await
        .unwrap();
    let mut viewer = viewer_for(&relay, Metric::HeartRate).await;

    let records: Vec<String> = (0..20_000)
        .map(|i| format!("{{\"bpm\":{}}}", if i < 10_000 { 0 } else { 100 }))
        .collect();
    let line = format!("[{}]\n", records.join(","));
    let mut device = TcpStream::connect(relay.intake_addr().unwrap()).await.unwrap();
    device.write_all(line.as_bytes()).await.unwrap();

    let mut reading = next(&mut viewer).await;
    while reading.is_no_data() {
        reading = next(&mut viewer).await;
    }
    assert_eq!(reading.value, 50.0);
    for _ in 0..3 {
        assert!(next(&mut viewer).await.is_no_data(), "delivery split across ticks");
    }

    relay.shutdown();
}

#[tokio::test]
async fn invalid_samples_never_reach_viewers() {
    let relay = Relay::start(&local_config(SourceKind::Intake)).await.unwrap();
    let mut viewer = viewer_for(&relay, Metric::Spo2).await;

    let mut device = TcpStream::connect(relay.intake_addr().unwrap()).await.unwrap();
    device
        .write_all(b"{\"spo2\":\"high\"}\n{\"spo2\":null}\n")
        .await
        .unwrap();

    for _ in 0..3 {
        let reading = next(&mut viewer).await;
        assert_eq!(reading.metric, Metric::Spo2);
        assert!(reading.is_no_data());
    }

    relay.shutdown();
}

#[tokio::test]
async fn simulated_source_feeds_both_topics() {
    let relay = Relay::start(&local_config(SourceKind::Simulated)).await.unwrap();
    assert!(relay.intake_addr().is_none());

    let mut bpm = viewer_for(&relay, Metric::HeartRate).await;
    let mut spo2 = viewer_for(&relay, Metric::Spo2).await;

    let mut state = AppState::default();
    for conn in [&mut bpm, &mut spo2] {
        loop {
            let reading = next(conn).await;
            state.apply(reading);
            if !reading.is_no_data() {
                break;
            }
        }
    }

    let hr = state.heart_rate.latest().unwrap();
    let ox = state.spo2.latest().unwrap();
    assert!((80.0..=120.0).contains(&hr), "bpm {hr}");
    assert!((95.0..=99.0).contains(&ox), "spo2 {ox}");

    relay.shutdown();
}

#[test]
fn received_readings_drive_the_chart() {
    let mut state = AppState::default();
    state.apply(Reading { metric: Metric::HeartRate, value: 85.0 });

    let spec = ChartSpec::from_config(&GraphConfig::heart_rate());
    let frame = layout_window(&state.heart_rate, &spec, Viewport::new(100.0, 100.0));
    assert_eq!(frame.points.len(), 1);
    assert_eq!((frame.points[0].x, frame.points[0].y), (0.0, 37.5));
    assert_eq!(frame.gridlines.len(), 10);

    state.apply(Reading { metric: Metric::HeartRate, value: f64::NAN });
    assert!(!state.heart_rate.is_valid());
    let frame = layout_window(&state.heart_rate, &spec, Viewport::new(100.0, 100.0));
    assert_eq!(frame.points.len(), 1, "no-data slot is not plotted");
}
