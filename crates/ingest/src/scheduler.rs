use crate::buffer::{mean, IngestionBuffer};
use pulse_core::{AggregateEvent, Metric, RawSample};
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, trace};

/// Receives one aggregate per metric per tick.
///
/// Implementations must not block: the tick loop calls `publish` inline.
pub trait AggregateSink: Send + 'static {
    fn publish(&self, event: AggregateEvent);
}

impl AggregateSink for mpsc::UnboundedSender<AggregateEvent> {
    fn publish(&self, event: AggregateEvent) {
        let _ = self.send(event);
    }
}

impl AggregateSink for broadcast::Sender<AggregateEvent> {
    fn publish(&self, event: AggregateEvent) {
        // No receivers is the normal "nobody watching" case.
        let _ = self.send(event);
    }
}

/// Per-metric ingestion buffers plus the tick counter.
///
/// Appends and drains both take `&mut self`, so a drain can never interleave
/// with an append.
#[derive(Debug)]
pub struct Aggregator {
    heart_rate: IngestionBuffer,
    spo2:       IngestionBuffer,
    tick:       u64,
    rejected:   u64,
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl Aggregator {
    pub fn new() -> Self {
        Self {
            heart_rate: IngestionBuffer::new(Metric::HeartRate),
            spo2:       IngestionBuffer::new(Metric::Spo2),
            tick:       0,
            rejected:   0,
        }
    }

    fn buffer_mut(&mut self, metric: Metric) -> &mut IngestionBuffer {
        match metric {
            Metric::HeartRate => &mut self.heart_rate,
            Metric::Spo2      => &mut self.spo2,
        }
    }

    /// Validate and buffer one raw sample.  Returns `false` if it was dropped.
    pub fn ingest(&mut self, sample: RawSample) -> bool {
        match sample.validate() {
            Ok(value) => {
                self.buffer_mut(sample.metric).push(value);
                true
            }
            Err(_) => {
                self.rejected += 1;
                trace!(metric = %sample.metric, "dropped invalid sample");
                false
            }
        }
    }

    /// Buffer every sample of one upstream delivery.  Returns how many were
    /// kept.
    pub fn ingest_batch(&mut self, batch: impl IntoIterator<Item = RawSample>) -> usize {
        batch.into_iter().filter(|&sample| self.ingest(sample)).count()
    }

    /// Drain every buffer and produce exactly one aggregate per metric.
    pub fn tick(&mut self) -> [AggregateEvent; 2] {
        self.tick += 1;
        let tick = self.tick;
        Metric::ALL.map(|metric| {
            let drained = self.buffer_mut(metric).drain();
            let value = mean(&drained);
            debug!(%metric, tick, samples = drained.len(), value, "aggregated");
            AggregateEvent::new(metric, value, tick)
        })
    }

    /// Ticks fired so far.
    pub fn ticks(&self) -> u64 {
        self.tick
    }

    /// Samples dropped by validation so far.
    pub fn rejected(&self) -> u64 {
        self.rejected
    }
}

/// Spawn the aggregation scheduler.
///
/// The task owns the [`Aggregator`]; raw samples reach it over `samples`,
/// one upstream delivery per message, so a delivery always lands in a
/// single tick.
/// Every `period` it drains both buffers and hands the aggregates to `sink`.
/// The tick keeps firing after every sample sender is gone, emitting `NaN`
/// aggregates, until the returned handle is aborted.
pub fn spawn_aggregator<S: AggregateSink>(
    period: Duration,
    mut samples: mpsc::Receiver<Vec<RawSample>>,
    sink: S,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut aggregator = Aggregator::new();
        let mut ticker = time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut upstream_open = true;

        info!("Aggregating every {} ms", period.as_millis());

        loop {
            tokio::select! {
                // Ticks win ties so a flood of samples cannot stall the stream.
                biased;

                _ = ticker.tick() => {
                    for event in aggregator.tick() {
                        sink.publish(event);
                    }
                }
                batch = samples.recv(), if upstream_open => match batch {
                    Some(batch) => {
                        aggregator.ingest_batch(batch);
                    }
                    None => {
                        info!("Upstream closed; emitting no-data aggregates");
                        upstream_open = false;
                    }
                },
            }
        }
    })
}
