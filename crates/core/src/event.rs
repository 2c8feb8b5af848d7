use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A physiological quantity relayed by the system.
///
/// Each metric has its own ingestion buffer on the relay and its own topic
/// on the viewer transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Heart rate in beats per minute.
    HeartRate,
    /// Blood oxygen saturation in percent.
    Spo2,
}

impl Metric {
    pub const ALL: [Metric; 2] = [Metric::HeartRate, Metric::Spo2];

    /// Topic name on the viewer transport, e.g. `"bpm-data"`.
    pub fn topic(self) -> &'static str {
        match self {
            Metric::HeartRate => "bpm-data",
            Metric::Spo2      => "spo2-data",
        }
    }

    /// Record field carrying this metric, both upstream and in topic payloads.
    pub fn field(self) -> &'static str {
        match self {
            Metric::HeartRate => "bpm",
            Metric::Spo2      => "spo2",
        }
    }

    /// Reverse of [`Metric::topic`].
    pub fn from_topic(topic: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.topic() == topic)
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.topic())
    }
}

/// One aggregate per metric per scheduler tick.
///
/// `value` is the mean of every valid sample drained during the tick, or
/// `NaN` when none arrived. `NaN` means "no data", never zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AggregateEvent {
    pub metric: Metric,
    pub value: f64,
    /// Monotonic scheduler tick counter, starting at 1.
    pub tick: u64,
    pub emitted_at: DateTime<Utc>,
}

impl AggregateEvent {
    pub fn new(metric: Metric, value: f64, tick: u64) -> Self {
        Self {
            metric,
            value,
            tick,
            emitted_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn is_no_data(&self) -> bool {
        self.value.is_nan()
    }

    /// The part of the event a viewer actually receives.
    pub fn reading(&self) -> Reading {
        Reading {
            metric: self.metric,
            value: self.value,
        }
    }
}

/// A single aggregate value as delivered to a viewer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    pub metric: Metric,
    pub value: f64,
}

impl Reading {
    #[must_use]
    pub fn is_no_data(&self) -> bool {
        self.value.is_nan()
    }
}

/// All messages that can flow through the viewer's event bus.
///
/// Sources:
/// - Relay connection   → `Reading`, `Connected`, `Disconnected`
#[derive(Debug, Clone)]
pub enum Message {
    /// An aggregate arrived on a subscribed topic.
    Reading(Reading),
    /// Connection to the relay (re-)established.
    Connected,
    /// Connection to the relay lost; a reconnect is pending.
    Disconnected,
}
