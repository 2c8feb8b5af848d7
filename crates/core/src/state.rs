use crate::event::{Metric, Reading};
use std::collections::VecDeque;

/// Number of aggregates each viewer keeps per metric.
pub const DEFAULT_CAPACITY: usize = 20;

/// Central viewer state. Every graph widget reads from this snapshot.
#[derive(Debug, Clone)]
pub struct AppState {
    pub heart_rate: RollingWindow,
    pub spo2: RollingWindow,
    /// Whether the relay connection is currently up.
    pub connected: bool,
}

impl AppState {
    pub fn with_capacity(heart_rate: usize, spo2: usize) -> Self {
        Self {
            heart_rate: RollingWindow::new(Metric::HeartRate, heart_rate),
            spo2: RollingWindow::new(Metric::Spo2, spo2),
            connected: false,
        }
    }

    pub fn window(&self, metric: Metric) -> &RollingWindow {
        match metric {
            Metric::HeartRate => &self.heart_rate,
            Metric::Spo2      => &self.spo2,
        }
    }

    pub fn window_mut(&mut self, metric: Metric) -> &mut RollingWindow {
        match metric {
            Metric::HeartRate => &mut self.heart_rate,
            Metric::Spo2      => &mut self.spo2,
        }
    }

    /// Route a received aggregate into the matching window.
    pub fn apply(&mut self, reading: Reading) {
        self.window_mut(reading.metric).append(reading.value);
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY, DEFAULT_CAPACITY)
    }
}

/// Bounded FIFO history of aggregates for one metric.
///
/// `NaN` entries are kept as no-data markers; they make the window invalid
/// while they are the latest value but never clear older history.
#[derive(Debug, Clone)]
pub struct RollingWindow {
    metric: Metric,
    capacity: usize,
    values: VecDeque<f64>,
}

impl RollingWindow {
    pub fn new(metric: Metric, capacity: usize) -> Self {
        Self {
            metric,
            capacity,
            values: VecDeque::with_capacity(capacity + 1),
        }
    }

    pub fn metric(&self) -> Metric {
        self.metric
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Push a new aggregate, evicting the oldest once over capacity.
    pub fn append(&mut self, value: f64) {
        self.values.push_back(value);
        while self.values.len() > self.capacity {
            self.values.pop_front();
        }
    }

    /// Copy of the current sequence, oldest first.
    pub fn snapshot(&self) -> Vec<f64> {
        self.values.iter().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().copied()
    }

    /// Most recent aggregate, which may be the `NaN` marker.
    pub fn latest(&self) -> Option<f64> {
        self.values.back().copied()
    }

    /// `false` while the window is empty or its latest value is `NaN`.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.latest().is_some_and(f64::is_finite)
    }
}
