use pulse_core::Metric;

/// Valid samples for one metric collected since the last tick.
///
/// Owned by the aggregation scheduler; never read except through
/// [`IngestionBuffer::drain`].
#[derive(Debug, Clone)]
pub struct IngestionBuffer {
    metric:  Metric,
    pending: Vec<f64>,
}

impl IngestionBuffer {
    pub fn new(metric: Metric) -> Self {
        Self {
            metric,
            pending: Vec::new(),
        }
    }

    pub fn metric(&self) -> Metric {
        self.metric
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn push(&mut self, value: f64) {
        self.pending.push(value);
    }

    /// Take every pending sample and leave an empty buffer behind.
    pub fn drain(&mut self) -> Vec<f64> {
        std::mem::take(&mut self.pending)
    }
}

/// Arithmetic mean, or `NaN` for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}
