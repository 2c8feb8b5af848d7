use crate::event::Metric;

/// A raw value as handed over by the upstream source.
///
/// `value` is `None` when the field was absent, `null`, or not a number.
/// Never stored; it is validated and either buffered or dropped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawSample {
    pub metric: Metric,
    pub value: Option<f64>,
}

impl RawSample {
    pub fn new(metric: Metric, value: Option<f64>) -> Self {
        Self { metric, value }
    }

    pub fn validate(&self) -> Result<f64, Rejected> {
        validate(self.value)
    }
}

/// Marker for a sample that failed validation.  Not an error: rejected
/// samples are dropped without retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rejected;

/// Accept only present, finite numbers.
pub fn validate(raw: Option<f64>) -> Result<f64, Rejected> {
    match raw {
        Some(v) if v.is_finite() => Ok(v),
        _ => Err(Rejected),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_finite_numbers() {
        assert_eq!(validate(Some(72.0)), Ok(72.0));
        assert_eq!(validate(Some(0.0)), Ok(0.0));
        assert_eq!(validate(Some(-3.5)), Ok(-3.5));
    }

    #[test]
    fn rejects_absent_and_non_finite() {
        assert_eq!(validate(None), Err(Rejected));
        assert_eq!(validate(Some(f64::NAN)), Err(Rejected));
        assert_eq!(validate(Some(f64::INFINITY)), Err(Rejected));
        assert_eq!(validate(Some(f64::NEG_INFINITY)), Err(Rejected));
    }

    #[test]
    fn raw_sample_delegates() {
        assert_eq!(RawSample::new(Metric::Spo2, Some(97.0)).validate(), Ok(97.0));
        assert_eq!(RawSample::new(Metric::Spo2, None).validate(), Err(Rejected));
    }
}
