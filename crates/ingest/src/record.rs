use pulse_core::{Metric, PulseError, RawSample, Result};
use serde_json::Value;

/// Parse one upstream line into raw samples.
///
/// A line is either a single record (`{"bpm": 71.0, "spo2": 97}`) or a batch
/// (`[{..}, {..}]`).  Every record yields one sample per metric; a missing,
/// `null`, or non-numeric field becomes a sample without a value, which the
/// validator later drops.
pub fn parse_line(line: &str) -> Result<Vec<RawSample>> {
    let value: Value = serde_json::from_str(line)
        .map_err(|e| PulseError::Ingest(format!("malformed record: {e}")))?;

    match value {
        Value::Object(_) => Ok(samples_from_record(&value).collect()),
        Value::Array(records) => {
            let mut samples = Vec::with_capacity(records.len() * Metric::ALL.len());
            for record in &records {
                if !record.is_object() {
                    return Err(PulseError::Ingest(format!(
                        "batch entry is not a record: {record}"
                    )));
                }
                samples.extend(samples_from_record(record));
            }
            Ok(samples)
        }
        other => Err(PulseError::Ingest(format!("expected record or batch, got {other}"))),
    }
}

fn samples_from_record(record: &Value) -> impl Iterator<Item = RawSample> + '_ {
    Metric::ALL
        .into_iter()
        .map(move |metric| RawSample::new(metric, record.get(metric.field()).and_then(Value::as_f64)))
}
