//! Line protocol between the relay and its viewers.
//!
//! Viewer → relay: `subscribe <topic>` / `unsubscribe <topic>`.
//! Relay → viewer: `<topic>>><json>`, e.g. `bpm-data>>{"bpm":72.0}`.
//! A no-data aggregate travels as JSON `null` and decodes back to `NaN`.

use pulse_core::{Metric, PulseError, Reading, Result};
use serde_json::{Map, Value};

/// Commands a viewer sends to the relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Subscribe(Metric),
    Unsubscribe(Metric),
}

impl Command {
    pub fn encode(self) -> String {
        match self {
            Command::Subscribe(m)   => format!("subscribe {}", m.topic()),
            Command::Unsubscribe(m) => format!("unsubscribe {}", m.topic()),
        }
    }
}

/// Parse a viewer command line.
pub fn parse_command(line: &str) -> Result<Command> {
    let Some((verb, topic)) = line.trim().split_once(' ') else {
        return Err(PulseError::Protocol(format!("malformed command: {line:?}")));
    };
    let metric = Metric::from_topic(topic.trim())
        .ok_or_else(|| PulseError::Protocol(format!("unknown topic: {topic:?}")))?;

    match verb {
        "subscribe"   => Ok(Command::Subscribe(metric)),
        "unsubscribe" => Ok(Command::Unsubscribe(metric)),
        _ => Err(PulseError::Protocol(format!("unknown command: {verb:?}"))),
    }
}

/// Encode one aggregate as a topic line (without the trailing newline).
pub fn encode_event(reading: Reading) -> String {
    let value = if reading.value.is_finite() {
        Value::from(reading.value)
    } else {
        Value::Null
    };
    let mut payload = Map::new();
    payload.insert(reading.metric.field().to_string(), value);
    format!("{}>>{}", reading.metric.topic(), Value::Object(payload))
}

/// Parse a topic line received from the relay.
pub fn parse_event(line: &str) -> Result<Reading> {
    let Some((topic, data)) = line.split_once(">>") else {
        return Err(PulseError::Protocol(format!("malformed event: {line:?}")));
    };
    let metric = Metric::from_topic(topic)
        .ok_or_else(|| PulseError::Protocol(format!("unknown topic: {topic:?}")))?;

    let payload: Value = serde_json::from_str(data)
        .map_err(|e| PulseError::Protocol(format!("bad payload for {topic}: {e}")))?;

    let value = match payload.get(metric.field()) {
        Some(Value::Null) => f64::NAN,
        Some(v) => v
            .as_f64()
            .ok_or_else(|| PulseError::Protocol(format!("non-numeric {topic} payload: {data}")))?,
        None => {
            return Err(PulseError::Protocol(format!(
                "{topic} payload lacks \"{}\"",
                metric.field()
            )))
        }
    };

    Ok(Reading { metric, value })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_topic_payload() {
        let line = encode_event(Reading { metric: Metric::HeartRate, value: 72.0 });
        assert_eq!(line, r#"bpm-data>>{"bpm":72.0}"#);

        let line = encode_event(Reading { metric: Metric::Spo2, value: 97.5 });
        assert_eq!(line, r#"spo2-data>>{"spo2":97.5}"#);
    }

    #[test]
    fn nan_travels_as_null() {
        let line = encode_event(Reading { metric: Metric::HeartRate, value: f64::NAN });
        assert_eq!(line, r#"bpm-data>>{"bpm":null}"#);
        assert!(parse_event(&line).unwrap().is_no_data());
    }

    #[test]
    fn parses_events() {
        let reading = parse_event(r#"spo2-data>>{"spo2":98}"#).unwrap();
        assert_eq!(reading, Reading { metric: Metric::Spo2, value: 98.0 });
    }

    #[test]
    fn rejects_bad_events() {
        assert!(parse_event("bpm-data").is_err());
        assert!(parse_event(r#"temp-data>>{"temp":1}"#).is_err());
        assert!(parse_event(r#"bpm-data>>{"spo2":98}"#).is_err());
        assert!(parse_event(r#"bpm-data>>{"bpm":"72"}"#).is_err());
    }

    #[test]
    fn parses_commands() {
        assert_eq!(
            parse_command("subscribe bpm-data").unwrap(),
            Command::Subscribe(Metric::HeartRate)
        );
        assert_eq!(
            parse_command(&Command::Unsubscribe(Metric::Spo2).encode()).unwrap(),
            Command::Unsubscribe(Metric::Spo2)
        );
        assert!(parse_command("subscribe").is_err());
        assert!(parse_command("publish bpm-data").is_err());
        assert!(parse_command("subscribe temp-data").is_err());
    }
}
