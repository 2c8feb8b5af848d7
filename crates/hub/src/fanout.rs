use pulse_core::{AggregateEvent, Metric};
use pulse_ingest::AggregateSink;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::warn;

/// Per-topic broadcast of aggregates to every connected viewer.
///
/// Delivery is at-most-once: a subscription only sees events published after
/// it was created, and a subscriber that falls more than `capacity` events
/// behind skips ahead instead of holding up the publisher.
#[derive(Debug, Clone)]
pub struct Hub {
    heart_rate: broadcast::Sender<AggregateEvent>,
    spo2:       broadcast::Sender<AggregateEvent>,
}

impl Hub {
    pub fn new(capacity: usize) -> Self {
        let (heart_rate, _) = broadcast::channel(capacity);
        let (spo2, _)       = broadcast::channel(capacity);
        Self { heart_rate, spo2 }
    }

    fn sender(&self, metric: Metric) -> &broadcast::Sender<AggregateEvent> {
        match metric {
            Metric::HeartRate => &self.heart_rate,
            Metric::Spo2      => &self.spo2,
        }
    }

    /// Publish `event` unchanged on its metric's topic.  Returns the number
    /// of subscriptions it was queued for.
    pub fn broadcast(&self, event: AggregateEvent) -> usize {
        self.sender(event.metric).send(event).unwrap_or(0)
    }

    /// Start receiving future events on `metric`'s topic.  Dropping the
    /// returned handle unsubscribes.
    pub fn subscribe(&self, metric: Metric) -> Subscription {
        Subscription {
            metric,
            rx: self.sender(metric).subscribe(),
        }
    }

    pub fn subscriber_count(&self, metric: Metric) -> usize {
        self.sender(metric).receiver_count()
    }
}

impl AggregateSink for Hub {
    fn publish(&self, event: AggregateEvent) {
        self.broadcast(event);
    }
}

/// Scoped subscription to one topic.
#[derive(Debug)]
pub struct Subscription {
    metric: Metric,
    rx:     broadcast::Receiver<AggregateEvent>,
}

impl Subscription {
    pub fn metric(&self) -> Metric {
        self.metric
    }

    /// Next event on this topic, or `None` once the hub is gone.
    ///
    /// Cancel-safe.
    pub async fn recv(&mut self) -> Option<AggregateEvent> {
        loop {
            match self.rx.recv().await {
                Ok(event) => return Some(event),
                Err(RecvError::Lagged(skipped)) => {
                    warn!(metric = %self.metric, skipped, "viewer lagging; dropped aggregates");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }
}

/// The topics one viewer currently listens to.
///
/// Subscribe and unsubscribe are idempotent: a second `subscribe` for the
/// same topic keeps the existing subscription, so events are never
/// delivered twice.
#[derive(Debug, Default)]
pub struct Session {
    heart_rate: Option<Subscription>,
    spo2:       Option<Subscription>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&mut self, metric: Metric) -> &mut Option<Subscription> {
        match metric {
            Metric::HeartRate => &mut self.heart_rate,
            Metric::Spo2      => &mut self.spo2,
        }
    }

    /// Returns `false` if the topic was already subscribed.
    pub fn subscribe(&mut self, hub: &Hub, metric: Metric) -> bool {
        let slot = self.slot(metric);
        if slot.is_some() {
            return false;
        }
        *slot = Some(hub.subscribe(metric));
        true
    }

    /// Returns `false` if the topic was not subscribed.
    pub fn unsubscribe(&mut self, metric: Metric) -> bool {
        self.slot(metric).take().is_some()
    }

    pub fn is_subscribed(&self, metric: Metric) -> bool {
        match metric {
            Metric::HeartRate => self.heart_rate.is_some(),
            Metric::Spo2      => self.spo2.is_some(),
        }
    }

    /// Next event on any subscribed topic.  Pends forever while nothing is
    /// subscribed; `None` once the hub is gone.
    ///
    /// Cancel-safe.
    pub async fn recv(&mut self) -> Option<AggregateEvent> {
        match (&mut self.heart_rate, &mut self.spo2) {
            (None, None) => std::future::pending().await,
            (Some(a), None) => a.recv().await,
            (None, Some(b)) => b.recv().await,
            (Some(a), Some(b)) => tokio::select! {
                event = a.recv() => event,
                event = b.recv() => event,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn event(metric: Metric, value: f64, tick: u64) -> AggregateEvent {
        AggregateEvent::new(metric, value, tick)
    }

    #[tokio::test]
    async fn every_subscriber_gets_the_event() {
        let hub = Hub::new(8);
        let mut a = hub.subscribe(Metric::HeartRate);
        let mut b = hub.subscribe(Metric::HeartRate);

        assert_eq!(hub.broadcast(event(Metric::HeartRate, 72.0, 1)), 2);
        assert_eq!(a.recv().await.unwrap().value, 72.0);
        assert_eq!(b.recv().await.unwrap().value, 72.0);
    }

    #[tokio::test]
    async fn topics_are_independent() {
        let hub = Hub::new(8);
        let mut spo2 = hub.subscribe(Metric::Spo2);

        hub.broadcast(event(Metric::HeartRate, 72.0, 1));
        hub.broadcast(event(Metric::Spo2, 98.0, 1));

        let got = spo2.recv().await.unwrap();
        assert_eq!(got.metric, Metric::Spo2);
        assert_eq!(got.value, 98.0);
    }

    #[tokio::test]
    async fn late_subscriber_misses_earlier_ticks() {
        let hub = Hub::new(8);
        hub.broadcast(event(Metric::HeartRate, 70.0, 1));

        let mut late = hub.subscribe(Metric::HeartRate);
        hub.broadcast(event(Metric::HeartRate, 71.0, 2));
        assert_eq!(late.recv().await.unwrap().tick, 2);
    }

    #[tokio::test]
    async fn dropping_a_subscription_unsubscribes() {
        let hub = Hub::new(8);
        let sub = hub.subscribe(Metric::Spo2);
        assert_eq!(hub.subscriber_count(Metric::Spo2), 1);
        drop(sub);
        assert_eq!(hub.subscriber_count(Metric::Spo2), 0);
        assert_eq!(hub.broadcast(event(Metric::Spo2, 97.0, 1)), 0);
    }

    #[tokio::test]
    async fn lagging_subscriber_skips_ahead() {
        let hub = Hub::new(2);
        let mut slow = hub.subscribe(Metric::HeartRate);
        for tick in 1..=5 {
            hub.broadcast(event(Metric::HeartRate, tick as f64, tick));
        }
        assert_eq!(slow.recv().await.unwrap().tick, 4);
        assert_eq!(slow.recv().await.unwrap().tick, 5);
    }

    #[tokio::test]
    async fn double_subscribe_does_not_duplicate() {
        let hub = Hub::new(8);
        let mut session = Session::new();
        assert!(session.subscribe(&hub, Metric::HeartRate));
        assert!(!session.subscribe(&hub, Metric::HeartRate));
        assert_eq!(hub.subscriber_count(Metric::HeartRate), 1);

        hub.broadcast(event(Metric::HeartRate, 72.0, 1));
        assert_eq!(session.recv().await.unwrap().tick, 1);

        let next = tokio::time::timeout(Duration::from_millis(50), session.recv()).await;
        assert!(next.is_err(), "event delivered twice");
    }

    #[tokio::test]
    async fn unsubscribe_is_idempotent() {
        let hub = Hub::new(8);
        let mut session = Session::new();
        session.subscribe(&hub, Metric::Spo2);
        assert!(session.unsubscribe(Metric::Spo2));
        assert!(!session.unsubscribe(Metric::Spo2));
        assert!(!session.is_subscribed(Metric::Spo2));
        assert_eq!(hub.subscriber_count(Metric::Spo2), 0);
    }

    #[tokio::test]
    async fn session_merges_both_topics() {
        let hub = Hub::new(8);
        let mut session = Session::new();
        session.subscribe(&hub, Metric::HeartRate);
        session.subscribe(&hub, Metric::Spo2);

        hub.broadcast(event(Metric::HeartRate, 72.0, 1));
        hub.broadcast(event(Metric::Spo2, f64::NAN, 1));

        let mut seen = vec![
            session.recv().await.unwrap().metric,
            session.recv().await.unwrap().metric,
        ];
        seen.sort_by_key(|m| m.topic());
        assert_eq!(seen, vec![Metric::HeartRate, Metric::Spo2]);
    }
}
