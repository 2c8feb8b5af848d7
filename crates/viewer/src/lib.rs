//! Desktop viewer for the pulse relay.
//!
//! Owns the Iced application loop and one background task: the relay client,
//! which subscribes to both topics and feeds readings into the rolling
//! windows.  Each reading triggers a redraw of its graph.

use futures::channel::mpsc::Sender;
use futures::SinkExt;
use iced::{
    widget::{column, container},
    Element, Length, Size, Subscription, Task,
};
use pulse_config::{default_path, load as load_config, PulseConfig};
use pulse_core::{event::Message, state::AppState, Metric};
use pulse_hub::RelayClient;
use pulse_theme::Theme;
use pulse_widgets::GraphWidget;
use std::sync::OnceLock;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Configuration shared by the window and the relay subscription, read once.
fn config() -> &'static PulseConfig {
    static CONFIG: OnceLock<PulseConfig> = OnceLock::new();
    CONFIG.get_or_init(|| {
        load_config(default_path()).unwrap_or_else(|e| {
            warn!("Config unusable, falling back to defaults: {e}");
            PulseConfig::default()
        })
    })
}

/// Start the viewer window.  Returns when the window is closed.
pub fn run() -> iced::Result {
    iced::application(Viewer::new, Viewer::update, Viewer::view)
        .title("Pulse")
        .subscription(Viewer::subscription)
        .style(Viewer::style)
        .window_size(Size::new(720.0, 720.0))
        .run()
}

struct Viewer {
    state:      AppState,
    config:     PulseConfig,
    theme:      Theme,
    heart_rate: GraphWidget,
    spo2:       GraphWidget,
}

impl Viewer {
    fn new() -> (Self, Task<Message>) {
        (Self::from_config(config().clone()), Task::none())
    }

    fn from_config(config: PulseConfig) -> Self {
        Self {
            state:      AppState::with_capacity(config.heart_rate.capacity, config.spo2.capacity),
            theme:      Theme::from_config(&config),
            heart_rate: GraphWidget::new(Metric::HeartRate, &config.heart_rate),
            spo2:       GraphWidget::new(Metric::Spo2, &config.spo2),
            config,
        }
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Reading(reading) => {
                debug!(metric = %reading.metric, value = reading.value, "reading");
                self.state.apply(reading);
            }
            Message::Connected => {
                info!("Receiving from {}", self.config.viewer.server);
                self.state.connected = true;
            }
            Message::Disconnected => {
                self.state.connected = false;
            }
        }
        Task::none()
    }

    fn view(&self) -> Element<'_, Message> {
        let gap = f32::from(self.theme.gap);

        let graphs = column![
            self.spo2.view(&self.state, &self.theme),
            self.heart_rate.view(&self.state, &self.theme),
        ]
        .spacing(gap);

        container(graphs)
            .padding(self.theme.padding)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    fn subscription(&self) -> Subscription<Message> {
        Subscription::run(relay_stream)
    }

    fn style(&self, _theme: &iced::Theme) -> iced::theme::Style {
        iced::theme::Style {
            background_color: self.theme.background.to_iced(),
            text_color:       self.theme.foreground.to_iced(),
        }
    }
}

/// Keeps a relay connection open and forwards its bus messages.
///
/// The function pointer doubles as the subscription's identity, so Iced keeps
/// a single connection alive across redraws.
fn relay_stream() -> impl iced::futures::Stream<Item = Message> {
    iced::stream::channel(32, |sender: Sender<Message>| async move {
        let viewer = &config().viewer;
        let client = RelayClient::new(
            viewer.server.clone(),
            Duration::from_secs(viewer.reconnect_secs),
        );

        if !forward(client.spawn_listener(), sender).await {
            return; // window gone
        }

        // Listener only stops once its receiver is gone; stall rather than
        // restart the subscription.
        loop {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
    })
}

/// Pass relay messages on to the window, waiting while its queue is full so
/// no reading or connection change is lost.  `false` once the window has
/// stopped listening.
async fn forward(mut rx: mpsc::Receiver<Message>, mut sender: Sender<Message>) -> bool {
    while let Some(msg) = rx.recv().await {
        if sender.send(msg).await.is_err() {
            debug!("Viewer closed; stopping relay forwarding");
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulse_core::Reading;

    fn viewer() -> Viewer {
        let mut config = PulseConfig::default();
        config.spo2.capacity = 3;
        Viewer::from_config(config)
    }

    #[test]
    fn readings_land_in_their_window() {
        let mut v = viewer();
        let _ = v.update(Message::Connected);
        let _ = v.update(Message::Reading(Reading { metric: Metric::HeartRate, value: 72.0 }));
        let _ = v.update(Message::Reading(Reading { metric: Metric::Spo2, value: 98.0 }));

        assert!(v.state.connected);
        assert_eq!(v.state.heart_rate.snapshot(), vec![72.0]);
        assert_eq!(v.state.spo2.snapshot(), vec![98.0]);
    }

    #[test]
    fn window_capacity_comes_from_config() {
        let mut v = viewer();
        for value in [95.0, 96.0, 97.0, 98.0] {
            let _ = v.update(Message::Reading(Reading { metric: Metric::Spo2, value }));
        }
        assert_eq!(v.state.spo2.snapshot(), vec![96.0, 97.0, 98.0]);
    }

    #[tokio::test]
    async fn full_window_queue_loses_no_state_changes() {
        let (tx, rx) = mpsc::channel(8);
        tx.send(Message::Connected).await.unwrap();
        for value in [70.0, 71.0, 72.0] {
            let reading = Reading { metric: Metric::HeartRate, value };
            tx.send(Message::Reading(reading)).await.unwrap();
        }
        tx.send(Message::Disconnected).await.unwrap();
        drop(tx);

        // Zero buffer: every send beyond the sender's own slot must wait.
        let (sender, receiver) = futures::channel::mpsc::channel(0);
        let pump = tokio::spawn(forward(rx, sender));
        let got: Vec<Message> = futures::StreamExt::collect(receiver).await;

        assert!(pump.await.unwrap());
        assert_eq!(got.len(), 5);
        assert!(matches!(got.first(), Some(Message::Connected)));
        assert!(matches!(got.last(), Some(Message::Disconnected)));
    }

    #[test]
    fn disconnect_keeps_history() {
        let mut v = viewer();
        let _ = v.update(Message::Connected);
        let _ = v.update(Message::Reading(Reading { metric: Metric::HeartRate, value: 70.0 }));
        let _ = v.update(Message::Disconnected);
        assert!(!v.state.connected);
        assert_eq!(v.state.heart_rate.len(), 1);
    }
}
