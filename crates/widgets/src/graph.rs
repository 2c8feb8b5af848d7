use crate::plot::Plot;
use crate::readout::header_text;
use pulse_config::GraphConfig;
use pulse_core::{event::Message, state::AppState, Metric, RollingWindow};
use pulse_renderer::ChartSpec;
use pulse_theme::{Color, Theme};
use iced::{
    widget::{canvas, column, container, text},
    Background, Border, Element, Length,
};

/// Live chart card for one metric: a `Title: value unit` header over the
/// smoothed curve of the rolling window.
///
/// While the readout is `--` (no data yet, or the newest tick was empty) the
/// card is dimmed as a loading hint.
#[derive(Debug, Clone)]
pub struct GraphWidget {
    metric: Metric,
    title:  String,
    unit:   String,
    spec:   ChartSpec,
}

impl GraphWidget {
    pub fn new(metric: Metric, cfg: &GraphConfig) -> Self {
        Self {
            metric,
            title: cfg.title.clone(),
            unit:  cfg.unit.clone(),
            spec:  ChartSpec::from_config(cfg),
        }
    }

    pub fn metric(&self) -> Metric {
        self.metric
    }

    pub fn header(&self, window: &RollingWindow) -> String {
        header_text(&self.title, window, &self.unit)
    }

    pub fn view<'a>(&'a self, state: &'a AppState, theme: &'a Theme) -> Element<'a, Message> {
        let window = state.window(self.metric);
        let style = theme.graph_style(self.metric);
        let loading = !state.connected || !window.is_valid();

        let dim = |c: Color| if loading { c.darken(style.loading_dim) } else { c };
        let card_bg = dim(style.accent);
        let plot_bg = dim(style.plot_background);
        let fg = dim(style.foreground);

        let plot = canvas(Plot {
            values:     window.snapshot(),
            spec:       self.spec,
            accent:     dim(style.accent),
            foreground: fg,
        })
        .width(Length::Fill)
        .height(Length::Fixed(style.chart_height));

        let radius = style.border_radius;
        let chart = container(plot).style(move |_| container::Style {
            background: Some(Background::Color(plot_bg.to_iced())),
            border: Border {
                radius: radius.into(),
                ..Border::default()
            },
            ..container::Style::default()
        });

        let header = container(
            text(self.header(window))
                .size(style.font_size)
                .color(fg.to_iced()),
        )
        .padding([4, 12]);

        container(column![header, chart].spacing(4))
            .padding(4)
            .width(Length::Fill)
            .style(move |_| container::Style {
                background: Some(Background::Color(card_bg.to_iced())),
                border: Border {
                    radius: radius.into(),
                    ..Border::default()
                },
                ..container::Style::default()
            })
            .into()
    }
}
