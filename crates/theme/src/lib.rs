pub mod colors;
pub mod style;

pub use colors::Color;
pub use style::GraphStyle;

use pulse_config::{PulseConfig, ThemeConfig};
use pulse_core::Metric;

/// Compiled theme derived from [`PulseConfig`].
///
/// All colors are pre-parsed from hex strings into normalised `[0, 1]` RGBA.
/// Calling [`Theme::from_config`] is infallible; invalid color strings fall
/// back to safe defaults.
#[derive(Debug, Clone)]
pub struct Theme {
    pub background:    Color,
    pub foreground:    Color,
    pub font_size:     f32,
    pub border_radius: f32,
    pub padding:       u16,
    pub gap:           u16,
    pub chart_height:  f32,
    pub heart_rate_accent: Color,
    pub spo2_accent:       Color,
}

impl Theme {
    /// Build a [`Theme`] from the `[theme]` section and the per-graph accents.
    pub fn from_config(cfg: &PulseConfig) -> Self {
        let t: &ThemeConfig = &cfg.theme;
        Self {
            background:    Color::from_hex(&t.background).unwrap_or(Color::BLACK),
            foreground:    Color::from_hex(&t.foreground).unwrap_or(Color::WHITE),
            font_size:     t.font_size,
            border_radius: t.border_radius,
            padding:       t.padding,
            gap:           t.gap,
            chart_height:  t.chart_height,
            heart_rate_accent: Color::from_hex(&cfg.heart_rate.accent).unwrap_or(Color::RED),
            spo2_accent:       Color::from_hex(&cfg.spo2.accent).unwrap_or(Color::GREEN),
        }
    }

    pub fn accent(&self, metric: Metric) -> Color {
        match metric {
            Metric::HeartRate => self.heart_rate_accent,
            Metric::Spo2      => self.spo2_accent,
        }
    }

    /// Styling for the graph card of `metric`.
    pub fn graph_style(&self, metric: Metric) -> GraphStyle {
        GraphStyle {
            accent:          self.accent(metric),
            plot_background: self.background,
            foreground:      self.foreground,
            loading_dim:     0.2,
            border_radius:   self.border_radius,
            font_size:       self.font_size,
            chart_height:    self.chart_height,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::from_config(&PulseConfig::default())
    }
}
