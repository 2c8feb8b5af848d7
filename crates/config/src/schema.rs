use pulse_core::{Metric, PulseError, Result, DEFAULT_CAPACITY};
use serde::{Deserialize, Deserializer, Serialize};

/// Root configuration structure parsed from `pulse.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PulseConfig {
    /// Relay (server side) settings.
    pub relay: RelayConfig,
    /// Viewer (client side) connection settings.
    pub viewer: ViewerConfig,
    /// Heart-rate graph.
    #[serde(deserialize_with = "heart_rate_graph")]
    pub heart_rate: GraphConfig,
    /// Blood-oxygen graph.
    #[serde(deserialize_with = "spo2_graph")]
    pub spo2: GraphConfig,
    /// Theme / visual settings.
    pub theme: ThemeConfig,
}

impl Default for PulseConfig {
    fn default() -> Self {
        Self {
            relay: RelayConfig::default(),
            viewer: ViewerConfig::default(),
            heart_rate: GraphConfig::heart_rate(),
            spo2: GraphConfig::spo2(),
            theme: ThemeConfig::default(),
        }
    }
}

impl PulseConfig {
    pub fn graph(&self, metric: Metric) -> &GraphConfig {
        match metric {
            Metric::HeartRate => &self.heart_rate,
            Metric::Spo2      => &self.spo2,
        }
    }

    /// Reject values the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.relay.tick_ms == 0 {
            return Err(PulseError::Config("relay.tick_ms must be positive".into()));
        }
        if self.relay.channel_capacity == 0 {
            return Err(PulseError::Config(
                "relay.channel_capacity must be positive".into(),
            ));
        }
        for metric in Metric::ALL {
            let graph = self.graph(metric);
            if !(graph.base_min.is_finite() && graph.base_max.is_finite())
                || graph.base_min > graph.base_max
            {
                return Err(PulseError::Config(format!(
                    "{metric}: base_min must not exceed base_max"
                )));
            }
            if graph.max_points == 0 || graph.capacity == 0 {
                return Err(PulseError::Config(format!(
                    "{metric}: max_points and capacity must be positive"
                )));
            }
        }
        Ok(())
    }
}

/// Where the relay gets raw samples from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// JSON-lines records pushed over TCP by a device bridge.
    #[default]
    Intake,
    /// Built-in random generator, for running without hardware.
    Simulated,
}

/// Relay settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Aggregation tick period in milliseconds.
    pub tick_ms: u64,
    /// Address viewers connect to.
    pub listen: String,
    /// Address the upstream intake listens on.
    pub intake: String,
    pub source: SourceKind,
    /// Per-topic broadcast buffer; viewers further behind than this skip ahead.
    pub channel_capacity: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            tick_ms: 1_000,
            listen: "0.0.0.0:3000".to_string(),
            intake: "0.0.0.0:3001".to_string(),
            source: SourceKind::Intake,
            channel_capacity: 64,
        }
    }
}

/// Viewer connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Relay address to connect to.
    pub server: String,
    /// Delay between reconnect attempts, in seconds.
    pub reconnect_secs: u64,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            server: "127.0.0.1:3000".to_string(),
            reconnect_secs: 2,
        }
    }
}

/// Per-metric graph settings.
///
/// Each metric has its own defaults, so a partial `[spo2]` section only
/// overrides the keys it names.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphConfig {
    pub title: String,
    /// Unit suffix shown after the readout, e.g. `"BPM"`.
    pub unit: String,
    /// Lower end of the vertical axis before any outlier expands it.
    pub base_min: f64,
    /// Upper end of the vertical axis before any outlier expands it.
    pub base_max: f64,
    /// Number of axis labels / gridlines.
    pub label_count: usize,
    /// Points plotted across the full chart width.
    pub max_points: usize,
    /// Rolling window capacity.
    pub capacity: usize,
    /// Accent color (hex).
    pub accent: String,
}

impl GraphConfig {
    pub fn heart_rate() -> Self {
        Self {
            title:       "Heart Rate".to_string(),
            unit:        "BPM".to_string(),
            base_min:    60.0,
            base_max:    100.0,
            label_count: 10,
            max_points:  20,
            capacity:    DEFAULT_CAPACITY,
            accent:      "#ff0000".to_string(),
        }
    }

    pub fn spo2() -> Self {
        Self {
            title:       "Blood Oxygen Level".to_string(),
            unit:        "%".to_string(),
            base_min:    80.0,
            base_max:    100.0,
            label_count: 5,
            max_points:  20,
            capacity:    DEFAULT_CAPACITY,
            accent:      "#008000".to_string(),
        }
    }
}

/// Keys present in a graph section; everything else keeps the metric default.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct GraphOverrides {
    title:       Option<String>,
    unit:        Option<String>,
    base_min:    Option<f64>,
    base_max:    Option<f64>,
    label_count: Option<usize>,
    max_points:  Option<usize>,
    capacity:    Option<usize>,
    accent:      Option<String>,
}

impl GraphOverrides {
    fn apply(self, base: GraphConfig) -> GraphConfig {
        GraphConfig {
            title:       self.title.unwrap_or(base.title),
            unit:        self.unit.unwrap_or(base.unit),
            base_min:    self.base_min.unwrap_or(base.base_min),
            base_max:    self.base_max.unwrap_or(base.base_max),
            label_count: self.label_count.unwrap_or(base.label_count),
            max_points:  self.max_points.unwrap_or(base.max_points),
            capacity:    self.capacity.unwrap_or(base.capacity),
            accent:      self.accent.unwrap_or(base.accent),
        }
    }
}

fn heart_rate_graph<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<GraphConfig, D::Error> {
    GraphOverrides::deserialize(d).map(|o| o.apply(GraphConfig::heart_rate()))
}

fn spo2_graph<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<GraphConfig, D::Error> {
    GraphOverrides::deserialize(d).map(|o| o.apply(GraphConfig::spo2()))
}

/// Theme / styling configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    /// Window background color (hex, e.g. `"#000000"`).
    pub background: String,
    /// Text, curve and label color.
    pub foreground: String,
    /// Font size for graph titles, in points.
    pub font_size: f32,
    /// Corner radius for graph containers (pixels).
    pub border_radius: f32,
    /// Inner padding for each graph (pixels).
    pub padding: u16,
    /// Gap between graphs (pixels).
    pub gap: u16,
    /// Height of the plotting area (pixels).
    pub chart_height: f32,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            background:    "#000000".to_string(),
            foreground:    "#ffffff".to_string(),
            font_size:     24.0,
            border_radius: 16.0,
            padding:       8,
            gap:           16,
            chart_height:  256.0,
        }
    }
}
