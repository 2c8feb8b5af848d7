//! Chart geometry for the live graphs.
//!
//! Pure functions from a rolling window plus a viewport size to an immutable
//! [`ChartFrame`]: plotted points, a smoothed curve, and axis gridlines.
//! Drawing the frame is left to `pulse-widgets`.

pub mod geometry;
pub mod path;

pub use geometry::{layout, ChartFrame, ChartPoint, Gridline};
pub use path::{CurvePath, PathCommand, Point};

use pulse_config::GraphConfig;
use pulse_core::RollingWindow;

/// Plot area size in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Viewport {
    pub width:  f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// `true` when there is no area to draw into.
    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }
}

/// Static per-chart layout parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartSpec {
    /// Lower bound the vertical axis never rises above.
    pub base_min:    f64,
    /// Upper bound the vertical axis never drops below.
    pub base_max:    f64,
    /// Slots across the full chart width.
    pub max_points:  usize,
    pub label_count: usize,
}

impl ChartSpec {
    pub fn from_config(cfg: &GraphConfig) -> Self {
        Self {
            base_min:    cfg.base_min,
            base_max:    cfg.base_max,
            max_points:  cfg.max_points,
            label_count: cfg.label_count,
        }
    }
}

/// [`layout`] over a window's current snapshot.
pub fn layout_window(window: &RollingWindow, spec: &ChartSpec, viewport: Viewport) -> ChartFrame {
    layout(&window.snapshot(), spec, viewport)
}
