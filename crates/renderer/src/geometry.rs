use crate::path::{CurvePath, Point};
use crate::{ChartSpec, Viewport};

/// One plotted sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartPoint {
    pub x: f64,
    pub y: f64,
    pub value: f64,
}

/// Horizontal gridline with its axis label value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gridline {
    pub value: f64,
    pub y: f64,
}

impl Gridline {
    /// Axis label text: the value rounded to a whole number.
    pub fn label(&self) -> String {
        format!("{}", self.value.round())
    }
}

/// Everything needed to draw one chart at one viewport size.
///
/// Frames are rebuilt from scratch for every window or viewport change.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartFrame {
    pub viewport: Viewport,
    pub domain_min: f64,
    pub domain_max: f64,
    pub points: Vec<ChartPoint>,
    /// `None` when there is nothing to draw a curve through.
    pub path: Option<CurvePath>,
    pub gridlines: Vec<Gridline>,
}

impl ChartFrame {
    /// Most recent plotted point, where the "live" marker goes.
    pub fn last_point(&self) -> Option<&ChartPoint> {
        self.points.last()
    }

    #[must_use]
    pub fn has_curve(&self) -> bool {
        self.path.is_some()
    }
}

/// Map the most recent values of a window onto a viewport.
///
/// `NaN` entries keep their horizontal slot but are neither plotted nor
/// counted toward the domain.  The domain always contains
/// `[spec.base_min, spec.base_max]` and grows to fit outliers.
pub fn layout(values: &[f64], spec: &ChartSpec, viewport: Viewport) -> ChartFrame {
    let max_points = spec.max_points.max(1);
    let recent = &values[values.len().saturating_sub(max_points)..];

    let (domain_min, domain_max) = recent
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold((spec.base_min, spec.base_max), |(lo, hi), v| (lo.min(v), hi.max(v)));

    let mut frame = ChartFrame {
        viewport,
        domain_min,
        domain_max,
        points: Vec::new(),
        path: None,
        gridlines: Vec::new(),
    };

    let span = domain_max - domain_min;
    if viewport.is_empty() || span <= 0.0 || !span.is_finite() {
        return frame;
    }

    let Viewport { width, height } = viewport;
    let to_y = |v: f64| height - ((v - domain_min) / span).clamp(0.0, 1.0) * height;

    frame.gridlines = label_values(domain_min, domain_max, spec.label_count)
        .map(|value| Gridline { value, y: to_y(value) })
        .collect();

    let step_x = if recent.len() == 1 || max_points == 1 {
        0.0
    } else {
        width / (max_points - 1) as f64
    };

    frame.points = recent
        .iter()
        .enumerate()
        .filter(|(_, v)| v.is_finite())
        .map(|(i, &value)| ChartPoint {
            x: i as f64 * step_x,
            y: to_y(value),
            value,
        })
        .collect();

    let anchors: Vec<Point> = frame.points.iter().map(|p| Point::new(p.x, p.y)).collect();
    frame.path = CurvePath::through(&anchors);
    frame
}

/// `count` values evenly spaced over `[min, max]`, both ends included.
fn label_values(min: f64, max: f64, count: usize) -> impl Iterator<Item = f64> {
    let step = if count > 1 {
        (max - min) / (count - 1) as f64
    } else {
        0.0
    };
    (0..count).map(move |i| if i + 1 == count && count > 1 { max } else { min + i as f64 * step })
}
