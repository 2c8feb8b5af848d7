use crate::colors::Color;

/// Visual settings for one graph card, passed to the graph widget's `view()`.
#[derive(Debug, Clone)]
pub struct GraphStyle {
    /// Card background; also used for gridlines.
    pub accent: Color,
    /// Plot area background.
    pub plot_background: Color,
    /// Curve, label and title color.
    pub foreground: Color,
    /// Black overlay opacity applied to the card while the readout is loading.
    pub loading_dim: f32,
    pub border_radius: f32,
    pub font_size: f32,
    pub chart_height: f32,
}
