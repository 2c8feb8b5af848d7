//! Canvas program that paints one [`ChartFrame`].

use pulse_renderer::{layout, ChartSpec, PathCommand, Viewport};
use pulse_theme::Color;
use iced::widget::canvas::{self, Frame, Geometry, LineCap, LineJoin, Path, Stroke, Text};
use iced::{mouse, Pixels, Point, Rectangle, Renderer, Theme, Vector};

/// Room on the left for axis labels.
const LEFT_MARGIN: f32 = 40.0;
/// Top and bottom breathing room so the curve stroke is never clipped.
const TOP_MARGIN: f32 = 16.0;
/// Left edge of the axis labels.
const LABEL_X: f32 = 4.0;
/// Where gridlines start, just right of the labels.
const GRID_X: f32 = 36.0;
const LABEL_SIZE: f32 = 12.0;
const DOT_RADIUS: f32 = 4.0;

/// Geometry inputs for one redraw.  Built fresh from the window on every view.
#[derive(Debug, Clone)]
pub struct Plot {
    pub values:     Vec<f64>,
    pub spec:       ChartSpec,
    pub accent:     Color,
    pub foreground: Color,
}

impl Plot {
    /// Plot area inside `bounds` after the label and edge margins.
    pub fn viewport(bounds: Rectangle) -> Viewport {
        Viewport::new(
            f64::from(bounds.width - LEFT_MARGIN - TOP_MARGIN),
            f64::from(bounds.height - 2.0 * TOP_MARGIN),
        )
    }
}

impl<Message> canvas::Program<Message> for Plot {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());
        let chart = layout(&self.values, &self.spec, Self::viewport(bounds));

        let grid = Stroke::default()
            .with_color(self.accent.with_alpha(0.8).to_iced())
            .with_width(2.0);
        for line in &chart.gridlines {
            let y = line.y as f32 + TOP_MARGIN;
            frame.stroke(
                &Path::line(Point::new(GRID_X, y), Point::new(bounds.width, y)),
                grid,
            );
            frame.fill_text(Text {
                content: line.label(),
                position: Point::new(LABEL_X, y - LABEL_SIZE / 2.0),
                color: self.foreground.to_iced(),
                size: Pixels(LABEL_SIZE),
                ..Text::default()
            });
        }

        if let Some(curve) = &chart.path {
            let path = Path::new(|b| {
                for cmd in curve.commands() {
                    match *cmd {
                        PathCommand::MoveTo(p) => b.move_to(to_iced(p)),
                        PathCommand::CubicTo { control_a, control_b, to } => {
                            b.bezier_curve_to(to_iced(control_a), to_iced(control_b), to_iced(to));
                        }
                    }
                }
            });
            let line = Stroke::default()
                .with_color(self.foreground.to_iced())
                .with_width(2.0)
                .with_line_cap(LineCap::Round)
                .with_line_join(LineJoin::Round);

            frame.with_save(|f| {
                f.translate(Vector::new(LEFT_MARGIN, TOP_MARGIN));
                f.stroke(&path, line);
                if let Some(last) = chart.last_point() {
                    let dot = Path::circle(Point::new(last.x as f32, last.y as f32), DOT_RADIUS);
                    f.fill(&dot, self.foreground.to_iced());
                }
            });
        }

        vec![frame.into_geometry()]
    }
}

fn to_iced(p: pulse_renderer::Point) -> Point {
    Point::new(p.x as f32, p.y as f32)
}
