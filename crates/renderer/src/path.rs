use std::fmt::Write as _;

/// Horizontal easing divisor: each control point sits `dx / CONTROL_DIVISOR`
/// away from its endpoint.
pub const CONTROL_DIVISOR: f64 = 1.8;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    MoveTo(Point),
    CubicTo {
        control_a: Point,
        control_b: Point,
        to:        Point,
    },
}

/// Smooth curve through a sequence of points.
///
/// Segments are cubic Béziers whose control points keep their endpoint's `y`
/// and are pulled horizontally toward each other, which eases the curve in x
/// while hitting every sample exactly.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CurvePath {
    commands: Vec<PathCommand>,
}

impl CurvePath {
    /// `None` for an empty point list.
    pub fn through(points: &[Point]) -> Option<Self> {
        let (first, rest) = points.split_first()?;

        let mut commands = Vec::with_capacity(points.len());
        commands.push(PathCommand::MoveTo(*first));

        let mut prev = *first;
        for &p in rest {
            let dx = (p.x - prev.x) / CONTROL_DIVISOR;
            commands.push(PathCommand::CubicTo {
                control_a: Point::new(prev.x + dx, prev.y),
                control_b: Point::new(p.x - dx, p.y),
                to:        p,
            });
            prev = p;
        }

        Some(Self { commands })
    }

    pub fn commands(&self) -> &[PathCommand] {
        &self.commands
    }

    /// SVG path data with two decimals, e.g. `M0.00,37.50 C…`.
    pub fn to_svg(&self) -> String {
        let mut d = String::new();
        for (i, cmd) in self.commands.iter().enumerate() {
            if i > 0 {
                d.push(' ');
            }
            // Writing to a String cannot fail.
            let _ = match cmd {
                PathCommand::MoveTo(p) => write!(d, "M{:.2},{:.2}", p.x, p.y),
                PathCommand::CubicTo { control_a: a, control_b: b, to } => write!(
                    d,
                    "C{:.2},{:.2} {:.2},{:.2} {:.2},{:.2}",
                    a.x, a.y, b.x, b.y, to.x, to.y
                ),
            };
        }
        d
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_has_no_path() {
        assert!(CurvePath::through(&[]).is_none());
    }

    #[test]
    fn control_points_ease_horizontally() {
        let path = CurvePath::through(&[Point::new(0.0, 10.0), Point::new(18.0, 40.0)]).unwrap();
        assert_eq!(
            path.commands()[1],
            PathCommand::CubicTo {
                control_a: Point::new(10.0, 10.0),
                control_b: Point::new(8.0, 40.0),
                to:        Point::new(18.0, 40.0),
            }
        );
    }

    #[test]
    fn svg_output() {
        let path = CurvePath::through(&[Point::new(0.0, 37.5), Point::new(9.0, 0.0)]).unwrap();
        assert_eq!(path.to_svg(), "M0.00,37.50 C5.00,37.50 4.00,0.00 9.00,0.00");
    }
}
