//! A pen that collects outlines into a quadratic-only [`BezPath`]

use kurbo::{BezPath, CubicBez, Point};
use skrifa::outline::OutlinePen;

/// Maximum distance, in font units, between a cubic and its quadratic
/// approximation. Matches the tolerance fontmake uses for cu2qu.
const CUBIC_TOLERANCE: f64 = 1.0;

/// Collects drawing commands into a [`BezPath`] that `glyf` can encode.
///
/// Quadratic and line segments are kept as they are; cubic segments (from
/// CFF sources) are approximated by quadratics.
#[derive(Debug, Default)]
pub struct QuadPathPen {
    path: BezPath,
    current: Point,
}

fn as_kurbo_point(x: f32, y: f32) -> Point {
    Point {
        x: x as f64,
        y: y as f64,
    }
}

impl QuadPathPen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_inner(self) -> BezPath {
        self.path
    }
}

impl OutlinePen for QuadPathPen {
    fn move_to(&mut self, x: f32, y: f32) {
        self.current = as_kurbo_point(x, y);
        self.path.move_to(self.current);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.current = as_kurbo_point(x, y);
        self.path.line_to(self.current);
    }

    fn quad_to(&mut self, cx0: f32, cy0: f32, x: f32, y: f32) {
        self.current = as_kurbo_point(x, y);
        self.path.quad_to(as_kurbo_point(cx0, cy0), self.current);
    }

    fn curve_to(&mut self, cx0: f32, cy0: f32, cx1: f32, cy1: f32, x: f32, y: f32) {
        let cubic = CubicBez::new(
            self.current,
            as_kurbo_point(cx0, cy0),
            as_kurbo_point(cx1, cy1),
            as_kurbo_point(x, y),
        );
        for (_, _, quad) in cubic.to_quads(CUBIC_TOLERANCE) {
            self.path.quad_to(quad.p1, quad.p2);
        }
        self.current = cubic.p3;
    }

    fn close(&mut self) {
        self.path.close_path();
    }
}

#[cfg(test)]
mod tests {
    use kurbo::{PathEl, Shape};

    use super::*;

    #[test]
    fn keeps_quadratics() {
        let mut pen = QuadPathPen::new();
        pen.move_to(0.0, 0.0);
        pen.line_to(100.0, 0.0);
        pen.quad_to(100.0, 100.0, 0.0, 100.0);
        pen.close();
        let path = pen.into_inner();
        assert_eq!(
            path.elements(),
            &[
                PathEl::MoveTo((0.0, 0.0).into()),
                PathEl::LineTo((100.0, 0.0).into()),
                PathEl::QuadTo((100.0, 100.0).into(), (0.0, 100.0).into()),
                PathEl::ClosePath,
            ]
        );
    }

    #[test]
    fn cubics_become_quadratics() {
        let mut pen = QuadPathPen::new();
        pen.move_to(0.0, 0.0);
        pen.curve_to(0.0, 500.0, 500.0, 500.0, 500.0, 0.0);
        pen.close();
        let path = pen.into_inner();
        assert!(path
            .elements()
            .iter()
            .all(|el| !matches!(el, PathEl::CurveTo(..))));
        // the approximation ends exactly on the cubic's end point
        let last = path
            .elements()
            .iter()
            .rev()
            .find_map(|el| match el {
                PathEl::QuadTo(_, p) => Some(*p),
                _ => None,
            })
            .unwrap();
        assert!((last - Point::new(500.0, 0.0)).hypot() < 1e-9);
        let bounds = path.bounding_box();
        assert!((bounds.max_y() - 375.0).abs() <= CUBIC_TOLERANCE);
    }
}
