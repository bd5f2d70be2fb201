//! Path elements → `kurbo::BezPath`.
//!
//! Each segment runs from point `i` to `i + 1`. The leaving point's
//! `control2` and the arriving point's `control1` pick the segment type:
//! both present is a cubic, one present is a quadratic, none is a line.

use kurbo::{BezPath, Point as KPoint};
use kz_core::model::{DesignElement, ElementKind, PathPoint};

/// Absolute-space outline of a path element. `None` for non-path elements
/// and paths with fewer than two points.
pub fn path_geometry(el: &DesignElement) -> Option<BezPath> {
    if el.kind != ElementKind::Path || el.points.len() < 2 {
        return None;
    }
    let (ox, oy) = (el.x as f64, el.y as f64);
    let abs = |x: f32, y: f32| KPoint::new(ox + x as f64, oy + y as f64);

    let pts = &el.points;
    let mut path = BezPath::new();
    path.move_to(abs(pts[0].x, pts[0].y));
    for pair in pts.windows(2) {
        segment(&mut path, &pair[0], &pair[1], &abs);
    }
    if el.is_closed {
        if let (Some(last), Some(first)) = (pts.last(), pts.first()) {
            segment(&mut path, last, first, &abs);
        }
        path.close_path();
    }
    Some(path)
}

fn segment(path: &mut BezPath, from: &PathPoint, to: &PathPoint, abs: &impl Fn(f32, f32) -> KPoint) {
    let end = abs(to.x, to.y);
    match (from.control2, to.control1) {
        (Some(c1), Some(c2)) => path.curve_to(abs(c1.x, c1.y), abs(c2.x, c2.y), end),
        (Some(c), None) | (None, Some(c)) => path.quad_to(abs(c.x, c.y), end),
        (None, None) => path.line_to(end),
    }
}
