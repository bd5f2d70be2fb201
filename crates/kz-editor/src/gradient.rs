//! On-canvas gradient handles.
//!
//! Handle positions are derived from the element's box and its
//! `style.gradient`; dragging a handle produces a new `Gradient` and nothing
//! else. Geometry is never touched.
//!
//! Angles use the canvas convention: `atan2(dy, dx)` with y pointing down,
//! in degrees, normalized to `[0, 360)`. `Gradient::to_css` converts them to
//! CSS bearings, so the handles sit on the rendered gradient axis.

use kz_core::gradient::{Gradient, GradientKind};
use kz_core::model::{Bounds, DesignElement, Point};
use serde::Serialize;

pub const MIN_RADIUS: f32 = 0.1;
pub const MAX_RADIUS: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GradientHandle {
    /// Linear start point.
    Start,
    /// Linear end point.
    End,
    /// Radial or angular center.
    Center,
    Radius,
    /// Angular start direction.
    Angle,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HandlePos {
    pub handle: GradientHandle,
    pub position: Point,
}

/// Handles for `el`'s gradient. Empty when it has none.
pub fn handles(el: &DesignElement) -> Vec<HandlePos> {
    let Some(gradient) = el.style.gradient.as_ref() else {
        return Vec::new();
    };
    let b = el.bounds();
    let at = |handle, position| HandlePos { handle, position };

    match gradient.kind {
        GradientKind::Linear => {
            let c = b.center();
            let half = (b.width * b.width + b.height * b.height).sqrt() / 2.0;
            let (dx, dy) = direction(gradient.angle());
            vec![
                at(GradientHandle::Start, Point::new(c.x - dx * half, c.y - dy * half)),
                at(GradientHandle::End, Point::new(c.x + dx * half, c.y + dy * half)),
            ]
        }
        GradientKind::Radial => {
            let c = gradient_center(gradient, &b);
            let r = gradient.radius_px(b.width, b.height);
            vec![
                at(GradientHandle::Center, c),
                at(GradientHandle::Radius, Point::new(c.x + r, c.y)),
            ]
        }
        GradientKind::Angular => {
            let c = gradient_center(gradient, &b);
            let len = b.width.min(b.height) / 4.0;
            let (dx, dy) = direction(gradient.angle());
            vec![
                at(GradientHandle::Center, c),
                at(GradientHandle::Angle, Point::new(c.x + dx * len, c.y + dy * len)),
            ]
        }
    }
}

/// The handle within `radius` of `p`. Later handles win, matching paint
/// order of the overlay.
pub fn handle_at(el: &DesignElement, p: Point, radius: f32) -> Option<GradientHandle> {
    handles(el)
        .into_iter()
        .rev()
        .find(|h| h.position.distance(p) <= radius)
        .map(|h| h.handle)
}

/// The gradient after dragging `handle` to `p`. `None` when the element has
/// no gradient or the handle doesn't belong to its kind.
pub fn drag_handle(el: &DesignElement, handle: GradientHandle, p: Point) -> Option<Gradient> {
    let mut gradient = el.style.gradient.clone()?;
    let b = el.bounds();

    match (gradient.kind, handle) {
        (GradientKind::Linear, GradientHandle::End) => {
            gradient.angle = Some(angle_to(b.center(), p));
        }
        (GradientKind::Linear, GradientHandle::Start) => {
            gradient.angle = Some(normalize(angle_to(b.center(), p) + 180.0));
        }
        (GradientKind::Radial | GradientKind::Angular, GradientHandle::Center) => {
            let u = if b.width > 0.0 { (p.x - b.x) / b.width } else { 0.5 };
            let v = if b.height > 0.0 { (p.y - b.y) / b.height } else { 0.5 };
            gradient.position = Some(Point::new(u.clamp(0.0, 1.0), v.clamp(0.0, 1.0)));
        }
        (GradientKind::Radial, GradientHandle::Radius) => {
            let half = b.width.min(b.height) / 2.0;
            let r = if half > 0.0 {
                gradient_center(&gradient, &b).distance(p) / half
            } else {
                MAX_RADIUS
            };
            gradient.radius = Some(r.clamp(MIN_RADIUS, MAX_RADIUS));
        }
        (GradientKind::Angular, GradientHandle::Angle) => {
            gradient.angle = Some(angle_to(gradient_center(&gradient, &b), p));
        }
        _ => return None,
    }
    Some(gradient)
}

fn gradient_center(gradient: &Gradient, b: &Bounds) -> Point {
    let uv = gradient.center();
    Point::new(b.x + uv.x * b.width, b.y + uv.y * b.height)
}

fn direction(degrees: f32) -> (f32, f32) {
    let rad = degrees.to_radians();
    (rad.cos(), rad.sin())
}

fn angle_to(from: Point, to: Point) -> f32 {
    normalize((to.y - from.y).atan2(to.x - from.x).to_degrees())
}

fn normalize(degrees: f32) -> f32 {
    let a = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs.
    if a >= 360.0 { 0.0 } else { a }
}
