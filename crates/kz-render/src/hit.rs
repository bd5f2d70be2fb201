//! Hit testing: point → element lookup.
//!
//! Walks the paint order backwards (front-to-back). Children are tested
//! before their parent, and a clipping parent rejects points outside its
//! shape for its whole subtree.

use crate::paint::paint_order;
use crate::path::path_geometry;
use kurbo::{Affine, Point as KPoint, Shape};
use kz_core::ElementStore;
use kz_core::id::ElementId;
use kz_core::model::{Bounds, DesignElement, ElementKind, Point, ShapeKind};

/// Find the topmost element under `p` (artboard space).
/// Returns `None` on empty canvas.
pub fn hit_test(store: &ElementStore, p: Point) -> Option<ElementId> {
    let roots = store.children_of(None);
    roots
        .iter()
        .rev()
        .find_map(|&root| hit_node(store, root, p, 0))
}

fn hit_node(store: &ElementStore, id: ElementId, p: Point, depth: usize) -> Option<ElementId> {
    let el = store.get(id)?;
    if el.clip && !contains(el, p) {
        return None;
    }
    if depth <= store.len() {
        let children = store.children(id);
        if let Some(hit) = children
            .iter()
            .rev()
            .find_map(|&c| hit_node(store, c, p, depth + 1))
        {
            return Some(hit);
        }
    }
    contains(el, p).then_some(id)
}

/// Shape-aware containment: circles test their ellipse, closed paths their
/// fill, and rotated elements are tested in their own unrotated frame.
pub fn contains(el: &DesignElement, p: Point) -> bool {
    let p = unrotate(el, p);
    let b = el.bounds();
    match (el.kind, el.shape_kind) {
        (ElementKind::Box, Some(ShapeKind::Circle)) => {
            let c = b.center();
            let (rx, ry) = (b.width / 2.0, b.height / 2.0);
            let (dx, dy) = ((p.x - c.x) / rx, (p.y - c.y) / ry);
            dx * dx + dy * dy <= 1.0
        }
        (ElementKind::Path, _) if el.is_closed => path_geometry(el)
            .map(|bez| bez.contains(KPoint::new(p.x as f64, p.y as f64)))
            .unwrap_or_else(|| b.contains(p)),
        _ => b.contains(p),
    }
}

fn unrotate(el: &DesignElement, p: Point) -> Point {
    let Some(deg) = el.style.rotation.filter(|d| *d % 360.0 != 0.0) else {
        return p;
    };
    let c = el.bounds().center();
    let m = Affine::rotate_about(
        -(deg as f64).to_radians(),
        KPoint::new(c.x as f64, c.y as f64),
    );
    let q = m * KPoint::new(p.x as f64, p.y as f64);
    Point::new(q.x as f32, q.y as f32)
}

/// Every element whose bounds intersect `rect`, in paint order. Touching
/// edges count as intersecting. Used for marquee selection.
pub fn hit_test_rect(store: &ElementStore, rect: Bounds) -> Vec<ElementId> {
    paint_order(store)
        .into_iter()
        .filter(|item| item.bounds.intersects(&rect))
        .map(|item| item.id)
        .collect()
}
