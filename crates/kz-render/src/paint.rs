//! Element store → flat display list.
//!
//! Roots are painted in z-order; each element is followed by its children,
//! also in z-order. Clipping containers scope their whole subtree: the clip
//! carried by an item is the intersection of every clipping ancestor.

use kz_core::ElementStore;
use kz_core::id::ElementId;
use kz_core::model::{Bounds, Point, ShapeKind};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClipRect {
    pub bounds: Bounds,
    /// Some clipping ancestor is a circle; the renderer clips to its ellipse.
    pub circle: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaintItem {
    pub id: ElementId,
    /// Nesting depth; roots are 0.
    pub depth: usize,
    pub bounds: Bounds,
    /// Position relative to the parent's top-left (equal to `bounds` origin
    /// for roots).
    pub offset: Point,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clip: Option<ClipRect>,
}

/// Display list in paint order (first item painted first).
pub fn paint_order(store: &ElementStore) -> Vec<PaintItem> {
    let mut out = Vec::with_capacity(store.len());
    for root in store.children_of(None) {
        walk(store, root, 0, None, None, &mut out);
    }
    log::trace!("paint list: {} items", out.len());
    out
}

fn walk(
    store: &ElementStore,
    id: ElementId,
    depth: usize,
    parent: Option<Bounds>,
    clip: Option<ClipRect>,
    out: &mut Vec<PaintItem>,
) {
    let Some(el) = store.get(id) else { return };
    let bounds = el.bounds();
    let offset = match parent {
        Some(p) => Point::new(bounds.x - p.x, bounds.y - p.y),
        None => Point::new(bounds.x, bounds.y),
    };
    out.push(PaintItem {
        id,
        depth,
        bounds,
        offset,
        clip,
    });

    let child_clip = if el.clip {
        let circle = el.shape_kind == Some(ShapeKind::Circle);
        Some(match clip {
            Some(outer) => ClipRect {
                bounds: outer
                    .bounds
                    .intersection(&bounds)
                    .unwrap_or(Bounds::new(bounds.x, bounds.y, 0.0, 0.0)),
                circle: outer.circle || circle,
            },
            None => ClipRect { bounds, circle },
        })
    } else {
        clip
    };

    // Bounded by store size in case of corrupted nesting.
    if depth > store.len() {
        return;
    }
    for child in store.children(id) {
        walk(store, child, depth + 1, Some(bounds), child_clip, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kz_core::model::{DesignElement, ElementKind};
    use pretty_assertions::assert_eq;

    fn id(s: &str) -> ElementId {
        ElementId::intern(s)
    }

    #[test]
    fn children_follow_their_parent() {
        let mut store = ElementStore::new();
        store.create(DesignElement::new(id("po-frame"), ElementKind::Box, Bounds::new(10.0, 10.0, 100.0, 100.0)));
        store.create(DesignElement::new(id("po-top"), ElementKind::Box, Bounds::new(0.0, 0.0, 5.0, 5.0)));
        store.create(
            DesignElement::new(id("po-kid"), ElementKind::Text, Bounds::new(30.0, 40.0, 20.0, 20.0))
                .with_parent(id("po-frame")),
        );

        let list = paint_order(&store);
        let ids: Vec<&str> = list.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["po-frame", "po-kid", "po-top"]);
        assert_eq!(list[1].depth, 1);
        assert_eq!(list[1].offset, Point::new(20.0, 30.0));
        assert_eq!(list[1].clip, None);
    }

    #[test]
    fn nested_clips_intersect() {
        let mut store = ElementStore::new();
        let mut outer = DesignElement::new(id("pc-outer"), ElementKind::Box, Bounds::new(0.0, 0.0, 100.0, 100.0));
        outer.clip = true;
        let mut inner = DesignElement::new(id("pc-inner"), ElementKind::Box, Bounds::new(50.0, 50.0, 100.0, 100.0))
            .with_parent(id("pc-outer"));
        inner.clip = true;
        inner.shape_kind = Some(ShapeKind::Circle);
        store.create(outer);
        store.create(inner);
        store.create(
            DesignElement::new(id("pc-img"), ElementKind::Image, Bounds::new(60.0, 60.0, 200.0, 200.0))
                .with_parent(id("pc-inner")),
        );

        let list = paint_order(&store);
        assert_eq!(
            list[1].clip,
            Some(ClipRect {
                bounds: Bounds::new(0.0, 0.0, 100.0, 100.0),
                circle: false
            })
        );
        assert_eq!(
            list[2].clip,
            Some(ClipRect {
                bounds: Bounds::new(50.0, 50.0, 50.0, 50.0),
                circle: true
            })
        );
    }
}
