//! Interaction sessions: one per pointer gesture.
//!
//! A `Session` is created on pointer-down and owned by the editor as an
//! `Option`. Pointer-up (or a blur) `take()`s it, so a finished gesture
//! can never leak into the next one. Everything recorded at gesture start
//! (initial positions, initial boxes) stays fixed for the session's
//! lifetime; each move recomputes from those, never from the previous
//! frame.

use crate::config::EditorConfig;
use crate::gradient::GradientHandle;
use crate::tools::ToolKind;
use kz_core::grid::{Axis, GridConfig, snap};
use kz_core::model::{Bounds, Constraint, ElementPatch, Point};
use kz_core::{ElementId, ElementStore, Mutation};

/// The eight compass handles around a selection box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handle {
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
    NW,
}

impl Handle {
    pub const ALL: [Handle; 8] = [
        Handle::NW,
        Handle::N,
        Handle::NE,
        Handle::E,
        Handle::SE,
        Handle::S,
        Handle::SW,
        Handle::W,
    ];

    pub fn north(self) -> bool {
        matches!(self, Handle::N | Handle::NE | Handle::NW)
    }

    pub fn south(self) -> bool {
        matches!(self, Handle::S | Handle::SE | Handle::SW)
    }

    pub fn east(self) -> bool {
        matches!(self, Handle::E | Handle::NE | Handle::SE)
    }

    pub fn west(self) -> bool {
        matches!(self, Handle::W | Handle::NW | Handle::SW)
    }

    /// Where this handle sits on `b`.
    pub fn position(self, b: &Bounds) -> Point {
        let x = if self.west() {
            b.x
        } else if self.east() {
            b.right()
        } else {
            b.x + b.width / 2.0
        };
        let y = if self.north() {
            b.y
        } else if self.south() {
            b.bottom()
        } else {
            b.y + b.height / 2.0
        };
        Point::new(x, y)
    }

    /// The handle within `radius` of `p`, corners first.
    pub fn at(b: &Bounds, p: Point, radius: f32) -> Option<Handle> {
        Self::ALL
            .into_iter()
            .find(|h| h.position(b).distance(p) <= radius)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Gesture {
    /// Pan follows the raw screen delta.
    Panning { start_pan: Point },
    /// Every dragged element with its position at gesture start.
    Dragging { origins: Vec<(ElementId, Point)> },
    Resizing {
        handle: Handle,
        /// The box being resized: the element itself, or the selection's
        /// union box.
        initial: Bounds,
        members: Vec<(ElementId, Bounds)>,
        /// Single element carrying the aspect-ratio constraint.
        locked: bool,
    },
    Marquee {
        current: Point,
        additive: bool,
        /// Selection before the press, restored when the marquee is cancelled.
        prior: Vec<ElementId>,
    },
    Creating { tool: ToolKind, current: Point },
    GradientHandle { id: ElementId, handle: GradientHandle },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub start_screen: Point,
    pub start_canvas: Point,
    pub gesture: Gesture,
}

impl Session {
    pub fn new(start_screen: Point, start_canvas: Point, gesture: Gesture) -> Self {
        Self {
            start_screen,
            start_canvas,
            gesture,
        }
    }

    /// The rubber-band rectangle, while marquee-selecting.
    pub fn marquee_rect(&self) -> Option<Bounds> {
        match self.gesture {
            Gesture::Marquee { current, .. } => Some(Bounds::from_corners(self.start_canvas, current)),
            _ => None,
        }
    }
}

/// Start a drag of `selection`. Elements nested under another selected
/// element ride along with their ancestor and are not moved twice.
pub fn drag_origins(store: &ElementStore, selection: &[ElementId]) -> Vec<(ElementId, Point)> {
    selection
        .iter()
        .filter(|&&id| !store.ancestors(id).iter().any(|a| selection.contains(a)))
        .filter_map(|&id| store.get(id).map(|e| (id, Point::new(e.x, e.y))))
        .collect()
}

/// Moves for a drag by `delta` (canvas units) from the recorded origins.
/// Each element snaps per its own constraints. With `constrain`, only the
/// dominant axis moves.
pub fn drag_mutations(
    store: &ElementStore,
    grid: &GridConfig,
    origins: &[(ElementId, Point)],
    delta: Point,
    constrain: bool,
) -> Vec<Mutation> {
    let (dx, dy) = if constrain {
        if delta.x.abs() >= delta.y.abs() {
            (delta.x, 0.0)
        } else {
            (0.0, delta.y)
        }
    } else {
        (delta.x, delta.y)
    };

    origins
        .iter()
        .filter_map(|&(id, origin)| {
            let el = store.get(id)?;
            let mut x = origin.x + dx;
            let mut y = origin.y + dy;
            if el.has_constraint(Constraint::GridSnap) {
                x = snap(x, Axis::X, grid);
            }
            if el.has_constraint(Constraint::BaselineSnap) {
                y = snap(y, Axis::Y, grid);
            }
            (x != el.x || y != el.y).then(|| Mutation::move_to(id, x, y))
        })
        .collect()
}

/// New box for a handle drag by `delta`. With `lock` the initial aspect
/// ratio is kept and the anchored edge stays put when growing from a north
/// or west handle.
pub fn resized_bounds(initial: Bounds, handle: Handle, delta: Point, lock: bool, min: f32) -> Bounds {
    let mut w = initial.width;
    let mut h = initial.height;
    if handle.east() {
        w += delta.x;
    } else if handle.west() {
        w -= delta.x;
    }
    if handle.south() {
        h += delta.y;
    } else if handle.north() {
        h -= delta.y;
    }

    if lock && initial.height > 0.0 {
        let ratio = initial.width / initial.height;
        if handle.east() || handle.west() {
            h = w / ratio;
        } else {
            w = h * ratio;
        }
    }
    w = w.max(min);
    h = h.max(min);

    let x = if handle.west() {
        initial.right() - w
    } else {
        initial.x
    };
    let y = if handle.north() {
        initial.bottom() - h
    } else {
        initial.y
    };
    Bounds::new(x, y, w, h)
}

/// Updates for a resize. A single element gets its new box directly (the
/// store cascades into its children); a multi-selection is scaled about the
/// union box's origin with the same factors.
pub fn resize_mutations(
    initial: Bounds,
    members: &[(ElementId, Bounds)],
    next: Bounds,
) -> Vec<Mutation> {
    if let [(id, _)] = members {
        return vec![Mutation::Update {
            id: *id,
            patch: ElementPatch::bounds(next),
        }];
    }
    let sx = next.width / initial.width;
    let sy = next.height / initial.height;
    members
        .iter()
        .map(|&(id, b)| Mutation::Update {
            id,
            patch: ElementPatch::bounds(Bounds::new(
                next.x + (b.x - initial.x) * sx,
                next.y + (b.y - initial.y) * sy,
                b.width * sx,
                b.height * sy,
            )),
        })
        .collect()
}

/// Ghost rectangle of a creation drag. Shift forces a square using the
/// larger side, anchored at the press point and grown toward the pointer.
pub fn creation_rect(start: Point, current: Point, square: bool) -> Bounds {
    if !square {
        return Bounds::from_corners(start, current);
    }
    let (dx, dy) = (current.x - start.x, current.y - start.y);
    let side = dx.abs().max(dy.abs());
    let x = if dx < 0.0 { start.x - side } else { start.x };
    let y = if dy < 0.0 { start.y - side } else { start.y };
    Bounds::new(x, y, side, side)
}

/// Final box for a finished creation drag: the dragged box when it beats
/// the click threshold, otherwise the tool's default size at the start
/// point. The origin is snapped to the grid.
pub fn creation_bounds(
    tool: ToolKind,
    start: Point,
    current: Point,
    square: bool,
    grid: &GridConfig,
    config: &EditorConfig,
) -> Bounds {
    let dragged = creation_rect(start, current, square);
    let (x, y, w, h) = if dragged.width > config.click_threshold
        && dragged.height > config.click_threshold
    {
        (dragged.x, dragged.y, dragged.width, dragged.height)
    } else {
        let (w, h) = match tool {
            ToolKind::Type => config.text_size,
            _ => config.shape_size,
        };
        (start.x, start.y, w, h)
    };
    Bounds::new(snap(x, Axis::X, grid), snap(y, Axis::Y, grid), w, h)
}
