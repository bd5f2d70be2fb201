//! Pen tool: click to place anchors, drag to pull out a handle.
//!
//! Points are kept in canvas coordinates while authoring. On commit the
//! path becomes a `path` element whose box covers every anchor and control
//! point, and whose points are stored relative to that box's top-left.
//!
//! Handles are independent: dragging sets `control2` on the anchor being
//! placed and leaves `control1` alone. No smooth-anchor mirroring.

use crate::config::EditorConfig;
use kz_core::model::{Bounds, DesignElement, ElementKind, PathPoint, Point, Style};

/// Stroke given to freshly committed paths.
pub const PATH_STROKE: &str = "#2A4B8D";
pub const PATH_STROKE_WIDTH: f32 = 2.0;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PenTool {
    points: Vec<PathPoint>,
    /// Index of the anchor whose handle follows the pointer.
    dragging: Option<usize>,
}

impl PenTool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        !self.points.is_empty()
    }

    /// In-progress points, canvas space.
    pub fn preview(&self) -> &[PathPoint] {
        &self.points
    }

    /// Place an anchor, or close the path when `p` lands on the first one.
    /// Returns the committed element when this click closed the path.
    pub fn pointer_down(&mut self, p: Point, config: &EditorConfig) -> Option<DesignElement> {
        if let Some(first) = self.points.first()
            && first.position().distance(p) <= config.pen_close_tolerance
        {
            if self.points.len() >= 3 {
                return self.commit(true);
            }
            log::debug!("pen: close ignored, only {} points", self.points.len());
            return None;
        }
        self.points.push(PathPoint::anchor(p.x, p.y));
        self.dragging = Some(self.points.len() - 1);
        None
    }

    /// While the button is held, pull the outgoing handle of the last
    /// anchor. Inside the threshold the handle is removed again so a
    /// wobbly click stays a corner.
    pub fn pointer_move(&mut self, p: Point, config: &EditorConfig) -> bool {
        let Some(point) = self.dragging.and_then(|i| self.points.get_mut(i)) else {
            return false;
        };
        let next = (point.position().distance(p) > config.pen_handle_threshold).then_some(p);
        if point.control2 == next {
            return false;
        }
        point.control2 = next;
        true
    }

    pub fn pointer_up(&mut self) {
        self.dragging = None;
    }

    /// Finish the path. Fewer than two points is silently dropped.
    pub fn commit(&mut self, closed: bool) -> Option<DesignElement> {
        let points = std::mem::take(&mut self.points);
        self.dragging = None;
        if points.len() < 2 {
            if !points.is_empty() {
                log::debug!("pen: discarding single-point path");
            }
            return None;
        }
        Some(path_element(points, closed))
    }

    /// Remove the last anchor. A path that would be left with a single
    /// anchor is discarded entirely.
    pub fn undo_last(&mut self) -> bool {
        if self.points.is_empty() {
            return false;
        }
        self.points.pop();
        if self.points.len() <= 1 {
            self.discard();
        } else if self.dragging.is_some_and(|i| i >= self.points.len()) {
            self.dragging = None;
        }
        true
    }

    pub fn discard(&mut self) {
        self.points.clear();
        self.dragging = None;
    }
}

/// Box covering anchors and handles of `points`.
pub fn path_bounds(points: &[PathPoint]) -> Option<Bounds> {
    let mut all = points.iter().flat_map(|pt| {
        std::iter::once(pt.position())
            .chain(pt.control1)
            .chain(pt.control2)
    });
    let first = all.next()?;
    let (min, max) = all.fold((first, first), |(lo, hi), p| {
        (
            Point::new(lo.x.min(p.x), lo.y.min(p.y)),
            Point::new(hi.x.max(p.x), hi.y.max(p.y)),
        )
    });
    Some(Bounds::from_corners(min, max))
}

fn path_element(points: Vec<PathPoint>, closed: bool) -> DesignElement {
    let b = path_bounds(&points).unwrap_or_default();
    let mut el = DesignElement::generated(ElementKind::Path, b).with_style(Style {
        border_color: Some(PATH_STROKE.into()),
        border_width: Some(PATH_STROKE_WIDTH),
        ..Default::default()
    });
    el.points = points.iter().map(|pt| pt.translated(-b.x, -b.y)).collect();
    el.is_closed = closed;
    // Straight lines have a zero-extent axis; the store floors the size.
    el.clamp_size();
    el
}

#[cfg(test)]
mod tests {
    use super::*;

    fn click(pen: &mut PenTool, x: f32, y: f32) -> Option<DesignElement> {
        let cfg = EditorConfig::default();
        let out = pen.pointer_down(Point::new(x, y), &cfg);
        pen.pointer_up();
        out
    }

    #[test]
    fn closing_click_commits_triangle() {
        let mut pen = PenTool::new();
        assert!(click(&mut pen, 0.0, 0.0).is_none());
        assert!(click(&mut pen, 100.0, 0.0).is_none());
        assert!(click(&mut pen, 100.0, 100.0).is_none());
        let el = click(&mut pen, 5.0, 3.0).unwrap();

        assert_eq!(el.kind, ElementKind::Path);
        assert!(el.is_closed);
        assert_eq!(el.points.len(), 3);
        assert_eq!(el.bounds(), Bounds::new(0.0, 0.0, 100.0, 100.0));
        assert!(!pen.is_active());
    }

    #[test]
    fn close_needs_three_points() {
        let mut pen = PenTool::new();
        click(&mut pen, 0.0, 0.0);
        click(&mut pen, 100.0, 0.0);
        assert!(click(&mut pen, 2.0, 2.0).is_none());
        assert_eq!(pen.preview().len(), 2);
    }

    #[test]
    fn drag_sets_outgoing_handle_only_past_threshold() {
        let cfg = EditorConfig::default();
        let mut pen = PenTool::new();
        pen.pointer_down(Point::new(10.0, 10.0), &cfg);
        assert!(!pen.pointer_move(Point::new(13.0, 12.0), &cfg));
        assert_eq!(pen.preview()[0].control2, None);

        assert!(pen.pointer_move(Point::new(40.0, 10.0), &cfg));
        assert_eq!(pen.preview()[0].control2, Some(Point::new(40.0, 10.0)));
        assert_eq!(pen.preview()[0].control1, None);

        // Back inside the threshold: corner again.
        assert!(pen.pointer_move(Point::new(11.0, 10.0), &cfg));
        assert_eq!(pen.preview()[0].control2, None);

        pen.pointer_up();
        assert!(!pen.pointer_move(Point::new(80.0, 80.0), &cfg));
    }

    #[test]
    fn commit_normalizes_over_handles() {
        let cfg = EditorConfig::default();
        let mut pen = PenTool::new();
        pen.pointer_down(Point::new(50.0, 50.0), &cfg);
        pen.pointer_move(Point::new(50.0, 20.0), &cfg);
        pen.pointer_up();
        click(&mut pen, 150.0, 50.0);

        let el = pen.commit(false).unwrap();
        assert!(!el.is_closed);
        assert_eq!(el.bounds(), Bounds::new(50.0, 20.0, 100.0, 30.0));
        assert_eq!(el.points[0], PathPoint {
            x: 0.0,
            y: 30.0,
            control1: None,
            control2: Some(Point::new(0.0, 0.0)),
        });
        assert_eq!(el.style.border_color.as_deref(), Some(PATH_STROKE));
    }

    #[test]
    fn short_paths_are_dropped() {
        let mut pen = PenTool::new();
        click(&mut pen, 0.0, 0.0);
        assert!(pen.commit(false).is_none());
        assert!(!pen.is_active());
    }

    #[test]
    fn undo_pops_then_discards() {
        let mut pen = PenTool::new();
        click(&mut pen, 0.0, 0.0);
        click(&mut pen, 50.0, 0.0);
        click(&mut pen, 50.0, 50.0);
        assert!(pen.undo_last());
        assert_eq!(pen.preview().len(), 2);
        assert!(pen.undo_last());
        assert!(!pen.is_active());
        assert!(!pen.undo_last());
    }
}
