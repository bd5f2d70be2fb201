//! Core data model for Kazm artboards.
//!
//! An artboard is an ordered sequence of `DesignElement`s. Position in the
//! sequence is z-order (later = drawn on top) within a sibling scope, and
//! nesting is expressed by `parent_id` containment. All geometry is in
//! artboard space: `x`/`y` are absolute, not parent-relative.

use crate::gradient::Gradient;
use crate::id::ElementId;
use serde::{Deserialize, Deserializer, Serialize};
use smallvec::SmallVec;
use std::collections::BTreeMap;

/// Smallest width/height the store will accept for any element.
pub const MIN_ELEMENT_SIZE: f32 = 1.0;

// ─── Geometry ────────────────────────────────────────────────────────────

/// A point in artboard (or screen) space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: Point) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Axis-aligned bounding box in artboard space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Normalize a drag rectangle from two arbitrary corners.
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            width: (b.x - a.x).abs(),
            height: (b.y - a.y).abs(),
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }

    /// AABB overlap test. Non-strict: rectangles that only share an edge
    /// are considered intersecting.
    pub fn intersects(&self, other: &Bounds) -> bool {
        self.x <= other.right()
            && self.right() >= other.x
            && self.y <= other.bottom()
            && self.bottom() >= other.y
    }

    pub fn union(&self, other: &Bounds) -> Bounds {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Bounds {
            x,
            y,
            width: self.right().max(other.right()) - x,
            height: self.bottom().max(other.bottom()) - y,
        }
    }

    /// Intersection of two boxes, or `None` when they are disjoint.
    pub fn intersection(&self, other: &Bounds) -> Option<Bounds> {
        if !self.intersects(other) {
            return None;
        }
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        Some(Bounds {
            x,
            y,
            width: self.right().min(other.right()) - x,
            height: self.bottom().min(other.bottom()) - y,
        })
    }

    /// Union of every box in the iterator.
    pub fn union_all<I: IntoIterator<Item = Bounds>>(iter: I) -> Option<Bounds> {
        iter.into_iter().reduce(|acc, b| acc.union(&b))
    }
}

// ─── Element vocabulary ──────────────────────────────────────────────────

/// What an element is. Fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Text,
    Image,
    Box,
    Group,
    Path,
}

impl ElementKind {
    /// Only boxes and groups may own children.
    pub fn is_container(self) -> bool {
        matches!(self, ElementKind::Box | ElementKind::Group)
    }

    /// Prefix used for generated ids.
    pub fn id_prefix(self) -> &'static str {
        match self {
            ElementKind::Text => "text",
            ElementKind::Image => "img",
            ElementKind::Box => "box",
            ElementKind::Group => "group",
            ElementKind::Path => "path",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Rectangle,
    Circle,
}

/// Semantic role, consumed by layout heuristics outside the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementRole {
    Background,
    Logo,
    Headline,
    Body,
    Decoration,
}

/// Behavioral tags consulted while dragging and resizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Constraint {
    /// Snap x to column edges and margins.
    GridSnap,
    /// Snap y to the baseline grid.
    BaselineSnap,
    /// Keep width/height ratio while resizing.
    AspectRatio,
    MarginBound,
}

/// An anchor of a pen-authored path. Coordinates are relative to the
/// owning element's top-left corner once committed.
///
/// `control1` shapes the segment arriving at this point, `control2` the
/// segment leaving it.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PathPoint {
    pub x: f32,
    pub y: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control1: Option<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control2: Option<Point>,
}

impl PathPoint {
    pub const fn anchor(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            control1: None,
            control2: None,
        }
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Shift the anchor and both handles.
    pub fn translated(&self, dx: f32, dy: f32) -> Self {
        let shift = |p: Point| Point::new(p.x + dx, p.y + dy);
        Self {
            x: self.x + dx,
            y: self.y + dy,
            control1: self.control1.map(shift),
            control2: self.control2.map(shift),
        }
    }
}

// ─── Style ───────────────────────────────────────────────────────────────

/// Visual attributes. The geometry engine only reads `rotation`,
/// `gradient`, `font_size` and `line_height`; everything else is payload
/// for the renderer and property panels. Keys this struct does not know
/// are kept in `extra` so documents round-trip untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Style {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub letter_spacing: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_height: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_radius: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_width: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub box_shadow: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mix_blend_mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backdrop_filter: Option<String>,

    // Filters, stored individually and combined at render time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brightness: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contrast: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saturate: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blur: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hue_rotate: Option<f32>,

    /// Rotation in degrees about the element center.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gradient: Option<Gradient>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

// ─── Elements ────────────────────────────────────────────────────────────

/// The atomic visual unit of an artboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignElement {
    pub id: ElementId,
    #[serde(rename = "type")]
    pub kind: ElementKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<ElementId>,
    /// Children are clipped to this element's bounds (masking).
    #[serde(default, skip_serializing_if = "is_false")]
    pub clip: bool,
    #[serde(
        default,
        rename = "shapeType",
        skip_serializing_if = "Option::is_none"
    )]
    pub shape_kind: Option<ShapeKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<ElementRole>,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub points: Vec<PathPoint>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_closed: bool,
    #[serde(default)]
    pub style: Style,
    #[serde(default)]
    pub constraints: SmallVec<[Constraint; 4]>,

    /// Flat grouping tag written by older documents. Only read while a
    /// document is loaded, where it is converted into `parent_id` nesting.
    #[serde(default, rename = "groupId", skip_serializing)]
    pub(crate) legacy_group: Option<String>,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl DesignElement {
    pub fn new(id: ElementId, kind: ElementKind, bounds: Bounds) -> Self {
        Self {
            id,
            kind,
            parent_id: None,
            clip: false,
            shape_kind: None,
            role: None,
            x: bounds.x,
            y: bounds.y,
            width: bounds.width,
            height: bounds.height,
            content: None,
            src: None,
            points: Vec::new(),
            is_closed: false,
            style: Style::default(),
            constraints: SmallVec::new(),
            legacy_group: None,
        }
    }

    /// New element with a generated id.
    pub fn generated(kind: ElementKind, bounds: Bounds) -> Self {
        Self::new(ElementId::with_prefix(kind.id_prefix()), kind, bounds)
    }

    pub fn with_constraints(mut self, constraints: &[Constraint]) -> Self {
        self.constraints = constraints.iter().copied().collect();
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn with_parent(mut self, parent: ElementId) -> Self {
        self.parent_id = Some(parent);
        self
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.x, self.y, self.width, self.height)
    }

    pub fn has_constraint(&self, c: Constraint) -> bool {
        self.constraints.contains(&c)
    }

    pub fn is_container(&self) -> bool {
        self.kind.is_container()
    }

    /// Floor width/height at `MIN_ELEMENT_SIZE`.
    pub fn clamp_size(&mut self) {
        if !(self.width >= MIN_ELEMENT_SIZE) {
            self.width = MIN_ELEMENT_SIZE;
        }
        if !(self.height >= MIN_ELEMENT_SIZE) {
            self.height = MIN_ELEMENT_SIZE;
        }
    }
}

// ─── Components ──────────────────────────────────────────────────────────

/// An element minus its identity and position: the body of a component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementTemplate {
    #[serde(rename = "type")]
    pub kind: ElementKind,
    #[serde(default, skip_serializing_if = "is_false")]
    pub clip: bool,
    #[serde(
        default,
        rename = "shapeType",
        skip_serializing_if = "Option::is_none"
    )]
    pub shape_kind: Option<ShapeKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<ElementRole>,
    pub width: f32,
    pub height: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub points: Vec<PathPoint>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_closed: bool,
    #[serde(default)]
    pub style: Style,
    #[serde(default)]
    pub constraints: SmallVec<[Constraint; 4]>,
}

impl ElementTemplate {
    /// Strip identity, position and nesting from an element.
    pub fn from_element(el: &DesignElement) -> Self {
        Self {
            kind: el.kind,
            clip: el.clip,
            shape_kind: el.shape_kind,
            role: el.role,
            width: el.width,
            height: el.height,
            content: el.content.clone(),
            src: el.src.clone(),
            points: el.points.clone(),
            is_closed: el.is_closed,
            style: el.style.clone(),
            constraints: el.constraints.clone(),
        }
    }

    /// Build a top-level element from this template.
    pub fn instantiate(&self, id: ElementId, x: f32, y: f32) -> DesignElement {
        let mut el = DesignElement::new(
            id,
            self.kind,
            Bounds::new(x, y, self.width, self.height),
        );
        el.clip = self.clip;
        el.shape_kind = self.shape_kind;
        el.role = self.role;
        el.content = self.content.clone();
        el.src = self.src.clone();
        el.points = self.points.clone();
        el.is_closed = self.is_closed;
        el.style = self.style.clone();
        el.constraints = self.constraints.clone();
        el
    }
}

/// A named, reusable element template in the component library.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentItem {
    pub id: String,
    pub name: String,
    pub element: ElementTemplate,
}

// ─── Partial updates ─────────────────────────────────────────────────────

/// A partial update. Every `Some` field overwrites the element's value;
/// `id` and `kind` cannot be patched.
///
/// `parent_id` is doubly optional: absent leaves nesting alone,
/// `Some(None)` un-nests, `Some(Some(p))` re-parents (validated by the
/// store).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f32>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "double_option"
    )]
    pub parent_id: Option<Option<ElementId>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clip: Option<bool>,
    #[serde(
        default,
        rename = "shapeType",
        skip_serializing_if = "Option::is_none"
    )]
    pub shape_kind: Option<ShapeKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<ElementRole>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<Vec<PathPoint>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_closed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<Style>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraints: Option<SmallVec<[Constraint; 4]>>,
}

fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl ElementPatch {
    /// Patch that only moves an element.
    pub fn position(x: f32, y: f32) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Default::default()
        }
    }

    /// Patch that sets the full bounding box.
    pub fn bounds(b: Bounds) -> Self {
        Self {
            x: Some(b.x),
            y: Some(b.y),
            width: Some(b.width),
            height: Some(b.height),
            ..Default::default()
        }
    }

    pub fn style(style: Style) -> Self {
        Self {
            style: Some(style),
            ..Default::default()
        }
    }
}
