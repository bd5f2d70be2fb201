//! Tool palette.
//!
//! The active tool decides how a pointer-down on the canvas is read:
//!
//! | Tool | Empty canvas | On an element |
//! |------|--------------|---------------|
//! | Select | marquee | select + drag, or resize from a handle |
//! | Type / Shape / Frame | creation drag | creation drag |
//! | Image | remember drop point | remember drop point |
//! | Hand | pan | pan |
//! | Pen | start path | add anchor / close path |
//! | Gradient | select | drag gradient handle |

use kz_core::model::{Bounds, Constraint, DesignElement, ElementKind, ElementRole, ShapeKind, Style};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    Select,
    Type,
    Image,
    Shape,
    Frame,
    Hand,
    Pen,
    Gradient,
}

impl ToolKind {
    pub const ALL: [ToolKind; 8] = [
        ToolKind::Select,
        ToolKind::Type,
        ToolKind::Image,
        ToolKind::Shape,
        ToolKind::Frame,
        ToolKind::Hand,
        ToolKind::Pen,
        ToolKind::Gradient,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ToolKind::Select => "select",
            ToolKind::Type => "type",
            ToolKind::Image => "image",
            ToolKind::Shape => "shape",
            ToolKind::Frame => "frame",
            ToolKind::Hand => "hand",
            ToolKind::Pen => "pen",
            ToolKind::Gradient => "gradient",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.name() == name)
    }

    /// Tools that add elements. Switching to one clears the selection.
    pub fn creates(self) -> bool {
        matches!(
            self,
            ToolKind::Type | ToolKind::Image | ToolKind::Shape | ToolKind::Frame | ToolKind::Pen
        )
    }

    /// Build the element a creation drag produces. `None` for tools that
    /// don't create by dragging.
    pub fn template(self, bounds: Bounds) -> Option<DesignElement> {
        let snap = [Constraint::GridSnap, Constraint::BaselineSnap];
        let el = match self {
            ToolKind::Type => {
                let mut el = DesignElement::generated(ElementKind::Text, bounds)
                    .with_content("Type something...")
                    .with_style(Style {
                        color: Some("#ffffff".into()),
                        font_size: Some(24.0),
                        font_family: Some("Inter".into()),
                        font_weight: Some("400".into()),
                        line_height: Some(1.2),
                        ..Default::default()
                    });
                el.role = Some(if bounds.height > 40.0 {
                    ElementRole::Headline
                } else {
                    ElementRole::Body
                });
                el
            }
            ToolKind::Shape => {
                let mut el = DesignElement::generated(ElementKind::Box, bounds).with_style(fill("#2A4B8D"));
                el.shape_kind = Some(ShapeKind::Rectangle);
                el.role = Some(ElementRole::Decoration);
                el
            }
            ToolKind::Frame => {
                let mut el = DesignElement::generated(ElementKind::Box, bounds).with_style(fill("#ffffff"));
                el.clip = true;
                el.role = Some(ElementRole::Decoration);
                el
            }
            _ => return None,
        };
        Some(el.with_constraints(&snap))
    }
}

fn fill(color: &str) -> Style {
    Style {
        background_color: Some(color.into()),
        ..Default::default()
    }
}
