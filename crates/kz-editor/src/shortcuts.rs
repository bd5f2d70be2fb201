//! Keyboard shortcut mapping.
//!
//! Maps key + modifier combos to semantic `ShortcutAction`s. The map lives
//! in Rust so the browser shell and native tests share it.
//!
//! - single letters pick tools (`v t m r f h p g`)
//! - Space held = temporary hand tool
//! - ⌘G / ⌘⇧G group and ungroup, ⌘⇧M / ⌘⌥M mask and unmask
//! - ⌘[ ⌘] step through z-order, with ⇧ jump to back/front

use crate::input::Modifiers;
use crate::tools::ToolKind;
use kz_core::ReorderAction;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    Tool(ToolKind),
    /// Space pressed: hand tool until released.
    PanHold,

    Group,
    Ungroup,
    Mask,
    Unmask,
    Reorder(ReorderAction),

    /// Remove the selection and everything nested in it.
    Delete,
    SelectAll,
    /// Escape: leave text editing, finish a path, or drop the selection.
    Deselect,
    /// Enter: finish the path being drawn.
    Commit,
    /// ⌘Z. Only meaningful while drawing a path (removes the last point).
    Undo,

    ZoomIn,
    ZoomOut,
}

pub struct ShortcutMap;

impl ShortcutMap {
    /// Resolve a key event to an action. Returns `None` if the combo has no
    /// binding.
    pub fn resolve(key: &str, mods: Modifiers) -> Option<ShortcutAction> {
        use ShortcutAction::*;

        if mods.cmd() {
            let lower = key.to_ascii_lowercase();
            return match (lower.as_str(), mods.shift, mods.alt) {
                ("g", false, _) => Some(Group),
                ("g", true, _) => Some(Ungroup),
                ("m", true, _) => Some(Mask),
                ("m", false, true) => Some(Unmask),
                ("[", true, _) | ("{", _, _) => Some(Reorder(ReorderAction::Back)),
                ("]", true, _) | ("}", _, _) => Some(Reorder(ReorderAction::Front)),
                ("[", false, _) => Some(Reorder(ReorderAction::Backward)),
                ("]", false, _) => Some(Reorder(ReorderAction::Forward)),
                ("=" | "+", _, _) => Some(ZoomIn),
                ("-", _, _) => Some(ZoomOut),
                ("a", false, _) => Some(SelectAll),
                ("z", false, _) => Some(Undo),
                _ => None,
            };
        }

        match key {
            "Delete" | "Backspace" => return Some(Delete),
            "Escape" => return Some(Deselect),
            "Enter" => return Some(Commit),
            " " => return Some(PanHold),
            _ => {}
        }
        if mods.shift || mods.alt {
            return None;
        }

        let tool = match key {
            "v" | "V" => ToolKind::Select,
            "t" | "T" => ToolKind::Type,
            "m" | "M" => ToolKind::Image,
            "r" | "R" => ToolKind::Shape,
            "f" | "F" => ToolKind::Frame,
            "h" | "H" => ToolKind::Hand,
            "p" | "P" => ToolKind::Pen,
            "g" | "G" => ToolKind::Gradient,
            _ => return None,
        };
        Some(Tool(tool))
    }
}
