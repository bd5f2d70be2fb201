//! Input abstraction layer.
//!
//! Normalizes pointer, keyboard and drag-and-drop events from the browser
//! shell into a unified `InputEvent` consumed by the [`Editor`].
//! Pointer coordinates are in screen space; the editor maps them to the
//! artboard through its viewport.
//!
//! [`Editor`]: crate::Editor

use serde::{Deserialize, Serialize};

/// Modifier keys held during an event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub const SHIFT: Self = Self {
        shift: true,
        ..Self::NONE
    };

    /// ⌘ on macOS, Ctrl elsewhere.
    pub const CMD: Self = Self {
        meta: true,
        ..Self::NONE
    };

    pub fn cmd(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// What was dropped onto the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum DropPayload {
    /// A decoded image file with its natural pixel size.
    Image { src: String, width: f32, height: f32 },
    /// A serialized `ComponentItem`, straight from the drag data.
    Component { json: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    PointerDown { x: f32, y: f32, modifiers: Modifiers },
    PointerMove { x: f32, y: f32, modifiers: Modifiers },
    PointerUp { x: f32, y: f32, modifiers: Modifiers },
    DoubleClick { x: f32, y: f32 },
    /// `key` is the `KeyboardEvent.key` value (`"g"`, `"Escape"`, `" "`).
    KeyDown { key: String, modifiers: Modifiers },
    KeyUp { key: String, modifiers: Modifiers },
    Drop { x: f32, y: f32, payload: DropPayload },
    /// Window lost focus or the pointer was captured elsewhere.
    Blur,
}
