//! WASM bridge for Kazm: exposes the editor to the browser shell.
//!
//! Compiled via `wasm-pack build --target web`. Structured data crosses the
//! boundary as JSON strings; input handlers return `true` when the canvas
//! needs a re-render.

use kz_core::model::{Bounds, PathPoint};
use kz_core::{Document, ElementId, GridConfig, Mutation};
use kz_editor::gradient::HandlePos;
use kz_editor::{DropPayload, Editor, EditorConfig, InputEvent, Modifiers, ToolKind};
use kz_render::{hit_test, paint_order};
use serde::Serialize;
use wasm_bindgen::prelude::*;

/// The main WASM-facing canvas controller.
#[wasm_bindgen]
pub struct KazmCanvas {
    editor: Editor,
}

/// Transient overlays the shell draws on top of the artboard.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Overlays<'a> {
    marquee: Option<Bounds>,
    ghost: Option<Bounds>,
    pen_preview: &'a [PathPoint],
    gradient_handles: Vec<HandlePos>,
    selection_bounds: Option<Bounds>,
    editing_text: Option<ElementId>,
}

impl Default for KazmCanvas {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl KazmCanvas {
    /// Empty canvas on the default A4 grid.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        install_console_hooks();
        Self {
            editor: Editor::default(),
        }
    }

    // ─── Document ────────────────────────────────────────────────────────

    /// Replace the canvas with a persisted project. Returns `false` and
    /// keeps the current state on a malformed document.
    pub fn load_document(&mut self, json: &str) -> bool {
        match Document::from_json(json).and_then(Editor::from_document) {
            Ok(editor) => {
                self.editor = editor;
                true
            }
            Err(e) => {
                log::warn!("load_document: {e}");
                false
            }
        }
    }

    pub fn document_json(&self) -> String {
        self.editor.document().to_json().unwrap_or_else(|e| {
            log::warn!("document_json: {e}");
            "{}".to_string()
        })
    }

    /// MessagePack snapshot of the project, for quick local saves.
    pub fn document_snapshot(&self) -> Vec<u8> {
        self.editor.document().to_msgpack().unwrap_or_default()
    }

    pub fn load_snapshot(&mut self, bytes: &[u8]) -> bool {
        match Document::from_msgpack(bytes).and_then(Editor::from_document) {
            Ok(editor) => {
                self.editor = editor;
                true
            }
            Err(e) => {
                log::warn!("load_snapshot: {e}");
                false
            }
        }
    }

    /// Replace the grid. Returns `false` on an unusable configuration.
    pub fn set_grid_json(&mut self, json: &str) -> bool {
        let grid: GridConfig = match serde_json::from_str(json) {
            Ok(g) => g,
            Err(e) => {
                log::warn!("set_grid_json: {e}");
                return false;
            }
        };
        self.editor.set_grid(grid).is_ok()
    }

    /// Replace interaction tuning. Missing keys take their defaults.
    pub fn set_config_json(&mut self, json: &str) -> bool {
        match serde_json::from_str::<EditorConfig>(json) {
            Ok(config) => {
                self.editor.set_config(config);
                true
            }
            Err(e) => {
                log::warn!("set_config_json: {e}");
                false
            }
        }
    }

    pub fn elements_json(&self) -> String {
        to_json(&self.editor.store().elements())
    }

    /// Paint list in back-to-front order with clip rectangles.
    pub fn paint_list_json(&self) -> String {
        to_json(&paint_order(self.editor.store()))
    }

    pub fn selection_json(&self) -> String {
        to_json(&self.editor.store().selection())
    }

    pub fn overlays_json(&self) -> String {
        to_json(&Overlays {
            marquee: self.editor.marquee_rect(),
            ghost: self.editor.ghost_rect(),
            pen_preview: self.editor.pen_preview(),
            gradient_handles: self.editor.gradient_handles(),
            selection_bounds: self.editor.selection_bounds(),
            editing_text: self.editor.editing_text(),
        })
    }

    /// CSS for an element's gradient fill, or an empty string.
    pub fn gradient_css(&self, id: &str) -> String {
        self.editor
            .store()
            .get(ElementId::intern(id))
            .and_then(|el| {
                let g = el.style.gradient.as_ref()?;
                g.is_valid().then(|| g.to_css(el.width, el.height))
            })
            .unwrap_or_default()
    }

    // ─── Mutation gateway ────────────────────────────────────────────────

    /// Apply a JSON mutation (`{"op":"update","id":...,"patch":{...}}`).
    /// Returns the `Applied` result as JSON, or `{"error":...}`.
    pub fn apply_mutation_json(&mut self, json: &str) -> String {
        match serde_json::from_str::<Mutation>(json) {
            Ok(m) => to_json(&self.editor.apply(m)),
            Err(e) => {
                log::warn!("apply_mutation_json: {e}");
                serde_json::json!({ "error": e.to_string() }).to_string()
            }
        }
    }

    pub fn commit_text(&mut self, id: &str, content: &str) -> bool {
        self.editor.commit_text(ElementId::intern(id), content)
    }

    /// Save the selected element as a component. Returns the component
    /// JSON, or an empty string when nothing suitable is selected.
    pub fn componentize_selection(&mut self, name: &str) -> String {
        self.editor
            .componentize_selection(name)
            .map(|c| to_json(&c))
            .unwrap_or_default()
    }

    // ─── Drops ───────────────────────────────────────────────────────────

    pub fn drop_component(&mut self, x: f32, y: f32, json: &str) -> bool {
        self.editor.handle(InputEvent::Drop {
            x,
            y,
            payload: DropPayload::Component { json: json.to_string() },
        })
    }

    pub fn drop_image(&mut self, x: f32, y: f32, src: &str, width: f32, height: f32) -> bool {
        self.editor.handle(InputEvent::Drop {
            x,
            y,
            payload: DropPayload::Image {
                src: src.to_string(),
                width,
                height,
            },
        })
    }

    /// Place an image at the last image-tool click.
    pub fn place_image(&mut self, src: &str, width: f32, height: f32) -> bool {
        self.editor
            .place_pending_image(src.to_string(), width, height)
            .is_some()
    }

    // ─── Input ───────────────────────────────────────────────────────────

    pub fn handle_pointer_down(&mut self, x: f32, y: f32, shift: bool, ctrl: bool, alt: bool, meta: bool) -> bool {
        let modifiers = mods(shift, ctrl, alt, meta);
        self.editor.handle(InputEvent::PointerDown { x, y, modifiers })
    }

    pub fn handle_pointer_move(&mut self, x: f32, y: f32, shift: bool, ctrl: bool, alt: bool, meta: bool) -> bool {
        let modifiers = mods(shift, ctrl, alt, meta);
        self.editor.handle(InputEvent::PointerMove { x, y, modifiers })
    }

    pub fn handle_pointer_up(&mut self, x: f32, y: f32, shift: bool, ctrl: bool, alt: bool, meta: bool) -> bool {
        let modifiers = mods(shift, ctrl, alt, meta);
        self.editor.handle(InputEvent::PointerUp { x, y, modifiers })
    }

    pub fn handle_double_click(&mut self, x: f32, y: f32) -> bool {
        self.editor.handle(InputEvent::DoubleClick { x, y })
    }

    pub fn handle_key_down(&mut self, key: &str, shift: bool, ctrl: bool, alt: bool, meta: bool) -> bool {
        self.editor.handle(InputEvent::KeyDown {
            key: key.to_string(),
            modifiers: mods(shift, ctrl, alt, meta),
        })
    }

    pub fn handle_key_up(&mut self, key: &str, shift: bool, ctrl: bool, alt: bool, meta: bool) -> bool {
        self.editor.handle(InputEvent::KeyUp {
            key: key.to_string(),
            modifiers: mods(shift, ctrl, alt, meta),
        })
    }

    /// Window lost focus: end any gesture.
    pub fn blur(&mut self) -> bool {
        self.editor.handle(InputEvent::Blur)
    }

    /// Topmost element under a screen point, or an empty string.
    pub fn element_at(&self, x: f32, y: f32) -> String {
        let p = self.editor.viewport().to_canvas(kz_core::Point::new(x, y));
        hit_test(self.editor.store(), p)
            .map(|id| id.as_str().to_string())
            .unwrap_or_default()
    }

    // ─── Tools & viewport ────────────────────────────────────────────────

    pub fn set_tool(&mut self, name: &str) -> bool {
        match ToolKind::from_name(name) {
            Some(tool) => self.editor.set_tool(tool),
            None => {
                log::debug!("unknown tool {name:?}");
                false
            }
        }
    }

    pub fn get_tool(&self) -> String {
        self.editor.effective_tool().name().to_string()
    }

    pub fn zoom(&self) -> f32 {
        self.editor.viewport().zoom
    }

    /// Clamped to the editor's zoom range.
    pub fn set_zoom(&mut self, zoom: f32) -> bool {
        self.editor.set_zoom(zoom)
    }

    pub fn viewport_json(&self) -> String {
        to_json(self.editor.viewport())
    }
}

fn mods(shift: bool, ctrl: bool, alt: bool, meta: bool) -> Modifiers {
    Modifiers {
        shift,
        ctrl,
        alt,
        meta,
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| {
        log::warn!("serialization failed: {e}");
        "null".to_string()
    })
}

// ─── Standalone helpers (no canvas needed) ───────────────────────────────

/// Check a project document. Returns JSON: `{"ok":true}` or
/// `{"ok":false,"error":"..."}`.
#[wasm_bindgen]
pub fn validate_document(json: &str) -> String {
    match Document::from_json(json) {
        Ok(_) => serde_json::json!({ "ok": true }).to_string(),
        Err(e) => serde_json::json!({ "ok": false, "error": e }).to_string(),
    }
}

/// Route panics and `log` records to the browser console.
fn install_console_hooks() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("Kazm WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
            if log::set_logger(&CONSOLE).is_ok() {
                log::set_max_level(log::LevelFilter::Info);
            }
        });
    }
}

#[cfg(target_arch = "wasm32")]
static CONSOLE: ConsoleLogger = ConsoleLogger;

#[cfg(target_arch = "wasm32")]
struct ConsoleLogger;

#[cfg(target_arch = "wasm32")]
impl log::Log for ConsoleLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let msg = format!("[{}] {}", record.target(), record.args()).into();
        match record.level() {
            log::Level::Error => web_sys::console::error_1(&msg),
            log::Level::Warn => web_sys::console::warn_1(&msg),
            _ => web_sys::console::log_1(&msg),
        }
    }

    fn flush(&self) {}
}
