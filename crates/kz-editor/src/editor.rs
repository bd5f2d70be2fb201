//! The interaction controller.
//!
//! `Editor` owns the element store, the grid, the viewport and at most one
//! live [`Session`]. The shell forwards raw input; the editor resolves it
//! against the active tool and writes to the store only through
//! [`Mutation`]s. Every input method returns whether the canvas needs a
//! re-render.

use crate::config::EditorConfig;
use crate::gradient::{self, HandlePos};
use crate::input::{DropPayload, InputEvent, Modifiers};
use crate::pen::PenTool;
use crate::session::{self, Gesture, Handle, Session};
use crate::shortcuts::{ShortcutAction, ShortcutMap};
use crate::tools::ToolKind;
use kz_core::grid::{Axis, GridConfig, snap};
use kz_core::model::{
    Bounds, ComponentItem, Constraint, DesignElement, ElementKind, ElementPatch, ElementRole,
    PathPoint, Point, Style,
};
use kz_core::{Applied, Document, ElementId, ElementStore, Mutation, Viewport};
use kz_render::{hit_test, hit_test_rect};

#[derive(Debug)]
pub struct Editor {
    store: ElementStore,
    grid: GridConfig,
    components: Vec<ComponentItem>,
    design_system: serde_json::Value,
    viewport: Viewport,
    config: EditorConfig,
    tool: ToolKind,
    /// Space held: hand tool until released.
    space_held: bool,
    /// Modifiers from the latest input event, for overlays.
    modifiers: Modifiers,
    session: Option<Session>,
    pen: PenTool,
    editing_text: Option<ElementId>,
    /// Where the image tool was last clicked.
    pending_image: Option<Point>,
}

impl Default for Editor {
    fn default() -> Self {
        Self::unchecked(GridConfig::default())
    }
}

impl Editor {
    /// Empty canvas. Fails on a grid that can't produce snap guides.
    pub fn new(grid: GridConfig) -> Result<Self, String> {
        grid.validate()?;
        Ok(Self::unchecked(grid))
    }

    fn unchecked(grid: GridConfig) -> Self {
        Self {
            store: ElementStore::new(),
            grid,
            components: Vec::new(),
            design_system: serde_json::Value::Null,
            viewport: Viewport::default(),
            config: EditorConfig::default(),
            tool: ToolKind::Select,
            space_held: false,
            modifiers: Modifiers::NONE,
            session: None,
            pen: PenTool::new(),
            editing_text: None,
            pending_image: None,
        }
    }

    pub fn from_document(mut doc: Document) -> Result<Self, String> {
        let mut editor = Self::new(doc.grid_config.clone())?;
        editor.store = doc.into_store();
        editor.components = doc.components;
        editor.design_system = doc.design_system;
        Ok(editor)
    }

    /// Swap the tuning constants. The current zoom is pulled into the new
    /// range.
    pub fn set_config(&mut self, config: EditorConfig) {
        self.config = config;
        self.set_zoom(self.viewport.zoom);
    }

    /// Snapshot in the persisted shape.
    pub fn document(&self) -> Document {
        Document::from_parts(
            &self.store,
            self.grid.clone(),
            self.components.clone(),
            self.design_system.clone(),
        )
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    pub fn store(&self) -> &ElementStore {
        &self.store
    }

    pub fn grid(&self) -> &GridConfig {
        &self.grid
    }

    /// Replace the grid. The previous grid stays on error.
    pub fn set_grid(&mut self, grid: GridConfig) -> Result<(), String> {
        grid.validate()?;
        self.grid = grid;
        Ok(())
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Zoom clamped to the configured range. Returns whether it changed.
    pub fn set_zoom(&mut self, zoom: f32) -> bool {
        let before = self.viewport.zoom;
        self.viewport
            .set_zoom(zoom.clamp(self.config.min_zoom, self.config.max_zoom));
        self.viewport.zoom != before
    }

    pub fn components(&self) -> &[ComponentItem] {
        &self.components
    }

    pub fn tool(&self) -> ToolKind {
        self.tool
    }

    /// The tool pointer input is read with: the hand while Space is held.
    pub fn effective_tool(&self) -> ToolKind {
        if self.space_held {
            ToolKind::Hand
        } else {
            self.tool
        }
    }

    pub fn editing_text(&self) -> Option<ElementId> {
        self.editing_text
    }

    pub fn is_interacting(&self) -> bool {
        self.session.is_some()
    }

    // ─── Store gateway ───────────────────────────────────────────────────

    /// Apply a mutation from outside the pointer flow (property panel,
    /// plugin API).
    pub fn apply(&mut self, mutation: Mutation) -> Applied {
        let applied = self.store.apply(mutation);
        if self.editing_text.is_some_and(|id| !self.store.contains(id)) {
            self.editing_text = None;
        }
        applied
    }

    /// Store the edited text and leave edit mode.
    pub fn commit_text(&mut self, id: ElementId, content: &str) -> bool {
        if self.editing_text == Some(id) {
            self.editing_text = None;
        }
        self.store.update(
            id,
            ElementPatch {
                content: Some(content.to_string()),
                ..Default::default()
            },
        )
    }

    /// Save the single selected element as a component.
    pub fn componentize_selection(&mut self, name: &str) -> Option<ComponentItem> {
        let [id] = self.store.selection() else {
            log::debug!("componentize needs exactly one selected element");
            return None;
        };
        let item = self.store.componentize(*id, name)?;
        self.components.push(item.clone());
        Some(item)
    }

    pub fn set_tool(&mut self, tool: ToolKind) -> bool {
        if tool == self.tool {
            return false;
        }
        if self.pen.is_active() {
            log::debug!("tool switch discards in-progress path");
            self.pen.discard();
        }
        if tool.creates() {
            self.store.clear_selection();
        }
        self.editing_text = None;
        self.pending_image = None;
        self.tool = tool;
        true
    }

    // ─── Input ───────────────────────────────────────────────────────────

    pub fn handle(&mut self, event: InputEvent) -> bool {
        match event {
            InputEvent::PointerDown { x, y, modifiers } => self.pointer_down(x, y, modifiers),
            InputEvent::PointerMove { x, y, modifiers } => self.pointer_move(x, y, modifiers),
            InputEvent::PointerUp { x, y, modifiers } => self.pointer_up(x, y, modifiers),
            InputEvent::DoubleClick { x, y } => self.double_click(x, y),
            InputEvent::KeyDown { key, modifiers } => self.key_down(&key, modifiers),
            InputEvent::KeyUp { key, modifiers } => self.key_up(&key, modifiers),
            InputEvent::Drop { x, y, payload } => self.drop(x, y, payload).is_some(),
            InputEvent::Blur => self.blur(),
        }
    }

    pub fn pointer_down(&mut self, x: f32, y: f32, modifiers: Modifiers) -> bool {
        self.modifiers = modifiers;
        // A pointer-down with a live session means we missed the up.
        if self.session.take().is_some() {
            log::debug!("pointer down during a gesture, previous gesture ended");
        }
        let screen = Point::new(x, y);
        let p = self.viewport.to_canvas(screen);
        let was_editing = self.editing_text.take().is_some();

        let gesture = match self.effective_tool() {
            ToolKind::Hand => Gesture::Panning {
                start_pan: self.viewport.pan,
            },
            ToolKind::Pen => {
                if let Some(el) = self.pen.pointer_down(p, &self.config) {
                    self.finish_creation(el);
                }
                return true;
            }
            ToolKind::Image => {
                self.pending_image = Some(p);
                return was_editing;
            }
            tool @ (ToolKind::Type | ToolKind::Shape | ToolKind::Frame) => {
                Gesture::Creating { tool, current: p }
            }
            ToolKind::Gradient => {
                if let Some(g) = self.gradient_hit(p) {
                    g
                } else {
                    self.click_select(p, modifiers);
                    return true;
                }
            }
            ToolKind::Select => self.select_gesture(p, modifiers),
        };
        log::trace!("gesture start: {gesture:?}");
        self.session = Some(Session::new(screen, p, gesture));
        true
    }

    pub fn pointer_move(&mut self, x: f32, y: f32, modifiers: Modifiers) -> bool {
        self.modifiers = modifiers;
        let screen = Point::new(x, y);
        let p = self.viewport.to_canvas(screen);

        if self.effective_tool() == ToolKind::Pen && self.session.is_none() {
            return self.pen.pointer_move(p, &self.config);
        }
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        let delta = Point::new(p.x - session.start_canvas.x, p.y - session.start_canvas.y);

        match &mut session.gesture {
            Gesture::Panning { start_pan } => {
                self.viewport.pan = Point::new(
                    start_pan.x + screen.x - session.start_screen.x,
                    start_pan.y + screen.y - session.start_screen.y,
                );
                true
            }
            Gesture::Dragging { origins } => {
                let moves =
                    session::drag_mutations(&self.store, &self.grid, origins, delta, modifiers.shift);
                self.store.apply_all(moves)
            }
            Gesture::Resizing {
                handle,
                initial,
                members,
                locked,
            } => {
                let next = session::resized_bounds(
                    *initial,
                    *handle,
                    delta,
                    *locked || modifiers.shift,
                    self.config.min_resize,
                );
                let updates = session::resize_mutations(*initial, members, next);
                self.store.apply_all(updates)
            }
            Gesture::Marquee { current, .. } | Gesture::Creating { current, .. } => {
                *current = p;
                true
            }
            Gesture::GradientHandle { id, handle } => {
                let Some(el) = self.store.get(*id) else {
                    return false;
                };
                let Some(gradient) = gradient::drag_handle(el, *handle, p) else {
                    return false;
                };
                let style = Style {
                    gradient: Some(gradient),
                    ..el.style.clone()
                };
                self.store.update(*id, ElementPatch::style(style))
            }
        }
    }

    pub fn pointer_up(&mut self, x: f32, y: f32, modifiers: Modifiers) -> bool {
        self.modifiers = modifiers;
        self.pen.pointer_up();
        let Some(session) = self.session.take() else {
            return false;
        };
        let p = self.viewport.to_canvas(Point::new(x, y));
        log::trace!("gesture end: {:?}", session.gesture);

        match session.gesture {
            Gesture::Marquee { additive, .. } => {
                let rect = Bounds::from_corners(session.start_canvas, p);
                let mut picked: Vec<ElementId> = if additive {
                    self.store.selection().to_vec()
                } else {
                    Vec::new()
                };
                for hit in hit_test_rect(&self.store, rect) {
                    let root = self.store.root_of(hit);
                    if !picked.contains(&root) {
                        picked.push(root);
                    }
                }
                self.store.select(&picked);
                true
            }
            Gesture::Creating { tool, .. } => {
                let bounds = session::creation_bounds(
                    tool,
                    session.start_canvas,
                    p,
                    modifiers.shift,
                    &self.grid,
                    &self.config,
                );
                match tool.template(bounds) {
                    Some(el) => {
                        self.finish_creation(el);
                        true
                    }
                    None => false,
                }
            }
            // Moves were applied as they happened.
            Gesture::Panning { .. }
            | Gesture::Dragging { .. }
            | Gesture::Resizing { .. }
            | Gesture::GradientHandle { .. } => true,
        }
    }

    /// Double-click on text enters edit mode.
    pub fn double_click(&mut self, x: f32, y: f32) -> bool {
        self.session = None;
        let p = self.viewport.to_canvas(Point::new(x, y));
        let Some(hit) = hit_test(&self.store, p) else {
            return false;
        };
        if self.store.get(hit).is_some_and(|e| e.kind == ElementKind::Text) {
            self.store.select(&[hit]);
            self.editing_text = Some(hit);
            return true;
        }
        false
    }

    pub fn key_down(&mut self, key: &str, modifiers: Modifiers) -> bool {
        self.modifiers = modifiers;
        // The text field owns the keyboard while editing.
        if self.editing_text.is_some() {
            if key == "Escape" {
                self.editing_text = None;
                return true;
            }
            return false;
        }
        let Some(action) = ShortcutMap::resolve(key, modifiers) else {
            return false;
        };
        log::trace!("shortcut {key:?} -> {action:?}");
        if matches!(action, ShortcutAction::Deselect | ShortcutAction::Delete) && self.cancel_marquee() {
            return true;
        }
        self.run_action(action)
    }

    pub fn key_up(&mut self, key: &str, modifiers: Modifiers) -> bool {
        self.modifiers = modifiers;
        if key == " " && self.space_held {
            self.space_held = false;
            return true;
        }
        false
    }

    /// Place a dropped image or component at screen point (`x`, `y`).
    pub fn drop(&mut self, x: f32, y: f32, payload: DropPayload) -> Option<ElementId> {
        let p = self.viewport.to_canvas(Point::new(x, y));
        match payload {
            DropPayload::Image { src, width, height } => Some(self.place_image(p, src, width, height)),
            DropPayload::Component { json } => {
                let component: ComponentItem = match serde_json::from_str(&json) {
                    Ok(c) => c,
                    Err(e) => {
                        log::warn!("ignoring malformed component drop: {e}");
                        return None;
                    }
                };
                let t = &component.element;
                let x = snap(p.x - t.width / 2.0, Axis::X, &self.grid);
                let y = snap(p.y - t.height / 2.0, Axis::Y, &self.grid);
                let id = self.store.instantiate(&component, x, y);
                self.store.select(&[id]);
                Some(id)
            }
        }
    }

    /// Place an image where the image tool was last clicked.
    pub fn place_pending_image(&mut self, src: String, width: f32, height: f32) -> Option<ElementId> {
        let p = self.pending_image.take()?;
        Some(self.place_image(p, src, width, height))
    }

    /// Focus lost: end whatever gesture is live. Drags and resizes keep
    /// their last state; a marquee or creation drag is dropped.
    pub fn blur(&mut self) -> bool {
        self.space_held = false;
        self.modifiers = Modifiers::NONE;
        self.pen.pointer_up();
        match self.session.take() {
            Some(session) => {
                log::debug!("blur ended gesture {:?}", session.gesture);
                true
            }
            None => false,
        }
    }

    // ─── Overlays ────────────────────────────────────────────────────────

    pub fn marquee_rect(&self) -> Option<Bounds> {
        self.session.as_ref()?.marquee_rect()
    }

    /// Outline of the element a creation drag would produce.
    pub fn ghost_rect(&self) -> Option<Bounds> {
        let session = self.session.as_ref()?;
        match session.gesture {
            Gesture::Creating { current, .. } => Some(session::creation_rect(
                session.start_canvas,
                current,
                self.modifiers.shift,
            )),
            _ => None,
        }
    }

    pub fn pen_preview(&self) -> &[PathPoint] {
        self.pen.preview()
    }

    /// Handles for the selected element's gradient, with the gradient tool.
    pub fn gradient_handles(&self) -> Vec<HandlePos> {
        if self.tool != ToolKind::Gradient {
            return Vec::new();
        }
        match self.store.selection() {
            [id] => self.store.get(*id).map(gradient::handles).unwrap_or_default(),
            _ => Vec::new(),
        }
    }

    pub fn selection_bounds(&self) -> Option<Bounds> {
        self.store.bounds_of(self.store.selection())
    }

    // ─── Internals ───────────────────────────────────────────────────────

    /// Select-tool pointer-down: a resize handle, an element, or empty
    /// canvas.
    fn select_gesture(&mut self, p: Point, modifiers: Modifiers) -> Gesture {
        if let Some(g) = self.resize_hit(p) {
            return g;
        }
        if let Some(target) = self.click_select(p, modifiers) {
            // Shift-clicking an element out of the selection drags nothing.
            let origins = if self.store.is_selected(target) {
                session::drag_origins(&self.store, self.store.selection())
            } else {
                Vec::new()
            };
            return Gesture::Dragging { origins };
        }
        let prior = self.store.selection().to_vec();
        if !modifiers.shift {
            self.store.clear_selection();
        }
        Gesture::Marquee {
            current: p,
            additive: modifiers.shift,
            prior,
        }
    }

    /// Resolve a click on an element into a selection change. Clicking a
    /// nested element selects its outermost ancestor unless Cmd is held.
    /// Returns the element the click resolved to, if any.
    fn click_select(&mut self, p: Point, modifiers: Modifiers) -> Option<ElementId> {
        let Some(hit) = hit_test(&self.store, p) else {
            if self.tool == ToolKind::Gradient {
                self.store.clear_selection();
            }
            return None;
        };
        let target = if modifiers.cmd() {
            hit
        } else {
            self.store.root_of(hit)
        };
        if modifiers.shift {
            self.store.toggle(target);
        } else if !self.store.is_selected(target) {
            self.store.select(&[target]);
        }
        Some(target)
    }

    fn resize_hit(&self, p: Point) -> Option<Gesture> {
        let selection = self.store.selection();
        let initial = self.store.bounds_of(selection)?;
        let handle = Handle::at(&initial, p, self.viewport.screen_len(self.config.handle_radius))?;
        let members: Vec<(ElementId, Bounds)> = session::drag_origins(&self.store, selection)
            .into_iter()
            .filter_map(|(id, _)| self.store.get(id).map(|e| (id, e.bounds())))
            .collect();
        let locked = match members.as_slice() {
            [(id, _)] => self
                .store
                .get(*id)
                .is_some_and(|e| e.has_constraint(Constraint::AspectRatio)),
            _ => false,
        };
        Some(Gesture::Resizing {
            handle,
            initial,
            members,
            locked,
        })
    }

    fn gradient_hit(&self, p: Point) -> Option<Gesture> {
        let [id] = self.store.selection() else {
            return None;
        };
        let el = self.store.get(*id)?;
        let radius = self.viewport.screen_len(self.config.gradient_handle_radius);
        let handle = gradient::handle_at(el, p, radius)?;
        Some(Gesture::GradientHandle { id: *id, handle })
    }

    /// Add a freshly drawn element, select it and hand back to the select
    /// tool. New text opens straight into edit mode.
    fn finish_creation(&mut self, el: DesignElement) {
        let is_text = el.kind == ElementKind::Text;
        let id = self.store.create(el);
        self.store.select(&[id]);
        self.tool = ToolKind::Select;
        if is_text {
            self.editing_text = Some(id);
        }
        log::debug!("created {id}");
    }

    fn place_image(&mut self, p: Point, src: String, width: f32, height: f32) -> ElementId {
        let longest = width.max(height);
        let scale = if longest > self.config.max_image_size {
            self.config.max_image_size / longest
        } else {
            1.0
        };
        let bounds = Bounds::new(
            snap(p.x, Axis::X, &self.grid),
            snap(p.y, Axis::Y, &self.grid),
            width * scale,
            height * scale,
        );
        let mut el = DesignElement::generated(ElementKind::Image, bounds)
            .with_constraints(&[Constraint::GridSnap])
            .with_style(Style {
                background_color: Some("transparent".into()),
                ..Default::default()
            });
        el.src = Some(src);
        el.role = Some(ElementRole::Decoration);
        let id = self.store.create(el);
        self.store.select(&[id]);
        self.tool = ToolKind::Select;
        id
    }

    fn run_action(&mut self, action: ShortcutAction) -> bool {
        let selection = self.store.selection().to_vec();
        match action {
            ShortcutAction::Tool(tool) => self.set_tool(tool),
            ShortcutAction::PanHold => {
                let changed = !self.space_held;
                self.space_held = true;
                changed
            }
            ShortcutAction::Group => {
                let applied = self.store.apply(Mutation::Group { ids: selection });
                self.select_result(applied, true)
            }
            ShortcutAction::Ungroup => {
                let mut released = Vec::new();
                for id in selection {
                    released.extend(self.store.apply(Mutation::Ungroup { id }).ids);
                }
                if released.is_empty() {
                    return false;
                }
                self.store.select(&released);
                true
            }
            ShortcutAction::Mask => {
                let applied = self.store.apply(Mutation::Mask { ids: selection });
                self.select_result(applied, true)
            }
            ShortcutAction::Unmask => {
                let applied = self.store.apply(Mutation::Unmask { ids: selection });
                self.select_result(applied, false)
            }
            ShortcutAction::Reorder(action) => match selection.first() {
                Some(&id) => self.store.apply(Mutation::Reorder { id, action }).changed,
                None => false,
            },
            ShortcutAction::Delete => {
                if self.pen.is_active() {
                    self.pen.discard();
                    return true;
                }
                self.store.apply(Mutation::DeleteCascade { ids: selection }).changed
            }
            ShortcutAction::SelectAll => {
                self.store.select_all();
                true
            }
            ShortcutAction::Deselect | ShortcutAction::Commit if self.pen.is_active() => {
                if let Some(el) = self.pen.commit(false) {
                    self.finish_creation(el);
                }
                true
            }
            ShortcutAction::Deselect => {
                let had = !selection.is_empty();
                self.store.clear_selection();
                had
            }
            ShortcutAction::Commit => false,
            ShortcutAction::Undo => self.pen.undo_last(),
            ShortcutAction::ZoomIn => self.step_zoom(self.config.zoom_step),
            ShortcutAction::ZoomOut => self.step_zoom(-self.config.zoom_step),
        }
    }

    /// Drop a live marquee and put back the selection it replaced.
    fn cancel_marquee(&mut self) -> bool {
        let Some(session) = self
            .session
            .take_if(|s| matches!(s.gesture, Gesture::Marquee { .. }))
        else {
            return false;
        };
        if let Gesture::Marquee { prior, .. } = session.gesture {
            log::debug!("marquee cancelled");
            self.store.select(&prior);
        }
        true
    }

    fn select_result(&mut self, applied: Applied, replace: bool) -> bool {
        if !applied.changed {
            log::debug!("shortcut had no effect on the selection");
            return false;
        }
        if replace || !applied.ids.is_empty() {
            self.store.select(&applied.ids);
        }
        true
    }

    fn step_zoom(&mut self, step: f32) -> bool {
        let next = ((self.viewport.zoom + step) * 10.0).round() / 10.0;
        self.set_zoom(next)
    }
}
