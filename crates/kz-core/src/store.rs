//! The element store: single owner of an artboard's elements and selection.
//!
//! Elements live in one ordered `Vec`. Index order is z-order: later
//! elements paint above earlier ones within the same parent scope. Nesting
//! is carried by `parent_id` and is kept acyclic by validating every
//! re-parent before it happens.
//!
//! Operations on unknown ids are no-ops. They report what happened through
//! their return value (`bool`, `Option`, or the list of affected ids) and
//! never panic.

use crate::id::ElementId;
use crate::model::*;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Direction for [`ElementStore::reorder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReorderAction {
    /// Above every sibling.
    Front,
    /// Below every sibling.
    Back,
    /// One sibling up.
    Forward,
    /// One sibling down.
    Backward,
}

#[derive(Debug, Clone, Default)]
pub struct ElementStore {
    elements: Vec<DesignElement>,
    index: HashMap<ElementId, usize>,
    selection: Vec<ElementId>,
}

impl ElementStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from loaded elements, repairing anything that would
    /// break the store's invariants: duplicate ids are re-rolled, dangling
    /// or non-container parents are cleared, and parent cycles are cut.
    pub fn from_elements(elements: Vec<DesignElement>) -> Self {
        let mut store = Self::new();
        for mut el in elements {
            if store.index.contains_key(&el.id) {
                let fresh = store.fresh_id(el.kind);
                log::debug!("duplicate id {} on load, renamed to {fresh}", el.id);
                el.id = fresh;
            }
            el.clamp_size();
            store.index.insert(el.id, store.elements.len());
            store.elements.push(el);
        }

        for i in 0..store.elements.len() {
            let el = &store.elements[i];
            if let Some(p) = el.parent_id
                && !store.can_contain(p, el.id)
            {
                log::debug!("dropping invalid parent {p} of {}", el.id);
                store.elements[i].parent_id = None;
            }
        }
        store
    }

    // ─── Queries ─────────────────────────────────────────────────────────

    /// All elements in z-order.
    pub fn elements(&self) -> &[DesignElement] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn get(&self, id: ElementId) -> Option<&DesignElement> {
        self.index.get(&id).map(|&i| &self.elements[i])
    }

    /// Global z-order position.
    pub fn index_of(&self, id: ElementId) -> Option<usize> {
        self.index.get(&id).copied()
    }

    /// Direct children of `parent` in z-order. `None` lists the roots.
    pub fn children_of(&self, parent: Option<ElementId>) -> Vec<ElementId> {
        self.elements
            .iter()
            .filter(|e| e.parent_id == parent)
            .map(|e| e.id)
            .collect()
    }

    pub fn children(&self, id: ElementId) -> Vec<ElementId> {
        self.children_of(Some(id))
    }

    /// Every element nested under `id`, depth-first in z-order.
    pub fn descendants(&self, id: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        self.collect_descendants(id, &mut out);
        out
    }

    fn collect_descendants(&self, id: ElementId, out: &mut Vec<ElementId>) {
        for child in self.children(id) {
            // Cycles can't be constructed through the store; the length
            // guard only protects against a hand-corrupted state.
            if out.len() > self.elements.len() {
                return;
            }
            out.push(child);
            self.collect_descendants(child, out);
        }
    }

    /// Parent chain of `id`, nearest first.
    pub fn ancestors(&self, id: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        let mut cur = self.get(id).and_then(|e| e.parent_id);
        while let Some(p) = cur {
            if out.len() > self.elements.len() {
                break;
            }
            out.push(p);
            cur = self.get(p).and_then(|e| e.parent_id);
        }
        out
    }

    /// Outermost ancestor of `id`, or `id` itself when it is top-level.
    pub fn root_of(&self, id: ElementId) -> ElementId {
        self.ancestors(id).last().copied().unwrap_or(id)
    }

    /// True when `ancestor` appears in the parent chain of `id`.
    pub fn is_ancestor_of(&self, ancestor: ElementId, id: ElementId) -> bool {
        self.ancestors(id).contains(&ancestor)
    }

    /// Union bounding box of the given elements. Unknown ids are skipped.
    pub fn bounds_of(&self, ids: &[ElementId]) -> Option<Bounds> {
        Bounds::union_all(ids.iter().filter_map(|&id| self.get(id)).map(|e| e.bounds()))
    }

    // ─── Selection ───────────────────────────────────────────────────────

    pub fn selection(&self) -> &[ElementId] {
        &self.selection
    }

    pub fn is_selected(&self, id: ElementId) -> bool {
        self.selection.contains(&id)
    }

    /// Replace the selection. Unknown and repeated ids are dropped.
    pub fn select(&mut self, ids: &[ElementId]) {
        self.selection.clear();
        for &id in ids {
            if self.contains(id) && !self.selection.contains(&id) {
                self.selection.push(id);
            }
        }
    }

    /// Add `id` to the selection, or remove it if already selected.
    pub fn toggle(&mut self, id: ElementId) {
        if let Some(pos) = self.selection.iter().position(|&s| s == id) {
            self.selection.remove(pos);
        } else if self.contains(id) {
            self.selection.push(id);
        }
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Select every top-level element.
    pub fn select_all(&mut self) {
        self.selection = self.children_of(None);
    }

    // ─── Mutations ───────────────────────────────────────────────────────

    /// Append an element on top of the z-order and return its id.
    ///
    /// A colliding id is replaced by a generated one, sizes are floored at
    /// [`MIN_ELEMENT_SIZE`], and a parent that doesn't exist or can't hold
    /// children is dropped.
    pub fn create(&mut self, mut el: DesignElement) -> ElementId {
        if self.contains(el.id) {
            el.id = self.fresh_id(el.kind);
        }
        el.clamp_size();
        if let Some(p) = el.parent_id
            && !self.can_contain(p, el.id)
        {
            log::debug!("create {}: parent {p} rejected", el.id);
            el.parent_id = None;
        }
        let id = el.id;
        self.index.insert(id, self.elements.len());
        self.elements.push(el);
        id
    }

    /// Apply a partial update. Returns `false` when nothing was applied:
    /// the id is unknown, or the patch would re-parent the element into a
    /// non-container, itself, or one of its own descendants.
    ///
    /// Geometry changes on a container move and scale every descendant by
    /// the same factors, recursively.
    pub fn update(&mut self, id: ElementId, patch: ElementPatch) -> bool {
        let Some(idx) = self.index_of(id) else {
            return false;
        };
        if let Some(Some(p)) = patch.parent_id
            && !self.can_contain(p, id)
        {
            log::debug!("update {id}: re-parent under {p} rejected");
            return false;
        }

        let old = self.elements[idx].bounds();
        let el = &mut self.elements[idx];
        if let Some(v) = patch.x {
            el.x = v;
        }
        if let Some(v) = patch.y {
            el.y = v;
        }
        if let Some(v) = patch.width {
            el.width = v;
        }
        if let Some(v) = patch.height {
            el.height = v;
        }
        el.clamp_size();
        if let Some(p) = patch.parent_id {
            el.parent_id = p;
        }
        if let Some(v) = patch.clip {
            el.clip = v;
        }
        if let Some(v) = patch.shape_kind {
            el.shape_kind = Some(v);
        }
        if let Some(v) = patch.role {
            el.role = Some(v);
        }
        if let Some(v) = patch.content {
            el.content = Some(v);
        }
        if let Some(v) = patch.src {
            el.src = Some(v);
        }
        if let Some(v) = patch.is_closed {
            el.is_closed = v;
        }
        if let Some(v) = patch.style {
            el.style = v;
        }
        if let Some(v) = patch.constraints {
            el.constraints = v;
        }
        let new = el.bounds();
        match patch.points {
            Some(points) => el.points = points,
            None => rescale_points(el, old, new),
        }

        if new != old && self.elements[idx].is_container() {
            self.cascade(id, old, new);
        }
        true
    }

    /// Map every descendant of `id` from the container's old box to its new
    /// one. Applying the container's map to the whole subtree is the same
    /// as cascading level by level.
    fn cascade(&mut self, id: ElementId, old: Bounds, new: Bounds) {
        let sx = new.width / old.width;
        let sy = new.height / old.height;
        for d in self.descendants(id) {
            let Some(i) = self.index_of(d) else { continue };
            let child = &mut self.elements[i];
            let before = child.bounds();
            child.x = new.x + (child.x - old.x) * sx;
            child.y = new.y + (child.y - old.y) * sy;
            child.width *= sx;
            child.height *= sy;
            child.clamp_size();
            let after = child.bounds();
            rescale_points(child, before, after);
        }
    }

    /// Remove one element. Its children become top-level.
    pub fn delete(&mut self, id: ElementId) -> bool {
        let Some(idx) = self.index_of(id) else {
            return false;
        };
        self.elements.remove(idx);
        for el in &mut self.elements {
            if el.parent_id == Some(id) {
                el.parent_id = None;
            }
        }
        self.selection.retain(|&s| s != id);
        self.reindex();
        true
    }

    /// Remove the given elements and everything nested under them.
    /// Returns the removed ids in z-order.
    pub fn delete_cascade(&mut self, ids: &[ElementId]) -> Vec<ElementId> {
        let mut doomed: HashSet<ElementId> = HashSet::new();
        for &id in ids {
            if self.contains(id) {
                doomed.insert(id);
                doomed.extend(self.descendants(id));
            }
        }
        if doomed.is_empty() {
            return Vec::new();
        }
        let removed: Vec<ElementId> = self
            .elements
            .iter()
            .filter(|e| doomed.contains(&e.id))
            .map(|e| e.id)
            .collect();
        self.elements.retain(|e| !doomed.contains(&e.id));
        self.selection.retain(|s| !doomed.contains(s));
        self.reindex();
        removed
    }

    /// Move `id` within its sibling scope. Elements outside that scope keep
    /// their global slots, so nothing in another parent changes order.
    pub fn reorder(&mut self, id: ElementId, action: ReorderAction) -> bool {
        let Some(el) = self.get(id) else {
            return false;
        };
        let parent = el.parent_id;
        let slots: Vec<usize> = self
            .elements
            .iter()
            .enumerate()
            .filter(|(_, e)| e.parent_id == parent)
            .map(|(i, _)| i)
            .collect();
        let Some(pos) = slots.iter().position(|&i| self.elements[i].id == id) else {
            return false;
        };

        let mut local: Vec<DesignElement> =
            slots.iter().map(|&i| self.elements[i].clone()).collect();
        let target = match action {
            ReorderAction::Front => local.len() - 1,
            ReorderAction::Back => 0,
            ReorderAction::Forward => (pos + 1).min(local.len() - 1),
            ReorderAction::Backward => pos.saturating_sub(1),
        };
        if target == pos {
            return false;
        }
        let moving = local.remove(pos);
        local.insert(target, moving);

        for (slot, el) in slots.into_iter().zip(local) {
            self.elements[slot] = el;
        }
        self.reindex();
        true
    }

    /// Wrap elements in a new non-clipping group sized to their union box.
    ///
    /// Ids nested under another listed id are left where they are. The
    /// group inherits the members' parent when they all share one, and
    /// takes the z-slot of the lowest member. Returns the group id, or
    /// `None` when no listed id exists.
    pub fn group(&mut self, ids: &[ElementId]) -> Option<ElementId> {
        let members = self.outermost(ids);
        let bounds = self.bounds_of(&members)?;
        let first = members.iter().filter_map(|&m| self.index_of(m)).min()?;

        let parents: HashSet<Option<ElementId>> = members
            .iter()
            .filter_map(|&m| self.get(m))
            .map(|e| e.parent_id)
            .collect();
        let parent = match parents.len() {
            1 => parents.into_iter().next().flatten(),
            _ => None,
        };

        let gid = self.fresh_id(ElementKind::Group);
        let mut group = DesignElement::new(gid, ElementKind::Group, bounds);
        group.parent_id = parent;
        group.clamp_size();
        self.elements.insert(first, group);
        self.reindex();

        for m in &members {
            if let Some(i) = self.index_of(*m) {
                self.elements[i].parent_id = Some(gid);
            }
        }
        log::debug!("grouped {} elements into {gid}", members.len());
        Some(gid)
    }

    /// Dissolve a group. Its direct children move to the group's parent
    /// with their geometry untouched. Returns the released ids; empty when
    /// `id` isn't a group.
    pub fn ungroup(&mut self, id: ElementId) -> Vec<ElementId> {
        let Some(group) = self.get(id) else {
            return Vec::new();
        };
        if group.kind != ElementKind::Group {
            return Vec::new();
        }
        let parent = group.parent_id;
        let released = self.children(id);
        for &c in &released {
            if let Some(i) = self.index_of(c) {
                self.elements[i].parent_id = parent;
            }
        }
        self.delete(id);
        released
    }

    /// Turn the bottom-most listed element into a clipping container and
    /// nest the others inside it. The bottom-most element must be a box or
    /// group. Returns the mask container id.
    pub fn mask(&mut self, ids: &[ElementId]) -> Option<ElementId> {
        let mut present: Vec<ElementId> = ids.iter().copied().filter(|&i| self.contains(i)).collect();
        present.sort_by_key(|&i| self.index_of(i));
        present.dedup();
        if present.len() < 2 {
            return None;
        }

        let mask_id = present[0];
        let mask = self.get(mask_id)?;
        if !mask.is_container() {
            log::debug!("mask: bottom element {mask_id} is a {:?}", mask.kind);
            return None;
        }

        let content: Vec<ElementId> = self
            .outermost(&present[1..])
            .into_iter()
            .filter(|&c| !self.is_ancestor_of(c, mask_id))
            .collect();
        if content.is_empty() {
            return None;
        }

        for c in &content {
            if let Some(i) = self.index_of(*c) {
                self.elements[i].parent_id = Some(mask_id);
            }
        }
        if let Some(i) = self.index_of(mask_id) {
            self.elements[i].clip = true;
        }
        Some(mask_id)
    }

    /// Release masks. Each listed id may be the mask itself or one of its
    /// direct children. Returns every released child.
    pub fn unmask(&mut self, ids: &[ElementId]) -> Vec<ElementId> {
        let mut masks: Vec<ElementId> = Vec::new();
        for &id in ids {
            let Some(el) = self.get(id) else { continue };
            let mask = if el.clip {
                Some(id)
            } else {
                el.parent_id.filter(|&p| self.get(p).is_some_and(|p| p.clip))
            };
            if let Some(m) = mask
                && !masks.contains(&m)
            {
                masks.push(m);
            }
        }

        let mut released = Vec::new();
        for m in masks {
            let Some(i) = self.index_of(m) else { continue };
            self.elements[i].clip = false;
            let parent = self.elements[i].parent_id;
            for c in self.children(m) {
                if let Some(ci) = self.index_of(c) {
                    self.elements[ci].parent_id = parent;
                }
                released.push(c);
            }
        }
        released
    }

    // ─── Components ──────────────────────────────────────────────────────

    /// Capture an element as a reusable component.
    pub fn componentize(&self, id: ElementId, name: &str) -> Option<ComponentItem> {
        let el = self.get(id)?;
        Some(ComponentItem {
            id: ElementId::with_prefix("comp").as_str().to_string(),
            name: name.to_string(),
            element: ElementTemplate::from_element(el),
        })
    }

    /// Place a component instance with its top-left at (`x`, `y`).
    pub fn instantiate(&mut self, component: &ComponentItem, x: f32, y: f32) -> ElementId {
        let id = self.fresh_id_with("inst");
        self.create(component.element.instantiate(id, x, y))
    }

    // ─── Internals ───────────────────────────────────────────────────────

    /// True when `parent` exists, can hold children, and isn't `child` or
    /// one of its descendants.
    fn can_contain(&self, parent: ElementId, child: ElementId) -> bool {
        let Some(p) = self.get(parent) else {
            return false;
        };
        p.is_container() && parent != child && !self.is_ancestor_of(child, parent)
    }

    /// Drop ids that are unknown, repeated, or nested under another id in
    /// the list. Result is in z-order.
    fn outermost(&self, ids: &[ElementId]) -> Vec<ElementId> {
        let set: HashSet<ElementId> = ids.iter().copied().filter(|&i| self.contains(i)).collect();
        let mut out: Vec<ElementId> = set
            .iter()
            .copied()
            .filter(|&i| !self.ancestors(i).iter().any(|a| set.contains(a)))
            .collect();
        out.sort_by_key(|&i| self.index_of(i));
        out
    }

    fn fresh_id(&self, kind: ElementKind) -> ElementId {
        self.fresh_id_with(kind.id_prefix())
    }

    fn fresh_id_with(&self, prefix: &str) -> ElementId {
        loop {
            let id = ElementId::with_prefix(prefix);
            if !self.contains(id) {
                return id;
            }
        }
    }

    fn reindex(&mut self) {
        self.index = self
            .elements
            .iter()
            .enumerate()
            .map(|(i, e)| (e.id, i))
            .collect();
    }
}

/// Path points are relative to the element's top-left, so a size change
/// has to stretch them to keep the outline inside the box.
fn rescale_points(el: &mut DesignElement, old: Bounds, new: Bounds) {
    if el.points.is_empty() || (old.width == new.width && old.height == new.height) {
        return;
    }
    let sx = new.width / old.width;
    let sy = new.height / old.height;
    let scale = |p: Point| Point::new(p.x * sx, p.y * sy);
    for p in &mut el.points {
        p.x *= sx;
        p.y *= sy;
        p.control1 = p.control1.map(scale);
        p.control2 = p.control2.map(scale);
    }
}
