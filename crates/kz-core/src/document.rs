//! The persisted project shape: `{ gridConfig, elements, components,
//! designSystem }`.
//!
//! JSON is the interchange format; MessagePack (named fields) is a compact
//! snapshot of the same structure. Older documents that tagged elements
//! with a flat `groupId` are lifted into non-clipping group containers on
//! load so the store only ever sees `parentId` nesting.

use crate::grid::GridConfig;
use crate::id::ElementId;
use crate::model::{Bounds, ComponentItem, DesignElement, ElementKind};
use crate::store::ElementStore;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(default)]
    pub grid_config: GridConfig,
    #[serde(default)]
    pub elements: Vec<DesignElement>,
    #[serde(default)]
    pub components: Vec<ComponentItem>,
    /// Brand rules consumed by the validation overlay. Opaque here.
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub design_system: serde_json::Value,
}

impl Document {
    pub fn from_json(text: &str) -> Result<Self, String> {
        let doc: Document =
            serde_json::from_str(text).map_err(|e| format!("invalid document: {e}"))?;
        doc.finish_load()
    }

    pub fn to_json(&self) -> Result<String, String> {
        serde_json::to_string(self).map_err(|e| e.to_string())
    }

    pub fn to_msgpack(&self) -> Result<Vec<u8>, String> {
        rmp_serde::to_vec_named(self).map_err(|e| e.to_string())
    }

    pub fn from_msgpack(bytes: &[u8]) -> Result<Self, String> {
        let doc: Document =
            rmp_serde::from_slice(bytes).map_err(|e| format!("invalid snapshot: {e}"))?;
        doc.finish_load()
    }

    /// Move the elements into a store. Grid, components and design system
    /// stay on the document.
    pub fn into_store(&mut self) -> ElementStore {
        ElementStore::from_elements(std::mem::take(&mut self.elements))
    }

    /// Snapshot a store back into the persisted shape.
    pub fn from_parts(
        store: &ElementStore,
        grid_config: GridConfig,
        components: Vec<ComponentItem>,
        design_system: serde_json::Value,
    ) -> Self {
        Self {
            grid_config,
            elements: store.elements().to_vec(),
            components,
            design_system,
        }
    }

    fn finish_load(mut self) -> Result<Self, String> {
        self.grid_config.validate()?;
        migrate_legacy_groups(&mut self.elements);
        Ok(self)
    }
}

/// Replace flat `groupId` tags with group containers. Each tag becomes one
/// group sized to its members, placed at the z-slot of its lowest member.
/// Members that already have a parent keep it.
fn migrate_legacy_groups(elements: &mut Vec<DesignElement>) {
    let mut tags: Vec<String> = Vec::new();
    let mut members: HashMap<String, Vec<usize>> = HashMap::new();
    for (i, el) in elements.iter_mut().enumerate() {
        let Some(tag) = el.legacy_group.take() else {
            continue;
        };
        if el.parent_id.is_some() {
            continue;
        }
        if !members.contains_key(&tag) {
            tags.push(tag.clone());
        }
        members.entry(tag).or_default().push(i);
    }
    if tags.is_empty() {
        return;
    }

    let mut taken: HashSet<ElementId> = elements.iter().map(|e| e.id).collect();
    // (insert position, group element), built against the original indices.
    let mut groups: Vec<(usize, DesignElement)> = Vec::new();
    for tag in tags {
        let idxs = &members[&tag];
        let Some(bounds) = Bounds::union_all(idxs.iter().map(|&i| elements[i].bounds())) else {
            continue;
        };
        let mut gid = ElementId::intern(&tag);
        while taken.contains(&gid) {
            gid = ElementId::with_prefix("group");
        }
        taken.insert(gid);
        for &i in idxs {
            elements[i].parent_id = Some(gid);
        }
        log::debug!("migrated legacy group {tag} ({} members)", idxs.len());
        groups.push((idxs[0], DesignElement::new(gid, ElementKind::Group, bounds)));
    }

    // Insert back to front so earlier positions stay valid.
    groups.sort_by_key(|(pos, _)| std::cmp::Reverse(*pos));
    for (pos, group) in groups {
        elements.insert(pos, group);
    }
}
