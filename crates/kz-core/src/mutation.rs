//! Command form of every store operation.
//!
//! Pointer tools, the property panel, plugin scripts and the wasm bridge all
//! describe changes as `Mutation`s and hand them to [`ElementStore::apply`].
//! That keeps one path into the store for every writer.

use crate::id::ElementId;
use crate::model::{DesignElement, ElementPatch};
use crate::store::{ElementStore, ReorderAction};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum Mutation {
    Create { element: Box<DesignElement> },
    Update { id: ElementId, patch: ElementPatch },
    Delete { id: ElementId },
    DeleteCascade { ids: Vec<ElementId> },
    Reorder { id: ElementId, action: ReorderAction },
    Group { ids: Vec<ElementId> },
    Ungroup { id: ElementId },
    Mask { ids: Vec<ElementId> },
    Unmask { ids: Vec<ElementId> },
    Select { ids: Vec<ElementId> },
}

/// What a mutation did.
///
/// `ids` depends on the operation: the new element for `create`, the
/// container for `group`/`mask`, released children for `ungroup`/`unmask`,
/// removed ids for `deleteCascade`, and the resulting selection for
/// `select`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Applied {
    pub changed: bool,
    pub ids: Vec<ElementId>,
}

impl Applied {
    fn flag(changed: bool) -> Self {
        Self {
            changed,
            ids: Vec::new(),
        }
    }

    fn ids(ids: Vec<ElementId>) -> Self {
        Self {
            changed: !ids.is_empty(),
            ids,
        }
    }

    fn one(id: Option<ElementId>) -> Self {
        Self::ids(id.into_iter().collect())
    }
}

impl Mutation {
    /// Convenience: move an element to an absolute position.
    pub fn move_to(id: ElementId, x: f32, y: f32) -> Self {
        Mutation::Update {
            id,
            patch: ElementPatch::position(x, y),
        }
    }
}

impl ElementStore {
    /// Apply one mutation. The single write path into the store.
    pub fn apply(&mut self, mutation: Mutation) -> Applied {
        log::trace!("apply {mutation:?}");
        match mutation {
            Mutation::Create { element } => Applied::one(Some(self.create(*element))),
            Mutation::Update { id, patch } => Applied::flag(self.update(id, patch)),
            Mutation::Delete { id } => Applied::flag(self.delete(id)),
            Mutation::DeleteCascade { ids } => Applied::ids(self.delete_cascade(&ids)),
            Mutation::Reorder { id, action } => Applied::flag(self.reorder(id, action)),
            Mutation::Group { ids } => Applied::one(self.group(&ids)),
            Mutation::Ungroup { id } => Applied::ids(self.ungroup(id)),
            Mutation::Mask { ids } => Applied::one(self.mask(&ids)),
            Mutation::Unmask { ids } => Applied::ids(self.unmask(&ids)),
            Mutation::Select { ids } => {
                let before = self.selection().to_vec();
                self.select(&ids);
                Applied {
                    changed: before != self.selection(),
                    ids: self.selection().to_vec(),
                }
            }
        }
    }

    /// Apply a batch in order. Returns true if any mutation changed the
    /// store.
    pub fn apply_all(&mut self, mutations: impl IntoIterator<Item = Mutation>) -> bool {
        mutations
            .into_iter()
            .fold(false, |acc, m| self.apply(m).changed | acc)
    }
}
