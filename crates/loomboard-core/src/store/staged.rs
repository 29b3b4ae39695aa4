//! Staging overlay used to assemble one atomic batch.

use super::ShapeStore;
use crate::shapes::{ParentId, PartialShape, Shape, ShapeId};
use std::collections::HashMap;

/// Read-through overlay that records updates instead of committing them.
///
/// Reads see the staged state, so follow-up computations (like a group
/// re-fitting itself to moved children) can run before anything reaches the
/// real store. `into_partials` yields the merged batch.
pub struct StagedStore<'a> {
    base: &'a dyn ShapeStore,
    staged: HashMap<ShapeId, Shape>,
    pending: Vec<PartialShape>,
}

impl<'a> StagedStore<'a> {
    /// Create an overlay over `base`.
    pub fn new(base: &'a dyn ShapeStore) -> Self {
        Self {
            base,
            staged: HashMap::new(),
            pending: Vec::new(),
        }
    }

    /// Ids with staged changes, in first-touched order.
    pub fn touched(&self) -> impl Iterator<Item = ShapeId> + '_ {
        self.pending.iter().map(|p| p.id)
    }

    /// The merged batch, one partial per shape.
    pub fn into_partials(self) -> Vec<PartialShape> {
        self.pending
    }
}

impl ShapeStore for StagedStore<'_> {
    fn get_shape(&self, id: ShapeId) -> Option<&Shape> {
        self.staged.get(&id).or_else(|| self.base.get_shape(id))
    }

    fn update_shapes(&mut self, partials: Vec<PartialShape>) {
        for partial in partials {
            let Some(current) = self.get_shape(partial.id) else {
                continue;
            };
            let mut shape = current.clone();
            shape.apply(&partial);
            self.staged.insert(partial.id, shape);
            match self.pending.iter_mut().find(|p| p.id == partial.id) {
                Some(existing) => existing.merge(partial),
                None => self.pending.push(partial),
            }
        }
    }

    fn sorted_child_ids(&self, parent: ParentId) -> Vec<ShapeId> {
        self.base.sorted_child_ids(parent)
    }
}
