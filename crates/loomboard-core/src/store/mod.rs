//! Shape store abstraction.
//!
//! The document store owns every shape. The transform engine only reads shapes
//! and writes back batches of partial updates through [`ShapeStore`].

mod memory;
mod staged;

pub use memory::MemoryShapeStore;
pub use staged::StagedStore;

use crate::shapes::{ParentId, PartialShape, Shape, ShapeId};
use kurbo::Affine;
use thiserror::Error;

/// Upper bound on parent-chain length, guards against malformed documents.
pub const MAX_DEPTH: usize = 256;

/// Store errors.
#[derive(Debug, Error, PartialEq)]
pub enum StoreError {
    #[error("Parent not found: {0}")]
    ParentNotFound(ShapeId),
    #[error("Duplicate shape id: {0}")]
    DuplicateId(ShapeId),
    #[error("Parent cycle through shape {0}")]
    Cycle(ShapeId),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Read/write access to the document's shapes.
pub trait ShapeStore {
    /// Look up a shape.
    fn get_shape(&self, id: ShapeId) -> Option<&Shape>;

    /// Apply a batch of updates. Observers must see the whole batch or none of it.
    fn update_shapes(&mut self, partials: Vec<PartialShape>);

    /// Children of `parent`, back to front.
    fn sorted_child_ids(&self, parent: ParentId) -> Vec<ShapeId>;

    /// The transform from a shape's frame into page space.
    ///
    /// Always derived from the current ancestor chain.
    fn page_transform(&self, id: ShapeId) -> Option<Affine> {
        let mut transform = Affine::IDENTITY;
        let mut current = self.get_shape(id)?;
        for _ in 0..MAX_DEPTH {
            transform = current.local_transform() * transform;
            match current.parent {
                ParentId::Page => return Some(transform),
                ParentId::Shape(parent) => current = self.get_shape(parent)?,
            }
        }
        log::warn!("Parent chain of {} exceeds {} levels", id, MAX_DEPTH);
        None
    }
}
