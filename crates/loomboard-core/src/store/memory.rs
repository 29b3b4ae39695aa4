//! In-memory shape store.

use super::{MAX_DEPTH, ShapeStore, StoreError, StoreResult};
use crate::shapes::{ParentId, PartialShape, Shape, ShapeId};
use std::collections::HashMap;

/// Callback invoked once per committed batch with the updates that were applied.
pub type BatchListener = Box<dyn FnMut(&[PartialShape])>;

/// In-memory store for tests and embedders without their own document layer.
#[derive(Default)]
pub struct MemoryShapeStore {
    shapes: HashMap<ShapeId, Shape>,
    listeners: Vec<BatchListener>,
}

impl std::fmt::Debug for MemoryShapeStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryShapeStore")
            .field("shapes", &self.shapes)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl MemoryShapeStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a shape. Its parent must already exist.
    pub fn insert(&mut self, shape: Shape) -> StoreResult<ShapeId> {
        if self.shapes.contains_key(&shape.id) {
            return Err(StoreError::DuplicateId(shape.id));
        }
        if let ParentId::Shape(parent) = shape.parent {
            if !self.shapes.contains_key(&parent) {
                return Err(StoreError::ParentNotFound(parent));
            }
        }
        let id = shape.id;
        self.shapes.insert(id, shape);
        Ok(id)
    }

    /// Move a shape under a new parent, keeping its local transform.
    pub fn reparent(&mut self, id: ShapeId, parent: ParentId) -> StoreResult<()> {
        if let ParentId::Shape(parent_id) = parent {
            if !self.shapes.contains_key(&parent_id) {
                return Err(StoreError::ParentNotFound(parent_id));
            }
            let mut cursor = Some(parent_id);
            for _ in 0..MAX_DEPTH {
                let Some(current) = cursor else { break };
                if current == id {
                    return Err(StoreError::Cycle(id));
                }
                cursor = self.shapes.get(&current).and_then(|s| s.parent.shape_id());
            }
        }
        if let Some(shape) = self.shapes.get_mut(&id) {
            shape.parent = parent;
        }
        Ok(())
    }

    /// Remove a shape and everything beneath it.
    pub fn remove(&mut self, id: ShapeId) -> Option<Shape> {
        for child in self.sorted_child_ids(ParentId::Shape(id)) {
            self.remove(child);
        }
        self.shapes.remove(&id)
    }

    /// Register a batch listener.
    pub fn subscribe(&mut self, listener: BatchListener) {
        self.listeners.push(listener);
    }

    /// Number of shapes in the store.
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Iterate over all shapes in no particular order.
    pub fn shapes(&self) -> impl Iterator<Item = &Shape> {
        self.shapes.values()
    }
}

impl ShapeStore for MemoryShapeStore {
    fn get_shape(&self, id: ShapeId) -> Option<&Shape> {
        self.shapes.get(&id)
    }

    fn update_shapes(&mut self, partials: Vec<PartialShape>) {
        let applied: Vec<PartialShape> = partials
            .into_iter()
            .filter(|partial| {
                let known = self.shapes.contains_key(&partial.id);
                if !known {
                    log::debug!("Dropping update for unknown shape {}", partial.id);
                }
                known && !partial.is_empty()
            })
            .collect();
        if applied.is_empty() {
            return;
        }
        for partial in &applied {
            if let Some(shape) = self.shapes.get_mut(&partial.id) {
                shape.apply(partial);
            }
        }
        for listener in &mut self.listeners {
            listener(&applied);
        }
    }

    fn sorted_child_ids(&self, parent: ParentId) -> Vec<ShapeId> {
        let mut children: Vec<&Shape> = self
            .shapes
            .values()
            .filter(|s| s.parent == parent)
            .collect();
        children.sort_by(|a, b| a.index.cmp(&b.index).then_with(|| a.id.cmp(&b.id)));
        children.into_iter().map(|s| s.id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Point;
    use std::cell::RefCell;
    use std::f64::consts::FRAC_PI_2;
    use std::rc::Rc;

    #[test]
    fn test_insert_and_get() {
        let mut store = MemoryShapeStore::new();
        let id = store
            .insert(Shape::rectangle(0.0, 0.0, 10.0, 10.0))
            .unwrap();
        assert!(store.get_shape(id).is_some());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_insert_requires_parent() {
        let mut store = MemoryShapeStore::new();
        let orphan = Shape::rectangle(0.0, 0.0, 10.0, 10.0).with_parent(uuid::Uuid::new_v4());
        assert!(matches!(
            store.insert(orphan),
            Err(StoreError::ParentNotFound(_))
        ));
    }

    #[test]
    fn test_reparent_rejects_cycle() {
        let mut store = MemoryShapeStore::new();
        let outer = store.insert(Shape::frame(0.0, 0.0, 100.0, 100.0)).unwrap();
        let inner = store
            .insert(Shape::frame(0.0, 0.0, 50.0, 50.0).with_parent(outer))
            .unwrap();
        assert_eq!(
            store.reparent(outer, ParentId::Shape(inner)),
            Err(StoreError::Cycle(outer))
        );
    }

    #[test]
    fn test_sorted_children() {
        let mut store = MemoryShapeStore::new();
        let frame = store.insert(Shape::frame(0.0, 0.0, 100.0, 100.0)).unwrap();
        let back = Shape::rectangle(0.0, 0.0, 1.0, 1.0)
            .with_parent(frame)
            .with_index(1);
        let front = Shape::rectangle(0.0, 0.0, 1.0, 1.0)
            .with_parent(frame)
            .with_index(2);
        let back = store.insert(back).unwrap();
        let front = store.insert(front).unwrap();
        assert_eq!(
            store.sorted_child_ids(ParentId::Shape(frame)),
            vec![back, front]
        );
        assert_eq!(store.sorted_child_ids(ParentId::Page), vec![frame]);
    }

    #[test]
    fn test_page_transform_composes_ancestors() {
        let mut store = MemoryShapeStore::new();
        let frame = Shape::frame(100.0, 100.0, 200.0, 200.0).with_rotation(FRAC_PI_2);
        let frame = store.insert(frame).unwrap();
        let child = store
            .insert(Shape::rectangle(10.0, 0.0, 5.0, 5.0).with_parent(frame))
            .unwrap();
        let origin = store.page_transform(child).unwrap() * Point::ZERO;
        assert!((origin.x - 100.0).abs() < 1e-9);
        assert!((origin.y - 110.0).abs() < 1e-9);

        // Moving the ancestor is reflected immediately.
        store.update_shapes(vec![PartialShape::position(frame, 0.0, 0.0)]);
        let origin = store.page_transform(child).unwrap() * Point::ZERO;
        assert!((origin.y - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_batch_notifies_once() {
        let mut store = MemoryShapeStore::new();
        let a = store.insert(Shape::rectangle(0.0, 0.0, 1.0, 1.0)).unwrap();
        let b = store.insert(Shape::rectangle(5.0, 0.0, 1.0, 1.0)).unwrap();

        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        store.subscribe(Box::new(move |batch| sink.borrow_mut().push(batch.len())));

        store.update_shapes(vec![
            PartialShape::position(a, 1.0, 1.0),
            PartialShape::position(b, 2.0, 2.0),
            PartialShape::position(uuid::Uuid::new_v4(), 3.0, 3.0),
        ]);
        assert_eq!(*seen.borrow(), vec![2]);
        assert_eq!(store.get_shape(b).unwrap().x, 2.0);
    }

    #[test]
    fn test_remove_takes_descendants() {
        let mut store = MemoryShapeStore::new();
        let frame = store.insert(Shape::frame(0.0, 0.0, 100.0, 100.0)).unwrap();
        store
            .insert(Shape::rectangle(0.0, 0.0, 1.0, 1.0).with_parent(frame))
            .unwrap();
        store.remove(frame);
        assert!(store.is_empty());
    }
}
