//! Read-only geometric queries over the shape store.

use crate::error::{TransformError, TransformResult};
use crate::geometry::{Affine, Point, Rect, RectExt, affine_rotation, bounds_of_points};
use crate::shapes::{ParentId, Shape, ShapeId, ShapeRegistry};
use crate::store::{MAX_DEPTH, ShapeStore};
use std::collections::HashSet;

/// Geometry of shapes as currently recorded in a store.
///
/// Nothing is cached: every query walks the store, so results always reflect
/// the latest committed (or staged) state.
#[derive(Clone, Copy)]
pub struct ShapeGeometry<'a> {
    store: &'a dyn ShapeStore,
    registry: &'a ShapeRegistry,
}

impl<'a> ShapeGeometry<'a> {
    pub fn new(store: &'a dyn ShapeStore, registry: &'a ShapeRegistry) -> Self {
        Self { store, registry }
    }

    pub fn store(&self) -> &'a dyn ShapeStore {
        self.store
    }

    pub fn registry(&self) -> &'a ShapeRegistry {
        self.registry
    }

    pub fn shape(&self, id: ShapeId) -> TransformResult<&'a Shape> {
        self.store
            .get_shape(id)
            .ok_or(TransformError::ShapeNotFound(id))
    }

    /// Bounds in the shape's own frame.
    pub fn local_bounds(&self, id: ShapeId) -> TransformResult<Rect> {
        let shape = self.shape(id)?;
        Ok(self.registry.geometry(shape, self.store))
    }

    /// Transform from the shape's frame into its parent's frame.
    pub fn local_transform(&self, id: ShapeId) -> TransformResult<Affine> {
        Ok(self.shape(id)?.local_transform())
    }

    /// Transform from the shape's frame into page space.
    pub fn page_transform(&self, id: ShapeId) -> TransformResult<Affine> {
        self.store
            .page_transform(id)
            .ok_or(TransformError::ShapeNotFound(id))
    }

    /// Transform from the shape's parent frame into page space.
    pub fn parent_page_transform(&self, id: ShapeId) -> TransformResult<Affine> {
        match self.shape(id)?.parent {
            ParentId::Page => Ok(Affine::IDENTITY),
            ParentId::Shape(parent) => self.page_transform(parent),
        }
    }

    /// Rotation of the shape's x axis in page space.
    pub fn page_rotation(&self, id: ShapeId) -> TransformResult<f64> {
        Ok(affine_rotation(self.page_transform(id)?))
    }

    /// Local bounds corners mapped to page space (top-left, top-right, bottom-right, bottom-left).
    pub fn page_corners(&self, id: ShapeId) -> TransformResult<[Point; 4]> {
        let transform = self.page_transform(id)?;
        Ok(self.local_bounds(id)?.corners().map(|p| transform * p))
    }

    /// Axis-aligned page bounds.
    pub fn page_bounds(&self, id: ShapeId) -> TransformResult<Rect> {
        let transform = self.page_transform(id)?;
        Ok(self.local_bounds(id)?.transformed_bounds(transform))
    }

    /// Tight bounds of the shape in a frame rotated by `rotation` from page space.
    pub fn bounds_in_frame(&self, id: ShapeId, rotation: f64) -> TransformResult<Rect> {
        let to_frame = Affine::rotate(-rotation);
        let corners = self.page_corners(id)?;
        bounds_of_points(corners.map(|p| to_frame * p)).ok_or(TransformError::InvalidGeometry(id))
    }

    /// Box corners and center plus the kind's own snap points, in page space.
    pub fn page_snap_points(&self, id: ShapeId) -> TransformResult<Vec<Point>> {
        let shape = self.shape(id)?;
        let transform = self.page_transform(id)?;
        let mut points = self.page_bounds(id)?.snap_points().to_vec();
        let custom = self.registry.snap_points(shape);
        points.extend(custom.into_iter().map(|p| transform * p));
        Ok(points)
    }

    /// Ancestor ids, nearest first.
    pub fn ancestors(&self, id: ShapeId) -> Vec<ShapeId> {
        let parent_of = |id| self.store.get_shape(id).and_then(|s| s.parent.shape_id());
        let mut ancestors = Vec::new();
        let mut cursor = parent_of(id);
        while let Some(parent) = cursor {
            if ancestors.len() >= MAX_DEPTH {
                log::warn!("Parent chain of {} exceeds {} levels", id, MAX_DEPTH);
                break;
            }
            ancestors.push(parent);
            cursor = parent_of(parent);
        }
        ancestors
    }

    /// Descendant ids in depth-first, back-to-front order.
    pub fn descendants(&self, id: ShapeId) -> Vec<ShapeId> {
        let mut out = Vec::new();
        self.collect_descendants(id, 0, &mut out);
        out
    }

    fn collect_descendants(&self, id: ShapeId, depth: usize, out: &mut Vec<ShapeId>) {
        if depth >= MAX_DEPTH {
            return;
        }
        for child in self.store.sorted_child_ids(ParentId::Shape(id)) {
            out.push(child);
            self.collect_descendants(child, depth + 1, out);
        }
    }

    pub fn is_ancestor_of(&self, ancestor: ShapeId, id: ShapeId) -> bool {
        self.ancestors(id).contains(&ancestor)
    }

    /// The selected ids that have no selected ancestor, in selection order.
    pub fn top_level(&self, ids: &[ShapeId]) -> Vec<ShapeId> {
        let selected: HashSet<ShapeId> = ids.iter().copied().collect();
        let mut seen = HashSet::new();
        ids.iter()
            .copied()
            .filter(|id| self.store.get_shape(*id).is_some())
            .filter(|id| !self.ancestors(*id).iter().any(|a| selected.contains(a)))
            .filter(|id| seen.insert(*id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryShapeStore;
    use std::f64::consts::FRAC_PI_2;

    fn nested() -> (MemoryShapeStore, ShapeId, ShapeId, ShapeId) {
        let mut store = MemoryShapeStore::new();
        let frame = Shape::frame(100.0, 100.0, 200.0, 200.0).with_rotation(FRAC_PI_2);
        let frame = store.insert(frame).unwrap();
        let group = store
            .insert(Shape::group(0.0, 0.0).with_parent(frame))
            .unwrap();
        let rect = store
            .insert(Shape::rectangle(10.0, 20.0, 30.0, 40.0).with_parent(group))
            .unwrap();
        (store, frame, group, rect)
    }

    #[test]
    fn test_page_queries() {
        let (store, _, _, rect) = nested();
        let registry = ShapeRegistry::new();
        let geometry = ShapeGeometry::new(&store, &registry);

        let rotation = geometry.page_rotation(rect).unwrap();
        assert!((rotation - FRAC_PI_2).abs() < 1e-9);
        let bounds = geometry.page_bounds(rect).unwrap();
        // (10, 20) rotated a quarter turn is (-20, 10).
        assert!((bounds.min_x() - 40.0).abs() < 1e-9);
        assert!((bounds.min_y() - 110.0).abs() < 1e-9);
        assert!((bounds.width() - 40.0).abs() < 1e-9);
        assert!((bounds.height() - 30.0).abs() < 1e-9);

        let tight = geometry.bounds_in_frame(rect, FRAC_PI_2).unwrap();
        assert!((tight.width() - 30.0).abs() < 1e-9);
        assert!((tight.height() - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_hierarchy_queries() {
        let (store, frame, group, rect) = nested();
        let registry = ShapeRegistry::new();
        let geometry = ShapeGeometry::new(&store, &registry);

        assert_eq!(geometry.ancestors(rect), vec![group, frame]);
        assert_eq!(geometry.descendants(frame), vec![group, rect]);
        assert!(geometry.is_ancestor_of(frame, rect));
        assert!(!geometry.is_ancestor_of(rect, frame));
        assert_eq!(geometry.top_level(&[rect, frame, frame]), vec![frame]);
        assert_eq!(
            geometry.parent_page_transform(frame).unwrap(),
            Affine::IDENTITY
        );
    }

    #[test]
    fn test_missing_shape() {
        let store = MemoryShapeStore::new();
        let registry = ShapeRegistry::new();
        let geometry = ShapeGeometry::new(&store, &registry);
        let id = uuid::Uuid::new_v4();
        assert_eq!(
            geometry.page_bounds(id),
            Err(TransformError::ShapeNotFound(id))
        );
    }
}
