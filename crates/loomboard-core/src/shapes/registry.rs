//! Per-kind operation tables.
//!
//! Each shape kind is described by a [`ShapeUtil`], a small table of plain
//! function pointers. Dispatch is a map lookup on the kind tag.

use super::{PartialShape, Shape, ShapeKind, geo, group, image, line, text};
use crate::geometry::{Point, Rect, Vec2};
use crate::store::ShapeStore;
use std::collections::HashMap;

/// Input to a shape's resize operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeInfo {
    /// Signed scale along the shape's own x and y axes.
    pub scale: Vec2,
    /// Where the shape's origin lands in parent space when the scale is
    /// applied literally, before any flip compensation.
    pub origin: Point,
    /// Rotation relative to the parent after the resize. Differs from the
    /// shape's current rotation only when the resize mirrors a shape that is
    /// not aligned with the selection.
    pub rotation: f64,
}

/// Operations a shape kind provides to the transform engine.
#[derive(Clone, Copy)]
pub struct ShapeUtil {
    /// Local bounds in the shape's own frame.
    pub geometry: fn(&Shape, &dyn ShapeStore, &ShapeRegistry) -> Rect,
    /// New position and props after scaling.
    pub resize: fn(&Shape, &ResizeInfo) -> PartialShape,
    /// Whether the shape changes size when resized (false = translate only).
    pub can_resize: fn(&Shape) -> bool,
    /// Whether the shape forces uniform scaling on any selection it is part of.
    pub is_aspect_locked: fn(&Shape) -> bool,
    /// Fix-ups to run after the shape's children changed.
    pub on_children_change: fn(&Shape, &dyn ShapeStore, &ShapeRegistry) -> Vec<PartialShape>,
    /// Extra alignment points in the shape's own frame, beyond box corners and center.
    pub snap_points: fn(&Shape) -> Vec<Point>,
}

impl std::fmt::Debug for ShapeUtil {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShapeUtil").finish_non_exhaustive()
    }
}

pub(super) fn always(_: &Shape) -> bool {
    true
}

pub(super) fn never(_: &Shape) -> bool {
    false
}

pub(super) fn no_children_change(
    _: &Shape,
    _: &dyn ShapeStore,
    _: &ShapeRegistry,
) -> Vec<PartialShape> {
    Vec::new()
}

pub(super) fn no_snap_points(_: &Shape) -> Vec<Point> {
    Vec::new()
}

/// Maps shape kinds to their operations.
#[derive(Debug, Clone)]
pub struct ShapeRegistry {
    utils: HashMap<ShapeKind, ShapeUtil>,
}

impl Default for ShapeRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(ShapeKind::Rectangle, geo::GEO_UTIL);
        registry.register(ShapeKind::Ellipse, geo::GEO_UTIL);
        registry.register(ShapeKind::Frame, geo::GEO_UTIL);
        registry.register(ShapeKind::Text, text::FIXED_SIZE_UTIL);
        registry.register(ShapeKind::Note, text::FIXED_SIZE_UTIL);
        registry.register(ShapeKind::Image, image::IMAGE_UTIL);
        registry.register(ShapeKind::Line, line::LINE_UTIL);
        registry.register(ShapeKind::Group, group::GROUP_UTIL);
        registry
    }
}

impl ShapeRegistry {
    /// A registry with the built-in kinds.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with nothing registered; every kind falls back to plain box behavior.
    pub fn empty() -> Self {
        Self {
            utils: HashMap::new(),
        }
    }

    /// Register (or replace) the operations for a kind.
    pub fn register(&mut self, kind: ShapeKind, util: ShapeUtil) {
        self.utils.insert(kind, util);
    }

    /// Operations for a kind.
    pub fn util(&self, kind: ShapeKind) -> &ShapeUtil {
        self.utils.get(&kind).unwrap_or(&geo::GEO_UTIL)
    }

    /// Local bounds of a shape.
    pub fn geometry(&self, shape: &Shape, store: &dyn ShapeStore) -> Rect {
        (self.util(shape.kind).geometry)(shape, store, self)
    }

    /// Resize a shape, or only translate it when the kind opts out of scaling.
    pub fn resize(&self, shape: &Shape, info: &ResizeInfo) -> PartialShape {
        let util = self.util(shape.kind);
        if (util.can_resize)(shape) {
            (util.resize)(shape, info)
        } else {
            text::resize_fixed(shape, info)
        }
    }

    /// Whether a shape resizes rather than only translating.
    pub fn can_resize(&self, shape: &Shape) -> bool {
        (self.util(shape.kind).can_resize)(shape)
    }

    /// Whether a shape forces uniform scaling.
    pub fn is_aspect_locked(&self, shape: &Shape) -> bool {
        (self.util(shape.kind).is_aspect_locked)(shape)
    }

    /// Fix-ups for a shape whose children changed.
    pub fn on_children_change(&self, shape: &Shape, store: &dyn ShapeStore) -> Vec<PartialShape> {
        (self.util(shape.kind).on_children_change)(shape, store, self)
    }

    /// Custom snap points in the shape's own frame.
    pub fn snap_points(&self, shape: &Shape) -> Vec<Point> {
        (self.util(shape.kind).snap_points)(shape)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryShapeStore;

    #[test]
    fn test_builtin_dispatch() {
        let registry = ShapeRegistry::new();
        let rectangle = Shape::rectangle(0.0, 0.0, 1.0, 1.0);
        let note = Shape::note(0.0, 0.0, 1.0, 1.0);
        let image = Shape::image(0.0, 0.0, 1.0, 1.0);
        let ellipse = Shape::ellipse(0.0, 0.0, 1.0, 1.0);
        assert!(registry.can_resize(&rectangle));
        assert!(!registry.can_resize(&note));
        assert!(registry.is_aspect_locked(&image));
        assert!(!registry.is_aspect_locked(&ellipse));
    }

    #[test]
    fn test_register_overrides() {
        fn locked(_: &Shape) -> bool {
            true
        }
        let mut registry = ShapeRegistry::new();
        let util = ShapeUtil {
            is_aspect_locked: locked,
            ..geo::GEO_UTIL
        };
        registry.register(ShapeKind::Rectangle, util);
        let rectangle = Shape::rectangle(0.0, 0.0, 1.0, 1.0);
        assert!(registry.is_aspect_locked(&rectangle));
    }

    #[test]
    fn test_empty_registry_falls_back_to_box() {
        let store = MemoryShapeStore::new();
        let registry = ShapeRegistry::empty();
        let bounds = registry.geometry(&Shape::note(0.0, 0.0, 30.0, 40.0), &store);
        assert_eq!(bounds, Rect::new(0.0, 0.0, 30.0, 40.0));
    }
}
