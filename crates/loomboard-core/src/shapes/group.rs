//! Groups have no geometry of their own; they wrap their children.

use super::geo::with_rotation_change;
use super::registry::{ResizeInfo, ShapeRegistry, ShapeUtil, always, never, no_snap_points};
use super::{ParentId, PartialShape, Shape};
use crate::geometry::{COORD_EPSILON, Rect, RectExt, Vec2, rotate_vec};
use crate::store::ShapeStore;

pub(super) const GROUP_UTIL: ShapeUtil = ShapeUtil {
    geometry: group_geometry,
    resize: resize_group,
    can_resize: always,
    is_aspect_locked: never,
    on_children_change: fit_to_children,
    snap_points: no_snap_points,
};

/// Union of the children's bounds in the group's frame. Empty groups collapse to their origin.
fn group_geometry(shape: &Shape, store: &dyn ShapeStore, registry: &ShapeRegistry) -> Rect {
    store
        .sorted_child_ids(ParentId::Shape(shape.id))
        .into_iter()
        .filter_map(|id| store.get_shape(id))
        .map(|child| bounds_in_parent(child, store, registry))
        .reduce(|acc, bounds| acc.union(bounds))
        .unwrap_or(Rect::ZERO)
}

fn bounds_in_parent(child: &Shape, store: &dyn ShapeStore, registry: &ShapeRegistry) -> Rect {
    let bounds = registry.geometry(child, store);
    bounds.transformed_bounds(child.local_transform())
}

// Children are scaled individually; the group only follows its origin.
fn resize_group(shape: &Shape, info: &ResizeInfo) -> PartialShape {
    let partial = PartialShape::position(shape.id, info.origin.x, info.origin.y);
    with_rotation_change(shape, info, partial)
}

/// Move the group origin to the top-left of its children and shift the
/// children back so nothing moves on the page.
fn fit_to_children(
    shape: &Shape,
    store: &dyn ShapeStore,
    registry: &ShapeRegistry,
) -> Vec<PartialShape> {
    let children = store.sorted_child_ids(ParentId::Shape(shape.id));
    if children.is_empty() {
        return Vec::new();
    }
    let offset = group_geometry(shape, store, registry).origin().to_vec2();
    if offset.hypot() <= COORD_EPSILON {
        return Vec::new();
    }

    let moved = Vec2::new(shape.x, shape.y) + rotate_vec(offset, shape.rotation);
    let mut updates = vec![PartialShape::position(shape.id, moved.x, moved.y)];
    updates.extend(
        children
            .into_iter()
            .filter_map(|id| store.get_shape(id))
            .map(|child| PartialShape::position(child.id, child.x - offset.x, child.y - offset.y)),
    );
    updates
}
