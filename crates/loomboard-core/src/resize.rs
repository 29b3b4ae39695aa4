//! Resize engine.
//!
//! A resize is a scale about an anchor, expressed in the selection frame.
//! The scale is turned into one page-space affine `S`, and every captured
//! shape is moved so that its page transform becomes `S` applied to its
//! snapshot, with the scale folded into the shape's own size instead of its
//! transform.

use crate::config::EngineConfig;
use crate::error::TransformError;
use crate::geometry::{
    Affine, COORD_EPSILON, Point, Vec2, affine_is_finite, normalize_angle, rotate_vec,
    transform_vec,
};
use crate::selection::{HandleKind, SelectionBounds};
use crate::session::{Session, SessionFlags, SessionKind, SessionSnapshot, TransformOutcome};
use crate::shapes::{ResizeInfo, ShapeId, ShapeRegistry};
use crate::snap::{SnapAxes, SnapLine, snap_handle, snap_to_grid};
use crate::store::ShapeStore;

pub type ResizeOutcome = TransformOutcome;

/// Scale factors and the fixed point, both in the selection frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeScale {
    pub scale: Vec2,
    pub anchor: Point,
}

/// Work out the scale for dragging `handle` by `delta` (page space).
///
/// The anchor is the opposite handle, or the center when `flags.alt` is set.
/// Uniform scaling applies when `locked` or `flags.shift`: corners keep the
/// larger factor with each axis's own sign; edges give the other axis the
/// magnitude of the dragged one.
pub fn compute_resize_scale(
    handle: HandleKind,
    bounds: &SelectionBounds,
    delta: Vec2,
    flags: SessionFlags,
    locked: bool,
) -> ResizeScale {
    let rect = bounds.rect;
    let start = handle.position_on(rect);
    let anchor = if flags.alt {
        rect.center()
    } else {
        handle.opposite().position_on(rect)
    };
    let moved = start + rotate_vec(delta, -bounds.rotation);

    let mut sx = if handle.moves_x() {
        (moved.x - anchor.x) / (start.x - anchor.x)
    } else {
        1.0
    };
    let mut sy = if handle.moves_y() {
        (moved.y - anchor.y) / (start.y - anchor.y)
    } else {
        1.0
    };

    if locked || flags.shift {
        match handle {
            HandleKind::Corner(_) => {
                let scale = uniform_scale(Vec2::new(sx, sy));
                return ResizeScale { scale, anchor };
            }
            HandleKind::Edge(_) if handle.moves_x() => sy = sx.abs(),
            HandleKind::Edge(_) => sx = sy.abs(),
            HandleKind::Rotate => {}
        }
    }
    ResizeScale {
        scale: Vec2::new(sx, sy),
        anchor,
    }
}

/// Both factors take the larger magnitude; each axis keeps its own sign.
pub fn uniform_scale(scale: Vec2) -> Vec2 {
    let magnitude = scale.x.abs().max(scale.y.abs());
    Vec2::new(magnitude.copysign(scale.x), magnitude.copysign(scale.y))
}

/// Page-space form of a scale in the selection frame:
/// `R(θ)·T(a)·diag(sx, sy)·T(-a)·R(-θ)`.
pub fn page_scale_transform(rotation: f64, scale: Vec2, anchor: Point) -> Affine {
    Affine::rotate(rotation)
        * Affine::translate(anchor.to_vec2())
        * Affine::scale_non_uniform(scale.x, scale.y)
        * Affine::translate(-anchor.to_vec2())
        * Affine::rotate(-rotation)
}

/// Split a parent-relative transform into origin, rotation and signed per-axis scale.
///
/// The rotation stays as close to `old_rotation` as possible, so aligned
/// scales keep the rotation and report signs on the scale instead.
fn decompose(local: Affine, old_rotation: f64) -> (Point, f64, Vec2) {
    let x_axis = transform_vec(local, Vec2::new(1.0, 0.0));
    let y_axis = transform_vec(local, Vec2::new(0.0, 1.0));
    let origin = local * Point::ZERO;

    let (rotation, sx) = if x_axis.hypot() <= COORD_EPSILON {
        (old_rotation, 0.0)
    } else {
        let reference = rotate_vec(Vec2::new(1.0, 0.0), old_rotation);
        let flipped = x_axis.dot(reference) < 0.0;
        let sign = if flipped { -1.0 } else { 1.0 };
        let facing = x_axis * sign;
        (normalize_angle(facing.y.atan2(facing.x)), sign * x_axis.hypot())
    };
    let sy = rotate_vec(y_axis, -rotation).y;
    (origin, rotation, Vec2::new(sx, sy))
}

/// Apply a page-space scale `transform` to every captured shape.
///
/// Top-level shapes are mapped first; children follow with their parent's
/// old and new page transforms so they scale together with it. A shape that
/// no longer exists or whose result is not finite is skipped along with its
/// subtree.
pub fn apply_scale(
    store: &dyn ShapeStore,
    registry: &ShapeRegistry,
    snapshot: &SessionSnapshot,
    transform: Affine,
) -> ResizeOutcome {
    let mut outcome = ResizeOutcome::default();
    for id in &snapshot.top_level {
        let Some(entry) = snapshot.get(*id) else {
            continue;
        };
        resize_subtree(
            store,
            registry,
            snapshot,
            transform,
            *id,
            entry.parent_page_transform,
            &mut outcome,
        );
    }
    outcome
}

fn resize_subtree(
    store: &dyn ShapeStore,
    registry: &ShapeRegistry,
    snapshot: &SessionSnapshot,
    transform: Affine,
    id: ShapeId,
    parent_new_page: Affine,
    outcome: &mut ResizeOutcome,
) {
    let Some(entry) = snapshot.get(id) else {
        return;
    };
    if store.get_shape(id).is_none() {
        outcome.skip(TransformError::ShapeNotFound(id));
        return;
    }
    if parent_new_page.determinant().abs() <= f64::EPSILON || !affine_is_finite(parent_new_page) {
        outcome.skip(TransformError::NonInvertible(id));
        return;
    }

    let shape = &entry.shape;
    let old_page = entry.parent_page_transform * shape.local_transform();
    let local = parent_new_page.inverse() * transform * old_page;
    if !affine_is_finite(local) {
        outcome.skip(TransformError::InvalidGeometry(id));
        return;
    }
    let (origin, rotation, scale) = decompose(local, shape.rotation);
    let info = ResizeInfo {
        scale,
        origin,
        rotation,
    };
    let partial = registry.resize(shape, &info);
    if !partial.is_finite() {
        outcome.skip(TransformError::InvalidGeometry(id));
        return;
    }

    let mut resized = shape.clone();
    resized.apply(&partial);
    let new_page = parent_new_page * resized.local_transform();
    outcome.updates.push(partial);

    for child in &entry.children {
        resize_subtree(
            store,
            registry,
            snapshot,
            transform,
            *child,
            new_page,
            outcome,
        );
    }
}

/// Recompute a resize session for its current pointer position.
pub fn update_resize(
    session: &Session,
    store: &dyn ShapeStore,
    registry: &ShapeRegistry,
    config: &EngineConfig,
    zoom: f64,
) -> (ResizeOutcome, Vec<SnapLine>) {
    let SessionKind::Resize { handle } = session.kind else {
        return (ResizeOutcome::default(), Vec::new());
    };
    let snapshot = &session.snapshot;
    let bounds = &snapshot.bounds;
    let mut delta = session.current - session.origin;
    let mut lines = Vec::new();

    // Handle snapping only makes sense when the handle moves along page axes.
    if bounds.is_axis_aligned() {
        let axes = SnapAxes {
            x: handle.moves_x(),
            y: handle.moves_y(),
        };
        let target = bounds.handle_position(handle) + delta;
        if session.flags.ctrl {
            let threshold = config.snap_distance / zoom;
            let snap = snap_handle(target, &snapshot.candidates, threshold, axes);
            delta += snap.nudge;
            lines = snap.lines;
        } else if config.grid.enabled {
            delta += snap_to_grid(target, config.grid.size, axes) - target;
        }
    }

    let locked = snapshot.aspect_locked;
    let scale = compute_resize_scale(handle, bounds, delta, session.flags, locked);
    let transform = page_scale_transform(bounds.rotation, scale.scale, scale.anchor);
    (apply_scale(store, registry, snapshot, transform), lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Camera;
    use crate::geometry::Rect;
    use crate::selection::{Corner, Edge};
    use crate::shapes::{PartialShape, Shape, ShapeKind, ShapeProps, ShapeUtil};
    use crate::store::MemoryShapeStore;
    use std::f64::consts::FRAC_PI_2;

    fn square_bounds() -> SelectionBounds {
        SelectionBounds {
            rect: Rect::new(10.0, 10.0, 110.0, 110.0),
            rotation: 0.0,
        }
    }

    #[test]
    fn test_corner_scale() {
        let scale = compute_resize_scale(
            HandleKind::Corner(Corner::TopLeft),
            &square_bounds(),
            Vec2::new(-10.0, -10.0),
            SessionFlags::default(),
            false,
        );
        assert!((scale.scale.x - 1.1).abs() < 1e-12);
        assert!((scale.scale.y - 1.1).abs() < 1e-12);
        assert_eq!(scale.anchor, Point::new(110.0, 110.0));
    }

    #[test]
    fn test_edge_scale_and_lock() {
        let bounds = square_bounds();
        let right = HandleKind::Edge(Edge::Right);
        let flags = SessionFlags::default();
        let free = compute_resize_scale(right, &bounds, Vec2::new(50.0, 20.0), flags, false);
        assert_eq!(free.scale, Vec2::new(1.5, 1.0));
        assert_eq!(free.anchor, Point::new(10.0, 60.0));

        let locked = compute_resize_scale(right, &bounds, Vec2::new(-150.0, 0.0), flags, true);
        assert_eq!(locked.scale, Vec2::new(-0.5, 0.5));
    }

    #[test]
    fn test_corner_lock_keeps_signs() {
        let flags = SessionFlags {
            shift: true,
            ..SessionFlags::default()
        };
        let scale = compute_resize_scale(
            HandleKind::Corner(Corner::BottomRight),
            &square_bounds(),
            Vec2::new(-300.0, 50.0),
            flags,
            false,
        );
        assert_eq!(scale.scale, Vec2::new(-2.0, 2.0));
    }

    #[test]
    fn test_alt_scales_from_center() {
        let flags = SessionFlags {
            alt: true,
            ..SessionFlags::default()
        };
        let scale = compute_resize_scale(
            HandleKind::Corner(Corner::BottomRight),
            &square_bounds(),
            Vec2::new(50.0, 50.0),
            flags,
            false,
        );
        assert_eq!(scale.anchor, Point::new(60.0, 60.0));
        assert_eq!(scale.scale, Vec2::new(2.0, 2.0));
    }

    #[test]
    fn test_rotated_frame_projects_delta() {
        let bounds = SelectionBounds {
            rect: Rect::new(0.0, 0.0, 100.0, 50.0),
            rotation: FRAC_PI_2,
        };
        // The frame's x axis points down the page.
        let scale = compute_resize_scale(
            HandleKind::Edge(Edge::Right),
            &bounds,
            Vec2::new(0.0, 100.0),
            SessionFlags::default(),
            false,
        );
        assert!((scale.scale.x - 2.0).abs() < 1e-9);
        assert_eq!(scale.scale.y, 1.0);
    }

    #[test]
    fn test_decompose_recovers_aligned_scale() {
        let stretch = Affine::scale_non_uniform(-2.0, 3.0);
        let local = Affine::translate(Vec2::new(5.0, 6.0)) * Affine::rotate(0.4) * stretch;
        let (origin, rotation, scale) = decompose(local, 0.4);
        assert!(origin.distance(Point::new(5.0, 6.0)) < 1e-9);
        assert!((rotation - 0.4).abs() < 1e-9);
        assert!((scale.x + 2.0).abs() < 1e-9);
        assert!((scale.y - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_apply_scale_flip_keeps_sizes_positive() {
        let mut store = MemoryShapeStore::new();
        let id = store
            .insert(Shape::rectangle(10.0, 10.0, 100.0, 100.0))
            .unwrap();
        let registry = ShapeRegistry::new();
        let snapshot = SessionSnapshot::capture(&store, &registry, &[id], &Camera::new()).unwrap();

        let transform = page_scale_transform(0.0, Vec2::new(-1.0, 1.0), Point::new(60.0, 60.0));
        let outcome = apply_scale(&store, &registry, &snapshot, transform);
        assert!(outcome.skipped.is_empty());
        let partial = &outcome.updates[0];
        assert!((partial.x.unwrap() - 10.0).abs() < 1e-9);
        assert_eq!(partial.rotation, None);
        let Some(ShapeProps::Geo { w, h }) = partial.props else {
            panic!("expected box props");
        };
        assert!((w - 100.0).abs() < 1e-9 && (h - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_apply_scale_skips_degenerate() {
        let mut store = MemoryShapeStore::new();
        let good = store
            .insert(Shape::rectangle(0.0, 0.0, 100.0, 100.0))
            .unwrap();
        let registry = ShapeRegistry::new();
        let camera = Camera::new();
        let snapshot = SessionSnapshot::capture(&store, &registry, &[good], &camera).unwrap();

        let transform = page_scale_transform(0.0, Vec2::new(f64::INFINITY, 1.0), Point::ZERO);
        let outcome = apply_scale(&store, &registry, &snapshot, transform);
        assert!(outcome.updates.is_empty());
        assert_eq!(outcome.skipped, vec![TransformError::InvalidGeometry(good)]);
    }

    #[test]
    fn test_failed_shape_does_not_block_the_rest() {
        fn broken_resize(shape: &Shape, _: &ResizeInfo) -> PartialShape {
            PartialShape::position(shape.id, f64::NAN, f64::NAN)
        }
        let mut store = MemoryShapeStore::new();
        let good = store
            .insert(Shape::rectangle(0.0, 0.0, 100.0, 100.0))
            .unwrap();
        let bad = store
            .insert(Shape::ellipse(200.0, 0.0, 100.0, 100.0))
            .unwrap();
        let mut registry = ShapeRegistry::new();
        let util = *registry.util(ShapeKind::Ellipse);
        let broken = ShapeUtil {
            resize: broken_resize,
            ..util
        };
        registry.register(ShapeKind::Ellipse, broken);
        let camera = Camera::new();
        let snapshot = SessionSnapshot::capture(&store, &registry, &[good, bad], &camera).unwrap();

        let transform = page_scale_transform(0.0, Vec2::new(2.0, 2.0), Point::ZERO);
        let outcome = apply_scale(&store, &registry, &snapshot, transform);
        assert_eq!(outcome.skipped, vec![TransformError::InvalidGeometry(bad)]);
        assert_eq!(outcome.updates.len(), 1);
        let partial = &outcome.updates[0];
        assert_eq!(partial.id, good);
        assert_eq!(partial.props, Some(ShapeProps::Geo { w: 200.0, h: 200.0 }));
    }

    #[test]
    fn test_uniform_scale_keeps_signs() {
        assert_eq!(uniform_scale(Vec2::new(2.0, 1.0)), Vec2::new(2.0, 2.0));
        assert_eq!(uniform_scale(Vec2::new(0.5, -3.0)), Vec2::new(3.0, -3.0));
        assert_eq!(uniform_scale(Vec2::new(-1.0, 1.0)), Vec2::new(-1.0, 1.0));
    }

    #[test]
    fn test_apply_scale_drops_missing_shape() {
        let mut store = MemoryShapeStore::new();
        let kept = store
            .insert(Shape::rectangle(0.0, 0.0, 10.0, 10.0))
            .unwrap();
        let gone = store
            .insert(Shape::rectangle(20.0, 0.0, 10.0, 10.0))
            .unwrap();
        let registry = ShapeRegistry::new();
        let camera = Camera::new();
        let snapshot = SessionSnapshot::capture(&store, &registry, &[kept, gone], &camera).unwrap();
        store.remove(gone);

        let transform = page_scale_transform(0.0, Vec2::new(2.0, 2.0), Point::ZERO);
        let outcome = apply_scale(&store, &registry, &snapshot, transform);
        assert_eq!(outcome.updates.len(), 1);
        assert_eq!(outcome.updates[0].id, kept);
        assert_eq!(outcome.skipped, vec![TransformError::ShapeNotFound(gone)]);
    }
}
