//! Translate engine.

use crate::config::EngineConfig;
use crate::error::TransformError;
use crate::geometry::{Point, Vec2, transform_vec};
use crate::session::{Session, SessionSnapshot, TransformOutcome};
use crate::shapes::PartialShape;
use crate::snap::{SnapAxes, SnapLine, compute_snap, snap_to_grid};
use crate::store::ShapeStore;

/// Axes that keep moving when shift locks a drag to its dominant direction.
pub fn locked_axes(delta: Vec2, shift: bool) -> SnapAxes {
    if !shift {
        SnapAxes::BOTH
    } else if delta.x.abs() > delta.y.abs() {
        SnapAxes { x: true, y: false }
    } else {
        SnapAxes { x: false, y: true }
    }
}

/// Move every top-level captured shape by `delta` (page space).
///
/// Children ride along with their parents and are not written.
pub fn translate_partials(
    store: &dyn ShapeStore,
    snapshot: &SessionSnapshot,
    delta: Vec2,
) -> TransformOutcome {
    let mut outcome = TransformOutcome::default();
    for id in &snapshot.top_level {
        let Some(entry) = snapshot.get(*id) else {
            continue;
        };
        if store.get_shape(*id).is_none() {
            outcome.skip(TransformError::ShapeNotFound(*id));
            continue;
        }
        let local = transform_vec(entry.parent_page_transform.inverse(), delta);
        let partial = PartialShape::position(*id, entry.shape.x + local.x, entry.shape.y + local.y);
        if partial.is_finite() {
            outcome.updates.push(partial);
        } else {
            outcome.skip(TransformError::InvalidGeometry(*id));
        }
    }
    outcome
}

/// Recompute a translate session for its current pointer position.
///
/// With ctrl held the selection snaps to other shapes; otherwise the grid
/// (when enabled) rounds the selection's top-left corner. A shift-locked axis
/// neither moves nor snaps.
pub fn update_translate(
    session: &Session,
    store: &dyn ShapeStore,
    config: &EngineConfig,
    zoom: f64,
) -> (TransformOutcome, Vec<SnapLine>) {
    let snapshot = &session.snapshot;
    let raw = session.current - session.origin;
    let axes = locked_axes(raw, session.flags.shift);
    let mut delta = Vec2::new(
        if axes.x { raw.x } else { 0.0 },
        if axes.y { raw.y } else { 0.0 },
    );
    let mut lines = Vec::new();

    let moving = snapshot.page_bounds + delta;
    if session.flags.ctrl {
        let threshold = config.snap_distance / zoom;
        let snap = compute_snap(true, moving, &snapshot.candidates, threshold, axes);
        delta += snap.nudge;
        lines = snap.lines;
    } else if config.grid.enabled {
        let corner = Point::new(moving.x0, moving.y0);
        delta += snap_to_grid(corner, config.grid.size, axes) - corner;
    }

    (translate_partials(store, snapshot, delta), lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Camera;
    use crate::shapes::{Shape, ShapeRegistry};
    use crate::store::MemoryShapeStore;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_locked_axes() {
        let horizontal = SnapAxes { x: true, y: false };
        let vertical = SnapAxes { x: false, y: true };
        assert_eq!(locked_axes(Vec2::new(10.0, 3.0), false), SnapAxes::BOTH);
        assert_eq!(locked_axes(Vec2::new(10.0, 3.0), true), horizontal);
        assert_eq!(locked_axes(Vec2::new(-1.0, -3.0), true), vertical);
    }

    #[test]
    fn test_translate_in_rotated_parent() {
        let mut store = MemoryShapeStore::new();
        let frame = Shape::frame(100.0, 100.0, 200.0, 200.0).with_rotation(FRAC_PI_2);
        let frame = store.insert(frame).unwrap();
        let child = store
            .insert(Shape::rectangle(10.0, 10.0, 20.0, 20.0).with_parent(frame))
            .unwrap();
        let registry = ShapeRegistry::new();
        let camera = Camera::new();
        let snapshot = SessionSnapshot::capture(&store, &registry, &[child], &camera).unwrap();

        let before = store.page_transform(child).unwrap() * Point::ZERO;
        let outcome = translate_partials(&store, &snapshot, Vec2::new(30.0, 0.0));
        store.update_shapes(outcome.updates);
        let after = store.page_transform(child).unwrap() * Point::ZERO;

        assert!((after.x - before.x - 30.0).abs() < 1e-9);
        assert!((after.y - before.y).abs() < 1e-9);
        // Moving right on the page is moving "up" in the rotated frame.
        assert!((store.get_shape(child).unwrap().y - -20.0).abs() < 1e-9);
    }
}
