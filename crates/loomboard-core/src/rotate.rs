//! Rotate engine: turns the selection about its center.

use crate::config::EngineConfig;
use crate::error::TransformError;
use crate::geometry::{Affine, Point, Vec2, affine_is_finite, affine_rotation, angle_delta};
use crate::session::{Session, SessionSnapshot, TransformOutcome};
use crate::shapes::PartialShape;
use crate::snap::snap_angle;
use crate::store::ShapeStore;

/// Rotation about `center` by `angle`.
pub fn rotate_about(angle: f64, center: Point) -> Affine {
    let offset = center.to_vec2();
    Affine::translate(offset) * Affine::rotate(angle) * Affine::translate(-offset)
}

/// Angle swept by the pointer around `center` since `origin`.
///
/// With `snap_degrees` the resulting total rotation (starting from
/// `initial_rotation`) is rounded to that increment.
pub fn rotation_delta(
    center: Point,
    origin: Point,
    current: Point,
    initial_rotation: f64,
    snap_degrees: Option<f64>,
) -> f64 {
    let angle = |p: Point| {
        let v: Vec2 = p - center;
        v.y.atan2(v.x)
    };
    let delta = angle(current) - angle(origin);
    match snap_degrees {
        Some(increment) => {
            let total = snap_angle((initial_rotation + delta).to_degrees(), increment).to_radians();
            angle_delta(total, initial_rotation)
        }
        None => delta,
    }
}

/// Rotate every top-level captured shape by `angle` about `center`.
///
/// Children keep their local transforms; rotating the parent carries them.
pub fn rotate_partials(
    store: &dyn ShapeStore,
    snapshot: &SessionSnapshot,
    center: Point,
    angle: f64,
) -> TransformOutcome {
    let rotation = rotate_about(angle, center);
    let mut outcome = TransformOutcome::default();
    for id in &snapshot.top_level {
        let Some(entry) = snapshot.get(*id) else {
            continue;
        };
        if store.get_shape(*id).is_none() {
            outcome.skip(TransformError::ShapeNotFound(*id));
            continue;
        }
        let local = entry.parent_page_transform.inverse() * rotation * entry.page_transform;
        if !affine_is_finite(local) {
            outcome.skip(TransformError::InvalidGeometry(*id));
            continue;
        }
        let origin = local * Point::ZERO;
        let partial = PartialShape::position(*id, origin.x, origin.y)
            .with_rotation(affine_rotation(local));
        outcome.updates.push(partial);
    }
    outcome
}

/// Recompute a rotate session for its current pointer position.
pub fn update_rotate(
    session: &Session,
    store: &dyn ShapeStore,
    config: &EngineConfig,
) -> TransformOutcome {
    let snapshot = &session.snapshot;
    let center = snapshot.bounds.page_center();
    let snap = session.flags.shift.then_some(config.rotation_snap_degrees);
    let angle = rotation_delta(
        center,
        session.origin,
        session.current,
        snapshot.bounds.rotation,
        snap,
    );
    rotate_partials(store, snapshot, center, angle)
}
