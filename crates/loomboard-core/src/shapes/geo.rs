//! Box shapes: rectangles, ellipses and frames.

use super::registry::{
    ResizeInfo, ShapeRegistry, ShapeUtil, always, never, no_children_change, no_snap_points,
};
use super::{PartialShape, Shape, ShapeProps};
use crate::geometry::{Rect, Vec2, angles_equal, rotate_vec};
use crate::store::ShapeStore;

pub(super) const GEO_UTIL: ShapeUtil = ShapeUtil {
    geometry: box_geometry,
    resize: resize_box,
    can_resize: always,
    is_aspect_locked: never,
    on_children_change: no_children_change,
    snap_points: no_snap_points,
};

/// Local bounds of a box-like shape; shapes without a size collapse to their origin.
pub(super) fn box_geometry(shape: &Shape, _: &dyn ShapeStore, _: &ShapeRegistry) -> Rect {
    let (w, h) = shape.props.size().unwrap_or((0.0, 0.0));
    Rect::new(0.0, 0.0, w, h)
}

/// Offset that keeps a box of size `(w, h)` on the right side of the origin after a flip.
///
/// A negative scale mirrors the box through its origin; shifting the origin by
/// the box size along each flipped axis lands it on the mirrored box's top-left.
pub(super) fn flip_offset(scale: Vec2, w: f64, h: f64) -> Vec2 {
    Vec2::new(
        if scale.x < 0.0 { -w } else { 0.0 },
        if scale.y < 0.0 { -h } else { 0.0 },
    )
}

/// Scale a box, keeping its recorded width and height non-negative.
pub(super) fn resize_box(shape: &Shape, info: &ResizeInfo) -> PartialShape {
    let (w, h) = shape.props.size().unwrap_or((0.0, 0.0));
    let new_w = w * info.scale.x.abs();
    let new_h = h * info.scale.y.abs();
    let origin = info.origin + rotate_vec(flip_offset(info.scale, new_w, new_h), info.rotation);

    let partial = PartialShape::position(shape.id, origin.x, origin.y);
    with_rotation_change(shape, info, partial).with_props(ShapeProps::Geo { w: new_w, h: new_h })
}

/// Carry the resize's rotation into `partial` when it differs from the shape's.
pub(super) fn with_rotation_change(
    shape: &Shape,
    info: &ResizeInfo,
    partial: PartialShape,
) -> PartialShape {
    if angles_equal(shape.rotation, info.rotation) {
        partial
    } else {
        partial.with_rotation(info.rotation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_resize_box_positive() {
        let shape = Shape::rectangle(10.0, 10.0, 100.0, 50.0);
        let info = ResizeInfo {
            scale: Vec2::new(2.0, 0.5),
            origin: Point::new(0.0, 0.0),
            rotation: 0.0,
        };
        let partial = resize_box(&shape, &info);
        assert_eq!(partial.x, Some(0.0));
        assert_eq!(partial.props, Some(ShapeProps::Geo { w: 200.0, h: 25.0 }));
    }

    #[test]
    fn test_resize_box_flip_recenters() {
        // Mirroring [10, 110] through x = 0 gives [-110, -10].
        let shape = Shape::rectangle(10.0, 0.0, 100.0, 50.0);
        let info = ResizeInfo {
            scale: Vec2::new(-1.0, 1.0),
            origin: Point::new(-10.0, 0.0),
            rotation: 0.0,
        };
        let partial = resize_box(&shape, &info);
        assert_eq!(partial.x, Some(-110.0));
        assert_eq!(partial.y, Some(0.0));
        assert_eq!(partial.props, Some(ShapeProps::Geo { w: 100.0, h: 50.0 }));
    }

    #[test]
    fn test_resize_box_flip_follows_rotation() {
        let shape = Shape::rectangle(0.0, 0.0, 100.0, 50.0).with_rotation(FRAC_PI_2);
        let info = ResizeInfo {
            scale: Vec2::new(-1.0, 1.0),
            origin: Point::ZERO,
            rotation: shape.rotation,
        };
        let partial = resize_box(&shape, &info);
        assert_eq!(partial.rotation, None);
        // The shape's x axis points down the page, so the flip offset does too.
        assert!(partial.x.unwrap().abs() < 1e-9);
        assert!((partial.y.unwrap() + 100.0).abs() < 1e-9);
    }
}
