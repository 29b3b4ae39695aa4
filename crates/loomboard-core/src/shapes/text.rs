//! Text blocks and sticky notes keep their size when a selection is resized.

use super::geo::{box_geometry, flip_offset, with_rotation_change};
use super::registry::{ResizeInfo, ShapeUtil, never, no_children_change, no_snap_points};
use super::{PartialShape, Shape};
use crate::geometry::rotate_vec;

pub(super) const FIXED_SIZE_UTIL: ShapeUtil = ShapeUtil {
    geometry: box_geometry,
    resize: resize_fixed,
    can_resize: never,
    is_aspect_locked: never,
    on_children_change: no_children_change,
    snap_points: no_snap_points,
};

/// Move a shape along with the selection without changing its size.
///
/// On a flipped axis the origin still shifts by the shape's own extent so the
/// box ends up where the mirrored box would be.
pub(super) fn resize_fixed(shape: &Shape, info: &ResizeInfo) -> PartialShape {
    let (w, h) = shape.props.size().unwrap_or((0.0, 0.0));
    let origin = info.origin + rotate_vec(flip_offset(info.scale, w, h), info.rotation);
    let partial = PartialShape::position(shape.id, origin.x, origin.y);
    with_rotation_change(shape, info, partial)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Point, Vec2};

    #[test]
    fn test_fixed_size_keeps_props() {
        let note = Shape::note(50.0, 50.0, 200.0, 200.0);
        let info = ResizeInfo {
            scale: Vec2::new(2.0, 2.0),
            origin: Point::new(100.0, 100.0),
            rotation: 0.0,
        };
        let partial = resize_fixed(&note, &info);
        assert_eq!(partial.x, Some(100.0));
        assert_eq!(partial.y, Some(100.0));
        assert!(partial.props.is_none());
    }

    #[test]
    fn test_fixed_size_flip_shifts_by_own_width() {
        let text = Shape::text(0.0, 0.0, 80.0, 20.0);
        let info = ResizeInfo {
            scale: Vec2::new(-0.5, 1.0),
            origin: Point::new(100.0, 0.0),
            rotation: 0.0,
        };
        let partial = resize_fixed(&text, &info);
        assert_eq!(partial.x, Some(20.0));
        assert!(partial.props.is_none());
    }
}
