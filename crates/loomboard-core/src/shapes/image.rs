//! Image shapes resize uniformly and track mirroring in their props.

use super::geo::{box_geometry, flip_offset, with_rotation_change};
use super::registry::{ResizeInfo, ShapeUtil, always, no_children_change, no_snap_points};
use super::{PartialShape, Shape, ShapeProps};
use crate::geometry::rotate_vec;

pub(super) const IMAGE_UTIL: ShapeUtil = ShapeUtil {
    geometry: box_geometry,
    resize: resize_image,
    can_resize: always,
    is_aspect_locked: always,
    on_children_change: no_children_change,
    snap_points: no_snap_points,
};

fn resize_image(shape: &Shape, info: &ResizeInfo) -> PartialShape {
    let ShapeProps::Image { flip_x, flip_y, .. } = shape.props else {
        return super::geo::resize_box(shape, info);
    };
    let (w, h) = shape.props.size().unwrap_or((0.0, 0.0));
    let new_w = w * info.scale.x.abs();
    let new_h = h * info.scale.y.abs();
    let origin = info.origin + rotate_vec(flip_offset(info.scale, new_w, new_h), info.rotation);

    let props = ShapeProps::Image {
        w: new_w,
        h: new_h,
        flip_x: flip_x ^ (info.scale.x < 0.0),
        flip_y: flip_y ^ (info.scale.y < 0.0),
    };
    let partial = PartialShape::position(shape.id, origin.x, origin.y);
    with_rotation_change(shape, info, partial).with_props(props)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Point, Vec2};

    #[test]
    fn test_image_flip_toggles() {
        let mut image = Shape::image(0.0, 0.0, 40.0, 30.0);
        let flip = ResizeInfo {
            scale: Vec2::new(-1.0, 1.0),
            origin: Point::ZERO,
            rotation: 0.0,
        };

        let partial = resize_image(&image, &flip);
        assert_eq!(partial.x, Some(-40.0));
        let mirrored = ShapeProps::Image {
            w: 40.0,
            h: 30.0,
            flip_x: true,
            flip_y: false,
        };
        assert_eq!(partial.props, Some(mirrored));

        // Flipping twice returns to the original orientation.
        image.apply(&partial);
        let back = ResizeInfo {
            origin: Point::new(-40.0, 0.0),
            ..flip
        };
        let partial = resize_image(&image, &back);
        let upright = ShapeProps::Image {
            w: 40.0,
            h: 30.0,
            flip_x: false,
            flip_y: false,
        };
        assert_eq!(partial.props, Some(upright));
    }
}
