//! Polylines scale their points directly.

use super::geo::with_rotation_change;
use super::registry::{ResizeInfo, ShapeRegistry, ShapeUtil, always, never, no_children_change};
use super::{PartialShape, Shape, ShapeProps};
use crate::geometry::{Point, Rect, bounds_of_points};
use crate::store::ShapeStore;

pub(super) const LINE_UTIL: ShapeUtil = ShapeUtil {
    geometry: line_geometry,
    resize: resize_line,
    can_resize: always,
    is_aspect_locked: never,
    on_children_change: no_children_change,
    snap_points: line_snap_points,
};

fn points(shape: &Shape) -> &[Point] {
    match &shape.props {
        ShapeProps::Line { points } => points,
        _ => &[],
    }
}

fn line_geometry(shape: &Shape, _: &dyn ShapeStore, _: &ShapeRegistry) -> Rect {
    bounds_of_points(points(shape).iter().copied()).unwrap_or(Rect::ZERO)
}

// Mirroring the points mirrors the line, so no origin compensation is needed.
fn resize_line(shape: &Shape, info: &ResizeInfo) -> PartialShape {
    let scaled = points(shape)
        .iter()
        .map(|p| Point::new(p.x * info.scale.x, p.y * info.scale.y))
        .collect();
    let partial = PartialShape::position(shape.id, info.origin.x, info.origin.y);
    with_rotation_change(shape, info, partial).with_props(ShapeProps::Line { points: scaled })
}

fn line_snap_points(shape: &Shape) -> Vec<Point> {
    points(shape).to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Vec2;
    use crate::store::MemoryShapeStore;

    #[test]
    fn test_line_geometry_and_resize() {
        let points = vec![Point::new(0.0, 0.0), Point::new(40.0, -20.0)];
        let line = Shape::line(10.0, 10.0, points);
        let store = MemoryShapeStore::new();
        let registry = ShapeRegistry::new();
        let bounds = registry.geometry(&line, &store);
        assert_eq!(bounds, Rect::new(0.0, -20.0, 40.0, 0.0));

        let info = ResizeInfo {
            scale: Vec2::new(-0.5, 2.0),
            origin: Point::new(10.0, 10.0),
            rotation: 0.0,
        };
        let partial = resize_line(&line, &info);
        let scaled = vec![Point::new(-0.0, 0.0), Point::new(-20.0, -40.0)];
        assert_eq!(partial.props, Some(ShapeProps::Line { points: scaled }));
        assert_eq!(registry.snap_points(&line).len(), 2);
    }
}
