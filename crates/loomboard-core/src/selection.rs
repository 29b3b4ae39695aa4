//! Selection bounds, aspect lock and the handle system.

use crate::accessor::ShapeGeometry;
use crate::geometry::{
    Affine, Point, Rect, RectExt, Vec2, angle_delta, angles_equal, is_quarter_turn,
};
use crate::shapes::ShapeId;
use serde::{Deserialize, Serialize};

/// Handle size in screen pixels.
pub const HANDLE_SIZE: f64 = 8.0;

/// Type of selection handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HandleKind {
    /// Corner handle, scales both axes.
    Corner(Corner),
    /// Edge midpoint handle, scales one axis.
    Edge(Edge),
    /// Rotation handle (positioned above the top edge).
    Rotate,
}

/// Corner positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// Edge positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Edge {
    Top,
    Right,
    Bottom,
    Left,
}

impl HandleKind {
    pub const CORNERS: [HandleKind; 4] = [
        HandleKind::Corner(Corner::TopLeft),
        HandleKind::Corner(Corner::TopRight),
        HandleKind::Corner(Corner::BottomRight),
        HandleKind::Corner(Corner::BottomLeft),
    ];

    pub const EDGES: [HandleKind; 4] = [
        HandleKind::Edge(Edge::Top),
        HandleKind::Edge(Edge::Right),
        HandleKind::Edge(Edge::Bottom),
        HandleKind::Edge(Edge::Left),
    ];

    /// Position within a box as fractions of its width and height.
    /// The rotate handle sits at the top-center.
    pub fn unit_position(self) -> Vec2 {
        match self {
            HandleKind::Corner(Corner::TopLeft) => Vec2::new(0.0, 0.0),
            HandleKind::Corner(Corner::TopRight) => Vec2::new(1.0, 0.0),
            HandleKind::Corner(Corner::BottomRight) => Vec2::new(1.0, 1.0),
            HandleKind::Corner(Corner::BottomLeft) => Vec2::new(0.0, 1.0),
            HandleKind::Edge(Edge::Top) | HandleKind::Rotate => Vec2::new(0.5, 0.0),
            HandleKind::Edge(Edge::Right) => Vec2::new(1.0, 0.5),
            HandleKind::Edge(Edge::Bottom) => Vec2::new(0.5, 1.0),
            HandleKind::Edge(Edge::Left) => Vec2::new(0.0, 0.5),
        }
    }

    /// Position of this handle on `rect`, in the rect's own coordinates.
    pub fn position_on(self, rect: Rect) -> Point {
        let unit = self.unit_position();
        Point::new(
            rect.x0 + unit.x * rect.width(),
            rect.y0 + unit.y * rect.height(),
        )
    }

    /// The handle diagonally or directly across the box.
    pub fn opposite(self) -> HandleKind {
        match self {
            HandleKind::Corner(Corner::TopLeft) => HandleKind::Corner(Corner::BottomRight),
            HandleKind::Corner(Corner::TopRight) => HandleKind::Corner(Corner::BottomLeft),
            HandleKind::Corner(Corner::BottomRight) => HandleKind::Corner(Corner::TopLeft),
            HandleKind::Corner(Corner::BottomLeft) => HandleKind::Corner(Corner::TopRight),
            HandleKind::Edge(Edge::Top) | HandleKind::Rotate => HandleKind::Edge(Edge::Bottom),
            HandleKind::Edge(Edge::Right) => HandleKind::Edge(Edge::Left),
            HandleKind::Edge(Edge::Bottom) => HandleKind::Edge(Edge::Top),
            HandleKind::Edge(Edge::Left) => HandleKind::Edge(Edge::Right),
        }
    }

    /// Whether dragging this handle changes the width.
    pub fn moves_x(self) -> bool {
        matches!(
            self,
            HandleKind::Corner(_) | HandleKind::Edge(Edge::Left | Edge::Right)
        )
    }

    /// Whether dragging this handle changes the height.
    pub fn moves_y(self) -> bool {
        matches!(
            self,
            HandleKind::Corner(_) | HandleKind::Edge(Edge::Top | Edge::Bottom)
        )
    }

    pub fn is_resize(self) -> bool {
        !matches!(self, HandleKind::Rotate)
    }
}

/// A selection handle with its position and type.
#[derive(Debug, Clone, Copy)]
pub struct Handle {
    /// Position in page coordinates.
    pub position: Point,
    pub kind: HandleKind,
}

impl Handle {
    pub fn new(position: Point, kind: HandleKind) -> Self {
        Self { position, kind }
    }

    /// Check if a point (in page coordinates) hits this handle.
    /// `tolerance` should be adjusted for camera zoom.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        let dx = point.x - self.position.x;
        let dy = point.y - self.position.y;
        dx * dx + dy * dy <= tolerance * tolerance
    }
}

/// The oriented box around the current selection.
///
/// `rect` is expressed in the selection frame: page space rotated by `-rotation`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SelectionBounds {
    pub rect: Rect,
    pub rotation: f64,
}

impl SelectionBounds {
    /// Selection frame to page space.
    pub fn frame_to_page(&self) -> Affine {
        Affine::rotate(self.rotation)
    }

    /// Page space to selection frame.
    pub fn page_to_frame(&self) -> Affine {
        Affine::rotate(-self.rotation)
    }

    pub fn page_corners(&self) -> [Point; 4] {
        let to_page = self.frame_to_page();
        self.rect.corners().map(|p| to_page * p)
    }

    pub fn page_center(&self) -> Point {
        self.frame_to_page() * self.rect.center()
    }

    /// Page position of a resize handle.
    pub fn handle_position(&self, handle: HandleKind) -> Point {
        self.frame_to_page() * handle.position_on(self.rect)
    }

    /// Whether the box is axis-aligned on the page.
    pub fn is_axis_aligned(&self) -> bool {
        angles_equal(self.rotation, 0.0)
    }
}

/// Oriented bounds of the given shapes (expected to be top-level selection members).
///
/// When every shape has the same page rotation the box is tight in that
/// rotation's frame; otherwise it is the axis-aligned union.
pub fn compute_selection_bounds(
    geometry: &ShapeGeometry<'_>,
    ids: &[ShapeId],
) -> Option<SelectionBounds> {
    let rotations: Vec<f64> = ids
        .iter()
        .filter_map(|id| geometry.page_rotation(*id).ok())
        .collect();
    let first = *rotations.first()?;
    let aligned = rotations.iter().all(|r| angles_equal(*r, first));
    let rotation = if aligned { first } else { 0.0 };

    let rect = ids
        .iter()
        .filter_map(|id| geometry.bounds_in_frame(*id, rotation).ok())
        .reduce(|acc, r| acc.union(r))?;
    Some(SelectionBounds { rect, rotation })
}

/// Whether resizing this selection must keep the aspect ratio.
///
/// True when any participating shape, descendants included, is rotated by
/// something other than a whole number of quarter turns relative to the
/// selection, or when a shape's kind always scales uniformly.
pub fn compute_aspect_lock(
    geometry: &ShapeGeometry<'_>,
    ids: &[ShapeId],
    selection_rotation: f64,
) -> bool {
    ids.iter()
        .flat_map(|id| std::iter::once(*id).chain(geometry.descendants(*id)))
        .any(|id| {
            let rotated = geometry
                .page_rotation(id)
                .is_ok_and(|r| !is_quarter_turn(angle_delta(r, selection_rotation)));
            let locked = geometry
                .shape(id)
                .is_ok_and(|shape| geometry.registry().is_aspect_locked(shape));
            rotated || locked
        })
}

/// Resize and rotate handles around the selection, in page space.
///
/// `rotate_offset` is the rotate handle's distance above the top edge, in page units.
pub fn selection_handles(bounds: &SelectionBounds, rotate_offset: f64) -> Vec<Handle> {
    let mut handles: Vec<Handle> = HandleKind::CORNERS
        .into_iter()
        .chain(HandleKind::EDGES)
        .map(|kind| Handle::new(bounds.handle_position(kind), kind))
        .collect();
    let top = HandleKind::Rotate.position_on(bounds.rect);
    let rotate = bounds.frame_to_page() * Point::new(top.x, top.y - rotate_offset);
    handles.push(Handle::new(rotate, HandleKind::Rotate));
    handles
}

/// Find the handle under `point`. Corners and the rotate handle win over edges.
///
/// Edge handles span their whole edge. `tolerance` and `rotate_offset` are in page units.
pub fn hit_test_selection_handles(
    bounds: &SelectionBounds,
    point: Point,
    tolerance: f64,
    rotate_offset: f64,
) -> Option<HandleKind> {
    let handles = selection_handles(bounds, rotate_offset);
    if let Some(handle) = handles
        .iter()
        .find(|h| !matches!(h.kind, HandleKind::Edge(_)) && h.hit_test(point, tolerance))
    {
        return Some(handle.kind);
    }

    let local = bounds.page_to_frame() * point;
    let rect = bounds.rect;
    let within_x = local.x >= rect.x0 - tolerance && local.x <= rect.x1 + tolerance;
    let within_y = local.y >= rect.y0 - tolerance && local.y <= rect.y1 + tolerance;
    if within_x && (local.y - rect.y0).abs() <= tolerance {
        Some(HandleKind::Edge(Edge::Top))
    } else if within_x && (local.y - rect.y1).abs() <= tolerance {
        Some(HandleKind::Edge(Edge::Bottom))
    } else if within_y && (local.x - rect.x0).abs() <= tolerance {
        Some(HandleKind::Edge(Edge::Left))
    } else if within_y && (local.x - rect.x1).abs() <= tolerance {
        Some(HandleKind::Edge(Edge::Right))
    } else {
        None
    }
}

/// Cursor shapes the UI can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CursorKind {
    #[default]
    Default,
    /// Diagonal resize, top-left to bottom-right.
    NwseResize,
    /// Diagonal resize, top-right to bottom-left.
    NeswResize,
    EwResize,
    NsResize,
    Rotate,
    Move,
}

/// Cursor to display, rotated with the selection.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CursorHint {
    pub kind: CursorKind,
    pub rotation: f64,
}

/// Cursor for hovering or dragging a handle on a selection rotated by `rotation`.
pub fn cursor_for_handle(handle: HandleKind, rotation: f64) -> CursorHint {
    let kind = match handle {
        HandleKind::Corner(Corner::TopLeft | Corner::BottomRight) => CursorKind::NwseResize,
        HandleKind::Corner(Corner::TopRight | Corner::BottomLeft) => CursorKind::NeswResize,
        HandleKind::Edge(Edge::Left | Edge::Right) => CursorKind::EwResize,
        HandleKind::Edge(Edge::Top | Edge::Bottom) => CursorKind::NsResize,
        HandleKind::Rotate => CursorKind::Rotate,
    };
    CursorHint { kind, rotation }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{Shape, ShapeRegistry};
    use crate::store::MemoryShapeStore;
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, FRAC_PI_6};

    #[test]
    fn test_handle_positions() {
        let rect = Rect::new(10.0, 20.0, 110.0, 70.0);
        let bottom_right = HandleKind::Corner(Corner::BottomRight);
        let left = HandleKind::Edge(Edge::Left);
        assert_eq!(bottom_right.position_on(rect), Point::new(110.0, 70.0));
        assert_eq!(left.position_on(rect), Point::new(10.0, 45.0));
        assert_eq!(
            HandleKind::Corner(Corner::TopRight).opposite(),
            HandleKind::Corner(Corner::BottomLeft)
        );
        assert!(HandleKind::Edge(Edge::Top).moves_y());
        assert!(!HandleKind::Edge(Edge::Top).moves_x());
    }

    #[test]
    fn test_bounds_of_rotated_single_shape() {
        let mut store = MemoryShapeStore::new();
        let shape = Shape::rectangle(100.0, 100.0, 80.0, 40.0).with_rotation(FRAC_PI_6);
        let id = store.insert(shape).unwrap();
        let registry = ShapeRegistry::new();
        let geometry = ShapeGeometry::new(&store, &registry);

        let bounds = compute_selection_bounds(&geometry, &[id]).unwrap();
        assert!((bounds.rotation - FRAC_PI_6).abs() < 1e-9);
        assert!((bounds.rect.width() - 80.0).abs() < 1e-9);
        assert!((bounds.rect.height() - 40.0).abs() < 1e-9);
        let top_left = bounds.page_corners()[0];
        assert!(top_left.distance(Point::new(100.0, 100.0)) < 1e-9);
    }

    #[test]
    fn test_bounds_of_mixed_rotations_is_axis_aligned() {
        let mut store = MemoryShapeStore::new();
        let a = store
            .insert(Shape::rectangle(0.0, 0.0, 100.0, 50.0))
            .unwrap();
        let b = Shape::rectangle(200.0, 0.0, 100.0, 50.0).with_rotation(FRAC_PI_2);
        let b = store.insert(b).unwrap();
        let registry = ShapeRegistry::new();
        let geometry = ShapeGeometry::new(&store, &registry);

        let bounds = compute_selection_bounds(&geometry, &[a, b]).unwrap();
        assert_eq!(bounds.rotation, 0.0);
        assert!((bounds.rect.x1 - 200.0).abs() < 1e-9);
        assert!((bounds.rect.y1 - 100.0).abs() < 1e-9);
        assert!(compute_selection_bounds(&geometry, &[]).is_none());
    }

    #[test]
    fn test_aspect_lock_rules() {
        let mut store = MemoryShapeStore::new();
        let a = store
            .insert(Shape::rectangle(0.0, 0.0, 100.0, 50.0))
            .unwrap();
        let quarter = Shape::rectangle(200.0, 0.0, 100.0, 50.0).with_rotation(FRAC_PI_2);
        let quarter = store.insert(quarter).unwrap();
        let skewed = Shape::rectangle(400.0, 0.0, 100.0, 50.0).with_rotation(FRAC_PI_4);
        let skewed = store.insert(skewed).unwrap();
        let frame = store
            .insert(Shape::frame(0.0, 200.0, 100.0, 100.0))
            .unwrap();
        let child = Shape::rectangle(10.0, 10.0, 10.0, 10.0)
            .with_parent(frame)
            .with_rotation(0.3);
        store.insert(child).unwrap();
        let image = store.insert(Shape::image(0.0, 400.0, 50.0, 50.0)).unwrap();
        let registry = ShapeRegistry::new();
        let geometry = ShapeGeometry::new(&store, &registry);

        assert!(!compute_aspect_lock(&geometry, &[a, quarter], 0.0));
        assert!(compute_aspect_lock(&geometry, &[a, skewed], 0.0));
        // A lone rotated shape is aligned with its own selection frame.
        assert!(!compute_aspect_lock(&geometry, &[skewed], FRAC_PI_4));
        // Nested descendants count.
        assert!(compute_aspect_lock(&geometry, &[frame], 0.0));
        assert!(compute_aspect_lock(&geometry, &[image], 0.0));
    }

    #[test]
    fn test_hit_test_priority() {
        let bounds = SelectionBounds {
            rect: Rect::new(0.0, 0.0, 100.0, 100.0),
            rotation: 0.0,
        };
        let hit = |x, y| hit_test_selection_handles(&bounds, Point::new(x, y), 6.0, 24.0);
        assert_eq!(hit(2.0, 3.0), Some(HandleKind::Corner(Corner::TopLeft)));
        assert_eq!(hit(50.0, 98.0), Some(HandleKind::Edge(Edge::Bottom)));
        assert_eq!(hit(101.0, 30.0), Some(HandleKind::Edge(Edge::Right)));
        assert_eq!(hit(50.0, -24.0), Some(HandleKind::Rotate));
        assert_eq!(hit(50.0, 50.0), None);
    }

    #[test]
    fn test_hit_test_rotated() {
        let bounds = SelectionBounds {
            rect: Rect::new(0.0, 0.0, 100.0, 100.0),
            rotation: FRAC_PI_2,
        };
        // Frame (100, 100) maps to page (-100, 100).
        assert_eq!(
            hit_test_selection_handles(&bounds, Point::new(-99.0, 99.0), 6.0, 24.0),
            Some(HandleKind::Corner(Corner::BottomRight))
        );
    }

    #[test]
    fn test_cursor_for_handle() {
        let hint = cursor_for_handle(HandleKind::Corner(Corner::TopRight), 0.5);
        assert_eq!(hint.kind, CursorKind::NeswResize);
        assert_eq!(hint.rotation, 0.5);
        let rotate = cursor_for_handle(HandleKind::Rotate, 0.0);
        assert_eq!(rotate.kind, CursorKind::Rotate);
    }
}
