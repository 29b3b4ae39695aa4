//! Shape records and the per-kind operation registry.

mod geo;
mod group;
mod image;
mod line;
mod registry;
mod text;

pub use registry::{ResizeInfo, ShapeRegistry, ShapeUtil};

use crate::geometry::{Affine, Point, local_transform, normalize_angle};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for shapes.
pub type ShapeId = Uuid;

/// The container a shape belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParentId {
    /// The page root.
    Page,
    /// Another shape (frame, group, ...).
    Shape(ShapeId),
}

impl ParentId {
    /// The parent shape id, if the parent is not the page.
    pub fn shape_id(self) -> Option<ShapeId> {
        match self {
            ParentId::Page => None,
            ParentId::Shape(id) => Some(id),
        }
    }
}

/// Shape type tag, used to look up the shape's operations in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeKind {
    Rectangle,
    Ellipse,
    Frame,
    Text,
    Note,
    Image,
    Line,
    Group,
}

/// Shape-specific local geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ShapeProps {
    /// A box of the given size, anchored at the shape origin.
    Geo { w: f64, h: f64 },
    /// A box that remembers whether its content has been mirrored.
    Image {
        w: f64,
        h: f64,
        #[serde(default)]
        flip_x: bool,
        #[serde(default)]
        flip_y: bool,
    },
    /// A polyline with points in the shape's local frame.
    Line { points: Vec<Point> },
    /// No own geometry; the bounds come from the children.
    Group,
}

impl ShapeProps {
    /// Width and height for box-like props.
    pub fn size(&self) -> Option<(f64, f64)> {
        match self {
            ShapeProps::Geo { w, h } | ShapeProps::Image { w, h, .. } => Some((*w, *h)),
            ShapeProps::Line { .. } | ShapeProps::Group => None,
        }
    }

    fn is_finite(&self) -> bool {
        match self {
            ShapeProps::Geo { w, h } | ShapeProps::Image { w, h, .. } => {
                w.is_finite() && h.is_finite()
            }
            ShapeProps::Line { points } => {
                points.iter().all(|p| p.x.is_finite() && p.y.is_finite())
            }
            ShapeProps::Group => true,
        }
    }
}

/// A shape as stored in the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    pub id: ShapeId,
    pub kind: ShapeKind,
    /// Owning container.
    pub parent: ParentId,
    /// Ordering among siblings (lower is further back).
    pub index: i64,
    /// Position relative to the parent.
    pub x: f64,
    pub y: f64,
    /// Rotation in radians relative to the parent, in `[0, 2π)`.
    pub rotation: f64,
    pub props: ShapeProps,
}

impl Shape {
    /// Create a page-level shape of the given kind.
    pub fn new(kind: ShapeKind, x: f64, y: f64, props: ShapeProps) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            parent: ParentId::Page,
            index: 0,
            x,
            y,
            rotation: 0.0,
            props,
        }
    }

    /// Create a rectangle.
    pub fn rectangle(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self::new(ShapeKind::Rectangle, x, y, ShapeProps::Geo { w, h })
    }

    /// Create an ellipse inscribed in the given box.
    pub fn ellipse(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self::new(ShapeKind::Ellipse, x, y, ShapeProps::Geo { w, h })
    }

    /// Create a frame container.
    pub fn frame(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self::new(ShapeKind::Frame, x, y, ShapeProps::Geo { w, h })
    }

    /// Create a sticky note.
    pub fn note(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self::new(ShapeKind::Note, x, y, ShapeProps::Geo { w, h })
    }

    /// Create a text block.
    pub fn text(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self::new(ShapeKind::Text, x, y, ShapeProps::Geo { w, h })
    }

    /// Create an image.
    pub fn image(x: f64, y: f64, w: f64, h: f64) -> Self {
        let props = ShapeProps::Image {
            w,
            h,
            flip_x: false,
            flip_y: false,
        };
        Self::new(ShapeKind::Image, x, y, props)
    }

    /// Create a polyline; `points` are relative to `(x, y)`.
    pub fn line(x: f64, y: f64, points: Vec<Point>) -> Self {
        Self::new(ShapeKind::Line, x, y, ShapeProps::Line { points })
    }

    /// Create an empty group.
    pub fn group(x: f64, y: f64) -> Self {
        Self::new(ShapeKind::Group, x, y, ShapeProps::Group)
    }

    /// Set the parent container.
    pub fn with_parent(mut self, parent: ShapeId) -> Self {
        self.parent = ParentId::Shape(parent);
        self
    }

    /// Set the rotation (normalized).
    pub fn with_rotation(mut self, rotation: f64) -> Self {
        self.rotation = normalize_angle(rotation);
        self
    }

    /// Set the sibling ordering index.
    pub fn with_index(mut self, index: i64) -> Self {
        self.index = index;
        self
    }

    /// The transform from this shape's frame into its parent's frame.
    pub fn local_transform(&self) -> Affine {
        local_transform(self.x, self.y, self.rotation)
    }

    /// Apply a partial update in place.
    pub fn apply(&mut self, partial: &PartialShape) {
        if let Some(x) = partial.x {
            self.x = x;
        }
        if let Some(y) = partial.y {
            self.y = y;
        }
        if let Some(rotation) = partial.rotation {
            self.rotation = rotation;
        }
        if let Some(props) = &partial.props {
            self.props = props.clone();
        }
    }
}

/// Sparse update for a shape. Only present fields are applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartialShape {
    pub id: ShapeId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub props: Option<ShapeProps>,
}

impl PartialShape {
    /// An update that changes nothing.
    pub fn new(id: ShapeId) -> Self {
        Self {
            id,
            x: None,
            y: None,
            rotation: None,
            props: None,
        }
    }

    /// An update that moves the shape.
    pub fn position(id: ShapeId, x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Self::new(id)
        }
    }

    /// An update that writes back every transform field of `shape` exactly.
    pub fn restore(shape: &Shape) -> Self {
        Self {
            id: shape.id,
            x: Some(shape.x),
            y: Some(shape.y),
            rotation: Some(shape.rotation),
            props: Some(shape.props.clone()),
        }
    }

    /// Set the rotation (normalized).
    pub fn with_rotation(mut self, rotation: f64) -> Self {
        self.rotation = Some(normalize_angle(rotation));
        self
    }

    /// Set the props.
    pub fn with_props(mut self, props: ShapeProps) -> Self {
        self.props = Some(props);
        self
    }

    /// Overlay the fields of a later update onto this one.
    pub fn merge(&mut self, later: PartialShape) {
        debug_assert_eq!(self.id, later.id);
        if later.x.is_some() {
            self.x = later.x;
        }
        if later.y.is_some() {
            self.y = later.y;
        }
        if later.rotation.is_some() {
            self.rotation = later.rotation;
        }
        if later.props.is_some() {
            self.props = later.props;
        }
    }

    /// Whether this update would write non-finite values.
    pub fn is_finite(&self) -> bool {
        [self.x, self.y, self.rotation]
            .iter()
            .flatten()
            .all(|v| v.is_finite())
            && self.props.as_ref().is_none_or(ShapeProps::is_finite)
    }

    /// Whether this update changes nothing.
    pub fn is_empty(&self) -> bool {
        self.x.is_none() && self.y.is_none() && self.rotation.is_none() && self.props.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_rectangle_creation() {
        let rect = Shape::rectangle(10.0, 20.0, 100.0, 50.0);
        assert_eq!(rect.kind, ShapeKind::Rectangle);
        assert_eq!(rect.parent, ParentId::Page);
        assert_eq!(rect.props.size(), Some((100.0, 50.0)));
    }

    #[test]
    fn test_with_rotation_normalizes() {
        let rect = Shape::rectangle(0.0, 0.0, 1.0, 1.0).with_rotation(-FRAC_PI_2);
        assert!((rect.rotation - 3.0 * FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn test_partial_apply_and_merge() {
        let mut rect = Shape::rectangle(0.0, 0.0, 10.0, 10.0);
        let mut partial = PartialShape::position(rect.id, 5.0, 6.0);
        let resized = PartialShape::new(rect.id).with_props(ShapeProps::Geo { w: 20.0, h: 30.0 });
        partial.merge(resized);
        partial.merge(PartialShape {
            x: Some(7.0),
            ..PartialShape::new(rect.id)
        });

        rect.apply(&partial);
        assert_eq!(rect.x, 7.0);
        assert_eq!(rect.y, 6.0);
        assert_eq!(rect.props.size(), Some((20.0, 30.0)));
    }

    #[test]
    fn test_restore_is_exact() {
        let original = Shape::rectangle(0.1, 0.2, 0.3, 0.4).with_rotation(1.234);
        let mut moved = original.clone();
        let moved_by = PartialShape::position(original.id, 99.0, 99.0).with_rotation(2.0);
        moved.apply(&moved_by);
        moved.apply(&PartialShape::restore(&original));
        assert_eq!(moved, original);
    }

    #[test]
    fn test_partial_finiteness() {
        let id = Uuid::new_v4();
        assert!(PartialShape::position(id, 1.0, 2.0).is_finite());
        assert!(!PartialShape::position(id, f64::NAN, 2.0).is_finite());
        let infinite = ShapeProps::Geo {
            w: f64::INFINITY,
            h: 1.0,
        };
        let bad_props = PartialShape::new(id).with_props(infinite);
        assert!(!bad_props.is_finite());
    }

    #[test]
    fn test_serialization_roundtrip() {
        let points = vec![Point::new(0.0, 0.0), Point::new(10.0, 5.0)];
        let line = Shape::line(1.0, 2.0, points);
        let json = serde_json::to_string(&line).unwrap();
        let back: Shape = serde_json::from_str(&json).unwrap();
        assert_eq!(back, line);
    }
}
