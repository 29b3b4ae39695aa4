//! Geometry helpers on top of kurbo's vector, rectangle and affine types.
//!
//! Shapes live in three coordinate frames: their own local frame, their
//! parent's frame and the page (root) frame. A shape's local transform is
//! `translate(x, y) * rotate(rotation)`; its page transform is the parent's
//! page transform composed with that.

use std::f64::consts::{FRAC_PI_2, TAU};

pub use kurbo::{Affine, Point, Rect, Size, Vec2};

/// Tolerance used when comparing angles.
pub const ROTATION_EPSILON: f64 = 1e-6;

/// Tolerance used when comparing coordinates.
pub const COORD_EPSILON: f64 = 1e-6;

/// Check whether two floats are equal within `epsilon`.
pub fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
    (a - b).abs() <= epsilon
}

/// Normalize an angle in radians to `[0, 2π)`.
pub fn normalize_angle(angle: f64) -> f64 {
    let r = angle.rem_euclid(TAU);
    // rem_euclid can round tiny negative inputs up to exactly TAU
    if r >= TAU { 0.0 } else { r }
}

/// Signed shortest difference `a - b`, in `(-π, π]`.
pub fn angle_delta(a: f64, b: f64) -> f64 {
    let d = normalize_angle(a - b);
    if d > std::f64::consts::PI { d - TAU } else { d }
}

/// Check whether two angles point the same way.
pub fn angles_equal(a: f64, b: f64) -> bool {
    angle_delta(a, b).abs() <= ROTATION_EPSILON
}

/// Check whether an angle is a whole number of quarter turns.
pub fn is_quarter_turn(angle: f64) -> bool {
    let r = angle.rem_euclid(FRAC_PI_2);
    r <= ROTATION_EPSILON || FRAC_PI_2 - r <= ROTATION_EPSILON
}

/// The transform from a shape's local frame into its parent's frame.
pub fn local_transform(x: f64, y: f64, rotation: f64) -> Affine {
    Affine::translate(Vec2::new(x, y)) * Affine::rotate(rotation)
}

/// Apply only the linear part of an affine to a vector.
pub fn transform_vec(affine: Affine, v: Vec2) -> Vec2 {
    let [a, b, c, d, _, _] = affine.as_coeffs();
    Vec2::new(a * v.x + c * v.y, b * v.x + d * v.y)
}

/// Rotate a vector by `angle` radians.
pub fn rotate_vec(v: Vec2, angle: f64) -> Vec2 {
    let (sin, cos) = angle.sin_cos();
    Vec2::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}

/// Rotation angle of an affine's x axis.
///
/// Only meaningful for transforms without reflection or skew.
pub fn affine_rotation(affine: Affine) -> f64 {
    let [a, b, ..] = affine.as_coeffs();
    normalize_angle(b.atan2(a))
}

/// Per-axis scale of `affine` measured in a frame rotated by `rotation`.
///
/// Computes the diagonal of `R(-rotation) * lin(affine) * R(0)`; for a transform of the form
/// `R(rotation) * diag(sx, sy)` this recovers the signed `(sx, sy)`.
pub fn scale_in_frame(affine: Affine, rotation: f64) -> Vec2 {
    let x_axis = rotate_vec(transform_vec(affine, Vec2::new(1.0, 0.0)), -rotation);
    let y_axis = rotate_vec(transform_vec(affine, Vec2::new(0.0, 1.0)), -rotation);
    Vec2::new(x_axis.x, y_axis.y)
}

/// Check that every coefficient of an affine is finite.
pub fn affine_is_finite(affine: Affine) -> bool {
    affine.as_coeffs().iter().all(|c| c.is_finite())
}

/// Axis-aligned bounds of a set of points.
pub fn bounds_of_points(points: impl IntoIterator<Item = Point>) -> Option<Rect> {
    let mut iter = points.into_iter();
    let first = iter.next()?;
    let start = Rect::from_points(first, first);
    Some(iter.fold(start, |acc, p| acc.union_pt(p)))
}

/// Extension methods for [`Rect`].
pub trait RectExt {
    /// Corners in order: top-left, top-right, bottom-right, bottom-left.
    fn corners(&self) -> [Point; 4];
    /// Grow the rectangle by `margin` on every side.
    fn expand_by(&self, margin: f64) -> Rect;
    /// Inclusive point containment (kurbo's `contains` excludes the far edges).
    fn contains_point(&self, point: Point) -> bool;
    /// Whether two rectangles share any area or edge.
    fn overlaps_rect(&self, other: &Rect) -> bool;
    /// Axis-aligned bounds of this rectangle after transformation.
    fn transformed_bounds(&self, affine: Affine) -> Rect;
    /// Min, mid and max x coordinates.
    fn xs(&self) -> [f64; 3];
    /// Min, mid and max y coordinates.
    fn ys(&self) -> [f64; 3];
    /// Corners plus center, the points a box offers for alignment.
    fn snap_points(&self) -> [Point; 5];
}

impl RectExt for Rect {
    fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.x0, self.y0),
            Point::new(self.x1, self.y0),
            Point::new(self.x1, self.y1),
            Point::new(self.x0, self.y1),
        ]
    }

    fn expand_by(&self, margin: f64) -> Rect {
        self.inflate(margin, margin)
    }

    fn contains_point(&self, point: Point) -> bool {
        point.x >= self.min_x()
            && point.x <= self.max_x()
            && point.y >= self.min_y()
            && point.y <= self.max_y()
    }

    fn overlaps_rect(&self, other: &Rect) -> bool {
        self.min_x() <= other.max_x()
            && other.min_x() <= self.max_x()
            && self.min_y() <= other.max_y()
            && other.min_y() <= self.max_y()
    }

    fn transformed_bounds(&self, affine: Affine) -> Rect {
        let [a, b, c, d] = self.corners().map(|p| affine * p);
        Rect::from_points(a, c).union_pt(b).union_pt(d)
    }

    fn xs(&self) -> [f64; 3] {
        [self.min_x(), self.center().x, self.max_x()]
    }

    fn ys(&self) -> [f64; 3] {
        [self.min_y(), self.center().y, self.max_y()]
    }

    fn snap_points(&self) -> [Point; 5] {
        let [a, b, c, d] = self.corners();
        [a, b, c, d, self.center()]
    }
}

/// Check whether two closed ranges overlap.
pub fn ranges_overlap(a0: f64, a1: f64, b0: f64, b1: f64) -> bool {
    a0 <= b1 && b0 <= a1
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_normalize_angle() {
        let wrapped = normalize_angle(-FRAC_PI_2);
        assert!(approx_eq(wrapped, 3.0 * FRAC_PI_2, 1e-12));
        assert!(approx_eq(normalize_angle(TAU + 0.5), 0.5, 1e-12));
        assert_eq!(normalize_angle(-1e-20), 0.0);
        assert!(normalize_angle(-1e-20) < TAU);
    }

    #[test]
    fn test_is_quarter_turn() {
        assert!(is_quarter_turn(0.0));
        assert!(is_quarter_turn(FRAC_PI_2));
        assert!(is_quarter_turn(PI));
        assert!(is_quarter_turn(-FRAC_PI_2));
        assert!(is_quarter_turn(FRAC_PI_2 - 1e-9));
        assert!(!is_quarter_turn(PI / 4.0));
        assert!(!is_quarter_turn(0.01));
    }

    #[test]
    fn test_angle_delta_wraps() {
        assert!(approx_eq(angle_delta(0.1, TAU - 0.1), 0.2, 1e-12));
        assert!(angles_equal(0.0, TAU));
    }

    #[test]
    fn test_local_transform_compose_invert() {
        let parent = local_transform(100.0, 50.0, FRAC_PI_2);
        let child = local_transform(10.0, 0.0, 0.0);
        let page = parent * child;
        let origin = page * Point::ZERO;
        assert!(approx_eq(origin.x, 100.0, 1e-9));
        assert!(approx_eq(origin.y, 60.0, 1e-9));

        let back = page.inverse() * origin;
        assert!(back.distance(Point::ZERO) < 1e-9);
    }

    #[test]
    fn test_scale_in_frame() {
        let affine = Affine::rotate(0.3) * Affine::scale_non_uniform(2.0, -3.0);
        let scale = scale_in_frame(affine, 0.3);
        assert!(approx_eq(scale.x, 2.0, 1e-9));
        assert!(approx_eq(scale.y, -3.0, 1e-9));

        // A quarter turn relative to the frame swaps the axes.
        let swapped = Affine::scale_non_uniform(2.0, 3.0) * Affine::rotate(FRAC_PI_2);
        let scale = scale_in_frame(swapped, FRAC_PI_2);
        assert!(approx_eq(scale.x, 3.0, 1e-9));
        assert!(approx_eq(scale.y, 2.0, 1e-9));
    }

    #[test]
    fn test_rect_ext() {
        let rect = Rect::new(0.0, 0.0, 100.0, 50.0);
        assert_eq!(rect.corners()[2], Point::new(100.0, 50.0));
        assert!(rect.contains_point(Point::new(100.0, 50.0)));
        assert!(!rect.contains_point(Point::new(100.1, 50.0)));
        assert_eq!(rect.expand_by(5.0), Rect::new(-5.0, -5.0, 105.0, 55.0));
        assert_eq!(rect.xs(), [0.0, 50.0, 100.0]);
        assert!(rect.overlaps_rect(&Rect::new(100.0, 0.0, 120.0, 10.0)));
        assert!(!rect.overlaps_rect(&Rect::new(101.0, 0.0, 120.0, 10.0)));

        let rotated = rect.transformed_bounds(Affine::rotate(FRAC_PI_2));
        assert!(approx_eq(rotated.min_x(), -50.0, 1e-9));
        assert!(approx_eq(rotated.max_y(), 100.0, 1e-9));
    }
}
