//! Snapping: grid rounding, alignment to other shapes and equal-gap spacing.
//!
//! Shape snapping works on page-space axis-aligned boxes. Each axis is
//! resolved independently: the nearest alignment within the threshold wins,
//! and once the nudge is applied every alignment that became exact is
//! reported as a [`SnapLine`].

use crate::geometry::{COORD_EPSILON, Point, Rect, RectExt, Vec2, ranges_overlap};
use crate::shapes::ShapeId;
use serde::{Deserialize, Serialize};

/// Grid size for snapping (matches the visual grid).
pub const GRID_SIZE: f64 = 20.0;

/// Angle snap increment in degrees.
pub const ANGLE_SNAP_INCREMENT: f64 = 15.0;

/// Which axes may move and snap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapAxes {
    pub x: bool,
    pub y: bool,
}

impl SnapAxes {
    pub const BOTH: Self = Self { x: true, y: true };

    fn enabled(self, axis: Axis) -> bool {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
        }
    }
}

/// Snap a point to the nearest grid intersection on the enabled axes.
pub fn snap_to_grid(point: Point, grid_size: f64, axes: SnapAxes) -> Point {
    if grid_size <= 0.0 {
        return point;
    }
    let round = |v: f64| (v / grid_size).round() * grid_size;
    Point::new(
        if axes.x { round(point.x) } else { point.x },
        if axes.y { round(point.y) } else { point.y },
    )
}

/// Snap an angle to the nearest increment.
/// Returns the snapped angle in degrees (0-360).
pub fn snap_angle(angle_degrees: f64, increment: f64) -> f64 {
    let snapped = (angle_degrees / increment).round() * increment;
    snapped.rem_euclid(360.0)
}

/// A shape other shapes can align with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapCandidate {
    pub id: ShapeId,
    /// Axis-aligned page bounds.
    pub bounds: Rect,
    /// Alignment points in page space.
    pub points: Vec<Point>,
}

impl SnapCandidate {
    /// A candidate offering its box corners and center.
    pub fn from_bounds(id: ShapeId, bounds: Rect) -> Self {
        Self {
            id,
            bounds,
            points: bounds.snap_points().to_vec(),
        }
    }
}

/// Orientation of a gap: horizontal gaps separate shapes along x.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GapDirection {
    Horizontal,
    Vertical,
}

/// One measured gap, drawn as the two facing edges.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GapIndicator {
    pub start_edge: [Point; 2],
    pub end_edge: [Point; 2],
}

/// Alignment feedback for the UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SnapLine {
    /// Points sharing one coordinate, sorted along the line.
    Points { points: Vec<Point> },
    /// Equal gaps.
    Gaps {
        direction: GapDirection,
        gaps: Vec<GapIndicator>,
    },
}

/// Free space between two candidates that face each other with nothing in between.
#[derive(Debug, Clone, PartialEq)]
pub struct Gap {
    pub start: ShapeId,
    pub end: ShapeId,
    pub start_bounds: Rect,
    pub end_bounds: Rect,
    pub length: f64,
    /// Overlap of the two shapes on the cross axis.
    pub breadth: (f64, f64),
}

/// Candidates and the gaps between them, computed once per session.
#[derive(Debug, Clone, Default)]
pub struct SnapCandidates {
    pub shapes: Vec<SnapCandidate>,
    pub horizontal_gaps: Vec<Gap>,
    pub vertical_gaps: Vec<Gap>,
}

impl SnapCandidates {
    pub fn new(shapes: Vec<SnapCandidate>) -> Self {
        let horizontal_gaps = find_gaps(&shapes, Axis::X);
        let vertical_gaps = find_gaps(&shapes, Axis::Y);
        Self {
            shapes,
            horizontal_gaps,
            vertical_gaps,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    fn gaps(&self, axis: Axis) -> &[Gap] {
        match axis {
            Axis::X => &self.horizontal_gaps,
            Axis::Y => &self.vertical_gaps,
        }
    }
}

/// Offset to apply and the lines that justify it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SnapOutcome {
    pub nudge: Vec2,
    pub lines: Vec<SnapLine>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    X,
    Y,
}

impl Axis {
    fn of(self, p: Point) -> f64 {
        match self {
            Axis::X => p.x,
            Axis::Y => p.y,
        }
    }

    fn span(self, r: &Rect) -> (f64, f64) {
        match self {
            Axis::X => (r.min_x(), r.max_x()),
            Axis::Y => (r.min_y(), r.max_y()),
        }
    }

    fn cross(self) -> Axis {
        match self {
            Axis::X => Axis::Y,
            Axis::Y => Axis::X,
        }
    }

    /// Build a point from a coordinate on this axis and one on the cross axis.
    fn point(self, along: f64, across: f64) -> Point {
        match self {
            Axis::X => Point::new(along, across),
            Axis::Y => Point::new(across, along),
        }
    }

    fn vec(self, v: f64) -> Vec2 {
        match self {
            Axis::X => Vec2::new(v, 0.0),
            Axis::Y => Vec2::new(0.0, v),
        }
    }

    fn direction(self) -> GapDirection {
        match self {
            Axis::X => GapDirection::Horizontal,
            Axis::Y => GapDirection::Vertical,
        }
    }
}

fn find_gaps(shapes: &[SnapCandidate], axis: Axis) -> Vec<Gap> {
    let mut sorted: Vec<&SnapCandidate> = shapes.iter().collect();
    sorted.sort_by(|a, b| axis.span(&a.bounds).0.total_cmp(&axis.span(&b.bounds).0));

    let mut gaps = Vec::new();
    for (i, start) in sorted.iter().enumerate() {
        let (_, start_max) = axis.span(&start.bounds);
        for end in &sorted[i + 1..] {
            let (end_min, _) = axis.span(&end.bounds);
            if end_min <= start_max {
                continue;
            }
            let (s0, s1) = axis.cross().span(&start.bounds);
            let (e0, e1) = axis.cross().span(&end.bounds);
            let breadth = (s0.max(e0), s1.min(e1));
            if breadth.0 > breadth.1 {
                continue;
            }
            let blocked = sorted.iter().any(|other| {
                if other.id == start.id || other.id == end.id {
                    return false;
                }
                let (o_min, o_max) = axis.span(&other.bounds);
                let (c0, c1) = axis.cross().span(&other.bounds);
                o_min < end_min && o_max > start_max && ranges_overlap(c0, c1, breadth.0, breadth.1)
            });
            if blocked {
                continue;
            }
            gaps.push(Gap {
                start: start.id,
                end: end.id,
                start_bounds: start.bounds,
                end_bounds: end.bounds,
                length: end_min - start_max,
                breadth,
            });
        }
    }
    gaps
}

#[derive(Debug, Clone, Copy)]
enum GapPlacement {
    /// Centered between the two shapes.
    Between,
    /// One gap length past the end shape.
    After,
    /// One gap length before the start shape.
    Before,
}

struct GapSnap<'a> {
    gap: &'a Gap,
    placement: GapPlacement,
    offset: f64,
}

fn gap_snaps<'a>(moving: &Rect, gaps: &'a [Gap], axis: Axis) -> Vec<GapSnap<'a>> {
    let (m0, m1) = axis.span(moving);
    let (c0, c1) = axis.cross().span(moving);
    let size = m1 - m0;
    let mut snaps = Vec::new();
    for gap in gaps {
        if !ranges_overlap(c0, c1, gap.breadth.0, gap.breadth.1) {
            continue;
        }
        let (_, start_max) = axis.span(&gap.start_bounds);
        let (start_min, _) = axis.span(&gap.start_bounds);
        let (_, end_max) = axis.span(&gap.end_bounds);
        if gap.length > size {
            let target = start_max + (gap.length - size) / 2.0;
            snaps.push(GapSnap {
                gap,
                placement: GapPlacement::Between,
                offset: target - m0,
            });
        }
        snaps.push(GapSnap {
            gap,
            placement: GapPlacement::After,
            offset: end_max + gap.length - m0,
        });
        snaps.push(GapSnap {
            gap,
            placement: GapPlacement::Before,
            offset: start_min - gap.length - m1,
        });
    }
    snaps
}

fn indicator(axis: Axis, from: &Rect, to: &Rect) -> GapIndicator {
    let (f0, f1) = axis.cross().span(from);
    let (t0, t1) = axis.cross().span(to);
    let (lo, hi) = (f0.max(t0), f1.min(t1));
    let start = axis.span(from).1;
    let end = axis.span(to).0;
    GapIndicator {
        start_edge: [axis.point(start, lo), axis.point(start, hi)],
        end_edge: [axis.point(end, lo), axis.point(end, hi)],
    }
}

fn same_length(a: f64, b: f64) -> bool {
    (a - b).abs() <= COORD_EPSILON
}

fn gap_line(snap: &GapSnap<'_>, moved: &Rect, gaps: &[Gap], axis: Axis) -> SnapLine {
    let gap = snap.gap;
    let gap_indicator = indicator(axis, &gap.start_bounds, &gap.end_bounds);
    let indicators = match snap.placement {
        GapPlacement::Between => vec![
            indicator(axis, &gap.start_bounds, moved),
            indicator(axis, moved, &gap.end_bounds),
        ],
        GapPlacement::After => {
            // Walk back through the row while the spacing stays the same.
            let mut chain = vec![gap_indicator];
            let mut current = gap;
            while let Some(prev) = gaps
                .iter()
                .find(|g| g.end == current.start && same_length(g.length, gap.length))
            {
                if chain.len() > gaps.len() {
                    break;
                }
                chain.insert(0, indicator(axis, &prev.start_bounds, &prev.end_bounds));
                current = prev;
            }
            chain.push(indicator(axis, &gap.end_bounds, moved));
            chain
        }
        GapPlacement::Before => {
            let mut chain = vec![indicator(axis, moved, &gap.start_bounds), gap_indicator];
            let mut current = gap;
            while let Some(next) = gaps
                .iter()
                .find(|g| g.start == current.end && same_length(g.length, gap.length))
            {
                if chain.len() > gaps.len() + 1 {
                    break;
                }
                chain.push(indicator(axis, &next.start_bounds, &next.end_bounds));
                current = next;
            }
            chain
        }
    };
    SnapLine::Gaps {
        direction: axis.direction(),
        gaps: indicators,
    }
}

/// Nearest alignment between `moving` points and candidate points on one axis.
fn nearest_point_offset(
    moving: &[Point],
    candidates: &SnapCandidates,
    axis: Axis,
    threshold: f64,
) -> Option<f64> {
    let mut best = None;
    let mut min = threshold;
    for m in moving {
        for c in candidates.shapes.iter().flat_map(|s| &s.points) {
            let d = axis.of(*c) - axis.of(*m);
            if d.abs() < min {
                min = d.abs();
                best = Some(d);
            }
        }
    }
    best
}

/// One `Points` line per candidate coordinate that a moved point now sits on.
fn point_lines(moved: &[Point], candidates: &SnapCandidates, axis: Axis) -> Vec<SnapLine> {
    let mut coords: Vec<f64> = Vec::new();
    for m in moved {
        let value = axis.of(*m);
        let aligned = candidates
            .shapes
            .iter()
            .flat_map(|s| &s.points)
            .any(|c| (axis.of(*c) - value).abs() <= COORD_EPSILON);
        if aligned && !coords.iter().any(|v| (v - value).abs() <= COORD_EPSILON) {
            coords.push(value);
        }
    }

    let cross = axis.cross();
    coords
        .into_iter()
        .map(|value| {
            let mut points: Vec<Point> = moved
                .iter()
                .chain(candidates.shapes.iter().flat_map(|s| &s.points))
                .filter(|p| (axis.of(**p) - value).abs() <= COORD_EPSILON)
                .copied()
                .collect();
            points.sort_by(|a, b| cross.of(*a).total_cmp(&cross.of(*b)));
            points.dedup_by(|a, b| a.distance(*b) <= COORD_EPSILON);
            SnapLine::Points { points }
        })
        .collect()
}

/// Snap a moving box (a translating selection) to candidate points and gaps.
///
/// Returns no nudge and no lines unless `enabled`. `threshold` is in page units.
pub fn compute_snap(
    enabled: bool,
    moving: Rect,
    candidates: &SnapCandidates,
    threshold: f64,
    axes: SnapAxes,
) -> SnapOutcome {
    if !enabled || candidates.is_empty() {
        return SnapOutcome::default();
    }
    let moving_points = moving.snap_points();
    let mut nudge = Vec2::ZERO;
    let mut winners: Vec<(Axis, f64)> = Vec::new();

    for axis in [Axis::X, Axis::Y] {
        if !axes.enabled(axis) {
            continue;
        }
        let point_best = nearest_point_offset(&moving_points, candidates, axis, threshold);
        let gap_best = gap_snaps(&moving, candidates.gaps(axis), axis)
            .into_iter()
            .map(|s| s.offset)
            .filter(|d| d.abs() < threshold)
            .min_by(|a, b| a.abs().total_cmp(&b.abs()));
        let best = match (point_best, gap_best) {
            (Some(p), Some(g)) => Some(if g.abs() < p.abs() { g } else { p }),
            (p, g) => p.or(g),
        };
        if let Some(offset) = best {
            nudge += axis.vec(offset);
            winners.push((axis, offset));
        }
    }

    let moved = moving + nudge;
    let moved_points = moved.snap_points();
    let mut lines = Vec::new();
    for (axis, offset) in winners {
        lines.extend(point_lines(&moved_points, candidates, axis));
        let gaps = candidates.gaps(axis);
        for snap in gap_snaps(&moving, gaps, axis) {
            if (snap.offset - offset).abs() <= COORD_EPSILON {
                lines.push(gap_line(&snap, &moved, gaps, axis));
            }
        }
    }
    SnapOutcome { nudge, lines }
}

/// Snap a single dragged point (a resize handle) to candidate coordinates.
pub fn snap_handle(
    point: Point,
    candidates: &SnapCandidates,
    threshold: f64,
    axes: SnapAxes,
) -> SnapOutcome {
    let mut nudge = Vec2::ZERO;
    let mut snapped_axes = Vec::new();
    for axis in [Axis::X, Axis::Y] {
        if !axes.enabled(axis) {
            continue;
        }
        if let Some(offset) = nearest_point_offset(&[point], candidates, axis, threshold) {
            nudge += axis.vec(offset);
            snapped_axes.push(axis);
        }
    }
    let moved = [point + nudge];
    let lines = snapped_axes
        .into_iter()
        .flat_map(|axis| point_lines(&moved, candidates, axis))
        .collect();
    SnapOutcome { nudge, lines }
}
