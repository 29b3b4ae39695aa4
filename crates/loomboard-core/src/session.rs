//! Transform sessions: the immutable snapshot taken when a drag starts and
//! the mutable state that lives until it is committed or cancelled.

use crate::accessor::ShapeGeometry;
use crate::camera::Camera;
use crate::error::TransformError;
use crate::geometry::{Affine, Point, Rect, RectExt};
use crate::input::Modifiers;
use crate::selection::{HandleKind, SelectionBounds, compute_aspect_lock, compute_selection_bounds};
use crate::shapes::{ParentId, PartialShape, Shape, ShapeId, ShapeKind, ShapeRegistry};
use crate::snap::{SnapCandidate, SnapCandidates};
use crate::store::{ShapeStore, StagedStore};
use crate::timer::{TaskHandle, TaskQueue};
use std::collections::{HashMap, HashSet};

/// What a session does with the pointer delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionKind {
    Resize { handle: HandleKind },
    Rotate,
    Translate,
}

/// Modifier state as the transform engines read it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionFlags {
    /// Lock aspect ratio (resize), lock to the major axis (translate), snap angles (rotate).
    pub shift: bool,
    /// Scale from the center (resize), show the cloning indicator (translate).
    pub alt: bool,
    /// Snap to other shapes; suppresses grid rounding.
    pub ctrl: bool,
}

impl From<Modifiers> for SessionFlags {
    fn from(modifiers: Modifiers) -> Self {
        Self {
            shift: modifiers.shift,
            alt: modifiers.alt,
            ctrl: modifiers.snap(),
        }
    }
}

/// One shape as it was when the session started.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeSnapshot {
    pub shape: Shape,
    pub page_transform: Affine,
    pub parent_page_transform: Affine,
    /// Child ids, back to front.
    pub children: Vec<ShapeId>,
}

/// Everything a session computes from; never mutated after capture.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    /// Selected shapes without a selected ancestor.
    pub top_level: Vec<ShapeId>,
    /// Top-level shapes and all their descendants.
    pub shapes: HashMap<ShapeId, ShapeSnapshot>,
    pub bounds: SelectionBounds,
    pub aspect_locked: bool,
    /// Axis-aligned page bounds of the whole selection.
    pub page_bounds: Rect,
    pub candidates: SnapCandidates,
}

impl SessionSnapshot {
    /// Capture the selection. Returns `None` when no selected shape exists.
    ///
    /// Snap candidates are limited to shapes overlapping the camera's viewport.
    pub fn capture(
        store: &dyn ShapeStore,
        registry: &ShapeRegistry,
        selection: &[ShapeId],
        camera: &Camera,
    ) -> Option<Self> {
        let geometry = ShapeGeometry::new(store, registry);
        let top_level = geometry.top_level(selection);
        let bounds = compute_selection_bounds(&geometry, &top_level)?;
        let aspect_locked = compute_aspect_lock(&geometry, &top_level, bounds.rotation);

        let mut shapes = HashMap::new();
        for id in &top_level {
            for member in std::iter::once(*id).chain(geometry.descendants(*id)) {
                if let Some(snapshot) = snapshot_shape(&geometry, member) {
                    shapes.insert(member, snapshot);
                }
            }
        }

        let page_bounds = top_level
            .iter()
            .filter_map(|id| geometry.page_bounds(*id).ok())
            .reduce(|acc, r| acc.union(r))?;

        let viewport = camera.viewport_page_bounds();
        let candidates = collect_candidates(&geometry, &top_level, &shapes, viewport);
        Some(Self {
            top_level,
            shapes,
            bounds,
            aspect_locked,
            page_bounds,
            candidates,
        })
    }

    pub fn get(&self, id: ShapeId) -> Option<&ShapeSnapshot> {
        self.shapes.get(&id)
    }

    /// Updates that put every captured shape back exactly as it was.
    pub fn restore_partials(&self) -> Vec<PartialShape> {
        self.shapes
            .values()
            .map(|s| PartialShape::restore(&s.shape))
            .collect()
    }
}

fn snapshot_shape(geometry: &ShapeGeometry<'_>, id: ShapeId) -> Option<ShapeSnapshot> {
    let shape = geometry.shape(id).ok()?;
    Some(ShapeSnapshot {
        shape: shape.clone(),
        page_transform: geometry.page_transform(id).ok()?,
        parent_page_transform: geometry.parent_page_transform(id).ok()?,
        children: geometry.store().sorted_child_ids(ParentId::Shape(id)),
    })
}

/// Visible shapes that are not selected, not inside the selection and not
/// containing it. Groups offer their children rather than themselves.
fn collect_candidates(
    geometry: &ShapeGeometry<'_>,
    top_level: &[ShapeId],
    members: &HashMap<ShapeId, ShapeSnapshot>,
    viewport: Rect,
) -> SnapCandidates {
    let ancestors: HashSet<ShapeId> = top_level
        .iter()
        .flat_map(|id| geometry.ancestors(*id))
        .collect();
    let mut shapes = Vec::new();
    let mut stack: Vec<ShapeId> = geometry.store().sorted_child_ids(ParentId::Page);
    while let Some(id) = stack.pop() {
        if members.contains_key(&id) {
            continue;
        }
        stack.extend(geometry.store().sorted_child_ids(ParentId::Shape(id)));
        let Ok(shape) = geometry.shape(id) else {
            continue;
        };
        if ancestors.contains(&id) || shape.kind == ShapeKind::Group {
            continue;
        }
        let bounds = geometry.page_bounds(id);
        let points = geometry.page_snap_points(id);
        let (Ok(bounds), Ok(points)) = (bounds, points) else {
            continue;
        };
        if bounds.overlaps_rect(&viewport) {
            shapes.push(SnapCandidate { id, bounds, points });
        }
    }
    SnapCandidates::new(shapes)
}

/// Shapes produced by one recomputation, plus the ones that had to be left out.
#[derive(Debug, Clone, Default)]
pub struct TransformOutcome {
    pub updates: Vec<PartialShape>,
    pub skipped: Vec<TransformError>,
}

impl TransformOutcome {
    /// Record a shape (and with it, its subtree) that could not be transformed.
    pub(crate) fn skip(&mut self, error: TransformError) {
        log::warn!("Skipping shape in transform batch: {}", error);
        self.skipped.push(error);
    }
}

/// Cosmetic work scheduled by a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CosmeticTask {
    ClearCloning,
}

/// An in-progress drag.
#[derive(Debug)]
pub struct Session {
    pub kind: SessionKind,
    /// Page point where the pointer went down.
    pub origin: Point,
    /// Latest page pointer position.
    pub current: Point,
    pub flags: SessionFlags,
    pub snapshot: SessionSnapshot,
    /// Pre-session state of every shape this session has written, captured on first write.
    originals: HashMap<ShapeId, Shape>,
    tasks: TaskQueue<CosmeticTask>,
    clone_task: Option<TaskHandle>,
    cloning: bool,
}

impl Session {
    pub fn new(
        kind: SessionKind,
        origin: Point,
        flags: SessionFlags,
        snapshot: SessionSnapshot,
    ) -> Self {
        let cloning = kind == SessionKind::Translate && flags.alt;
        Self {
            kind,
            origin,
            current: origin,
            flags,
            snapshot,
            originals: HashMap::new(),
            tasks: TaskQueue::new(),
            clone_task: None,
            cloning,
        }
    }

    pub fn is_cloning(&self) -> bool {
        self.cloning
    }

    pub fn tasks(&self) -> &TaskQueue<CosmeticTask> {
        &self.tasks
    }

    /// Track alt for the cloning indicator: set at once on press, cleared
    /// `delay` after release unless pressed again in between.
    pub fn set_alt(&mut self, alt: bool, now: crate::timer::Instant, delay: std::time::Duration) {
        if self.kind != SessionKind::Translate {
            return;
        }
        if alt {
            if let Some(handle) = self.clone_task.take() {
                self.tasks.cancel(handle);
            }
            self.cloning = true;
        } else if self.cloning && self.clone_task.is_none() {
            self.clone_task = Some(self.tasks.schedule(now, delay, CosmeticTask::ClearCloning));
        }
    }

    /// Run cosmetic tasks that are due.
    pub fn tick(&mut self, now: crate::timer::Instant) {
        for task in self.tasks.drain_due(now) {
            match task {
                CosmeticTask::ClearCloning => {
                    self.cloning = false;
                    self.clone_task = None;
                }
            }
        }
    }

    /// Stage `updates`, let affected containers react, and commit the result
    /// to the store as one batch.
    ///
    /// Updates are computed from the snapshot, so everything written by
    /// earlier moves is restored underneath them first. Container fixups from
    /// the previous move (a group re-fitting its origin) never leak into the
    /// next one.
    pub fn commit(
        &mut self,
        store: &mut dyn ShapeStore,
        registry: &ShapeRegistry,
        updates: Vec<PartialShape>,
    ) {
        let mut staged: Vec<PartialShape> = self
            .originals
            .values()
            .map(PartialShape::restore)
            .collect();
        staged.extend(updates);
        let batch = stage_batch(store, registry, staged);
        for partial in &batch {
            if !self.originals.contains_key(&partial.id) {
                if let Some(shape) = store.get_shape(partial.id) {
                    self.originals.insert(partial.id, shape.clone());
                }
            }
        }
        store.update_shapes(batch);
    }

    /// Updates that undo everything this session wrote, plus a restore of
    /// every captured shape.
    pub fn revert_partials(&self) -> Vec<PartialShape> {
        let mut partials: Vec<PartialShape> = self
            .originals
            .values()
            .map(PartialShape::restore)
            .collect();
        partials.extend(
            self.snapshot
                .shapes
                .values()
                .filter(|s| !self.originals.contains_key(&s.shape.id))
                .map(|s| PartialShape::restore(&s.shape)),
        );
        partials
    }
}

/// Apply `updates` to a staging overlay, run `on_children_change` for every
/// ancestor of a touched shape (deepest first), and return the merged batch.
pub fn stage_batch(
    store: &dyn ShapeStore,
    registry: &ShapeRegistry,
    updates: Vec<PartialShape>,
) -> Vec<PartialShape> {
    if updates.is_empty() {
        return updates;
    }
    let mut staged = StagedStore::new(store);
    staged.update_shapes(updates);

    let geometry = ShapeGeometry::new(store, registry);
    let mut parents: Vec<(usize, ShapeId)> = Vec::new();
    for id in staged.touched().collect::<Vec<_>>() {
        let ancestors = geometry.ancestors(id);
        let depth = ancestors.len();
        for (i, ancestor) in ancestors.into_iter().enumerate() {
            if !parents.iter().any(|(_, p)| *p == ancestor) {
                parents.push((depth - i - 1, ancestor));
            }
        }
    }
    parents.sort_by(|a, b| b.0.cmp(&a.0));

    for (_, parent) in parents {
        let fixups = {
            let Some(shape) = staged.get_shape(parent) else {
                continue;
            };
            registry.on_children_change(shape, &staged)
        };
        staged.update_shapes(fixups);
    }
    staged.into_partials()
}
