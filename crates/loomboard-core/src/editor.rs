//! The transform editor: dispatches input through the state machine and
//! drives resize, rotate and translate sessions against a shape store.

use crate::accessor::ShapeGeometry;
use crate::camera::Camera;
use crate::config::EngineConfig;
use crate::geometry::{Point, RectExt, Size, Vec2};
use crate::input::{InputEvent, Modifiers, PointerTarget};
use crate::machine::{Action, EventKind, StateKind, transition};
use crate::resize::{apply_scale, page_scale_transform, uniform_scale, update_resize};
use crate::rotate::update_rotate;
use crate::selection::{
    CursorHint, CursorKind, HandleKind, SelectionBounds, compute_selection_bounds,
    cursor_for_handle, hit_test_selection_handles,
};
use crate::session::{Session, SessionKind, SessionSnapshot, TransformOutcome, stage_batch};
use crate::shapes::{ShapeId, ShapeRegistry};
use crate::snap::SnapLine;
use crate::store::ShapeStore;
use crate::translate::update_translate;
use std::collections::VecDeque;
use std::time::Duration;

/// Fixed point for a programmatic resize.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScaleOrigin {
    /// The selection center.
    Center,
    /// The given handle's position on the selection box.
    Handle(HandleKind),
    /// A page point.
    Point(Point),
}

/// Press recorded in a pointing state.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Pointing {
    origin: Point,
    handle: Option<HandleKind>,
    coarse: bool,
}

#[derive(Debug)]
enum InteractionState {
    Idle,
    PointingResizeHandle(Pointing),
    PointingRotateHandle(Pointing),
    PointingSelection(Pointing),
    Resizing(Session),
    Rotating(Session),
    Translating(Session),
}

impl InteractionState {
    fn kind(&self) -> StateKind {
        match self {
            InteractionState::Idle => StateKind::Idle,
            InteractionState::PointingResizeHandle(_) => StateKind::PointingResizeHandle,
            InteractionState::PointingRotateHandle(_) => StateKind::PointingRotateHandle,
            InteractionState::PointingSelection(_) => StateKind::PointingSelection,
            InteractionState::Resizing(_) => StateKind::Resizing,
            InteractionState::Rotating(_) => StateKind::Rotating,
            InteractionState::Translating(_) => StateKind::Translating,
        }
    }

    fn pointing(&self) -> Option<Pointing> {
        match self {
            InteractionState::PointingResizeHandle(p)
            | InteractionState::PointingRotateHandle(p)
            | InteractionState::PointingSelection(p) => Some(*p),
            _ => None,
        }
    }

    fn session(&self) -> Option<&Session> {
        match self {
            InteractionState::Resizing(s)
            | InteractionState::Rotating(s)
            | InteractionState::Translating(s) => Some(s),
            _ => None,
        }
    }

    fn session_mut(&mut self) -> Option<&mut Session> {
        match self {
            InteractionState::Resizing(s)
            | InteractionState::Rotating(s)
            | InteractionState::Translating(s) => Some(s),
            _ => None,
        }
    }

    fn from_session(session: Session) -> Self {
        match session.kind {
            SessionKind::Resize { .. } => InteractionState::Resizing(session),
            SessionKind::Rotate => InteractionState::Rotating(session),
            SessionKind::Translate => InteractionState::Translating(session),
        }
    }
}

/// Selection transform editor.
///
/// Holds the selection, camera and interaction state; the document lives in
/// the [`ShapeStore`] passed to each call.
#[derive(Debug)]
pub struct TransformEditor {
    config: EngineConfig,
    registry: ShapeRegistry,
    camera: Camera,
    selection: Vec<ShapeId>,
    state: InteractionState,
    snap_lines: Vec<SnapLine>,
    cursor: CursorHint,
    deferred: VecDeque<InputEvent>,
}

impl Default for TransformEditor {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl TransformEditor {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            registry: ShapeRegistry::default(),
            camera: Camera::default(),
            selection: Vec::new(),
            state: InteractionState::Idle,
            snap_lines: Vec::new(),
            cursor: CursorHint::default(),
            deferred: VecDeque::new(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn set_camera(&mut self, camera: Camera) {
        self.camera = camera;
    }

    pub fn set_viewport(&mut self, viewport: Size) {
        self.camera.viewport = viewport;
    }

    /// Register custom shape kinds.
    pub fn registry_mut(&mut self) -> &mut ShapeRegistry {
        &mut self.registry
    }

    pub fn selection(&self) -> &[ShapeId] {
        &self.selection
    }

    /// Replace the selection. Ignored while a session is running.
    pub fn set_selection(&mut self, ids: impl IntoIterator<Item = ShapeId>) {
        if self.state.kind().is_session() {
            log::debug!("Selection change ignored during a transform session");
            return;
        }
        self.selection = ids.into_iter().collect();
    }

    pub fn state_kind(&self) -> StateKind {
        self.state.kind()
    }

    /// Snap lines of the latest session update.
    pub fn snap_lines(&self) -> &[SnapLine] {
        &self.snap_lines
    }

    pub fn cursor(&self) -> CursorHint {
        self.cursor
    }

    /// Whether the cloning indicator is showing (alt held during translate).
    pub fn is_cloning(&self) -> bool {
        self.state.session().is_some_and(Session::is_cloning)
    }

    /// Oriented bounds of the current selection as it is in `store`.
    pub fn selection_bounds(&self, store: &dyn ShapeStore) -> Option<SelectionBounds> {
        let geometry = ShapeGeometry::new(store, &self.registry);
        let top_level = geometry.top_level(&self.selection);
        compute_selection_bounds(&geometry, &top_level)
    }

    /// Feed one input event through the state machine.
    pub fn handle_event(&mut self, store: &mut dyn ShapeStore, event: InputEvent) {
        let (kind, target) = match self.classify(store, &event) {
            Some(classified) => classified,
            None => {
                log::trace!("Unhandled input {:?}", event);
                return;
            }
        };
        let state = self.state.kind();
        let Some(step) = transition(state, kind) else {
            log::trace!("No transition for {:?} in {:?}", kind, state);
            return;
        };

        match (step.action, event) {
            (Action::None, _) => {}
            (Action::BeginPointing, InputEvent::PointerDown { point, coarse, .. }) => {
                let handle = match target {
                    Some(PointerTarget::Handle(handle)) => Some(handle),
                    _ => None,
                };
                let pointing = Pointing {
                    origin: point,
                    handle,
                    coarse,
                };
                self.state = match step.next {
                    StateKind::PointingResizeHandle => {
                        InteractionState::PointingResizeHandle(pointing)
                    }
                    StateKind::PointingRotateHandle => {
                        InteractionState::PointingRotateHandle(pointing)
                    }
                    _ => InteractionState::PointingSelection(pointing),
                };
            }
            (Action::UpdateHover, InputEvent::PointerMove { point, .. }) => {
                self.update_hover(store, point);
            }
            (Action::StartSessionIfDragged, InputEvent::PointerMove { point, modifiers }) => {
                self.start_session_if_dragged(store, point, modifiers, step.next);
            }
            (Action::Update, InputEvent::PointerMove { point, modifiers }) => {
                self.update_session(store, point, modifiers);
            }
            (Action::UpdateModifiers, InputEvent::ModifiersChanged { modifiers, now }) => {
                let delay = Duration::from_millis(self.config.clone_revert_delay_ms);
                if let Some(session) = self.state.session_mut() {
                    session.flags = modifiers.into();
                    session.set_alt(modifiers.alt, now, delay);
                }
                self.recompute(store);
            }
            (Action::Commit, _) => self.complete_session(store),
            (Action::Revert, _) => self.cancel_session(store),
            (Action::EndPointing, _) => {
                self.state = InteractionState::Idle;
                self.cursor = CursorHint::default();
            }
            (Action::Defer, event) => self.deferred.push_back(event),
            (Action::RunTimers, InputEvent::Tick(now)) => {
                if let Some(session) = self.state.session_mut() {
                    session.tick(now);
                }
            }
            (action, event) => log::debug!("Action {:?} does not apply to {:?}", action, event),
        }
    }

    /// Start a resize session directly, without the pointing phase.
    pub fn begin_resize_session(
        &mut self,
        store: &dyn ShapeStore,
        handle: HandleKind,
        origin: Point,
        modifiers: Modifiers,
    ) -> bool {
        if !handle.is_resize() {
            log::debug!("{:?} is not a resize handle", handle);
            return false;
        }
        self.begin_session(store, SessionKind::Resize { handle }, origin, modifiers)
    }

    /// Capture the selection and start a session of `kind`.
    ///
    /// Returns `false` when a session is already running or nothing is selected.
    pub fn begin_session(
        &mut self,
        store: &dyn ShapeStore,
        kind: SessionKind,
        origin: Point,
        modifiers: Modifiers,
    ) -> bool {
        if self.state.kind().is_session() {
            log::debug!("Session already active, ignoring begin");
            return false;
        }
        let Some(snapshot) = self.capture(store) else {
            log::debug!("Nothing to transform, selection is empty");
            self.state = InteractionState::Idle;
            return false;
        };
        let rotation = snapshot.bounds.rotation;
        self.cursor = match kind {
            SessionKind::Resize { handle } => cursor_for_handle(handle, rotation),
            SessionKind::Rotate => cursor_for_handle(HandleKind::Rotate, rotation),
            SessionKind::Translate => CursorHint {
                kind: CursorKind::Move,
                rotation: 0.0,
            },
        };
        log::debug!(
            "Starting {:?} session on {} shapes",
            kind,
            snapshot.top_level.len()
        );
        let session = Session::new(kind, origin, modifiers.into(), snapshot);
        self.state = InteractionState::from_session(session);
        true
    }

    /// Move the active session to `point` (page space) and commit the result.
    pub fn update_session(
        &mut self,
        store: &mut dyn ShapeStore,
        point: Point,
        modifiers: Modifiers,
    ) {
        let Some(session) = self.state.session_mut() else {
            log::debug!("update_session without an active session");
            return;
        };
        session.current = point;
        session.flags = modifiers.into();
        self.recompute(store);
    }

    /// Restore every captured shape and end the session.
    pub fn cancel_session(&mut self, store: &mut dyn ShapeStore) {
        match std::mem::replace(&mut self.state, InteractionState::Idle) {
            InteractionState::Resizing(session)
            | InteractionState::Rotating(session)
            | InteractionState::Translating(session) => {
                store.update_shapes(session.revert_partials());
                log::debug!("Cancelled {:?} session", session.kind);
            }
            InteractionState::Idle => log::debug!("cancel_session without an active session"),
            _ => {}
        }
        self.finish(store);
    }

    /// Keep the last committed batch and end the session.
    pub fn complete_session(&mut self, store: &mut dyn ShapeStore) {
        match std::mem::replace(&mut self.state, InteractionState::Idle) {
            InteractionState::Resizing(session)
            | InteractionState::Rotating(session)
            | InteractionState::Translating(session) => {
                log::debug!("Completed {:?} session", session.kind);
            }
            other => {
                log::debug!("complete_session without an active session");
                self.state = other;
                return;
            }
        }
        self.finish(store);
    }

    /// Scale the selection by `scale` (selection frame) about `origin` in one batch.
    ///
    /// An aspect-locked selection scales uniformly by the larger factor.
    pub fn resize_selection(
        &mut self,
        store: &mut dyn ShapeStore,
        scale: Vec2,
        origin: ScaleOrigin,
    ) -> TransformOutcome {
        if self.state.kind().is_session() {
            log::debug!("resize_selection ignored during a transform session");
            return TransformOutcome::default();
        }
        let Some(snapshot) = self.capture(store) else {
            return TransformOutcome::default();
        };
        let scale = if snapshot.aspect_locked && scale.x.abs() != scale.y.abs() {
            log::debug!("Selection is aspect locked, making {:?} uniform", scale);
            uniform_scale(scale)
        } else {
            scale
        };
        let bounds = snapshot.bounds;
        let anchor = match origin {
            ScaleOrigin::Center => bounds.rect.center(),
            ScaleOrigin::Handle(handle) => handle.position_on(bounds.rect),
            ScaleOrigin::Point(point) => bounds.page_to_frame() * point,
        };
        let transform = page_scale_transform(bounds.rotation, scale, anchor);
        let mut outcome = apply_scale(store, &self.registry, &snapshot, transform);
        let batch = stage_batch(store, &self.registry, std::mem::take(&mut outcome.updates));
        store.update_shapes(batch.clone());
        outcome.updates = batch;
        outcome
    }

    /// Mirror the selection left to right about its center.
    pub fn flip_horizontal(&mut self, store: &mut dyn ShapeStore) -> TransformOutcome {
        self.resize_selection(store, Vec2::new(-1.0, 1.0), ScaleOrigin::Center)
    }

    /// Mirror the selection top to bottom about its center.
    pub fn flip_vertical(&mut self, store: &mut dyn ShapeStore) -> TransformOutcome {
        self.resize_selection(store, Vec2::new(1.0, -1.0), ScaleOrigin::Center)
    }

    fn capture(&self, store: &dyn ShapeStore) -> Option<SessionSnapshot> {
        SessionSnapshot::capture(store, &self.registry, &self.selection, &self.camera)
    }

    fn classify(
        &self,
        store: &dyn ShapeStore,
        event: &InputEvent,
    ) -> Option<(EventKind, Option<PointerTarget>)> {
        if event.is_cancel() {
            return Some((EventKind::Cancel, None));
        }
        let kind = match event {
            InputEvent::PointerDown { point, target, .. } => {
                let target = target.unwrap_or_else(|| self.hit_test(store, *point));
                let kind = match target {
                    PointerTarget::Handle(HandleKind::Rotate) => {
                        EventKind::PointerDownOnRotateHandle
                    }
                    PointerTarget::Handle(_) => EventKind::PointerDownOnResizeHandle,
                    PointerTarget::Selection => EventKind::PointerDownOnSelection,
                    PointerTarget::Canvas => EventKind::PointerDownOnCanvas,
                };
                return Some((kind, Some(target)));
            }
            InputEvent::PointerMove { .. } => EventKind::PointerMove,
            InputEvent::PointerUp { .. } => EventKind::PointerUp,
            InputEvent::ModifiersChanged { .. } => EventKind::ModifiersChanged,
            InputEvent::Tick(_) => EventKind::Tick,
            InputEvent::KeyDown(_) | InputEvent::Cancel => return None,
        };
        Some((kind, None))
    }

    fn hit_test(&self, store: &dyn ShapeStore, point: Point) -> PointerTarget {
        let Some(bounds) = self.selection_bounds(store) else {
            return PointerTarget::Canvas;
        };
        let config = &self.config;
        let tolerance = self.camera.screen_distance(config.handle_hit_tolerance);
        let offset = self.camera.screen_distance(config.rotate_handle_offset);
        if let Some(handle) = hit_test_selection_handles(&bounds, point, tolerance, offset) {
            PointerTarget::Handle(handle)
        } else if bounds.rect.contains_point(bounds.page_to_frame() * point) {
            PointerTarget::Selection
        } else {
            PointerTarget::Canvas
        }
    }

    fn update_hover(&mut self, store: &dyn ShapeStore, point: Point) {
        self.cursor = match (self.hit_test(store, point), self.selection_bounds(store)) {
            (PointerTarget::Handle(handle), Some(bounds)) => {
                cursor_for_handle(handle, bounds.rotation)
            }
            _ => CursorHint::default(),
        };
    }

    fn start_session_if_dragged(
        &mut self,
        store: &mut dyn ShapeStore,
        point: Point,
        modifiers: Modifiers,
        next: StateKind,
    ) {
        let Some(pointing) = self.state.pointing() else {
            return;
        };
        let drag = self.config.drag_threshold(pointing.coarse);
        let threshold = self.camera.screen_distance(drag);
        if point.distance(pointing.origin) <= threshold {
            return;
        }
        let kind = match (next, pointing.handle) {
            (StateKind::Resizing, Some(handle)) => SessionKind::Resize { handle },
            (StateKind::Rotating, _) => SessionKind::Rotate,
            _ => SessionKind::Translate,
        };
        if self.begin_session(store, kind, pointing.origin, modifiers) {
            self.update_session(store, point, modifiers);
        }
    }

    /// Recompute the active session from its snapshot and commit one batch.
    fn recompute(&mut self, store: &mut dyn ShapeStore) {
        let Self {
            state,
            config,
            registry,
            camera,
            snap_lines,
            ..
        } = self;
        let Some(session) = state.session_mut() else {
            return;
        };
        let (outcome, lines) = match session.kind {
            SessionKind::Resize { .. } => {
                update_resize(session, &*store, registry, config, camera.zoom)
            }
            SessionKind::Rotate => (update_rotate(session, &*store, config), Vec::new()),
            SessionKind::Translate => update_translate(session, &*store, config, camera.zoom),
        };
        session.commit(store, registry, outcome.updates);
        *snap_lines = lines;
    }

    /// Reset session feedback and dispatch pointer presses that arrived mid-session.
    fn finish(&mut self, store: &mut dyn ShapeStore) {
        self.snap_lines.clear();
        self.cursor = CursorHint::default();
        while !self.state.kind().is_session() {
            let Some(event) = self.deferred.pop_front() else {
                break;
            };
            self.handle_event(store, event);
        }
    }
}
