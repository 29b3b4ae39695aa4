//! Interaction state machine: states, events and the transition table.
//!
//! The table only says where an event leads and what has to happen on the
//! way. [`TransformEditor`](crate::TransformEditor) owns the per-state data
//! and performs the actions.

use serde::{Deserialize, Serialize};

/// Interaction states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StateKind {
    Idle,
    PointingResizeHandle,
    Resizing,
    PointingRotateHandle,
    Rotating,
    PointingSelection,
    Translating,
}

impl StateKind {
    /// Pressed on a handle or the selection, no session yet.
    pub fn is_pointing(self) -> bool {
        matches!(
            self,
            StateKind::PointingResizeHandle
                | StateKind::PointingRotateHandle
                | StateKind::PointingSelection
        )
    }

    /// A transform session is running.
    pub fn is_session(self) -> bool {
        matches!(
            self,
            StateKind::Resizing | StateKind::Rotating | StateKind::Translating
        )
    }
}

/// Input classified for table lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    PointerDownOnResizeHandle,
    PointerDownOnRotateHandle,
    PointerDownOnSelection,
    PointerDownOnCanvas,
    PointerMove,
    PointerUp,
    ModifiersChanged,
    Cancel,
    Tick,
}

/// Work to do while taking a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    None,
    /// Remember the press origin, modifiers and target.
    BeginPointing,
    /// Refresh the hover cursor.
    UpdateHover,
    /// Start the session once the pointer has travelled past the drag
    /// distance. Until then the state does not change.
    StartSessionIfDragged,
    /// Recompute the session at the new pointer position.
    Update,
    /// Recompute the session with new modifiers at the last pointer position.
    UpdateModifiers,
    /// Keep the session's last batch and end it.
    Commit,
    /// Restore the snapshot and end the session.
    Revert,
    /// Leave the pointing state without writing anything.
    EndPointing,
    /// Queue the event until the session resolves.
    Defer,
    /// Run due cosmetic timers.
    RunTimers,
}

/// Target state and the action that gets there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub next: StateKind,
    pub action: Action,
}

use Action as A;
use EventKind as E;
use StateKind as S;

const fn row(
    from: StateKind,
    event: EventKind,
    next: StateKind,
    action: Action,
) -> (StateKind, EventKind, Transition) {
    (from, event, Transition { next, action })
}

/// Every legal transition. Pairs not listed are ignored.
#[rustfmt::skip]
pub const TRANSITIONS: &[(StateKind, EventKind, Transition)] = &[
    row(S::Idle, E::PointerDownOnResizeHandle, S::PointingResizeHandle, A::BeginPointing),
    row(S::Idle, E::PointerDownOnRotateHandle, S::PointingRotateHandle, A::BeginPointing),
    row(S::Idle, E::PointerDownOnSelection, S::PointingSelection, A::BeginPointing),
    row(S::Idle, E::PointerMove, S::Idle, A::UpdateHover),
    // Pointing
    row(S::PointingResizeHandle, E::PointerMove, S::Resizing, A::StartSessionIfDragged),
    row(S::PointingResizeHandle, E::PointerUp, S::Idle, A::EndPointing),
    row(S::PointingResizeHandle, E::Cancel, S::Idle, A::EndPointing),
    row(S::PointingRotateHandle, E::PointerMove, S::Rotating, A::StartSessionIfDragged),
    row(S::PointingRotateHandle, E::PointerUp, S::Idle, A::EndPointing),
    row(S::PointingRotateHandle, E::Cancel, S::Idle, A::EndPointing),
    row(S::PointingSelection, E::PointerMove, S::Translating, A::StartSessionIfDragged),
    row(S::PointingSelection, E::PointerUp, S::Idle, A::EndPointing),
    row(S::PointingSelection, E::Cancel, S::Idle, A::EndPointing),
    // Resizing
    row(S::Resizing, E::PointerMove, S::Resizing, A::Update),
    row(S::Resizing, E::ModifiersChanged, S::Resizing, A::UpdateModifiers),
    row(S::Resizing, E::PointerUp, S::Idle, A::Commit),
    row(S::Resizing, E::Cancel, S::Idle, A::Revert),
    row(S::Resizing, E::PointerDownOnResizeHandle, S::Resizing, A::Defer),
    row(S::Resizing, E::PointerDownOnRotateHandle, S::Resizing, A::Defer),
    row(S::Resizing, E::PointerDownOnSelection, S::Resizing, A::Defer),
    row(S::Resizing, E::PointerDownOnCanvas, S::Resizing, A::Defer),
    row(S::Resizing, E::Tick, S::Resizing, A::RunTimers),
    // Rotating
    row(S::Rotating, E::PointerMove, S::Rotating, A::Update),
    row(S::Rotating, E::ModifiersChanged, S::Rotating, A::UpdateModifiers),
    row(S::Rotating, E::PointerUp, S::Idle, A::Commit),
    row(S::Rotating, E::Cancel, S::Idle, A::Revert),
    row(S::Rotating, E::PointerDownOnResizeHandle, S::Rotating, A::Defer),
    row(S::Rotating, E::PointerDownOnRotateHandle, S::Rotating, A::Defer),
    row(S::Rotating, E::PointerDownOnSelection, S::Rotating, A::Defer),
    row(S::Rotating, E::PointerDownOnCanvas, S::Rotating, A::Defer),
    row(S::Rotating, E::Tick, S::Rotating, A::RunTimers),
    // Translating
    row(S::Translating, E::PointerMove, S::Translating, A::Update),
    row(S::Translating, E::ModifiersChanged, S::Translating, A::UpdateModifiers),
    row(S::Translating, E::PointerUp, S::Idle, A::Commit),
    row(S::Translating, E::Cancel, S::Idle, A::Revert),
    row(S::Translating, E::PointerDownOnResizeHandle, S::Translating, A::Defer),
    row(S::Translating, E::PointerDownOnRotateHandle, S::Translating, A::Defer),
    row(S::Translating, E::PointerDownOnSelection, S::Translating, A::Defer),
    row(S::Translating, E::PointerDownOnCanvas, S::Translating, A::Defer),
    row(S::Translating, E::Tick, S::Translating, A::RunTimers),
];

/// Look up the transition for `event` in `state`.
pub fn transition(state: StateKind, event: EventKind) -> Option<Transition> {
    TRANSITIONS
        .iter()
        .find(|(from, on, _)| *from == state && *on == event)
        .map(|(_, _, transition)| *transition)
}
