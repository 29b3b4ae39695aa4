//! Input events consumed by the transform editor.
//!
//! Pointer positions are in page coordinates; the embedder converts from
//! screen space with [`Camera::screen_to_page`](crate::Camera::screen_to_page).

use crate::selection::HandleKind;
use crate::timer::Instant;
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Key name that cancels the active interaction.
pub const ESCAPE_KEY: &str = "Escape";

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub fn shift() -> Self {
        Self {
            shift: true,
            ..Self::NONE
        }
    }

    pub fn ctrl() -> Self {
        Self {
            ctrl: true,
            ..Self::NONE
        }
    }

    pub fn alt() -> Self {
        Self {
            alt: true,
            ..Self::NONE
        }
    }

    /// Snap modifier: ctrl, or cmd on macOS.
    pub fn snap(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// What the pointer went down on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointerTarget {
    /// A selection handle.
    Handle(HandleKind),
    /// The selection body.
    Selection,
    /// Empty canvas or an unselected shape.
    Canvas,
}

/// An input event.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    PointerDown {
        point: Point,
        /// `None` lets the editor hit-test the current selection.
        target: Option<PointerTarget>,
        modifiers: Modifiers,
        /// Touch or pen input, which uses a larger drag threshold.
        coarse: bool,
    },
    PointerMove {
        point: Point,
        modifiers: Modifiers,
    },
    PointerUp {
        point: Point,
        modifiers: Modifiers,
    },
    ModifiersChanged {
        modifiers: Modifiers,
        now: Instant,
    },
    KeyDown(String),
    Cancel,
    Tick(Instant),
}

impl InputEvent {
    /// Mouse press with an explicit target.
    pub fn pointer_down(point: Point, target: PointerTarget, modifiers: Modifiers) -> Self {
        InputEvent::PointerDown {
            point,
            target: Some(target),
            modifiers,
            coarse: false,
        }
    }

    pub fn pointer_move(point: Point, modifiers: Modifiers) -> Self {
        InputEvent::PointerMove { point, modifiers }
    }

    pub fn pointer_up(point: Point, modifiers: Modifiers) -> Self {
        InputEvent::PointerUp { point, modifiers }
    }

    pub fn modifiers_changed(modifiers: Modifiers, now: Instant) -> Self {
        InputEvent::ModifiersChanged { modifiers, now }
    }

    /// Whether this is the cancel key or an explicit cancel.
    pub fn is_cancel(&self) -> bool {
        match self {
            InputEvent::Cancel => true,
            InputEvent::KeyDown(key) => key == ESCAPE_KEY,
            _ => false,
        }
    }
}
