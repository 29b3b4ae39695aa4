//! Engine configuration.

use crate::selection::HANDLE_SIZE;
use crate::snap::{ANGLE_SNAP_INCREMENT, GRID_SIZE};
use serde::{Deserialize, Serialize};

/// Default snap threshold in screen pixels.
pub const DEFAULT_SNAP_DISTANCE: f64 = 8.0;

/// Grid rounding settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub enabled: bool,
    /// Grid pitch in page units.
    pub size: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            size: GRID_SIZE,
        }
    }
}

/// Tunables for the transform engine.
///
/// Distances marked "screen" are divided by the camera zoom before they are
/// compared against page coordinates, so they stay constant on screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Snap threshold (screen px).
    pub snap_distance: f64,
    /// Movement before a press turns into a drag (screen px).
    pub drag_distance: f64,
    /// Drag distance for coarse pointers such as touch (screen px).
    pub coarse_drag_distance: f64,
    pub grid: GridConfig,
    /// Rotation increment applied while shift is held.
    pub rotation_snap_degrees: f64,
    /// Delay before the cloning indicator clears after alt is released.
    pub clone_revert_delay_ms: u64,
    /// Hit radius around handles (screen px).
    pub handle_hit_tolerance: f64,
    /// Distance of the rotate handle above the selection's top edge (screen px).
    pub rotate_handle_offset: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            snap_distance: DEFAULT_SNAP_DISTANCE,
            drag_distance: 4.0,
            coarse_drag_distance: 6.0,
            grid: GridConfig::default(),
            rotation_snap_degrees: ANGLE_SNAP_INCREMENT,
            clone_revert_delay_ms: 150,
            handle_hit_tolerance: HANDLE_SIZE,
            rotate_handle_offset: 24.0,
        }
    }
}

impl EngineConfig {
    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize from JSON; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Drag threshold in screen px for the given pointer type.
    pub fn drag_threshold(&self, coarse: bool) -> f64 {
        if coarse {
            self.coarse_drag_distance
        } else {
            self.drag_distance
        }
    }
}
