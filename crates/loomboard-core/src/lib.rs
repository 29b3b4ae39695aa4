//! Loomboard Core Library
//!
//! Selection transform engine for the Loomboard infinite canvas: resize,
//! rotate and translate sessions over nested, rotated shapes, with snapping
//! and a pointer-driven interaction state machine.

pub mod accessor;
pub mod camera;
pub mod config;
pub mod editor;
pub mod error;
pub mod geometry;
pub mod input;
pub mod machine;
pub mod resize;
pub mod rotate;
pub mod selection;
pub mod session;
pub mod shapes;
pub mod snap;
pub mod store;
pub mod timer;
pub mod translate;

pub use accessor::ShapeGeometry;
pub use camera::Camera;
pub use config::{EngineConfig, GridConfig};
pub use editor::{ScaleOrigin, TransformEditor};
pub use error::{TransformError, TransformResult};
pub use input::{InputEvent, Modifiers, PointerTarget};
pub use machine::{Action, EventKind, StateKind};
pub use selection::{Corner, CursorHint, CursorKind, Edge, HandleKind, SelectionBounds};
pub use session::{SessionFlags, SessionKind, TransformOutcome};
pub use shapes::{
    ParentId, PartialShape, Shape, ShapeId, ShapeKind, ShapeProps, ShapeRegistry, ShapeUtil,
};
pub use snap::{GapDirection, GapIndicator, SnapLine};
pub use store::{MemoryShapeStore, ShapeStore, StoreError};
