//! Input handling and board state machine.
//!
//! This module translates host pointer events into strokes. It owns the
//! drawing state machine (idle, drawing), the path builder used for live
//! geometry, and the board's committed strokes and undo history.

pub mod events;
pub mod path_builder;
pub mod state;
pub mod tool;

// Re-export commonly used types at module level
pub use events::{PointerEvent, PointerKind, PointerPhase, is_ink_allowed};
pub use path_builder::PathBuilder;
pub use state::{Board, BoardSettings, DrawingState};
pub use tool::ToolMode;
