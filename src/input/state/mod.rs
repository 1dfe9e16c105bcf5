mod core;
mod history;
mod pointer;
mod render;

pub use self::core::{Board, BoardSettings, DEFAULT_MAX_STROKES, DEFAULT_MAX_UNDO, DrawingState};
