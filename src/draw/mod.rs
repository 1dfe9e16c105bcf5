//! Stroke data model and rendering order.
//!
//! This module defines the core ink types used for score-sheet annotation:
//! - [`Color`]: RGBA color with palette constants and wire tokens
//! - [`Path`]/[`Point`]: stroke geometry and its compact text encoding
//! - [`Stroke`]: an immutable committed mark plus the style resolver
//! - [`Frame`]: the bounded list of committed strokes for one board
//! - [`render_plan`]: layered draw order for committed and live ink

pub mod color;
pub mod frame;
pub mod path;
pub mod render;
pub mod stroke;

// Re-export commonly used types at module level
pub use color::Color;
pub use frame::Frame;
pub use path::{Path, Point, Segment};
pub use render::{DrawOp, Layer, LiveStroke, render_plan};
pub use stroke::{Paint, Pass, ResolvedStyle, Stroke, resolve_style};

pub use color::{BLACK, BLUE, GREEN, ORANGE, PINK, RED, TRANSPARENT, WHITE, YELLOW};
