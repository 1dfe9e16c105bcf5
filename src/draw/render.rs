//! Layered draw order for committed and in-progress ink.
//!
//! Output is a backend-neutral list of [`DrawOp`]s; whichever surface the host
//! uses (screen canvas, print layout) replays them in order.

use super::color::Color;
use super::path::Path;
use super::stroke::{Paint, Stroke};
use crate::input::ToolMode;

/// Render layer a stroke belongs to, bottom to top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Layer {
    /// Normal pen and eraser ink, in commit order
    Ink,
    /// Telestrator marks
    Telestrator,
    /// Highlighter marks
    Highlighter,
    /// The stroke currently being drawn
    Live,
}

impl Layer {
    fn for_tool(mode: ToolMode) -> Self {
        match mode {
            ToolMode::Normal | ToolMode::Eraser => Layer::Ink,
            ToolMode::Telestrator => Layer::Telestrator,
            ToolMode::Highlighter => Layer::Highlighter,
        }
    }
}

/// One paint operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawOp<'a> {
    pub layer: Layer,
    pub path: &'a Path,
    /// Color with the pass opacity already applied to alpha
    pub color: Color,
    pub width: f64,
    pub paint: Paint,
    pub opacity: f64,
}

/// Geometry and style of the stroke being drawn, for live preview.
#[derive(Debug, Clone, Copy)]
pub struct LiveStroke<'a> {
    pub path: &'a Path,
    pub color: Color,
    pub width: f64,
    pub tool_mode: ToolMode,
}

/// Builds the draw list for a board.
///
/// Normal and eraser strokes come first in commit order, then telestrator,
/// then highlighter (fill pass before stroke pass for each). A live stroke,
/// if any, is painted last.
pub fn render_plan<'a>(committed: &'a [Stroke], live: Option<LiveStroke<'a>>) -> Vec<DrawOp<'a>> {
    let mut ops = Vec::with_capacity(committed.len() + 2);

    for layer in [Layer::Ink, Layer::Telestrator, Layer::Highlighter] {
        for stroke in committed
            .iter()
            .filter(|s| Layer::for_tool(s.tool_mode()) == layer)
        {
            push_passes(
                &mut ops,
                layer,
                stroke.geometry(),
                stroke.color(),
                stroke.stroke_width(),
                stroke.tool_mode(),
            );
        }
    }

    if let Some(live) = live {
        if !live.path.is_empty() {
            push_passes(
                &mut ops,
                Layer::Live,
                live.path,
                live.color,
                live.width,
                live.tool_mode,
            );
        }
    }

    ops
}

fn push_passes<'a>(
    ops: &mut Vec<DrawOp<'a>>,
    layer: Layer,
    path: &'a Path,
    color: Color,
    width: f64,
    mode: ToolMode,
) {
    for pass in mode.passes() {
        ops.push(DrawOp {
            layer,
            path,
            color: color.with_opacity(pass.opacity),
            width,
            paint: pass.paint,
            opacity: pass.opacity,
        });
    }
}
