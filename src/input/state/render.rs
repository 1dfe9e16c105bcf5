use crate::draw::{DrawOp, LiveStroke, Path, render_plan, resolve_style};

use super::{Board, DrawingState};

impl Board {
    /// Geometry of the stroke in progress, if any.
    pub fn live_path(&self) -> Option<&Path> {
        match &self.state {
            DrawingState::Drawing { builder, .. } => Some(builder.path()),
            DrawingState::Idle => None,
        }
    }

    /// Draw list for the whole board, live stroke last in the active tool's style.
    pub fn render_plan(&self) -> Vec<DrawOp<'_>> {
        let live = self.live_path().map(|path| {
            let pen = self.pen.get();
            let style = resolve_style(&pen, self.settings.background);
            LiveStroke {
                path,
                color: style.color,
                width: style.width,
                tool_mode: pen.tool_mode,
            }
        });
        render_plan(self.committed.strokes(), live)
    }

    /// Clears the redraw flag, returning whether a redraw was pending.
    pub fn take_redraw(&mut self) -> bool {
        std::mem::take(&mut self.needs_redraw)
    }
}
