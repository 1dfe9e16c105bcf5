use log::debug;

use crate::draw::Stroke;
use crate::draw::frame::drop_oldest;

use super::Board;

impl Board {
    /// Appends a finished stroke and clears the redo history.
    pub fn commit(&mut self, stroke: Stroke) {
        let dropped = self
            .committed
            .push_bounded(stroke, self.settings.max_strokes);
        if dropped > 0 {
            debug!(
                "Stroke limit ({}) reached; dropped {} oldest",
                self.settings.max_strokes, dropped
            );
        }
        self.undo_stack.clear();
        self.needs_redraw = true;
        self.schedule_save();
    }

    /// Moves the newest committed stroke onto the undo stack.
    ///
    /// Returns false when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(stroke) = self.committed.pop() else {
            return false;
        };
        self.undo_stack.push(stroke);
        drop_oldest(&mut self.undo_stack, self.settings.max_undo);
        self.needs_redraw = true;
        self.schedule_save();
        true
    }

    /// Restores the most recently undone stroke.
    ///
    /// Returns false when the undo stack is empty.
    pub fn redo(&mut self) -> bool {
        let Some(stroke) = self.undo_stack.pop() else {
            return false;
        };
        self.committed
            .push_bounded(stroke, self.settings.max_strokes);
        self.needs_redraw = true;
        self.schedule_save();
        true
    }

    /// Removes every committed stroke and the redo history.
    pub fn clear(&mut self) {
        self.committed.clear();
        self.undo_stack.clear();
        self.needs_redraw = true;
        self.schedule_save();
    }

    pub fn can_undo(&self) -> bool {
        !self.committed.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.undo_stack.is_empty()
    }
}
