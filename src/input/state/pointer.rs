use log::debug;

use crate::draw::{Point, Stroke};
use crate::input::events::{PointerEvent, PointerKind, PointerPhase, is_ink_allowed};
use crate::input::path_builder::PathBuilder;

use super::{Board, DrawingState};

impl Board {
    /// Processes a pointer down.
    ///
    /// # Behavior
    /// - Touch input and non-finite coordinates are ignored
    /// - While Idle: starts new geometry seeded at `point`
    /// - While already Drawing: commits the stroke in progress first, then
    ///   starts the new one
    pub fn begin(&mut self, point: Point, kind: Option<PointerKind>) {
        if !is_ink_allowed(kind) {
            return;
        }
        if !point.is_finite() {
            debug!("Ignoring pointer down at non-finite position {point:?}");
            return;
        }

        if self.is_drawing() {
            debug!("Pointer down while drawing; finishing previous stroke");
            self.finish_stroke();
        }

        self.state = DrawingState::Drawing {
            kind,
            builder: PathBuilder::new(point),
        };
        self.needs_redraw = true;
    }

    /// Processes pointer motion. No-op unless a stroke is in progress or
    /// when the position is not finite.
    pub fn move_to(&mut self, point: Point, kind: Option<PointerKind>) {
        if !is_ink_allowed(kind) || !point.is_finite() {
            return;
        }

        if let DrawingState::Drawing { builder, .. } = &mut self.state {
            builder.push(point);
            self.needs_redraw = true;
        }
    }

    /// Processes a pointer up: resolves the style from the pen as it is now
    /// and commits the stroke. No-op unless a stroke is in progress.
    pub fn end(&mut self, kind: Option<PointerKind>) {
        if !is_ink_allowed(kind) {
            return;
        }
        self.finish_stroke();
    }

    /// Abandons the stroke in progress without committing it.
    pub fn cancel(&mut self) {
        if self.is_drawing() {
            self.state = DrawingState::Idle;
            self.needs_redraw = true;
        }
    }

    /// Drives the state machine from a host event.
    pub fn handle_event(&mut self, event: PointerEvent) {
        match event.phase {
            PointerPhase::Down => self.begin(event.point(), event.kind),
            PointerPhase::Move => self.move_to(event.point(), event.kind),
            PointerPhase::Up => self.end(event.kind),
            PointerPhase::Cancel => {
                if is_ink_allowed(event.kind) {
                    self.cancel();
                }
            }
        }
    }

    /// Processes a batch of events in order.
    pub fn dispatch(&mut self, events: impl IntoIterator<Item = PointerEvent>) {
        for event in events {
            self.handle_event(event);
        }
    }

    fn finish_stroke(&mut self) {
        let DrawingState::Drawing { builder, .. } =
            std::mem::replace(&mut self.state, DrawingState::Idle)
        else {
            return;
        };
        self.needs_redraw = true;

        let pen = self.pen.get();
        match Stroke::resolve(builder.into_path(), &pen, self.settings.background) {
            Some(stroke) => self.commit(stroke),
            None => debug!("Discarding stroke with unusable geometry or width"),
        }
    }
}
