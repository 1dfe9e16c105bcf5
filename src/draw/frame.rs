//! Frame container for the committed strokes of one board.

use super::stroke::Stroke;

/// Committed strokes in commit order (first = oldest).
///
/// Commit order is the z-order within a tool group; the rendering model
/// regroups by tool (see [`crate::draw::render_plan`]).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    strokes: Vec<Stroke>,
}

impl Frame {
    /// Creates a new empty frame with no strokes.
    pub fn new() -> Self {
        Self {
            strokes: Vec::new(),
        }
    }

    /// Builds a frame from loaded strokes, keeping only the newest `max`.
    pub fn from_strokes(mut strokes: Vec<Stroke>, max: usize) -> Self {
        drop_oldest(&mut strokes, max);
        Self { strokes }
    }

    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    pub fn len(&self) -> usize {
        self.strokes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty()
    }

    /// Removes all strokes from the frame.
    pub fn clear(&mut self) {
        self.strokes.clear();
    }

    /// Appends a stroke on top, dropping the oldest strokes beyond `max`.
    ///
    /// Returns the number of strokes dropped.
    pub fn push_bounded(&mut self, stroke: Stroke, max: usize) -> usize {
        self.strokes.push(stroke);
        drop_oldest(&mut self.strokes, max)
    }

    /// Removes and returns the most recently added stroke, if any.
    pub fn pop(&mut self) -> Option<Stroke> {
        self.strokes.pop()
    }
}

/// Trims `items` to its newest `max` entries. Returns how many were removed.
pub(crate) fn drop_oldest<T>(items: &mut Vec<T>, max: usize) -> usize {
    let excess = items.len().saturating_sub(max);
    if excess > 0 {
        items.drain(..excess);
    }
    excess
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::{Color, Path, Point};
    use crate::input::ToolMode;

    fn stroke(n: u8) -> Stroke {
        Stroke::new(
            Path::from_points(&[Point::new(n as f64, 0.0)]),
            Color::from_rgb8(n, 0, 0),
            2.0,
            ToolMode::Normal,
        )
        .unwrap()
    }

    #[test]
    fn push_bounded_drops_oldest() {
        let mut frame = Frame::new();
        assert_eq!(frame.push_bounded(stroke(1), 2), 0);
        assert_eq!(frame.push_bounded(stroke(2), 2), 0);
        assert_eq!(frame.push_bounded(stroke(3), 2), 1);
        assert_eq!(frame.strokes(), &[stroke(2), stroke(3)]);
    }

    #[test]
    fn from_strokes_keeps_newest() {
        let frame = Frame::from_strokes((1..=5).map(stroke).collect(), 3);
        assert_eq!(frame.strokes(), &[stroke(3), stroke(4), stroke(5)]);
    }

    #[test]
    fn pop_returns_last() {
        let mut frame = Frame::from_strokes(vec![stroke(1), stroke(2)], 10);
        assert_eq!(frame.pop(), Some(stroke(2)));
        assert_eq!(frame.len(), 1);
        frame.clear();
        assert!(frame.pop().is_none());
    }
}
