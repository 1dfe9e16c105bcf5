//! Generic pointer event types for host integration.

use serde::{Deserialize, Serialize};

use crate::draw::Point;

/// Kind of device that produced a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerKind {
    /// Pen/stylus digitizer (preferred input)
    Stylus,
    /// Mouse or trackpad
    Mouse,
    /// Finger touch (ignored so a resting palm never inks)
    Touch,
}

/// Whether events from `kind` may draw.
///
/// A missing kind is allowed: some platforms do not report the device.
pub fn is_ink_allowed(kind: Option<PointerKind>) -> bool {
    !matches!(kind, Some(PointerKind::Touch))
}

/// Pointer event phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerPhase {
    /// Contact started (pen down / button pressed)
    Down,
    /// Contact moved
    Move,
    /// Contact ended (pen up / button released)
    Up,
    /// Gesture abandoned by the platform
    Cancel,
}

/// A pointer event as delivered by the host.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub phase: PointerPhase,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub kind: Option<PointerKind>,
}

impl PointerEvent {
    pub fn new(phase: PointerPhase, x: f64, y: f64, kind: Option<PointerKind>) -> Self {
        Self { phase, x, y, kind }
    }

    pub fn down(x: f64, y: f64, kind: Option<PointerKind>) -> Self {
        Self::new(PointerPhase::Down, x, y, kind)
    }

    pub fn moved(x: f64, y: f64, kind: Option<PointerKind>) -> Self {
        Self::new(PointerPhase::Move, x, y, kind)
    }

    pub fn up(x: f64, y: f64, kind: Option<PointerKind>) -> Self {
        Self::new(PointerPhase::Up, x, y, kind)
    }

    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touch_is_the_only_rejected_kind() {
        assert!(is_ink_allowed(Some(PointerKind::Stylus)));
        assert!(is_ink_allowed(Some(PointerKind::Mouse)));
        assert!(is_ink_allowed(None));
        assert!(!is_ink_allowed(Some(PointerKind::Touch)));
    }

    #[test]
    fn event_deserializes_without_kind() {
        let event: PointerEvent = serde_json::from_str(r#"{"phase":"down","x":1,"y":2}"#).unwrap();
        assert_eq!(event, PointerEvent::down(1.0, 2.0, None));
    }
}
