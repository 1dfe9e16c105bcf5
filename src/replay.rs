//! Scripted board sessions.
//!
//! A replay script is a JSON array of actions applied to a [`Board`] in
//! order, e.g.
//!
//! ```json
//! [
//!   { "action": "tool", "mode": "highlighter" },
//!   { "action": "begin", "x": 10, "y": 10, "kind": "stylus" },
//!   { "action": "move", "x": 40, "y": 12 },
//!   { "action": "end" },
//!   { "action": "undo" }
//! ]
//! ```

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::draw::{Color, Point};
use crate::input::{Board, PointerKind, ToolMode};

/// One scripted step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum Action {
    Begin {
        x: f64,
        y: f64,
        #[serde(default)]
        kind: Option<PointerKind>,
    },
    Move {
        x: f64,
        y: f64,
        #[serde(default)]
        kind: Option<PointerKind>,
    },
    End {
        #[serde(default)]
        kind: Option<PointerKind>,
    },
    Cancel,
    Tool {
        mode: ToolMode,
    },
    Color {
        color: Color,
    },
    Width {
        width: f64,
    },
    Undo,
    Redo,
    Clear,
}

/// What a replay did to the board.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplayReport {
    pub actions: usize,
    pub strokes: usize,
    pub undo_depth: usize,
}

/// Parses a script from JSON text.
pub fn parse_script(text: &str) -> Result<Vec<Action>> {
    serde_json::from_str(text).context("Invalid replay script")
}

/// Reads and parses a script file.
pub fn load_script(path: &Path) -> Result<Vec<Action>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read replay script {}", path.display()))?;
    parse_script(&text).with_context(|| format!("While parsing {}", path.display()))
}

/// Applies `actions` to `board` in order.
///
/// An unfinished gesture at the end of the script is left in progress; the
/// caller decides whether to end or discard it.
pub fn apply(board: &mut Board, actions: &[Action]) -> ReplayReport {
    for action in actions {
        debug!("Replay: {:?}", action);
        match *action {
            Action::Begin { x, y, kind } => board.begin(Point::new(x, y), kind),
            Action::Move { x, y, kind } => board.move_to(Point::new(x, y), kind),
            Action::End { kind } => board.end(kind),
            Action::Cancel => board.cancel(),
            Action::Tool { mode } => {
                board.pen().select_tool(mode);
            }
            Action::Color { color } => {
                board.pen().set_color(color);
            }
            Action::Width { width } => {
                board.pen().set_width(width);
            }
            Action::Undo => {
                board.undo();
            }
            Action::Redo => {
                board.redo();
            }
            Action::Clear => board.clear(),
        }
    }

    ReplayReport {
        actions: actions.len(),
        strokes: board.strokes().len(),
        undo_depth: board.undo_stack().len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::{RED, YELLOW};
    use crate::input::BoardSettings;
    use crate::pen::{PenConfig, PenLimits, PenService};
    use std::sync::Arc;

    fn board() -> Board {
        let pen = Arc::new(PenService::in_memory(
            PenLimits::default(),
            PenConfig::default(),
        ));
        Board::new("replay", BoardSettings::default(), pen)
    }

    #[test]
    fn parses_every_action_kind() {
        let script = parse_script(
            r#"[
                {"action":"begin","x":1,"y":2,"kind":"mouse"},
                {"action":"move","x":3,"y":4},
                {"action":"end"},
                {"action":"cancel"},
                {"action":"tool","mode":"telestrator"},
                {"action":"color","color":"red"},
                {"action":"width","width":7.5},
                {"action":"undo"},
                {"action":"redo"},
                {"action":"clear"}
            ]"#,
        )
        .unwrap();

        assert_eq!(script.len(), 10);
        assert_eq!(
            script[0],
            Action::Begin {
                x: 1.0,
                y: 2.0,
                kind: Some(PointerKind::Mouse)
            }
        );
        assert_eq!(script[2], Action::End { kind: None });
        assert_eq!(
            script[4],
            Action::Tool {
                mode: ToolMode::Telestrator
            }
        );
        assert_eq!(script[5], Action::Color { color: RED });
    }

    #[test]
    fn unknown_action_is_rejected() {
        assert!(parse_script(r#"[{"action":"zoom"}]"#).is_err());
    }

    #[test]
    fn replay_draws_undoes_and_redoes() {
        let mut board = board();
        let script = parse_script(
            r#"[
                {"action":"begin","x":0,"y":0},
                {"action":"move","x":4,"y":4},
                {"action":"end"},
                {"action":"tool","mode":"highlighter"},
                {"action":"begin","x":10,"y":0},
                {"action":"move","x":14,"y":0},
                {"action":"end"},
                {"action":"undo"},
                {"action":"redo"},
                {"action":"begin","x":20,"y":0,"kind":"touch"},
                {"action":"end"}
            ]"#,
        )
        .unwrap();

        let report = apply(&mut board, &script);
        assert_eq!(
            report,
            ReplayReport {
                actions: 11,
                strokes: 2,
                undo_depth: 0
            }
        );
        assert_eq!(board.strokes()[1].color(), YELLOW);
    }

    #[test]
    fn load_script_reports_missing_file() {
        let temp = tempfile::tempdir().unwrap();
        let err = load_script(&temp.path().join("nope.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to read replay script"));
    }
}
