//! Drawing tool selection.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Active ink tool.
///
/// The tool in effect when the pointer lifts decides the style of the whole
/// stroke (see [`crate::draw::Stroke::resolve`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ToolMode {
    /// Regular pen using the configured color and width (default)
    #[default]
    Normal,
    /// Fixed thin red marker for calling out moments
    Telestrator,
    /// Translucent yellow marker
    Highlighter,
    /// Background-colored ink painted over existing marks
    Eraser,
}

impl ToolMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolMode::Normal => "normal",
            ToolMode::Telestrator => "telestrator",
            ToolMode::Highlighter => "highlighter",
            ToolMode::Eraser => "eraser",
        }
    }
}

impl fmt::Display for ToolMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "normal" | "pen" => Ok(ToolMode::Normal),
            "telestrator" => Ok(ToolMode::Telestrator),
            "highlighter" | "highlight" => Ok(ToolMode::Highlighter),
            "eraser" => Ok(ToolMode::Eraser),
            other => Err(format!("unknown tool mode '{other}'")),
        }
    }
}
