//! Wire format for persisted boards.
//!
//! A board is stored as a JSON array of
//! `{path, color, strokeWidth, isEraser, toolMode}` objects. Decoding is
//! tolerant: malformed entries are skipped, entries stored as JSON strings
//! (double-encoded) are unwrapped, and a truncated array still yields every
//! complete object before the cut.

use super::types::StorageError;
use crate::draw::{Color, Path, Stroke};
use crate::input::ToolMode;
use log::{debug, warn};
use serde::Deserialize;
use serde_json::Value;

/// Result of decoding a stored board.
#[derive(Debug, Default, PartialEq)]
pub struct Decoded {
    pub strokes: Vec<Stroke>,
    /// Entries that were present but could not be turned into a stroke
    pub skipped: usize,
    /// True when the array itself was damaged and entries were recovered by scanning
    pub recovered: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireStroke {
    path: Path,
    color: Color,
    stroke_width: f64,
    #[serde(default)]
    is_eraser: Option<bool>,
    #[serde(default)]
    tool_mode: Option<ToolMode>,
}

impl WireStroke {
    fn into_stroke(self) -> Option<Stroke> {
        let mode = match (self.tool_mode, self.is_eraser) {
            (Some(mode), _) => mode,
            (None, Some(true)) => ToolMode::Eraser,
            (None, _) => ToolMode::Normal,
        };
        Stroke::new(self.path, self.color, self.stroke_width, mode)
    }
}

/// Serializes the newest `max_persisted` strokes.
pub fn encode(strokes: &[Stroke], max_persisted: usize) -> Result<String, StorageError> {
    let start = strokes.len().saturating_sub(max_persisted);
    if start > 0 {
        debug!(
            "Persisting newest {} of {} strokes",
            max_persisted,
            strokes.len()
        );
    }
    serde_json::to_string(&strokes[start..]).map_err(|e| StorageError::Encode(e.to_string()))
}

/// Deserializes a stored board, skipping anything that is not a valid stroke.
pub fn decode(text: &str) -> Decoded {
    let text = text.trim();
    if text.is_empty() {
        return Decoded::default();
    }

    match serde_json::from_str::<Value>(text) {
        Ok(Value::Array(entries)) => decode_entries(entries.into_iter()),
        // Whole array stored as a JSON string
        Ok(Value::String(inner)) => decode(&inner),
        Ok(Value::Null) => Decoded::default(),
        Ok(other) => {
            warn!(
                "Stored board is a JSON {} instead of an array; ignoring it",
                json_kind(&other)
            );
            Decoded {
                skipped: 1,
                ..Decoded::default()
            }
        }
        Err(err) => {
            warn!("Stored board is not valid JSON ({err}); scanning for complete entries");
            let objects = scan_objects(text);
            let mut decoded = decode_entries(objects.iter().map(|raw| {
                serde_json::from_str::<Value>(raw).unwrap_or(Value::Null)
            }));
            decoded.recovered = true;
            decoded
        }
    }
}

fn decode_entries(entries: impl Iterator<Item = Value>) -> Decoded {
    let mut decoded = Decoded::default();

    for (index, entry) in entries.enumerate() {
        let parsed = match entry {
            Value::String(inner) => serde_json::from_str::<WireStroke>(&inner),
            other => serde_json::from_value::<WireStroke>(other),
        };

        match parsed.map(WireStroke::into_stroke) {
            Ok(Some(stroke)) => decoded.strokes.push(stroke),
            Ok(None) => {
                warn!("Skipping stored stroke {index}: empty path or invalid width");
                decoded.skipped += 1;
            }
            Err(err) => {
                warn!("Skipping malformed stored stroke {index}: {err}");
                decoded.skipped += 1;
            }
        }
    }

    decoded
}

/// Returns the raw text of each complete top-level object inside an array,
/// tracking brace depth and ignoring braces inside string literals.
fn scan_objects(text: &str) -> Vec<&str> {
    let mut objects = Vec::new();
    let mut depth = 0usize;
    let mut start = None;
    let mut in_string = false;
    let mut escaped = false;

    for (index, ch) in text.char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' => {
                if depth == 0 {
                    start = Some(index);
                }
                depth += 1;
            }
            '}' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    if let Some(begin) = start.take() {
                        objects.push(&text[begin..=index]);
                    }
                }
            }
            _ => {}
        }
    }

    objects
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
