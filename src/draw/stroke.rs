//! Committed ink strokes and the style resolver.

use super::color::{Color, RED, YELLOW};
use super::path::Path;
use crate::input::ToolMode;
use crate::pen::PenConfig;
use serde::Serialize;

/// Fixed telestrator line width.
pub const TELESTRATOR_WIDTH: f64 = 2.0;
/// Eraser width as a multiple of the pen width.
pub const ERASER_WIDTH_FACTOR: f64 = 3.0;

pub const TELESTRATOR_OPACITY: f64 = 0.8;
pub const HIGHLIGHTER_FILL_OPACITY: f64 = 0.3;
pub const HIGHLIGHTER_STROKE_OPACITY: f64 = 0.5;

/// How a pass paints the geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Paint {
    /// Outline along the path at the stroke width
    Stroke,
    /// Fill of the area enclosed by the path
    Fill,
}

/// One render pass of a stroke.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pass {
    pub paint: Paint,
    pub opacity: f64,
}

const OPAQUE: &[Pass] = &[Pass {
    paint: Paint::Stroke,
    opacity: 1.0,
}];
const TELESTRATOR: &[Pass] = &[Pass {
    paint: Paint::Stroke,
    opacity: TELESTRATOR_OPACITY,
}];
const HIGHLIGHTER: &[Pass] = &[
    Pass {
        paint: Paint::Fill,
        opacity: HIGHLIGHTER_FILL_OPACITY,
    },
    Pass {
        paint: Paint::Stroke,
        opacity: HIGHLIGHTER_STROKE_OPACITY,
    },
];

impl ToolMode {
    /// Render passes for strokes drawn with this tool, in paint order.
    pub fn passes(self) -> &'static [Pass] {
        match self {
            ToolMode::Normal | ToolMode::Eraser => OPAQUE,
            ToolMode::Telestrator => TELESTRATOR,
            ToolMode::Highlighter => HIGHLIGHTER,
        }
    }
}

/// Color and width resolved for a tool from the current pen state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedStyle {
    pub color: Color,
    pub width: f64,
}

/// Resolves the ink style for `pen.tool_mode`.
///
/// # Arguments
/// * `pen` - Pen state at the moment of resolution
/// * `background` - Board background, used as eraser ink
pub fn resolve_style(pen: &PenConfig, background: Color) -> ResolvedStyle {
    match pen.tool_mode {
        ToolMode::Normal => ResolvedStyle {
            color: pen.color,
            width: pen.stroke_width,
        },
        ToolMode::Telestrator => ResolvedStyle {
            color: RED,
            width: TELESTRATOR_WIDTH,
        },
        ToolMode::Highlighter => ResolvedStyle {
            color: YELLOW,
            width: pen.stroke_width,
        },
        ToolMode::Eraser => ResolvedStyle {
            color: background,
            width: pen.stroke_width * ERASER_WIDTH_FACTOR,
        },
    }
}

/// One committed ink mark.
///
/// Strokes are immutable once built; the board only ever appends or removes
/// whole strokes. Serializes to the persisted wire shape
/// `{path, color, strokeWidth, isEraser, toolMode}`.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stroke {
    #[serde(rename = "path")]
    geometry: Path,
    color: Color,
    stroke_width: f64,
    is_eraser: bool,
    tool_mode: ToolMode,
}

impl Stroke {
    /// Builds a stroke from explicit attributes.
    ///
    /// The color is snapped to the 8-bit token grid. Returns `None` when the
    /// geometry is empty or the width is not a positive finite number.
    pub fn new(geometry: Path, color: Color, stroke_width: f64, tool_mode: ToolMode) -> Option<Self> {
        if geometry.is_empty() || !stroke_width.is_finite() || stroke_width <= 0.0 {
            return None;
        }
        Some(Self {
            geometry,
            color: color.quantized(),
            stroke_width,
            is_eraser: tool_mode == ToolMode::Eraser,
            tool_mode,
        })
    }

    /// Finalizes `geometry` with the style in effect right now.
    pub fn resolve(geometry: Path, pen: &PenConfig, background: Color) -> Option<Self> {
        let style = resolve_style(pen, background);
        Self::new(geometry, style.color, style.width, pen.tool_mode)
    }

    pub fn geometry(&self) -> &Path {
        &self.geometry
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn stroke_width(&self) -> f64 {
        self.stroke_width
    }

    pub fn is_eraser(&self) -> bool {
        self.is_eraser
    }

    pub fn tool_mode(&self) -> ToolMode {
        self.tool_mode
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::color::{BLACK, BLUE, WHITE};
    use crate::draw::path::Point;

    fn pen(mode: ToolMode, width: f64) -> PenConfig {
        PenConfig {
            color: BLUE,
            stroke_width: width,
            tool_mode: mode,
        }
    }

    fn line() -> Path {
        Path::from_points(&[Point::new(0.0, 0.0), Point::new(10.0, 0.0)])
    }

    #[test]
    fn normal_uses_pen_color_and_width() {
        let stroke = Stroke::resolve(line(), &pen(ToolMode::Normal, 4.0), WHITE).unwrap();
        assert_eq!(stroke.color(), BLUE);
        assert_eq!(stroke.stroke_width(), 4.0);
        assert!(!stroke.is_eraser());
    }

    #[test]
    fn telestrator_is_fixed_red_two() {
        let stroke = Stroke::resolve(line(), &pen(ToolMode::Telestrator, 9.0), WHITE).unwrap();
        assert_eq!(stroke.color(), RED);
        assert_eq!(stroke.stroke_width(), TELESTRATOR_WIDTH);
        assert_eq!(ToolMode::Telestrator.passes()[0].opacity, 0.8);
    }

    #[test]
    fn highlighter_is_yellow_with_fill_then_stroke() {
        let stroke = Stroke::resolve(line(), &pen(ToolMode::Highlighter, 6.0), WHITE).unwrap();
        assert_eq!(stroke.color(), YELLOW);
        assert_eq!(stroke.stroke_width(), 6.0);
        let passes = ToolMode::Highlighter.passes();
        assert_eq!(passes[0].paint, Paint::Fill);
        assert_eq!(passes[0].opacity, 0.3);
        assert_eq!(passes[1].paint, Paint::Stroke);
        assert_eq!(passes[1].opacity, 0.5);
    }

    #[test]
    fn eraser_paints_background_at_triple_width() {
        let stroke = Stroke::resolve(line(), &pen(ToolMode::Eraser, 5.0), BLACK).unwrap();
        assert_eq!(stroke.color(), BLACK);
        assert_eq!(stroke.stroke_width(), 15.0);
        assert!(stroke.is_eraser());
    }

    #[test]
    fn empty_geometry_or_bad_width_is_rejected() {
        assert!(Stroke::new(Path::new(), RED, 2.0, ToolMode::Normal).is_none());
        assert!(Stroke::new(line(), RED, 0.0, ToolMode::Normal).is_none());
        assert!(Stroke::new(line(), RED, f64::NAN, ToolMode::Normal).is_none());
    }

    #[test]
    fn serializes_wire_field_names() {
        let stroke = Stroke::new(line(), RED, 3.0, ToolMode::Normal).unwrap();
        let json = serde_json::to_value(&stroke).unwrap();
        assert_eq!(json["path"], "M0 0 L10 0");
        assert_eq!(json["color"], "red");
        assert_eq!(json["strokeWidth"], 3.0);
        assert_eq!(json["isEraser"], false);
        assert_eq!(json["toolMode"], "normal");
    }
}
