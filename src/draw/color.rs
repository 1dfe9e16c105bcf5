//! RGBA color type, predefined palette, and the textual color tokens used on the wire.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Represents an RGBA color with floating-point components.
///
/// All components are in the range 0.0 (minimum) to 1.0 (maximum).
///
/// Colors serialize as tokens: a palette name when the color matches one
/// exactly, otherwise `#rrggbb` (or `#rrggbbaa` when not fully opaque).
///
/// # Examples
///
/// ```
/// use inkboard::draw::Color;
/// let red: Color = "red".parse().unwrap();
/// assert_eq!(red, inkboard::draw::RED);
/// assert_eq!(Color::new(0.0, 0.0, 1.0, 1.0).to_token(), "blue");
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red component (0.0 = no red, 1.0 = full red)
    pub r: f64,
    /// Green component (0.0 = no green, 1.0 = full green)
    pub g: f64,
    /// Blue component (0.0 = no blue, 1.0 = full blue)
    pub b: f64,
    /// Alpha/transparency (0.0 = fully transparent, 1.0 = fully opaque)
    pub a: f64,
}

impl Color {
    /// Creates a new color from RGBA components.
    pub const fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// Builds an opaque color from 0-255 channel values.
    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::new(r as f64 / 255.0, g as f64 / 255.0, b as f64 / 255.0, 1.0)
    }

    /// Looks up a palette color by name, ignoring case.
    pub fn from_name(name: &str) -> Option<Self> {
        PALETTE
            .iter()
            .find(|(candidate, _)| candidate.eq_ignore_ascii_case(name))
            .map(|(_, color)| *color)
    }

    /// Palette name of this color, if it is exactly one of the predefined colors.
    pub fn name(&self) -> Option<&'static str> {
        PALETTE
            .iter()
            .find(|(_, candidate)| candidate == self)
            .map(|(name, _)| *name)
    }

    /// Returns the token used in persisted stroke lists.
    pub fn to_token(&self) -> String {
        if let Some(name) = self.name() {
            return name.to_string();
        }

        let [r, g, b, a] = [self.r, self.g, self.b, self.a].map(channel_to_u8);
        if a == 255 {
            format!("#{r:02x}{g:02x}{b:02x}")
        } else {
            format!("#{r:02x}{g:02x}{b:02x}{a:02x}")
        }
    }

    /// Snaps every channel to the 8-bit grid used by wire tokens.
    ///
    /// Stored colors are quantized so a token round trip reproduces them exactly.
    pub fn quantized(self) -> Self {
        let [r, g, b, a] = [self.r, self.g, self.b, self.a].map(channel_to_u8);
        Self::new(
            r as f64 / 255.0,
            g as f64 / 255.0,
            b as f64 / 255.0,
            a as f64 / 255.0,
        )
    }

    /// Same color with its alpha multiplied by `opacity`.
    pub fn with_opacity(self, opacity: f64) -> Self {
        Self {
            a: self.a * opacity.clamp(0.0, 1.0),
            ..self
        }
    }
}

/// Error returned when a color token cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseColorError(pub String);

impl fmt::Display for ParseColorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unrecognised color token '{}'", self.0)
    }
}

impl std::error::Error for ParseColorError {}

impl FromStr for Color {
    type Err = ParseColorError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let token = raw.trim();
        if let Some(color) = Self::from_name(token) {
            return Ok(color);
        }

        let hex = token
            .strip_prefix('#')
            .ok_or_else(|| ParseColorError(raw.to_string()))?;
        if !hex.is_ascii() {
            return Err(ParseColorError(raw.to_string()));
        }

        let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| ParseColorError(raw.to_string()));
        let short = |c: &str| channel(c).map(|v| v * 17);

        let (r, g, b, a) = match hex.len() {
            3 => (short(&hex[0..1])?, short(&hex[1..2])?, short(&hex[2..3])?, 255),
            6 => (channel(&hex[0..2])?, channel(&hex[2..4])?, channel(&hex[4..6])?, 255),
            8 => (
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
                channel(&hex[6..8])?,
            ),
            _ => return Err(ParseColorError(raw.to_string())),
        };

        Ok(Self::new(
            r as f64 / 255.0,
            g as f64 / 255.0,
            b as f64 / 255.0,
            a as f64 / 255.0,
        ))
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_token())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let token = String::deserialize(deserializer)?;
        token.parse().map_err(serde::de::Error::custom)
    }
}

fn channel_to_u8(value: f64) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

// ============================================================================
// Predefined Color Constants
// ============================================================================

/// Predefined red color (R=1.0, G=0.0, B=0.0)
pub const RED: Color = Color::new(1.0, 0.0, 0.0, 1.0);

/// Predefined green color (R=0.0, G=1.0, B=0.0)
pub const GREEN: Color = Color::new(0.0, 1.0, 0.0, 1.0);

/// Predefined blue color (R=0.0, G=0.0, B=1.0)
pub const BLUE: Color = Color::new(0.0, 0.0, 1.0, 1.0);

/// Predefined yellow color (R=1.0, G=1.0, B=0.0)
pub const YELLOW: Color = Color::new(1.0, 1.0, 0.0, 1.0);

/// Predefined orange color (R=1.0, G=128/255, B=0.0)
pub const ORANGE: Color = Color::new(1.0, 128.0 / 255.0, 0.0, 1.0);

/// Predefined pink/magenta color (R=1.0, G=0.0, B=1.0)
pub const PINK: Color = Color::new(1.0, 0.0, 1.0, 1.0);

/// Predefined white color (R=1.0, G=1.0, B=1.0)
pub const WHITE: Color = Color::new(1.0, 1.0, 1.0, 1.0);

/// Predefined black color (R=0.0, G=0.0, B=0.0)
pub const BLACK: Color = Color::new(0.0, 0.0, 0.0, 1.0);

/// Fully transparent color
pub const TRANSPARENT: Color = Color::new(0.0, 0.0, 0.0, 0.0);

pub(crate) const PALETTE: [(&str, Color); 9] = [
    ("red", RED),
    ("green", GREEN),
    ("blue", BLUE),
    ("yellow", YELLOW),
    ("orange", ORANGE),
    ("pink", PINK),
    ("white", WHITE),
    ("black", BLACK),
    ("transparent", TRANSPARENT),
];
