//! Stroke geometry: points, move-to/line-to segments, and the compact path syntax.
//!
//! Internally a [`Path`] is an ordered list of [`Segment`]s. On the wire it is
//! written as an SVG-style string (`"M0 0 L1 1"`) because the report renderer
//! that consumes persisted boards expects that syntax.

use kurbo::{BezPath, PathEl};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{self, Write as _};
use std::str::FromStr;

/// A point in board coordinates.
pub use kurbo::Point;

/// One path command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Segment {
    MoveTo(Point),
    LineTo(Point),
}

impl Segment {
    pub fn point(&self) -> Point {
        match self {
            Segment::MoveTo(p) | Segment::LineTo(p) => *p,
        }
    }
}

/// Ordered move-to/line-to geometry of a stroke.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Path {
    segments: Vec<Segment>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a single polyline starting with a move-to at the first point.
    pub fn from_points(points: &[Point]) -> Self {
        let mut path = Self::new();
        for &point in points {
            path.push_point(point);
        }
        path
    }

    /// Appends a point: a move-to if the path is empty, otherwise a line-to.
    pub fn push_point(&mut self, point: Point) {
        if self.segments.is_empty() {
            self.segments.push(Segment::MoveTo(point));
        } else {
            self.segments.push(Segment::LineTo(point));
        }
    }

    pub fn push(&mut self, segment: Segment) {
        self.segments.push(segment);
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn last_point(&self) -> Option<Point> {
        self.segments.last().map(Segment::point)
    }

    pub fn points(&self) -> impl Iterator<Item = Point> + '_ {
        self.segments.iter().map(Segment::point)
    }

    /// Encodes the path in the compact `M x y L x y` syntax.
    pub fn to_svg(&self) -> String {
        let mut out = String::with_capacity(self.segments.len() * 12);
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                out.push(' ');
            }
            let (cmd, p) = match segment {
                Segment::MoveTo(p) => ('M', p),
                Segment::LineTo(p) => ('L', p),
            };
            // Writing into a String cannot fail.
            let _ = write!(out, "{cmd}{} {}", p.x, p.y);
        }
        out
    }
}

/// Error produced when a path string is malformed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsePathError {
    pub message: String,
}

impl fmt::Display for ParsePathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid path data: {}", self.message)
    }
}

impl std::error::Error for ParsePathError {}

impl FromStr for Path {
    type Err = ParsePathError;

    /// Parses SVG path data made of move-to and line-to commands. Curves and
    /// close-path commands are rejected; lowercase commands are relative.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let err = |message: String| ParsePathError { message };
        let data = raw.trim();
        if data.is_empty() {
            return Err(err("path is empty".into()));
        }
        if !data.starts_with(['M', 'm']) {
            return Err(err("path must start with a move-to".into()));
        }

        let bez = BezPath::from_svg(data).map_err(|e| err(e.to_string()))?;
        let mut path = Path::new();
        for el in bez.elements() {
            let segment = match *el {
                PathEl::MoveTo(p) => Segment::MoveTo(p),
                PathEl::LineTo(p) if !path.is_empty() => Segment::LineTo(p),
                PathEl::LineTo(_) => return Err(err("path must start with a move-to".into())),
                other => return Err(err(format!("unsupported path element {other:?}"))),
            };
            let point = segment.point();
            if !point.x.is_finite() || !point.y.is_finite() {
                return Err(err("non-finite coordinate".into()));
            }
            path.push(segment);
        }

        if path.is_empty() {
            return Err(err("path is empty".into()));
        }
        Ok(path)
    }
}

impl Serialize for Path {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_svg())
    }
}

impl<'de> Deserialize<'de> for Path {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_move_then_lines() {
        let path = Path::from_points(&[Point::new(0.0, 0.0), Point::new(1.0, 1.0), Point::new(2.5, -3.0)]);
        assert_eq!(path.to_svg(), "M0 0 L1 1 L2.5 -3");
    }

    #[test]
    fn parses_canonical_form() {
        let path: Path = "M0 0 L1 1".parse().unwrap();
        assert_eq!(
            path.segments(),
            &[
                Segment::MoveTo(Point::new(0.0, 0.0)),
                Segment::LineTo(Point::new(1.0, 1.0))
            ]
        );
    }

    #[test]
    fn parses_commas_relative_and_implicit_lines() {
        let path: Path = "m10,20 30,40 L 5 6".parse().unwrap();
        assert_eq!(path.len(), 3);
        assert_eq!(path.segments()[1], Segment::LineTo(Point::new(40.0, 60.0)));
        assert_eq!(path.last_point(), Some(Point::new(5.0, 6.0)));
    }

    #[test]
    fn parses_negatives_without_separators() {
        let path: Path = "M-1.5 2 L-3-4".parse().unwrap();
        assert_eq!(path.segments()[0].point(), Point::new(-1.5, 2.0));
        assert_eq!(path.segments()[1].point(), Point::new(-3.0, -4.0));
    }

    #[test]
    fn rejects_malformed_input() {
        assert!("".parse::<Path>().is_err());
        assert!("L1 1".parse::<Path>().is_err());
        assert!("M0".parse::<Path>().is_err());
        assert!("M0 0 Q1 1 2 2".parse::<Path>().is_err());
        assert!("M0 0 L1 1 Z".parse::<Path>().is_err());
        assert!("M0 0 Lx y".parse::<Path>().is_err());
    }

    #[test]
    fn svg_round_trip_preserves_fractional_points() {
        let path = Path::from_points(&[Point::new(0.1, 0.2), Point::new(1.0 / 3.0, 2.0 / 3.0)]);
        let back: Path = path.to_svg().parse().unwrap();
        assert_eq!(back, path);
    }
}
