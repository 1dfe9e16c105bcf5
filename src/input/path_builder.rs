//! Incremental stroke geometry with gap interpolation.

use crate::draw::{Path, Point};

/// Gaps longer than this are filled with interpolated points.
pub const SMOOTHING_THRESHOLD: f64 = 5.0;
/// Target spacing between interpolated points.
pub const INTERPOLATION_STEP: f64 = 3.0;
/// Upper bound on points inserted for a single sample.
pub const MAX_INTERPOLATED_POINTS: usize = 256;

/// Grows the geometry of an in-progress stroke.
///
/// Fast pointer motion delivers sparse samples; long gaps are split into
/// evenly spaced points so the rendered line stays smooth. The last
/// interpolated point is always the sample itself.
#[derive(Debug, Clone, PartialEq)]
pub struct PathBuilder {
    path: Path,
    last_point: Point,
}

impl PathBuilder {
    /// Starts new geometry seeded at `start`.
    pub fn new(start: Point) -> Self {
        let mut path = Path::new();
        path.push_point(start);
        Self {
            path,
            last_point: start,
        }
    }

    /// Appends a pointer sample. Non-finite samples are dropped.
    pub fn push(&mut self, point: Point) {
        if !point.is_finite() {
            return;
        }
        let distance = self.last_point.distance(point);
        if distance > SMOOTHING_THRESHOLD {
            let steps =
                ((distance / INTERPOLATION_STEP).ceil() as usize).min(MAX_INTERPOLATED_POINTS);
            for step in 1..steps {
                let t = step as f64 / steps as f64;
                self.path.push_point(self.last_point.lerp(point, t));
            }
        }
        self.path.push_point(point);
        self.last_point = point;
    }

    /// Geometry so far, for live preview.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn last_point(&self) -> Point {
        self.last_point
    }

    pub fn into_path(self) -> Path {
        self.path
    }
}
