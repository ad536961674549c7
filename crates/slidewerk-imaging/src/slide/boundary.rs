// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Boundary extraction — the largest external contour of the foreground mask,
// reduced to its minimum-area rotated rectangle, plus canonical corner
// labelling.

use imageproc::contours::{BorderType, find_contours};
use imageproc::geometry::min_area_rect;
use imageproc::point::Point;
use tracing::debug;

use super::mask::ForegroundMask;

/// A corner point in image coordinates (x right, y down).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub x: f64,
    pub y: f64,
}

impl Vertex {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Vertex) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    fn as_f32(&self) -> (f32, f32) {
        (self.x as f32, self.y as f32)
    }
}

impl From<Point<i32>> for Vertex {
    fn from(p: Point<i32>) -> Self {
        Self::new(p.x as f64, p.y as f64)
    }
}

/// The rotated rectangle enclosing the largest foreground contour.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundaryCandidate {
    /// Corners in the order the rectangle fit produced them (consecutive
    /// around the perimeter, no orientation guarantee).
    pub corners: [Vertex; 4],
    /// Length of the side from `corners[0]` to `corners[1]`.
    pub width: f64,
    /// Length of the side from `corners[1]` to `corners[2]`.
    pub height: f64,
    /// Direction of the `corners[0] -> corners[1]` side, in degrees.
    pub angle_degrees: f64,
}

impl BoundaryCandidate {
    fn from_corners(corners: [Vertex; 4]) -> Self {
        let width = corners[0].distance(&corners[1]);
        let height = corners[1].distance(&corners[2]);
        let angle_degrees = (corners[1].y - corners[0].y)
            .atan2(corners[1].x - corners[0].x)
            .to_degrees();
        Self {
            corners,
            width,
            height,
            angle_degrees,
        }
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Label the corners TL/TR/BR/BL.
    pub fn ordered(&self) -> OrderedQuad {
        resolve_orientation(&self.corners)
    }
}

/// Four corners labelled by [`resolve_orientation`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrderedQuad {
    pub top_left: Vertex,
    pub top_right: Vertex,
    pub bottom_right: Vertex,
    pub bottom_left: Vertex,
}

impl OrderedQuad {
    /// Corners as `[TL, TR, BR, BL]`.
    pub fn corners(&self) -> [Vertex; 4] {
        [
            self.top_left,
            self.top_right,
            self.bottom_right,
            self.bottom_left,
        ]
    }

    pub(crate) fn control_points(&self) -> [(f32, f32); 4] {
        self.corners().map(|v| v.as_f32())
    }
}

/// Find the largest external contour of `mask` and fit its rotated rectangle.
///
/// Returns `None` when the mask has no foreground, or only degenerate
/// (zero-area) contours.
pub fn extract_boundary(mask: &ForegroundMask) -> Option<BoundaryCandidate> {
    let contours = find_contours::<i32>(mask.as_gray());

    let mut largest: Option<BoundaryCandidate> = None;
    let mut external = 0usize;
    for contour in contours
        .iter()
        .filter(|c| c.parent.is_none() && matches!(c.border_type, BorderType::Outer))
    {
        external += 1;
        if contour.points.is_empty() {
            continue;
        }
        let rect = min_area_rect(&contour.points);
        let candidate = BoundaryCandidate::from_corners(rect.map(Vertex::from));

        let area = candidate.area();
        if area > largest.map_or(0.0, |best| best.area()) {
            largest = Some(candidate);
        }
    }

    debug!(
        external_contours = external,
        found = largest.is_some(),
        "Boundary extraction complete"
    );
    largest
}

/// Label four unordered corner points as TL, TR, BR, BL.
///
/// With `sum = x + y` and `diff = y - x`: TL has the smallest sum, BR the
/// largest, TR the smallest diff and BL the largest. The points are first
/// sorted by (x, y) and ties go to the earliest, so the labelling depends
/// only on the point set.
///
/// Only reliable for near-axis-aligned quads; at 45 degrees two labels can
/// land on the same point.
pub fn resolve_orientation(points: &[Vertex; 4]) -> OrderedQuad {
    let mut sorted = *points;
    sorted.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));

    let sum = |v: &Vertex| v.x + v.y;
    let diff = |v: &Vertex| v.y - v.x;

    OrderedQuad {
        top_left: pick(&sorted, sum, Extreme::Min),
        top_right: pick(&sorted, diff, Extreme::Min),
        bottom_right: pick(&sorted, sum, Extreme::Max),
        bottom_left: pick(&sorted, diff, Extreme::Max),
    }
}

#[derive(Clone, Copy)]
enum Extreme {
    Min,
    Max,
}

fn pick(points: &[Vertex; 4], key: impl Fn(&Vertex) -> f64, extreme: Extreme) -> Vertex {
    let mut best = points[0];
    for p in &points[1..] {
        let better = match extreme {
            Extreme::Min => key(p) < key(&best),
            Extreme::Max => key(p) > key(&best),
        };
        if better {
            best = *p;
        }
    }
    best
}
