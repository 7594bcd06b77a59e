//! Polygon metrics over closed shapes
//!
//! Area, perimeter and length/width of the shape formed by the pin graph.
//! Everything is computed in pixel space first; `Metrics` converts the pixel
//! figures into physical units with a calibration.

use crate::calibration::{Calibration, Unit};
use crate::geometry::Point;
use crate::model::{Cycle, PinGraph};

/// Shape formed by the current pins and lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ShapeKind {
    /// Closed, exactly 4 pins and 4 lines
    Rectangle,
    /// Closed, 3 or more pins
    Polygon,
    /// Anything not closed, including empty
    OpenPolyline,
}

impl ShapeKind {
    pub fn is_closed(self) -> bool {
        !matches!(self, ShapeKind::OpenPolyline)
    }
}

/// Shape classification plus the ordered cycle when closed
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeAnalysis {
    pub kind: ShapeKind,
    pub cycle: Option<Cycle>,
}

impl ShapeAnalysis {
    /// Classify the graph
    pub fn of(graph: &PinGraph) -> Self {
        match graph.closed_cycle() {
            Some(cycle) if cycle.pins.len() == 4 => Self {
                kind: ShapeKind::Rectangle,
                cycle: Some(cycle),
            },
            Some(cycle) => Self {
                kind: ShapeKind::Polygon,
                cycle: Some(cycle),
            },
            None => Self {
                kind: ShapeKind::OpenPolyline,
                cycle: None,
            },
        }
    }
}

/// Signed shoelace sum / 2 over vertices in order
///
/// Positive for counter-clockwise order in a Y-up frame.
pub fn signed_area(points: &[Point]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        sum += points[i].x * points[j].y;
        sum -= points[j].x * points[i].y;
    }
    sum / 2.0
}

/// Polygon area by the shoelace formula, vertices in connection order
pub fn area(points: &[Point]) -> f64 {
    signed_area(points).abs()
}

/// Sum of edge lengths
pub fn perimeter(edge_lengths: &[f64]) -> f64 {
    edge_lengths.iter().sum()
}

/// Axis-aligned extent: `(max(x) - min(x), max(y) - min(y))`
pub fn bounding_length_width(points: &[Point]) -> (f64, f64) {
    let Some(first) = points.first() else {
        return (0.0, 0.0);
    };
    let (mut min_x, mut max_x, mut min_y, mut max_y) = (first.x, first.x, first.y, first.y);
    for point in points.iter().skip(1) {
        min_x = min_x.min(point.x);
        max_x = max_x.max(point.x);
        min_y = min_y.min(point.y);
        max_y = max_y.max(point.y);
    }
    (max_x - min_x, max_y - min_y)
}

/// Relative gap below which two edge lengths count as the same side
pub const DISTINCT_EDGE_TOLERANCE: f64 = 0.05;

/// The longest edge and the longest edge distinct from it
///
/// Edges within `DISTINCT_EDGE_TOLERANCE` of the longest are the same side,
/// so jittered taps on a rectangle still give its two sides. When every edge
/// is the same side (a square), the shortest edge is the width. `None` with
/// fewer than two edges.
pub fn longest_distinct_pair(lengths: &[f64]) -> Option<(f64, f64)> {
    let mut sorted: Vec<f64> = lengths.iter().copied().filter(|l| l.is_finite()).collect();
    sorted.sort_by(|a, b| b.total_cmp(a));

    let (&longest, rest) = sorted.split_first()?;
    let shortest = *rest.last()?;
    let width = rest
        .iter()
        .copied()
        .find(|l| longest - l > longest * DISTINCT_EDGE_TOLERANCE)
        .unwrap_or(shortest);
    Some((longest, width))
}

/// Length and width of a four-sided shape from its edge lengths
///
/// Unlike a bounding box this does not grow when the shape is rotated.
pub fn rectangle_length_width(edges: [f64; 4]) -> (f64, f64) {
    longest_distinct_pair(&edges).unwrap_or((0.0, 0.0))
}

/// The two dimensions validation looks at, from every line in the graph
pub fn edge_dimensions(graph: &PinGraph) -> Option<(f64, f64)> {
    let lengths: Vec<f64> = graph.lines().iter().map(|l| l.length).collect();
    longest_distinct_pair(&lengths)
}

/// Shape measurements in pixel units
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PixelMeasurements {
    pub perimeter: Option<f64>,
    pub area: Option<f64>,
    pub length: Option<f64>,
    pub width: Option<f64>,
    pub path_length: Option<f64>,
}

impl PixelMeasurements {
    /// Measure the graph given its shape analysis
    ///
    /// Closed-shape figures stay `None` for open shapes; that is a normal
    /// intermediate state, not an error.
    pub fn measure(graph: &PinGraph, shape: &ShapeAnalysis) -> Self {
        let path_length = if graph.lines().is_empty() {
            None
        } else {
            Some(graph.lines().iter().map(|l| l.length).sum())
        };

        let Some(cycle) = &shape.cycle else {
            return Self {
                path_length,
                ..Default::default()
            };
        };

        let points: Vec<Point> = cycle
            .pins
            .iter()
            .filter_map(|id| graph.position(*id).ok())
            .collect();
        let edges: Vec<f64> = cycle
            .lines
            .iter()
            .filter_map(|id| graph.line(*id))
            .map(|l| l.length)
            .collect();

        let (length, width) = match (shape.kind, <[f64; 4]>::try_from(edges.as_slice())) {
            (ShapeKind::Rectangle, Ok(four)) => rectangle_length_width(four),
            _ => bounding_length_width(&points),
        };

        Self {
            perimeter: Some(perimeter(&edges)),
            area: Some(area(&points)),
            length: Some(length),
            width: Some(width),
            path_length,
        }
    }
}

/// Shape measurements in a physical unit
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Metrics {
    pub shape: ShapeKind,
    pub unit: Unit,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub perimeter: Option<f64>,
    /// Square `unit`
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub area: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub length: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub width: Option<f64>,
    /// Summed length of every line, present once a line exists
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub path_length: Option<f64>,
}

impl Metrics {
    /// Convert pixel measurements with a calibration
    pub fn from_pixels(
        pixels: &PixelMeasurements,
        shape: ShapeKind,
        calibration: &Calibration,
        unit: Unit,
    ) -> Self {
        let length = |px: f64| calibration.length_in(px, unit);
        Self {
            shape,
            unit,
            perimeter: pixels.perimeter.map(length),
            area: pixels.area.map(|px| calibration.area_in(px, unit)),
            length: pixels.length.map(length),
            width: pixels.width.map(length),
            path_length: pixels.path_length.map(length),
        }
    }

    /// Pixel measurements reported as-is (unit is nominal)
    pub fn raw_pixels(pixels: &PixelMeasurements, shape: ShapeKind) -> Self {
        Self {
            shape,
            unit: Unit::default(),
            perimeter: pixels.perimeter,
            area: pixels.area,
            length: pixels.length,
            width: pixels.width,
            path_length: pixels.path_length,
        }
    }
}
