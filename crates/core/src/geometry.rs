//! Line geometry in image-pixel space
//!
//! Pure functions over points and segments: lengths (straight and curved),
//! direction and corner angles, curve detection and bump-out classification.
//! Nothing in here knows about pins, ids or calibration.

/// Lengths below this are treated as zero (coincident points).
pub const EPSILON: f64 = 1e-9;

/// A 2D point in image-pixel space
///
/// Image convention: origin at the top-left, X to the right, Y downward.
#[derive(Debug, Clone, Copy, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Create a new point
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Calculate distance to another point
    pub fn distance_to(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Midpoint between this point and another
    pub fn midpoint(&self, other: &Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Point::new(x, y)
    }
}

/// A straight segment between two resolved points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: Point,
    pub end: Point,
}

impl Segment {
    pub fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    /// Direction vector from start to end
    pub fn direction(&self) -> (f64, f64) {
        (self.end.x - self.start.x, self.end.y - self.start.y)
    }

    /// Chord length
    pub fn length(&self) -> f64 {
        self.start.distance_to(&self.end)
    }
}

/// Total length of a polyline (sum of consecutive distances)
pub fn polyline_length(points: &[Point]) -> f64 {
    points.windows(2).map(|w| w[0].distance_to(&w[1])).sum()
}

/// Length of an edge from `start` to `end`
///
/// With no `curve_points` this is the straight chord; otherwise it is the arc
/// length of the polyline `start -> curve_points... -> end`.
pub fn segment_length(start: Point, end: Point, curve_points: &[Point]) -> f64 {
    if curve_points.is_empty() {
        return start.distance_to(&end);
    }

    let mut length = start.distance_to(&curve_points[0]);
    length += polyline_length(curve_points);
    if let Some(last) = curve_points.last() {
        length += last.distance_to(&end);
    }
    length
}

/// Direction of a segment in degrees, `atan2(dy, dx)`, in (-180, 180]
///
/// Returns `None` for a zero-length segment.
pub fn segment_angle(start: Point, end: Point) -> Option<f64> {
    let dx = end.x - start.x;
    let dy = end.y - start.y;
    if dx.abs() < EPSILON && dy.abs() < EPSILON {
        return None;
    }
    Some(dy.atan2(dx).to_degrees())
}

/// Angle in degrees at `corner` between the rays towards `a` and `b`
///
/// Uses `acos((v1 . v2) / (|v1| |v2|))`, so the result is in [0, 180].
/// Returns `None` if either ray has zero length.
pub fn corner_angle(corner: Point, a: Point, b: Point) -> Option<f64> {
    let v1 = (a.x - corner.x, a.y - corner.y);
    let v2 = (b.x - corner.x, b.y - corner.y);
    angle_between(v1, v2)
}

/// Unsigned angle between two direction vectors in degrees, [0, 180]
pub fn angle_between(v1: (f64, f64), v2: (f64, f64)) -> Option<f64> {
    let mag1 = (v1.0 * v1.0 + v1.1 * v1.1).sqrt();
    let mag2 = (v2.0 * v2.0 + v2.1 * v2.1).sqrt();

    if mag1 < EPSILON || mag2 < EPSILON {
        return None;
    }

    let cos_angle = (v1.0 * v2.0 + v1.1 * v2.1) / (mag1 * mag2);
    // Clamp for numerical stability
    Some(cos_angle.clamp(-1.0, 1.0).acos().to_degrees())
}

/// Perpendicular distance from `point` to the infinite line through `start` and `end`
///
/// Falls back to the point distance when the line is degenerate.
pub fn perpendicular_distance(point: Point, start: Point, end: Point) -> f64 {
    let dx = end.x - start.x;
    let dy = end.y - start.y;
    let length = (dx * dx + dy * dy).sqrt();

    if length < EPSILON {
        return point.distance_to(&start);
    }

    let cross = (point.x - start.x) * dy - (point.y - start.y) * dx;
    cross.abs() / length
}

/// Largest perpendicular deviation of the interior points from the chord
/// between the first and last point
pub fn max_chord_deviation(points: &[Point]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let first = points[0];
    let last = points[points.len() - 1];

    points[1..points.len() - 1]
        .iter()
        .map(|p| perpendicular_distance(*p, first, last))
        .fold(0.0, f64::max)
}

/// Whether a traced path bends enough to be treated as a curve
///
/// True when the maximum deviation of the interior points from the chord
/// exceeds `deviation_ratio` of the chord length. Needs at least 3 points.
pub fn is_curve(points: &[Point], deviation_ratio: f64) -> bool {
    if points.len() < 3 {
        return false;
    }

    let chord = points[0].distance_to(&points[points.len() - 1]);
    if chord < EPSILON {
        return false;
    }

    max_chord_deviation(points) > chord * deviation_ratio
}

/// Whether `candidate` runs roughly perpendicular to one of the two most
/// recent segments in `existing`
///
/// "Roughly" means the angle between the direction vectors lies within
/// `tolerance_deg` of 90 degrees, inclusive.
pub fn is_bump_out(existing: &[Segment], candidate: Segment, tolerance_deg: f64) -> bool {
    let recent = &existing[existing.len().saturating_sub(2)..];

    recent.iter().any(|segment| {
        angle_between(segment.direction(), candidate.direction())
            .map(|angle| (angle - 90.0).abs() <= tolerance_deg)
            .unwrap_or(false)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    #[test]
    fn test_distance_and_midpoint() {
        assert_eq!(p(0.0, 0.0).distance_to(&p(3.0, 4.0)), 5.0);
        assert_eq!(p(0.0, 0.0).midpoint(&p(10.0, 20.0)), p(5.0, 10.0));
    }

    #[test]
    fn test_segment_length_straight() {
        assert_eq!(segment_length(p(0.0, 0.0), p(100.0, 0.0), &[]), 100.0);
    }

    #[test]
    fn test_segment_length_curved_uses_arc() {
        // Chord is 100, path goes up 50 and back down
        let length = segment_length(p(0.0, 0.0), p(100.0, 0.0), &[p(50.0, 50.0)]);
        let expected = 2.0 * (50.0f64 * 50.0 + 50.0 * 50.0).sqrt();
        assert!((length - expected).abs() < 1e-9);
        assert!(length > 100.0);
    }

    #[test]
    fn test_segment_angle() {
        assert_eq!(segment_angle(p(0.0, 0.0), p(10.0, 0.0)), Some(0.0));
        assert!(
            (segment_angle(p(0.0, 0.0), p(0.0, 10.0)).unwrap() - 90.0).abs() < 1e-9
        );
        assert!(
            (segment_angle(p(0.0, 0.0), p(-10.0, 0.0)).unwrap() - 180.0).abs() < 1e-9
        );
        assert_eq!(segment_angle(p(5.0, 5.0), p(5.0, 5.0)), None);
    }

    #[test]
    fn test_corner_angle() {
        let angle = corner_angle(p(100.0, 0.0), p(0.0, 0.0), p(100.0, 100.0)).unwrap();
        assert!((angle - 90.0).abs() < 1e-9);

        let straight = corner_angle(p(50.0, 0.0), p(0.0, 0.0), p(100.0, 0.0)).unwrap();
        assert!((straight - 180.0).abs() < 1e-9);

        assert_eq!(corner_angle(p(0.0, 0.0), p(0.0, 0.0), p(1.0, 0.0)), None);
    }

    #[test]
    fn test_perpendicular_distance() {
        assert_eq!(
            perpendicular_distance(p(5.0, 3.0), p(0.0, 0.0), p(10.0, 0.0)),
            3.0
        );
        // Degenerate line falls back to point distance
        assert_eq!(
            perpendicular_distance(p(3.0, 4.0), p(0.0, 0.0), p(0.0, 0.0)),
            5.0
        );
    }

    #[test]
    fn test_is_curve_threshold() {
        // 10% of a 100px chord is 10px
        let slight = [p(0.0, 0.0), p(50.0, 9.0), p(100.0, 0.0)];
        let bent = [p(0.0, 0.0), p(50.0, 11.0), p(100.0, 0.0)];
        assert!(!is_curve(&slight, 0.10));
        assert!(is_curve(&bent, 0.10));
    }

    #[test]
    fn test_is_curve_needs_three_points() {
        assert!(!is_curve(&[p(0.0, 0.0), p(100.0, 0.0)], 0.10));
        assert!(!is_curve(&[], 0.10));
        // Closed loop has no chord to measure against
        assert!(!is_curve(&[p(0.0, 0.0), p(50.0, 50.0), p(0.0, 0.0)], 0.10));
    }

    #[test]
    fn test_is_bump_out() {
        let existing = vec![
            Segment::new(p(0.0, 0.0), p(100.0, 0.0)),
            Segment::new(p(100.0, 0.0), p(200.0, 0.0)),
        ];

        let perpendicular = Segment::new(p(200.0, 0.0), p(200.0, 50.0));
        assert!(is_bump_out(&existing, perpendicular, 10.0));

        // 85 degrees still counts
        let lean = 50.0 * 5f64.to_radians().tan();
        let tilted = Segment::new(p(200.0, 0.0), p(200.0 + lean, 50.0));
        assert!(is_bump_out(&existing, tilted, 10.0));

        let extension = Segment::new(p(200.0, 0.0), p(300.0, 5.0));
        assert!(!is_bump_out(&existing, extension, 10.0));
    }

    #[test]
    fn test_is_bump_out_only_considers_two_most_recent() {
        let existing = vec![
            Segment::new(p(0.0, 0.0), p(0.0, 100.0)),
            Segment::new(p(0.0, 100.0), p(50.0, 150.0)),
            Segment::new(p(50.0, 150.0), p(100.0, 200.0)),
        ];
        // Perpendicular only to the first (vertical) segment
        let candidate = Segment::new(p(100.0, 200.0), p(200.0, 200.0));
        assert!(!is_bump_out(&existing, candidate, 10.0));
        assert!(!is_bump_out(&[], candidate, 10.0));
    }
}
