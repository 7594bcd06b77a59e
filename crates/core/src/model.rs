//! Pin/line graph model
//!
//! Pins are points on the photo; lines connect two pins. Every line's
//! `length` and `angle` are derived from pin coordinates and recomputed by the
//! graph after each mutation, so they can never drift from the geometry.
//! All coordinates are stored in image-pixel space.

use crate::error::{MeasureError, MeasureResult};
use crate::geometry::{self, Point, Segment};
use std::collections::HashSet;

/// Unique identifier for a pin
///
/// Stable across moves. Generated using UUID v4.
pub type PinId = uuid::Uuid;

/// Unique identifier for a line
pub type LineId = uuid::Uuid;

/// A user-placed point on the photo
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Pin {
    pub id: PinId,
    pub x: f64,
    pub y: f64,
}

impl Pin {
    /// Create a pin with a fresh id
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            id: PinId::new_v4(),
            x,
            y,
        }
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// A measured edge between two pins
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Line {
    pub id: LineId,
    pub start_pin_id: PinId,
    pub end_pin_id: PinId,

    /// Intermediate points of a curved edge (empty for a straight edge)
    #[serde(default)]
    pub curve_points: Vec<Point>,

    /// Roughly perpendicular to one of the two lines added before it
    #[serde(default)]
    pub is_bump_out: bool,

    /// Pixel length (arc length when curved). Derived.
    #[serde(default)]
    pub length: f64,

    /// Corner angle in degrees against the line ending at this line's start pin. Derived.
    #[serde(default)]
    pub angle: Option<f64>,
}

impl Line {
    fn new(start_pin_id: PinId, end_pin_id: PinId, curve_points: Vec<Point>) -> Self {
        Self {
            id: LineId::new_v4(),
            start_pin_id,
            end_pin_id,
            curve_points,
            is_bump_out: false,
            length: 0.0,
            angle: None,
        }
    }

    pub fn is_curved(&self) -> bool {
        !self.curve_points.is_empty()
    }

    /// Whether this line has `pin_id` as either endpoint
    pub fn touches(&self, pin_id: PinId) -> bool {
        self.start_pin_id == pin_id || self.end_pin_id == pin_id
    }

    /// The endpoint opposite `pin_id`, if `pin_id` is an endpoint
    pub fn other_end(&self, pin_id: PinId) -> Option<PinId> {
        if self.start_pin_id == pin_id {
            Some(self.end_pin_id)
        } else if self.end_pin_id == pin_id {
            Some(self.start_pin_id)
        } else {
            None
        }
    }

    /// Whether both lines join the same pair of pins (in either direction)
    fn same_pair(&self, a: PinId, b: PinId) -> bool {
        (self.start_pin_id == a && self.end_pin_id == b)
            || (self.start_pin_id == b && self.end_pin_id == a)
    }
}

/// Options for creating a line
#[derive(Debug, Clone, Default)]
pub struct ConnectOptions {
    /// Intermediate points for a curved edge
    pub curve_points: Vec<Point>,
}

impl ConnectOptions {
    pub fn curved(curve_points: Vec<Point>) -> Self {
        Self { curve_points }
    }
}

/// Ordered closed cycle through the graph
///
/// `lines[i]` joins `pins[i]` and `pins[(i + 1) % n]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Cycle {
    pub pins: Vec<PinId>,
    pub lines: Vec<LineId>,
}

/// Immutable copy of the graph, used for history and host-side persistence
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Snapshot {
    pub pins: Vec<Pin>,
    pub lines: Vec<Line>,
}

impl Snapshot {
    /// Serialize to JSON
    pub fn to_json(&self) -> MeasureResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| MeasureError::InvalidSnapshot(e.to_string()))
    }

    /// Deserialize from JSON (structure only; integrity is checked on restore)
    pub fn from_json(json: &str) -> MeasureResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| MeasureError::InvalidSnapshot(e.to_string()))
    }
}

/// Pins and the lines connecting them, in insertion order
#[derive(Debug, Clone)]
pub struct PinGraph {
    pins: Vec<Pin>,
    lines: Vec<Line>,
    /// Tolerance around 90 degrees for bump-out classification
    bump_out_tolerance_deg: f64,
}

impl Default for PinGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl PinGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self {
            pins: Vec::new(),
            lines: Vec::new(),
            bump_out_tolerance_deg: 10.0,
        }
    }

    /// Set the bump-out tolerance used for lines connected from now on
    pub fn with_bump_out_tolerance(mut self, tolerance_deg: f64) -> Self {
        self.bump_out_tolerance_deg = tolerance_deg;
        self
    }

    pub fn pins(&self) -> &[Pin] {
        &self.pins
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn pin(&self, id: PinId) -> Option<&Pin> {
        self.pins.iter().find(|p| p.id == id)
    }

    pub fn line(&self, id: LineId) -> Option<&Line> {
        self.lines.iter().find(|l| l.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.pins.is_empty()
    }

    /// Resolve a pin's position
    pub fn position(&self, id: PinId) -> MeasureResult<Point> {
        self.pin(id)
            .map(Pin::position)
            .ok_or_else(|| MeasureError::pin_not_found(id))
    }

    /// Lines that have `pin_id` as an endpoint
    pub fn lines_touching(&self, pin_id: PinId) -> impl Iterator<Item = &Line> {
        self.lines.iter().filter(move |l| l.touches(pin_id))
    }

    /// Add a pin; always succeeds
    ///
    /// Coordinates are stored as given. Callers that take raw input should
    /// reject non-finite values first, as `move_pin` does.
    pub fn add_pin(&mut self, x: f64, y: f64) -> PinId {
        let pin = Pin::new(x, y);
        let id = pin.id;
        self.pins.push(pin);
        id
    }

    /// Move a pin and recompute every line that references it
    pub fn move_pin(&mut self, id: PinId, x: f64, y: f64) -> MeasureResult<()> {
        MeasureError::check_coordinate(x, y)?;
        let pin = self
            .pins
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| MeasureError::pin_not_found(id))?;
        pin.x = x;
        pin.y = y;
        self.refresh();
        Ok(())
    }

    /// Remove a pin and every line referencing it
    ///
    /// Returns the ids of the removed lines.
    pub fn remove_pin(&mut self, id: PinId) -> MeasureResult<Vec<LineId>> {
        if self.pin(id).is_none() {
            return Err(MeasureError::pin_not_found(id));
        }

        let removed: Vec<LineId> = self.lines_touching(id).map(|l| l.id).collect();
        self.lines.retain(|l| !l.touches(id));
        self.pins.retain(|p| p.id != id);
        self.refresh();
        Ok(removed)
    }

    /// Connect two pins with a new line
    ///
    /// Snap resolution is the caller's job: `end` must already be the pin the
    /// user meant, not a near-duplicate.
    pub fn connect(
        &mut self,
        start: PinId,
        end: PinId,
        options: ConnectOptions,
    ) -> MeasureResult<LineId> {
        let start_pos = self.position(start)?;
        let end_pos = self.position(end)?;

        if start == end {
            return Err(MeasureError::InvalidEdge(
                "cannot connect a pin to itself".to_string(),
            ));
        }
        if self.lines.iter().any(|l| l.same_pair(start, end)) {
            return Err(MeasureError::InvalidEdge(
                "pins are already connected".to_string(),
            ));
        }

        let existing: Vec<Segment> = self
            .lines
            .iter()
            .filter_map(|l| self.segment(l).ok())
            .collect();
        let candidate = Segment::new(start_pos, end_pos);

        let mut line = Line::new(start, end, options.curve_points);
        line.is_bump_out =
            geometry::is_bump_out(&existing, candidate, self.bump_out_tolerance_deg);
        let id = line.id;
        self.lines.push(line);
        self.refresh();
        Ok(id)
    }

    /// Remove a single line
    pub fn remove_line(&mut self, id: LineId) -> MeasureResult<()> {
        if self.line(id).is_none() {
            return Err(MeasureError::line_not_found(id));
        }
        self.lines.retain(|l| l.id != id);
        self.refresh();
        Ok(())
    }

    /// Replace a line's curve points (empty makes it straight)
    pub fn set_curve_points(&mut self, id: LineId, curve_points: Vec<Point>) -> MeasureResult<()> {
        let line = self
            .lines
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(|| MeasureError::line_not_found(id))?;
        line.curve_points = curve_points;
        self.refresh();
        Ok(())
    }

    /// Straight chord of a line
    pub fn segment(&self, line: &Line) -> MeasureResult<Segment> {
        Ok(Segment::new(
            self.position(line.start_pin_id)?,
            self.position(line.end_pin_id)?,
        ))
    }

    /// Pixel length of a line (curve aware)
    pub fn segment_length(&self, line: &Line) -> MeasureResult<f64> {
        let segment = self.segment(line)?;
        Ok(geometry::segment_length(
            segment.start,
            segment.end,
            &line.curve_points,
        ))
    }

    /// Direction of a line in degrees
    pub fn segment_angle(&self, line: &Line) -> MeasureResult<Option<f64>> {
        let segment = self.segment(line)?;
        Ok(geometry::segment_angle(segment.start, segment.end))
    }

    /// Angle at the pin shared by two lines
    ///
    /// `Ok(None)` when the lines do not share exactly one endpoint.
    pub fn corner_angle(&self, a: LineId, b: LineId) -> MeasureResult<Option<f64>> {
        let line_a = self.line(a).ok_or_else(|| MeasureError::line_not_found(a))?;
        let line_b = self.line(b).ok_or_else(|| MeasureError::line_not_found(b))?;
        self.corner_angle_between(line_a, line_b)
    }

    fn corner_angle_between(&self, a: &Line, b: &Line) -> MeasureResult<Option<f64>> {
        let shared: Vec<PinId> = [a.start_pin_id, a.end_pin_id]
            .into_iter()
            .filter(|id| b.touches(*id))
            .collect();

        let [corner] = shared.as_slice() else {
            return Ok(None);
        };

        let (Some(a_other), Some(b_other)) = (a.other_end(*corner), b.other_end(*corner)) else {
            return Ok(None);
        };

        Ok(geometry::corner_angle(
            self.position(*corner)?,
            self.position(a_other)?,
            self.position(b_other)?,
        ))
    }

    /// The line ending at `line`'s start pin, i.e. its predecessor in a tapped chain
    fn predecessor(&self, line: &Line) -> Option<&Line> {
        self.lines
            .iter()
            .find(|l| l.id != line.id && l.end_pin_id == line.start_pin_id)
    }

    /// Recompute derived line fields from current pin positions
    fn refresh(&mut self) {
        let derived: Vec<(f64, Option<f64>)> = self
            .lines
            .iter()
            .map(|line| {
                let length = self.segment_length(line).unwrap_or(0.0);
                let angle = self
                    .predecessor(line)
                    .and_then(|prev| self.corner_angle_between(prev, line).ok().flatten());
                (length, angle)
            })
            .collect();

        for (line, (length, angle)) in self.lines.iter_mut().zip(derived) {
            line.length = length;
            line.angle = angle;
        }
    }

    /// Closure predicate: as many lines as pins and the last line ends where
    /// the first one starts
    pub fn is_closed(&self) -> bool {
        self.closed_cycle().is_some()
    }

    /// Walk the closed cycle, if the graph forms one
    ///
    /// The walk starts at the first line's start pin and follows unused lines
    /// in insertion order, regardless of their direction. It must visit every
    /// pin exactly once and return to the start.
    pub fn closed_cycle(&self) -> Option<Cycle> {
        let n = self.pins.len();
        if n < 3 || self.lines.len() != n {
            return None;
        }

        let first = self.lines.first()?;
        let last = self.lines.last()?;
        if last.end_pin_id != first.start_pin_id {
            return None;
        }

        let start = first.start_pin_id;
        let mut pins = vec![start];
        let mut lines = Vec::with_capacity(n);
        let mut visited: HashSet<PinId> = HashSet::from([start]);
        let mut used: HashSet<LineId> = HashSet::new();
        let mut current = start;

        for step in 0..n {
            let line = self
                .lines
                .iter()
                .find(|l| !used.contains(&l.id) && l.touches(current))?;
            let next = line.other_end(current)?;
            used.insert(line.id);
            lines.push(line.id);

            if step == n - 1 {
                return (next == start).then_some(Cycle { pins, lines });
            }
            if !visited.insert(next) {
                return None;
            }
            pins.push(next);
            current = next;
        }

        None
    }

    /// Copy of the current pins and lines
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            pins: self.pins.clone(),
            lines: self.lines.clone(),
        }
    }

    /// Replace the whole graph with a snapshot after checking its integrity
    pub fn restore(&mut self, snapshot: Snapshot) -> MeasureResult<()> {
        validate_snapshot(&snapshot)?;
        self.pins = snapshot.pins;
        self.lines = snapshot.lines;
        self.refresh();
        Ok(())
    }

    /// Replace the whole graph with a snapshot this graph produced earlier
    pub(crate) fn replace(&mut self, snapshot: Snapshot) {
        self.pins = snapshot.pins;
        self.lines = snapshot.lines;
        self.refresh();
    }

    /// Remove everything
    pub fn clear(&mut self) {
        self.pins.clear();
        self.lines.clear();
    }
}

fn validate_snapshot(snapshot: &Snapshot) -> MeasureResult<()> {
    let mut pin_ids = HashSet::new();
    for pin in &snapshot.pins {
        if !pin.x.is_finite() || !pin.y.is_finite() {
            return Err(MeasureError::InvalidSnapshot(format!(
                "pin {} has a non-finite coordinate",
                pin.id
            )));
        }
        if !pin_ids.insert(pin.id) {
            return Err(MeasureError::InvalidSnapshot(format!(
                "duplicate pin id {}",
                pin.id
            )));
        }
    }

    let mut line_ids = HashSet::new();
    let mut pairs = HashSet::new();
    for line in &snapshot.lines {
        if !line_ids.insert(line.id) {
            return Err(MeasureError::InvalidSnapshot(format!(
                "duplicate line id {}",
                line.id
            )));
        }
        if line.start_pin_id == line.end_pin_id {
            return Err(MeasureError::InvalidSnapshot(format!(
                "line {} connects a pin to itself",
                line.id
            )));
        }
        for pin_id in [line.start_pin_id, line.end_pin_id] {
            if !pin_ids.contains(&pin_id) {
                return Err(MeasureError::InvalidSnapshot(format!(
                    "line {} references missing pin {}",
                    line.id, pin_id
                )));
            }
        }
        let pair = if line.start_pin_id < line.end_pin_id {
            (line.start_pin_id, line.end_pin_id)
        } else {
            (line.end_pin_id, line.start_pin_id)
        };
        if !pairs.insert(pair) {
            return Err(MeasureError::InvalidSnapshot(format!(
                "line {} duplicates an existing connection",
                line.id
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rectangle(graph: &mut PinGraph) -> Vec<PinId> {
        let ids = vec![
            graph.add_pin(0.0, 0.0),
            graph.add_pin(100.0, 0.0),
            graph.add_pin(100.0, 50.0),
            graph.add_pin(0.0, 50.0),
        ];
        for i in 0..4 {
            graph
                .connect(ids[i], ids[(i + 1) % 4], ConnectOptions::default())
                .unwrap();
        }
        ids
    }

    #[test]
    fn test_add_pin_assigns_unique_ids() {
        let mut graph = PinGraph::new();
        let a = graph.add_pin(1.0, 2.0);
        let b = graph.add_pin(1.0, 2.0);
        assert_ne!(a, b);
        assert_eq!(graph.pins().len(), 2);
        assert_eq!(graph.position(a).unwrap(), Point::new(1.0, 2.0));
    }

    #[test]
    fn test_connect_derives_length() {
        let mut graph = PinGraph::new();
        let a = graph.add_pin(0.0, 0.0);
        let b = graph.add_pin(30.0, 40.0);
        let line_id = graph.connect(a, b, ConnectOptions::default()).unwrap();

        let line = graph.line(line_id).unwrap();
        assert_eq!(line.length, 50.0);
        assert_eq!(line.angle, None);
        assert!(!line.is_curved());
    }

    #[test]
    fn test_connect_errors() {
        let mut graph = PinGraph::new();
        let a = graph.add_pin(0.0, 0.0);
        let b = graph.add_pin(10.0, 0.0);
        let missing = PinId::new_v4();

        assert!(matches!(
            graph.connect(a, a, ConnectOptions::default()),
            Err(MeasureError::InvalidEdge(_))
        ));
        assert!(matches!(
            graph.connect(a, missing, ConnectOptions::default()),
            Err(MeasureError::NotFound { .. })
        ));

        graph.connect(a, b, ConnectOptions::default()).unwrap();
        assert!(matches!(
            graph.connect(b, a, ConnectOptions::default()),
            Err(MeasureError::InvalidEdge(_))
        ));
        assert_eq!(graph.lines().len(), 1);
    }

    #[test]
    fn test_move_pin_recomputes_lines() {
        let mut graph = PinGraph::new();
        let a = graph.add_pin(0.0, 0.0);
        let b = graph.add_pin(10.0, 0.0);
        let line_id = graph.connect(a, b, ConnectOptions::default()).unwrap();

        graph.move_pin(b, 0.0, 25.0).unwrap();
        assert_eq!(graph.line(line_id).unwrap().length, 25.0);

        assert!(matches!(
            graph.move_pin(PinId::new_v4(), 0.0, 0.0),
            Err(MeasureError::NotFound { .. })
        ));
    }

    #[test]
    fn test_move_pin_rejects_non_finite() {
        let mut graph = PinGraph::new();
        let a = graph.add_pin(0.0, 0.0);

        assert!(matches!(
            graph.move_pin(a, f64::NAN, 1.0),
            Err(MeasureError::InvalidCoordinate { .. })
        ));
        assert!(graph.move_pin(a, 1.0, f64::INFINITY).is_err());
        assert_eq!(graph.position(a).unwrap(), Point::new(0.0, 0.0));
    }

    #[test]
    fn test_remove_pin_cascades() {
        let mut graph = PinGraph::new();
        let ids = rectangle(&mut graph);

        let removed = graph.remove_pin(ids[1]).unwrap();
        assert_eq!(removed.len(), 2);
        assert_eq!(graph.pins().len(), 3);
        assert_eq!(graph.lines().len(), 2);
        assert!(graph.lines().iter().all(|l| !l.touches(ids[1])));
        assert!(!graph.is_closed());
    }

    #[test]
    fn test_corner_angles_derived() {
        let mut graph = PinGraph::new();
        let ids = rectangle(&mut graph);

        for line in graph.lines() {
            let angle = line.angle.unwrap();
            assert!((angle - 90.0).abs() < 1e-9);
        }

        let first = graph.lines()[0].id;
        let second = graph.lines()[1].id;
        let third = graph.lines()[2].id;
        let angle = graph.corner_angle(first, second).unwrap().unwrap();
        assert!((angle - 90.0).abs() < 1e-9);
        // Opposite edges share no pin
        assert_eq!(graph.corner_angle(first, third).unwrap(), None);

        graph.move_pin(ids[2], 150.0, 50.0).unwrap();
        let angle = graph.corner_angle(first, second).unwrap().unwrap();
        assert!((angle - 135.0).abs() < 1e-9);
    }

    #[test]
    fn test_closed_cycle_order() {
        let mut graph = PinGraph::new();
        let ids = rectangle(&mut graph);

        let cycle = graph.closed_cycle().unwrap();
        assert_eq!(cycle.pins, ids);
        assert_eq!(cycle.lines.len(), 4);
        assert!(graph.is_closed());
    }

    #[test]
    fn test_closed_cycle_accepts_reversed_edges() {
        let mut graph = PinGraph::new();
        let a = graph.add_pin(0.0, 0.0);
        let b = graph.add_pin(10.0, 0.0);
        let c = graph.add_pin(10.0, 10.0);
        graph.connect(a, b, ConnectOptions::default()).unwrap();
        // Drawn backwards
        graph.connect(c, b, ConnectOptions::default()).unwrap();
        graph.connect(c, a, ConnectOptions::default()).unwrap();

        // Last line ends at `a`, which is where the first starts
        let cycle = graph.closed_cycle().unwrap();
        assert_eq!(cycle.pins, vec![a, b, c]);
    }

    #[test]
    fn test_open_shapes_not_closed() {
        let mut graph = PinGraph::new();
        let a = graph.add_pin(0.0, 0.0);
        let b = graph.add_pin(10.0, 0.0);
        let c = graph.add_pin(10.0, 10.0);
        graph.connect(a, b, ConnectOptions::default()).unwrap();
        graph.connect(b, c, ConnectOptions::default()).unwrap();
        assert!(!graph.is_closed());

        // Two separate segments with pins == lines but not a cycle
        let mut graph = PinGraph::new();
        let ids: Vec<PinId> = (0..4).map(|i| graph.add_pin(i as f64, 0.0)).collect();
        graph.connect(ids[0], ids[1], ConnectOptions::default()).unwrap();
        graph.connect(ids[2], ids[3], ConnectOptions::default()).unwrap();
        graph.connect(ids[1], ids[2], ConnectOptions::default()).unwrap();
        graph.connect(ids[3], ids[1], ConnectOptions::default()).unwrap();
        assert!(!graph.is_closed());
    }

    #[test]
    fn test_curved_line_length() {
        let mut graph = PinGraph::new();
        let a = graph.add_pin(0.0, 0.0);
        let b = graph.add_pin(100.0, 0.0);
        let line_id = graph
            .connect(
                a,
                b,
                ConnectOptions::curved(vec![Point::new(0.0, 50.0), Point::new(100.0, 50.0)]),
            )
            .unwrap();

        assert_eq!(graph.line(line_id).unwrap().length, 200.0);

        graph.set_curve_points(line_id, Vec::new()).unwrap();
        assert_eq!(graph.line(line_id).unwrap().length, 100.0);
    }

    #[test]
    fn test_bump_out_classification() {
        let mut graph = PinGraph::new();
        let a = graph.add_pin(0.0, 0.0);
        let b = graph.add_pin(100.0, 0.0);
        let c = graph.add_pin(200.0, 0.0);
        let d = graph.add_pin(200.0, 40.0);

        let ab = graph.connect(a, b, ConnectOptions::default()).unwrap();
        let bc = graph.connect(b, c, ConnectOptions::default()).unwrap();
        let cd = graph.connect(c, d, ConnectOptions::default()).unwrap();

        assert!(!graph.line(ab).unwrap().is_bump_out);
        assert!(!graph.line(bc).unwrap().is_bump_out);
        assert!(graph.line(cd).unwrap().is_bump_out);
    }

    #[test]
    fn test_remove_line() {
        let mut graph = PinGraph::new();
        rectangle(&mut graph);
        let id = graph.lines()[3].id;
        graph.remove_line(id).unwrap();
        assert_eq!(graph.lines().len(), 3);
        assert!(!graph.is_closed());
        assert!(graph.remove_line(id).is_err());
    }

    #[test]
    fn test_snapshot_restore_roundtrip() {
        let mut graph = PinGraph::new();
        rectangle(&mut graph);
        let snapshot = graph.snapshot();

        let json = snapshot.to_json().unwrap();
        let parsed = Snapshot::from_json(&json).unwrap();

        let mut other = PinGraph::new();
        other.restore(parsed).unwrap();
        assert_eq!(other.snapshot(), snapshot);
        assert!(other.is_closed());
    }

    #[test]
    fn test_restore_rejects_dangling_line() {
        let mut graph = PinGraph::new();
        rectangle(&mut graph);
        let mut snapshot = graph.snapshot();
        snapshot.pins.remove(0);

        let mut other = PinGraph::new();
        assert!(matches!(
            other.restore(snapshot),
            Err(MeasureError::InvalidSnapshot(_))
        ));
        assert!(other.is_empty());
    }

    #[test]
    fn test_restore_rejects_duplicate_connection() {
        let mut graph = PinGraph::new();
        let ids = rectangle(&mut graph);
        let mut snapshot = graph.snapshot();
        // Same pair as the first edge, drawn the other way round
        snapshot.lines.push(Line::new(ids[1], ids[0], Vec::new()));

        let mut other = PinGraph::new();
        assert!(matches!(
            other.restore(snapshot),
            Err(MeasureError::InvalidSnapshot(msg)) if msg.contains("duplicates")
        ));
        assert!(other.is_empty());
    }

    #[test]
    fn test_restore_recomputes_derived_fields() {
        let json = r#"{
            "pins": [
                {"id": "00000000-0000-0000-0000-000000000001", "x": 0.0, "y": 0.0},
                {"id": "00000000-0000-0000-0000-000000000002", "x": 3.0, "y": 4.0}
            ],
            "lines": [
                {
                    "id": "00000000-0000-0000-0000-00000000000a",
                    "start_pin_id": "00000000-0000-0000-0000-000000000001",
                    "end_pin_id": "00000000-0000-0000-0000-000000000002"
                }
            ]
        }"#;
        let mut graph = PinGraph::new();
        graph.restore(Snapshot::from_json(json).unwrap()).unwrap();
        assert_eq!(graph.lines()[0].length, 5.0);
    }
}
