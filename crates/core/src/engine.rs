//! Measurement session engine
//!
//! `MeasurementEngine` is the single entry point a host talks to for one
//! photo. It owns the pin graph, the undo history, the calibration and the
//! derived shape analysis, and keeps them consistent: every mutation
//! recomputes derived geometry in one place and records exactly one history
//! entry. There is no global state; the host creates an engine when a photo
//! is opened and drops it when the photo is closed.

use crate::calibration::{Calibration, Unit};
use crate::config::EngineConfig;
use crate::error::{MeasureError, MeasureResult};
use crate::geometry::{self, Point};
use crate::history::History;
use crate::model::{ConnectOptions, Line, LineId, Pin, PinGraph, PinId, Snapshot};
use crate::polygon::{self, Metrics, PixelMeasurements, ShapeAnalysis, ShapeKind};
use crate::snapping::SnapEngine;
use crate::templates::ShapeTemplate;
use crate::validation::{ValidationInput, ValidationReport, Validator};

/// What a single tap did to the graph
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TapOutcome {
    /// Pin the tap resolved to (new, or an existing pin it snapped onto)
    pub pin: PinId,
    /// Whether `pin` was created by this tap
    pub created: bool,
    /// Line from the previous tap to `pin`
    pub line: Option<LineId>,
    /// Line added by auto-close on the fourth pin
    pub closing_line: Option<LineId>,
}

impl TapOutcome {
    fn changed(&self) -> bool {
        self.created || self.line.is_some() || self.closing_line.is_some()
    }
}

#[derive(Debug, Clone, Copy)]
struct DragState {
    pin: PinId,
    origin: Point,
}

/// One measurement session over a single photo
#[derive(Debug, Clone)]
pub struct MeasurementEngine {
    graph: PinGraph,
    history: History,
    calibration: Option<Calibration>,
    display_unit: Unit,
    config: EngineConfig,
    snap: SnapEngine,
    validator: Validator,
    shape: ShapeAnalysis,
    drag: Option<DragState>,
}

impl Default for MeasurementEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MeasurementEngine {
    /// Create an engine with default configuration
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// Create an engine with custom configuration
    pub fn with_config(config: EngineConfig) -> Self {
        let graph = PinGraph::new()
            .with_bump_out_tolerance(config.bump_out_tolerance_deg);
        let shape = ShapeAnalysis::of(&graph);
        let mut history = History::with_config(config.history.clone());
        history.push(graph.snapshot());

        Self {
            snap: SnapEngine::with_config(config.snap.clone()),
            validator: Validator::new(config.validation.clone()),
            graph,
            history,
            calibration: None,
            display_unit: Unit::default(),
            config,
            shape,
            drag: None,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn pins(&self) -> &[Pin] {
        self.graph.pins()
    }

    pub fn lines(&self) -> &[Line] {
        self.graph.lines()
    }

    pub fn pin(&self, id: PinId) -> Option<&Pin> {
        self.graph.pin(id)
    }

    pub fn line(&self, id: LineId) -> Option<&Line> {
        self.graph.line(id)
    }

    pub fn shape_kind(&self) -> ShapeKind {
        self.shape.kind
    }

    /// Current shape classification with the ordered cycle, when closed
    pub fn shape(&self) -> &ShapeAnalysis {
        &self.shape
    }

    pub fn is_closed(&self) -> bool {
        self.shape.kind.is_closed()
    }

    /// Angle at the pin shared by two lines, `None` if they share no pin
    pub fn corner_angle(&self, a: LineId, b: LineId) -> MeasureResult<Option<f64>> {
        self.graph.corner_angle(a, b)
    }

    // --- Mutations -------------------------------------------------------

    /// Place a free pin
    pub fn add_pin(&mut self, x: f64, y: f64) -> PinId {
        let id = self.graph.add_pin(x, y);
        log::debug!("added pin {id} at ({x}, {y})");
        self.commit();
        id
    }

    /// Sequential tapping: place (or snap to) a pin and connect it to the
    /// previous tap
    ///
    /// When exactly 3 pins joined by 2 lines existed before the tap and the
    /// tap creates a fourth pin, the outline is closed back to the first pin.
    pub fn tap(&mut self, x: f64, y: f64) -> MeasureResult<TapOutcome> {
        MeasureError::check_coordinate(x, y)?;
        let position = Point::new(x, y);
        let pins_before = self.graph.pins().len();
        let lines_before = self.graph.lines().len();
        let anchor = self.tap_anchor();

        let (pin, created) = match self.snap.nearest_pin(position, self.graph.pins(), None) {
            Some(existing) => (existing, false),
            None => (self.graph.add_pin(x, y), true),
        };

        let mut outcome = TapOutcome {
            pin,
            created,
            line: None,
            closing_line: None,
        };

        if let Some(anchor) = anchor {
            if anchor != pin && !self.are_connected(anchor, pin) {
                let line = self.graph.connect(anchor, pin, ConnectOptions::default())?;
                outcome.line = Some(line);
            }
        }

        if self.config.auto_close_on_fourth_pin
            && created
            && outcome.line.is_some()
            && pins_before == 3
            && lines_before == 2
        {
            if let Some(first) = self.graph.lines().first().map(|l| l.start_pin_id) {
                if first != pin && !self.are_connected(pin, first) {
                    let closing = self.graph.connect(pin, first, ConnectOptions::default())?;
                    log::debug!("auto-closed outline with line {closing}");
                    outcome.closing_line = Some(closing);
                }
            }
        }

        if outcome.changed() {
            log::debug!(
                "tap at ({x}, {y}) -> pin {} (created: {})",
                outcome.pin,
                outcome.created
            );
            self.commit();
        }
        Ok(outcome)
    }

    /// Move a pin to a new position
    pub fn move_pin(&mut self, id: PinId, x: f64, y: f64) -> MeasureResult<()> {
        self.graph.move_pin(id, x, y)?;
        log::debug!("moved pin {id} to ({x}, {y})");
        self.commit();
        Ok(())
    }

    /// Start dragging a pin
    ///
    /// A drag already in progress is committed first.
    pub fn begin_drag(&mut self, id: PinId) -> MeasureResult<()> {
        let origin = self.graph.position(id)?;
        if self.drag.is_some() {
            self.end_drag()?;
        }
        self.drag = Some(DragState { pin: id, origin });
        Ok(())
    }

    /// Move the dragged pin; geometry is recomputed but history is untouched
    pub fn drag_to(&mut self, x: f64, y: f64) -> MeasureResult<()> {
        let drag = self.drag.ok_or(MeasureError::NoActiveDrag)?;
        self.graph.move_pin(drag.pin, x, y)?;
        self.refresh();
        Ok(())
    }

    /// Finish the drag, recording one history entry if the pin moved
    pub fn end_drag(&mut self) -> MeasureResult<()> {
        let drag = self.drag.take().ok_or(MeasureError::NoActiveDrag)?;
        let position = self.graph.position(drag.pin)?;
        if position != drag.origin {
            log::debug!("dragged pin {} to ({}, {})", drag.pin, position.x, position.y);
            self.commit();
        }
        Ok(())
    }

    /// Abort the drag and put the pin back where it started
    pub fn cancel_drag(&mut self) -> MeasureResult<()> {
        let drag = self.drag.take().ok_or(MeasureError::NoActiveDrag)?;
        self.graph.move_pin(drag.pin, drag.origin.x, drag.origin.y)?;
        self.refresh();
        Ok(())
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Remove a pin together with every line that references it
    pub fn remove_pin(&mut self, id: PinId) -> MeasureResult<Vec<LineId>> {
        let removed = self.graph.remove_pin(id)?;
        if self.drag.is_some_and(|d| d.pin == id) {
            self.drag = None;
        }
        log::debug!("removed pin {id} and {} line(s)", removed.len());
        self.commit();
        Ok(removed)
    }

    /// Connect two pins with a straight line
    pub fn connect(&mut self, start: PinId, end: PinId) -> MeasureResult<LineId> {
        self.connect_with(start, end, ConnectOptions::default())
    }

    pub fn connect_with(
        &mut self,
        start: PinId,
        end: PinId,
        options: ConnectOptions,
    ) -> MeasureResult<LineId> {
        let id = self.graph.connect(start, end, options)?;
        log::debug!("connected {start} -> {end} as line {id}");
        self.commit();
        Ok(id)
    }

    /// Connect two pins along a traced path
    ///
    /// `path` holds the points traced between the two pins, excluding the pins
    /// themselves. They are kept as curve points only when the path strays far
    /// enough from the chord to count as a curve.
    pub fn connect_path(
        &mut self,
        start: PinId,
        end: PinId,
        path: &[Point],
    ) -> MeasureResult<LineId> {
        let start_pos = self.graph.position(start)?;
        let end_pos = self.graph.position(end)?;

        let mut traced = Vec::with_capacity(path.len() + 2);
        traced.push(start_pos);
        traced.extend_from_slice(path);
        traced.push(end_pos);

        let options = if geometry::is_curve(&traced, self.config.curve_deviation_ratio) {
            ConnectOptions::curved(path.to_vec())
        } else {
            ConnectOptions::default()
        };
        self.connect_with(start, end, options)
    }

    /// Replace a line's curve points; an empty list straightens it
    pub fn set_curve_points(&mut self, id: LineId, curve_points: Vec<Point>) -> MeasureResult<()> {
        self.graph.set_curve_points(id, curve_points)?;
        self.commit();
        Ok(())
    }

    pub fn remove_line(&mut self, id: LineId) -> MeasureResult<()> {
        self.graph.remove_line(id)?;
        log::debug!("removed line {id}");
        self.commit();
        Ok(())
    }

    /// Replace the outline with a template's pins, connected as a closed cycle
    ///
    /// Existing pins and lines are discarded. The calibration is kept.
    pub fn apply_template(
        &mut self,
        template: ShapeTemplate,
        origin: Point,
        width: f64,
        height: f64,
    ) -> MeasureResult<Vec<PinId>> {
        if !(width > 0.0 && height > 0.0) {
            return Err(MeasureError::InvalidEdge(format!(
                "template size must be positive, got {width} x {height}"
            )));
        }

        let mut graph = PinGraph::new()
            .with_bump_out_tolerance(self.config.bump_out_tolerance_deg);
        let ids: Vec<PinId> = template
            .corners(origin, width, height)
            .into_iter()
            .map(|corner| graph.add_pin(corner.x, corner.y))
            .collect();
        for (i, start) in ids.iter().enumerate() {
            graph.connect(*start, ids[(i + 1) % ids.len()], ConnectOptions::default())?;
        }

        self.graph = graph;
        self.drag = None;
        log::debug!("applied {template:?} template with {} pins", ids.len());
        self.commit();
        Ok(ids)
    }

    /// Remove every pin and line; the calibration is kept
    pub fn clear(&mut self) {
        self.graph.clear();
        self.drag = None;
        log::debug!("cleared outline");
        self.commit();
    }

    // --- Snapping --------------------------------------------------------

    /// Existing pin strictly within the snap radius of `(x, y)`
    pub fn snap_to_pin(&self, x: f64, y: f64, exclude: Option<PinId>) -> Option<PinId> {
        self.snap.nearest_pin(Point::new(x, y), self.graph.pins(), exclude)
    }

    // --- Calibration -----------------------------------------------------

    /// Calibrate against a line of known real-world length
    ///
    /// The first calibration of a session also switches the display unit to
    /// `unit`; later ones leave the display unit alone.
    pub fn calibrate(
        &mut self,
        line_id: LineId,
        known_length: f64,
        unit: Unit,
    ) -> MeasureResult<&Calibration> {
        let line = self
            .graph
            .line(line_id)
            .ok_or_else(|| MeasureError::line_not_found(line_id))?;
        let calibration = Calibration::from_reference(line.length, known_length, unit)?;
        log::debug!(
            "calibrated against line {line_id}: {:.4} px/{unit}",
            calibration.pixels_per_unit()
        );
        Ok(self.install_calibration(calibration))
    }

    /// Use a known scale; display unit follows the same rule as `calibrate`
    pub fn set_calibration(&mut self, calibration: Calibration) {
        log::debug!(
            "calibration set to {:.4} px/{}",
            calibration.pixels_per_unit(),
            calibration.unit()
        );
        self.install_calibration(calibration);
    }

    pub fn clear_calibration(&mut self) {
        self.calibration = None;
    }

    /// Calibration set by the user, if any
    pub fn calibration(&self) -> Option<&Calibration> {
        self.calibration.as_ref()
    }

    /// Scale metrics are computed with: the user's calibration, else the
    /// configured fallback
    pub fn effective_calibration(&self) -> Option<Calibration> {
        if let Some(calibration) = &self.calibration {
            return Some(calibration.clone());
        }
        self.config
            .default_pixels_per_inch
            .and_then(|ppi| Calibration::fallback(ppi).ok())
    }

    pub fn display_unit(&self) -> Unit {
        self.display_unit
    }

    pub fn set_display_unit(&mut self, unit: Unit) {
        self.display_unit = unit;
    }

    // --- Measurement -----------------------------------------------------

    /// Shape metrics in the display unit
    ///
    /// Open shapes yield `None` for the closed-shape figures rather than an
    /// error.
    pub fn metrics(&self) -> MeasureResult<Metrics> {
        let calibration = self
            .effective_calibration()
            .ok_or(MeasureError::Uncalibrated)?;
        let pixels = PixelMeasurements::measure(&self.graph, &self.shape);
        Ok(Metrics::from_pixels(
            &pixels,
            self.shape.kind,
            &calibration,
            self.display_unit,
        ))
    }

    /// Shape metrics in pixels; available without calibration
    pub fn pixel_metrics(&self) -> Metrics {
        let pixels = PixelMeasurements::measure(&self.graph, &self.shape);
        Metrics::raw_pixels(&pixels, self.shape.kind)
    }

    /// Plausibility checks over the current shape
    pub fn validate(&self) -> ValidationReport {
        let input = ValidationInput {
            pin_count: self.graph.pins().len(),
            line_count: self.graph.lines().len(),
            dimensions_px: polygon::edge_dimensions(&self.graph),
            pixels_per_inch: self.effective_calibration().map(|c| c.pixels_per_inch()),
            corner_angles: self.graph.lines().iter().filter_map(|l| l.angle).collect(),
            is_rectangle: self.shape.kind == ShapeKind::Rectangle,
        };
        self.validator.validate(&input)
    }

    // --- History ---------------------------------------------------------

    /// Step back one edit; `false` when there is nothing to undo
    pub fn undo(&mut self) -> bool {
        let Some(snapshot) = self.history.undo().cloned() else {
            return false;
        };
        self.apply_history(snapshot);
        true
    }

    /// Step forward one edit; `false` when there is nothing to redo
    pub fn redo(&mut self) -> bool {
        let Some(snapshot) = self.history.redo().cloned() else {
            return false;
        };
        self.apply_history(snapshot);
        true
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Copy of the current pins and lines
    pub fn snapshot(&self) -> Snapshot {
        self.graph.snapshot()
    }

    /// Replace the outline with a snapshot; rejected snapshots change nothing
    pub fn restore(&mut self, snapshot: Snapshot) -> MeasureResult<()> {
        if let Err(err) = self.graph.restore(snapshot) {
            log::warn!("rejected snapshot: {err}");
            return Err(err);
        }
        self.drag = None;
        self.commit();
        Ok(())
    }

    // --- Internals -------------------------------------------------------

    /// The pin the next tap connects from: the newest pin, if it is loose or
    /// ends the newest line
    fn tap_anchor(&self) -> Option<PinId> {
        let newest = self.graph.pins().last()?.id;
        match self.graph.lines().last() {
            _ if self.graph.lines_touching(newest).next().is_none() => Some(newest),
            Some(line) if line.end_pin_id == newest => Some(newest),
            _ => None,
        }
    }

    fn are_connected(&self, a: PinId, b: PinId) -> bool {
        self.graph
            .lines_touching(a)
            .any(|line| line.other_end(a) == Some(b))
    }

    fn install_calibration(&mut self, calibration: Calibration) -> &Calibration {
        if self.calibration.is_none() {
            self.display_unit = calibration.unit();
        }
        self.calibration.insert(calibration)
    }

    /// History entries were produced by this graph, so they skip the
    /// integrity checks `restore` applies to outside snapshots
    fn apply_history(&mut self, snapshot: Snapshot) {
        self.drag = None;
        self.graph.replace(snapshot);
        self.refresh();
    }

    fn refresh(&mut self) {
        self.shape = ShapeAnalysis::of(&self.graph);
    }

    fn commit(&mut self) {
        self.refresh();
        self.history.push(self.graph.snapshot());
    }
}
