//! Error types for the measurement engine
//!
//! Every failing operation is rejected before any state is touched, so a
//! caller can recover by re-reading the current engine state.

use uuid::Uuid;

/// Error types for measurement operations
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MeasureError {
    /// A pin or line id did not resolve to an existing element
    #[error("{kind} not found: {id}")]
    NotFound { kind: ElementKind, id: Uuid },

    /// Attempted to create an edge that cannot exist
    #[error("invalid edge: {0}")]
    InvalidEdge(String),

    /// Calibration reference is degenerate or the declared length is not positive
    #[error("invalid calibration: {0}")]
    InvalidCalibration(String),

    /// A physical-unit value was requested before any scale was available
    #[error("no calibration set; calibrate against a reference or configure a default scale")]
    Uncalibrated,

    /// A pin position with a NaN or infinite coordinate
    #[error("invalid coordinate: ({x}, {y})")]
    InvalidCoordinate { x: f64, y: f64 },

    /// `drag_to` / `end_drag` called without a preceding `begin_drag`
    #[error("no drag gesture in progress")]
    NoActiveDrag,

    /// A snapshot handed to `restore` violates the pin/line invariants
    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),

    /// Unit symbol could not be parsed
    #[error("unknown unit: {0}")]
    UnknownUnit(String),
}

/// Which kind of element a `NotFound` refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Pin,
    Line,
}

impl std::fmt::Display for ElementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ElementKind::Pin => write!(f, "pin"),
            ElementKind::Line => write!(f, "line"),
        }
    }
}

impl MeasureError {
    pub(crate) fn pin_not_found(id: Uuid) -> Self {
        MeasureError::NotFound {
            kind: ElementKind::Pin,
            id,
        }
    }

    pub(crate) fn line_not_found(id: Uuid) -> Self {
        MeasureError::NotFound {
            kind: ElementKind::Line,
            id,
        }
    }

    /// `Ok` when both coordinates are finite
    pub(crate) fn check_coordinate(x: f64, y: f64) -> Result<(), Self> {
        if x.is_finite() && y.is_finite() {
            Ok(())
        } else {
            Err(MeasureError::InvalidCoordinate { x, y })
        }
    }
}

/// Result type for measurement operations
pub type MeasureResult<T> = Result<T, MeasureError>;
