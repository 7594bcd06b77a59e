//! Photo Measurement Core Library
//!
//! Turns pins placed on a photo into physical measurements: a pin/line
//! graph, calibration to real-world units, polygon metrics, plausibility
//! checks and undo/redo history, driven through `MeasurementEngine`.

pub mod calibration;
pub mod config;
pub mod csv_export;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod history;
pub mod model;
pub mod polygon;
pub mod snapping;
pub mod templates;
pub mod validation;

pub use calibration::{Calibration, CalibrationSource, Unit};
pub use config::{ConfigError, EngineConfig};
pub use csv_export::{export_session_csv, session_csv_string, CsvExportConfig, CsvExportError};
pub use engine::{MeasurementEngine, TapOutcome};
pub use error::{ElementKind, MeasureError, MeasureResult};
pub use geometry::{Point, Segment};
pub use history::{History, HistoryConfig};
pub use model::{ConnectOptions, Cycle, Line, LineId, Pin, PinGraph, PinId, Snapshot};
pub use polygon::{Metrics, PixelMeasurements, ShapeAnalysis, ShapeKind};
pub use snapping::{SnapConfig, SnapEngine};
pub use templates::ShapeTemplate;
pub use validation::{ValidationConfig, ValidationReport, Validator};
