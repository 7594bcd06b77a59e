//! CSV export for measurement sessions
//!
//! Writes one row per line (edge) followed by an optional summary block with
//! the shape metrics, for spreadsheets and quoting tools.

use crate::engine::MeasurementEngine;
use crate::error::MeasureError;
use crate::model::Line;
use crate::polygon::{Metrics, ShapeKind};
use std::io::Write;

/// Error types for CSV export
#[derive(Debug, thiserror::Error)]
pub enum CsvExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Measure(#[from] MeasureError),
}

pub type CsvExportResult<T> = Result<T, CsvExportError>;

/// Configuration for CSV export
#[derive(Debug, Clone)]
pub struct CsvExportConfig {
    /// Include column headers in the output
    pub include_headers: bool,

    /// CSV delimiter character
    pub delimiter: u8,

    /// Append the shape summary after the edge rows
    pub include_summary: bool,

    /// Report pixel values when the session has no scale instead of failing
    pub allow_uncalibrated: bool,
}

impl Default for CsvExportConfig {
    fn default() -> Self {
        Self {
            include_headers: true,
            delimiter: b',',
            include_summary: true,
            allow_uncalibrated: true,
        }
    }
}

const HEADERS: [&str; 10] = [
    "Line",
    "Start Pin",
    "End Pin",
    "Start X",
    "Start Y",
    "End X",
    "End Y",
    "Length",
    "Unit",
    "Angle",
];

/// Export a session's edges and metrics to CSV
///
/// Edge columns:
/// - Line: 1-based index in drawing order
/// - Start Pin / End Pin: pin ids
/// - Start X/Y, End X/Y: pixel coordinates
/// - Length: physical length in the display unit, or pixels when uncalibrated
/// - Unit: unit symbol, `px` when uncalibrated
/// - Angle: corner angle against the previous line in degrees (empty if none)
///
/// Flags (curved, bump-out) are appended to the angle column as a trailing
/// `;curved` / `;bump-out` marker so downstream tools can keep a fixed width.
pub fn export_session_csv<W: Write>(
    writer: W,
    engine: &MeasurementEngine,
    config: &CsvExportConfig,
) -> CsvExportResult<()> {
    let (metrics, unit_label) = match engine.metrics() {
        Ok(metrics) => {
            let symbol = metrics.unit.symbol().to_string();
            (metrics, symbol)
        }
        Err(MeasureError::Uncalibrated) if config.allow_uncalibrated => {
            (engine.pixel_metrics(), "px".to_string())
        }
        Err(err) => return Err(err.into()),
    };
    let scale = engine.effective_calibration();
    let unit = engine.display_unit();

    let mut csv_writer = csv::WriterBuilder::new()
        .delimiter(config.delimiter)
        .flexible(true)
        .has_headers(false)
        .from_writer(writer);

    if config.include_headers {
        csv_writer.write_record(HEADERS)?;
    }

    for (index, line) in engine.lines().iter().enumerate() {
        let (Some(start), Some(end)) = (engine.pin(line.start_pin_id), engine.pin(line.end_pin_id))
        else {
            continue;
        };
        let length = match &scale {
            Some(calibration) => calibration.length_in(line.length, unit),
            None => line.length,
        };

        csv_writer.write_record(&[
            (index + 1).to_string(),
            line.start_pin_id.to_string(),
            line.end_pin_id.to_string(),
            format_number(start.x),
            format_number(start.y),
            format_number(end.x),
            format_number(end.y),
            format_number(length),
            unit_label.clone(),
            format_angle(line),
        ])?;
    }

    if config.include_summary {
        write_summary(&mut csv_writer, &metrics, &unit_label)?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Export to an in-memory string
pub fn session_csv_string(
    engine: &MeasurementEngine,
    config: &CsvExportConfig,
) -> CsvExportResult<String> {
    let mut buffer = Vec::new();
    export_session_csv(&mut buffer, engine, config)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

fn write_summary<W: Write>(
    csv_writer: &mut csv::Writer<W>,
    metrics: &Metrics,
    unit_label: &str,
) -> CsvExportResult<()> {
    let area_unit = format!("sq {unit_label}");

    csv_writer.write_record(["Metric", "Value", "Unit"])?;
    csv_writer.write_record(["Shape", shape_name(metrics.shape), ""])?;

    let rows = [
        ("Length", metrics.length, unit_label.to_string()),
        ("Width", metrics.width, unit_label.to_string()),
        ("Perimeter", metrics.perimeter, unit_label.to_string()),
        ("Area", metrics.area, area_unit),
        ("Path Length", metrics.path_length, unit_label.to_string()),
    ];
    for (name, value, unit) in rows {
        if let Some(value) = value {
            csv_writer.write_record([name.to_string(), format_number(value), unit])?;
        }
    }
    Ok(())
}

fn shape_name(shape: ShapeKind) -> &'static str {
    match shape {
        ShapeKind::Rectangle => "Rectangle",
        ShapeKind::Polygon => "Polygon",
        ShapeKind::OpenPolyline => "Open",
    }
}

fn format_angle(line: &Line) -> String {
    let mut out = line.angle.map(format_number).unwrap_or_default();
    if line.is_curved() {
        out.push_str(";curved");
    }
    if line.is_bump_out {
        out.push_str(";bump-out");
    }
    out
}

/// Fixed 4-decimal rendering, trailing zeros trimmed
fn format_number(value: f64) -> String {
    let text = format!("{value:.4}");
    let trimmed = text.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}
