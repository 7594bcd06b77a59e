use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use photo_measure_core::{
    session_csv_string, Calibration, CsvExportConfig, EngineConfig, MeasureError,
    MeasurementEngine, Metrics, ShapeKind, Snapshot, Unit, ValidationReport,
};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Parser)]
#[command(name = "photo-measure")]
#[command(about = "Photo measurement CLI")]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Replay a session file and print its metrics as JSON.
    Measure {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// Engine configuration (JSON).
        #[arg(long)]
        config: Option<PathBuf>,
        /// Display unit: in, cm, mm, ft, yd or m.
        #[arg(long)]
        unit: Option<String>,
    },
    /// Replay a session file and write its CSV report.
    ExportCsv {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long)]
        unit: Option<String>,
        /// Write to this path instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Print CLI version.
    Version,
}

/// Session file as written by a host app
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SessionFile {
    /// Sequential taps, replayed through the tap flow
    pub taps: Vec<[f64; 2]>,
    /// Outline restored before the taps are replayed
    pub snapshot: Option<Snapshot>,
    pub calibration: Option<SessionCalibration>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum SessionCalibration {
    Reference {
        pixel_length: f64,
        known_length: f64,
        unit: Unit,
    },
    Manual { pixels_per_unit: f64, unit: Unit },
}

impl SessionCalibration {
    fn to_calibration(&self) -> Result<Calibration, MeasureError> {
        match self {
            SessionCalibration::Reference {
                pixel_length,
                known_length,
                unit,
            } => Calibration::from_reference(*pixel_length, *known_length, *unit),
            SessionCalibration::Manual {
                pixels_per_unit,
                unit,
            } => Calibration::manual(*pixels_per_unit, *unit),
        }
    }
}

#[derive(Debug, Serialize)]
struct MeasureOutput {
    shape: ShapeKind,
    calibrated: bool,
    pins: usize,
    lines: usize,
    metrics: Metrics,
    validation: ValidationReport,
}

pub fn run<I, T>(args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::parse_from(args);

    match cli.command {
        Commands::Measure { file, config, unit } => {
            run_measure(&file, config.as_deref(), unit.as_deref())
        }
        Commands::ExportCsv {
            file,
            config,
            unit,
            output,
        } => run_export_csv(&file, config.as_deref(), unit.as_deref(), output.as_deref()),
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn run_measure(file: &Path, config: Option<&Path>, unit: Option<&str>) -> Result<()> {
    let engine = replay_session(file, config, unit)?;

    let (metrics, calibrated) = match engine.metrics() {
        Ok(metrics) => (metrics, true),
        Err(MeasureError::Uncalibrated) => (engine.pixel_metrics(), false),
        Err(err) => return Err(err).context("failed to compute metrics"),
    };

    let payload = MeasureOutput {
        shape: engine.shape_kind(),
        calibrated,
        pins: engine.pins().len(),
        lines: engine.lines().len(),
        metrics,
        validation: engine.validate(),
    };

    let json = serde_json::to_string_pretty(&payload)?;
    println!("{json}");

    Ok(())
}

fn run_export_csv(
    file: &Path,
    config: Option<&Path>,
    unit: Option<&str>,
    output: Option<&Path>,
) -> Result<()> {
    let engine = replay_session(file, config, unit)?;
    let csv = session_csv_string(&engine, &CsvExportConfig::default())
        .context("failed to build CSV report")?;

    match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, csv)
                .with_context(|| format!("failed to write CSV to {}", path.display()))?;
            println!("{}", path.display());
        }
        None => print!("{csv}"),
    }

    Ok(())
}

/// Build an engine from a session file
pub fn replay_session(
    file: &Path,
    config: Option<&Path>,
    unit: Option<&str>,
) -> Result<MeasurementEngine> {
    ensure_file_exists(file)?;

    let config = match config {
        Some(path) => {
            ensure_file_exists(path)?;
            EngineConfig::from_file(path)
                .with_context(|| format!("failed to load config {}", path.display()))?
        }
        None => EngineConfig::default(),
    }
    .with_env_overrides()
    .context("invalid environment override")?;

    let contents = fs::read_to_string(file)
        .with_context(|| format!("failed to read session {}", file.display()))?;
    let session: SessionFile =
        serde_json::from_str(&contents).context("failed to parse session file")?;

    let mut engine = MeasurementEngine::with_config(config);

    if let Some(snapshot) = session.snapshot {
        engine
            .restore(snapshot)
            .context("failed to restore snapshot")?;
    }

    for [x, y] in &session.taps {
        engine
            .tap(*x, *y)
            .with_context(|| format!("failed to replay tap at ({x}, {y})"))?;
    }
    log::debug!(
        "replayed {} tap(s) from {}",
        session.taps.len(),
        file.display()
    );

    if let Some(calibration) = &session.calibration {
        // The first calibration also sets the display unit
        let calibration = calibration.to_calibration().context("invalid calibration")?;
        engine.set_calibration(calibration);
    }

    if let Some(unit) = unit {
        let unit: Unit = unit.parse().context("invalid --unit")?;
        engine.set_display_unit(unit);
    }

    Ok(engine)
}

fn ensure_file_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        anyhow::bail!("file does not exist: {}", path.display());
    }

    if !path.is_file() {
        anyhow::bail!("path is not a file: {}", path.display());
    }

    Ok(())
}
