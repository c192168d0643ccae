use clap::Parser;
use color_eyre::eyre::{bail, WrapErr};
use color_eyre::Result;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use sitecast::config::{ConversionConfig, CoordinateSystem};
use sitecast::export::{export_ifc, export_report_csv, export_report_json};
use sitecast::input::{read_survey_csv, validate_points};
use sitecast::model::Coordinates;
use sitecast::verify::verify_ifc_coordinates;

#[derive(Parser, Debug)]
#[command(name = "sitecast")]
#[command(about = "SiteCast - convert survey points into IFC4 markers")]
#[command(version)]
struct Args {
    /// Path to CSV file with survey points
    #[arg(required = true)]
    input: PathBuf,

    /// Output IFC path (defaults to <project>_survey_points.ifc)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// JSON configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override the project name
    #[arg(long)]
    project_name: Option<String>,

    /// Basepoint subtracted from every point
    #[arg(long, num_args = 3, value_names = ["N", "E", "Z"], allow_negative_numbers = true)]
    basepoint: Option<Vec<f64>>,

    /// Keep surveyed coordinates instead of moving them near the origin
    #[arg(long)]
    global: bool,

    /// CSV field delimiter
    #[arg(long, default_value_t = ',')]
    delimiter: char,

    /// Write the verification report as JSON
    #[arg(long, value_name = "FILE")]
    json_report: Option<PathBuf>,

    /// Write the verification report as CSV
    #[arg(long, value_name = "FILE")]
    csv_report: Option<PathBuf>,

    /// Skip reading the file back for coordinate checks
    #[arg(long)]
    no_verify: bool,

    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn load_config(&self) -> Result<ConversionConfig> {
        let mut config = match &self.config {
            Some(path) => ConversionConfig::from_json_file(path)?,
            None => ConversionConfig::default(),
        };

        if let Some(name) = &self.project_name {
            config.project_name.clone_from(name);
        }
        if let Some([n, e, z]) = self.basepoint.as_deref() {
            config.basepoint = Coordinates::new(*n, *e, *z);
        }
        if self.global {
            config.coord_system = CoordinateSystem::Global;
        }
        if self.no_verify {
            config.verify_coordinates = false;
        }
        config.validate()?;
        Ok(config)
    }

    fn output_path(&self, config: &ConversionConfig) -> PathBuf {
        self.output.clone().unwrap_or_else(|| {
            PathBuf::from(format!(
                "{}_survey_points.ifc",
                config.project_name.replace(' ', "_")
            ))
        })
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    init_tracing(args.verbose);

    let Ok(delimiter) = u8::try_from(args.delimiter) else {
        bail!("delimiter must be a single ASCII character, got '{}'", args.delimiter);
    };
    let config = args.load_config()?;
    let output = args.output_path(&config);

    let points = read_survey_csv(&args.input, delimiter)
        .wrap_err_with(|| format!("reading {}", args.input.display()))?;
    for warning in validate_points(&points) {
        tracing::warn!("{warning}");
    }
    let source_name = args.input.file_name().map_or_else(
        || args.input.display().to_string(),
        |n| n.to_string_lossy().into_owned(),
    );

    let summary = export_ifc(&points, &config, &source_name, &output)?;
    println!(
        "Wrote {} survey points ({} entities) to {}",
        summary.points,
        summary.entities,
        summary.path.display()
    );

    if !config.verify_coordinates {
        return Ok(());
    }

    let checks = verify_ifc_coordinates(&output, &points, config.offsets())?;
    let failed: Vec<_> = checks.iter().filter(|c| !c.all_match).collect();
    if failed.is_empty() {
        println!("Verified {} points: all within tolerance", checks.len());
    } else {
        println!("Verified {} points: {} mismatched", checks.len(), failed.len());
        for check in &failed {
            match check.calculated {
                Some(calculated) => println!(
                    "  {}: expected {}, found {}",
                    check.point_id,
                    check.original.label(),
                    calculated.label()
                ),
                None => println!("  {}: no marker found in the file", check.point_id),
            }
        }
    }

    if let Some(path) = &args.csv_report {
        export_report_csv(&checks, path)?;
        println!("Exported report to CSV: {}", path.display());
    }
    if let Some(path) = &args.json_report {
        export_report_json(&checks, path)?;
        println!("Exported report to JSON: {}", path.display());
    }

    if !failed.is_empty() {
        bail!("{} of {} points failed verification", failed.len(), checks.len());
    }
    Ok(())
}
