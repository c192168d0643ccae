use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::builder::IfcBuilder;
use crate::config::ConversionConfig;
use crate::error::ExportError;
use crate::model::SurveyPoint;

#[derive(Debug, Clone, Serialize)]
pub struct ExportSummary {
    pub path: PathBuf,
    pub points: usize,
    pub entities: usize,
}

/// Builds the IFC model for `points` and writes it to `path`.
///
/// `source_name` is recorded in every point's property set.
pub fn export_ifc<P: AsRef<Path>>(
    points: &[SurveyPoint],
    config: &ConversionConfig,
    source_name: &str,
    path: P,
) -> Result<ExportSummary, ExportError> {
    if points.is_empty() {
        return Err(ExportError::NoPoints);
    }

    let mut builder = IfcBuilder::new(config, source_name);
    builder.create_project()?;
    for point in points {
        builder.add_survey_point(point)?;
    }

    let document = builder.finish()?;
    document.write(&path)?;

    Ok(ExportSummary {
        path: path.as_ref().to_path_buf(),
        points: points.len(),
        entities: document.entities().len(),
    })
}
