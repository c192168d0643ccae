use crate::error::ExportError;
use crate::model::Coordinates;
use crate::verify::PointCheck;
use std::fs::File;
use std::path::Path;

/// Writes verification results as one CSV row per point.
pub fn export_report_csv<P: AsRef<Path>>(
    checks: &[PointCheck],
    path: P,
) -> Result<(), ExportError> {
    let path_ref = path.as_ref();
    let file = File::create(path_ref).map_err(|source| ExportError::FileCreate {
        path: path_ref.to_path_buf(),
        source,
    })?;

    let mut writer = csv::Writer::from_writer(file);

    writer.write_record([
        "Point ID",
        "Original N",
        "Original E",
        "Original Z",
        "Calculated N",
        "Calculated E",
        "Calculated Z",
        "Match",
    ])?;

    for check in checks {
        // Calculated cells stay empty when no marker was found.
        let calculated = |axis: fn(&Coordinates) -> f64| {
            check
                .calculated
                .as_ref()
                .map_or_else(String::new, |c| format!("{:.3}", axis(c)))
        };
        writer.write_record([
            check.point_id.clone(),
            format!("{:.3}", check.original.northing),
            format!("{:.3}", check.original.easting),
            format!("{:.3}", check.original.elevation),
            calculated(|c| c.northing),
            calculated(|c| c.easting),
            calculated(|c| c.elevation),
            match (check.has_marker(), check.all_match) {
                (false, _) => "Missing",
                (true, true) => "Yes",
                (true, false) => "No",
            }
            .to_string(),
        ])?;
    }

    writer.flush().map_err(|e| ExportError::WriteFailed {
        message: e.to_string(),
    })?;

    Ok(())
}
