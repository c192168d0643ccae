use crate::error::ExportError;
use crate::verify::PointCheck;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes verification results as pretty-printed JSON.
pub fn export_report_json<P: AsRef<Path>>(
    checks: &[PointCheck],
    path: P,
) -> Result<(), ExportError> {
    let path_ref = path.as_ref();
    let json = serde_json::to_string_pretty(checks)?;

    let mut file = File::create(path_ref).map_err(|source| ExportError::FileCreate {
        path: path_ref.to_path_buf(),
        source,
    })?;

    file.write_all(json.as_bytes())
        .map_err(|e| ExportError::WriteFailed {
            message: e.to_string(),
        })?;

    Ok(())
}
