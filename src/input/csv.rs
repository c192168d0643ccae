use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::InputError;
use crate::model::SurveyPoint;

// Accepted header spellings per column, compared after upper-casing.
const NORTHING: &[&str] = &["N", "NORTHING", "NORTH", "Y", "LATITUDE", "LAT"];
const EASTING: &[&str] = &["E", "EASTING", "EAST", "X", "LONGITUDE", "LON", "LONG"];
const ELEVATION: &[&str] = &["Z", "ELEVATION", "ELEV", "HEIGHT", "H", "ALT", "ALTITUDE"];
const POINT_ID: &[&str] = &["ID", "POINT_ID", "POINTID", "NAME", "NUMBER", "NUM", "PT"];
const DESCRIPTION: &[&str] = &["DESCRIPTION", "DESC", "NOTE", "COMMENT", "REMARKS", "TYPE"];

/// Reads survey points from a CSV file with a header row.
pub fn read_survey_csv<P: AsRef<Path>>(
    path: P,
    delimiter: u8,
) -> Result<Vec<SurveyPoint>, InputError> {
    let path_ref = path.as_ref();
    let file = File::open(path_ref).map_err(|source| InputError::FileRead {
        path: path_ref.to_path_buf(),
        source,
    })?;
    let points = read_survey_points(file, delimiter)?;
    tracing::info!(path = %path_ref.display(), points = points.len(), "Read survey points");
    Ok(points)
}

/// Reads survey points from any CSV source.
///
/// N, E and Z columns are required. Rows without an id get `PT<row>`;
/// blank rows are skipped.
pub fn read_survey_points<R: Read>(
    source: R,
    delimiter: u8,
) -> Result<Vec<SurveyPoint>, InputError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(source);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.to_ascii_uppercase().replace([' ', '-'], "_"))
        .collect();

    let northing = required_column(&headers, NORTHING, "N")?;
    let easting = required_column(&headers, EASTING, "E")?;
    let elevation = required_column(&headers, ELEVATION, "Z")?;
    let point_id = find_column(&headers, POINT_ID);
    let description = find_column(&headers, DESCRIPTION);

    let mut points = Vec::new();
    for record in reader.records() {
        let record = record?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        let line = record.position().map_or(0, csv::Position::line);
        let field = |index: usize| record.get(index).unwrap_or("");

        let id = point_id
            .map(field)
            .filter(|id| !id.is_empty())
            .map_or_else(|| format!("PT{}", points.len() + 1), str::to_string);

        let mut point = SurveyPoint::new(
            id,
            parse_number(field(northing), line, "N")?,
            parse_number(field(easting), line, "E")?,
            parse_number(field(elevation), line, "Z")?,
        );
        if let Some(text) = description.map(field).filter(|d| !d.is_empty()) {
            point = point.with_description(text);
        }
        points.push(point);
    }

    Ok(points)
}

fn required_column(
    headers: &[String],
    aliases: &[&str],
    column: &'static str,
) -> Result<usize, InputError> {
    find_column(headers, aliases).ok_or(InputError::MissingColumn { column })
}

fn find_column(headers: &[String], aliases: &[&str]) -> Option<usize> {
    aliases
        .iter()
        .find_map(|alias| headers.iter().position(|h| h == alias))
}

fn parse_number(value: &str, line: u64, column: &'static str) -> Result<f64, InputError> {
    // Decimal commas show up in ';'-separated exports.
    value
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| InputError::InvalidNumber {
            line,
            column,
            value: value.to_string(),
        })
}
