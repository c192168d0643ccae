//! Read a written IFC file back and check the marker positions.

use serde::Serialize;
use std::collections::{HashMap, VecDeque};
use std::path::Path;

use crate::error::VerifyError;
use crate::model::{Coordinates, SurveyPoint};
use crate::step::{StepEntity, StepFile};

/// Allowed difference per axis, in metres.
pub const TOLERANCE: f64 = 0.001;

const NAME_PREFIX: &str = "Survey Point ";

#[derive(Debug, Clone, Serialize)]
pub struct AxisMatch {
    #[serde(rename = "N")]
    pub northing: bool,
    #[serde(rename = "E")]
    pub easting: bool,
    #[serde(rename = "Z")]
    pub elevation: bool,
}

/// Result for one source point.
///
/// `calculated` and `local` are `None` when the file has no marker for the
/// point.
#[derive(Debug, Clone, Serialize)]
pub struct PointCheck {
    pub point_id: String,
    pub original: Coordinates,
    pub calculated: Option<Coordinates>,
    pub local: Option<Coordinates>,
    pub matches: AxisMatch,
    pub all_match: bool,
}

impl PointCheck {
    fn missing(point: &SurveyPoint) -> Self {
        Self {
            point_id: point.id.clone(),
            original: point.coordinates,
            calculated: None,
            local: None,
            matches: AxisMatch {
                northing: false,
                easting: false,
                elevation: false,
            },
            all_match: false,
        }
    }

    fn placed(point: &SurveyPoint, local: Coordinates, offsets: Coordinates) -> Self {
        let original = point.coordinates;
        let calculated = local.restore(offsets);
        let close = |a: f64, b: f64| (a - b).abs() < TOLERANCE;
        let matches = AxisMatch {
            northing: close(calculated.northing, original.northing),
            easting: close(calculated.easting, original.easting),
            elevation: close(calculated.elevation, original.elevation),
        };
        let all_match = matches.northing && matches.easting && matches.elevation;

        Self {
            point_id: point.id.clone(),
            original,
            calculated: Some(calculated),
            local: Some(local),
            matches,
            all_match,
        }
    }

    #[must_use]
    pub fn has_marker(&self) -> bool {
        self.calculated.is_some()
    }
}

/// Compares the `Survey Point <id>` proxies in `path` with `points`.
///
/// Local placement coordinates are shifted back by `offsets` before the
/// comparison. Returns one check per source point, in input order.
pub fn verify_ifc_coordinates<P: AsRef<Path>>(
    path: P,
    points: &[SurveyPoint],
    offsets: Coordinates,
) -> Result<Vec<PointCheck>, VerifyError> {
    let file = StepFile::open(path)?;
    Ok(check_points(&file, points, offsets))
}

/// Markers are paired with source points by id. Repeated ids pair up in
/// entity order, which is the order the points were added in.
#[must_use]
pub fn check_points(
    file: &StepFile,
    points: &[SurveyPoint],
    offsets: Coordinates,
) -> Vec<PointCheck> {
    let mut markers: HashMap<&str, VecDeque<Coordinates>> = HashMap::new();
    for proxy in file.get_entities_by_type("IFCBUILDINGELEMENTPROXY") {
        let Some(point_id) = proxy
            .string(2)
            .and_then(|name| name.strip_prefix(NAME_PREFIX))
        else {
            continue;
        };
        match placement_location(file, proxy) {
            Some(local) => markers.entry(point_id).or_default().push_back(local),
            None => tracing::warn!(
                point = point_id,
                proxy = %proxy.id,
                "Survey point has no readable placement"
            ),
        }
    }

    let results: Vec<PointCheck> = points
        .iter()
        .map(|point| {
            match markers.get_mut(point.id.as_str()).and_then(VecDeque::pop_front) {
                Some(local) => PointCheck::placed(point, local, offsets),
                None => PointCheck::missing(point),
            }
        })
        .collect();

    let missing = results.iter().filter(|r| !r.has_marker()).count();
    let failed = results.iter().filter(|r| !r.all_match).count();
    tracing::info!(
        checked = results.len(),
        failed,
        missing,
        "Verified survey point coordinates"
    );
    results
}

/// Proxy -> IfcLocalPlacement -> IfcAxis2Placement3D -> IfcCartesianPoint.
fn placement_location(file: &StepFile, proxy: &StepEntity) -> Option<Coordinates> {
    let placement = file.get_entity(proxy.reference(5)?)?;
    let axis = file.get_entity(placement.reference(1)?)?;
    let point = file.get_entity(axis.reference(0)?)?;
    let coords = point.values.first()?.as_list()?;

    match coords {
        [x, y, z] => Some(Coordinates::from_xyz([x.as_real()?, y.as_real()?, z.as_real()?])),
        [x, y] => Some(Coordinates::from_xyz([x.as_real()?, y.as_real()?, 0.0])),
        _ => None,
    }
}
