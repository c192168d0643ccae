use std::collections::HashSet;

use crate::model::SurveyPoint;

/// Largest plausible N or E spread within one survey, in metres.
pub const MAX_HORIZONTAL_RANGE: f64 = 100_000.0;
pub const MIN_ELEVATION: f64 = -1000.0;
pub const MAX_ELEVATION: f64 = 10_000.0;

/// Plausibility checks on a survey table.
///
/// Returns human-readable warnings; none of them stop a conversion.
#[must_use]
pub fn validate_points(points: &[SurveyPoint]) -> Vec<String> {
    let mut warnings = Vec::new();
    if points.is_empty() {
        return warnings;
    }

    let spread = |axis: fn(&SurveyPoint) -> f64| {
        let (min, max) = points
            .iter()
            .map(axis)
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            });
        max - min
    };
    let northing = spread(|p| p.coordinates.northing);
    let easting = spread(|p| p.coordinates.easting);
    if northing > MAX_HORIZONTAL_RANGE || easting > MAX_HORIZONTAL_RANGE {
        warnings.push(format!(
            "Large coordinate range detected (N {northing:.1} m, E {easting:.1} m), \
             verify coordinate system"
        ));
    }

    let elevations = points.iter().map(|p| p.coordinates.elevation);
    let low = elevations.clone().fold(f64::INFINITY, f64::min);
    let high = elevations.fold(f64::NEG_INFINITY, f64::max);
    if low < MIN_ELEVATION || high > MAX_ELEVATION {
        warnings.push(format!(
            "Unusual elevation values detected (Z from {low:.3} to {high:.3})"
        ));
    }

    let mut seen = HashSet::new();
    let duplicates = points
        .iter()
        .filter(|p| {
            let c = p.coordinates;
            !seen.insert([c.northing.to_bits(), c.easting.to_bits(), c.elevation.to_bits()])
        })
        .count();
    if duplicates > 0 {
        warnings.push(format!("{duplicates} duplicate coordinate points found"));
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_clean_survey() {
        let points = vec![
            SurveyPoint::new("1", 6_650_000.0, 598_000.0, 10.0),
            SurveyPoint::new("2", 6_650_500.0, 598_250.0, 12.5),
        ];
        assert!(validate_points(&points).is_empty());
        assert!(validate_points(&[]).is_empty());
    }

    #[test]
    fn test_large_range() {
        let points = vec![
            SurveyPoint::new("1", 6_650_000.0, 598_000.0, 10.0),
            SurveyPoint::new("2", 6_650_000.0, 798_000.0, 10.0),
        ];
        let warnings = validate_points(&points);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].starts_with("Large coordinate range detected"));
    }

    #[test]
    fn test_unusual_elevation() {
        let low = vec![SurveyPoint::new("1", 0.0, 0.0, -1500.0)];
        let high = vec![SurveyPoint::new("1", 0.0, 0.0, 12_000.0)];
        for points in [low, high] {
            let warnings = validate_points(&points);
            assert_eq!(warnings.len(), 1);
            assert!(warnings[0].starts_with("Unusual elevation values detected"));
        }
    }

    #[test]
    fn test_duplicate_points() {
        let points = vec![
            SurveyPoint::new("K1", 100.0, 200.0, 5.0),
            SurveyPoint::new("K2", 100.0, 200.0, 5.0),
            SurveyPoint::new("K3", 100.0, 200.0, 5.0),
            SurveyPoint::new("K4", 100.0, 200.0, 6.0),
        ];
        assert_eq!(validate_points(&points), ["2 duplicate coordinate points found"]);
    }
}
