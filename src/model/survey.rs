use serde::{Deserialize, Serialize};

/// Northing/easting/elevation triple in metres.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    #[serde(rename = "N")]
    pub northing: f64,
    #[serde(rename = "E")]
    pub easting: f64,
    #[serde(rename = "Z")]
    pub elevation: f64,
}

impl Coordinates {
    #[must_use]
    pub const fn new(northing: f64, easting: f64, elevation: f64) -> Self {
        Self {
            northing,
            easting,
            elevation,
        }
    }

    #[must_use]
    pub fn offset_by(self, offsets: Coordinates) -> Self {
        Self::new(
            self.northing - offsets.northing,
            self.easting - offsets.easting,
            self.elevation - offsets.elevation,
        )
    }

    #[must_use]
    pub fn restore(self, offsets: Coordinates) -> Self {
        Self::new(
            self.northing + offsets.northing,
            self.easting + offsets.easting,
            self.elevation + offsets.elevation,
        )
    }

    /// IFC axis order: x = easting, y = northing, z = elevation.
    #[must_use]
    pub fn to_xyz(self) -> [f64; 3] {
        [self.easting, self.northing, self.elevation]
    }

    #[must_use]
    pub fn from_xyz([x, y, z]: [f64; 3]) -> Self {
        Self::new(y, x, z)
    }

    #[must_use]
    pub fn is_finite(self) -> bool {
        self.northing.is_finite() && self.easting.is_finite() && self.elevation.is_finite()
    }

    /// `[N:1.000, E:2.000, Z:3.000]`
    #[must_use]
    pub fn label(self) -> String {
        format!(
            "[N:{:.3}, E:{:.3}, Z:{:.3}]",
            self.northing, self.easting, self.elevation
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SurveyPoint {
    pub id: String,
    pub coordinates: Coordinates,
    pub description: Option<String>,
}

impl SurveyPoint {
    #[must_use]
    pub fn new(id: impl Into<String>, northing: f64, easting: f64, elevation: f64) -> Self {
        Self {
            id: id.into(),
            coordinates: Coordinates::new(northing, easting, elevation),
            description: None,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_offsets_round_trip() {
        let original = Coordinates::new(6_650_100.25, 598_200.5, 12.0);
        let basepoint = Coordinates::new(6_650_000.0, 598_000.0, 10.0);

        let local = original.offset_by(basepoint);
        assert_eq!(local, Coordinates::new(100.25, 200.5, 2.0));
        assert_eq!(local.restore(basepoint), original);
    }

    #[test]
    fn test_axis_order() {
        let c = Coordinates::new(1.0, 2.0, 3.0);
        assert_eq!(c.to_xyz(), [2.0, 1.0, 3.0]);
        assert_eq!(Coordinates::from_xyz(c.to_xyz()), c);
    }

    #[test]
    fn test_label() {
        assert_eq!(
            Coordinates::new(1.0, -2.5, 0.1234).label(),
            "[N:1.000, E:-2.500, Z:0.123]"
        );
    }
}
