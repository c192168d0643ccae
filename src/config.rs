//! Conversion settings.
//!
//! Defaults match a plain survey export; a JSON file can override any
//! subset of fields and CLI flags override the file.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;
use crate::model::Coordinates;
use crate::step::HeaderInfo;

/// How source coordinates map into the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CoordinateSystem {
    /// Subtract the basepoint so the model sits near the origin.
    #[default]
    Local,
    /// Keep the surveyed coordinates as they are.
    Global,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MarkerColor {
    #[default]
    Red,
    Magenta,
    Teal,
    Gray,
    Yellow,
}

impl MarkerColor {
    #[must_use]
    pub const fn rgb(self) -> (f64, f64, f64) {
        match self {
            Self::Red => (1.0, 0.0, 0.0),
            Self::Magenta => (1.0, 0.0, 1.0),
            Self::Teal => (0.0, 0.5, 0.5),
            Self::Gray => (0.5, 0.5, 0.5),
            Self::Yellow => (1.0, 1.0, 0.0),
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Red => "Red",
            Self::Magenta => "Magenta",
            Self::Teal => "Teal",
            Self::Gray => "Gray",
            Self::Yellow => "Yellow",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MarkerSettings {
    pub color: MarkerColor,
    /// Marker height in metres.
    pub height: f64,
    /// Marker diameter in metres.
    pub diameter: f64,
}

impl Default for MarkerSettings {
    fn default() -> Self {
        Self {
            color: MarkerColor::Red,
            height: 0.5,
            diameter: 0.2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CustomProperty {
    pub name: String,
    pub value: String,
}

impl CustomProperty {
    fn new(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConversionConfig {
    pub project_name: String,
    pub site_name: String,
    pub building_name: String,
    pub storey_name: String,
    pub coord_system: CoordinateSystem,
    pub basepoint: Coordinates,
    pub pset_name: String,
    pub creator_name: String,
    pub organization: String,
    pub external_link: Option<String>,
    pub custom_properties: Vec<CustomProperty>,
    pub marker: MarkerSettings,
    pub verify_coordinates: bool,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            project_name: "Survey Project".to_string(),
            site_name: "Project Site".to_string(),
            building_name: "Survey Building".to_string(),
            storey_name: "Survey Level".to_string(),
            coord_system: CoordinateSystem::Local,
            basepoint: Coordinates::default(),
            pset_name: "NOSC_SiteCast".to_string(),
            creator_name: "SiteCast User".to_string(),
            organization: "SiteCast".to_string(),
            external_link: None,
            custom_properties: vec![
                CustomProperty::new("Coordinate_System", "EUREF89_NTM10"),
                CustomProperty::new("Survey_Method", "Total_Station"),
                CustomProperty::new("Accuracy_Class", "Class_1"),
            ],
            marker: MarkerSettings::default(),
            verify_coordinates: true,
        }
    }
}

impl ConversionConfig {
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&content).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        tracing::debug!(path = %path.display(), "Loaded conversion config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = |value: f64| value.is_finite() && value > 0.0;
        if !positive(self.marker.height) || !positive(self.marker.diameter) {
            return Err(ConfigError::Invalid {
                message: format!(
                    "marker size must be positive, got {} x {}",
                    self.marker.diameter, self.marker.height
                ),
            });
        }
        if !self.basepoint.is_finite() {
            return Err(ConfigError::Invalid {
                message: "basepoint must be finite".to_string(),
            });
        }
        if self.pset_name.trim().is_empty() {
            return Err(ConfigError::Invalid {
                message: "pset_name must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Amount subtracted from every source coordinate.
    #[must_use]
    pub fn offsets(&self) -> Coordinates {
        match self.coord_system {
            CoordinateSystem::Local => self.basepoint,
            CoordinateSystem::Global => Coordinates::default(),
        }
    }

    #[must_use]
    pub fn header(&self) -> HeaderInfo {
        HeaderInfo {
            authors: vec![self.creator_name.clone()],
            organizations: vec![self.organization.clone()],
            ..HeaderInfo::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(
            br#"{
                "project_name": "Fjordbyen",
                "basepoint": { "N": 6650000.0, "E": 598000.0, "Z": 0.0 },
                "marker": { "color": "Teal" }
            }"#,
        )
        .unwrap();

        let config = ConversionConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.project_name, "Fjordbyen");
        assert_eq!(config.site_name, "Project Site");
        assert_eq!(config.marker.color, MarkerColor::Teal);
        assert_eq!(config.marker.height, 0.5);
        assert_eq!(config.offsets(), Coordinates::new(6_650_000.0, 598_000.0, 0.0));
        assert_eq!(config.custom_properties.len(), 3);
    }

    #[test]
    fn test_global_ignores_basepoint() {
        let config = ConversionConfig {
            coord_system: CoordinateSystem::Global,
            basepoint: Coordinates::new(1.0, 2.0, 3.0),
            ..ConversionConfig::default()
        };
        assert_eq!(config.offsets(), Coordinates::default());
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(br#"{ "project_nam": "typo" }"#).unwrap();
        let err = ConversionConfig::from_json_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Json { .. }));
    }

    #[test]
    fn test_invalid_marker_size() {
        let mut config = ConversionConfig::default();
        config.marker.height = 0.0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn test_header_uses_creator() {
        let config = ConversionConfig {
            creator_name: "Kari Nordmann".to_string(),
            ..ConversionConfig::default()
        };
        let header = config.header();
        assert_eq!(header.authors, ["Kari Nordmann"]);
        assert_eq!(header.schema, "IFC4");
    }

    #[test]
    fn test_missing_file() {
        let err = ConversionConfig::from_json_file("/nonexistent/sitecast.json").unwrap_err();
        assert!(matches!(err, ConfigError::FileRead { .. }));
    }
}
