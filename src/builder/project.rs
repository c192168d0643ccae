use super::marker::MarkerTemplate;
use super::properties::{add_property_set, PointProperties};
use crate::config::ConversionConfig;
use crate::error::BuildError;
use crate::model::SurveyPoint;
use crate::step::{create_guid, Attributes, EntityId, IfcWriter, StepDocument, StepValue};

/// Ids of the shared entities created by [`IfcBuilder::create_project`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hierarchy {
    pub project: EntityId,
    pub site: EntityId,
    pub building: EntityId,
    pub storey: EntityId,
    pub storey_placement: EntityId,
    pub context: EntityId,
    pub body_context: EntityId,
    pub world_placement: EntityId,
    pub z_axis: EntityId,
    pub metre: EntityId,
}

/// Builds an IFC4 file with one marker per survey point.
///
/// Entities are created dependencies-first, so every reference points
/// backwards in the DATA section.
///
/// # Example
///
/// ```
/// use sitecast::builder::IfcBuilder;
/// use sitecast::config::ConversionConfig;
/// use sitecast::model::SurveyPoint;
///
/// let config = ConversionConfig::default();
/// let mut builder = IfcBuilder::new(&config, "survey.csv");
/// builder.create_project()?;
/// builder.add_survey_point(&SurveyPoint::new("A1", 100.0, 200.0, 3.5))?;
/// let document = builder.finish()?;
/// assert!(!document.entities().is_empty());
/// # Ok::<(), sitecast::error::BuildError>(())
/// ```
#[derive(Debug)]
pub struct IfcBuilder {
    writer: IfcWriter,
    config: ConversionConfig,
    source_name: String,
    hierarchy: Option<Hierarchy>,
    marker: Option<MarkerTemplate>,
    point_count: usize,
}

impl IfcBuilder {
    #[must_use]
    pub fn new(config: &ConversionConfig, source_name: impl Into<String>) -> Self {
        Self {
            writer: IfcWriter::new().with_header(config.header()),
            config: config.clone(),
            source_name: source_name.into(),
            hierarchy: None,
            marker: None,
            point_count: 0,
        }
    }

    #[must_use]
    pub fn hierarchy(&self) -> Option<&Hierarchy> {
        self.hierarchy.as_ref()
    }

    #[must_use]
    pub fn point_count(&self) -> usize {
        self.point_count
    }

    /// Units, contexts, project, site, building and storey.
    pub fn create_project(&mut self) -> Result<&mut Self, BuildError> {
        if self.hierarchy.is_some() {
            return Err(BuildError::ProjectAlreadyCreated);
        }
        let config = &self.config;
        let w = &mut self.writer;

        let metre = w.add_entity(
            "IfcSIUnit",
            Attributes::new()
                .with("Dimensions", StepValue::Derived)
                .with("UnitType", StepValue::enumeration("LENGTHUNIT"))
                .with("Name", StepValue::enumeration("METRE")),
        );
        let units = w.add_entity("IfcUnitAssignment", Attributes::new().with("Units", vec![metre]));

        let origin = w.add_entity(
            "IfcCartesianPoint",
            Attributes::new().with("Coordinates", vec![0.0, 0.0, 0.0]),
        );
        let z_axis = w.add_entity(
            "IfcDirection",
            Attributes::new().with("DirectionRatios", vec![0.0, 0.0, 1.0]),
        );
        let x_axis = w.add_entity(
            "IfcDirection",
            Attributes::new().with("DirectionRatios", vec![1.0, 0.0, 0.0]),
        );
        let world_placement = w.add_entity(
            "IfcAxis2Placement3D",
            Attributes::new()
                .with("Location", origin)
                .with("Axis", z_axis)
                .with("RefDirection", x_axis),
        );

        let context = w.add_entity(
            "IfcGeometricRepresentationContext",
            Attributes::new()
                .with("ContextType", "Model")
                .with("CoordinateSpaceDimension", 3)
                .with("Precision", 1.0e-5)
                .with("WorldCoordinateSystem", world_placement),
        );
        let body_context = w.add_entity(
            "IfcGeometricRepresentationSubContext",
            Attributes::new()
                .with("ContextIdentifier", "Body")
                .with("ContextType", "Model")
                .with("CoordinateSpaceDimension", StepValue::Derived)
                .with("Precision", StepValue::Derived)
                .with("WorldCoordinateSystem", StepValue::Derived)
                .with("TrueNorth", StepValue::Derived)
                .with("ParentContext", context)
                .with("TargetView", StepValue::enumeration("MODEL_VIEW")),
        );

        let project = w.add_entity(
            "IfcProject",
            Attributes::new()
                .with("GlobalId", create_guid())
                .with("Name", config.project_name.as_str())
                .with("RepresentationContexts", vec![context])
                .with("UnitsInContext", units),
        );

        let site_placement = local_placement(w, None, world_placement);
        let site = w.add_entity(
            "IfcSite",
            spatial(&config.site_name, site_placement),
        );
        let building_placement = local_placement(w, Some(site_placement), world_placement);
        let building = w.add_entity(
            "IfcBuilding",
            spatial(&config.building_name, building_placement),
        );
        let storey_placement = local_placement(w, Some(building_placement), world_placement);
        let storey = w.add_entity(
            "IfcBuildingStorey",
            spatial(&config.storey_name, storey_placement).with("Elevation", 0.0),
        );

        let hierarchy = Hierarchy {
            project,
            site,
            building,
            storey,
            storey_placement,
            context,
            body_context,
            world_placement,
            z_axis,
            metre,
        };

        self.aggregate(project, site)?;
        self.aggregate(site, building)?;
        self.aggregate(building, storey)?;

        tracing::debug!(
            project = %project,
            storey = %storey,
            entities = self.writer.len(),
            "Created project hierarchy"
        );
        self.hierarchy = Some(hierarchy);
        Ok(self)
    }

    /// Places one marker with its property set in the storey.
    ///
    /// Returns the id of the `IfcBuildingElementProxy`.
    pub fn add_survey_point(&mut self, point: &SurveyPoint) -> Result<EntityId, BuildError> {
        let hierarchy = self.hierarchy.ok_or(BuildError::ProjectNotCreated)?;
        if !point.coordinates.is_finite() {
            return Err(BuildError::NonFiniteCoordinate {
                point_id: point.id.clone(),
            });
        }

        let local = point.coordinates.offset_by(self.config.offsets());

        let location = self.writer.add_entity(
            "IfcCartesianPoint",
            Attributes::new().with("Coordinates", local.to_xyz().to_vec()),
        );
        let axis = self.writer.add_entity(
            "IfcAxis2Placement3D",
            Attributes::new().with("Location", location),
        );
        let placement = local_placement(&mut self.writer, Some(hierarchy.storey_placement), axis);

        let marker = self.marker.get_or_insert_with(|| {
            MarkerTemplate::create(&mut self.writer, &hierarchy, &self.config.marker)
        });
        let shape = marker.instance(&mut self.writer);

        let proxy = self.writer.add_entity(
            "IfcBuildingElementProxy",
            Attributes::new()
                .with("GlobalId", create_guid())
                .with("Name", format!("Survey Point {}", point.id))
                .with("Description", point.description.clone())
                .with("ObjectType", "Survey Point")
                .with("ObjectPlacement", placement)
                .with("Representation", shape)
                .with("Tag", point.id.as_str())
                .with("PredefinedType", StepValue::enumeration("USERDEFINED")),
        );
        marker.elements.push(proxy);

        let storey = self.ensure(hierarchy.storey)?;
        self.writer.add_entity(
            "IfcRelContainedInSpatialStructure",
            Attributes::new()
                .with("GlobalId", create_guid())
                .with("RelatedElements", vec![proxy])
                .with("RelatingStructure", storey),
        );

        let props = PointProperties {
            config: &self.config,
            source_name: &self.source_name,
            metre: hierarchy.metre,
            point,
            local,
        };
        add_property_set(&mut self.writer, proxy, &props);

        self.point_count += 1;
        tracing::debug!(point = %point.id, proxy = %proxy, "Added survey point");
        Ok(proxy)
    }

    /// Closes open relations and freezes the entity graph.
    pub fn finish(mut self) -> Result<StepDocument, BuildError> {
        if let Some(marker) = self.marker.take() {
            let material = self.ensure(marker.material)?;
            self.writer.add_entity(
                "IfcRelAssociatesMaterial",
                Attributes::new()
                    .with("GlobalId", create_guid())
                    .with("Name", format!("{} Markers", marker.color.name()))
                    .with("RelatedObjects", marker.elements)
                    .with("RelatingMaterial", material),
            );
        }

        tracing::debug!(
            points = self.point_count,
            entities = self.writer.len(),
            "Finished entity graph"
        );
        Ok(self.writer.finish())
    }

    fn aggregate(&mut self, relating: EntityId, related: EntityId) -> Result<EntityId, BuildError> {
        let relating = self.ensure(relating)?;
        let related = self.ensure(related)?;
        Ok(self.writer.add_entity(
            "IfcRelAggregates",
            Attributes::new()
                .with("GlobalId", create_guid())
                .with("RelatingObject", relating)
                .with("RelatedObjects", vec![related]),
        ))
    }

    /// The writer does not check references; relations built here do.
    fn ensure(&self, id: EntityId) -> Result<EntityId, BuildError> {
        if self.writer.contains(id) {
            Ok(id)
        } else {
            Err(BuildError::DanglingReference { id })
        }
    }
}

fn local_placement(
    writer: &mut IfcWriter,
    relative_to: Option<EntityId>,
    axis: EntityId,
) -> EntityId {
    writer.add_entity(
        "IfcLocalPlacement",
        Attributes::new()
            .with("PlacementRelTo", relative_to)
            .with("RelativePlacement", axis),
    )
}

fn spatial(name: &str, placement: EntityId) -> Attributes {
    Attributes::new()
        .with("GlobalId", create_guid())
        .with("Name", name)
        .with("ObjectPlacement", placement)
        .with("CompositionType", StepValue::enumeration("ELEMENT"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CoordinateSystem;
    use crate::model::Coordinates;
    use crate::step::{StepEntity, StepFile};
    use pretty_assertions::assert_eq;

    fn parse(document: &StepDocument) -> StepFile {
        let text = document.render("test.ifc", "2024-05-01T12:00:00").unwrap();
        StepFile::parse(&text).unwrap()
    }

    fn single<'a>(file: &'a StepFile, entity_type: &str) -> &'a StepEntity {
        let found = file.get_entities_by_type(entity_type);
        assert_eq!(found.len(), 1, "{entity_type}");
        found[0]
    }

    #[test]
    fn test_hierarchy_is_aggregated() {
        let mut builder = IfcBuilder::new(&ConversionConfig::default(), "points.csv");
        builder.create_project().unwrap();
        let ids = *builder.hierarchy().unwrap();
        let file = parse(&builder.finish().unwrap());

        let pairs: Vec<(EntityId, EntityId)> = file
            .get_entities_by_type("IFCRELAGGREGATES")
            .iter()
            .map(|rel| {
                let related = rel.values[5].as_list().unwrap();
                assert_eq!(related.len(), 1);
                (rel.reference(4).unwrap(), related[0].as_reference().unwrap())
            })
            .collect();
        assert_eq!(
            pairs,
            [
                (ids.project, ids.site),
                (ids.site, ids.building),
                (ids.building, ids.storey),
            ]
        );

        let project = single(&file, "IFCPROJECT");
        assert_eq!(project.string(2), Some("Survey Project"));
        assert_eq!(project.values.len(), 9);
        assert_eq!(single(&file, "IFCBUILDINGSTOREY").string(2), Some("Survey Level"));

        let unit = single(&file, "IFCSIUNIT");
        assert_eq!(unit.values[0], StepValue::Derived);
        assert_eq!(unit.values[3], StepValue::enumeration("METRE"));
    }

    #[test]
    fn test_references_point_backwards() {
        fn refs(value: &StepValue, out: &mut Vec<EntityId>) {
            match value {
                StepValue::Reference(id) => out.push(*id),
                StepValue::List(items) => items.iter().for_each(|v| refs(v, out)),
                _ => {}
            }
        }

        let mut builder = IfcBuilder::new(&ConversionConfig::default(), "points.csv");
        builder.create_project().unwrap();
        builder
            .add_survey_point(&SurveyPoint::new("A1", 10.0, 20.0, 1.0))
            .unwrap();
        let document = builder.finish().unwrap();
        let file = parse(&document);

        for entity in file.entities.values() {
            let mut targets = Vec::new();
            entity.values.iter().for_each(|v| refs(v, &mut targets));
            for target in targets {
                assert!(target < entity.id, "{} -> {}", entity.id, target);
                assert!(file.get_entity(target).is_some());
            }
        }
    }

    #[test]
    fn test_survey_point_uses_local_coordinates() {
        let config = ConversionConfig {
            basepoint: Coordinates::new(6_650_000.0, 598_000.0, 10.0),
            ..ConversionConfig::default()
        };
        let mut builder = IfcBuilder::new(&config, "points.csv");
        builder.create_project().unwrap();
        let point = SurveyPoint::new("A1", 6_650_100.25, 598_200.5, 12.0).with_description("Kum");
        let proxy_id = builder.add_survey_point(&point).unwrap();
        let file = parse(&builder.finish().unwrap());

        let proxy = file.get_entity(proxy_id).unwrap();
        assert_eq!(proxy.entity_type, "IFCBUILDINGELEMENTPROXY");
        assert_eq!(proxy.string(2), Some("Survey Point A1"));
        assert_eq!(proxy.string(3), Some("Kum"));
        assert_eq!(proxy.string(7), Some("A1"));

        let placement = file.get_entity(proxy.reference(5).unwrap()).unwrap();
        let axis = file.get_entity(placement.reference(1).unwrap()).unwrap();
        let point = file.get_entity(axis.reference(0).unwrap()).unwrap();
        assert_eq!(
            point.values[0],
            StepValue::List(vec![
                StepValue::Real(200.5),
                StepValue::Real(100.25),
                StepValue::Real(2.0),
            ])
        );
    }

    #[test]
    fn test_property_set_contents() {
        let mut config = ConversionConfig {
            external_link: Some("https://example.com/report".to_string()),
            ..ConversionConfig::default()
        };
        config.custom_properties.push(crate::config::CustomProperty {
            name: "Survey Crew".to_string(),
            value: "North".to_string(),
        });
        config.custom_properties.push(crate::config::CustomProperty {
            name: "Empty".to_string(),
            value: String::new(),
        });

        let mut builder = IfcBuilder::new(&config, "points.csv");
        builder.create_project().unwrap();
        builder
            .add_survey_point(&SurveyPoint::new("B7", 1.0, 2.0, 3.0))
            .unwrap();
        let file = parse(&builder.finish().unwrap());

        let pset = single(&file, "IFCPROPERTYSET");
        assert_eq!(pset.string(2), Some("NOSC_SiteCast"));
        let names: Vec<&str> = pset.values[4]
            .as_list()
            .unwrap()
            .iter()
            .map(|v| {
                let prop = file.get_entity(v.as_reference().unwrap()).unwrap();
                prop.string(0).unwrap()
            })
            .collect();
        assert_eq!(
            names,
            [
                "Source",
                "Created_By",
                "Point_ID",
                "Northing_Y",
                "Easting_X",
                "Altitude_Z",
                "Offsets",
                "Local_Coordinates",
                "Coordinate_System",
                "Survey_Method",
                "Accuracy_Class",
                "Survey_Crew",
                "External_Link",
            ]
        );

        let rel = single(&file, "IFCRELDEFINESBYPROPERTIES");
        assert_eq!(rel.reference(5), Some(pset.id));
    }

    #[test]
    fn test_markers_share_material() {
        let config = ConversionConfig {
            coord_system: CoordinateSystem::Global,
            ..ConversionConfig::default()
        };
        let mut builder = IfcBuilder::new(&config, "points.csv");
        builder.create_project().unwrap();
        let a = builder.add_survey_point(&SurveyPoint::new("1", 0.0, 0.0, 0.0)).unwrap();
        let b = builder.add_survey_point(&SurveyPoint::new("2", 1.0, 1.0, 0.0)).unwrap();
        assert_eq!(builder.point_count(), 2);
        let file = parse(&builder.finish().unwrap());

        assert_eq!(file.get_entities_by_type("IFCEXTRUDEDAREASOLID").len(), 1);
        assert_eq!(file.get_entities_by_type("IFCPRODUCTDEFINITIONSHAPE").len(), 2);

        let rel = single(&file, "IFCRELASSOCIATESMATERIAL");
        assert_eq!(
            rel.values[4],
            StepValue::List(vec![StepValue::Reference(a), StepValue::Reference(b)])
        );
        assert_eq!(single(&file, "IFCMATERIAL").string(0), Some("Red Material"));
    }

    #[test]
    fn test_point_before_project() {
        let mut builder = IfcBuilder::new(&ConversionConfig::default(), "points.csv");
        let err = builder
            .add_survey_point(&SurveyPoint::new("A1", 0.0, 0.0, 0.0))
            .unwrap_err();
        assert!(matches!(err, BuildError::ProjectNotCreated));
    }

    #[test]
    fn test_project_created_twice() {
        let mut builder = IfcBuilder::new(&ConversionConfig::default(), "points.csv");
        builder.create_project().unwrap();
        assert!(matches!(
            builder.create_project(),
            Err(BuildError::ProjectAlreadyCreated)
        ));
    }

    #[test]
    fn test_non_finite_coordinate() {
        let mut builder = IfcBuilder::new(&ConversionConfig::default(), "points.csv");
        builder.create_project().unwrap();
        let err = builder
            .add_survey_point(&SurveyPoint::new("X", f64::NAN, 0.0, 0.0))
            .unwrap_err();
        assert!(matches!(err, BuildError::NonFiniteCoordinate { .. }));
    }
}
