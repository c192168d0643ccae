use crate::config::ConversionConfig;
use crate::model::{Coordinates, SurveyPoint};
use crate::step::{create_guid, Attributes, EntityId, IfcWriter, StepValue};

/// Everything the survey property set needs besides the writer.
pub(super) struct PointProperties<'a> {
    pub config: &'a ConversionConfig,
    pub source_name: &'a str,
    pub metre: EntityId,
    pub point: &'a SurveyPoint,
    pub local: Coordinates,
}

/// Emits the property set for one survey point and attaches it to `element`.
///
/// Returns the `IfcPropertySet` id.
pub(super) fn add_property_set(
    writer: &mut IfcWriter,
    element: EntityId,
    props: &PointProperties<'_>,
) -> EntityId {
    let config = props.config;
    let original = props.point.coordinates;
    let offsets = config.offsets();

    let mut properties = vec![
        text(writer, "Source", props.source_name),
        text(writer, "Created_By", &config.creator_name),
        text(writer, "Point_ID", &props.point.id),
        length(writer, "Northing_Y", original.northing, props.metre),
        length(writer, "Easting_X", original.easting, props.metre),
        length(writer, "Altitude_Z", original.elevation, props.metre),
        text(writer, "Offsets", &offsets.label()),
        text(writer, "Local_Coordinates", &props.local.label()),
    ];

    if let Some(description) = &props.point.description {
        properties.push(text(writer, "Description", description));
    }

    for custom in &config.custom_properties {
        if custom.value.trim().is_empty() {
            continue;
        }
        if let Some(name) = property_name(&custom.name) {
            properties.push(text(writer, &name, &custom.value));
        }
    }

    if let Some(link) = config.external_link.as_deref().filter(|l| !l.trim().is_empty()) {
        properties.push(text(writer, "External_Link", link));
    }

    let pset = writer.add_entity(
        "IfcPropertySet",
        Attributes::new()
            .with("GlobalId", create_guid())
            .with("Name", config.pset_name.as_str())
            .with("HasProperties", properties),
    );

    writer.add_entity(
        "IfcRelDefinesByProperties",
        Attributes::new()
            .with("GlobalId", create_guid())
            .with("RelatedObjects", vec![element])
            .with("RelatingPropertyDefinition", pset),
    );

    pset
}

/// Property names may not contain spaces; blank names are dropped.
pub(super) fn property_name(raw: &str) -> Option<String> {
    let name = raw.trim();
    (!name.is_empty()).then(|| name.replace(' ', "_"))
}

fn text(writer: &mut IfcWriter, name: &str, value: &str) -> EntityId {
    writer.add_entity(
        "IfcPropertySingleValue",
        Attributes::new()
            .with("Name", name)
            .with("NominalValue", StepValue::typed("IfcText", value)),
    )
}

fn length(writer: &mut IfcWriter, name: &str, value: f64, unit: EntityId) -> EntityId {
    writer.add_entity(
        "IfcPropertySingleValue",
        Attributes::new()
            .with("Name", name)
            .with("NominalValue", StepValue::typed("IfcReal", value))
            .with("Unit", unit),
    )
}
