use super::project::Hierarchy;
use crate::config::{MarkerColor, MarkerSettings};
use crate::step::{Attributes, EntityId, IfcWriter, StepValue};

/// Shared geometry and material for every marker in a file.
///
/// Created on the first survey point; each point only adds its own
/// `IfcProductDefinitionShape` pointing at `representation`.
#[derive(Debug, Clone)]
pub(super) struct MarkerTemplate {
    pub representation: EntityId,
    pub material: EntityId,
    pub color: MarkerColor,
    pub elements: Vec<EntityId>,
}

impl MarkerTemplate {
    pub fn create(
        writer: &mut IfcWriter,
        hierarchy: &Hierarchy,
        settings: &MarkerSettings,
    ) -> Self {
        let (surface_style, material) = create_material(writer, hierarchy.context, settings.color);
        let representation = create_cylinder(writer, hierarchy, settings, surface_style);
        tracing::debug!(
            color = settings.color.name(),
            diameter = settings.diameter,
            height = settings.height,
            "Created marker template"
        );
        Self {
            representation,
            material,
            color: settings.color,
            elements: Vec::new(),
        }
    }

    /// Product shape for one marker instance.
    pub fn instance(&self, writer: &mut IfcWriter) -> EntityId {
        writer.add_entity(
            "IfcProductDefinitionShape",
            Attributes::new().with("Representations", vec![self.representation]),
        )
    }
}

/// Colour, surface style and material for one marker colour.
///
/// Returns `(surface_style, material)`.
fn create_material(
    writer: &mut IfcWriter,
    context: EntityId,
    color: MarkerColor,
) -> (EntityId, EntityId) {
    let name = color.name();
    let (red, green, blue) = color.rgb();

    let colour = writer.add_entity(
        "IfcColourRgb",
        Attributes::new()
            .with("Name", name)
            .with("Red", red)
            .with("Green", green)
            .with("Blue", blue),
    );
    let rendering = writer.add_entity(
        "IfcSurfaceStyleRendering",
        Attributes::new()
            .with("SurfaceColour", colour)
            .with("Transparency", 0.0)
            .with("ReflectanceMethod", StepValue::enumeration("FLAT")),
    );
    let surface_style = writer.add_entity(
        "IfcSurfaceStyle",
        Attributes::new()
            .with("Name", format!("{name} Material"))
            .with("Side", StepValue::enumeration("BOTH"))
            .with("Styles", vec![rendering]),
    );

    let material = writer.add_entity(
        "IfcMaterial",
        Attributes::new().with("Name", format!("{name} Material")),
    );
    let styled_item = writer.add_entity(
        "IfcStyledItem",
        Attributes::new().with("Styles", vec![surface_style]),
    );
    let styled_representation = writer.add_entity(
        "IfcStyledRepresentation",
        Attributes::new()
            .with("ContextOfItems", context)
            .with("RepresentationIdentifier", "Material")
            .with("RepresentationType", "Material")
            .with("Items", vec![styled_item]),
    );
    writer.add_entity(
        "IfcMaterialDefinitionRepresentation",
        Attributes::new()
            .with("Representations", vec![styled_representation])
            .with("RepresentedMaterial", material),
    );

    (surface_style, material)
}

/// Vertical cylinder standing on the placement origin.
fn create_cylinder(
    writer: &mut IfcWriter,
    hierarchy: &Hierarchy,
    settings: &MarkerSettings,
    surface_style: EntityId,
) -> EntityId {
    let profile_origin = writer.add_entity(
        "IfcCartesianPoint",
        Attributes::new().with("Coordinates", vec![0.0, 0.0]),
    );
    let profile_position = writer.add_entity(
        "IfcAxis2Placement2D",
        Attributes::new().with("Location", profile_origin),
    );
    let profile = writer.add_entity(
        "IfcCircleProfileDef",
        Attributes::new()
            .with("ProfileType", StepValue::enumeration("AREA"))
            .with("ProfileName", "Survey Marker")
            .with("Position", profile_position)
            .with("Radius", settings.diameter / 2.0),
    );
    let solid = writer.add_entity(
        "IfcExtrudedAreaSolid",
        Attributes::new()
            .with("SweptArea", profile)
            .with("Position", hierarchy.world_placement)
            .with("ExtrudedDirection", hierarchy.z_axis)
            .with("Depth", settings.height),
    );
    writer.add_entity(
        "IfcStyledItem",
        Attributes::new()
            .with("Item", solid)
            .with("Styles", vec![surface_style]),
    );
    writer.add_entity(
        "IfcShapeRepresentation",
        Attributes::new()
            .with("ContextOfItems", hierarchy.body_context)
            .with("RepresentationIdentifier", "Body")
            .with("RepresentationType", "SweptSolid")
            .with("Items", vec![solid]),
    )
}
