use std::collections::HashMap;

// Positional IFC4 attribute lists (inherited attributes first) for the
// entity types the builder emits.
const IFC4_ORDERS: &[(&str, &[&str])] = &[
    // Resources
    ("IFCCARTESIANPOINT", &["Coordinates"]),
    ("IFCDIRECTION", &["DirectionRatios"]),
    ("IFCAXIS2PLACEMENT2D", &["Location", "RefDirection"]),
    ("IFCAXIS2PLACEMENT3D", &["Location", "Axis", "RefDirection"]),
    ("IFCLOCALPLACEMENT", &["PlacementRelTo", "RelativePlacement"]),
    ("IFCSIUNIT", &["Dimensions", "UnitType", "Prefix", "Name"]),
    ("IFCUNITASSIGNMENT", &["Units"]),
    (
        "IFCGEOMETRICREPRESENTATIONCONTEXT",
        &[
            "ContextIdentifier",
            "ContextType",
            "CoordinateSpaceDimension",
            "Precision",
            "WorldCoordinateSystem",
            "TrueNorth",
        ],
    ),
    (
        "IFCGEOMETRICREPRESENTATIONSUBCONTEXT",
        &[
            "ContextIdentifier",
            "ContextType",
            "CoordinateSpaceDimension",
            "Precision",
            "WorldCoordinateSystem",
            "TrueNorth",
            "ParentContext",
            "TargetScale",
            "TargetView",
            "UserDefinedTargetView",
        ],
    ),
    // Geometry
    (
        "IFCCIRCLEPROFILEDEF",
        &["ProfileType", "ProfileName", "Position", "Radius"],
    ),
    (
        "IFCEXTRUDEDAREASOLID",
        &["SweptArea", "Position", "ExtrudedDirection", "Depth"],
    ),
    (
        "IFCSHAPEREPRESENTATION",
        &[
            "ContextOfItems",
            "RepresentationIdentifier",
            "RepresentationType",
            "Items",
        ],
    ),
    (
        "IFCPRODUCTDEFINITIONSHAPE",
        &["Name", "Description", "Representations"],
    ),
    // Presentation
    ("IFCCOLOURRGB", &["Name", "Red", "Green", "Blue"]),
    (
        "IFCSURFACESTYLERENDERING",
        &[
            "SurfaceColour",
            "Transparency",
            "DiffuseColour",
            "TransmissionColour",
            "DiffuseTransmissionColour",
            "ReflectionColour",
            "SpecularColour",
            "SpecularHighlight",
            "ReflectanceMethod",
        ],
    ),
    ("IFCSURFACESTYLE", &["Name", "Side", "Styles"]),
    ("IFCSTYLEDITEM", &["Item", "Styles", "Name"]),
    (
        "IFCSTYLEDREPRESENTATION",
        &[
            "ContextOfItems",
            "RepresentationIdentifier",
            "RepresentationType",
            "Items",
        ],
    ),
    ("IFCMATERIAL", &["Name", "Description", "Category"]),
    (
        "IFCMATERIALDEFINITIONREPRESENTATION",
        &["Name", "Description", "Representations", "RepresentedMaterial"],
    ),
    // Kernel and product
    (
        "IFCPROJECT",
        &[
            "GlobalId",
            "OwnerHistory",
            "Name",
            "Description",
            "ObjectType",
            "LongName",
            "Phase",
            "RepresentationContexts",
            "UnitsInContext",
        ],
    ),
    (
        "IFCSITE",
        &[
            "GlobalId",
            "OwnerHistory",
            "Name",
            "Description",
            "ObjectType",
            "ObjectPlacement",
            "Representation",
            "LongName",
            "CompositionType",
            "RefLatitude",
            "RefLongitude",
            "RefElevation",
            "LandTitleNumber",
            "SiteAddress",
        ],
    ),
    (
        "IFCBUILDING",
        &[
            "GlobalId",
            "OwnerHistory",
            "Name",
            "Description",
            "ObjectType",
            "ObjectPlacement",
            "Representation",
            "LongName",
            "CompositionType",
            "ElevationOfRefHeight",
            "ElevationOfTerrain",
            "BuildingAddress",
        ],
    ),
    (
        "IFCBUILDINGSTOREY",
        &[
            "GlobalId",
            "OwnerHistory",
            "Name",
            "Description",
            "ObjectType",
            "ObjectPlacement",
            "Representation",
            "LongName",
            "CompositionType",
            "Elevation",
        ],
    ),
    (
        "IFCBUILDINGELEMENTPROXY",
        &[
            "GlobalId",
            "OwnerHistory",
            "Name",
            "Description",
            "ObjectType",
            "ObjectPlacement",
            "Representation",
            "Tag",
            "PredefinedType",
        ],
    ),
    (
        "IFCPROPERTYSET",
        &["GlobalId", "OwnerHistory", "Name", "Description", "HasProperties"],
    ),
    (
        "IFCPROPERTYSINGLEVALUE",
        &["Name", "Description", "NominalValue", "Unit"],
    ),
    // Relationships
    (
        "IFCRELAGGREGATES",
        &[
            "GlobalId",
            "OwnerHistory",
            "Name",
            "Description",
            "RelatingObject",
            "RelatedObjects",
        ],
    ),
    (
        "IFCRELCONTAINEDINSPATIALSTRUCTURE",
        &[
            "GlobalId",
            "OwnerHistory",
            "Name",
            "Description",
            "RelatedElements",
            "RelatingStructure",
        ],
    ),
    (
        "IFCRELDEFINESBYPROPERTIES",
        &[
            "GlobalId",
            "OwnerHistory",
            "Name",
            "Description",
            "RelatedObjects",
            "RelatingPropertyDefinition",
        ],
    ),
    (
        "IFCRELASSOCIATESMATERIAL",
        &[
            "GlobalId",
            "OwnerHistory",
            "Name",
            "Description",
            "RelatedObjects",
            "RelatingMaterial",
        ],
    ),
];

/// Positional attribute order per entity type.
///
/// Lookups are case-insensitive. Types without an entry are written in
/// alphabetical attribute order, which is only schema-correct by accident;
/// register an order for any type that has to be read by real IFC tools.
#[derive(Debug, Clone, Default)]
pub struct AttributeOrder {
    orders: HashMap<String, Vec<String>>,
}

impl AttributeOrder {
    /// An empty table: every type falls back to alphabetical order.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Table preloaded with the IFC4 entity types the builder emits.
    #[must_use]
    pub fn ifc4() -> Self {
        let mut table = Self::empty();
        for (type_name, attributes) in IFC4_ORDERS {
            table.register(type_name, attributes.iter().copied());
        }
        table
    }

    /// Adds or replaces the positional order for `type_name`.
    pub fn register<I, S>(&mut self, type_name: &str, attributes: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.orders.insert(
            type_name.to_ascii_uppercase(),
            attributes.into_iter().map(Into::into).collect(),
        );
    }

    #[must_use]
    pub fn get(&self, type_name: &str) -> Option<&[String]> {
        self.orders
            .get(&type_name.to_ascii_uppercase())
            .map(Vec::as_slice)
    }

    #[must_use]
    pub fn contains(&self, type_name: &str) -> bool {
        self.get(type_name).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_lookup_is_case_insensitive() {
        let table = AttributeOrder::ifc4();
        assert_eq!(table.get("IfcDirection"), Some(&["DirectionRatios".to_string()][..]));
        assert!(table.contains("ifcproject"));
        assert!(table.contains("IFCRELAGGREGATES"));
        assert!(!table.contains("IfcWall"));
    }

    #[test]
    fn test_project_order() {
        let table = AttributeOrder::ifc4();
        let order = table.get("IfcProject").unwrap();
        assert_eq!(order.len(), 9);
        assert_eq!(order[0], "GlobalId");
        assert_eq!(order[8], "UnitsInContext");
    }

    #[test]
    fn test_register_extends_and_replaces() {
        let mut table = AttributeOrder::empty();
        table.register("IfcWall", ["GlobalId", "OwnerHistory", "Name"]);
        assert_eq!(table.get("IFCWALL").map(<[String]>::len), Some(3));

        table.register("IFCWALL", ["GlobalId"]);
        assert_eq!(table.get("IfcWall").map(<[String]>::len), Some(1));
    }
}
