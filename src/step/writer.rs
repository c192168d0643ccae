use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::Local;

use super::entity::{Attributes, EntityId, EntityRecord};
use super::schema::AttributeOrder;
use super::value::{keyword, StepValue};
use crate::error::{ValueError, WriteError};

static NULL: StepValue = StepValue::Null;

/// Static HEADER section content.
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderInfo {
    pub description: Vec<String>,
    pub implementation_level: String,
    pub authors: Vec<String>,
    pub organizations: Vec<String>,
    pub preprocessor_version: String,
    pub originating_system: String,
    pub authorization: String,
    pub schema: String,
}

impl Default for HeaderInfo {
    fn default() -> Self {
        Self {
            description: vec!["ViewDefinition [CoordinationView]".to_string()],
            implementation_level: "2;1".to_string(),
            authors: vec!["SiteCast User".to_string()],
            organizations: vec!["SiteCast".to_string()],
            preprocessor_version: format!("SiteCast-{}", env!("CARGO_PKG_VERSION")),
            originating_system: "SiteCast Survey Converter".to_string(),
            authorization: "None".to_string(),
            schema: "IFC4".to_string(),
        }
    }
}

/// Append-only entity graph that accepts new records.
///
/// Ids are handed out as `#1, #2, ...` in call order. Finishing (or writing)
/// consumes the writer, so nothing can be added after serialization.
///
/// # Example
///
/// ```
/// use sitecast::step::{Attributes, IfcWriter};
///
/// let mut writer = IfcWriter::new();
/// let point = writer.add_entity(
///     "IfcCartesianPoint",
///     Attributes::new().with("Coordinates", vec![0.0, 0.0, 0.0]),
/// );
/// let text = writer.finish().render("model.ifc", "2024-01-01T00:00:00")?;
/// assert!(text.contains("#1=IFCCARTESIANPOINT((0.0,0.0,0.0));"));
/// # assert_eq!(point.get(), 1);
/// # Ok::<(), sitecast::error::WriteError>(())
/// ```
#[derive(Debug, Clone)]
pub struct IfcWriter {
    entities: Vec<EntityRecord>,
    counter: u64,
    header: HeaderInfo,
    schema: AttributeOrder,
}

impl Default for IfcWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl IfcWriter {
    /// Writer with the default header and the IFC4 attribute table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entities: Vec::new(),
            counter: 0,
            header: HeaderInfo::default(),
            schema: AttributeOrder::ifc4(),
        }
    }

    #[must_use]
    pub fn with_header(mut self, header: HeaderInfo) -> Self {
        self.header = header;
        self
    }

    #[must_use]
    pub fn with_schema(mut self, schema: AttributeOrder) -> Self {
        self.schema = schema;
        self
    }

    /// Extends the attribute order table, e.g. for extra entity types.
    pub fn schema_mut(&mut self) -> &mut AttributeOrder {
        &mut self.schema
    }

    /// Appends a record and returns its id.
    ///
    /// Values are stored as given; they are only checked when the file is
    /// rendered.
    pub fn add_entity(&mut self, type_name: impl Into<String>, attributes: Attributes) -> EntityId {
        self.counter += 1;
        let id = EntityId::new(self.counter);
        self.entities.push(EntityRecord {
            id,
            type_name: type_name.into(),
            attributes,
        });
        id
    }

    /// Whether `id` was handed out by this writer.
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        (1..=self.counter).contains(&id.get())
    }

    #[must_use]
    pub fn entity(&self, id: EntityId) -> Option<&EntityRecord> {
        find_record(&self.entities, id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Freezes the graph.
    #[must_use]
    pub fn finish(self) -> StepDocument {
        StepDocument {
            entities: self.entities,
            header: self.header,
            schema: self.schema,
        }
    }

    /// Freezes the graph and writes it to `path`.
    ///
    /// The returned document can be written again to other paths.
    pub fn write<P: AsRef<Path>>(self, path: P) -> Result<StepDocument, WriteError> {
        let document = self.finish();
        document.write(path)?;
        Ok(document)
    }
}

/// A finished entity graph, ready to be serialized any number of times.
#[derive(Debug, Clone)]
pub struct StepDocument {
    entities: Vec<EntityRecord>,
    header: HeaderInfo,
    schema: AttributeOrder,
}

impl StepDocument {
    #[must_use]
    pub fn entities(&self) -> &[EntityRecord] {
        &self.entities
    }

    #[must_use]
    pub fn entity(&self, id: EntityId) -> Option<&EntityRecord> {
        find_record(&self.entities, id)
    }

    #[must_use]
    pub fn header(&self) -> &HeaderInfo {
        &self.header
    }

    /// Writes the file to `path`, stamped with the current local time.
    ///
    /// The whole file is encoded before the path is touched, so encoding
    /// errors never leave a file behind. If writing fails midway the partial
    /// file is removed.
    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<(), WriteError> {
        let path = path.as_ref();
        let timestamp = Local::now().format("%Y-%m-%dT%H:%M:%S").to_string();
        let content = self.render(&path.to_string_lossy(), &timestamp)?;

        let file = File::create(path).map_err(|source| WriteError::FileCreate {
            path: path.to_path_buf(),
            source,
        })?;
        persist(path, BufWriter::new(file), &content)?;

        tracing::info!(
            path = %path.display(),
            entities = self.entities.len(),
            bytes = content.len(),
            "Wrote IFC file"
        );
        Ok(())
    }

    /// Streams the file to `out`.
    pub fn write_to<W: Write>(
        &self,
        out: &mut W,
        file_name: &str,
        timestamp: &str,
    ) -> Result<(), WriteError> {
        let content = self.render(file_name, timestamp)?;
        out.write_all(content.as_bytes())
            .and_then(|()| out.flush())
            .map_err(|source| WriteError::Io {
                path: file_name.into(),
                source,
            })
    }

    /// Encodes the complete ISO-10303-21 file.
    pub fn render(&self, file_name: &str, timestamp: &str) -> Result<String, WriteError> {
        let mut out = String::new();
        out.push_str("ISO-10303-21;\n");
        self.render_header(&mut out, file_name, timestamp)?;

        out.push_str("DATA;\n");
        for record in &self.entities {
            encode_record(&mut out, record, &self.schema)?;
        }
        out.push_str("ENDSEC;\n");
        out.push_str("END-ISO-10303-21;\n");

        tracing::debug!(entities = self.entities.len(), "Rendered STEP data section");
        Ok(out)
    }

    fn render_header(
        &self,
        out: &mut String,
        file_name: &str,
        timestamp: &str,
    ) -> Result<(), WriteError> {
        let header = &self.header;
        out.push_str("HEADER;\n");

        out.push_str("FILE_DESCRIPTION(");
        header_field(out, "description", &strings(&header.description))?;
        out.push(',');
        header_field(out, "implementation_level", &header.implementation_level.as_str().into())?;
        out.push_str(");\n");

        out.push_str("FILE_NAME(");
        let fields: [(&str, StepValue); 7] = [
            ("name", file_name.into()),
            ("time_stamp", timestamp.into()),
            ("author", strings(&header.authors)),
            ("organization", strings(&header.organizations)),
            ("preprocessor_version", header.preprocessor_version.as_str().into()),
            ("originating_system", header.originating_system.as_str().into()),
            ("authorization", header.authorization.as_str().into()),
        ];
        for (index, (field, value)) in fields.iter().enumerate() {
            if index > 0 {
                out.push(',');
            }
            header_field(out, field, value)?;
        }
        out.push_str(");\n");

        out.push_str("FILE_SCHEMA((");
        header_field(out, "schema", &header.schema.as_str().into())?;
        out.push_str("));\n");

        out.push_str("ENDSEC;\n");
        Ok(())
    }
}

/// Writes `content` through `out`; removes `path` if the write fails.
fn persist<W: Write>(path: &Path, mut out: W, content: &str) -> Result<(), WriteError> {
    let result = out.write_all(content.as_bytes()).and_then(|()| out.flush());
    drop(out);

    if let Err(source) = result {
        if let Err(cleanup) = fs::remove_file(path) {
            tracing::warn!(
                path = %path.display(),
                error = %cleanup,
                "Failed to remove partial IFC file"
            );
        }
        return Err(WriteError::Io {
            path: path.to_path_buf(),
            source,
        });
    }
    Ok(())
}

fn find_record(entities: &[EntityRecord], id: EntityId) -> Option<&EntityRecord> {
    // Ids are dense and start at 1, so the id doubles as an index.
    let index = usize::try_from(id.get()).ok()?.checked_sub(1)?;
    entities.get(index)
}

fn strings(values: &[String]) -> StepValue {
    StepValue::List(values.iter().map(|s| s.as_str().into()).collect())
}

fn header_field(out: &mut String, field: &str, value: &StepValue) -> Result<(), WriteError> {
    value.encode_into(out).map_err(|source| WriteError::Header {
        field: field.to_string(),
        source,
    })
}

/// Appends `#id=TYPE(a,b,...);` followed by a newline.
fn encode_record(
    out: &mut String,
    record: &EntityRecord,
    schema: &AttributeOrder,
) -> Result<(), WriteError> {
    let type_keyword = keyword(&record.type_name).ok_or_else(|| WriteError::InvalidEntityType {
        id: record.id,
        entity_type: record.type_name.clone(),
    })?;

    let encode_error = |attribute: &str, source: ValueError| WriteError::Encode {
        id: record.id,
        entity_type: record.type_name.clone(),
        attribute: attribute.to_string(),
        source,
    };

    let ordered: Vec<(&str, &StepValue)> = match schema.get(&record.type_name) {
        Some(order) => {
            if let Some(unknown) = record
                .attributes
                .names()
                .find(|name| !order.iter().any(|known| known == name))
            {
                return Err(WriteError::UnknownAttribute {
                    id: record.id,
                    entity_type: record.type_name.clone(),
                    attribute: unknown.to_string(),
                });
            }
            order
                .iter()
                .map(|name| {
                    let value = record.attributes.get(name).unwrap_or(&NULL);
                    (name.as_str(), value)
                })
                .collect()
        }
        None => {
            let mut sorted: Vec<_> = record.attributes.iter().collect();
            sorted.sort_by(|a, b| a.0.cmp(b.0));
            sorted
        }
    };

    out.push_str(&record.id.to_string());
    out.push('=');
    out.push_str(&type_keyword);
    out.push('(');
    for (index, (name, value)) in ordered.into_iter().enumerate() {
        if index > 0 {
            out.push(',');
        }
        value
            .encode_into(out)
            .map_err(|source| encode_error(name, source))?;
    }
    out.push_str(");\n");
    Ok(())
}
