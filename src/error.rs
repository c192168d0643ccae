//! Error types for SiteCast.

use std::path::PathBuf;
use thiserror::Error;

use crate::step::EntityId;

/// Reasons a single attribute value cannot be encoded as a STEP token.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValueError {
    /// STEP has no token for NaN or infinity.
    #[error("non-finite real value {value}")]
    NonFiniteReal { value: f64 },

    /// Enumeration tokens must be non-empty `[A-Za-z0-9_]`.
    #[error("invalid enumeration token '{token}'")]
    InvalidEnumeration { token: String },

    /// Typed values and entities need a plain keyword as type name.
    #[error("invalid type name '{name}'")]
    InvalidTypeName { name: String },
}

/// Errors that can occur when serializing an entity graph.
#[derive(Debug, Error)]
pub enum WriteError {
    /// An attribute value has no STEP encoding.
    #[error("cannot encode attribute '{attribute}' of {entity_type} {id}: {source}")]
    Encode {
        id: EntityId,
        entity_type: String,
        attribute: String,
        source: ValueError,
    },

    /// The entity type name is not a valid STEP keyword.
    #[error("entity {id} has an invalid type name '{entity_type}'")]
    InvalidEntityType { id: EntityId, entity_type: String },

    /// A known entity type was given an attribute outside its positional schema.
    #[error("{entity_type} {id} has no attribute named '{attribute}'")]
    UnknownAttribute {
        id: EntityId,
        entity_type: String,
        attribute: String,
    },

    /// A header field could not be encoded.
    #[error("cannot encode header field '{field}': {source}")]
    Header { field: String, source: ValueError },

    /// Failed to create the output file.
    #[error("failed to create file '{path}': {source}")]
    FileCreate {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to write data to the output.
    #[error("failed to write '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Errors that can occur when reading STEP files back.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Failed to read the IFC file from disk.
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The STEP format is invalid or malformed.
    #[error("invalid STEP format: {message}")]
    InvalidStep { message: String },
}

/// Errors raised by the IFC domain builder.
#[derive(Debug, Error)]
pub enum BuildError {
    /// Points can only be placed once the spatial hierarchy exists.
    #[error("project hierarchy has not been created")]
    ProjectNotCreated,

    /// The spatial hierarchy can only be created once per file.
    #[error("project hierarchy already exists")]
    ProjectAlreadyCreated,

    /// A relation points at an entity that was never created.
    #[error("reference to missing entity {id}")]
    DanglingReference { id: EntityId },

    /// A survey point carries a coordinate STEP cannot express.
    #[error("survey point '{point_id}' has a non-finite coordinate")]
    NonFiniteCoordinate { point_id: String },
}

/// Errors that can occur when reading survey input.
#[derive(Debug, Error)]
pub enum InputError {
    /// Failed to open the input file.
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The CSV structure itself is broken.
    #[error("CSV read failed: {source}")]
    Csv {
        #[from]
        source: csv::Error,
    },

    /// No header matched a required coordinate column.
    #[error("no column found for {column}")]
    MissingColumn { column: &'static str },

    /// A coordinate cell is not a number.
    #[error("line {line}: column {column} has non-numeric value '{value}'")]
    InvalidNumber {
        line: u64,
        column: &'static str,
        value: String,
    },
}

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config '{path}': {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The configuration file is not valid JSON for this schema.
    #[error("invalid config '{path}': {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// A value is syntactically fine but unusable.
    #[error("invalid config value: {message}")]
    Invalid { message: String },
}

/// Errors that can occur when verifying a written file.
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Errors that can occur when exporting data.
#[derive(Debug, Error)]
pub enum ExportError {
    /// There is nothing to convert.
    #[error("no survey points to export")]
    NoPoints,

    /// Building the entity graph failed.
    #[error(transparent)]
    Build(#[from] BuildError),

    /// Serializing the entity graph failed.
    #[error(transparent)]
    Write(#[from] WriteError),

    /// Failed to create the output file.
    #[error("failed to create file '{path}': {source}")]
    FileCreate {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to write data to the file.
    #[error("failed to write data: {message}")]
    WriteFailed { message: String },

    /// Failed to serialize data to JSON.
    #[error("JSON serialization failed: {source}")]
    JsonSerialize {
        #[from]
        source: serde_json::Error,
    },

    /// Failed to write CSV data.
    #[error("CSV write failed: {source}")]
    CsvWrite {
        #[from]
        source: csv::Error,
    },
}
