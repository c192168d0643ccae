//! ISO-10303-21 (STEP) encoding for IFC files.
//!
//! [`IfcWriter`] collects typed entity records and hands out their ids;
//! [`StepDocument`] serializes the finished graph. [`StepFile`] reads files
//! written this way back for verification.

pub mod entity;
pub mod guid;
pub mod reader;
pub mod schema;
pub mod value;
pub mod writer;

pub use crate::error::{ParseError, ValueError, WriteError};
pub use entity::{Attributes, EntityId, EntityRecord};
pub use guid::create_guid;
pub use reader::{StepEntity, StepFile};
pub use schema::AttributeOrder;
pub use value::{format_value, StepValue};
pub use writer::{HeaderInfo, IfcWriter, StepDocument};
