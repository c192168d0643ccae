pub mod csv;
pub mod ifc;
pub mod json;

pub use crate::error::ExportError;
pub use self::csv::export_report_csv;
pub use ifc::{export_ifc, ExportSummary};
pub use json::export_report_json;
