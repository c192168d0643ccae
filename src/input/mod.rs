pub mod csv;
pub mod validate;

pub use crate::error::InputError;
pub use self::csv::{read_survey_csv, read_survey_points};
pub use validate::validate_points;
