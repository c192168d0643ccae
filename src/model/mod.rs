pub mod survey;

pub use survey::{Coordinates, SurveyPoint};
