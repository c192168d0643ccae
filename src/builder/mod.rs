//! IFC4 domain layer: spatial hierarchy, survey point markers and their
//! property sets, built on top of [`crate::step::IfcWriter`].

mod marker;
pub mod project;
mod properties;

pub use crate::error::BuildError;
pub use project::{Hierarchy, IfcBuilder};
