//! # SiteCast
//!
//! Converts survey coordinate tables into IFC4 files where every point is a
//! small cylindrical marker placed in a project/site/building/storey tree.
//!
//! ## Features
//!
//! - STEP (ISO-10303-21) writer with per-type attribute order
//! - Read CSV survey tables with flexible column names
//! - Local or global coordinates around a configurable basepoint
//! - Property sets with source, original and local coordinates
//! - Read the written file back and verify every marker position
//! - Verification reports as CSV and JSON
//!
//! ## Example
//!
//! ```no_run
//! use sitecast::config::ConversionConfig;
//! use sitecast::export::export_ifc;
//! use sitecast::input::read_survey_csv;
//!
//! let points = read_survey_csv("points.csv", b',').expect("Failed to read");
//! let summary = export_ifc(&points, &ConversionConfig::default(), "points.csv", "points.ifc")
//!     .expect("Failed to export");
//! println!("Wrote {} entities", summary.entities);
//! ```

pub mod builder;
pub mod config;
pub mod error;
pub mod export;
pub mod input;
pub mod model;
pub mod step;
pub mod verify;
