//! FILENAME: report-engine/src/lib.rs
//! PURPOSE: Ordering, grouping, and table construction for catalogs.
//! CONTEXT: This crate turns fully resolved models into the report
//! model consumed by the rendering layer. It depends on `engine` for
//! value resolution and formatting.
//!
//! Layers:
//! - `report`: The output object tree (WHAT we hand the renderer)
//! - `builder`: The ordering and grouping engine (HOW we assemble it)

pub mod builder;
pub mod report;

pub use builder::{build_report, ReportError};
pub use report::{
    ModelGroup, ParameterInfo, Report, Table, TableGroup, ValueEntry, ValueSet,
};
