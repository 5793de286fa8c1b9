//! FILENAME: engine/src/lib.rs
//! PURPOSE: Main library entry point for the catalog value engine.
//! CONTEXT: Re-exports public types and modules for use by other crates.
//!
//! The engine turns raw part records into fully typed and formatted
//! models: the parameter registry resolves attribute definitions, the
//! resolver coerces raw strings and evaluates derived formulas, and the
//! formatter renders display text. Sorting, grouping, and table
//! construction live in the report-engine crate on top of this one.

pub mod config;
pub mod error;
pub mod evaluator;
pub mod format;
pub mod model;
pub mod parameter;
pub mod resolve;
pub mod value;

// Re-export commonly used types at the crate root
pub use config::{CatalogConfig, DerivedDef};
pub use error::{ConfigError, InputError, ResolveError};
pub use evaluator::{Bindings, EvalError, EvalResult, Evaluator};
pub use format::format_value;
pub use model::{check_file_references, CatalogData, FileSet, Model, ParameterDecl};
pub use parameter::{build_parameters, Parameter};
pub use resolve::resolve_models;
pub use value::ParamValue;
