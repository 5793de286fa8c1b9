//! FILENAME: engine/src/error.rs
//! PURPOSE: Error taxonomy for the catalog engine.
//! CONTEXT: Every error aborts the whole run; there is no partial
//! recovery. Each variant names the offending attribute, part, or file
//! so the single diagnostic the user sees identifies the culprit.

use crate::evaluator::EvalError;
use thiserror::Error;

/// Errors in the normalized configuration handed to the engine.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("unknown parameter '{0}': not declared by the data source and not defined as derived")]
    UnknownParameter(String),

    #[error("derived parameter '{0}' has no expression")]
    MissingDerivedExpression(String),

    #[error("invalid expression for parameter '{parameter}': {message}")]
    InvalidExpression { parameter: String, message: String },

    #[error("parameter_order must name at least one parameter")]
    EmptyParameterOrder,

    #[error("not more than two parameters supported for primary group, got {0}")]
    PrimaryGroupArity(usize),

    #[error("primary group parameter '{0}' is not listed in parameter_order")]
    PrimaryGroupNotInOrder(String),
}

/// Errors in the part records handed to the engine.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InputError {
    #[error("part '{part_id}' is missing a value for parameter '{parameter}'")]
    MissingValue { part_id: String, parameter: String },

    #[error("part '{part_id}' has an unparsable number '{raw}' for parameter '{parameter}'")]
    InvalidNumber {
        part_id: String,
        parameter: String,
        raw: String,
    },

    #[error("part '{part_id}' references unknown file '{file}'")]
    UnknownFileReference { part_id: String, file: String },

    #[error("duplicate part id '{0}'")]
    DuplicatePartId(String),
}

/// Errors raised while resolving or formatting part values.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResolveError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error("derived parameter '{parameter}' failed for part '{part_id}': {source}")]
    Derived {
        parameter: String,
        part_id: String,
        source: EvalError,
    },

    #[error("format rule for parameter '{parameter}' failed on part '{part_id}': {source}")]
    Format {
        parameter: String,
        part_id: String,
        source: EvalError,
    },

    #[error("format rule for parameter '{parameter}' failed: {source}")]
    LabelFormat {
        parameter: String,
        source: EvalError,
    },
}
