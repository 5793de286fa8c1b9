//! FILENAME: engine/src/parameter.rs
//! PURPOSE: The parameter registry: resolved attribute definitions.
//! CONTEXT: Built once from the declared parameter list and the
//! configuration, immutable thereafter. Derived and format expressions
//! are parsed here, at build time, so a bad formula surfaces as a
//! configuration error naming the parameter instead of failing later
//! in the middle of value resolution.

use crate::config::CatalogConfig;
use crate::error::ConfigError;
use crate::model::ParameterDecl;
use parser::Expression;

/// A parameter that defines a model: either declared by the data
/// source or derived via a formula.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    /// The title for the parameter used in headings and table columns.
    pub title: String,

    /// The internal name, the key into every value map.
    pub name: String,

    /// The display unit. May be empty, or the literal "None" to mean
    /// "no unit" (both are omitted from formatted values).
    pub unit: String,

    /// True for derived parameters. A derived parameter without an
    /// expression is supplied per part like a raw value but stays out
    /// of the cross-reference table family.
    pub is_derived: bool,

    /// The derivation formula, if any.
    pub derived_expression: Option<Expression>,

    /// The format rule overriding default formatting, if any.
    pub format_expression: Option<Expression>,
}

impl Parameter {
    /// Create a new declared (non-derived) parameter.
    pub fn new(title: impl Into<String>, name: impl Into<String>, unit: impl Into<String>) -> Self {
        Parameter {
            title: title.into(),
            name: name.into(),
            unit: unit.into(),
            is_derived: false,
            derived_expression: None,
            format_expression: None,
        }
    }

    /// True for the "derived but externally computed" variant: flagged
    /// derived with no formula attached.
    pub fn is_per_part_derived(&self) -> bool {
        self.is_derived && self.derived_expression.is_none()
    }
}

/// Builds the resolved parameter list for the active set:
/// `parameter_order` followed by the detail names not already listed.
///
/// Each name must resolve against the declared list or the `derived`
/// definitions; anything else is a configuration error naming the
/// parameter. Format rules and the no-formula derived flag are applied
/// after resolution.
pub fn build_parameters(
    declared: &[ParameterDecl],
    config: &CatalogConfig,
) -> Result<Vec<Parameter>, ConfigError> {
    if config.parameter_order.is_empty() {
        return Err(ConfigError::EmptyParameterOrder);
    }

    let mut parameters = Vec::new();
    for name in config.active_names() {
        let mut parameter = if let Some(decl) = declared.iter().find(|d| d.name == name) {
            Parameter::new(decl.title.clone(), decl.name.clone(), decl.unit.clone())
        } else if let Some(def) = config.derived.get(name) {
            if def.expression.trim().is_empty() {
                return Err(ConfigError::MissingDerivedExpression(name.to_string()));
            }
            let expression = parse_named(name, &def.expression)?;
            let mut parameter = Parameter::new(def.title.clone(), name, def.unit.clone());
            parameter.is_derived = true;
            parameter.derived_expression = Some(expression);
            parameter
        } else {
            return Err(ConfigError::UnknownParameter(name.to_string()));
        };

        if let Some(rule) = config.format.get(name) {
            parameter.format_expression = Some(parse_named(name, rule)?);
        }
        if config.derived_parameters.iter().any(|n| n == name) {
            parameter.is_derived = true;
        }
        parameters.push(parameter);
    }
    Ok(parameters)
}

fn parse_named(name: &str, expression: &str) -> Result<Expression, ConfigError> {
    parser::parse(expression).map_err(|err| ConfigError::InvalidExpression {
        parameter: name.to_string(),
        message: err.message,
    })
}
