//! FILENAME: engine/src/format.rs
//! PURPOSE: Renders typed values into display text.
//! CONTEXT: Used for every table cell, group label, and per-part detail
//! entry, so part-level values and value-set labels format identically.
//! A parameter with a format rule evaluates it over the single binding
//! `value`; everything else gets the default formatting below.

use crate::evaluator::{Bindings, EvalError, Evaluator};
use crate::parameter::Parameter;
use crate::value::ParamValue;

/// Formats a value for display according to the parameter's rule.
pub fn format_value(parameter: &Parameter, value: &ParamValue) -> Result<String, EvalError> {
    if let Some(rule) = &parameter.format_expression {
        let mut bindings = Bindings::new();
        bindings.insert("value".to_string(), value.clone());
        let result = Evaluator::new(&bindings).evaluate(rule)?;
        return Ok(result.as_text());
    }
    Ok(default_format(value, &parameter.unit))
}

/// Default formatting: floats with two significant digits, integers
/// and text in their natural form, the unit appended after one space.
/// An empty unit or the literal "None" is omitted entirely.
fn default_format(value: &ParamValue, unit: &str) -> String {
    let mut text = match value {
        ParamValue::Int(n) => n.to_string(),
        ParamValue::Float(f) => format_significant(*f, 2),
        ParamValue::Text(s) => s.clone(),
    };
    if !unit.is_empty() && unit != "None" {
        text.push(' ');
        text.push_str(unit);
    }
    text
}

/// Renders a float with the given number of significant digits, always
/// as a plain decimal (no scientific notation). Trailing zeros are
/// trimmed, but a value with a fractional part keeps at least one
/// decimal digit so floats stay visually distinct from integers.
fn format_significant(value: f64, digits: i32) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    let exponent = value.abs().log10().floor() as i32;
    let decimals = (digits - 1 - exponent).max(0);
    // Round to the significant-digit boundary before printing, so
    // values above the decimal range still lose excess precision
    // (154.0 with two digits prints as 150).
    let scale = 10f64.powi(exponent - (digits - 1));
    let rounded = (value / scale).round() * scale;
    let mut text = format!("{:.*}", decimals as usize, rounded);
    if let Some(dot) = text.find('.') {
        let min_len = dot + 2;
        while text.len() > min_len && text.ends_with('0') {
            text.pop();
        }
    }
    text
}
