//! FILENAME: engine/src/evaluator.rs
//! PURPOSE: Evaluates AST expressions to compute derived and formatted values.
//! CONTEXT: After a formula is parsed into an AST, this module traverses
//! the tree and computes the final result. The visible environment is a
//! read-only binding of names to already-computed parameter values:
//! derived formulas see the other parameters by name, format rules see
//! the single name `value`.
//!
//! SUPPORTED FEATURES:
//! - Literal evaluation: Integers, Floats, Strings, Booleans
//! - Variable lookup from the binding (unbound name is an error)
//! - Binary operations: +, -, *, /, ^, &, =, <>, <, >, <=, >=
//! - Unary operations: - (negation)
//! - Functions: IF, AND, OR, NOT, MIN, MAX, ABS, ROUND, FLOOR, CEILING,
//!              SQRT, POWER, MOD, INT, LEN, UPPER, LOWER, TRIM, CONCAT,
//!              LEFT, RIGHT, FIXED
//!
//! Integer arithmetic stays integral: Int + Int, Int - Int, Int * Int,
//! integer MOD and non-negative integer powers produce Int. Division
//! always produces Float. This keeps derived values bit-equal to direct
//! arithmetic over the base values.
//!
//! Unlike a spreadsheet cell, a formula failure here never renders into
//! the output; every error aborts the run, so evaluation returns
//! `Result` instead of an error value.

use crate::value::ParamValue;
use parser::{BinaryOperator, Expression, UnaryOperator, Value};
use std::collections::HashMap;
use thiserror::Error;

/// Errors raised while evaluating a formula.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error("unbound variable '{0}'")]
    UnboundVariable(String),

    #[error("unknown function '{0}'")]
    UnknownFunction(String),

    #[error("{function} expects {expected} argument(s), got {got}")]
    ArgumentCount {
        function: String,
        expected: String,
        got: usize,
    },

    #[error("expected a numeric value, got {0}")]
    NotNumeric(String),

    #[error("expected a boolean value, got {0}")]
    NotBoolean(String),

    #[error("cannot compare {0} and {1}")]
    Incomparable(String, String),

    #[error("division by zero")]
    DivisionByZero,

    #[error("integer overflow")]
    Overflow,

    #[error("result is not a finite number")]
    NonFinite,
}

/// The read-only variable environment a formula is evaluated against.
pub type Bindings = HashMap<String, ParamValue>;

/// The result of evaluating an expression.
/// This maps onto ParamValue but is separate to allow boolean
/// intermediates inside a formula (conditions, AND/OR chains).
#[derive(Debug, Clone, PartialEq)]
pub enum EvalResult {
    Int(i64),
    Float(f64),
    Text(String),
    Boolean(bool),
}

impl EvalResult {
    /// Converts the evaluation result to a ParamValue for storage.
    /// Booleans collapse to 0/1, mirroring their numeric role in
    /// sorting and grouping.
    pub fn into_value(self) -> ParamValue {
        match self {
            EvalResult::Int(n) => ParamValue::Int(n),
            EvalResult::Float(f) => ParamValue::Float(f),
            EvalResult::Text(s) => ParamValue::Text(s),
            EvalResult::Boolean(b) => ParamValue::Int(if b { 1 } else { 0 }),
        }
    }

    /// Attempts to coerce the result to a number.
    /// Text that parses as a number counts as numeric.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            EvalResult::Int(n) => Some(*n as f64),
            EvalResult::Float(f) => Some(*f),
            EvalResult::Boolean(b) => Some(if *b { 1.0 } else { 0.0 }),
            EvalResult::Text(s) => s.trim().parse::<f64>().ok(),
        }
    }

    /// Attempts to coerce the result to a boolean.
    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            EvalResult::Boolean(b) => Some(*b),
            EvalResult::Int(n) => Some(*n != 0),
            EvalResult::Float(f) => Some(*f != 0.0),
            EvalResult::Text(s) => {
                let upper = s.trim().to_uppercase();
                if upper == "TRUE" {
                    Some(true)
                } else if upper == "FALSE" {
                    Some(false)
                } else {
                    None
                }
            }
        }
    }

    /// Converts the result to its text representation.
    pub fn as_text(&self) -> String {
        match self {
            EvalResult::Int(n) => n.to_string(),
            EvalResult::Float(f) => {
                // Format without unnecessary decimal places
                if f.fract() == 0.0 && f.abs() < 1e15 {
                    format!("{:.0}", f)
                } else {
                    format!("{}", f)
                }
            }
            EvalResult::Text(s) => s.clone(),
            EvalResult::Boolean(b) => {
                if *b { "TRUE" } else { "FALSE" }.to_string()
            }
        }
    }

    /// Short description used in error messages.
    fn describe(&self) -> String {
        match self {
            EvalResult::Int(n) => format!("integer {}", n),
            EvalResult::Float(f) => format!("float {}", f),
            EvalResult::Text(s) => format!("text \"{}\"", s),
            EvalResult::Boolean(b) => format!("boolean {}", if *b { "TRUE" } else { "FALSE" }),
        }
    }
}

impl From<&ParamValue> for EvalResult {
    fn from(value: &ParamValue) -> Self {
        match value {
            ParamValue::Int(n) => EvalResult::Int(*n),
            ParamValue::Float(f) => EvalResult::Float(*f),
            ParamValue::Text(s) => EvalResult::Text(s.clone()),
        }
    }
}

/// A pair of operands after numeric coercion. Two integers stay
/// integral; any float involvement promotes both sides.
enum NumericPair {
    Ints(i64, i64),
    Floats(f64, f64),
}

/// The formula evaluator.
/// Holds a reference to the variable bindings for name lookups.
pub struct Evaluator<'a> {
    bindings: &'a Bindings,
}

impl<'a> Evaluator<'a> {
    /// Creates a new Evaluator over the given bindings.
    pub fn new(bindings: &'a Bindings) -> Self {
        Evaluator { bindings }
    }

    /// Evaluates an AST expression and returns the result.
    pub fn evaluate(&self, expr: &Expression) -> Result<EvalResult, EvalError> {
        match expr {
            Expression::Literal(value) => Ok(self.eval_literal(value)),
            Expression::Variable(name) => self.eval_variable(name),
            Expression::BinaryOp { left, op, right } => self.eval_binary_op(left, op, right),
            Expression::UnaryOp { op, operand } => self.eval_unary_op(op, operand),
            Expression::FunctionCall { name, args } => self.eval_function(name, args),
        }
    }

    /// Evaluates a literal value.
    fn eval_literal(&self, value: &Value) -> EvalResult {
        match value {
            Value::Integer(n) => EvalResult::Int(*n),
            Value::Float(f) => EvalResult::Float(*f),
            Value::String(s) => EvalResult::Text(s.clone()),
            Value::Boolean(b) => EvalResult::Boolean(*b),
        }
    }

    /// Looks a variable up in the bindings.
    fn eval_variable(&self, name: &str) -> Result<EvalResult, EvalError> {
        self.bindings
            .get(name)
            .map(EvalResult::from)
            .ok_or_else(|| EvalError::UnboundVariable(name.to_string()))
    }

    /// Evaluates a binary operation.
    fn eval_binary_op(
        &self,
        left: &Expression,
        op: &BinaryOperator,
        right: &Expression,
    ) -> Result<EvalResult, EvalError> {
        let left_val = self.evaluate(left)?;
        let right_val = self.evaluate(right)?;

        match op {
            // Arithmetic operations
            BinaryOperator::Add => self.eval_add(&left_val, &right_val),
            BinaryOperator::Subtract => self.eval_subtract(&left_val, &right_val),
            BinaryOperator::Multiply => self.eval_multiply(&left_val, &right_val),
            BinaryOperator::Divide => self.eval_divide(&left_val, &right_val),
            BinaryOperator::Power => self.eval_power(&left_val, &right_val),

            // String concatenation
            BinaryOperator::Concat => Ok(EvalResult::Text(format!(
                "{}{}",
                left_val.as_text(),
                right_val.as_text()
            ))),

            // Comparison operations
            BinaryOperator::Equal => Ok(EvalResult::Boolean(results_equal(&left_val, &right_val))),
            BinaryOperator::NotEqual => {
                Ok(EvalResult::Boolean(!results_equal(&left_val, &right_val)))
            }
            BinaryOperator::LessThan => self.eval_ordering(&left_val, &right_val, |o| o.is_lt()),
            BinaryOperator::GreaterThan => self.eval_ordering(&left_val, &right_val, |o| o.is_gt()),
            BinaryOperator::LessEqual => self.eval_ordering(&left_val, &right_val, |o| o.is_le()),
            BinaryOperator::GreaterEqual => self.eval_ordering(&left_val, &right_val, |o| o.is_ge()),
        }
    }

    fn eval_add(&self, left: &EvalResult, right: &EvalResult) -> Result<EvalResult, EvalError> {
        match numeric_pair(left, right)? {
            NumericPair::Ints(a, b) => a
                .checked_add(b)
                .map(EvalResult::Int)
                .ok_or(EvalError::Overflow),
            NumericPair::Floats(a, b) => float_result(a + b),
        }
    }

    fn eval_subtract(&self, left: &EvalResult, right: &EvalResult) -> Result<EvalResult, EvalError> {
        match numeric_pair(left, right)? {
            NumericPair::Ints(a, b) => a
                .checked_sub(b)
                .map(EvalResult::Int)
                .ok_or(EvalError::Overflow),
            NumericPair::Floats(a, b) => float_result(a - b),
        }
    }

    fn eval_multiply(&self, left: &EvalResult, right: &EvalResult) -> Result<EvalResult, EvalError> {
        match numeric_pair(left, right)? {
            NumericPair::Ints(a, b) => a
                .checked_mul(b)
                .map(EvalResult::Int)
                .ok_or(EvalError::Overflow),
            NumericPair::Floats(a, b) => float_result(a * b),
        }
    }

    /// Division always produces a float, even for two integers.
    fn eval_divide(&self, left: &EvalResult, right: &EvalResult) -> Result<EvalResult, EvalError> {
        let (a, b) = match numeric_pair(left, right)? {
            NumericPair::Ints(a, b) => (a as f64, b as f64),
            NumericPair::Floats(a, b) => (a, b),
        };
        if b == 0.0 {
            return Err(EvalError::DivisionByZero);
        }
        float_result(a / b)
    }

    fn eval_power(&self, left: &EvalResult, right: &EvalResult) -> Result<EvalResult, EvalError> {
        match numeric_pair(left, right)? {
            NumericPair::Ints(a, b) if b >= 0 => {
                let exp = u32::try_from(b).map_err(|_| EvalError::Overflow)?;
                a.checked_pow(exp)
                    .map(EvalResult::Int)
                    .ok_or(EvalError::Overflow)
            }
            NumericPair::Ints(a, b) => float_result((a as f64).powf(b as f64)),
            NumericPair::Floats(a, b) => float_result(a.powf(b)),
        }
    }

    /// Shared implementation of the four ordering comparisons.
    /// Numbers compare numerically, text compares case-insensitively.
    fn eval_ordering(
        &self,
        left: &EvalResult,
        right: &EvalResult,
        accept: fn(std::cmp::Ordering) -> bool,
    ) -> Result<EvalResult, EvalError> {
        if let (Some(l), Some(r)) = (left.as_f64(), right.as_f64()) {
            let ordering = l
                .partial_cmp(&r)
                .ok_or(EvalError::NonFinite)?;
            return Ok(EvalResult::Boolean(accept(ordering)));
        }
        match (left, right) {
            (EvalResult::Text(l), EvalResult::Text(r)) => Ok(EvalResult::Boolean(accept(
                l.to_uppercase().cmp(&r.to_uppercase()),
            ))),
            _ => Err(EvalError::Incomparable(
                left.describe(),
                right.describe(),
            )),
        }
    }

    /// Evaluates a unary operation.
    fn eval_unary_op(
        &self,
        op: &UnaryOperator,
        operand: &Expression,
    ) -> Result<EvalResult, EvalError> {
        let val = self.evaluate(operand)?;

        match op {
            UnaryOperator::Negate => match val {
                EvalResult::Int(n) => n
                    .checked_neg()
                    .map(EvalResult::Int)
                    .ok_or(EvalError::Overflow),
                other => match other.as_f64() {
                    Some(n) => float_result(-n),
                    None => Err(EvalError::NotNumeric(other.describe())),
                },
            },
        }
    }

    /// Evaluates a function call, dispatching on the uppercased name.
    fn eval_function(&self, name: &str, args: &[Expression]) -> Result<EvalResult, EvalError> {
        let name_upper = name.to_uppercase();

        match name_upper.as_str() {
            // Logical functions
            "IF" => self.fn_if(args),
            "AND" => self.fn_and_or(&name_upper, args, true),
            "OR" => self.fn_and_or(&name_upper, args, false),
            "NOT" => self.fn_not(args),

            // Math functions
            "MIN" => self.fn_min_max(&name_upper, args, std::cmp::Ordering::Less),
            "MAX" => self.fn_min_max(&name_upper, args, std::cmp::Ordering::Greater),
            "ABS" => self.fn_abs(args),
            "ROUND" => self.fn_round(args),
            "FLOOR" => self.fn_floor_ceiling(&name_upper, args, f64::floor),
            "CEILING" | "CEIL" => self.fn_floor_ceiling(&name_upper, args, f64::ceil),
            "SQRT" => self.fn_sqrt(args),
            "POWER" | "POW" => self.fn_power(args),
            "MOD" => self.fn_mod(args),
            "INT" => self.fn_floor_ceiling("INT", args, f64::floor),

            // Text functions
            "LEN" => self.fn_len(args),
            "UPPER" => self.fn_text_map("UPPER", args, |s| s.to_uppercase()),
            "LOWER" => self.fn_text_map("LOWER", args, |s| s.to_lowercase()),
            "TRIM" => self.fn_text_map("TRIM", args, |s| s.trim().to_string()),
            "CONCAT" | "CONCATENATE" => self.fn_concat(args),
            "LEFT" => self.fn_left_right(&name_upper, args, true),
            "RIGHT" => self.fn_left_right(&name_upper, args, false),
            "FIXED" => self.fn_fixed(args),

            _ => Err(EvalError::UnknownFunction(name.to_string())),
        }
    }

    /// Evaluates all arguments in order.
    fn eval_args(&self, args: &[Expression]) -> Result<Vec<EvalResult>, EvalError> {
        args.iter().map(|a| self.evaluate(a)).collect()
    }

    fn require_number(&self, value: &EvalResult) -> Result<f64, EvalError> {
        value
            .as_f64()
            .ok_or_else(|| EvalError::NotNumeric(value.describe()))
    }

    fn require_boolean(&self, value: &EvalResult) -> Result<bool, EvalError> {
        value
            .as_boolean()
            .ok_or_else(|| EvalError::NotBoolean(value.describe()))
    }

    // ==================== Logical Functions ====================

    fn fn_if(&self, args: &[Expression]) -> Result<EvalResult, EvalError> {
        check_args("IF", args, 3, 3)?;
        let condition = self.require_boolean(&self.evaluate(&args[0])?)?;
        if condition {
            self.evaluate(&args[1])
        } else {
            self.evaluate(&args[2])
        }
    }

    fn fn_and_or(
        &self,
        name: &str,
        args: &[Expression],
        all: bool,
    ) -> Result<EvalResult, EvalError> {
        check_args(name, args, 1, usize::MAX)?;
        let mut outcome = all;
        for arg in args {
            let value = self.require_boolean(&self.evaluate(arg)?)?;
            if all {
                outcome = outcome && value;
            } else {
                outcome = outcome || value;
            }
        }
        Ok(EvalResult::Boolean(outcome))
    }

    fn fn_not(&self, args: &[Expression]) -> Result<EvalResult, EvalError> {
        check_args("NOT", args, 1, 1)?;
        let value = self.require_boolean(&self.evaluate(&args[0])?)?;
        Ok(EvalResult::Boolean(!value))
    }

    // ==================== Math Functions ====================

    /// MIN/MAX return the winning operand unchanged, so an all-integer
    /// argument list yields an integer.
    fn fn_min_max(
        &self,
        name: &str,
        args: &[Expression],
        keep: std::cmp::Ordering,
    ) -> Result<EvalResult, EvalError> {
        check_args(name, args, 1, usize::MAX)?;
        let values = self.eval_args(args)?;
        let mut best: Option<(f64, EvalResult)> = None;
        for value in values {
            let n = self.require_number(&value)?;
            best = match best {
                None => Some((n, value)),
                Some((bn, bv)) => {
                    if n.partial_cmp(&bn) == Some(keep) {
                        Some((n, value))
                    } else {
                        Some((bn, bv))
                    }
                }
            };
        }
        match best {
            Some((_, value)) => Ok(value),
            // Unreachable: check_args guarantees at least one argument
            None => Err(EvalError::ArgumentCount {
                function: name.to_string(),
                expected: "at least 1".to_string(),
                got: 0,
            }),
        }
    }

    fn fn_abs(&self, args: &[Expression]) -> Result<EvalResult, EvalError> {
        check_args("ABS", args, 1, 1)?;
        match self.evaluate(&args[0])? {
            EvalResult::Int(n) => n
                .checked_abs()
                .map(EvalResult::Int)
                .ok_or(EvalError::Overflow),
            other => {
                let n = self.require_number(&other)?;
                float_result(n.abs())
            }
        }
    }

    /// ROUND(x) rounds to an integer; ROUND(x, digits) rounds to the
    /// given number of decimal places and stays a float.
    fn fn_round(&self, args: &[Expression]) -> Result<EvalResult, EvalError> {
        check_args("ROUND", args, 1, 2)?;
        let value = self.evaluate(&args[0])?;
        if args.len() == 1 {
            if let EvalResult::Int(n) = value {
                return Ok(EvalResult::Int(n));
            }
            let n = self.require_number(&value)?;
            return float_to_int(n.round());
        }
        let n = self.require_number(&value)?;
        let digits = match self.evaluate(&args[1])? {
            EvalResult::Int(d) => d,
            other => return Err(EvalError::NotNumeric(other.describe())),
        };
        let factor = 10f64.powi(digits as i32);
        float_result((n * factor).round() / factor)
    }

    /// Shared FLOOR/CEILING/INT implementation; integers pass through.
    fn fn_floor_ceiling(
        &self,
        name: &str,
        args: &[Expression],
        apply: fn(f64) -> f64,
    ) -> Result<EvalResult, EvalError> {
        check_args(name, args, 1, 1)?;
        match self.evaluate(&args[0])? {
            EvalResult::Int(n) => Ok(EvalResult::Int(n)),
            other => {
                let n = self.require_number(&other)?;
                float_to_int(apply(n))
            }
        }
    }

    fn fn_sqrt(&self, args: &[Expression]) -> Result<EvalResult, EvalError> {
        check_args("SQRT", args, 1, 1)?;
        let n = self.require_number(&self.evaluate(&args[0])?)?;
        float_result(n.sqrt())
    }

    fn fn_power(&self, args: &[Expression]) -> Result<EvalResult, EvalError> {
        check_args("POWER", args, 2, 2)?;
        let left = self.evaluate(&args[0])?;
        let right = self.evaluate(&args[1])?;
        self.eval_power(&left, &right)
    }

    fn fn_mod(&self, args: &[Expression]) -> Result<EvalResult, EvalError> {
        check_args("MOD", args, 2, 2)?;
        let left = self.evaluate(&args[0])?;
        let right = self.evaluate(&args[1])?;
        match numeric_pair(&left, &right)? {
            NumericPair::Ints(_, 0) => Err(EvalError::DivisionByZero),
            NumericPair::Ints(a, b) => a
                .checked_rem(b)
                .map(EvalResult::Int)
                .ok_or(EvalError::Overflow),
            NumericPair::Floats(_, b) if b == 0.0 => Err(EvalError::DivisionByZero),
            NumericPair::Floats(a, b) => float_result(a % b),
        }
    }

    // ==================== Text Functions ====================

    fn fn_len(&self, args: &[Expression]) -> Result<EvalResult, EvalError> {
        check_args("LEN", args, 1, 1)?;
        let text = self.evaluate(&args[0])?.as_text();
        Ok(EvalResult::Int(text.chars().count() as i64))
    }

    fn fn_text_map(
        &self,
        name: &str,
        args: &[Expression],
        apply: fn(&str) -> String,
    ) -> Result<EvalResult, EvalError> {
        check_args(name, args, 1, 1)?;
        let text = self.evaluate(&args[0])?.as_text();
        Ok(EvalResult::Text(apply(&text)))
    }

    fn fn_concat(&self, args: &[Expression]) -> Result<EvalResult, EvalError> {
        check_args("CONCAT", args, 1, usize::MAX)?;
        let mut result = String::new();
        for arg in args {
            result.push_str(&self.evaluate(arg)?.as_text());
        }
        Ok(EvalResult::Text(result))
    }

    fn fn_left_right(
        &self,
        name: &str,
        args: &[Expression],
        from_left: bool,
    ) -> Result<EvalResult, EvalError> {
        check_args(name, args, 1, 2)?;
        let text = self.evaluate(&args[0])?.as_text();
        let count = if args.len() == 2 {
            match self.evaluate(&args[1])? {
                EvalResult::Int(n) if n >= 0 => n as usize,
                other => return Err(EvalError::NotNumeric(other.describe())),
            }
        } else {
            1
        };
        let chars: Vec<char> = text.chars().collect();
        let taken: String = if from_left {
            chars.iter().take(count).collect()
        } else {
            chars
                .iter()
                .skip(chars.len().saturating_sub(count))
                .collect()
        };
        Ok(EvalResult::Text(taken))
    }

    /// FIXED(x, decimals = 2) renders a number with a fixed number of
    /// decimal places, for use in format rules.
    fn fn_fixed(&self, args: &[Expression]) -> Result<EvalResult, EvalError> {
        check_args("FIXED", args, 1, 2)?;
        let n = self.require_number(&self.evaluate(&args[0])?)?;
        let decimals = if args.len() == 2 {
            match self.evaluate(&args[1])? {
                EvalResult::Int(d) if d >= 0 => d as usize,
                other => return Err(EvalError::NotNumeric(other.describe())),
            }
        } else {
            2
        };
        Ok(EvalResult::Text(format!("{:.*}", decimals, n)))
    }
}

/// Coerces two operands for arithmetic. Two integers stay integral;
/// any float involvement (or numeric text) promotes to floats.
fn numeric_pair(left: &EvalResult, right: &EvalResult) -> Result<NumericPair, EvalError> {
    if let (EvalResult::Int(a), EvalResult::Int(b)) = (left, right) {
        return Ok(NumericPair::Ints(*a, *b));
    }
    match (left.as_f64(), right.as_f64()) {
        (Some(a), Some(b)) => Ok(NumericPair::Floats(a, b)),
        (None, _) => Err(EvalError::NotNumeric(left.describe())),
        (_, None) => Err(EvalError::NotNumeric(right.describe())),
    }
}

/// Wraps a float result, rejecting NaN and infinities so stored values
/// keep the total-order invariant of ParamValue.
fn float_result(value: f64) -> Result<EvalResult, EvalError> {
    if value.is_finite() {
        Ok(EvalResult::Float(value))
    } else {
        Err(EvalError::NonFinite)
    }
}

/// Converts a rounded float into an integer result, guarding the i64 range.
fn float_to_int(value: f64) -> Result<EvalResult, EvalError> {
    if !value.is_finite() {
        return Err(EvalError::NonFinite);
    }
    if value < i64::MIN as f64 || value > i64::MAX as f64 {
        return Err(EvalError::Overflow);
    }
    Ok(EvalResult::Int(value as i64))
}

/// Equality with the spreadsheet-style coercions: numbers compare
/// numerically, text case-insensitively, numeric text against numbers.
fn results_equal(left: &EvalResult, right: &EvalResult) -> bool {
    match (left, right) {
        (EvalResult::Text(l), EvalResult::Text(r)) => l.to_uppercase() == r.to_uppercase(),
        (EvalResult::Boolean(l), EvalResult::Boolean(r)) => l == r,
        _ => match (left.as_f64(), right.as_f64()) {
            (Some(l), Some(r)) => l == r,
            _ => false,
        },
    }
}

/// Validates an argument count against an inclusive range.
fn check_args(name: &str, args: &[Expression], min: usize, max: usize) -> Result<(), EvalError> {
    if args.len() >= min && args.len() <= max {
        return Ok(());
    }
    let expected = if min == max {
        min.to_string()
    } else if max == usize::MAX {
        format!("at least {}", min)
    } else {
        format!("{} to {}", min, max)
    };
    Err(EvalError::ArgumentCount {
        function: name.to_string(),
        expected,
        got: args.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use parser::parse;

    fn eval(input: &str, bindings: &Bindings) -> Result<EvalResult, EvalError> {
        let expr = parse(input).expect("formula should parse");
        Evaluator::new(bindings).evaluate(&expr)
    }

    fn bindings(pairs: &[(&str, ParamValue)]) -> Bindings {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn integer_arithmetic_stays_integral() {
        let env = bindings(&[("width", ParamValue::Int(60)), ("depth", ParamValue::Int(120))]);
        assert_eq!(eval("width * depth", &env), Ok(EvalResult::Int(7200)));
        assert_eq!(eval("width + 4", &env), Ok(EvalResult::Int(64)));
        assert_eq!(eval("2 ^ 10", &env), Ok(EvalResult::Int(1024)));
    }

    #[test]
    fn division_always_floats() {
        let env = Bindings::new();
        assert_eq!(eval("10 / 4", &env), Ok(EvalResult::Float(2.5)));
        assert_eq!(eval("10 / 5", &env), Ok(EvalResult::Float(2.0)));
    }

    #[test]
    fn mixed_arithmetic_promotes() {
        let env = bindings(&[("weight", ParamValue::Float(0.25))]);
        assert_eq!(eval("weight * 4", &env), Ok(EvalResult::Float(1.0)));
    }

    #[test]
    fn unbound_variable_fails() {
        let env = Bindings::new();
        assert_eq!(
            eval("width + 1", &env),
            Err(EvalError::UnboundVariable("width".to_string()))
        );
    }

    #[test]
    fn division_by_zero_fails() {
        let env = Bindings::new();
        assert_eq!(eval("1 / 0", &env), Err(EvalError::DivisionByZero));
        assert_eq!(eval("MOD(5, 0)", &env), Err(EvalError::DivisionByZero));
    }

    #[test]
    fn integer_overflow_fails() {
        let env = Bindings::new();
        assert_eq!(
            eval("9223372036854775807 + 1", &env),
            Err(EvalError::Overflow)
        );
    }

    #[test]
    fn non_finite_results_fail() {
        let env = Bindings::new();
        assert_eq!(eval("SQRT(0 - 1)", &env), Err(EvalError::NonFinite));
    }

    #[test]
    fn comparisons_and_if() {
        let env = bindings(&[("width", ParamValue::Int(120))]);
        assert_eq!(
            eval("IF(width > 60, \"wide\", \"narrow\")", &env),
            Ok(EvalResult::Text("wide".to_string()))
        );
        assert_eq!(eval("width <= 120", &env), Ok(EvalResult::Boolean(true)));
    }

    #[test]
    fn concat_builds_text() {
        let env = bindings(&[("value", ParamValue::Int(40))]);
        assert_eq!(
            eval("\"stack of \" & value", &env),
            Ok(EvalResult::Text("stack of 40".to_string()))
        );
    }

    #[test]
    fn text_comparison_is_case_insensitive() {
        let env = Bindings::new();
        assert_eq!(eval("\"red\" = \"RED\"", &env), Ok(EvalResult::Boolean(true)));
        assert_eq!(
            eval("\"blue\" < \"red\"", &env),
            Ok(EvalResult::Boolean(true))
        );
    }

    #[test]
    fn min_max_preserve_integer_operands() {
        let env = Bindings::new();
        assert_eq!(eval("MAX(3, 7, 5)", &env), Ok(EvalResult::Int(7)));
        assert_eq!(eval("MIN(3, 2.5)", &env), Ok(EvalResult::Float(2.5)));
    }

    #[test]
    fn round_variants() {
        let env = Bindings::new();
        assert_eq!(eval("ROUND(2.6)", &env), Ok(EvalResult::Int(3)));
        assert_eq!(eval("ROUND(2.25, 1)", &env), Ok(EvalResult::Float(2.3)));
        assert_eq!(eval("ROUND(7)", &env), Ok(EvalResult::Int(7)));
    }

    #[test]
    fn text_functions() {
        let env = Bindings::new();
        assert_eq!(
            eval("UPPER(\"red\")", &env),
            Ok(EvalResult::Text("RED".to_string()))
        );
        assert_eq!(eval("LEN(\"red\")", &env), Ok(EvalResult::Int(3)));
        assert_eq!(
            eval("LEFT(\"LR2052\", 2)", &env),
            Ok(EvalResult::Text("LR".to_string()))
        );
        assert_eq!(
            eval("FIXED(2.5)", &env),
            Ok(EvalResult::Text("2.50".to_string()))
        );
    }

    #[test]
    fn unknown_function_fails() {
        let env = Bindings::new();
        assert_eq!(
            eval("NOPE(1)", &env),
            Err(EvalError::UnknownFunction("NOPE".to_string()))
        );
    }

    #[test]
    fn boolean_results_store_as_integers() {
        assert_eq!(EvalResult::Boolean(true).into_value(), ParamValue::Int(1));
        assert_eq!(EvalResult::Boolean(false).into_value(), ParamValue::Int(0));
    }
}
