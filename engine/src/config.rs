//! FILENAME: engine/src/config.rs
//! PURPOSE: The normalized catalog configuration consumed by the engine.
//! CONTEXT: Configuration-file syntax (INI, TOML, ...) is the loader's
//! concern; whatever the format, the loader hands the engine this
//! structure. It is an immutable snapshot of user intent, built once
//! per run.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Definition of a derived parameter: a parameter not present in the
/// source data, computed from the others by a formula.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DerivedDef {
    /// Display title used in group and table headings.
    pub title: String,

    /// Display unit, appended to formatted values. May be empty.
    #[serde(default)]
    pub unit: String,

    /// The formula, evaluated over the other parameter values by name.
    pub expression: String,
}

/// The complete normalized configuration for one catalog run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Parameter names used for sorting, value sets, grouping, and the
    /// cross-reference tables, in order. Must name at least one.
    pub parameter_order: Vec<String>,

    /// Parameter names shown in the per-part detail block, in order.
    /// Empty means "same as parameter_order".
    #[serde(default)]
    pub detail_order: Vec<String>,

    /// One or two parameter names the primary model groups are built
    /// from.
    pub primary_group: Vec<String>,

    /// Derived parameter definitions, keyed by parameter name.
    #[serde(default)]
    pub derived: HashMap<String, DerivedDef>,

    /// Names flagged as derived without a formula: supplied per part
    /// like a raw value, but excluded from the cross-reference table
    /// family because they are defined per-part rather than
    /// classifiable into a small value set.
    #[serde(default)]
    pub derived_parameters: Vec<String>,

    /// Format-rule expressions keyed by parameter name, overriding the
    /// default value formatting. The single visible name is `value`.
    #[serde(default)]
    pub format: HashMap<String, String>,
}

impl CatalogConfig {
    /// The effective detail ordering: `detail_order` when given,
    /// otherwise `parameter_order`.
    pub fn detail_names(&self) -> &[String] {
        if self.detail_order.is_empty() {
            &self.parameter_order
        } else {
            &self.detail_order
        }
    }

    /// The active parameter set: `parameter_order` followed by the
    /// detail names not already listed, preserving order.
    pub fn active_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.parameter_order.iter().map(String::as_str).collect();
        for name in self.detail_names() {
            if !names.contains(&name.as_str()) {
                names.push(name);
            }
        }
        names
    }
}
