//! FILENAME: report-engine/src/report.rs
//! PURPOSE: The report model - the output object tree for the renderer.
//! CONTEXT: These structures are the whole contract with the rendering
//! layer: sorted models, primary groups, cross-reference tables, and
//! the resolved parameter lists for per-part detail blocks. They are
//! immutable snapshots; nothing mutates a report after it is built.

use engine::{Model, ParamValue, Parameter};
use serde::{Deserialize, Serialize};

/// A renderer-facing snapshot of a resolved parameter.
/// Expressions stay behind in the engine; the renderer only needs the
/// display attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterInfo {
    pub name: String,
    pub title: String,
    pub unit: String,
    pub is_derived: bool,
}

impl From<&Parameter> for ParameterInfo {
    fn from(parameter: &Parameter) -> Self {
        ParameterInfo {
            name: parameter.name.clone(),
            title: parameter.title.clone(),
            unit: parameter.unit.clone(),
            is_derived: parameter.is_derived,
        }
    }
}

/// One distinct value of an attribute, paired with its display text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueEntry {
    pub value: ParamValue,
    pub formatted: String,
}

/// The sorted distinct values an attribute takes across the catalog.
/// Entries are strictly ascending and pairwise distinct.
pub type ValueSet = Vec<ValueEntry>;

/// A group of models: the main document sectioning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelGroup {
    /// Group heading; empty for the single-group special case.
    pub title: String,

    /// Member positions into the report's sorted model list, in global
    /// sort order.
    pub models: Vec<usize>,
}

/// A table prepared for output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub title: String,

    /// Column headers; the first is always "Part ID".
    pub fields: Vec<String>,

    /// One row of display text per matching model, in global sort order.
    pub rows: Vec<Vec<String>>,
}

/// A family of tables grouped by one attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableGroup {
    pub title: String,
    pub tables: Vec<Table>,
}

/// The complete report model handed to the rendering layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Name of the component family this catalog describes.
    pub component_name: String,

    /// Catalog title; falls back to `component_name` when empty.
    pub title: String,

    /// All models, fully resolved and formatted, in global sort order.
    /// The report owns them; groups and tables refer into this list.
    pub models: Vec<Model>,

    /// The primary model groups.
    pub groups: Vec<ModelGroup>,

    /// The per-attribute cross-reference table families.
    pub table_groups: Vec<TableGroup>,

    /// The sorting/grouping parameters, in parameter_order.
    pub parameters: Vec<ParameterInfo>,

    /// The parameters shown in per-part detail blocks, in detail_order.
    pub detail_parameters: Vec<ParameterInfo>,
}
