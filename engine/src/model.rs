//! FILENAME: engine/src/model.rs
//! PURPOSE: The part records and declared parameters handed to the engine.
//! CONTEXT: A `Model` is one catalog entry: its raw attribute strings
//! as supplied by the data source, plus the typed and formatted value
//! maps the resolver fills in exactly once. File references are opaque
//! to this core; they are only checked against the scanned inventory.

use crate::error::InputError;
use crate::value::ParamValue;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A parameter as declared by the data source: display title, internal
/// name, and display unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterDecl {
    pub title: String,
    pub name: String,
    pub unit: String,
}

/// A single model entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Model {
    /// Unique part id within the catalog.
    pub part_id: String,

    /// Optional display title.
    #[serde(default)]
    pub title: String,

    /// References to the printable model files. Opaque here.
    #[serde(default)]
    pub model_files: Vec<String>,

    /// References to the part images. Opaque here.
    #[serde(default)]
    pub image_files: Vec<String>,

    /// Raw attribute values as supplied, keyed by parameter name.
    #[serde(rename = "parameters")]
    pub raw_values: HashMap<String, String>,

    /// Typed values, filled by the resolver.
    #[serde(default, skip_deserializing)]
    pub values: HashMap<String, ParamValue>,

    /// Display strings, filled by the resolver.
    #[serde(default, skip_deserializing)]
    pub formatted_values: HashMap<String, String>,
}

impl Model {
    pub fn new(part_id: impl Into<String>, raw_values: HashMap<String, String>) -> Self {
        Model {
            part_id: part_id.into(),
            title: String::new(),
            model_files: Vec::new(),
            image_files: Vec::new(),
            raw_values,
            values: HashMap::new(),
            formatted_values: HashMap::new(),
        }
    }
}

/// The data read from the source: declared parameters and all models.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogData {
    /// Name of the component family this catalog describes.
    pub component_name: String,

    /// Optional catalog title; the renderer falls back to
    /// `component_name` when empty.
    #[serde(default)]
    pub title: String,

    /// Declared parameters, in source order.
    #[serde(rename = "parameter")]
    pub parameter: Vec<ParameterDecl>,

    /// All model entries.
    pub models: Vec<Model>,
}

/// The file inventory produced by the (external) directory scan:
/// file name to opaque path.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileSet {
    pub model_files: HashMap<String, String>,
    pub image_files: HashMap<String, String>,
}

impl FileSet {
    pub fn contains_model(&self, name: &str) -> bool {
        self.model_files.contains_key(name)
    }

    pub fn contains_image(&self, name: &str) -> bool {
        self.image_files.contains_key(name)
    }
}

/// Checks every file reference of every model against the scanned
/// inventory. A missing file rejects the part (and with it the whole
/// run) instead of silently dropping it from the catalog.
pub fn check_file_references(models: &[Model], files: &FileSet) -> Result<(), InputError> {
    for model in models {
        for reference in &model.model_files {
            if !files.contains_model(file_name(reference)) {
                return Err(InputError::UnknownFileReference {
                    part_id: model.part_id.clone(),
                    file: reference.clone(),
                });
            }
        }
        for reference in &model.image_files {
            if !files.contains_image(file_name(reference)) {
                return Err(InputError::UnknownFileReference {
                    part_id: model.part_id.clone(),
                    file: reference.clone(),
                });
            }
        }
    }
    Ok(())
}

/// The inventory is keyed by bare file name; references may carry
/// directory components.
fn file_name(reference: &str) -> &str {
    reference.rsplit('/').next().unwrap_or(reference)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_deserializes_from_source_json() {
        let model: Model = serde_json::from_str(
            r#"{
                "part_id": "LR2052-132A",
                "title": "Box 60x120",
                "model_files": ["parts/LR2052-132A.3mf"],
                "image_files": ["LR2052-132A.jpg"],
                "parameters": { "width": "60", "depth": "120" }
            }"#,
        )
        .unwrap();
        assert_eq!(model.part_id, "LR2052-132A");
        assert_eq!(model.raw_values["width"], "60");
        assert!(model.values.is_empty());
        assert!(model.formatted_values.is_empty());
    }

    #[test]
    fn file_check_accepts_known_references() {
        let mut files = FileSet::default();
        files
            .model_files
            .insert("a.3mf".to_string(), "/scan/a.3mf".to_string());
        files
            .image_files
            .insert("a.jpg".to_string(), "/scan/a.jpg".to_string());

        let mut model = Model::new("A", HashMap::new());
        model.model_files.push("nested/dir/a.3mf".to_string());
        model.image_files.push("a.jpg".to_string());

        assert!(check_file_references(&[model], &files).is_ok());
    }

    #[test]
    fn file_check_rejects_unknown_references() {
        let files = FileSet::default();
        let mut model = Model::new("A", HashMap::new());
        model.model_files.push("missing.3mf".to_string());

        let err = check_file_references(&[model], &files).unwrap_err();
        assert_eq!(
            err,
            InputError::UnknownFileReference {
                part_id: "A".to_string(),
                file: "missing.3mf".to_string(),
            }
        );
    }
}
