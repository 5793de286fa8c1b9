//! FILENAME: engine/src/resolve.rs
//! PURPOSE: Fills the typed and formatted value maps of every model.
//! CONTEXT: Runs in two passes per model. Pass 1 coerces every raw
//! string into a typed value. Pass 2 evaluates derived formulas, in
//! active-set order, over the values computed so far; a formula
//! referencing a derived parameter that appears later in the set fails
//! with an unbound-variable error at this point, by design. After both
//! passes every parameter in the active set is also formatted, so the
//! grouping engine never touches a raw string again.

use crate::error::{InputError, ResolveError};
use crate::evaluator::Evaluator;
use crate::format::format_value;
use crate::model::Model;
use crate::parameter::Parameter;
use crate::value::ParamValue;
use std::collections::HashSet;

/// Resolves and formats all models in place.
/// After a successful return, `values` and `formatted_values` hold an
/// entry for every parameter in the active set, on every model.
pub fn resolve_models(models: &mut [Model], parameters: &[Parameter]) -> Result<(), ResolveError> {
    log::info!("resolving values for {} models", models.len());

    let mut seen_ids = HashSet::new();
    for model in models.iter() {
        if !seen_ids.insert(model.part_id.as_str()) {
            return Err(InputError::DuplicatePartId(model.part_id.clone()).into());
        }
    }

    for model in models.iter_mut() {
        resolve_model(model, parameters)?;
        log::debug!("resolved part {}", model.part_id);
    }
    Ok(())
}

fn resolve_model(model: &mut Model, parameters: &[Parameter]) -> Result<(), ResolveError> {
    // Pass 1: coerce the raw values. Derived parameters with a formula
    // have no raw value; the per-part derived variant does.
    for parameter in parameters {
        if parameter.derived_expression.is_some() {
            continue;
        }
        let raw = model.raw_values.get(&parameter.name).ok_or_else(|| {
            InputError::MissingValue {
                part_id: model.part_id.clone(),
                parameter: parameter.name.clone(),
            }
        })?;
        let value = ParamValue::parse_raw(raw).ok_or_else(|| InputError::InvalidNumber {
            part_id: model.part_id.clone(),
            parameter: parameter.name.clone(),
            raw: raw.clone(),
        })?;
        model.values.insert(parameter.name.clone(), value);
    }

    // Pass 2: evaluate derived formulas over the values so far.
    for parameter in parameters {
        let Some(expression) = &parameter.derived_expression else {
            continue;
        };
        let result = Evaluator::new(&model.values)
            .evaluate(expression)
            .map_err(|source| ResolveError::Derived {
                parameter: parameter.name.clone(),
                part_id: model.part_id.clone(),
                source,
            })?;
        model
            .values
            .insert(parameter.name.clone(), result.into_value());
    }

    // Format every active parameter.
    for parameter in parameters {
        // Pass 2 guarantees the entry exists
        let value = &model.values[&parameter.name];
        let formatted =
            format_value(parameter, value).map_err(|source| ResolveError::Format {
                parameter: parameter.name.clone(),
                part_id: model.part_id.clone(),
                source,
            })?;
        model
            .formatted_values
            .insert(parameter.name.clone(), formatted);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CatalogConfig, DerivedDef};
    use crate::model::ParameterDecl;
    use crate::parameter::build_parameters;
    use std::collections::HashMap;

    fn declared() -> Vec<ParameterDecl> {
        vec![
            ParameterDecl {
                title: "Width".to_string(),
                name: "width".to_string(),
                unit: "mm".to_string(),
            },
            ParameterDecl {
                title: "Depth".to_string(),
                name: "depth".to_string(),
                unit: "mm".to_string(),
            },
        ]
    }

    fn config_with_area() -> CatalogConfig {
        let mut derived = HashMap::new();
        derived.insert(
            "area".to_string(),
            DerivedDef {
                title: "Area".to_string(),
                unit: "mm2".to_string(),
                expression: "width * depth".to_string(),
            },
        );
        CatalogConfig {
            parameter_order: vec![
                "width".to_string(),
                "depth".to_string(),
                "area".to_string(),
            ],
            detail_order: Vec::new(),
            primary_group: vec!["width".to_string()],
            derived,
            derived_parameters: Vec::new(),
            format: HashMap::new(),
        }
    }

    fn model(part_id: &str, pairs: &[(&str, &str)]) -> Model {
        let raw = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Model::new(part_id, raw)
    }

    #[test]
    fn resolves_and_formats_every_active_parameter() {
        let parameters = build_parameters(&declared(), &config_with_area()).unwrap();
        let mut models = vec![model("A", &[("width", "10"), ("depth", "20")])];

        resolve_models(&mut models, &parameters).unwrap();

        let m = &models[0];
        for name in ["width", "depth", "area"] {
            assert!(m.values.contains_key(name), "missing value for {}", name);
            assert!(
                m.formatted_values.contains_key(name),
                "missing formatted value for {}",
                name
            );
        }
        assert_eq!(m.formatted_values["width"], "10 mm");
        assert_eq!(m.formatted_values["area"], "200 mm2");
    }

    #[test]
    fn derived_value_equals_direct_arithmetic() {
        let parameters = build_parameters(&declared(), &config_with_area()).unwrap();
        let mut models = vec![model("A", &[("width", "10"), ("depth", "20")])];

        resolve_models(&mut models, &parameters).unwrap();

        // Exact equality, not approximate: integer arithmetic stays exact.
        assert_eq!(models[0].values["area"], ParamValue::Int(10 * 20));
    }

    #[test]
    fn missing_raw_value_is_fatal() {
        let parameters = build_parameters(&declared(), &config_with_area()).unwrap();
        let mut models = vec![model("A", &[("width", "10")])];

        let err = resolve_models(&mut models, &parameters).unwrap_err();
        assert_eq!(
            err,
            ResolveError::Input(InputError::MissingValue {
                part_id: "A".to_string(),
                parameter: "depth".to_string(),
            })
        );
    }

    #[test]
    fn unparsable_float_is_fatal() {
        let parameters = build_parameters(&declared(), &config_with_area()).unwrap();
        let mut models = vec![model("A", &[("width", "2.5x"), ("depth", "20")])];

        let err = resolve_models(&mut models, &parameters).unwrap_err();
        assert!(matches!(
            err,
            ResolveError::Input(InputError::InvalidNumber { .. })
        ));
    }

    #[test]
    fn derived_failure_names_parameter_and_part() {
        let mut config = config_with_area();
        config.derived.get_mut("area").unwrap().expression = "width * height".to_string();
        let parameters = build_parameters(&declared(), &config).unwrap();
        let mut models = vec![model("B", &[("width", "10"), ("depth", "20")])];

        let err = resolve_models(&mut models, &parameters).unwrap_err();
        match err {
            ResolveError::Derived {
                parameter, part_id, ..
            } => {
                assert_eq!(parameter, "area");
                assert_eq!(part_id, "B");
            }
            other => panic!("expected derived error, got {:?}", other),
        }
    }

    #[test]
    fn forward_reference_between_derived_parameters_fails() {
        // "volume" references "area", which appears later in the set.
        let mut derived = HashMap::new();
        derived.insert(
            "volume".to_string(),
            DerivedDef {
                title: "Volume".to_string(),
                unit: String::new(),
                expression: "area * 2".to_string(),
            },
        );
        derived.insert(
            "area".to_string(),
            DerivedDef {
                title: "Area".to_string(),
                unit: String::new(),
                expression: "width * depth".to_string(),
            },
        );
        let config = CatalogConfig {
            parameter_order: vec![
                "width".to_string(),
                "depth".to_string(),
                "volume".to_string(),
                "area".to_string(),
            ],
            detail_order: Vec::new(),
            primary_group: vec!["width".to_string()],
            derived,
            derived_parameters: Vec::new(),
            format: HashMap::new(),
        };
        let parameters = build_parameters(&declared(), &config).unwrap();
        let mut models = vec![model("A", &[("width", "10"), ("depth", "20")])];

        let err = resolve_models(&mut models, &parameters).unwrap_err();
        assert!(matches!(err, ResolveError::Derived { parameter, .. } if parameter == "volume"));
    }

    #[test]
    fn per_part_derived_reads_raw_values() {
        let mut config = config_with_area();
        config.derived_parameters.push("depth".to_string());
        let parameters = build_parameters(&declared(), &config).unwrap();
        let mut models = vec![model("A", &[("width", "10"), ("depth", "20")])];

        resolve_models(&mut models, &parameters).unwrap();
        assert_eq!(models[0].values["depth"], ParamValue::Int(20));
    }

    #[test]
    fn duplicate_part_ids_are_rejected() {
        let parameters = build_parameters(&declared(), &config_with_area()).unwrap();
        let mut models = vec![
            model("A", &[("width", "10"), ("depth", "20")]),
            model("A", &[("width", "20"), ("depth", "20")]),
        ];

        let err = resolve_models(&mut models, &parameters).unwrap_err();
        assert_eq!(
            err,
            ResolveError::Input(InputError::DuplicatePartId("A".to_string()))
        );
    }

    #[test]
    fn categorical_text_survives_resolution() {
        let mut decls = declared();
        decls.push(ParameterDecl {
            title: "Grid Layout".to_string(),
            name: "grid_layout".to_string(),
            unit: String::new(),
        });
        let mut config = config_with_area();
        config.parameter_order.push("grid_layout".to_string());
        let parameters = build_parameters(&decls, &config).unwrap();
        let mut models = vec![model(
            "A",
            &[
                ("width", "10"),
                ("depth", "20"),
                ("grid_layout", "Grid layout 2"),
            ],
        )];

        resolve_models(&mut models, &parameters).unwrap();
        assert_eq!(
            models[0].values["grid_layout"],
            ParamValue::Text("Grid layout 2".to_string())
        );
        assert_eq!(models[0].formatted_values["grid_layout"], "Grid layout 2");
    }
}
