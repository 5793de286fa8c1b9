//! FILENAME: report-engine/src/builder.rs
//! PURPOSE: The ordering and grouping engine that assembles the report.
//! CONTEXT: Runs only on fully resolved models. One pass, in order:
//!
//! 1. Stable global sort by the parameter_order value tuple
//! 2. Per-attribute value sets (distinct values, ascending, formatted)
//! 3. Primary model groups from one or two grouping attributes
//! 4. Per-attribute cross-reference tables
//!
//! The sorted order from step 1 is the canonical iteration order for
//! everything downstream; group members and table rows never reorder.

use crate::report::{ModelGroup, ParameterInfo, Report, Table, TableGroup, ValueEntry, ValueSet};
use engine::{
    build_parameters, check_file_references, resolve_models, CatalogConfig, CatalogData,
    ConfigError, FileSet, InputError, Model, Parameter, ResolveError,
};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use thiserror::Error;

/// Any failure while building a report. Every variant aborts the run;
/// no partial report is ever returned.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReportError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

/// Builds the complete report model for one catalog.
///
/// Consumes the catalog data: the returned report owns the models.
/// When the scanned file inventory is available, every part's file
/// references are checked against it before any value is computed.
pub fn build_report(
    data: CatalogData,
    config: &CatalogConfig,
    files: Option<&FileSet>,
) -> Result<Report, ReportError> {
    log::info!(
        "building report for '{}' with {} models",
        data.component_name,
        data.models.len()
    );

    let parameters = build_parameters(&data.parameter, config)?;
    if let Some(files) = files {
        check_file_references(&data.models, files)?;
    }

    let mut models = data.models;
    resolve_models(&mut models, &parameters)?;

    let builder = ReportBuilder::new(&parameters, config);
    builder.sort_models(&mut models);
    let value_sets = builder.value_sets(&models)?;
    let groups = builder.build_groups(&models, &value_sets)?;
    let table_groups = builder.build_tables(&models, &value_sets);

    log::info!(
        "report ready: {} groups, {} table groups",
        groups.len(),
        table_groups.len()
    );

    Ok(Report {
        component_name: data.component_name,
        title: data.title,
        models,
        groups,
        table_groups,
        parameters: builder
            .order
            .iter()
            .map(|&i| ParameterInfo::from(&parameters[i]))
            .collect(),
        detail_parameters: builder
            .detail
            .iter()
            .map(|&i| ParameterInfo::from(&parameters[i]))
            .collect(),
    })
}

/// Shared state for the grouping steps: the resolved parameters plus
/// index lookups into them.
struct ReportBuilder<'a> {
    parameters: &'a [Parameter],
    config: &'a CatalogConfig,

    /// Positions of the parameter_order attributes, in order.
    order: Vec<usize>,

    /// Positions of the detail_order attributes, in order.
    detail: Vec<usize>,

    /// Parameter name to position in `parameters`.
    index: FxHashMap<&'a str, usize>,
}

impl<'a> ReportBuilder<'a> {
    fn new(parameters: &'a [Parameter], config: &'a CatalogConfig) -> Self {
        let index: FxHashMap<&str, usize> = parameters
            .iter()
            .enumerate()
            .map(|(i, p)| (p.name.as_str(), i))
            .collect();
        // The registry resolved every active name, so these lookups
        // cannot fail.
        let order = config
            .parameter_order
            .iter()
            .map(|name| index[name.as_str()])
            .collect();
        let detail = config
            .detail_names()
            .iter()
            .map(|name| index[name.as_str()])
            .collect();
        ReportBuilder {
            parameters,
            config,
            order,
            detail,
            index,
        }
    }

    /// Stable sort by the parameter_order value tuple, left to right,
    /// ascending, under the ParamValue total order.
    fn sort_models(&self, models: &mut [Model]) {
        log::debug!("sorting {} models", models.len());
        models.sort_by(|a, b| {
            for &i in &self.order {
                let name = &self.parameters[i].name;
                let ordering = a.values[name].cmp(&b.values[name]);
                if ordering != std::cmp::Ordering::Equal {
                    return ordering;
                }
            }
            std::cmp::Ordering::Equal
        });
    }

    /// Collects the distinct values of every parameter_order attribute,
    /// ascending, paired with their display text.
    fn value_sets(&self, models: &[Model]) -> Result<FxHashMap<String, ValueSet>, ReportError> {
        let mut value_sets = FxHashMap::default();
        for &i in &self.order {
            let parameter = &self.parameters[i];
            let mut values: Vec<_> = models
                .iter()
                .map(|m| m.values[&parameter.name].clone())
                .collect();
            values.sort();
            values.dedup();

            let mut entries = ValueSet::with_capacity(values.len());
            for value in values {
                let formatted = engine::format_value(parameter, &value).map_err(|source| {
                    ResolveError::LabelFormat {
                        parameter: parameter.name.clone(),
                        source,
                    }
                })?;
                entries.push(ValueEntry { value, formatted });
            }
            value_sets.insert(parameter.name.clone(), entries);
        }
        Ok(value_sets)
    }

    /// Builds the primary model groups.
    fn build_groups(
        &self,
        models: &[Model],
        value_sets: &FxHashMap<String, ValueSet>,
    ) -> Result<Vec<ModelGroup>, ReportError> {
        // With a single active attribute, grouping by it would just
        // repeat the model list; emit one untitled group instead.
        if self.parameters.len() == 1 {
            return Ok(vec![ModelGroup {
                title: String::new(),
                models: (0..models.len()).collect(),
            }]);
        }

        let group_parameters = self.primary_group_parameters(value_sets)?;

        let mut groups = Vec::new();
        match group_parameters.as_slice() {
            [parameter] => {
                for entry in &value_sets[&parameter.name] {
                    groups.push(ModelGroup {
                        title: format!(
                            "Models with {} = {}",
                            parameter.title, entry.formatted
                        ),
                        models: filter_members(models, &[(*parameter, entry)]),
                    });
                }
            }
            [first, second] => {
                // Cartesian product, first attribute major.
                for outer in &value_sets[&first.name] {
                    for inner in &value_sets[&second.name] {
                        groups.push(ModelGroup {
                            title: format!(
                                "Models with {} = {} {} = {}",
                                first.title, outer.formatted, second.title, inner.formatted
                            ),
                            models: filter_members(
                                models,
                                &[(*first, outer), (*second, inner)],
                            ),
                        });
                    }
                }
            }
            other => {
                return Err(ConfigError::PrimaryGroupArity(other.len()).into());
            }
        }
        Ok(groups)
    }

    /// Resolves the primary-group attribute list. Each name must carry
    /// a value set, which means it must appear in parameter_order.
    fn primary_group_parameters(
        &self,
        value_sets: &FxHashMap<String, ValueSet>,
    ) -> Result<SmallVec<[&'a Parameter; 2]>, ReportError> {
        if self.config.primary_group.is_empty() || self.config.primary_group.len() > 2 {
            return Err(ConfigError::PrimaryGroupArity(self.config.primary_group.len()).into());
        }
        let mut group_parameters = SmallVec::new();
        for name in &self.config.primary_group {
            if !value_sets.contains_key(name.as_str()) {
                return Err(ConfigError::PrimaryGroupNotInOrder(name.clone()).into());
            }
            group_parameters.push(&self.parameters[self.index[name.as_str()]]);
        }
        Ok(group_parameters)
    }

    /// Builds the per-attribute cross-reference table families.
    ///
    /// Skipped entirely for a single-attribute catalog. An attribute
    /// with fewer than two distinct values classifies nothing, and a
    /// no-formula derived attribute is defined per part rather than
    /// classifiable, so both are left out.
    fn build_tables(
        &self,
        models: &[Model],
        value_sets: &FxHashMap<String, ValueSet>,
    ) -> Vec<TableGroup> {
        if self.parameters.len() == 1 {
            return Vec::new();
        }

        let mut table_groups = Vec::new();
        for &i in &self.order {
            let parameter = &self.parameters[i];
            let entries = &value_sets[&parameter.name];
            if entries.len() < 2 {
                continue;
            }
            if parameter.is_per_part_derived() {
                continue;
            }

            // Columns: part id, then every other ordering attribute.
            let mut fields = vec!["Part ID".to_string()];
            let mut columns: Vec<&str> = Vec::new();
            for &j in &self.order {
                let other = &self.parameters[j];
                if other.name != parameter.name {
                    fields.push(other.title.clone());
                    columns.push(&other.name);
                }
            }

            let mut tables = Vec::with_capacity(entries.len());
            for entry in entries {
                let rows = models
                    .iter()
                    .filter(|m| m.values[&parameter.name] == entry.value)
                    .map(|m| {
                        let mut row = Vec::with_capacity(columns.len() + 1);
                        row.push(m.part_id.clone());
                        for column in &columns {
                            row.push(m.formatted_values[*column].clone());
                        }
                        row
                    })
                    .collect();
                tables.push(Table {
                    title: format!("{} = {}", parameter.title, entry.formatted),
                    fields: fields.clone(),
                    rows,
                });
            }
            table_groups.push(TableGroup {
                title: format!("Tables Grouped by {}", parameter.title),
                tables,
            });
        }
        table_groups
    }
}

/// Positions of the models matching every (parameter, value) filter,
/// in global sort order.
fn filter_members(models: &[Model], filters: &[(&Parameter, &ValueEntry)]) -> Vec<usize> {
    models
        .iter()
        .enumerate()
        .filter(|(_, m)| {
            filters
                .iter()
                .all(|(parameter, entry)| m.values[&parameter.name] == entry.value)
        })
        .map(|(i, _)| i)
        .collect()
}
