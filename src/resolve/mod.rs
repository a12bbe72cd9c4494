//! Field reference resolution.
//!
//! Resolution walks a [`FieldReference`] down to the catalog field it names,
//! following foreign keys into other tables and collecting the FK fields it
//! crossed on the way. Nothing here fails: references that cannot be resolved
//! log a diagnostic and yield `None`, and the description layer substitutes a
//! placeholder.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

use crate::metadata::{
    operators_lookup, CatalogProvider, Field, FieldCapabilities, TableMetadata, TYPE_FLOAT, TYPE_INTEGER,
    TYPE_NUMBER,
};
use crate::query::{AggregationOperator, FieldId, FieldReference, StructuredQuery, TargetId};

static TRAILING_ID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i) id$").unwrap());

/// The outcome of resolving a field reference.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedField<'a> {
    /// The table the field belongs to.
    pub table: &'a TableMetadata,
    /// The field itself. Owned when synthesized rather than found.
    pub field: Cow<'a, Field>,
    /// FK fields crossed to reach `table`, outermost first.
    pub path: Vec<&'a Field>,
    /// Datetime bucketing unit, when the reference carries one.
    pub unit: Option<String>,
}

/// A column of a query's result set.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryColumn {
    pub name: String,
    pub display_name: Option<String>,
    pub base_type: Option<String>,
    pub special_type: Option<String>,
    pub unit: Option<String>,
}

/// Resolves field references against catalog metadata.
pub struct Resolver<'a> {
    catalog: &'a dyn CatalogProvider,
    capabilities: &'a dyn FieldCapabilities,
}

impl<'a> Resolver<'a> {
    pub fn new(catalog: &'a dyn CatalogProvider, capabilities: &'a dyn FieldCapabilities) -> Self {
        Self {
            catalog,
            capabilities,
        }
    }

    /// Resolve `field` against `table`.
    pub fn resolve_target(
        &self,
        field: &FieldReference,
        table: &'a TableMetadata,
    ) -> Option<ResolvedField<'a>> {
        self.resolve_with_path(field, table, Vec::new())
    }

    fn resolve_with_path(
        &self,
        field: &FieldReference,
        table: &'a TableMetadata,
        path: Vec<&'a Field>,
    ) -> Option<ResolvedField<'a>> {
        match field {
            FieldReference::Plain(id) | FieldReference::LocalField(id) => {
                let Some(found) = table.field(*id) else {
                    tracing::warn!(field_id = id, table = table.id, "field not found in table");
                    return None;
                };
                Some(ResolvedField {
                    table,
                    field: Cow::Borrowed(found),
                    path,
                    unit: None,
                })
            }
            FieldReference::ForeignKey { source, dest } => {
                let Some(TargetId::Field(fk_id)) = source.target_id() else {
                    tracing::warn!(field = %field.to_value(), "foreign key source is not a field id");
                    return None;
                };
                let Some(fk_field) = table.field(fk_id) else {
                    tracing::warn!(field_id = fk_id, table = table.id, "foreign key field not found");
                    return None;
                };
                let Some(target_table) = fk_field
                    .target
                    .as_ref()
                    .and_then(|target| self.catalog.table(target.table_id))
                else {
                    tracing::warn!(field_id = fk_id, "foreign key target table not available");
                    return None;
                };
                let mut path = path;
                path.push(fk_field);
                self.resolve_with_path(dest, target_table, path)
            }
            FieldReference::DatetimeCast { field: inner, unit, .. } => {
                let mut resolved = self.resolve_with_path(inner, table, path)?;
                resolved.unit = Some(unit.clone());
                Some(resolved)
            }
            FieldReference::BinningStrategy { field: inner, .. } => {
                self.resolve_with_path(inner, table, path)
            }
            FieldReference::Expression(name) => Some(ResolvedField {
                table,
                field: Cow::Owned(self.expression_field(name, table)),
                path,
                unit: None,
            }),
            FieldReference::FieldLiteral { name, base_type } => Some(ResolvedField {
                table,
                field: Cow::Owned(Field {
                    name: name.clone(),
                    display_name: Some(name.clone()),
                    base_type: Some(base_type.clone()),
                    ..Default::default()
                }),
                path,
                unit: None,
            }),
            FieldReference::AggregateResult(index) => {
                tracing::debug!(index, "aggregate results have no catalog field");
                None
            }
            FieldReference::Malformed(value) => {
                tracing::warn!(field = %value, "unknown field reference shape");
                None
            }
        }
    }

    /// Build the field descriptor for a query-local expression.
    ///
    /// Expressions have no catalog entry; the descriptor is numeric and carries
    /// the operators the capability provider computes for it.
    pub fn expression_field(&self, name: &str, table: &TableMetadata) -> Field {
        let mut field = Field {
            name: name.to_string(),
            display_name: Some(name.to_string()),
            expression_name: Some(name.to_string()),
            base_type: Some(TYPE_FLOAT.to_string()),
            ..Default::default()
        };
        field.operators = self.capabilities.operators(&field, table);
        field.operators_lookup = operators_lookup(&field.operators);
        field
    }

    /// The containment path of a nested field, root ancestor first.
    pub fn resolve_path(&self, field_id: FieldId, table: &'a TableMetadata) -> Vec<&'a Field> {
        let mut path = Vec::new();
        let mut next = Some(field_id);
        while let Some(id) = next {
            let Some(field) = table.field(id) else {
                tracing::warn!(field_id = id, table = table.id, "parent field not found");
                break;
            };
            // parent_id chains are expected to be acyclic
            if path.iter().any(|seen: &&Field| seen.id == field.id) {
                tracing::warn!(field_id = id, "cycle in parent_id chain");
                break;
            }
            path.push(field);
            next = field.parent_id;
        }
        path.reverse();
        path
    }

    /// Nested field name, e.g. `"Address: City"`.
    pub fn field_path_name(&self, field_id: FieldId, table: &'a TableMetadata) -> String {
        self.resolve_path(field_id, table)
            .into_iter()
            .map(format_field)
            .collect::<Vec<_>>()
            .join(": ")
    }

    /// Human-readable name of a referenced field, e.g. `"User → Created At (month)"`.
    pub fn field_name(&self, table: &'a TableMetadata, field: &FieldReference) -> Option<String> {
        let Some(target) = self.resolve_target(field, table) else {
            tracing::warn!(field = %field.to_value(), table = table.id, "couldn't format field name");
            return None;
        };
        let mut name = String::new();
        for fk in &target.path {
            name.push_str(&format_field(fk));
            name.push_str(" → ");
        }
        name.push_str(&format_field(&target.field));
        if let Some(unit) = &target.unit {
            name.push_str(&format!(" ({unit})"));
        }
        Some(name)
    }

    /// The result columns of `query`: breakouts first, then one column per
    /// aggregation. `None` for a bare-rows query without breakouts.
    pub fn query_columns(&self, table: &'a TableMetadata, query: &StructuredQuery) -> Option<Vec<QueryColumn>> {
        let mut columns: Vec<QueryColumn> = query
            .breakouts()
            .iter()
            .filter_map(|breakout| {
                let target = self.resolve_target(breakout, table)?;
                Some(QueryColumn {
                    name: target.field.name.clone(),
                    display_name: target.field.display_name.clone(),
                    base_type: target.field.base_type.clone(),
                    special_type: target.field.special_type.clone(),
                    unit: breakout.datetime_unit().map(str::to_string),
                })
            })
            .collect();

        if query.is_bare_rows() {
            return (!columns.is_empty()).then_some(columns);
        }

        for aggregation in query.aggregations() {
            let operator = aggregation.content().operator();
            columns.push(QueryColumn {
                name: operator.map(metric_column_name).unwrap_or_default().to_string(),
                display_name: aggregation.name().map(str::to_string),
                base_type: operator.and_then(metric_column_type).map(str::to_string),
                special_type: Some(TYPE_NUMBER.to_string()),
                unit: None,
            });
        }
        Some(columns)
    }
}

/// Display name (or name) of a field with any trailing " id" removed.
pub fn format_field(field: &Field) -> String {
    let name = field.display_name.as_deref().unwrap_or(&field.name);
    TRAILING_ID.replace(name, "").into_owned()
}

fn metric_column_name(operator: &AggregationOperator) -> &str {
    match operator {
        AggregationOperator::Count | AggregationOperator::CumCount | AggregationOperator::Distinct => "count",
        AggregationOperator::Sum | AggregationOperator::CumSum => "sum",
        other => other.as_str(),
    }
}

fn metric_column_type(operator: &AggregationOperator) -> Option<&'static str> {
    match operator {
        AggregationOperator::Count | AggregationOperator::CumCount | AggregationOperator::Distinct => {
            Some(TYPE_INTEGER)
        }
        AggregationOperator::Sum
        | AggregationOperator::CumSum
        | AggregationOperator::Avg
        | AggregationOperator::Min
        | AggregationOperator::Max => Some(TYPE_FLOAT),
        _ => None,
    }
}
