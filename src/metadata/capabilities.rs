//! Filter operators a field supports.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::types::{is_boolean_type, is_numeric_type, is_temporal_type, is_text_type, Field, TableMetadata};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterOperator {
    pub name: String,
    pub verbose_name: String,
    /// Number of values the operator takes after the field.
    #[serde(default)]
    pub arity: usize,
}

impl FilterOperator {
    fn new(name: &str, verbose_name: &str, arity: usize) -> Self {
        Self {
            name: name.to_string(),
            verbose_name: verbose_name.to_string(),
            arity,
        }
    }
}

/// Computes the valid filter operators for a field.
pub trait FieldCapabilities {
    fn operators(&self, field: &Field, table: &TableMetadata) -> Vec<FilterOperator>;
}

/// Index operators by name.
pub fn operators_lookup(operators: &[FilterOperator]) -> BTreeMap<String, FilterOperator> {
    operators
        .iter()
        .map(|operator| (operator.name.clone(), operator.clone()))
        .collect()
}

/// Operator sets keyed on the field's base type.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultCapabilities;

impl FieldCapabilities for DefaultCapabilities {
    fn operators(&self, field: &Field, _table: &TableMetadata) -> Vec<FilterOperator> {
        let base_type = field.base_type.as_deref().unwrap_or_default();
        let mut operators = vec![FilterOperator::new("=", "Is", 1), FilterOperator::new("!=", "Is not", 1)];

        if is_numeric_type(base_type) {
            operators.extend([
                FilterOperator::new(">", "Greater than", 1),
                FilterOperator::new("<", "Less than", 1),
                FilterOperator::new("between", "Between", 2),
                FilterOperator::new(">=", "Greater than or equal to", 1),
                FilterOperator::new("<=", "Less than or equal to", 1),
            ]);
        } else if is_temporal_type(base_type) {
            operators.truncate(1);
            operators.extend([
                FilterOperator::new("<", "Before", 1),
                FilterOperator::new(">", "After", 1),
                FilterOperator::new("between", "Between", 2),
                FilterOperator::new("time-interval", "Relative", 2),
            ]);
        } else if is_text_type(base_type) {
            operators.extend([
                FilterOperator::new("contains", "Contains", 1),
                FilterOperator::new("does-not-contain", "Does not contain", 1),
                FilterOperator::new("starts-with", "Starts with", 1),
                FilterOperator::new("ends-with", "Ends with", 1),
            ]);
        } else if is_boolean_type(base_type) {
            operators.truncate(1);
        }

        operators.extend([
            FilterOperator::new("is-null", "Is empty", 0),
            FilterOperator::new("not-null", "Not empty", 0),
        ]);
        operators
    }
}
