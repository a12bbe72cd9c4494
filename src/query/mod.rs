//! The structured query and its clause types.
//!
//! Every clause keeps the tagged-array wire shape it was read from. Fragments
//! that do not parse are retained as `Malformed` values rather than rejected,
//! because queries are decoded while a user is still editing them; the
//! normalizer is what drops them.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{json, Map, Value};

use crate::error::{QueryError, QueryResult};

/// Implements serde for a type with `from_value`/`to_value` wire conversions.
macro_rules! impl_wire_serde {
    ($($ty:ty),* $(,)?) => {$(
        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                self.to_value().serialize(serializer)
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                Value::deserialize(deserializer).map(|value| <$ty>::from_value(&value))
            }
        }
    )*};
}

pub mod aggregation;
pub mod breakout;
pub mod dataset;
pub mod expression;
pub mod field_ref;
pub mod filter;
pub mod order_by;

pub use aggregation::{get_aggregations, AggregationClause, AggregationOperator, MetricId};
pub use breakout::{get_breakouts, remove_breakout, set_breakout};
pub use dataset::{create_query, DatasetQuery, QueryKind};
pub use expression::{is_math, ExpressionClause, MathOperator};
pub use field_ref::{DatetimeEncoding, FieldId, FieldReference, TargetId};
pub use filter::{get_filters, BooleanOperator, FilterClause, SegmentId};
pub use order_by::{Direction, OrderByClause};

impl_wire_serde!(
    FieldReference,
    AggregationClause,
    ExpressionClause,
    FilterClause,
    OrderByClause,
);

/// Catalog table identifier.
pub type TableId = i64;

/// Most breakouts the editor lets a query carry.
pub const MAX_DIMENSIONS: usize = 2;

/// Row limit as found on the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum Limit {
    Rows(i64),
    Malformed(Value),
}

impl Limit {
    fn from_value(value: &Value) -> Self {
        value
            .as_i64()
            .map(Limit::Rows)
            .unwrap_or_else(|| Limit::Malformed(value.clone()))
    }

    fn to_value(&self) -> Value {
        match self {
            Limit::Rows(rows) => json!(rows),
            Limit::Malformed(value) => value.clone(),
        }
    }

    pub fn rows(&self) -> Option<i64> {
        match self {
            Limit::Rows(rows) => Some(*rows),
            Limit::Malformed(_) => None,
        }
    }
}

/// A declarative analytical query.
///
/// A field set to `None` is absent from the wire form, which is not the same
/// thing as an empty list. Unknown top-level keys are carried in `extra`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StructuredQuery {
    pub source_table: Option<TableId>,
    pub aggregation: Option<Vec<AggregationClause>>,
    pub breakout: Option<Vec<FieldReference>>,
    pub filter: Option<FilterClause>,
    pub order_by: Option<Vec<OrderByClause>>,
    pub limit: Option<Limit>,
    pub expressions: Option<BTreeMap<String, ExpressionClause>>,
    pub extra: Map<String, Value>,
}

const SOURCE_TABLE: &str = "source-table";
const AGGREGATION: &str = "aggregation";
const BREAKOUT: &str = "breakout";
const FILTER: &str = "filter";
const ORDER_BY: &str = "order-by";
const LIMIT: &str = "limit";
const EXPRESSIONS: &str = "expressions";

impl StructuredQuery {
    pub fn new(source_table: TableId) -> Self {
        Self {
            source_table: Some(source_table),
            ..Default::default()
        }
    }

    pub fn with_aggregation(mut self, aggregation: Vec<AggregationClause>) -> Self {
        self.aggregation = Some(aggregation);
        self
    }

    pub fn with_breakout(mut self, breakout: Vec<FieldReference>) -> Self {
        self.breakout = Some(breakout);
        self
    }

    pub fn with_filter(mut self, filter: FilterClause) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_order_by(mut self, order_by: Vec<OrderByClause>) -> Self {
        self.order_by = Some(order_by);
        self
    }

    pub fn with_limit(mut self, rows: i64) -> Self {
        self.limit = Some(Limit::Rows(rows));
        self
    }

    // =========================================================================
    // Wire format
    // =========================================================================

    /// Decode a query object. Only a non-object document is an error.
    pub fn from_value(value: &Value) -> QueryResult<Self> {
        let object = value.as_object().ok_or_else(|| QueryError::NotAnObject {
            context: "structured query",
            found: value_kind(value),
        })?;

        let mut query = StructuredQuery::default();
        for (key, value) in object {
            match key.as_str() {
                SOURCE_TABLE if value.is_null() => {}
                SOURCE_TABLE if value.is_i64() => query.source_table = value.as_i64(),
                AGGREGATION if !value.is_null() => query.aggregation = Some(decode_aggregations(value)),
                BREAKOUT if !value.is_null() => {
                    query.breakout = Some(decode_list(value, FieldReference::from_value))
                }
                FILTER if !value.is_null() => query.filter = Some(FilterClause::from_value(value)),
                ORDER_BY if !value.is_null() => {
                    query.order_by = Some(decode_list(value, OrderByClause::from_value))
                }
                LIMIT if !value.is_null() => query.limit = Some(Limit::from_value(value)),
                EXPRESSIONS if value.is_object() => {
                    query.expressions = value.as_object().map(|entries| {
                        entries
                            .iter()
                            .map(|(name, expr)| (name.clone(), ExpressionClause::from_value(expr)))
                            .collect()
                    })
                }
                AGGREGATION | BREAKOUT | FILTER | ORDER_BY | LIMIT => {}
                _ => {
                    query.extra.insert(key.clone(), value.clone());
                }
            }
        }
        Ok(query)
    }

    pub fn from_json(text: &str) -> QueryResult<Self> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(&value)
    }

    pub fn to_value(&self) -> Value {
        let mut object = self.extra.clone();
        if let Some(table) = self.source_table {
            object.insert(SOURCE_TABLE.into(), json!(table));
        }
        if let Some(aggregation) = &self.aggregation {
            object.insert(
                AGGREGATION.into(),
                Value::Array(aggregation.iter().map(AggregationClause::to_value).collect()),
            );
        }
        if let Some(breakout) = &self.breakout {
            object.insert(
                BREAKOUT.into(),
                Value::Array(breakout.iter().map(FieldReference::to_value).collect()),
            );
        }
        if let Some(filter) = &self.filter {
            object.insert(FILTER.into(), filter.to_value());
        }
        if let Some(order_by) = &self.order_by {
            object.insert(
                ORDER_BY.into(),
                Value::Array(order_by.iter().map(OrderByClause::to_value).collect()),
            );
        }
        if let Some(limit) = &self.limit {
            object.insert(LIMIT.into(), limit.to_value());
        }
        if let Some(expressions) = &self.expressions {
            let entries = expressions
                .iter()
                .map(|(name, expr)| (name.clone(), expr.to_value()))
                .collect();
            object.insert(EXPRESSIONS.into(), Value::Object(entries));
        }
        Value::Object(object)
    }

    // =========================================================================
    // Canonical views
    // =========================================================================

    /// Aggregations without bare-rows and malformed entries.
    pub fn aggregations(&self) -> Vec<AggregationClause> {
        self.aggregation
            .as_deref()
            .map(get_aggregations)
            .unwrap_or_default()
    }

    /// Well-formed breakouts.
    pub fn breakouts(&self) -> Vec<FieldReference> {
        self.breakout.as_deref().map(get_breakouts).unwrap_or_default()
    }

    /// Filters without the implied top-level `and`.
    pub fn filters(&self) -> Vec<FilterClause> {
        get_filters(self.filter.as_ref())
    }

    pub fn expression(&self, name: &str) -> Option<&ExpressionClause> {
        self.expressions.as_ref()?.get(name)
    }

    // =========================================================================
    // Predicates
    // =========================================================================

    /// No aggregation other than bare rows.
    pub fn is_bare_rows(&self) -> bool {
        self.aggregations().is_empty()
    }

    /// Every aggregation entry is either valid or a custom clause.
    pub fn has_valid_aggregation(&self) -> bool {
        self.aggregation.as_deref().unwrap_or_default().iter().all(|aggregation| {
            aggregation.is_valid() || aggregation.is_custom()
        })
    }

    /// A non-empty breakout list whose first entry is filled in.
    pub fn has_valid_breakout(&self) -> bool {
        self.breakout
            .as_deref()
            .and_then(<[FieldReference]>::first)
            .is_some_and(|first| !first.is_null())
    }

    pub fn num_dimensions(&self) -> usize {
        self.breakout
            .as_deref()
            .unwrap_or_default()
            .iter()
            .filter(|b| !b.is_null())
            .count()
    }

    pub fn can_add_dimensions(&self) -> bool {
        self.breakout
            .as_ref()
            .is_some_and(|breakout| breakout.len() < MAX_DIMENSIONS)
    }

    /// Sorting by an aggregate needs a grouped query and a sortable operator.
    pub fn can_sort_by_aggregate_field(&self, index: usize) -> bool {
        if !self.has_valid_breakout() {
            return false;
        }
        self.aggregations()
            .get(index)
            .and_then(AggregationClause::operator)
            .is_some_and(AggregationOperator::is_sortable)
    }

    pub fn can_add_limit_and_sort(&self) -> bool {
        self.is_bare_rows() || self.has_valid_breakout()
    }
}

impl Serialize for StructuredQuery {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for StructuredQuery {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        StructuredQuery::from_value(&value).map_err(serde::de::Error::custom)
    }
}

// A lone clause (`"aggregation": ["count"]`) is the legacy single-aggregation form.
fn decode_aggregations(value: &Value) -> Vec<AggregationClause> {
    match value.as_array() {
        Some(items) if items.first().is_some_and(Value::is_string) => {
            vec![AggregationClause::from_value(value)]
        }
        Some(items) => items.iter().map(AggregationClause::from_value).collect(),
        None => vec![AggregationClause::Malformed(value.clone())],
    }
}

fn decode_list<T>(value: &Value, decode: impl Fn(&Value) -> T) -> Vec<T> {
    match value.as_array() {
        Some(items) => items.iter().map(decode).collect(),
        None => vec![decode(value)],
    }
}

pub(crate) fn value_kind(value: &Value) -> String {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
    .to_string()
}
