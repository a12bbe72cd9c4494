//! Table, field, metric and segment descriptions.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::capabilities::FilterOperator;
use crate::query::{FieldId, MetricId, SegmentId, TableId};

pub const TYPE_INTEGER: &str = "type/Integer";
pub const TYPE_FLOAT: &str = "type/Float";
pub const TYPE_NUMBER: &str = "type/Number";
pub const TYPE_FK: &str = "type/FK";

/// Metadata for one table.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TableMetadata {
    pub id: TableId,
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub fields: Vec<Field>,
    #[serde(default)]
    pub metrics: Vec<Metric>,
    #[serde(default)]
    pub segments: Vec<Segment>,
    #[serde(default)]
    pub aggregation_options: Vec<AggregationOption>,
}

impl TableMetadata {
    pub fn field(&self, id: FieldId) -> Option<&Field> {
        self.fields.iter().find(|field| field.id == Some(id))
    }

    pub fn metric(&self, id: MetricId) -> Option<&Metric> {
        self.metrics.iter().find(|metric| metric.id == id)
    }

    pub fn segment(&self, id: SegmentId) -> Option<&Segment> {
        self.segments.iter().find(|segment| segment.id == id)
    }

    /// Whether the table offers the aggregation with this short name.
    pub fn supports_aggregation(&self, short: &str) -> bool {
        self.aggregation_options.iter().any(|option| option.short == short)
    }

    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.name)
    }
}

/// A column of a table.
///
/// `id` is absent only for fields synthesized from query expressions or
/// field literals.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Field {
    #[serde(default)]
    pub id: Option<FieldId>,
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub base_type: Option<String>,
    #[serde(default)]
    pub special_type: Option<String>,
    /// Set on foreign keys: where the key points.
    #[serde(default)]
    pub target: Option<ForeignKeyTarget>,
    /// Set on nested fields: the containing field.
    #[serde(default)]
    pub parent_id: Option<FieldId>,
    /// Set on fields synthesized for a query expression.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expression_name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub operators: Vec<FilterOperator>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub operators_lookup: BTreeMap<String, FilterOperator>,
}

impl Field {
    pub fn new(id: FieldId, name: impl Into<String>) -> Self {
        Self {
            id: Some(id),
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    pub fn with_base_type(mut self, base_type: impl Into<String>) -> Self {
        self.base_type = Some(base_type.into());
        self
    }

    pub fn with_target(mut self, table_id: TableId) -> Self {
        self.special_type = Some(TYPE_FK.to_string());
        self.target = Some(ForeignKeyTarget { table_id, id: None });
        self
    }

    pub fn with_parent(mut self, parent_id: FieldId) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    pub fn is_fk(&self) -> bool {
        self.special_type.as_deref() == Some(TYPE_FK)
    }

    pub fn operator(&self, name: &str) -> Option<&FilterOperator> {
        self.operators_lookup.get(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForeignKeyTarget {
    pub table_id: TableId,
    /// The referenced field, when known.
    #[serde(default)]
    pub id: Option<FieldId>,
}

/// A catalog-defined named aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    pub id: MetricId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// A catalog-defined named filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub id: SegmentId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregationOption {
    pub short: String,
    #[serde(default)]
    pub name: Option<String>,
}

pub fn is_numeric_type(base_type: &str) -> bool {
    matches!(
        base_type,
        "type/Number" | "type/Integer" | "type/BigInteger" | "type/Float" | "type/Decimal"
    )
}

pub fn is_temporal_type(base_type: &str) -> bool {
    matches!(
        base_type,
        "type/DateTime" | "type/Date" | "type/Time" | "type/DateTimeWithTZ"
    )
}

pub fn is_text_type(base_type: &str) -> bool {
    matches!(base_type, "type/Text" | "type/UUID")
}

pub fn is_boolean_type(base_type: &str) -> bool {
    base_type == "type/Boolean"
}
