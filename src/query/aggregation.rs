//! Aggregation clauses.
//!
//! ```text
//! ["rows"]                                          bare rows
//! ["count"] / ["sum", <field>]                      standard operator
//! ["metric", 12]                                    catalog metric
//! ["sum", "field-id", 10]                           operator with loose arguments
//! ["aggregation-options", <inner>, {"display-name": "Revenue"}]
//! ["+", ["sum", <field>], 1]                        math expression
//! ```
//!
//! The named-clause helpers live here as well, so this module is the one
//! place the whole aggregation API is assembled.

use serde_json::{json, Map, Value};

use super::expression::{is_math, ExpressionClause};
use super::field_ref::FieldReference;

/// Catalog metric identifier.
pub type MetricId = i64;

const DISPLAY_NAME: &str = "display-name";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AggregationOperator {
    Count,
    CumCount,
    Sum,
    CumSum,
    Avg,
    Min,
    Max,
    Distinct,
    Stddev,
    /// An operator this crate has no phrase or column type for.
    Other(String),
}

impl AggregationOperator {
    pub fn parse(name: &str) -> Self {
        match name {
            "count" => AggregationOperator::Count,
            "cum-count" => AggregationOperator::CumCount,
            "sum" => AggregationOperator::Sum,
            "cum-sum" => AggregationOperator::CumSum,
            "avg" => AggregationOperator::Avg,
            "min" => AggregationOperator::Min,
            "max" => AggregationOperator::Max,
            "distinct" => AggregationOperator::Distinct,
            "stddev" => AggregationOperator::Stddev,
            other => AggregationOperator::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            AggregationOperator::Count => "count",
            AggregationOperator::CumCount => "cum-count",
            AggregationOperator::Sum => "sum",
            AggregationOperator::CumSum => "cum-sum",
            AggregationOperator::Avg => "avg",
            AggregationOperator::Min => "min",
            AggregationOperator::Max => "max",
            AggregationOperator::Distinct => "distinct",
            AggregationOperator::Stddev => "stddev",
            AggregationOperator::Other(name) => name,
        }
    }

    /// Whether the output of this aggregation may be used as a sort key.
    pub fn is_sortable(&self) -> bool {
        matches!(
            self,
            AggregationOperator::Avg
                | AggregationOperator::Count
                | AggregationOperator::Distinct
                | AggregationOperator::Stddev
                | AggregationOperator::Sum
                | AggregationOperator::Min
                | AggregationOperator::Max
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AggregationClause {
    /// No aggregation: raw rows.
    BareRows,
    /// `[operator]` or `[operator, argument]`.
    Standard {
        operator: AggregationOperator,
        argument: Option<ExpressionClause>,
    },
    Metric(MetricId),
    /// An operator head followed by more than one argument. The arguments
    /// are kept as read and re-emitted verbatim.
    Partial {
        operator: AggregationOperator,
        arguments: Vec<Value>,
    },
    /// `["aggregation-options", inner, options]`
    Named {
        inner: Box<AggregationClause>,
        options: Map<String, Value>,
    },
    /// A math expression over aggregations.
    Expression(ExpressionClause),
    Malformed(Value),
}

impl AggregationClause {
    pub fn standard(operator: AggregationOperator, field: Option<FieldReference>) -> Self {
        AggregationClause::Standard {
            operator,
            argument: field.map(ExpressionClause::Field),
        }
    }

    pub fn count() -> Self {
        Self::standard(AggregationOperator::Count, None)
    }

    pub fn sum(field: FieldReference) -> Self {
        Self::standard(AggregationOperator::Sum, Some(field))
    }

    pub fn avg(field: FieldReference) -> Self {
        Self::standard(AggregationOperator::Avg, Some(field))
    }

    pub fn metric(id: MetricId) -> Self {
        AggregationClause::Metric(id)
    }

    // =========================================================================
    // Wire format
    // =========================================================================

    pub fn from_value(value: &Value) -> Self {
        Self::decode(value).unwrap_or_else(|| AggregationClause::Malformed(value.clone()))
    }

    fn decode(value: &Value) -> Option<Self> {
        if is_math(value) {
            return Some(AggregationClause::Expression(ExpressionClause::from_value(value)));
        }
        let items = value.as_array()?;
        let tag = items.first()?.as_str()?;
        match (tag, items.len()) {
            ("rows", 1) => Some(AggregationClause::BareRows),
            ("metric", 2) => items[1].as_i64().map(AggregationClause::Metric),
            ("aggregation-options", 3) => Some(AggregationClause::Named {
                inner: Box::new(Self::from_value(&items[1])),
                options: items[2].as_object()?.clone(),
            }),
            (op, 1) => Some(AggregationClause::Standard {
                operator: AggregationOperator::parse(op),
                argument: None,
            }),
            (op, 2) if !items[1].is_null() => Some(AggregationClause::Standard {
                operator: AggregationOperator::parse(op),
                argument: Some(decode_argument(&items[1])),
            }),
            ("rows" | "metric" | "aggregation-options", _) => None,
            (op, n) if n > 2 => Some(AggregationClause::Partial {
                operator: AggregationOperator::parse(op),
                arguments: items[1..].to_vec(),
            }),
            _ => None,
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            AggregationClause::BareRows => json!(["rows"]),
            AggregationClause::Standard {
                operator,
                argument: None,
            } => json!([operator.as_str()]),
            AggregationClause::Standard {
                operator,
                argument: Some(argument),
            } => json!([operator.as_str(), argument.to_value()]),
            AggregationClause::Metric(id) => json!(["metric", id]),
            AggregationClause::Partial { operator, arguments } => {
                let mut items = vec![json!(operator.as_str())];
                items.extend(arguments.iter().cloned());
                Value::Array(items)
            }
            AggregationClause::Named { inner, options } => {
                json!(["aggregation-options", inner.to_value(), options])
            }
            AggregationClause::Expression(expression) => expression.to_value(),
            AggregationClause::Malformed(value) => value.clone(),
        }
    }

    // =========================================================================
    // Predicates
    // =========================================================================

    /// Fully formed: an operator alone, or an operator and a non-null argument.
    pub fn is_valid(&self) -> bool {
        matches!(
            self,
            AggregationClause::BareRows
                | AggregationClause::Standard { .. }
                | AggregationClause::Metric(_)
        )
    }

    pub fn is_bare_rows(&self) -> bool {
        matches!(self, AggregationClause::BareRows)
    }

    pub fn is_standard(&self) -> bool {
        matches!(self, AggregationClause::Standard { .. })
    }

    pub fn is_metric(&self) -> bool {
        matches!(self, AggregationClause::Metric(_))
    }

    pub(crate) fn has_unknown_operator(&self) -> bool {
        matches!(
            self,
            AggregationClause::Standard {
                operator: AggregationOperator::Other(_),
                ..
            }
        )
    }

    /// Named clauses and anything built on a math expression are custom.
    pub fn is_custom(&self) -> bool {
        match self {
            AggregationClause::Expression(expression) => expression.is_math(),
            AggregationClause::Standard {
                argument: Some(argument),
                ..
            } => argument.is_math(),
            other => other.is_named(),
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// The operator head of a standard or partial clause.
    pub fn operator(&self) -> Option<&AggregationOperator> {
        match self {
            AggregationClause::Standard { operator, .. } | AggregationClause::Partial { operator, .. } => {
                Some(operator)
            }
            _ => None,
        }
    }

    /// The field of a standard clause, when its argument is a field.
    pub fn field(&self) -> Option<&FieldReference> {
        match self {
            AggregationClause::Standard {
                argument: Some(argument),
                ..
            } => argument.as_field(),
            _ => None,
        }
    }

    /// Replace the field of a standard clause. Other clauses are returned unchanged.
    pub fn set_field(&self, field: FieldReference) -> AggregationClause {
        match self {
            AggregationClause::Standard { operator, .. } => AggregationClause::Standard {
                operator: operator.clone(),
                argument: Some(ExpressionClause::Field(field)),
            },
            other => other.clone(),
        }
    }

    pub fn metric_id(&self) -> Option<MetricId> {
        match self {
            AggregationClause::Metric(id) => Some(*id),
            _ => None,
        }
    }

    // =========================================================================
    // Named clauses
    // =========================================================================

    pub fn has_options(&self) -> bool {
        matches!(self, AggregationClause::Named { .. })
    }

    pub fn options(&self) -> Option<&Map<String, Value>> {
        match self {
            AggregationClause::Named { options, .. } => Some(options),
            _ => None,
        }
    }

    pub fn is_named(&self) -> bool {
        self.name().is_some()
    }

    /// The user-supplied display name.
    pub fn name(&self) -> Option<&str> {
        self.options()?.get(DISPLAY_NAME)?.as_str()
    }

    /// The wrapped clause, or the clause itself when it carries no options.
    pub fn content(&self) -> &AggregationClause {
        match self {
            AggregationClause::Named { inner, .. } => inner.as_ref(),
            other => other,
        }
    }

    pub fn set_name(&self, name: impl Into<String>) -> AggregationClause {
        let mut options = self.options().cloned().unwrap_or_default();
        options.insert(DISPLAY_NAME.to_string(), Value::String(name.into()));
        AggregationClause::Named {
            inner: Box::new(self.content().clone()),
            options,
        }
    }

    pub fn set_content(&self, content: AggregationClause) -> AggregationClause {
        AggregationClause::Named {
            inner: Box::new(content),
            options: self.options().cloned().unwrap_or_default(),
        }
    }

    pub(crate) fn without_expression(&self, name: &str) -> AggregationClause {
        match self {
            AggregationClause::Standard { operator, argument } => AggregationClause::Standard {
                operator: operator.clone(),
                argument: argument.as_ref().map(|arg| arg.without_expression(name)),
            },
            AggregationClause::Named { inner, options } => AggregationClause::Named {
                inner: Box::new(inner.without_expression(name)),
                options: options.clone(),
            },
            AggregationClause::Expression(expression) => {
                AggregationClause::Expression(expression.without_expression(name))
            }
            other => other.clone(),
        }
    }

    fn is_retained(&self) -> bool {
        match self {
            AggregationClause::BareRows | AggregationClause::Malformed(_) => false,
            AggregationClause::Standard {
                argument: Some(ExpressionClause::Field(field)),
                ..
            } => !field.is_null(),
            AggregationClause::Standard {
                argument: Some(ExpressionClause::Malformed(_)),
                ..
            } => false,
            AggregationClause::Named { inner, .. } => inner.is_retained(),
            _ => true,
        }
    }
}

// A bare integer argument is a legacy field id, not a number.
fn decode_argument(value: &Value) -> ExpressionClause {
    if is_math(value) {
        return ExpressionClause::from_value(value);
    }
    match FieldReference::from_value(value) {
        FieldReference::Malformed(_) => ExpressionClause::from_value(value),
        field => ExpressionClause::Field(field),
    }
}

/// The canonical aggregation list: bare rows and malformed clauses removed.
pub fn get_aggregations(aggregations: &[AggregationClause]) -> Vec<AggregationClause> {
    aggregations
        .iter()
        .filter(|aggregation| aggregation.is_retained())
        .cloned()
        .collect()
}
