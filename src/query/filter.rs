//! Filter clauses.
//!
//! ```text
//! ["and", <clause>, <clause>, ...]
//! ["or", <clause>, ...]
//! ["not", <clause>]
//! ["segment", 4]
//! ["=", <field>, "Widget"]     any other operator: [op, field, args...]
//! [">", ["+", <field>, 1], 10] operator over a math expression
//! ```

use serde_json::{json, Value};

use super::expression::{is_math, ExpressionClause};
use super::field_ref::FieldReference;

/// Catalog segment identifier.
pub type SegmentId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BooleanOperator {
    And,
    Or,
}

impl BooleanOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            BooleanOperator::And => "and",
            BooleanOperator::Or => "or",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FilterClause {
    Compound {
        operator: BooleanOperator,
        clauses: Vec<FilterClause>,
    },
    Not(Box<FilterClause>),
    Segment(SegmentId),
    /// `[operator, field, args...]`
    Field {
        operator: String,
        field: FieldReference,
        args: Vec<Value>,
    },
    /// `[operator, math-expression, args...]`
    Expression {
        operator: String,
        expression: ExpressionClause,
        args: Vec<Value>,
    },
    Malformed(Value),
}

impl FilterClause {
    pub fn and(clauses: Vec<FilterClause>) -> Self {
        FilterClause::Compound {
            operator: BooleanOperator::And,
            clauses,
        }
    }

    pub fn or(clauses: Vec<FilterClause>) -> Self {
        FilterClause::Compound {
            operator: BooleanOperator::Or,
            clauses,
        }
    }

    pub fn field(operator: impl Into<String>, field: FieldReference, args: Vec<Value>) -> Self {
        FilterClause::Field {
            operator: operator.into(),
            field,
            args,
        }
    }

    pub fn from_value(value: &Value) -> Self {
        Self::decode(value).unwrap_or_else(|| FilterClause::Malformed(value.clone()))
    }

    fn decode(value: &Value) -> Option<Self> {
        let items = value.as_array()?;
        let tag = items.first()?.as_str()?;
        let clause = match (tag, items.len()) {
            ("and", _) => Self::and(items[1..].iter().map(Self::from_value).collect()),
            ("or", _) => Self::or(items[1..].iter().map(Self::from_value).collect()),
            ("not", 2) => FilterClause::Not(Box::new(Self::from_value(&items[1]))),
            ("segment", 2) => FilterClause::Segment(items[1].as_i64()?),
            (_, 1) => return None,
            (operator, _) if is_math(&items[1]) => FilterClause::Expression {
                operator: operator.to_string(),
                expression: ExpressionClause::from_value(&items[1]),
                args: items[2..].to_vec(),
            },
            (operator, _) => FilterClause::Field {
                operator: operator.to_string(),
                field: FieldReference::from_value(&items[1]),
                args: items[2..].to_vec(),
            },
        };
        Some(clause)
    }

    pub fn to_value(&self) -> Value {
        match self {
            FilterClause::Compound { operator, clauses } => {
                let mut items = vec![json!(operator.as_str())];
                items.extend(clauses.iter().map(FilterClause::to_value));
                Value::Array(items)
            }
            FilterClause::Not(inner) => json!(["not", inner.to_value()]),
            FilterClause::Segment(id) => json!(["segment", id]),
            FilterClause::Field {
                operator,
                field,
                args,
            } => {
                let mut items = vec![json!(operator), field.to_value()];
                items.extend(args.iter().cloned());
                Value::Array(items)
            }
            FilterClause::Expression {
                operator,
                expression,
                args,
            } => {
                let mut items = vec![json!(operator), expression.to_value()];
                items.extend(args.iter().cloned());
                Value::Array(items)
            }
            FilterClause::Malformed(value) => value.clone(),
        }
    }

    pub fn is_segment(&self) -> bool {
        matches!(self, FilterClause::Segment(_))
    }

    /// True when any direct argument of the clause is null, or the clause is
    /// not a recognizable filter at all.
    pub fn has_null_argument(&self) -> bool {
        match self {
            FilterClause::Compound { clauses, .. } => clauses.iter().any(FilterClause::is_null),
            FilterClause::Not(inner) => inner.is_null(),
            FilterClause::Segment(_) => false,
            FilterClause::Field { field, args, .. } => {
                field.is_null() || args.iter().any(Value::is_null)
            }
            FilterClause::Expression { args, .. } => args.iter().any(Value::is_null),
            FilterClause::Malformed(_) => true,
        }
    }

    fn is_null(&self) -> bool {
        matches!(self, FilterClause::Malformed(Value::Null))
    }

    pub(crate) fn without_expression(&self, name: &str) -> FilterClause {
        match self {
            FilterClause::Compound { operator, clauses } => FilterClause::Compound {
                operator: *operator,
                clauses: clauses.iter().map(|c| c.without_expression(name)).collect(),
            },
            FilterClause::Not(inner) => FilterClause::Not(Box::new(inner.without_expression(name))),
            FilterClause::Field {
                operator,
                field,
                args,
            } => FilterClause::Field {
                operator: operator.clone(),
                field: field.without_expression(name),
                args: args.clone(),
            },
            FilterClause::Expression {
                operator,
                expression,
                args,
            } => FilterClause::Expression {
                operator: operator.clone(),
                expression: expression.without_expression(name),
                args: args.clone(),
            },
            other => other.clone(),
        }
    }
}

/// The filter list without its implied top-level `and`.
pub fn get_filters(filter: Option<&FilterClause>) -> Vec<FilterClause> {
    match filter {
        None => Vec::new(),
        Some(FilterClause::Compound {
            operator: BooleanOperator::And,
            clauses,
        }) => clauses.clone(),
        Some(other) => vec![other.clone()],
    }
}
