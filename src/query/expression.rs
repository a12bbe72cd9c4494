//! Math expressions: custom aggregations, named query expressions and
//! expression operands of filters.

use serde_json::{json, Number, Value};

use super::aggregation::AggregationClause;
use super::field_ref::FieldReference;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl MathOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            MathOperator::Add => "+",
            MathOperator::Subtract => "-",
            MathOperator::Multiply => "*",
            MathOperator::Divide => "/",
        }
    }

    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "+" => Some(MathOperator::Add),
            "-" => Some(MathOperator::Subtract),
            "*" => Some(MathOperator::Multiply),
            "/" => Some(MathOperator::Divide),
            _ => None,
        }
    }
}

/// An expression tree node.
#[derive(Debug, Clone, PartialEq)]
pub enum ExpressionClause {
    Number(Number),
    Field(FieldReference),
    Aggregation(Box<AggregationClause>),
    Math {
        operator: MathOperator,
        args: Vec<ExpressionClause>,
    },
    Malformed(Value),
}

/// True when `value` is a math expression (`["+", a, b]` and friends).
pub fn is_math(value: &Value) -> bool {
    value
        .as_array()
        .and_then(|items| items.first())
        .and_then(Value::as_str)
        .and_then(MathOperator::parse)
        .is_some()
}

impl ExpressionClause {
    pub fn math(operator: MathOperator, args: Vec<ExpressionClause>) -> Self {
        ExpressionClause::Math { operator, args }
    }

    pub fn from_value(value: &Value) -> Self {
        if let Value::Number(n) = value {
            return ExpressionClause::Number(n.clone());
        }
        if is_math(value) {
            let items = value.as_array().map(Vec::as_slice).unwrap_or_default();
            if let Some(operator) = items.first().and_then(Value::as_str).and_then(MathOperator::parse) {
                return ExpressionClause::Math {
                    operator,
                    args: items[1..].iter().map(Self::from_value).collect(),
                };
            }
        }
        let field = FieldReference::from_value(value);
        if field.is_valid() {
            return ExpressionClause::Field(field);
        }
        let aggregation = AggregationClause::from_value(value);
        if (aggregation.is_standard() && !aggregation.has_unknown_operator()) || aggregation.is_metric() {
            return ExpressionClause::Aggregation(Box::new(aggregation));
        }
        ExpressionClause::Malformed(value.clone())
    }

    pub fn to_value(&self) -> Value {
        match self {
            ExpressionClause::Number(n) => Value::Number(n.clone()),
            ExpressionClause::Field(field) => field.to_value(),
            ExpressionClause::Aggregation(aggregation) => aggregation.to_value(),
            ExpressionClause::Math { operator, args } => {
                let mut items = vec![json!(operator.as_str())];
                items.extend(args.iter().map(ExpressionClause::to_value));
                Value::Array(items)
            }
            ExpressionClause::Malformed(value) => value.clone(),
        }
    }

    pub fn is_math(&self) -> bool {
        matches!(self, ExpressionClause::Math { .. })
    }

    pub fn as_field(&self) -> Option<&FieldReference> {
        match self {
            ExpressionClause::Field(field) => Some(field),
            _ => None,
        }
    }

    /// Replace references to the named expression with the null placeholder.
    pub fn without_expression(&self, name: &str) -> ExpressionClause {
        match self {
            ExpressionClause::Field(field) => ExpressionClause::Field(field.without_expression(name)),
            ExpressionClause::Aggregation(aggregation) => {
                ExpressionClause::Aggregation(Box::new(aggregation.without_expression(name)))
            }
            ExpressionClause::Math { operator, args } => ExpressionClause::Math {
                operator: *operator,
                args: args.iter().map(|arg| arg.without_expression(name)).collect(),
            },
            other => other.clone(),
        }
    }
}
