//! Sort clauses: `[direction, field]`.

use serde_json::{json, Value};

use super::field_ref::FieldReference;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Asc => "asc",
            Direction::Desc => "desc",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "asc" => Some(Direction::Asc),
            "desc" => Some(Direction::Desc),
            _ => None,
        }
    }
}

/// One sort clause. An unset direction marks an unfinished edit.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderByClause {
    pub direction: Option<Direction>,
    pub field: FieldReference,
    /// A direction that did not parse, re-emitted as read.
    pub unknown_direction: Option<Value>,
}

impl OrderByClause {
    pub fn new(direction: Direction, field: FieldReference) -> Self {
        Self {
            direction: Some(direction),
            field,
            unknown_direction: None,
        }
    }

    pub fn asc(field: FieldReference) -> Self {
        Self::new(Direction::Asc, field)
    }

    pub fn desc(field: FieldReference) -> Self {
        Self::new(Direction::Desc, field)
    }

    pub fn from_value(value: &Value) -> Self {
        match value.as_array().map(Vec::as_slice) {
            Some([raw, field]) => {
                let direction = raw.as_str().and_then(Direction::parse);
                Self {
                    direction,
                    field: FieldReference::from_value(field),
                    unknown_direction: (direction.is_none() && !raw.is_null()).then(|| raw.clone()),
                }
            }
            _ => Self {
                direction: None,
                field: FieldReference::Malformed(value.clone()),
                unknown_direction: None,
            },
        }
    }

    pub fn to_value(&self) -> Value {
        let direction = match (self.direction, &self.unknown_direction) {
            (Some(direction), _) => json!(direction.as_str()),
            (None, Some(raw)) => raw.clone(),
            (None, None) => Value::Null,
        };
        json!([direction, self.field.to_value()])
    }

    /// A direction is set and the field is well formed.
    pub fn is_complete(&self) -> bool {
        self.direction.is_some() && self.field.is_valid()
    }
}
