//! Field references.
//!
//! A field reference is how every clause of a structured query points at a
//! column. On the wire it is either a bare integer (the legacy form) or a
//! tagged array:
//!
//! ```text
//! 12                                         plain (legacy) field id
//! ["field-id", 12]                           local field
//! ["fk->", ["field-id", 3], ["field-id", 7]] field 7 reached through FK field 3
//! ["datetime-field", <ref>, "month"]         datetime bucketing
//! ["datetime-field", <ref>, "as", "month"]   same, deprecated encoding
//! ["binning-strategy", <ref>, "num-bins", 10]
//! ["expression", "margin"]                   query-local named expression
//! ["aggregation", 0]                         output of the first aggregation
//! ["field-literal", "sum", "type/Float"]     ad-hoc column
//! ```
//!
//! Anything else is kept as [`FieldReference::Malformed`] so partially edited
//! queries survive a decode/encode cycle untouched.

use serde_json::{json, Value};

/// Catalog field identifier.
pub type FieldId = i64;

/// Which of the two datetime-cast encodings a reference was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DatetimeEncoding {
    /// `["datetime-field", <ref>, <unit>]`
    #[default]
    Modern,
    /// `["datetime-field", <ref>, "as", <unit>]`
    Legacy,
}

/// A reference to a column, in any of its wire forms.
#[derive(Debug, Clone)]
pub enum FieldReference {
    /// Raw numeric field id.
    Plain(FieldId),
    /// `["field-id", id]`
    LocalField(FieldId),
    /// `["fk->", source, dest]`. `dest` is resolved against the table the
    /// source field points at.
    ForeignKey {
        source: Box<FieldReference>,
        dest: Box<FieldReference>,
    },
    /// `["datetime-field", field, unit]`
    DatetimeCast {
        field: Box<FieldReference>,
        unit: String,
        encoding: DatetimeEncoding,
    },
    /// `["binning-strategy", field, strategy, param?]`
    BinningStrategy {
        field: Box<FieldReference>,
        strategy: String,
        param: Option<Value>,
    },
    /// `["expression", name]`
    Expression(String),
    /// `["aggregation", index]`
    AggregateResult(usize),
    /// `["field-literal", name, base_type]`
    FieldLiteral { name: String, base_type: String },
    /// A value that does not have the shape of any reference.
    Malformed(Value),
}

/// The most specific identifying key of a field reference.
///
/// Wrappers (FK, datetime, binning) are stripped; references that are not
/// backed by a catalog field are their own key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TargetId {
    Field(FieldId),
    Expression(String),
    Literal { name: String, base_type: String },
    Aggregation(usize),
}

// Semantic equality: both datetime encodings compare equal.
impl PartialEq for FieldReference {
    fn eq(&self, other: &Self) -> bool {
        use FieldReference::*;
        match (self, other) {
            (Plain(a), Plain(b)) | (LocalField(a), LocalField(b)) => a == b,
            (
                ForeignKey { source: s1, dest: d1 },
                ForeignKey { source: s2, dest: d2 },
            ) => s1 == s2 && d1 == d2,
            (
                DatetimeCast { field: f1, unit: u1, .. },
                DatetimeCast { field: f2, unit: u2, .. },
            ) => f1 == f2 && u1 == u2,
            (
                BinningStrategy { field: f1, strategy: s1, param: p1 },
                BinningStrategy { field: f2, strategy: s2, param: p2 },
            ) => f1 == f2 && s1 == s2 && p1 == p2,
            (Expression(a), Expression(b)) => a == b,
            (AggregateResult(a), AggregateResult(b)) => a == b,
            (
                FieldLiteral { name: n1, base_type: t1 },
                FieldLiteral { name: n2, base_type: t2 },
            ) => n1 == n2 && t1 == t2,
            (Malformed(a), Malformed(b)) => a == b,
            _ => false,
        }
    }
}

impl FieldReference {
    // =========================================================================
    // Constructors
    // =========================================================================

    pub fn field_id(id: FieldId) -> Self {
        FieldReference::LocalField(id)
    }

    pub fn foreign_key(source: FieldReference, dest: FieldReference) -> Self {
        FieldReference::ForeignKey {
            source: Box::new(source),
            dest: Box::new(dest),
        }
    }

    pub fn datetime(field: FieldReference, unit: impl Into<String>) -> Self {
        FieldReference::DatetimeCast {
            field: Box::new(field),
            unit: unit.into(),
            encoding: DatetimeEncoding::Modern,
        }
    }

    pub fn binned(field: FieldReference, strategy: impl Into<String>, param: Option<Value>) -> Self {
        FieldReference::BinningStrategy {
            field: Box::new(field),
            strategy: strategy.into(),
            param,
        }
    }

    pub fn expression(name: impl Into<String>) -> Self {
        FieldReference::Expression(name.into())
    }

    pub fn aggregation(index: usize) -> Self {
        FieldReference::AggregateResult(index)
    }

    pub fn literal(name: impl Into<String>, base_type: impl Into<String>) -> Self {
        FieldReference::FieldLiteral {
            name: name.into(),
            base_type: base_type.into(),
        }
    }

    /// The placeholder an editor leaves behind for a not-yet-chosen field.
    pub fn null() -> Self {
        FieldReference::Malformed(Value::Null)
    }

    // =========================================================================
    // Wire format
    // =========================================================================

    /// Decode a field reference. Never fails: unknown shapes become `Malformed`.
    pub fn from_value(value: &Value) -> Self {
        Self::decode(value).unwrap_or_else(|| FieldReference::Malformed(value.clone()))
    }

    fn decode(value: &Value) -> Option<Self> {
        if let Some(id) = value.as_i64() {
            return Some(FieldReference::Plain(id));
        }
        let items = value.as_array()?;
        let tag = items.first()?.as_str()?;
        match (tag, items.len()) {
            ("field-id", 2) => items[1].as_i64().map(FieldReference::LocalField),
            ("fk->", 3) => Some(FieldReference::foreign_key(
                Self::from_value(&items[1]),
                Self::from_value(&items[2]),
            )),
            ("datetime-field", 3) => Some(FieldReference::DatetimeCast {
                field: Box::new(Self::from_value(&items[1])),
                unit: items[2].as_str()?.to_string(),
                encoding: DatetimeEncoding::Modern,
            }),
            ("datetime-field", 4) if items[2] == "as" => Some(FieldReference::DatetimeCast {
                field: Box::new(Self::from_value(&items[1])),
                unit: items[3].as_str()?.to_string(),
                encoding: DatetimeEncoding::Legacy,
            }),
            ("binning-strategy", 3 | 4) => Some(FieldReference::BinningStrategy {
                field: Box::new(Self::from_value(&items[1])),
                strategy: items[2].as_str()?.to_string(),
                param: items.get(3).cloned(),
            }),
            ("expression", 2) => items[1]
                .as_str()
                .map(|name| FieldReference::Expression(name.to_string())),
            ("aggregation", 2) => items[1]
                .as_u64()
                .map(|index| FieldReference::AggregateResult(index as usize)),
            ("field-literal", 3) => Some(FieldReference::FieldLiteral {
                name: items[1].as_str()?.to_string(),
                base_type: items[2].as_str()?.to_string(),
            }),
            _ => None,
        }
    }

    /// Encode back to the wire form this reference was read from.
    pub fn to_value(&self) -> Value {
        match self {
            FieldReference::Plain(id) => json!(id),
            FieldReference::LocalField(id) => json!(["field-id", id]),
            FieldReference::ForeignKey { source, dest } => {
                json!(["fk->", source.to_value(), dest.to_value()])
            }
            FieldReference::DatetimeCast {
                field,
                unit,
                encoding: DatetimeEncoding::Modern,
            } => json!(["datetime-field", field.to_value(), unit]),
            FieldReference::DatetimeCast {
                field,
                unit,
                encoding: DatetimeEncoding::Legacy,
            } => json!(["datetime-field", field.to_value(), "as", unit]),
            FieldReference::BinningStrategy {
                field,
                strategy,
                param,
            } => {
                let mut items = vec![json!("binning-strategy"), field.to_value(), json!(strategy)];
                items.extend(param.iter().cloned());
                Value::Array(items)
            }
            FieldReference::Expression(name) => json!(["expression", name]),
            FieldReference::AggregateResult(index) => json!(["aggregation", index]),
            FieldReference::FieldLiteral { name, base_type } => {
                json!(["field-literal", name, base_type])
            }
            FieldReference::Malformed(value) => value.clone(),
        }
    }

    // =========================================================================
    // Classification
    // =========================================================================

    pub fn is_plain(&self) -> bool {
        matches!(self, FieldReference::Plain(_))
    }

    pub fn is_local_field(&self) -> bool {
        matches!(self, FieldReference::LocalField(_))
    }

    pub fn is_foreign_key(&self) -> bool {
        matches!(self, FieldReference::ForeignKey { .. })
    }

    pub fn is_datetime_cast(&self) -> bool {
        matches!(self, FieldReference::DatetimeCast { .. })
    }

    pub fn is_binning_strategy(&self) -> bool {
        matches!(self, FieldReference::BinningStrategy { .. })
    }

    pub fn is_expression(&self) -> bool {
        matches!(self, FieldReference::Expression(_))
    }

    pub fn is_aggregate_result(&self) -> bool {
        matches!(self, FieldReference::AggregateResult(_))
    }

    pub fn is_field_literal(&self) -> bool {
        matches!(self, FieldReference::FieldLiteral { .. })
    }

    /// True for the `null` placeholder left by an unfinished edit.
    pub fn is_null(&self) -> bool {
        matches!(self, FieldReference::Malformed(Value::Null))
    }

    fn is_direct(&self) -> bool {
        self.is_plain() || self.is_local_field()
    }

    /// Recursive well-formedness.
    ///
    /// Both sides of an FK reference must be direct field ids; datetime and
    /// binning wrappers must wrap a well-formed reference.
    pub fn is_valid(&self) -> bool {
        match self {
            FieldReference::Plain(_) | FieldReference::LocalField(_) => true,
            FieldReference::ForeignKey { source, dest } => source.is_direct() && dest.is_direct(),
            FieldReference::DatetimeCast { field, .. }
            | FieldReference::BinningStrategy { field, .. } => field.is_valid(),
            FieldReference::Expression(_)
            | FieldReference::AggregateResult(_)
            | FieldReference::FieldLiteral { .. } => true,
            FieldReference::Malformed(_) => false,
        }
    }

    // =========================================================================
    // Targets
    // =========================================================================

    /// Strip FK/datetime/binning wrappers down to the identifying key.
    ///
    /// Logs a warning and returns `None` for malformed references.
    pub fn target_id(&self) -> Option<TargetId> {
        match self {
            FieldReference::Plain(id) | FieldReference::LocalField(id) => Some(TargetId::Field(*id)),
            FieldReference::ForeignKey { dest, .. } => dest.target_id(),
            FieldReference::DatetimeCast { field, .. }
            | FieldReference::BinningStrategy { field, .. } => field.target_id(),
            FieldReference::Expression(name) => Some(TargetId::Expression(name.clone())),
            FieldReference::AggregateResult(index) => Some(TargetId::Aggregation(*index)),
            FieldReference::FieldLiteral { name, base_type } => Some(TargetId::Literal {
                name: name.clone(),
                base_type: base_type.clone(),
            }),
            FieldReference::Malformed(value) => {
                tracing::warn!(field = %value, "unknown field reference shape");
                None
            }
        }
    }

    /// The datetime unit, when this reference is a datetime cast.
    pub fn datetime_unit(&self) -> Option<&str> {
        match self {
            FieldReference::DatetimeCast { unit, .. } => Some(unit),
            _ => None,
        }
    }

    /// Compare two references, either exactly or by target id.
    pub fn is_same_field(&self, other: &FieldReference, exact: bool) -> bool {
        if exact {
            self == other
        } else {
            match (self.target_id(), other.target_id()) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            }
        }
    }

    /// Replace every reference to the named expression with the null placeholder.
    pub fn without_expression(&self, name: &str) -> FieldReference {
        match self {
            FieldReference::Expression(n) if n == name => FieldReference::null(),
            FieldReference::ForeignKey { source, dest } => FieldReference::ForeignKey {
                source: Box::new(source.without_expression(name)),
                dest: Box::new(dest.without_expression(name)),
            },
            FieldReference::DatetimeCast {
                field,
                unit,
                encoding,
            } => FieldReference::DatetimeCast {
                field: Box::new(field.without_expression(name)),
                unit: unit.clone(),
                encoding: *encoding,
            },
            FieldReference::BinningStrategy {
                field,
                strategy,
                param,
            } => FieldReference::BinningStrategy {
                field: Box::new(field.without_expression(name)),
                strategy: strategy.clone(),
                param: param.clone(),
            },
            other => other.clone(),
        }
    }
}

impl From<FieldId> for FieldReference {
    fn from(id: FieldId) -> Self {
        FieldReference::Plain(id)
    }
}
