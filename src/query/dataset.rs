//! Dataset queries: the envelope that binds a query to a database.
//!
//! ```json
//! {"database": 1, "type": "query", "query": {"source-table": 2}}
//! {"database": 1, "type": "native", "native": {"query": "select 1"}}
//! ```

use serde_json::{json, Map, Value};

use super::{value_kind, StructuredQuery, TableId};
use crate::error::{QueryError, QueryResult};

/// Database identifier.
pub type DatabaseId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueryKind {
    #[default]
    Structured,
    Native,
}

impl QueryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryKind::Structured => "query",
            QueryKind::Native => "native",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DatasetBody {
    Structured(StructuredQuery),
    Native { query: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct DatasetQuery {
    pub database: Option<DatabaseId>,
    pub body: DatasetBody,
}

/// Build an empty query from the template for `kind`.
///
/// The source table is only set for structured queries, and only when the
/// database is known too.
pub fn create_query(kind: QueryKind, database: Option<DatabaseId>, table: Option<TableId>) -> DatasetQuery {
    let body = match kind {
        QueryKind::Structured => DatasetBody::Structured(StructuredQuery {
            source_table: database.and(table),
            ..Default::default()
        }),
        QueryKind::Native => DatasetBody::Native {
            query: String::new(),
        },
    };
    DatasetQuery { database, body }
}

impl DatasetQuery {
    pub fn kind(&self) -> QueryKind {
        match self.body {
            DatasetBody::Structured(_) => QueryKind::Structured,
            DatasetBody::Native { .. } => QueryKind::Native,
        }
    }

    pub fn is_structured(&self) -> bool {
        self.kind() == QueryKind::Structured
    }

    pub fn is_native(&self) -> bool {
        self.kind() == QueryKind::Native
    }

    pub fn structured(&self) -> Option<&StructuredQuery> {
        match &self.body {
            DatasetBody::Structured(query) => Some(query),
            DatasetBody::Native { .. } => None,
        }
    }

    pub fn from_value(value: &Value) -> QueryResult<Self> {
        let object = value.as_object().ok_or_else(|| QueryError::NotAnObject {
            context: "dataset query",
            found: value_kind(value),
        })?;
        let database = object.get("database").and_then(Value::as_i64);
        let body = match object.get("type").and_then(Value::as_str) {
            Some("query") => {
                let query = object.get("query").cloned().unwrap_or_else(|| json!({}));
                DatasetBody::Structured(StructuredQuery::from_value(&query)?)
            }
            Some("native") => DatasetBody::Native {
                query: object
                    .get("native")
                    .and_then(|native| native.get("query"))
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
            },
            other => {
                return Err(QueryError::UnknownQueryType(
                    other.unwrap_or("<missing>").to_string(),
                ))
            }
        };
        Ok(Self { database, body })
    }

    pub fn to_value(&self) -> Value {
        let mut object = Map::new();
        object.insert("database".into(), json!(self.database));
        object.insert("type".into(), json!(self.kind().as_str()));
        match &self.body {
            DatasetBody::Structured(query) => {
                object.insert("query".into(), query.to_value());
            }
            DatasetBody::Native { query } => {
                object.insert("native".into(), json!({ "query": query }));
            }
        }
        Value::Object(object)
    }
}
