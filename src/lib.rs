//! # Structured Query
//!
//! An intermediate representation for declarative analytical queries, with
//! the algorithms that keep it consistent while a user edits it.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                  Wire JSON (tagged arrays)               │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [query]
//! ┌─────────────────────────────────────────────────────────┐
//! │                    StructuredQuery                       │
//! │  (field refs, aggregations, breakouts, filters, sorts)   │
//! └─────────────────────────────────────────────────────────┘
//!              │                              │
//!              ▼ [normalize]                  ▼ [resolve + metadata]
//! ┌─────────────────────────┐   ┌───────────────────────────┐
//! │   Canonical query       │   │  Catalog fields, FK paths │
//! └─────────────────────────┘   └───────────────────────────┘
//!                                             │
//!                                             ▼ [describe]
//! ┌─────────────────────────────────────────────────────────┐
//! │       "Orders, Sum of Total, Grouped by Category"        │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! The core never fails on partially edited input: malformed fragments are
//! kept as values, dropped by [`normalize::clean_query`], and rendered as
//! placeholders by [`describe`].

pub mod config;
pub mod describe;
pub mod error;
pub mod metadata;
pub mod normalize;
pub mod query;
pub mod resolve;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::describe::{
        generate_query_description, render_plain, DescribeOptions, DescriptionSegment, QueryDescriber, Section,
    };
    pub use crate::error::{QueryError, QueryResult};
    pub use crate::metadata::{Catalog, CatalogProvider, DefaultCapabilities, Field, TableMetadata};
    pub use crate::normalize::{can_run, clean_query, remove_expression, set_expression};
    pub use crate::query::{
        AggregationClause, AggregationOperator, Direction, ExpressionClause, FieldReference, FilterClause,
        OrderByClause, StructuredQuery,
    };
    pub use crate::resolve::Resolver;
}

// Also export at crate root for convenience
pub use normalize::clean_query;
pub use query::{FieldReference, StructuredQuery};
