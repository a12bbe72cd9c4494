//! Catalog metadata consumed by the query engine.
//!
//! The engine only ever reads this data. It is supplied by the caller, either
//! as a [`Catalog`] decoded from JSON or through any other
//! [`CatalogProvider`] implementation.
//!
//! # Example
//!
//! ```ignore
//! use structured_query::metadata::{Catalog, CatalogProvider};
//!
//! let catalog: Catalog = serde_json::from_str(&text)?;
//! let orders = catalog.table(1).expect("orders table");
//! let total = orders.field(12);
//! ```

mod capabilities;
mod provider;
mod types;

pub use capabilities::{operators_lookup, DefaultCapabilities, FieldCapabilities, FilterOperator};
pub use provider::{Catalog, CatalogProvider};
pub use types::*;
