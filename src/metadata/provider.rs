//! Catalog lookup seam.

use serde::{Deserialize, Serialize};

use super::types::TableMetadata;
use crate::query::TableId;

/// Supplies table metadata by id.
///
/// Foreign keys are resolved through this trait, so a provider must be able to
/// answer for every table an FK can point at.
pub trait CatalogProvider {
    fn table(&self, id: TableId) -> Option<&TableMetadata>;
}

/// An in-memory catalog of tables.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub tables: Vec<TableMetadata>,
}

impl Catalog {
    pub fn new(tables: Vec<TableMetadata>) -> Self {
        Self { tables }
    }
}

impl CatalogProvider for Catalog {
    fn table(&self, id: TableId) -> Option<&TableMetadata> {
        self.tables.iter().find(|table| table.id == id)
    }
}

/// A single table is a catalog of itself.
impl CatalogProvider for TableMetadata {
    fn table(&self, id: TableId) -> Option<&TableMetadata> {
        (self.id == id).then_some(self)
    }
}
