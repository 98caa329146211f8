use async_trait::async_trait;
use thiserror::Error;

use crate::db_types::Product;

#[derive(Debug, Clone, Error)]
pub enum CatalogError {
    #[error("Catalog database error: {0}")]
    DatabaseError(String),
}

/// Read-only product lookup.
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    async fn fetch_product(&self, product_id: i64) -> Result<Option<Product>, CatalogError>;
}
