use thiserror::Error;

use crate::{
    db_types::OrderId,
    traits::{CatalogError, OrderStoreError},
};

#[derive(Debug, Error)]
pub enum SqliteDatabaseError {
    #[error("Database connection error: {0}")]
    DriverError(#[from] sqlx::Error),
    #[error("Could not run database migrations: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),
    #[error("Cannot insert duplicate order {0}")]
    DuplicateOrder(OrderId),
    #[error("Stored record could not be decoded: {0}")]
    CorruptedRecord(String),
}

impl From<SqliteDatabaseError> for OrderStoreError {
    fn from(e: SqliteDatabaseError) -> Self {
        match e {
            SqliteDatabaseError::DuplicateOrder(id) => OrderStoreError::DuplicateOrderId(id),
            SqliteDatabaseError::CorruptedRecord(s) => OrderStoreError::CorruptedRecord(s),
            e => OrderStoreError::DatabaseError(e.to_string()),
        }
    }
}

impl From<SqliteDatabaseError> for CatalogError {
    fn from(e: SqliteDatabaseError) -> Self {
        CatalogError::DatabaseError(e.to_string())
    }
}
