use std::fmt::Debug;

use async_trait::async_trait;
use log::*;
use sqlx::{migrate, SqlitePool};

use super::{db_url, new_pool, orders, products, SqliteDatabaseError};
use crate::{
    db_types::{NewOrder, NewProduct, Order, OrderId, OrderPage, Pagination, Product, StatusUpdate},
    traits::{CatalogError, OrderManagement, OrderStoreError, ProductCatalog},
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SqliteDatabase ({})", self.url)
    }
}

impl SqliteDatabase {
    /// Creates a new database API object using the URL in `ZMP_DATABASE_URL`.
    pub async fn new(max_connections: u32) -> Result<Self, SqliteDatabaseError> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, SqliteDatabaseError> {
        trace!("📝️ Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        Ok(Self { url: url.to_string(), pool })
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Brings the schema up to date.
    pub async fn run_migrations(&self) -> Result<(), SqliteDatabaseError> {
        migrate!("./src/db/sqlite/migrations").run(&self.pool).await?;
        info!("📝️ Database migrations complete");
        Ok(())
    }

    /// Adds a product to the catalog. Used to seed catalogs; there is no other catalog management.
    pub async fn insert_product(&self, product: NewProduct) -> Result<Product, SqliteDatabaseError> {
        let mut tx = self.pool.begin().await?;
        let product = products::insert_product(product, &mut tx).await?;
        tx.commit().await?;
        Ok(product)
    }

    pub async fn close(&mut self) -> Result<(), SqliteDatabaseError> {
        self.pool.close().await;
        Ok(())
    }
}

#[async_trait]
impl OrderManagement for SqliteDatabase {
    async fn insert_order(&self, order: NewOrder) -> Result<Order, OrderStoreError> {
        let mut tx = self.pool.begin().await.map_err(SqliteDatabaseError::from)?;
        let order = orders::insert_order(order, &mut tx).await?;
        tx.commit().await.map_err(SqliteDatabaseError::from)?;
        Ok(order)
    }

    async fn fetch_order_by_id(&self, order_id: &OrderId) -> Result<Option<Order>, OrderStoreError> {
        let mut conn = self.pool.acquire().await.map_err(SqliteDatabaseError::from)?;
        let order = orders::fetch_order_by_id(order_id, &mut conn).await?;
        Ok(order)
    }

    async fn fetch_orders(&self, pagination: Pagination) -> Result<OrderPage, OrderStoreError> {
        let mut conn = self.pool.acquire().await.map_err(SqliteDatabaseError::from)?;
        let page = orders::fetch_orders(pagination, &mut conn).await?;
        Ok(page)
    }

    async fn update_order_status(
        &self,
        order_id: &OrderId,
        update: StatusUpdate,
    ) -> Result<Option<Order>, OrderStoreError> {
        let mut tx = self.pool.begin().await.map_err(SqliteDatabaseError::from)?;
        let order = orders::update_order_status(order_id, update, &mut tx).await?;
        tx.commit().await.map_err(SqliteDatabaseError::from)?;
        Ok(order)
    }
}

#[async_trait]
impl ProductCatalog for SqliteDatabase {
    async fn fetch_product(&self, product_id: i64) -> Result<Option<Product>, CatalogError> {
        let mut conn = self.pool.acquire().await.map_err(SqliteDatabaseError::from)?;
        let product = products::fetch_product(product_id, &mut conn).await?;
        Ok(product)
    }
}
