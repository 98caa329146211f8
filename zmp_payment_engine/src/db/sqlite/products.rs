use log::debug;
use sqlx::SqliteConnection;

use crate::{
    db::sqlite::SqliteDatabaseError,
    db_types::{NewProduct, Product},
};

const PRODUCT_COLUMNS: &str = "id, name, price, description, image_url, created_at, updated_at";

pub async fn fetch_product(id: i64, conn: &mut SqliteConnection) -> Result<Option<Product>, SqliteDatabaseError> {
    let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1");
    let product = sqlx::query_as::<_, Product>(&sql).bind(id).fetch_optional(conn).await?;
    Ok(product)
}

/// Inserts a product. `INSERT … RETURNING` must be stepped to completion before the row is visible to other
/// connections, so the statement is drained with `fetch_all`. Call this inside a transaction.
pub async fn insert_product(product: NewProduct, conn: &mut SqliteConnection) -> Result<Product, SqliteDatabaseError> {
    let sql = format!(
        "INSERT INTO products (name, price, description, image_url) VALUES ($1, $2, $3, $4) RETURNING \
         {PRODUCT_COLUMNS}"
    );
    let product = sqlx::query_as::<_, Product>(&sql)
        .bind(product.name)
        .bind(product.price)
        .bind(product.description)
        .bind(product.image_url)
        .fetch_all(conn)
        .await?
        .into_iter()
        .next()
        .ok_or(sqlx::Error::RowNotFound)?;
    debug!("📝️ Product #{} added to the catalog", product.id);
    Ok(product)
}
