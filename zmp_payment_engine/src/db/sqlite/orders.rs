use chrono::{DateTime, Utc};
use log::{debug, trace};
use sqlx::{types::Json, FromRow, SqliteConnection};

use crate::{
    db::sqlite::SqliteDatabaseError,
    db_types::{
        Amount,
        CustomerInfo,
        NewOrder,
        Order,
        OrderId,
        OrderItem,
        OrderPage,
        OrderStatusType,
        Pagination,
        ProductSnapshot,
        StatusUpdate,
    },
};

const ORDER_COLUMNS: &str =
    "id, customer_info, total_amount, status, transaction_id, gateway_order_id, created_at, updated_at";

#[derive(Debug, FromRow)]
struct OrderRow {
    id: OrderId,
    customer_info: Json<CustomerInfo>,
    total_amount: Amount,
    status: OrderStatusType,
    transaction_id: Option<String>,
    gateway_order_id: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct OrderItemRow {
    product_snapshot: Json<ProductSnapshot>,
    quantity: i64,
    unit_price: Amount,
}

impl TryFrom<OrderItemRow> for OrderItem {
    type Error = SqliteDatabaseError;

    fn try_from(row: OrderItemRow) -> Result<Self, Self::Error> {
        let quantity = u32::try_from(row.quantity)
            .map_err(|_| SqliteDatabaseError::CorruptedRecord(format!("Invalid item quantity: {}", row.quantity)))?;
        Ok(Self { product_snapshot: row.product_snapshot.0, quantity, unit_price: row.unit_price })
    }
}

impl OrderRow {
    fn into_order(self, items: Vec<OrderItem>) -> Order {
        Order {
            id: self.id,
            customer_info: self.customer_info.0,
            total_amount: self.total_amount,
            status: self.status,
            transaction_id: self.transaction_id,
            gateway_order_id: self.gateway_order_id,
            items,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Inserts a new order and its items using the given connection. This is not atomic. Embed this call inside a
/// transaction, and pass `&mut tx` as the connection argument.
pub async fn insert_order(order: NewOrder, conn: &mut SqliteConnection) -> Result<Order, SqliteDatabaseError> {
    let sql = format!(
        "INSERT INTO orders (id, customer_info, total_amount, status, created_at, updated_at) VALUES ($1, $2, $3, $4, \
         $5, $6) RETURNING {ORDER_COLUMNS}"
    );
    let row = sqlx::query_as::<_, OrderRow>(&sql)
        .bind(&order.id)
        .bind(Json(order.customer_info.clone()))
        .bind(order.total_amount)
        .bind(OrderStatusType::Pending)
        .bind(order.created_at)
        .bind(order.created_at)
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(de) if de.is_unique_violation() => SqliteDatabaseError::DuplicateOrder(order.id.clone()),
            e => SqliteDatabaseError::from(e),
        })?
        .into_iter()
        .next()
        .ok_or(sqlx::Error::RowNotFound)?;
    for (position, item) in order.items.iter().enumerate() {
        #[allow(clippy::cast_possible_wrap)]
        let position = position as i64;
        sqlx::query(
            "INSERT INTO order_items (order_id, position, product_snapshot, quantity, unit_price) VALUES ($1, $2, $3, \
             $4, $5)",
        )
        .bind(&order.id)
        .bind(position)
        .bind(Json(item.product_snapshot.clone()))
        .bind(i64::from(item.quantity))
        .bind(item.unit_price)
        .execute(&mut *conn)
        .await?;
    }
    debug!("📝️ Order {} inserted with {} items", order.id, order.items.len());
    Ok(row.into_order(order.items))
}

async fn fetch_items(order_id: &OrderId, conn: &mut SqliteConnection) -> Result<Vec<OrderItem>, SqliteDatabaseError> {
    let rows = sqlx::query_as::<_, OrderItemRow>(
        "SELECT product_snapshot, quantity, unit_price FROM order_items WHERE order_id = $1 ORDER BY position ASC",
    )
    .bind(order_id)
    .fetch_all(&mut *conn)
    .await?;
    rows.into_iter().map(OrderItem::try_from).collect()
}

pub async fn fetch_order_by_id(
    order_id: &OrderId,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, SqliteDatabaseError> {
    let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1");
    let row = sqlx::query_as::<_, OrderRow>(&sql).bind(order_id).fetch_optional(&mut *conn).await?;
    match row {
        Some(row) => {
            let items = fetch_items(&row.id, conn).await?;
            Ok(Some(row.into_order(items)))
        },
        None => Ok(None),
    }
}

/// Fetches a page of orders, newest first.
pub async fn fetch_orders(pagination: Pagination, conn: &mut SqliteConnection) -> Result<OrderPage, SqliteDatabaseError> {
    let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM orders").fetch_one(&mut *conn).await?;
    let sql = format!("SELECT {ORDER_COLUMNS} FROM orders ORDER BY created_at DESC, rowid DESC LIMIT $1 OFFSET $2");
    trace!("📝️ Executing query: {sql}");
    let rows = sqlx::query_as::<_, OrderRow>(&sql)
        .bind(i64::from(pagination.size))
        .bind(pagination.offset())
        .fetch_all(&mut *conn)
        .await?;
    let mut items = Vec::with_capacity(rows.len());
    for row in rows {
        let order_items = fetch_items(&row.id, conn).await?;
        items.push(row.into_order(order_items));
    }
    trace!("📝️ Result of fetch_orders: {} of {total}", items.len());
    Ok(OrderPage { items, total, page: pagination.page, size: pagination.size })
}

/// Compare-and-swap status update. The row is only touched if its status still equals `update.expected`, so of
/// several concurrent writers that read the same status, exactly one succeeds.
pub async fn update_order_status(
    order_id: &OrderId,
    update: StatusUpdate,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, SqliteDatabaseError> {
    let sql = format!(
        r#"
        UPDATE orders SET
            status = $1,
            transaction_id = CASE WHEN transaction_id IS NULL OR transaction_id = '' THEN $2 ELSE transaction_id END,
            gateway_order_id = CASE WHEN gateway_order_id IS NULL OR gateway_order_id = '' THEN $3 ELSE gateway_order_id END,
            updated_at = $4
        WHERE id = $5 AND status = $6
        RETURNING {ORDER_COLUMNS}
        "#
    );
    let row = sqlx::query_as::<_, OrderRow>(&sql)
        .bind(update.new_status)
        .bind(update.transaction_id)
        .bind(update.gateway_order_id)
        .bind(Utc::now())
        .bind(order_id)
        .bind(update.expected)
        .fetch_all(&mut *conn)
        .await?
        .into_iter()
        .next();
    match row {
        Some(row) => {
            debug!("📝️ Order {order_id} moved from {} to {}", update.expected, row.status);
            let items = fetch_items(&row.id, conn).await?;
            Ok(Some(row.into_order(items)))
        },
        None => {
            trace!("📝️ Order {order_id} was not in status {}. Update skipped.", update.expected);
            Ok(None)
        },
    }
}
