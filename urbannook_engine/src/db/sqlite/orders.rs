//! Query helpers for the `orders`, `order_items` and `order_status_history` tables.
//!
//! None of these functions are atomic on their own. Wrap them in a transaction and pass `&mut tx` as the connection
//! when several of them must succeed or fail together.
use chrono::{DateTime, Utc};
use log::{debug, trace};
use sqlx::{FromRow, QueryBuilder, Sqlite, SqliteConnection};
use urbannook_common::Paise;

use crate::{
    db::traits::OrderStoreError,
    db_types::{
        LineItem,
        NewOrder,
        Order,
        OrderId,
        OrderStatusType,
        PaymentInfo,
        ShippingAddress,
        StatusHistoryEntry,
        TrackingInfo,
    },
};

const ORDER_COLUMNS: &str = "order_id, user_id, status, amount, gateway_order_ref, gateway_payment_id, \
                             payment_error_code, payment_error_description, carrier, tracking_number, \
                             estimated_delivery, shipping_address, version, created_at, updated_at";

#[derive(Debug, FromRow)]
struct OrderRow {
    order_id: String,
    user_id: String,
    status: String,
    amount: i64,
    gateway_order_ref: String,
    gateway_payment_id: Option<String>,
    payment_error_code: Option<String>,
    payment_error_description: Option<String>,
    carrier: Option<String>,
    tracking_number: Option<String>,
    estimated_delivery: Option<DateTime<Utc>>,
    shipping_address: Option<String>,
    version: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct HistoryRow {
    status: String,
    note: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct ItemRow {
    product_name: String,
    quantity: i64,
    price: i64,
    snapshot: String,
}

/// How to locate a single order.
#[derive(Debug, Clone, Copy)]
pub enum OrderLookup<'a> {
    OrderId(&'a OrderId),
    GatewayRef(&'a str),
}

/// Inserts a new order and its line items. Fails with [`OrderStoreError::DuplicateOrder`] if the order id is taken.
pub async fn insert_order(order: &NewOrder, conn: &mut SqliteConnection) -> Result<(), OrderStoreError> {
    if order_exists(&order.order_id, &mut *conn).await? {
        return Err(OrderStoreError::DuplicateOrder(order.order_id.clone()));
    }
    let shipping_address = order.shipping_address.as_ref().map(serde_json::to_string).transpose()?;
    sqlx::query(
        r#"
            INSERT INTO orders (order_id, user_id, status, amount, gateway_order_ref, shipping_address, version,
                                created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, 0, $7, $7);
        "#,
    )
    .bind(order.order_id.as_str())
    .bind(&order.user_id)
    .bind(OrderStatusType::Created.as_str())
    .bind(order.amount().value())
    .bind(&order.gateway_order_ref)
    .bind(shipping_address)
    .bind(order.created_at)
    .execute(&mut *conn)
    .await?;
    for (position, item) in order.items.iter().enumerate() {
        let snapshot = serde_json::to_string(&item.snapshot)?;
        sqlx::query(
            r#"
                INSERT INTO order_items (order_id, position, product_name, quantity, price, snapshot)
                VALUES ($1, $2, $3, $4, $5, $6);
            "#,
        )
        .bind(order.order_id.as_str())
        .bind(position as i64)
        .bind(&item.product_name)
        .bind(i64::from(item.quantity))
        .bind(item.price.value())
        .bind(snapshot)
        .execute(&mut *conn)
        .await?;
    }
    debug!("🗃️ Order {} inserted with {} line items", order.order_id, order.items.len());
    Ok(())
}

pub async fn order_exists(order_id: &OrderId, conn: &mut SqliteConnection) -> Result<bool, OrderStoreError> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE order_id = $1")
        .bind(order_id.as_str())
        .fetch_one(conn)
        .await?;
    Ok(count > 0)
}

/// Loads a complete order document (row, items and history) or `None` if it does not exist.
pub async fn fetch_order(lookup: OrderLookup<'_>, conn: &mut SqliteConnection) -> Result<Option<Order>, OrderStoreError> {
    let mut builder = QueryBuilder::<Sqlite>::new(format!("SELECT {ORDER_COLUMNS} FROM orders WHERE "));
    match lookup {
        OrderLookup::OrderId(id) => builder.push("order_id = ").push_bind(id.as_str()),
        OrderLookup::GatewayRef(gateway_ref) => builder.push("gateway_order_ref = ").push_bind(gateway_ref),
    };
    builder.push(" ORDER BY id DESC LIMIT 1");
    trace!("🗃️ Executing query: {}", builder.sql());
    let row = builder.build_query_as::<OrderRow>().fetch_optional(&mut *conn).await?;
    match row {
        Some(row) => Ok(Some(hydrate(row, conn).await?)),
        None => Ok(None),
    }
}

pub async fn fetch_orders_for_user(user_id: &str, conn: &mut SqliteConnection) -> Result<Vec<Order>, OrderStoreError> {
    let rows = sqlx::query_as::<_, OrderRow>(&format!(
        "SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = $1 ORDER BY created_at DESC, id DESC"
    ))
    .bind(user_id)
    .fetch_all(&mut *conn)
    .await?;
    let mut orders = Vec::with_capacity(rows.len());
    for row in rows {
        orders.push(hydrate(row, &mut *conn).await?);
    }
    Ok(orders)
}

async fn hydrate(row: OrderRow, conn: &mut SqliteConnection) -> Result<Order, OrderStoreError> {
    let items = sqlx::query_as::<_, ItemRow>(
        "SELECT product_name, quantity, price, snapshot FROM order_items WHERE order_id = $1 ORDER BY position ASC",
    )
    .bind(&row.order_id)
    .fetch_all(&mut *conn)
    .await?
    .into_iter()
    .map(|item| {
        let quantity = u32::try_from(item.quantity)
            .map_err(|_| OrderStoreError::CorruptRecord(format!("Invalid quantity {}", item.quantity)))?;
        Ok(LineItem {
            product_name: item.product_name,
            quantity,
            price: Paise::from(item.price),
            snapshot: serde_json::from_str(&item.snapshot)?,
        })
    })
    .collect::<Result<Vec<_>, OrderStoreError>>()?;
    let status_history = sqlx::query_as::<_, HistoryRow>(
        "SELECT status, note, created_at FROM order_status_history WHERE order_id = $1 ORDER BY position ASC",
    )
    .bind(&row.order_id)
    .fetch_all(&mut *conn)
    .await?
    .into_iter()
    .map(|entry| {
        Ok(StatusHistoryEntry { status: parse_status(&entry.status)?, timestamp: entry.created_at, note: entry.note })
    })
    .collect::<Result<Vec<_>, OrderStoreError>>()?;
    let shipping_address =
        row.shipping_address.as_deref().map(serde_json::from_str::<ShippingAddress>).transpose()?;
    Ok(Order {
        order_id: OrderId(row.order_id),
        user_id: row.user_id,
        status: parse_status(&row.status)?,
        status_history,
        tracking_info: TrackingInfo {
            carrier: row.carrier,
            tracking_number: row.tracking_number,
            estimated_delivery: row.estimated_delivery,
        },
        payment: PaymentInfo {
            gateway_order_ref: row.gateway_order_ref,
            gateway_payment_id: row.gateway_payment_id,
            error_code: row.payment_error_code,
            error_description: row.payment_error_description,
        },
        items,
        amount: Paise::from(row.amount),
        shipping_address,
        created_at: row.created_at,
        updated_at: row.updated_at,
        version: row.version,
    })
}

fn parse_status(value: &str) -> Result<OrderStatusType, OrderStoreError> {
    value.parse().map_err(|e: crate::db_types::StatusConversionError| OrderStoreError::CorruptRecord(e.to_string()))
}

/// Writes the mutable columns of `order`, provided the stored version still equals `order.version`.
///
/// Returns the number of rows updated. Zero means the version check failed (or the order does not exist).
pub async fn update_order_if_version(
    order: &Order,
    updated_at: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<u64, OrderStoreError> {
    let result = sqlx::query(
        r#"
            UPDATE orders SET
                status = $1,
                gateway_payment_id = $2,
                payment_error_code = $3,
                payment_error_description = $4,
                carrier = $5,
                tracking_number = $6,
                estimated_delivery = $7,
                version = version + 1,
                updated_at = $8
            WHERE order_id = $9 AND version = $10;
        "#,
    )
    .bind(order.status.as_str())
    .bind(&order.payment.gateway_payment_id)
    .bind(&order.payment.error_code)
    .bind(&order.payment.error_description)
    .bind(&order.tracking_info.carrier)
    .bind(&order.tracking_info.tracking_number)
    .bind(order.tracking_info.estimated_delivery)
    .bind(updated_at)
    .bind(order.order_id.as_str())
    .bind(order.version)
    .execute(conn)
    .await?;
    Ok(result.rows_affected())
}

pub async fn history_length(order_id: &OrderId, conn: &mut SqliteConnection) -> Result<usize, OrderStoreError> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM order_status_history WHERE order_id = $1")
        .bind(order_id.as_str())
        .fetch_one(conn)
        .await?;
    Ok(usize::try_from(count).unwrap_or_default())
}

/// Appends history entries, numbering them from `first_position`.
pub async fn append_history(
    order_id: &OrderId,
    first_position: usize,
    entries: &[StatusHistoryEntry],
    conn: &mut SqliteConnection,
) -> Result<(), OrderStoreError> {
    for (offset, entry) in entries.iter().enumerate() {
        sqlx::query(
            r#"
                INSERT INTO order_status_history (order_id, position, status, note, created_at)
                VALUES ($1, $2, $3, $4, $5);
            "#,
        )
        .bind(order_id.as_str())
        .bind((first_position + offset) as i64)
        .bind(entry.status.as_str())
        .bind(&entry.note)
        .bind(entry.timestamp)
        .execute(&mut *conn)
        .await?;
    }
    trace!("🗃️ Appended {} history entries to order {order_id}", entries.len());
    Ok(())
}

/// Sets the status and payment error fields of the latest order linked to `gateway_ref`. No other column is written,
/// apart from the concurrency bookkeeping.
///
/// The order must currently be in one of the `from` statuses and carry no verified payment, otherwise nothing is
/// written. The write is the first statement, so inside a transaction it takes the write lock before reading anything.
///
/// Returns the id of the updated order.
pub async fn mark_payment_failed(
    gateway_ref: &str,
    from: &[OrderStatusType],
    status: OrderStatusType,
    error_code: &str,
    error_description: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<OrderId>, OrderStoreError> {
    if from.is_empty() {
        return Ok(None);
    }
    let mut builder = QueryBuilder::<Sqlite>::new("UPDATE orders SET status = ");
    builder
        .push_bind(status.as_str())
        .push(", payment_error_code = ")
        .push_bind(error_code)
        .push(", payment_error_description = ")
        .push_bind(error_description)
        .push(", version = version + 1, updated_at = ")
        .push_bind(Utc::now())
        .push(" WHERE id = (SELECT id FROM orders WHERE gateway_order_ref = ")
        .push_bind(gateway_ref)
        .push(" ORDER BY id DESC LIMIT 1) AND gateway_payment_id IS NULL AND status IN (");
    let mut statuses = builder.separated(", ");
    for s in from {
        statuses.push_bind(s.as_str());
    }
    statuses.push_unseparated(") RETURNING order_id");
    let order_id: Option<String> = builder.build_query_scalar().fetch_optional(conn).await?;
    Ok(order_id.map(OrderId))
}
