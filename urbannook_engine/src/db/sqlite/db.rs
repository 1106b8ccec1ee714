use std::fmt::Debug;

use chrono::Utc;
use log::*;
use sqlx::SqlitePool;

use super::{db_url, new_pool, orders, orders::OrderLookup};
use crate::{
    db::traits::{OrderManagement, OrderStoreError},
    db_types::{NewOrder, Order, OrderId, OrderStatusType, StatusHistoryEntry},
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
    /// Creates a new database API object, using the `UN_DATABASE_URL` environment variable (or the default).
    pub async fn new(max_connections: u32) -> Result<Self, OrderStoreError> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, OrderStoreError> {
        let pool = new_pool(url, max_connections).await?;
        Ok(Self { url: url.to_string(), pool })
    }

    /// Applies the embedded schema migrations.
    pub async fn migrate(&self) -> Result<(), OrderStoreError> {
        sqlx::migrate!("./src/db/sqlite/migrations")
            .run(&self.pool)
            .await
            .map_err(|e| OrderStoreError::DatabaseError(e.to_string()))?;
        info!("🗃️ Database migrations complete");
        Ok(())
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn close(&mut self) -> Result<(), OrderStoreError> {
        self.pool.close().await;
        Ok(())
    }
}

impl OrderManagement for SqliteDatabase {
    async fn insert_order(&self, order: NewOrder) -> Result<Order, OrderStoreError> {
        let mut tx = self.pool.begin().await?;
        orders::insert_order(&order, &mut tx).await?;
        let stored = orders::fetch_order(OrderLookup::OrderId(&order.order_id), &mut tx)
            .await?
            .ok_or_else(|| OrderStoreError::OrderNotFound(order.order_id.clone()))?;
        tx.commit().await?;
        Ok(stored)
    }

    async fn fetch_order_by_order_id(&self, order_id: &OrderId) -> Result<Option<Order>, OrderStoreError> {
        let mut conn = self.pool.acquire().await?;
        orders::fetch_order(OrderLookup::OrderId(order_id), &mut conn).await
    }

    async fn fetch_order_by_gateway_ref(&self, gateway_ref: &str) -> Result<Option<Order>, OrderStoreError> {
        let mut conn = self.pool.acquire().await?;
        orders::fetch_order(OrderLookup::GatewayRef(gateway_ref), &mut conn).await
    }

    async fn fetch_orders_for_user(&self, user_id: &str) -> Result<Vec<Order>, OrderStoreError> {
        let mut conn = self.pool.acquire().await?;
        orders::fetch_orders_for_user(user_id, &mut conn).await
    }

    async fn save_order(&self, order: &Order) -> Result<Order, OrderStoreError> {
        let mut tx = self.pool.begin().await?;
        let updated = orders::update_order_if_version(order, Utc::now(), &mut tx).await?;
        if updated == 0 {
            // Dropping the transaction rolls it back
            return if orders::order_exists(&order.order_id, &mut tx).await? {
                debug!("🗃️ Version {} of order {} is stale. Save rejected.", order.version, order.order_id);
                Err(OrderStoreError::VersionConflict { order_id: order.order_id.clone(), expected: order.version })
            } else {
                Err(OrderStoreError::OrderNotFound(order.order_id.clone()))
            };
        }
        let stored_len = orders::history_length(&order.order_id, &mut tx).await?;
        if stored_len > order.status_history.len() {
            warn!(
                "🗃️ Order {} has {stored_len} stored history entries but the save only carries {}. Save rejected.",
                order.order_id,
                order.status_history.len()
            );
            return Err(OrderStoreError::VersionConflict { order_id: order.order_id.clone(), expected: order.version });
        }
        orders::append_history(&order.order_id, stored_len, &order.status_history[stored_len..], &mut tx).await?;
        let stored = orders::fetch_order(OrderLookup::OrderId(&order.order_id), &mut tx)
            .await?
            .ok_or_else(|| OrderStoreError::OrderNotFound(order.order_id.clone()))?;
        tx.commit().await?;
        trace!("🗃️ Order {} saved at version {}", stored.order_id, stored.version);
        Ok(stored)
    }

    async fn mark_payment_failed(
        &self,
        gateway_ref: &str,
        from: &[OrderStatusType],
        status: OrderStatusType,
        error_code: &str,
        error_description: &str,
    ) -> Result<u64, OrderStoreError> {
        let mut tx = self.pool.begin().await?;
        let updated =
            orders::mark_payment_failed(gateway_ref, from, status, error_code, error_description, &mut tx).await?;
        let Some(order_id) = updated else {
            debug!("🗃️ No order eligible for a payment failure is linked to gateway reference {gateway_ref}");
            return Ok(0);
        };
        let position = orders::history_length(&order_id, &mut tx).await?;
        let entry = StatusHistoryEntry::new(status, Some(format!("Payment failed: {error_code}")));
        orders::append_history(&order_id, position, &[entry], &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ Order {order_id} marked {status} with payment error {error_code}");
        Ok(1)
    }
}
