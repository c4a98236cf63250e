//! # Order Repository
//!
//! Paid orders and their line items.
//!
//! ## Checkout Write
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  BEGIN                                                                  │
//! │    INSERT orders        (session_id, totals, payment label + kind)     │
//! │    INSERT order_items   (one per cart line, price frozen)              │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  Either the whole order lands or nothing does.                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use resto_core::{Order, OrderItem};

const SELECT_ORDER: &str = r#"
    SELECT
        o.id,
        o.restaurant_id,
        o.session_id,
        o.cashier_id,
        s.full_name AS cashier_name,
        o.subtotal_minor,
        o.tax_minor,
        o.total_minor,
        o.payment_method,
        o.payment_kind,
        o.created_at
    FROM orders o
    LEFT JOIN staff_profiles s ON s.id = o.cashier_id
"#;

#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Inserts an order and its lines in one transaction.
    pub async fn insert_with_items(&self, order: &Order, items: &[OrderItem]) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO orders (
                id, restaurant_id, session_id, cashier_id,
                subtotal_minor, tax_minor, total_minor,
                payment_method, payment_kind, status, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, 'paid', ?10)
            "#,
        )
        .bind(&order.id)
        .bind(&order.restaurant_id)
        .bind(&order.session_id)
        .bind(&order.cashier_id)
        .bind(order.subtotal_minor)
        .bind(order.tax_minor)
        .bind(order.total_minor)
        .bind(&order.payment_method)
        .bind(order.payment_kind)
        .bind(order.created_at)
        .execute(&mut *tx)
        .await?;

        for item in items {
            sqlx::query(
                r#"
                INSERT INTO order_items (
                    id, order_id, menu_item_id, name_snapshot,
                    quantity, price_at_time_minor, line_total_minor, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                "#,
            )
            .bind(&item.id)
            .bind(&item.order_id)
            .bind(&item.menu_item_id)
            .bind(&item.name_snapshot)
            .bind(item.quantity)
            .bind(item.price_at_time_minor)
            .bind(item.line_total_minor)
            .bind(item.created_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        info!(
            order_id = %order.id,
            total = order.total_minor,
            items = items.len(),
            payment = %order.payment_method,
            "Order recorded"
        );
        Ok(())
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Order>> {
        let sql = format!("{} WHERE o.id = ?1", SELECT_ORDER);
        let order = sqlx::query_as::<_, Order>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(order)
    }

    /// Line items of an order in the order they were rung up.
    pub async fn items(&self, order_id: &str) -> DbResult<Vec<OrderItem>> {
        let items = sqlx::query_as::<_, OrderItem>(
            r#"
            SELECT
                id, order_id, menu_item_id, name_snapshot,
                quantity, price_at_time_minor, line_total_minor, created_at
            FROM order_items
            WHERE order_id = ?1
            ORDER BY rowid
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Orders created in `[from, to)`, newest first.
    pub async fn list_in_range(
        &self,
        restaurant_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> DbResult<Vec<Order>> {
        debug!(from = %from, to = %to, "Loading orders in range");

        let sql = format!(
            r#"{}
            WHERE o.restaurant_id = ?1 AND o.created_at >= ?2 AND o.created_at < ?3
            ORDER BY o.created_at DESC"#,
            SELECT_ORDER
        );
        let orders = sqlx::query_as::<_, Order>(&sql)
            .bind(restaurant_id)
            .bind(from)
            .bind(to)
            .fetch_all(&self.pool)
            .await?;

        Ok(orders)
    }

    /// All orders attached to a shift.
    pub async fn list_for_session(&self, session_id: &str) -> DbResult<Vec<Order>> {
        let sql = format!("{} WHERE o.session_id = ?1 ORDER BY o.created_at", SELECT_ORDER);
        let orders = sqlx::query_as::<_, Order>(&sql)
            .bind(session_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(orders)
    }

    /// Loads an order with its lines, failing if it doesn't exist.
    pub async fn get_with_items(&self, id: &str) -> DbResult<(Order, Vec<OrderItem>)> {
        let order = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Order", id))?;
        let items = self.items(id).await?;
        Ok((order, items))
    }
}
