//! # Order Repository
//!
//! Database operations for orders and their line items.
//!
//! ## Completion Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    insert_completed(order, shift)                       │
//! │                                                                         │
//! │  BEGIN                                                                 │
//! │    INSERT INTO orders        (status = 'completed', total, change)     │
//! │    INSERT INTO order_items   (one row per line, options as JSON)       │
//! │    UPDATE shifts SET totals  WHERE id = ? AND status = 'active'        │
//! │         │                                                               │
//! │         ├── 0 rows? → shift closed meanwhile → ROLLBACK, Conflict      │
//! │         ▼                                                               │
//! │  COMMIT                                                                │
//! │                                                                         │
//! │  Either the order and the shift totals both change, or neither does.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::debug;

use crate::error::{DbError, DbResult};
use shiftbook_core::{
    LineItem, Money, OptionAdjustment, Order, OrderRecord, OrderStatus, OrderType, PaymentMethod,
    Shift,
};

const ORDER_COLUMNS: &str = r#"
    id, order_number, shift_id, order_type, table_number, payment_method,
    total_amount, status, cash_received, change_amount,
    created_at, completed_at, cancelled_at
"#;

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: String,
    order_number: String,
    shift_id: String,
    order_type: OrderType,
    table_number: Option<String>,
    payment_method: PaymentMethod,
    total_amount: i64,
    status: OrderStatus,
    cash_received: Option<i64>,
    change_amount: Option<i64>,
    created_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    cancelled_at: Option<DateTime<Utc>>,
}

#[derive(Debug, sqlx::FromRow)]
struct OrderItemRow {
    product_id: String,
    name: String,
    unit_price: i64,
    quantity: i64,
    option_adjustments: String,
    notes: Option<String>,
}

impl OrderItemRow {
    fn into_line_item(self) -> DbResult<LineItem> {
        let option_adjustments: Vec<OptionAdjustment> =
            serde_json::from_str(&self.option_adjustments)?;
        Ok(LineItem {
            product_id: self.product_id,
            name: self.name,
            unit_price: Money::from_cents(self.unit_price),
            quantity: self.quantity,
            option_adjustments,
            notes: self.notes,
        })
    }
}

impl OrderRow {
    /// Reassembles the order; the stored total is re-verified by the core.
    fn into_order(self, line_items: Vec<LineItem>) -> DbResult<Order> {
        let record = OrderRecord {
            id: self.id,
            order_number: self.order_number,
            shift_id: self.shift_id,
            order_type: self.order_type,
            table_number: self.table_number,
            payment_method: self.payment_method,
            line_items,
            total_amount: Money::from_cents(self.total_amount),
            status: self.status,
            cash_received: self.cash_received.map(Money::from_cents),
            change: self.change_amount.map(Money::from_cents),
            created_at: self.created_at,
            completed_at: self.completed_at,
            cancelled_at: self.cancelled_at,
        };
        Ok(Order::try_from(record)?)
    }
}

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Stores a completed order and its shift's new totals atomically.
    ///
    /// `shift` carries the aggregates *after* this order was counted.
    ///
    /// ## Errors
    /// - `UniqueViolation` for a reused order id or order number
    /// - `Conflict` if the shift is no longer active
    pub async fn insert_completed(&self, order: &Order, shift: &Shift) -> DbResult<()> {
        debug!(
            id = %order.id,
            order_number = %order.order_number,
            shift_id = %shift.id,
            "Inserting completed order"
        );

        let mut tx = self.pool.begin().await?;

        insert_order(&mut tx, order).await?;

        let result = sqlx::query(
            r#"
            UPDATE shifts SET
                total_orders = ?2,
                total_sales = ?3
            WHERE id = ?1 AND status = 'active'
            "#,
        )
        .bind(&shift.id)
        .bind(shift.total_orders)
        .bind(shift.total_sales.cents())
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            // Dropping `tx` rolls back the order rows
            return Err(DbError::Conflict(format!(
                "shift {} is not active",
                shift.id
            )));
        }

        tx.commit().await?;
        Ok(())
    }

    /// Gets an order with its line items, if it belongs to a shift of
    /// `register_id`.
    ///
    /// ## Errors
    /// - `Corrupt` if the stored total no longer matches the line items
    pub async fn get_by_id(&self, register_id: &str, id: &str) -> DbResult<Option<Order>> {
        let row: Option<OrderRow> = sqlx::query_as(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders \
             WHERE id = ?2 AND shift_id IN (SELECT id FROM shifts WHERE register_id = ?1)"
        ))
        .bind(register_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                let items = self.get_items(&row.id).await?;
                Ok(Some(row.into_order(items)?))
            }
            None => Ok(None),
        }
    }

    /// Lists a register's orders newest first, optionally only those of one
    /// shift.
    pub async fn list(&self, register_id: &str, shift_id: Option<&str>) -> DbResult<Vec<Order>> {
        let rows: Vec<OrderRow> = sqlx::query_as(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders \
             WHERE shift_id IN (SELECT id FROM shifts WHERE register_id = ?1) \
               AND (?2 IS NULL OR shift_id = ?2) \
             ORDER BY created_at DESC, order_number DESC"
        ))
        .bind(register_id)
        .bind(shift_id)
        .fetch_all(&self.pool)
        .await?;

        let mut orders = Vec::with_capacity(rows.len());
        for row in rows {
            let items = self.get_items(&row.id).await?;
            orders.push(row.into_order(items)?);
        }
        Ok(orders)
    }

    /// IDs of completed orders already counted in a shift's totals.
    pub async fn completed_ids_for_shift(&self, shift_id: &str) -> DbResult<Vec<String>> {
        let ids: Vec<String> = sqlx::query_scalar(
            "SELECT id FROM orders WHERE shift_id = ?1 AND status = 'completed'",
        )
        .bind(shift_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }

    /// Next daily sequence number for order numbers starting with `prefix`.
    ///
    /// Counts across every register: `order_number` is unique per database.
    ///
    /// ## Example
    /// With `ORD2403090001` and `ORD2403090002` stored, prefix `ORD240309`
    /// yields `3`.
    pub async fn next_sequence(&self, prefix: &str) -> DbResult<u32> {
        let last: Option<String> = sqlx::query_scalar(
            r#"
            SELECT order_number FROM orders
            WHERE order_number LIKE ?1 || '%'
            ORDER BY length(order_number) DESC, order_number DESC
            LIMIT 1
            "#,
        )
        .bind(prefix)
        .fetch_optional(&self.pool)
        .await?;

        let last_seq = last
            .as_deref()
            .and_then(|n| n.strip_prefix(prefix))
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(0);

        Ok(last_seq + 1)
    }

    async fn get_items(&self, order_id: &str) -> DbResult<Vec<LineItem>> {
        let rows: Vec<OrderItemRow> = sqlx::query_as(
            r#"
            SELECT product_id, name, unit_price, quantity, option_adjustments, notes
            FROM order_items
            WHERE order_id = ?1
            ORDER BY position
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(OrderItemRow::into_line_item).collect()
    }
}

async fn insert_order(tx: &mut Transaction<'_, Sqlite>, order: &Order) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO orders (
            id, order_number, shift_id, order_type, table_number, payment_method,
            total_amount, status, cash_received, change_amount,
            created_at, completed_at, cancelled_at
        ) VALUES (
            ?1, ?2, ?3, ?4, ?5, ?6,
            ?7, ?8, ?9, ?10,
            ?11, ?12, ?13
        )
        "#,
    )
    .bind(&order.id)
    .bind(&order.order_number)
    .bind(&order.shift_id)
    .bind(order.order_type)
    .bind(&order.table_number)
    .bind(order.payment_method)
    .bind(order.total_amount().cents())
    .bind(order.status())
    .bind(order.cash_received().map(|m| m.cents()))
    .bind(order.change().map(|m| m.cents()))
    .bind(order.created_at)
    .bind(order.completed_at())
    .bind(order.cancelled_at())
    .execute(&mut **tx)
    .await?;

    for (position, item) in order.line_items().iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO order_items (
                order_id, position, product_id, name,
                unit_price, quantity, option_adjustments, notes
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&order.id)
        .bind(position as i64)
        .bind(&item.product_id)
        .bind(&item.name)
        .bind(item.unit_price.cents())
        .bind(item.quantity)
        .bind(serde_json::to_string(&item.option_adjustments)?)
        .bind(&item.notes)
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
