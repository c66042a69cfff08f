//! # Shift Repository
//!
//! Database operations for shifts.
//!
//! ## Shift Lifecycle in Storage
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  1. OPEN                                                               │
//! │     └── insert() → row { status: 'active' }                            │
//! │         (partial unique index: one active row per register)            │
//! │                                                                         │
//! │  2. ORDERS                                                             │
//! │     └── OrderRepository::insert_completed() updates totals             │
//! │         in the same transaction as the order                           │
//! │                                                                         │
//! │  3. CLOSE                                                              │
//! │     └── close() → row { status: 'closed' }                             │
//! │         guarded by WHERE status = 'active'                             │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use shiftbook_core::{Money, Shift, ShiftStatus};

const SHIFT_COLUMNS: &str = r#"
    id, start_time, end_time, opening_user_id, closing_user_id,
    start_cash_amount, end_cash_amount, status, total_orders, total_sales, notes
"#;

/// Row shape of the `shifts` table.
#[derive(Debug, sqlx::FromRow)]
struct ShiftRow {
    id: String,
    start_time: DateTime<Utc>,
    end_time: Option<DateTime<Utc>>,
    opening_user_id: String,
    closing_user_id: Option<String>,
    start_cash_amount: i64,
    end_cash_amount: Option<i64>,
    status: ShiftStatus,
    total_orders: i64,
    total_sales: i64,
    notes: Option<String>,
}

impl From<ShiftRow> for Shift {
    fn from(row: ShiftRow) -> Self {
        Shift {
            id: row.id,
            start_time: row.start_time,
            end_time: row.end_time,
            opening_user_id: row.opening_user_id,
            closing_user_id: row.closing_user_id,
            start_cash_amount: Money::from_cents(row.start_cash_amount),
            end_cash_amount: row.end_cash_amount.map(Money::from_cents),
            status: row.status,
            total_orders: row.total_orders,
            total_sales: Money::from_cents(row.total_sales),
            notes: row.notes,
        }
    }
}

/// Repository for shift database operations.
#[derive(Debug, Clone)]
pub struct ShiftRepository {
    pool: SqlitePool,
}

impl ShiftRepository {
    /// Creates a new ShiftRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ShiftRepository { pool }
    }

    /// Inserts a freshly opened shift for `register_id`.
    ///
    /// ## Errors
    /// - `UniqueViolation` if the register already has an active shift
    pub async fn insert(&self, shift: &Shift, register_id: &str) -> DbResult<()> {
        debug!(id = %shift.id, register_id = %register_id, "Inserting shift");

        sqlx::query(
            r#"
            INSERT INTO shifts (
                id, register_id, start_time, end_time,
                opening_user_id, closing_user_id,
                start_cash_amount, end_cash_amount, status,
                total_orders, total_sales, notes
            ) VALUES (
                ?1, ?2, ?3, ?4,
                ?5, ?6,
                ?7, ?8, ?9,
                ?10, ?11, ?12
            )
            "#,
        )
        .bind(&shift.id)
        .bind(register_id)
        .bind(shift.start_time)
        .bind(shift.end_time)
        .bind(&shift.opening_user_id)
        .bind(&shift.closing_user_id)
        .bind(shift.start_cash_amount.cents())
        .bind(shift.end_cash_amount.map(|m| m.cents()))
        .bind(shift.status)
        .bind(shift.total_orders)
        .bind(shift.total_sales.cents())
        .bind(&shift.notes)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Persists a closed shift: counted cash, closing stamp, frozen totals.
    ///
    /// ## Errors
    /// - `NotFound` if no shift with this ID was ever stored
    /// - `Conflict` if the row is not active any more
    pub async fn close(&self, shift: &Shift) -> DbResult<()> {
        debug!(id = %shift.id, "Closing shift");

        let result = sqlx::query(
            r#"
            UPDATE shifts SET
                status = ?2,
                end_time = ?3,
                closing_user_id = ?4,
                end_cash_amount = ?5,
                total_orders = ?6,
                total_sales = ?7,
                notes = ?8
            WHERE id = ?1 AND status = 'active'
            "#,
        )
        .bind(&shift.id)
        .bind(shift.status)
        .bind(shift.end_time)
        .bind(&shift.closing_user_id)
        .bind(shift.end_cash_amount.map(|m| m.cents()))
        .bind(shift.total_orders)
        .bind(shift.total_sales.cents())
        .bind(&shift.notes)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            let exists: bool =
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM shifts WHERE id = ?1)")
                    .bind(&shift.id)
                    .fetch_one(&self.pool)
                    .await?;

            return Err(if exists {
                DbError::Conflict(format!("shift {} is not active", shift.id))
            } else {
                DbError::NotFound {
                    entity: "Shift".to_string(),
                    id: shift.id.clone(),
                }
            });
        }

        Ok(())
    }

    /// Gets a shift by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Shift>> {
        let row: Option<ShiftRow> =
            sqlx::query_as(&format!("SELECT {SHIFT_COLUMNS} FROM shifts WHERE id = ?1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(Shift::from))
    }

    /// Gets a shift by ID if it was opened on `register_id`.
    pub async fn get_for_register(&self, register_id: &str, id: &str) -> DbResult<Option<Shift>> {
        let row: Option<ShiftRow> = sqlx::query_as(&format!(
            "SELECT {SHIFT_COLUMNS} FROM shifts WHERE register_id = ?1 AND id = ?2"
        ))
        .bind(register_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Shift::from))
    }

    /// Gets the active shift of a register, if any.
    pub async fn get_active(&self, register_id: &str) -> DbResult<Option<Shift>> {
        let row: Option<ShiftRow> = sqlx::query_as(&format!(
            "SELECT {SHIFT_COLUMNS} FROM shifts WHERE register_id = ?1 AND status = 'active'"
        ))
        .bind(register_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Shift::from))
    }

    /// Lists a register's shifts, newest first.
    pub async fn list(&self, register_id: &str) -> DbResult<Vec<Shift>> {
        let rows: Vec<ShiftRow> = sqlx::query_as(&format!(
            "SELECT {SHIFT_COLUMNS} FROM shifts WHERE register_id = ?1 \
             ORDER BY start_time DESC, rowid DESC"
        ))
        .bind(register_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Shift::from).collect())
    }

    /// IDs of every closed shift of a register, for the ledger's barrier.
    pub async fn closed_ids(&self, register_id: &str) -> DbResult<Vec<String>> {
        let ids: Vec<String> = sqlx::query_scalar(
            "SELECT id FROM shifts WHERE register_id = ?1 AND status = 'closed'",
        )
        .bind(register_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use chrono::{Duration, TimeZone};

    fn shift(id: &str, hour: u32) -> Shift {
        Shift {
            id: id.to_string(),
            start_time: Utc.with_ymd_and_hms(2024, 3, 9, hour, 0, 0).unwrap(),
            end_time: None,
            opening_user_id: "alice".to_string(),
            closing_user_id: None,
            start_cash_amount: Money::from_cents(1000),
            end_cash_amount: None,
            status: ShiftStatus::Active,
            total_orders: 0,
            total_sales: Money::zero(),
            notes: Some("float checked".to_string()),
        }
    }

    fn closed(mut s: Shift) -> Shift {
        s.status = ShiftStatus::Closed;
        s.end_time = Some(s.start_time + Duration::hours(8));
        s.closing_user_id = Some("bob".to_string());
        s.end_cash_amount = Some(Money::from_cents(1000));
        s
    }

    async fn repo() -> ShiftRepository {
        Database::new(DbConfig::in_memory()).await.unwrap().shifts()
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let repo = repo().await;
        let s = shift("s1", 8);
        repo.insert(&s, "till-1").await.unwrap();

        assert_eq!(repo.get_by_id("s1").await.unwrap(), Some(s.clone()));
        assert_eq!(repo.get_active("till-1").await.unwrap(), Some(s));
        assert_eq!(repo.get_active("till-2").await.unwrap(), None);
        assert_eq!(repo.get_by_id("missing").await.unwrap(), None);
        assert!(repo.get_for_register("till-1", "s1").await.unwrap().is_some());
        assert_eq!(repo.get_for_register("till-2", "s1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_one_active_shift_per_register() {
        let repo = repo().await;
        repo.insert(&shift("s1", 8), "till-1").await.unwrap();

        let err = repo.insert(&shift("s2", 9), "till-1").await.unwrap_err();
        assert!(matches!(
            &err,
            DbError::UniqueViolation { field } if field == "shifts.register_id"
        ));

        repo.insert(&shift("s3", 9), "till-2").await.unwrap();
    }

    #[tokio::test]
    async fn test_close_is_guarded() {
        let repo = repo().await;
        repo.insert(&shift("s1", 8), "till-1").await.unwrap();

        let c = closed(shift("s1", 8));
        repo.close(&c).await.unwrap();
        assert_eq!(repo.get_by_id("s1").await.unwrap(), Some(c.clone()));
        assert_eq!(repo.get_active("till-1").await.unwrap(), None);

        assert!(matches!(repo.close(&c).await, Err(DbError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_close_unknown_shift_is_not_found() {
        let repo = repo().await;

        let err = repo.close(&closed(shift("ghost", 8))).await.unwrap_err();
        assert!(matches!(
            &err,
            DbError::NotFound { entity, id } if entity == "Shift" && id == "ghost"
        ));
    }

    #[tokio::test]
    async fn test_list_newest_first_and_closed_ids() {
        let repo = repo().await;
        repo.insert(&shift("s1", 8), "till-1").await.unwrap();
        repo.close(&closed(shift("s1", 8))).await.unwrap();
        repo.insert(&shift("s2", 17), "till-1").await.unwrap();

        let ids: Vec<String> = repo
            .list("till-1")
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(ids, vec!["s2", "s1"]);
        assert_eq!(repo.closed_ids("till-1").await.unwrap(), vec!["s1"]);
    }
}
