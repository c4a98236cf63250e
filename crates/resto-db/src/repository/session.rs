//! # Session Repository
//!
//! Shift sessions: open, lookup, close, audit.
//!
//! ## One Open Shift
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CREATE UNIQUE INDEX ... ON pos_sessions(restaurant_id)                │
//! │      WHERE status = 'open'                                              │
//! │                                                                         │
//! │  Cashier A: insert_open ──► OK                                          │
//! │  Cashier B: insert_open ──► UNIQUE violation ──► DbError::Conflict     │
//! │                                                                         │
//! │  Closing uses `WHERE status = 'open'`, so a double close also fails    │
//! │  instead of overwriting the frozen figures.                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult};
use resto_core::PosSession;

const SELECT_SESSION: &str = r#"
    SELECT
        p.id,
        p.restaurant_id,
        p.cashier_id,
        s.full_name AS cashier_name,
        p.status,
        p.start_time,
        p.end_time,
        p.starting_cash_minor,
        p.ending_cash_minor,
        p.total_cash_sales_minor,
        p.total_non_cash_sales_minor,
        p.variance_minor,
        p.note
    FROM pos_sessions p
    LEFT JOIN staff_profiles s ON s.id = p.cashier_id
"#;

#[derive(Debug, Clone)]
pub struct SessionRepository {
    pool: SqlitePool,
}

impl SessionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SessionRepository { pool }
    }

    /// The restaurant's open shift, if any.
    pub async fn current_open(&self, restaurant_id: &str) -> DbResult<Option<PosSession>> {
        let sql = format!(
            "{} WHERE p.restaurant_id = ?1 AND p.status = 'open'",
            SELECT_SESSION
        );
        let session = sqlx::query_as::<_, PosSession>(&sql)
            .bind(restaurant_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(session)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<PosSession>> {
        let sql = format!("{} WHERE p.id = ?1", SELECT_SESSION);
        let session = sqlx::query_as::<_, PosSession>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(session)
    }

    /// Persists a freshly opened shift.
    ///
    /// ## Errors
    /// `Conflict` if the restaurant already has an open shift.
    pub async fn insert_open(&self, session: &PosSession) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO pos_sessions (
                id, restaurant_id, cashier_id, status, start_time, starting_cash_minor
            ) VALUES (?1, ?2, ?3, 'open', ?4, ?5)
            "#,
        )
        .bind(&session.id)
        .bind(&session.restaurant_id)
        .bind(&session.cashier_id)
        .bind(session.start_time)
        .bind(session.starting_cash_minor)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => {
                info!(
                    session_id = %session.id,
                    cashier_id = %session.cashier_id,
                    starting_cash = session.starting_cash_minor,
                    "Shift opened"
                );
                Ok(())
            }
            Err(e) => match DbError::from(e) {
                DbError::UniqueViolation { .. } => {
                    warn!(restaurant_id = %session.restaurant_id, "Rejected second open shift");
                    Err(DbError::conflict("A shift is already open"))
                }
                other => Err(other),
            },
        }
    }

    /// Writes the frozen end-of-shift figures of a closed session.
    ///
    /// ## Errors
    /// - `NotFound` for an unknown id
    /// - `Conflict` if the stored shift is no longer open
    pub async fn close(&self, closed: &PosSession) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE pos_sessions SET
                status = 'closed',
                end_time = ?2,
                ending_cash_minor = ?3,
                total_cash_sales_minor = ?4,
                total_non_cash_sales_minor = ?5,
                variance_minor = ?6,
                note = ?7
            WHERE id = ?1 AND status = 'open'
            "#,
        )
        .bind(&closed.id)
        .bind(closed.end_time)
        .bind(closed.ending_cash_minor)
        .bind(closed.total_cash_sales_minor)
        .bind(closed.total_non_cash_sales_minor)
        .bind(closed.variance_minor)
        .bind(&closed.note)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return match self.get_by_id(&closed.id).await? {
                Some(_) => Err(DbError::conflict(format!(
                    "Shift {} is already closed",
                    closed.id
                ))),
                None => Err(DbError::not_found("Shift", &closed.id)),
            };
        }

        info!(
            session_id = %closed.id,
            variance = ?closed.variance_minor,
            "Shift closed"
        );
        Ok(())
    }

    /// Shifts started in `[from, to)`, newest first.
    pub async fn list_started_in_range(
        &self,
        restaurant_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> DbResult<Vec<PosSession>> {
        debug!(from = %from, to = %to, "Loading shifts in range");

        let sql = format!(
            r#"{}
            WHERE p.restaurant_id = ?1 AND p.start_time >= ?2 AND p.start_time < ?3
            ORDER BY p.start_time DESC"#,
            SELECT_SESSION
        );
        let sessions = sqlx::query_as::<_, PosSession>(&sql)
            .bind(restaurant_id)
            .bind(from)
            .bind(to)
            .fetch_all(&self.pool)
            .await?;

        Ok(sessions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use chrono::Duration;
    use resto_core::{shift, Money, SessionStatus, DEFAULT_RESTAURANT_ID};

    fn open(starting: i64) -> PosSession {
        shift::open(
            DEFAULT_RESTAURANT_ID,
            "cashier-1",
            Money::from_minor(starting),
            Utc::now(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_open_and_current() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.sessions();

        assert!(repo.current_open(DEFAULT_RESTAURANT_ID).await.unwrap().is_none());

        let session = open(100_000);
        repo.insert_open(&session).await.unwrap();

        let current = repo.current_open(DEFAULT_RESTAURANT_ID).await.unwrap().unwrap();
        assert_eq!(current.id, session.id);
        assert_eq!(current.status, SessionStatus::Open);
        assert_eq!(current.starting_cash_minor, 100_000);
        assert!(current.end_time.is_none());
    }

    #[tokio::test]
    async fn test_second_open_shift_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.sessions();

        repo.insert_open(&open(0)).await.unwrap();
        let err = repo.insert_open(&open(0)).await.unwrap_err();
        assert!(matches!(err, DbError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_close_freezes_figures_once() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.sessions();

        let session = open(100_000);
        repo.insert_open(&session).await.unwrap();

        let closure = shift::close(&session, &[], Money::from_minor(95_000), Some("short"), Utc::now())
            .unwrap();
        repo.close(&closure.session).await.unwrap();

        let stored = repo.get_by_id(&session.id).await.unwrap().unwrap();
        assert_eq!(stored.status, SessionStatus::Closed);
        assert_eq!(stored.ending_cash_minor, Some(95_000));
        assert_eq!(stored.variance_minor, Some(-5_000));
        assert_eq!(stored.note.as_deref(), Some("short"));
        assert!(repo.current_open(DEFAULT_RESTAURANT_ID).await.unwrap().is_none());

        let err = repo.close(&closure.session).await.unwrap_err();
        assert!(matches!(err, DbError::Conflict(_)));

        // A new shift may open once the previous one is closed.
        repo.insert_open(&open(50_000)).await.unwrap();
    }

    #[tokio::test]
    async fn test_list_started_in_range() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.sessions();

        let session = open(0);
        repo.insert_open(&session).await.unwrap();

        let now = Utc::now();
        let found = repo
            .list_started_in_range(DEFAULT_RESTAURANT_ID, now - Duration::hours(1), now + Duration::hours(1))
            .await
            .unwrap();
        assert_eq!(found.len(), 1);

        let none = repo
            .list_started_in_range(DEFAULT_RESTAURANT_ID, now - Duration::days(2), now - Duration::days(1))
            .await
            .unwrap();
        assert!(none.is_empty());
    }
}
