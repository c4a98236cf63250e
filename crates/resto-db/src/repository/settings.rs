//! # Settings Repository
//!
//! Restaurant settings (receipt identity, tax rate) and the configured
//! payment methods.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use resto_core::{PaymentMethod, RestaurantSettings};

/// Name given to a restaurant that has never saved its settings.
pub const DEFAULT_RESTAURANT_NAME: &str = "My Restaurant";

// =============================================================================
// Restaurant Settings
// =============================================================================

#[derive(Debug, Clone)]
pub struct SettingsRepository {
    pool: SqlitePool,
}

impl SettingsRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SettingsRepository { pool }
    }

    /// Returns the settings row, creating the default one on first access.
    pub async fn get(&self, restaurant_id: &str) -> DbResult<RestaurantSettings> {
        sqlx::query(
            r#"
            INSERT OR IGNORE INTO restaurant_settings (id, name, updated_at)
            VALUES (?1, ?2, ?3)
            "#,
        )
        .bind(restaurant_id)
        .bind(DEFAULT_RESTAURANT_NAME)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        let settings = sqlx::query_as::<_, RestaurantSettings>(
            r#"
            SELECT
                id, name, receipt_header, receipt_address, receipt_phone,
                receipt_footer, tax_rate_bps, updated_at
            FROM restaurant_settings
            WHERE id = ?1
            "#,
        )
        .bind(restaurant_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(settings)
    }

    /// Saves every field and returns the stored row.
    pub async fn update(&self, settings: &RestaurantSettings) -> DbResult<RestaurantSettings> {
        // Make sure the row exists before updating it.
        self.get(&settings.id).await?;

        sqlx::query(
            r#"
            UPDATE restaurant_settings SET
                name = ?2,
                receipt_header = ?3,
                receipt_address = ?4,
                receipt_phone = ?5,
                receipt_footer = ?6,
                tax_rate_bps = ?7,
                updated_at = ?8
            WHERE id = ?1
            "#,
        )
        .bind(&settings.id)
        .bind(&settings.name)
        .bind(&settings.receipt_header)
        .bind(&settings.receipt_address)
        .bind(&settings.receipt_phone)
        .bind(&settings.receipt_footer)
        .bind(settings.tax_rate_bps)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        info!(
            restaurant_id = %settings.id,
            tax_rate_bps = settings.tax_rate_bps,
            "Restaurant settings saved"
        );
        self.get(&settings.id).await
    }
}

// =============================================================================
// Payment Methods
// =============================================================================

const SELECT_PAYMENT_METHOD: &str = r#"
    SELECT id, restaurant_id, name, kind, is_active, created_at
    FROM payment_methods
"#;

#[derive(Debug, Clone)]
pub struct PaymentMethodRepository {
    pool: SqlitePool,
}

impl PaymentMethodRepository {
    pub fn new(pool: SqlitePool) -> Self {
        PaymentMethodRepository { pool }
    }

    /// All methods by name, inactive included.
    pub async fn list(&self, restaurant_id: &str) -> DbResult<Vec<PaymentMethod>> {
        let sql = format!("{} WHERE restaurant_id = ?1 ORDER BY name", SELECT_PAYMENT_METHOD);
        let methods = sqlx::query_as::<_, PaymentMethod>(&sql)
            .bind(restaurant_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(methods)
    }

    /// Methods the cashier may pick at checkout.
    pub async fn list_active(&self, restaurant_id: &str) -> DbResult<Vec<PaymentMethod>> {
        let sql = format!(
            "{} WHERE restaurant_id = ?1 AND is_active = 1 ORDER BY name",
            SELECT_PAYMENT_METHOD
        );
        let methods = sqlx::query_as::<_, PaymentMethod>(&sql)
            .bind(restaurant_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(methods)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<PaymentMethod>> {
        let sql = format!("{} WHERE id = ?1", SELECT_PAYMENT_METHOD);
        let method = sqlx::query_as::<_, PaymentMethod>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(method)
    }

    /// Inserts a method. Names are unique per restaurant.
    pub async fn insert(&self, method: &PaymentMethod) -> DbResult<()> {
        debug!(name = %method.name, kind = ?method.kind, "Inserting payment method");

        sqlx::query(
            r#"
            INSERT INTO payment_methods (id, restaurant_id, name, kind, is_active, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&method.id)
        .bind(&method.restaurant_id)
        .bind(&method.name)
        .bind(method.kind)
        .bind(method.is_active)
        .bind(method.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { .. } => DbError::duplicate("payment method", &method.name),
            other => other,
        })?;

        Ok(())
    }

    /// Flips the active flag and returns the new value.
    pub async fn toggle_active(&self, id: &str) -> DbResult<bool> {
        let is_active: Option<bool> = sqlx::query_scalar(
            "UPDATE payment_methods SET is_active = NOT is_active WHERE id = ?1 RETURNING is_active",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        is_active.ok_or_else(|| DbError::not_found("Payment method", id))
    }

    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM payment_methods WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Payment method", id));
        }

        Ok(())
    }
}
