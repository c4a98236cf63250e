//! # Ingredient Repository
//!
//! Raw materials and their stock levels.
//!
//! ## Stock Intake
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Delivery arrives: +5 kg rice                                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  adjust_stock(id, +5000 milli)                                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  UPDATE ... SET current_stock_milli = current_stock_milli + delta      │
//! │         WHERE id = ? AND current_stock_milli + delta >= 0              │
//! │                                                                         │
//! │  Relative update: two concurrent intakes both land.                    │
//! │  Checkout never calls this; sales do not consume stock.                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use resto_core::{Ingredient, Quantity};

const SELECT_INGREDIENT: &str = r#"
    SELECT
        id,
        restaurant_id,
        name,
        sku,
        uom,
        current_stock_milli,
        minimum_stock_alert_milli,
        cost_per_unit_minor,
        created_at,
        updated_at
    FROM ingredients
"#;

#[derive(Debug, Clone)]
pub struct IngredientRepository {
    pool: SqlitePool,
}

impl IngredientRepository {
    pub fn new(pool: SqlitePool) -> Self {
        IngredientRepository { pool }
    }

    /// Lists ingredients, newest first.
    pub async fn list(&self, restaurant_id: &str) -> DbResult<Vec<Ingredient>> {
        let sql = format!(
            "{} WHERE restaurant_id = ?1 ORDER BY created_at DESC, name",
            SELECT_INGREDIENT
        );
        let ingredients = sqlx::query_as::<_, Ingredient>(&sql)
            .bind(restaurant_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(ingredients)
    }

    /// Ingredients whose stock is below their alert threshold.
    pub async fn list_low_stock(&self, restaurant_id: &str) -> DbResult<Vec<Ingredient>> {
        let sql = format!(
            "{} WHERE restaurant_id = ?1 AND current_stock_milli < minimum_stock_alert_milli ORDER BY name",
            SELECT_INGREDIENT
        );
        let ingredients = sqlx::query_as::<_, Ingredient>(&sql)
            .bind(restaurant_id)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = ingredients.len(), "Low-stock ingredients");
        Ok(ingredients)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Ingredient>> {
        let sql = format!("{} WHERE id = ?1", SELECT_INGREDIENT);
        let ingredient = sqlx::query_as::<_, Ingredient>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(ingredient)
    }

    pub async fn insert(&self, ingredient: &Ingredient) -> DbResult<()> {
        debug!(name = %ingredient.name, "Inserting ingredient");

        sqlx::query(
            r#"
            INSERT INTO ingredients (
                id, restaurant_id, name, sku, uom,
                current_stock_milli, minimum_stock_alert_milli, cost_per_unit_minor,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&ingredient.id)
        .bind(&ingredient.restaurant_id)
        .bind(&ingredient.name)
        .bind(&ingredient.sku)
        .bind(&ingredient.uom)
        .bind(ingredient.current_stock_milli)
        .bind(ingredient.minimum_stock_alert_milli)
        .bind(ingredient.cost_per_unit_minor)
        .bind(ingredient.created_at)
        .bind(ingredient.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Updates the editable fields, stock level included.
    pub async fn update(&self, ingredient: &Ingredient) -> DbResult<()> {
        debug!(id = %ingredient.id, "Updating ingredient");

        let result = sqlx::query(
            r#"
            UPDATE ingredients SET
                name = ?2,
                sku = ?3,
                uom = ?4,
                current_stock_milli = ?5,
                minimum_stock_alert_milli = ?6,
                cost_per_unit_minor = ?7,
                updated_at = ?8
            WHERE id = ?1
            "#,
        )
        .bind(&ingredient.id)
        .bind(&ingredient.name)
        .bind(&ingredient.sku)
        .bind(&ingredient.uom)
        .bind(ingredient.current_stock_milli)
        .bind(ingredient.minimum_stock_alert_milli)
        .bind(ingredient.cost_per_unit_minor)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Ingredient", &ingredient.id));
        }

        Ok(())
    }

    /// Applies a relative stock change and returns the updated row.
    ///
    /// ## Errors
    /// - `NotFound` for an unknown id
    /// - `Conflict` if the stock would go below zero
    pub async fn adjust_stock(&self, id: &str, delta: Quantity) -> DbResult<Ingredient> {
        debug!(id = %id, delta = %delta, "Adjusting stock");

        let result = sqlx::query(
            r#"
            UPDATE ingredients SET
                current_stock_milli = current_stock_milli + ?2,
                updated_at = ?3
            WHERE id = ?1 AND current_stock_milli + ?2 >= 0
            "#,
        )
        .bind(id)
        .bind(delta.milli())
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        let ingredient = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Ingredient", id))?;

        if result.rows_affected() == 0 {
            return Err(DbError::conflict(format!(
                "Stock for {} cannot go below zero",
                ingredient.name
            )));
        }

        Ok(ingredient)
    }

    /// Deletes an ingredient. Fails while a recipe still uses it.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting ingredient");

        let result = sqlx::query("DELETE FROM ingredients WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Ingredient", id));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::generate_id;
    use crate::{Database, DbConfig};
    use resto_core::DEFAULT_RESTAURANT_ID;

    fn ingredient(name: &str, stock_milli: i64, alert_milli: i64) -> Ingredient {
        let now = Utc::now();
        Ingredient {
            id: generate_id(),
            restaurant_id: DEFAULT_RESTAURANT_ID.to_string(),
            name: name.to_string(),
            sku: None,
            uom: "kg".to_string(),
            current_stock_milli: stock_milli,
            minimum_stock_alert_milli: alert_milli,
            cost_per_unit_minor: Some(12_000),
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.ingredients();

        let rice = ingredient("Rice", 10_000, 2_000);
        repo.insert(&rice).await.unwrap();

        let loaded = repo.get_by_id(&rice.id).await.unwrap().unwrap();
        assert_eq!(loaded.name, "Rice");
        assert_eq!(loaded.current_stock(), Quantity::from_units(10));
        assert_eq!(loaded.cost_per_unit_minor, Some(12_000));
    }

    #[tokio::test]
    async fn test_adjust_stock() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.ingredients();

        let rice = ingredient("Rice", 1_000, 0);
        repo.insert(&rice).await.unwrap();

        let updated = repo
            .adjust_stock(&rice.id, Quantity::from_milli(500))
            .await
            .unwrap();
        assert_eq!(updated.current_stock_milli, 1_500);

        let err = repo
            .adjust_stock(&rice.id, Quantity::from_units(-2))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Conflict(_)));

        let err = repo
            .adjust_stock("missing", Quantity::from_units(1))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_low_stock_listing() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.ingredients();

        repo.insert(&ingredient("Egg", 4_000, 10_000)).await.unwrap();
        repo.insert(&ingredient("Rice", 50_000, 10_000)).await.unwrap();

        let low = repo.list_low_stock(DEFAULT_RESTAURANT_ID).await.unwrap();
        assert_eq!(low.len(), 1);
        assert_eq!(low[0].name, "Egg");
        assert_eq!(repo.list(DEFAULT_RESTAURANT_ID).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.ingredients();

        let mut oil = ingredient("Oil", 2_000, 500);
        repo.insert(&oil).await.unwrap();

        oil.uom = "liter".to_string();
        oil.sku = Some("OIL-1L".to_string());
        repo.update(&oil).await.unwrap();

        let loaded = repo.get_by_id(&oil.id).await.unwrap().unwrap();
        assert_eq!(loaded.uom, "liter");

        repo.delete(&oil.id).await.unwrap();
        assert!(repo.get_by_id(&oil.id).await.unwrap().is_none());
    }
}
