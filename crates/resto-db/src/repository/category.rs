//! # Category Repository
//!
//! Menu categories ("Food", "Drinks", ...).

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use resto_core::Category;

#[derive(Debug, Clone)]
pub struct CategoryRepository {
    pool: SqlitePool,
}

impl CategoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CategoryRepository { pool }
    }

    /// Lists a restaurant's categories by name.
    pub async fn list(&self, restaurant_id: &str) -> DbResult<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(
            r#"
            SELECT id, restaurant_id, name, created_at
            FROM categories
            WHERE restaurant_id = ?1
            ORDER BY name
            "#,
        )
        .bind(restaurant_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Category>> {
        let category = sqlx::query_as::<_, Category>(
            "SELECT id, restaurant_id, name, created_at FROM categories WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(category)
    }

    /// Inserts a category. Names are unique per restaurant.
    pub async fn insert(&self, category: &Category) -> DbResult<()> {
        debug!(name = %category.name, "Inserting category");

        sqlx::query(
            r#"
            INSERT INTO categories (id, restaurant_id, name, created_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(&category.id)
        .bind(&category.restaurant_id)
        .bind(&category.name)
        .bind(category.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { .. } => DbError::duplicate("category", &category.name),
            other => other,
        })?;

        Ok(())
    }

    /// Deletes a category. Its menu items become uncategorized.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting category");

        let result = sqlx::query("DELETE FROM categories WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Category", id));
        }

        Ok(())
    }
}
