//! # Menu Repository
//!
//! Menu items and their recipe lines (bill of materials).
//!
//! ## Loading Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  menu_items ──LEFT JOIN── categories        → MenuItem (category_name) │
//! │                                                                         │
//! │  menu_recipes ──JOIN── ingredients          → RecipeLine               │
//! │     ORDER BY rowid                            (ingredient name, uom,   │
//! │                                                current stock snapshot) │
//! │                                                                         │
//! │  Lines are grouped onto their items in insertion order, which is the   │
//! │  order the availability evaluator walks them.                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::generate_id;
use resto_core::{MenuItem, Quantity, RecipeLine};

const SELECT_MENU_ITEM: &str = r#"
    SELECT
        m.id,
        m.restaurant_id,
        m.category_id,
        c.name AS category_name,
        m.name,
        m.price_minor,
        m.is_active,
        m.image_url,
        m.cooking_instructions,
        m.recipe_notes,
        m.created_at,
        m.updated_at
    FROM menu_items m
    LEFT JOIN categories c ON c.id = m.category_id
"#;

const SELECT_RECIPE_LINE: &str = r#"
    SELECT
        r.id,
        r.menu_item_id,
        r.ingredient_id,
        r.quantity_needed_milli,
        i.name AS ingredient_name,
        i.uom AS ingredient_uom,
        i.current_stock_milli AS ingredient_stock_milli,
        r.created_at
    FROM menu_recipes r
    JOIN ingredients i ON i.id = r.ingredient_id
"#;

#[derive(Debug, Clone)]
pub struct MenuRepository {
    pool: SqlitePool,
}

impl MenuRepository {
    pub fn new(pool: SqlitePool) -> Self {
        MenuRepository { pool }
    }

    // =========================================================================
    // Menu Items
    // =========================================================================

    /// Lists every menu item with category name and recipe, by name.
    pub async fn list(&self, restaurant_id: &str) -> DbResult<Vec<MenuItem>> {
        let sql = format!("{} WHERE m.restaurant_id = ?1 ORDER BY m.name", SELECT_MENU_ITEM);
        let items = sqlx::query_as::<_, MenuItem>(&sql)
            .bind(restaurant_id)
            .fetch_all(&self.pool)
            .await?;

        self.attach_recipes(restaurant_id, items).await
    }

    /// Active items for the cashier screen.
    ///
    /// `query` is a case-insensitive name substring (empty matches all);
    /// `category_id` narrows to one category.
    pub async fn list_for_pos(
        &self,
        restaurant_id: &str,
        query: &str,
        category_id: Option<&str>,
    ) -> DbResult<Vec<MenuItem>> {
        debug!(query = %query, category = ?category_id, "Listing POS menu");

        let sql = format!(
            r#"{}
            WHERE m.restaurant_id = ?1
              AND m.is_active = 1
              AND m.name LIKE '%' || ?2 || '%'
              AND (?3 IS NULL OR m.category_id = ?3)
            ORDER BY m.name"#,
            SELECT_MENU_ITEM
        );
        let items = sqlx::query_as::<_, MenuItem>(&sql)
            .bind(restaurant_id)
            .bind(query.trim())
            .bind(category_id)
            .fetch_all(&self.pool)
            .await?;

        self.attach_recipes(restaurant_id, items).await
    }

    /// Loads one item with its recipe.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<MenuItem>> {
        let sql = format!("{} WHERE m.id = ?1", SELECT_MENU_ITEM);
        let item = sqlx::query_as::<_, MenuItem>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match item {
            Some(mut item) => {
                item.recipe = self.recipe_lines(&item.id).await?;
                Ok(Some(item))
            }
            None => Ok(None),
        }
    }

    /// Inserts the item row. Recipe lines are added separately.
    pub async fn insert(&self, item: &MenuItem) -> DbResult<()> {
        debug!(name = %item.name, price = item.price_minor, "Inserting menu item");

        sqlx::query(
            r#"
            INSERT INTO menu_items (
                id, restaurant_id, category_id, name, price_minor, is_active,
                image_url, cooking_instructions, recipe_notes, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&item.id)
        .bind(&item.restaurant_id)
        .bind(&item.category_id)
        .bind(&item.name)
        .bind(item.price_minor)
        .bind(item.is_active)
        .bind(&item.image_url)
        .bind(&item.cooking_instructions)
        .bind(&item.recipe_notes)
        .bind(item.created_at)
        .bind(item.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn update(&self, item: &MenuItem) -> DbResult<()> {
        debug!(id = %item.id, "Updating menu item");

        let result = sqlx::query(
            r#"
            UPDATE menu_items SET
                category_id = ?2,
                name = ?3,
                price_minor = ?4,
                is_active = ?5,
                image_url = ?6,
                cooking_instructions = ?7,
                recipe_notes = ?8,
                updated_at = ?9
            WHERE id = ?1
            "#,
        )
        .bind(&item.id)
        .bind(&item.category_id)
        .bind(&item.name)
        .bind(item.price_minor)
        .bind(item.is_active)
        .bind(&item.image_url)
        .bind(&item.cooking_instructions)
        .bind(&item.recipe_notes)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Menu item", &item.id));
        }

        Ok(())
    }

    /// Flips the active flag and returns the new value.
    pub async fn toggle_active(&self, id: &str) -> DbResult<bool> {
        let is_active: Option<bool> = sqlx::query_scalar(
            r#"
            UPDATE menu_items
            SET is_active = NOT is_active, updated_at = ?2
            WHERE id = ?1
            RETURNING is_active
            "#,
        )
        .bind(id)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        let is_active = is_active.ok_or_else(|| DbError::not_found("Menu item", id))?;
        debug!(id = %id, is_active, "Toggled menu item");
        Ok(is_active)
    }

    /// Deletes an item and its recipe lines. Sales history keeps its
    /// name snapshots.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting menu item");

        let result = sqlx::query("DELETE FROM menu_items WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Menu item", id));
        }

        Ok(())
    }

    // =========================================================================
    // Recipe Lines
    // =========================================================================

    /// Recipe lines of one item in stored order.
    pub async fn recipe_lines(&self, menu_item_id: &str) -> DbResult<Vec<RecipeLine>> {
        let sql = format!("{} WHERE r.menu_item_id = ?1 ORDER BY r.rowid", SELECT_RECIPE_LINE);
        let lines = sqlx::query_as::<_, RecipeLine>(&sql)
            .bind(menu_item_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(lines)
    }

    /// Appends a recipe line and returns it joined with its ingredient.
    pub async fn add_recipe_line(
        &self,
        menu_item_id: &str,
        ingredient_id: &str,
        quantity_needed: Quantity,
    ) -> DbResult<RecipeLine> {
        debug!(
            menu_item_id = %menu_item_id,
            ingredient_id = %ingredient_id,
            quantity = %quantity_needed,
            "Adding recipe line"
        );

        let id = generate_id();
        sqlx::query(
            r#"
            INSERT INTO menu_recipes (id, menu_item_id, ingredient_id, quantity_needed_milli, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&id)
        .bind(menu_item_id)
        .bind(ingredient_id)
        .bind(quantity_needed.milli())
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        let sql = format!("{} WHERE r.id = ?1", SELECT_RECIPE_LINE);
        let line = sqlx::query_as::<_, RecipeLine>(&sql)
            .bind(&id)
            .fetch_one(&self.pool)
            .await?;

        Ok(line)
    }

    pub async fn remove_recipe_line(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM menu_recipes WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Recipe line", id));
        }

        Ok(())
    }

    /// Loads all recipe lines of the restaurant once and distributes them.
    async fn attach_recipes(
        &self,
        restaurant_id: &str,
        mut items: Vec<MenuItem>,
    ) -> DbResult<Vec<MenuItem>> {
        if items.is_empty() {
            return Ok(items);
        }

        let sql = format!(
            r#"{}
            JOIN menu_items m ON m.id = r.menu_item_id
            WHERE m.restaurant_id = ?1
            ORDER BY r.rowid"#,
            SELECT_RECIPE_LINE
        );
        let lines = sqlx::query_as::<_, RecipeLine>(&sql)
            .bind(restaurant_id)
            .fetch_all(&self.pool)
            .await?;

        let mut by_item: HashMap<String, Vec<RecipeLine>> = HashMap::new();
        for line in lines {
            by_item.entry(line.menu_item_id.clone()).or_default().push(line);
        }

        for item in &mut items {
            item.recipe = by_item.remove(&item.id).unwrap_or_default();
        }

        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use resto_core::{availability, Category, Ingredient, DEFAULT_RESTAURANT_ID};

    fn menu_item(name: &str, category_id: Option<&str>) -> MenuItem {
        let now = Utc::now();
        MenuItem {
            id: generate_id(),
            restaurant_id: DEFAULT_RESTAURANT_ID.to_string(),
            category_id: category_id.map(str::to_string),
            category_name: None,
            name: name.to_string(),
            price_minor: 25_000,
            is_active: true,
            image_url: None,
            cooking_instructions: Some("Stir-fry 5 minutes".to_string()),
            recipe_notes: None,
            created_at: now,
            updated_at: now,
            recipe: Vec::new(),
        }
    }

    async fn ingredient(db: &Database, name: &str, uom: &str, stock_milli: i64) -> Ingredient {
        let now = Utc::now();
        let ingredient = Ingredient {
            id: generate_id(),
            restaurant_id: DEFAULT_RESTAURANT_ID.to_string(),
            name: name.to_string(),
            sku: None,
            uom: uom.to_string(),
            current_stock_milli: stock_milli,
            minimum_stock_alert_milli: 0,
            cost_per_unit_minor: None,
            created_at: now,
            updated_at: now,
        };
        db.ingredients().insert(&ingredient).await.unwrap();
        ingredient
    }

    #[tokio::test]
    async fn test_recipe_lines_keep_insertion_order() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.menu();

        let egg = ingredient(&db, "egg", "pcs", 5_000).await;
        let rice = ingredient(&db, "rice", "kg", 0).await;

        let fried_rice = menu_item("Fried Rice", None);
        repo.insert(&fried_rice).await.unwrap();
        repo.add_recipe_line(&fried_rice.id, &egg.id, Quantity::from_units(2))
            .await
            .unwrap();
        let line = repo
            .add_recipe_line(&fried_rice.id, &rice.id, Quantity::from_units(1))
            .await
            .unwrap();
        assert_eq!(line.ingredient_name, "rice");
        assert_eq!(line.ingredient_uom, "kg");

        let loaded = repo.get_by_id(&fried_rice.id).await.unwrap().unwrap();
        let names: Vec<&str> = loaded.recipe.iter().map(|l| l.ingredient_name.as_str()).collect();
        assert_eq!(names, vec!["egg", "rice"]);

        let result = availability::evaluate(&loaded).unwrap();
        assert!(!result.available);
        assert_eq!(result.reason, "Insufficient: rice (0 kg left)");
    }

    #[tokio::test]
    async fn test_list_with_category_and_recipes() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.menu();

        let food = Category {
            id: generate_id(),
            restaurant_id: DEFAULT_RESTAURANT_ID.to_string(),
            name: "Food".to_string(),
            created_at: Utc::now(),
        };
        db.categories().insert(&food).await.unwrap();

        let noodles = menu_item("Noodles", Some(&food.id));
        let water = menu_item("Water", None);
        repo.insert(&noodles).await.unwrap();
        repo.insert(&water).await.unwrap();

        let flour = ingredient(&db, "flour", "kg", 3_000).await;
        repo.add_recipe_line(&noodles.id, &flour.id, Quantity::from_milli(200))
            .await
            .unwrap();

        let items = repo.list(DEFAULT_RESTAURANT_ID).await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].name, "Noodles");
        assert_eq!(items[0].category_name.as_deref(), Some("Food"));
        assert_eq!(items[0].recipe.len(), 1);
        assert!(items[1].recipe.is_empty());
    }

    #[tokio::test]
    async fn test_pos_listing_filters() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.menu();

        let drinks = Category {
            id: generate_id(),
            restaurant_id: DEFAULT_RESTAURANT_ID.to_string(),
            name: "Drinks".to_string(),
            created_at: Utc::now(),
        };
        db.categories().insert(&drinks).await.unwrap();

        let tea = menu_item("Iced Tea", Some(&drinks.id));
        let coffee = menu_item("Coffee", Some(&drinks.id));
        let rice = menu_item("Fried Rice", None);
        for item in [&tea, &coffee, &rice] {
            repo.insert(item).await.unwrap();
        }

        assert!(!repo.toggle_active(&coffee.id).await.unwrap());

        let all = repo.list_for_pos(DEFAULT_RESTAURANT_ID, "", None).await.unwrap();
        assert_eq!(all.len(), 2);

        let teas = repo.list_for_pos(DEFAULT_RESTAURANT_ID, "TEA", None).await.unwrap();
        assert_eq!(teas.len(), 1);
        assert_eq!(teas[0].name, "Iced Tea");

        let in_drinks = repo
            .list_for_pos(DEFAULT_RESTAURANT_ID, "", Some(&drinks.id))
            .await
            .unwrap();
        assert_eq!(in_drinks.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_cascades_recipe_and_protects_ingredient() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.menu();

        let egg = ingredient(&db, "egg", "pcs", 5_000).await;
        let omelette = menu_item("Omelette", None);
        repo.insert(&omelette).await.unwrap();
        let line = repo
            .add_recipe_line(&omelette.id, &egg.id, Quantity::from_units(3))
            .await
            .unwrap();

        let err = db.ingredients().delete(&egg.id).await.unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));

        repo.delete(&omelette.id).await.unwrap();
        assert!(matches!(
            repo.remove_recipe_line(&line.id).await,
            Err(DbError::NotFound { .. })
        ));
        db.ingredients().delete(&egg.id).await.unwrap();
    }
}
