//! # Seed Data Generator
//!
//! Populates a database with a small demo restaurant for development.
//!
//! ## Usage
//! ```bash
//! cargo run -p resto-db --bin seed
//!
//! # Specify database path
//! cargo run -p resto-db --bin seed -- --db ./data/resto.db
//! ```
//!
//! ## Generated Data
//! - Settings with a 10% tax rate
//! - Categories: Food, Drinks
//! - Ingredients with stock levels (one deliberately low)
//! - Menu items with recipes, including one that is out of stock
//! - Payment methods: Cash, QRIS, Cashless Card
//! - Staff: an owner (PIN 123456) and a cashier (PIN 1111)

use anyhow::Context;
use chrono::Utc;
use std::env;

use resto_core::{
    Category, Ingredient, MenuItem, PaymentKind, PaymentMethod, Quantity, Role, StaffProfile,
    DEFAULT_RESTAURANT_ID,
};
use resto_db::repository::generate_id;
use resto_db::{hash_pin, Database, DbConfig};

/// (name, uom, stock in milli-units, alert level in milli-units)
const INGREDIENTS: &[(&str, &str, i64, i64)] = &[
    ("Rice", "kg", 10_000, 2_000),
    ("Egg", "pcs", 30_000, 10_000),
    ("Chicken", "kg", 5_000, 1_000),
    ("Tea Leaves", "kg", 500, 1_000),
    ("Sugar", "kg", 3_000, 500),
    ("Beef", "kg", 0, 1_000),
];

/// (name, category, price, recipe as (ingredient, milli-units))
const MENU: &[(&str, &str, i64, &[(&str, i64)])] = &[
    ("Fried Rice", "Food", 25_000, &[("Egg", 1_000), ("Rice", 200)]),
    ("Chicken Rice", "Food", 30_000, &[("Chicken", 250), ("Rice", 200)]),
    ("Beef Rendang", "Food", 45_000, &[("Beef", 300), ("Rice", 200)]),
    ("Iced Tea", "Drinks", 8_000, &[("Tea Leaves", 10), ("Sugar", 20)]),
    ("Mineral Water", "Drinks", 5_000, &[]),
];

const PAYMENT_METHODS: &[(&str, PaymentKind)] = &[
    ("Cash", PaymentKind::Cash),
    ("QRIS", PaymentKind::NonCash),
    ("Cashless Card", PaymentKind::NonCash),
];

const STAFF: &[(&str, Role, &str)] = &[
    ("Owner", Role::Owner, "123456"),
    ("Sari", Role::Cashier, "1111"),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./resto_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Resto POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./resto_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Resto POS Seed Data Generator");
    println!("=============================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path))
        .await
        .with_context(|| format!("opening {}", db_path))?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.menu().list(DEFAULT_RESTAURANT_ID).await?.len();
    if existing > 0 {
        println!("⚠ Database already has {} menu items", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let now = Utc::now();
    let rid = DEFAULT_RESTAURANT_ID.to_string();

    // Settings
    let mut settings = db.settings().get(DEFAULT_RESTAURANT_ID).await?;
    settings.name = "Warung Demo".to_string();
    settings.receipt_header = "Warung Demo".to_string();
    settings.receipt_footer = "Thank you!".to_string();
    settings.tax_rate_bps = 1_000;
    db.settings().update(&settings).await?;
    println!("✓ Settings (tax 10%)");

    // Categories
    let mut categories = Vec::new();
    for name in ["Food", "Drinks"] {
        let category = Category {
            id: generate_id(),
            restaurant_id: rid.clone(),
            name: name.to_string(),
            created_at: now,
        };
        db.categories().insert(&category).await?;
        categories.push(category);
    }
    println!("✓ {} categories", categories.len());

    // Ingredients
    let mut ingredients = Vec::new();
    for (name, uom, stock, alert) in INGREDIENTS {
        let ingredient = Ingredient {
            id: generate_id(),
            restaurant_id: rid.clone(),
            name: name.to_string(),
            sku: None,
            uom: uom.to_string(),
            current_stock_milli: *stock,
            minimum_stock_alert_milli: *alert,
            cost_per_unit_minor: None,
            created_at: now,
            updated_at: now,
        };
        db.ingredients().insert(&ingredient).await?;
        ingredients.push(ingredient);
    }
    println!("✓ {} ingredients", ingredients.len());

    // Menu items and recipes
    for (name, category, price, recipe) in MENU {
        let item = MenuItem {
            id: generate_id(),
            restaurant_id: rid.clone(),
            category_id: categories
                .iter()
                .find(|c| c.name == *category)
                .map(|c| c.id.clone()),
            category_name: None,
            name: name.to_string(),
            price_minor: *price,
            is_active: true,
            image_url: None,
            cooking_instructions: None,
            recipe_notes: None,
            created_at: now,
            updated_at: now,
            recipe: Vec::new(),
        };
        db.menu().insert(&item).await?;

        for (ingredient_name, milli) in recipe.iter() {
            let ingredient = ingredients
                .iter()
                .find(|i| i.name == *ingredient_name)
                .with_context(|| format!("unknown ingredient {}", ingredient_name))?;
            db.menu()
                .add_recipe_line(&item.id, &ingredient.id, Quantity::from_milli(*milli))
                .await?;
        }
    }
    println!("✓ {} menu items", MENU.len());

    // Payment methods
    for (name, kind) in PAYMENT_METHODS {
        db.payment_methods()
            .insert(&PaymentMethod {
                id: generate_id(),
                restaurant_id: rid.clone(),
                name: name.to_string(),
                kind: *kind,
                is_active: true,
                created_at: now,
            })
            .await?;
    }
    println!("✓ {} payment methods", PAYMENT_METHODS.len());

    // Staff
    for (name, role, pin) in STAFF {
        db.staff()
            .insert(&StaffProfile {
                id: generate_id(),
                restaurant_id: rid.clone(),
                full_name: name.to_string(),
                role: *role,
                pin_hash: hash_pin(pin)?,
                created_at: now,
            })
            .await?;
        println!("  {} ({:?}) PIN {}", name, role, pin);
    }
    println!("✓ {} staff", STAFF.len());

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
