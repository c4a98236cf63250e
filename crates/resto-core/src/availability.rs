//! # Stock Availability
//!
//! Decides whether a menu item can be sold with the ingredients on hand.
//!
//! ## Evaluation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  evaluate(menu_item)                                                    │
//! │                                                                         │
//! │  recipe empty? ──yes──► available  "Ready (no recipe defined)"         │
//! │       │ no                                                              │
//! │       ▼                                                                 │
//! │  for line in recipe (stored order):                                    │
//! │       stock < needed? ──yes──► unavailable                             │
//! │       │ no                     "Insufficient: Rice (0 kg left)"        │
//! │       ▼                        (later lines are NOT inspected)          │
//! │  next line                                                              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  available  "Ingredients sufficient."                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Only the first insufficient ingredient is ever reported.
//!
//! The result is derived from the stock snapshot carried by each
//! [`RecipeLine`]; it is never stored and nothing here touches stock.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::quantity::Quantity;
use crate::types::{MenuItem, RecipeLine};

/// Reason given for items without a bill of materials.
pub const REASON_NO_RECIPE: &str = "Ready (no recipe defined)";

/// Reason given when every recipe line is covered by stock.
pub const REASON_SUFFICIENT: &str = "Ingredients sufficient.";

/// Reason given for deactivated menu items at checkout.
pub const REASON_INACTIVE: &str = "Item is inactive";

// =============================================================================
// Result Types
// =============================================================================

/// The ingredient that blocked a sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Shortfall {
    pub recipe_line_id: String,
    pub ingredient_id: String,
    pub ingredient_name: String,
    pub uom: String,
    pub current_stock: Quantity,
    pub quantity_needed: Quantity,
}

/// Outcome of [`evaluate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Availability {
    pub available: bool,
    pub reason: String,
    pub shortfall: Option<Shortfall>,
}

impl Availability {
    fn ready(reason: &str) -> Self {
        Availability {
            available: true,
            reason: reason.to_string(),
            shortfall: None,
        }
    }

    fn blocked(line: &RecipeLine) -> Self {
        let stock = line.ingredient_stock();
        Availability {
            available: false,
            reason: format!(
                "Insufficient: {} ({} {} left)",
                line.ingredient_name, stock, line.ingredient_uom
            ),
            shortfall: Some(Shortfall {
                recipe_line_id: line.id.clone(),
                ingredient_id: line.ingredient_id.clone(),
                ingredient_name: line.ingredient_name.clone(),
                uom: line.ingredient_uom.clone(),
                current_stock: stock,
                quantity_needed: line.quantity_needed(),
            }),
        }
    }
}

// =============================================================================
// Evaluation
// =============================================================================

/// Evaluates a menu item's availability against current stock.
///
/// ## Errors
/// `CoreError::Validation` if any recipe line is malformed: blank
/// ingredient name, non-positive quantity needed, or negative stock.
///
/// ## Example
/// ```rust
/// use resto_core::availability::evaluate;
/// # use resto_core::types::MenuItem;
/// # let item: MenuItem = serde_json::from_value(serde_json::json!({
/// #     "id": "m-1", "restaurantId": "r", "categoryId": null,
/// #     "categoryName": null, "name": "Iced Tea", "priceMinor": 8000,
/// #     "isActive": true, "imageUrl": null, "cookingInstructions": null,
/// #     "recipeNotes": null, "createdAt": "2024-01-01T00:00:00Z",
/// #     "updatedAt": "2024-01-01T00:00:00Z"
/// # })).unwrap();
///
/// let result = evaluate(&item).unwrap();
/// assert!(result.available);
/// assert_eq!(result.reason, "Ready (no recipe defined)");
/// ```
pub fn evaluate(item: &MenuItem) -> CoreResult<Availability> {
    for line in &item.recipe {
        validate_line(line)?;
    }

    if item.recipe.is_empty() {
        return Ok(Availability::ready(REASON_NO_RECIPE));
    }

    let first_short = item
        .recipe
        .iter()
        .find(|line| line.ingredient_stock() < line.quantity_needed());

    Ok(match first_short {
        Some(line) => Availability::blocked(line),
        None => Availability::ready(REASON_SUFFICIENT),
    })
}

/// Evaluates every item of a listing, preserving order.
pub fn evaluate_all(items: &[MenuItem]) -> CoreResult<Vec<Availability>> {
    items.iter().map(evaluate).collect()
}

/// Checkout gate: the item must be active and its recipe covered.
///
/// ## Errors
/// `CoreError::ItemUnavailable` with the evaluator's reason.
pub fn ensure_sellable(item: &MenuItem) -> CoreResult<()> {
    if !item.is_active {
        return Err(CoreError::ItemUnavailable {
            name: item.name.clone(),
            reason: REASON_INACTIVE.to_string(),
        });
    }

    let availability = evaluate(item)?;
    if !availability.available {
        return Err(CoreError::ItemUnavailable {
            name: item.name.clone(),
            reason: availability.reason,
        });
    }

    Ok(())
}

fn validate_line(line: &RecipeLine) -> Result<(), ValidationError> {
    if line.ingredient_name.trim().is_empty() {
        return Err(ValidationError::required("ingredient name"));
    }
    if !line.quantity_needed().is_positive() {
        return Err(ValidationError::must_be_positive("quantity needed"));
    }
    if line.ingredient_stock().is_negative() {
        return Err(ValidationError::must_not_be_negative("current stock"));
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use proptest::prelude::*;

    fn menu_item(name: &str, recipe: Vec<RecipeLine>) -> MenuItem {
        let now = Utc::now();
        MenuItem {
            id: format!("menu-{}", name),
            restaurant_id: crate::DEFAULT_RESTAURANT_ID.to_string(),
            category_id: None,
            category_name: None,
            name: name.to_string(),
            price_minor: 25_000,
            is_active: true,
            image_url: None,
            cooking_instructions: None,
            recipe_notes: None,
            created_at: now,
            updated_at: now,
            recipe,
        }
    }

    fn line(ingredient: &str, uom: &str, needed_milli: i64, stock_milli: i64) -> RecipeLine {
        RecipeLine {
            id: format!("line-{}", ingredient),
            menu_item_id: "menu".to_string(),
            ingredient_id: format!("ing-{}", ingredient),
            quantity_needed_milli: needed_milli,
            ingredient_name: ingredient.to_string(),
            ingredient_uom: uom.to_string(),
            ingredient_stock_milli: stock_milli,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_no_recipe_is_ready() {
        let result = evaluate(&menu_item("Bottled Water", vec![])).unwrap();
        assert!(result.available);
        assert_eq!(result.reason, REASON_NO_RECIPE);
        assert!(result.shortfall.is_none());
    }

    #[test]
    fn test_fried_rice_out_of_rice() {
        let item = menu_item(
            "Fried Rice",
            vec![
                line("egg", "pcs", 2_000, 5_000),
                line("rice", "kg", 1_000, 0),
            ],
        );

        let result = evaluate(&item).unwrap();
        assert!(!result.available);
        assert_eq!(result.reason, "Insufficient: rice (0 kg left)");

        let shortfall = result.shortfall.unwrap();
        assert_eq!(shortfall.ingredient_name, "rice");
        assert_eq!(shortfall.current_stock, Quantity::zero());
    }

    #[test]
    fn test_only_first_shortfall_reported() {
        let item = menu_item(
            "Omelette",
            vec![
                line("egg", "pcs", 3_000, 1_000),
                line("butter", "kg", 50, 0),
            ],
        );

        let result = evaluate(&item).unwrap();
        assert!(!result.available);
        assert!(result.reason.contains("egg"));
        assert!(!result.reason.contains("butter"));
    }

    #[test]
    fn test_exact_stock_is_sufficient() {
        let item = menu_item("Tea", vec![line("tea leaves", "kg", 10, 10)]);
        let result = evaluate(&item).unwrap();
        assert!(result.available);
        assert_eq!(result.reason, REASON_SUFFICIENT);
    }

    #[test]
    fn test_fractional_stock_in_reason() {
        let item = menu_item("Nasi Goreng", vec![line("rice", "kg", 300, 250)]);
        let result = evaluate(&item).unwrap();
        assert_eq!(result.reason, "Insufficient: rice (0.25 kg left)");
    }

    #[test]
    fn test_malformed_lines_fail_fast() {
        let zero_needed = menu_item("A", vec![line("egg", "pcs", 0, 5_000)]);
        assert!(matches!(evaluate(&zero_needed), Err(CoreError::Validation(_))));

        let negative_stock = menu_item("B", vec![line("egg", "pcs", 1_000, -1)]);
        assert!(matches!(evaluate(&negative_stock), Err(CoreError::Validation(_))));

        let unnamed = menu_item("C", vec![line("  ", "pcs", 1_000, 5_000)]);
        assert!(matches!(evaluate(&unnamed), Err(CoreError::Validation(_))));
    }

    #[test]
    fn test_ensure_sellable() {
        let mut item = menu_item("Fried Rice", vec![line("rice", "kg", 1_000, 2_000)]);
        assert!(ensure_sellable(&item).is_ok());

        item.is_active = false;
        let err = ensure_sellable(&item).unwrap_err();
        assert!(err.to_string().contains(REASON_INACTIVE));

        item.is_active = true;
        item.recipe[0].ingredient_stock_milli = 0;
        let err = ensure_sellable(&item).unwrap_err();
        assert!(err.to_string().contains("Insufficient: rice"));
    }

    #[test]
    fn test_evaluate_all_preserves_order() {
        let items = vec![
            menu_item("Water", vec![]),
            menu_item("Rice", vec![line("rice", "kg", 1_000, 0)]),
        ];
        let results = evaluate_all(&items).unwrap();
        assert_eq!(results.len(), 2);
        assert!(results[0].available);
        assert!(!results[1].available);
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Stock at or above every requirement always yields available.
        #[test]
        fn covered_recipes_are_available(
            lines in prop::collection::vec((1i64..100_000, 0i64..100_000), 0..12)
        ) {
            let recipe = lines
                .iter()
                .enumerate()
                .map(|(i, (needed, extra))| {
                    line(&format!("ing{}", i), "kg", *needed, needed + extra)
                })
                .collect();

            let result = evaluate(&menu_item("Dish", recipe)).unwrap();
            prop_assert!(result.available);
            prop_assert!(result.shortfall.is_none());
        }

        /// The reported ingredient is the first insufficient line in order.
        #[test]
        fn first_insufficient_line_is_reported(
            lines in prop::collection::vec((1i64..100_000, 0i64..200_000), 1..12)
        ) {
            let recipe: Vec<RecipeLine> = lines
                .iter()
                .enumerate()
                .map(|(i, (needed, stock))| line(&format!("ing{}", i), "kg", *needed, *stock))
                .collect();
            let expected = recipe
                .iter()
                .position(|l| l.ingredient_stock_milli < l.quantity_needed_milli);

            let result = evaluate(&menu_item("Dish", recipe)).unwrap();
            match expected {
                Some(index) => {
                    prop_assert!(!result.available);
                    let shortfall = result.shortfall.unwrap();
                    prop_assert_eq!(shortfall.ingredient_name, format!("ing{}", index));
                }
                None => prop_assert!(result.available),
            }
        }
    }
}
