//! # Cart Store
//!
//! One in-progress cart per logged-in user.
//!
//! ## Thread Safety
//! All carts sit behind a single `Mutex`. Closures run without awaiting, so
//! the lock is never held across an `.await`. A poisoned lock is recovered.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use resto_core::cart::Cart;

#[derive(Debug, Default)]
pub struct CartStore {
    carts: Mutex<HashMap<String, Cart>>,
}

impl CartStore {
    pub fn new() -> Self {
        CartStore::default()
    }

    /// Executes a function with read access to a user's cart.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let totals = state.carts.with_cart(&ctx.user_id, |cart| cart.totals(rate))?;
    /// ```
    pub fn with_cart<F, R>(&self, user_id: &str, f: F) -> R
    where
        F: FnOnce(&Cart) -> R,
    {
        let carts = self.carts.lock().unwrap_or_else(PoisonError::into_inner);
        match carts.get(user_id) {
            Some(cart) => f(cart),
            None => f(&Cart::new()),
        }
    }

    /// Executes a function with write access to a user's cart, creating it
    /// on first use.
    pub fn with_cart_mut<F, R>(&self, user_id: &str, f: F) -> R
    where
        F: FnOnce(&mut Cart) -> R,
    {
        let mut carts = self.carts.lock().unwrap_or_else(PoisonError::into_inner);
        f(carts.entry(user_id.to_string()).or_default())
    }

    /// Drops a user's cart entirely (logout).
    pub fn discard(&self, user_id: &str) {
        let mut carts = self.carts.lock().unwrap_or_else(PoisonError::into_inner);
        carts.remove(user_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use resto_core::{MenuItem, DEFAULT_RESTAURANT_ID};

    fn item(id: &str, price: i64) -> MenuItem {
        MenuItem {
            id: id.to_string(),
            restaurant_id: DEFAULT_RESTAURANT_ID.to_string(),
            category_id: None,
            category_name: None,
            name: format!("Item {}", id),
            price_minor: price,
            is_active: true,
            image_url: None,
            cooking_instructions: None,
            recipe_notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            recipe: Vec::new(),
        }
    }

    #[test]
    fn test_carts_are_per_user() {
        let store = CartStore::new();

        store
            .with_cart_mut("sari", |cart| cart.add_item(&item("a", 10_000), 2))
            .unwrap();

        assert_eq!(store.with_cart("sari", |c| c.total_quantity()), 2);
        assert!(store.with_cart("budi", |c| c.is_empty()));
    }

    #[test]
    fn test_discard() {
        let store = CartStore::new();
        store
            .with_cart_mut("sari", |cart| cart.add_item(&item("a", 10_000), 1))
            .unwrap();

        store.discard("sari");
        assert!(store.with_cart("sari", |c| c.is_empty()));
    }
}
