//! # Staff Repository
//!
//! Staff profiles and PIN credentials.
//!
//! PINs are stored only as argon2 PHC strings. Lookup by PIN verifies the
//! candidate against each profile's hash since salted hashes cannot be
//! searched with SQL.

use argon2::{
    password_hash::{rand_core::OsRng, SaltString},
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use resto_core::StaffProfile;

// =============================================================================
// PIN Hashing
// =============================================================================

/// Hashes a PIN with a fresh random salt.
pub fn hash_pin(pin: &str) -> DbResult<String> {
    let salt = SaltString::generate(&mut OsRng);

    let hash = Argon2::default()
        .hash_password(pin.as_bytes(), &salt)
        .map_err(|e| DbError::Internal(format!("Failed to hash PIN: {}", e)))?;

    Ok(hash.to_string())
}

/// Checks a PIN against a stored hash. Malformed hashes never match.
pub fn verify_pin(pin: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };

    Argon2::default()
        .verify_password(pin.as_bytes(), &parsed_hash)
        .is_ok()
}

// =============================================================================
// Repository
// =============================================================================

#[derive(Debug, Clone)]
pub struct StaffRepository {
    pool: SqlitePool,
}

impl StaffRepository {
    pub fn new(pool: SqlitePool) -> Self {
        StaffRepository { pool }
    }

    pub async fn list(&self, restaurant_id: &str) -> DbResult<Vec<StaffProfile>> {
        let staff = sqlx::query_as::<_, StaffProfile>(
            r#"
            SELECT id, restaurant_id, full_name, role, pin_hash, created_at
            FROM staff_profiles
            WHERE restaurant_id = ?1
            ORDER BY full_name
            "#,
        )
        .bind(restaurant_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(staff)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<StaffProfile>> {
        let staff = sqlx::query_as::<_, StaffProfile>(
            r#"
            SELECT id, restaurant_id, full_name, role, pin_hash, created_at
            FROM staff_profiles
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(staff)
    }

    /// Finds the staff member whose PIN matches.
    pub async fn find_by_pin(&self, restaurant_id: &str, pin: &str) -> DbResult<Option<StaffProfile>> {
        let staff = self.list(restaurant_id).await?;
        let found = staff.into_iter().find(|s| verify_pin(pin, &s.pin_hash));

        debug!(matched = found.is_some(), "PIN lookup");
        Ok(found)
    }

    /// Inserts a profile whose `pin_hash` is already set.
    pub async fn insert(&self, staff: &StaffProfile) -> DbResult<()> {
        debug!(name = %staff.full_name, role = ?staff.role, "Inserting staff");

        sqlx::query(
            r#"
            INSERT INTO staff_profiles (id, restaurant_id, full_name, role, pin_hash, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&staff.id)
        .bind(&staff.restaurant_id)
        .bind(&staff.full_name)
        .bind(staff.role)
        .bind(&staff.pin_hash)
        .bind(staff.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting staff");

        let result = sqlx::query("DELETE FROM staff_profiles WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Staff", id));
        }

        Ok(())
    }
}
