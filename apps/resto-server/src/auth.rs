//! JWT authentication module.
//!
//! Handles bearer token issue and validation, the per-request
//! [`SessionContext`], and the middleware that guards every route except
//! login and health.
//!
//! ## Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Authorization: Bearer <jwt>                                            │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  require_auth ── decode + verify exp ── jti revoked? ──► 401            │
//! │         │                                                               │
//! │         ├── staff profile deleted since login ────────────► 401         │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  request.extensions += SessionContext, AuthToken                        │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  handler(Extension(ctx): Extension<SessionContext>, ...)                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use resto_core::{Role, StaffProfile};

/// User id of the built-in owner behind the bootstrap PIN.
pub const BOOTSTRAP_USER_ID: &str = "bootstrap-owner";

// =============================================================================
// Session Context
// =============================================================================

/// Who is making the request. Built at login and carried in the token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionContext {
    pub user_id: String,
    pub full_name: String,
    pub role: Role,
    pub restaurant_id: String,
}

impl SessionContext {
    pub fn from_staff(staff: &StaffProfile) -> Self {
        SessionContext {
            user_id: staff.id.clone(),
            full_name: staff.full_name.clone(),
            role: staff.role,
            restaurant_id: staff.restaurant_id.clone(),
        }
    }

    /// The synthetic owner that the bootstrap PIN logs in as.
    pub fn bootstrap_owner(restaurant_id: &str) -> Self {
        SessionContext {
            user_id: BOOTSTRAP_USER_ID.to_string(),
            full_name: "Administrator".to_string(),
            role: Role::Owner,
            restaurant_id: restaurant_id.to_string(),
        }
    }

    /// Owner/admin gate for settings, staff and payment methods.
    pub fn require_manager(&self) -> ApiResult<()> {
        if self.role.can_manage() {
            Ok(())
        } else {
            Err(ApiError::forbidden("Only an owner or admin can do this"))
        }
    }
}

impl From<&Claims> for SessionContext {
    fn from(claims: &Claims) -> Self {
        SessionContext {
            user_id: claims.sub.clone(),
            full_name: claims.name.clone(),
            role: claims.role,
            restaurant_id: claims.restaurant_id.clone(),
        }
    }
}

/// The validated token of the current request, needed to log it out.
#[derive(Debug, Clone)]
pub struct AuthToken {
    pub jti: String,
    pub exp: i64,
}

// =============================================================================
// JWT
// =============================================================================

/// JWT claims structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (staff id)
    pub sub: String,

    /// Staff display name
    pub name: String,

    pub role: Role,

    pub restaurant_id: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration (Unix timestamp)
    pub exp: i64,

    /// JWT ID (unique identifier for this token, used for logout)
    pub jti: String,
}

/// JWT token manager.
pub struct JwtManager {
    secret: String,
    lifetime_secs: i64,
}

impl JwtManager {
    pub fn new(secret: String, lifetime_secs: i64) -> Self {
        JwtManager {
            secret,
            lifetime_secs,
        }
    }

    /// Issues a token for a logged-in user.
    pub fn issue(&self, ctx: &SessionContext) -> ApiResult<(String, Claims)> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.lifetime_secs);

        let claims = Claims {
            sub: ctx.user_id.clone(),
            name: ctx.full_name.clone(),
            role: ctx.role,
            restaurant_id: ctx.restaurant_id.clone(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| ApiError::internal(format!("Failed to generate token: {}", e)))?;

        Ok((token, claims))
    }

    /// Validate and decode a token.
    pub fn validate(&self, token: &str) -> ApiResult<Claims> {
        let token_data: TokenData<Claims> = decode(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|e| ApiError::unauthorized(format!("Invalid token: {}", e)))?;

        Ok(token_data.claims)
    }
}

/// Extract bearer token from authorization header.
pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

// =============================================================================
// Middleware
// =============================================================================

/// Rejects requests without a valid, unrevoked bearer token, or whose
/// user no longer exists.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(extract_bearer_token)
        .ok_or_else(|| ApiError::unauthorized("Missing bearer token"))?;

    let claims = state.jwt.validate(token)?;

    if state.revoked.is_revoked(&claims.jti).await {
        return Err(ApiError::unauthorized("Session has ended. Log in again."));
    }
    if claims.restaurant_id != state.config.restaurant_id {
        return Err(ApiError::unauthorized("Token belongs to another restaurant"));
    }
    ensure_user_exists(&state, &claims).await?;

    req.extensions_mut().insert(SessionContext::from(&claims));
    req.extensions_mut().insert(AuthToken {
        jti: claims.jti,
        exp: claims.exp,
    });

    Ok(next.run(req).await)
}

/// A deleted staff member's outstanding tokens stop working immediately.
/// The bootstrap owner lives only as long as its PIN is configured.
async fn ensure_user_exists(state: &AppState, claims: &Claims) -> ApiResult<()> {
    let exists = if claims.sub == BOOTSTRAP_USER_ID {
        state.config.bootstrap_pin.is_some()
    } else {
        match state.db.staff().get_by_id(&claims.sub).await? {
            Some(staff) => staff.restaurant_id == claims.restaurant_id,
            None => false,
        }
    };

    if exists {
        Ok(())
    } else {
        warn!(user_id = %claims.sub, "Token for a removed user rejected");
        Err(ApiError::unauthorized("Account no longer exists. Log in again."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    fn cashier() -> SessionContext {
        SessionContext {
            user_id: "staff-1".to_string(),
            full_name: "Sari".to_string(),
            role: Role::Cashier,
            restaurant_id: resto_core::DEFAULT_RESTAURANT_ID.to_string(),
        }
    }

    #[test]
    fn test_jwt_roundtrip() {
        let manager = JwtManager::new("test-secret".to_string(), 3600);

        let (token, issued) = manager.issue(&cashier()).unwrap();
        let claims = manager.validate(&token).unwrap();

        assert_eq!(claims.sub, "staff-1");
        assert_eq!(claims.role, Role::Cashier);
        assert_eq!(claims.jti, issued.jti);
        assert_eq!(SessionContext::from(&claims), cashier());
    }

    #[test]
    fn test_each_token_has_its_own_jti() {
        let manager = JwtManager::new("test-secret".to_string(), 3600);
        let (_, a) = manager.issue(&cashier()).unwrap();
        let (_, b) = manager.issue(&cashier()).unwrap();
        assert_ne!(a.jti, b.jti);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let issuer = JwtManager::new("secret-a".to_string(), 3600);
        let verifier = JwtManager::new("secret-b".to_string(), 3600);

        let (token, _) = issuer.issue(&cashier()).unwrap();
        let err = verifier.validate(&token).unwrap_err();
        assert_eq!(err.code, ErrorCode::Unauthorized);
    }

    #[test]
    fn test_expired_token_rejected() {
        // Past the default 60s leeway.
        let manager = JwtManager::new("test-secret".to_string(), -120);
        let (token, _) = manager.issue(&cashier()).unwrap();
        assert!(manager.validate(&token).is_err());
    }

    #[test]
    fn test_role_gate() {
        assert!(cashier().require_manager().is_err());
        assert!(SessionContext::bootstrap_owner("r-1").require_manager().is_ok());
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token("Bearer abc"), Some("abc"));
        assert_eq!(extract_bearer_token("Basic abc"), None);
        assert_eq!(extract_bearer_token("Bearer "), None);
    }
}
