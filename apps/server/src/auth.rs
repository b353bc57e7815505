//! # Session Authentication
//!
//! Sessions are signed JWTs carried in an HttpOnly cookie. The claims hold
//! the user identity, role and a session id; the session id also keys the
//! server-side cart store, so a cart lives exactly as long as its session.
//!
//! Two extractors gate the routes:
//! - [`CurrentUser`] - any authenticated session. Rejection redirects to
//!   `/login` with the originally requested path in `next`.
//! - [`AdminUser`] - authenticated AND admin. Non-admins are silently
//!   redirected to the billing view rather than shown an error page.

use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::CookieJar;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;
use till_core::{Role, User};

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "till_session";

// =============================================================================
// Claims & Session Manager
// =============================================================================

/// Session token claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id).
    pub sub: String,

    pub username: String,

    pub role: Role,

    /// Session id; keys the per-session cart store.
    pub sid: String,

    /// Issued at (Unix timestamp).
    pub iat: i64,

    /// Expiration (Unix timestamp).
    pub exp: i64,
}

impl Claims {
    /// Checks if the session belongs to an admin.
    #[inline]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Issues and validates session tokens.
#[derive(Debug)]
pub struct SessionManager {
    secret: String,
    lifetime_hours: i64,
}

impl SessionManager {
    /// Creates a new session manager.
    pub fn new(secret: impl Into<String>, lifetime_hours: i64) -> Self {
        SessionManager {
            secret: secret.into(),
            lifetime_hours,
        }
    }

    /// Issues a session token for a user.
    pub fn issue(&self, user: &User) -> Result<String, ApiError> {
        let now = Utc::now();
        let exp = now + Duration::hours(self.lifetime_hours);

        let claims = Claims {
            sub: user.id.clone(),
            username: user.username.clone(),
            role: user.role,
            sid: Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| ApiError::internal(format!("Failed to issue session token: {}", e)))
    }

    /// Validates a session token and returns its claims. Expired or
    /// tampered tokens fail validation.
    pub fn verify(&self, token: &str) -> Result<Claims, ApiError> {
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|e| ApiError::unauthorized(format!("Invalid session: {}", e)))?;

        Ok(data.claims)
    }
}

// =============================================================================
// Password Hashing
// =============================================================================

/// Hashes a password for storage (argon2 PHC string).
pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::internal(format!("Failed to hash password: {}", e)))
}

/// Verifies a password against its stored hash.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

// =============================================================================
// Extractors
// =============================================================================

/// Rejection for the auth extractors: a silent redirect, never an error
/// page.
#[derive(Debug)]
pub struct AuthRedirect(String);

impl AuthRedirect {
    /// Redirect to login, preserving the originally requested path.
    fn to_login(next: &str) -> Self {
        AuthRedirect(format!("/login?next={}", next))
    }

    /// Redirect non-admins to the billing view.
    fn to_billing() -> Self {
        AuthRedirect("/billing".to_string())
    }
}

impl IntoResponse for AuthRedirect {
    fn into_response(self) -> Response {
        Redirect::to(&self.0).into_response()
    }
}

/// Extractor: the authenticated session behind the request.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Claims);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AuthRedirect;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);

        let token = jar
            .get(SESSION_COOKIE)
            .map(|cookie| cookie.value().to_string())
            .ok_or_else(|| AuthRedirect::to_login(parts.uri.path()))?;

        match state.sessions.verify(&token) {
            Ok(claims) => Ok(CurrentUser(claims)),
            Err(_) => Err(AuthRedirect::to_login(parts.uri.path())),
        }
    }
}

/// Extractor: an authenticated admin session.
#[derive(Debug, Clone)]
pub struct AdminUser(pub Claims);

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AuthRedirect;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(claims) = CurrentUser::from_request_parts(parts, state).await?;

        if !claims.is_admin() {
            return Err(AuthRedirect::to_billing());
        }

        Ok(AdminUser(claims))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user(role: Role) -> User {
        User {
            id: "user-1".to_string(),
            username: "admin".to_string(),
            password_hash: String::new(),
            role,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_session_roundtrip() {
        let manager = SessionManager::new("test-secret", 8);

        let token = manager.issue(&sample_user(Role::Admin)).unwrap();
        let claims = manager.verify(&token).unwrap();

        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.username, "admin");
        assert!(claims.is_admin());
        assert!(!claims.sid.is_empty());
    }

    #[test]
    fn test_tampered_token_is_rejected() {
        let manager = SessionManager::new("test-secret", 8);
        let other = SessionManager::new("other-secret", 8);

        let token = manager.issue(&sample_user(Role::Cashier)).unwrap();
        assert!(other.verify(&token).is_err());
        assert!(manager.verify("garbage").is_err());
    }

    #[test]
    fn test_sessions_get_distinct_ids() {
        let manager = SessionManager::new("test-secret", 8);
        let user = sample_user(Role::Cashier);

        let first = manager.verify(&manager.issue(&user).unwrap()).unwrap();
        let second = manager.verify(&manager.issue(&user).unwrap()).unwrap();

        assert_ne!(first.sid, second.sid);
    }

    #[test]
    fn test_password_hash_and_verify() {
        let hash = hash_password("admin123").unwrap();

        assert!(verify_password("admin123", &hash));
        assert!(!verify_password("wrong", &hash));
        assert!(!verify_password("admin123", "not-a-phc-string"));
    }
}
