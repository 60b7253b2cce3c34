//! Bearer-token authentication.
//!
//! The auth gate consumes an `Authorization: Bearer <token>` header, verifies the HS256
//! signature and expiry, and attaches the caller identity to the request before any
//! workflow code runs. Handlers receive the identity through the [`AuthUser`] extractor
//! (or [`AdminUser`] where the admin role is required) and trust it completely; there is
//! no server-side session state.

use crate::error::ApiError;
use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
    RequestPartsExt,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// The `{id, role}` pair derived from a verified bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity {
    pub id: String,
    pub role: String,
}

/// Token payload: caller id, role, and expiry as seconds since the epoch.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: String,
    pub exp: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("failed to create token: {0}")]
    TokenCreation(jsonwebtoken::errors::Error),
    #[error("invalid token: {0}")]
    InvalidToken(jsonwebtoken::errors::Error),
}

/// Issues and verifies HS256 bearer tokens.
///
/// Constructed once at startup from the configured secret and shared through the
/// application state.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenService {
    /// Creates a token service for the given secret, issuing tokens valid for
    /// `ttl_hours` hours.
    pub fn new(secret: &str, ttl_hours: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::hours(ttl_hours),
        }
    }

    /// Issues a token encoding the caller id and role.
    pub fn issue(&self, user_id: &str, role: &str) -> Result<String, AuthError> {
        let claims = Claims {
            sub: user_id.to_string(),
            role: role.to_string(),
            exp: (Utc::now() + self.ttl).timestamp() as usize,
        };
        encode(&Header::default(), &claims, &self.encoding).map_err(AuthError::TokenCreation)
    }

    /// Verifies a token and returns the caller identity it encodes.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` for bad signatures, malformed tokens, and
    /// expired tokens alike.
    pub fn verify(&self, token: &str) -> Result<CallerIdentity, AuthError> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::default())
            .map_err(AuthError::InvalidToken)?;
        Ok(CallerIdentity {
            id: data.claims.sub,
            role: data.claims.role,
        })
    }
}

/// Extractor for authenticated endpoints.
///
/// Rejects with 401 before the handler body runs when the header is missing or the token
/// does not verify.
pub struct AuthUser(pub CallerIdentity);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    TokenService: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|_| ApiError::Auth("Missing or invalid token".into()))?;

        let tokens = TokenService::from_ref(state);
        let identity = tokens
            .verify(bearer.token())
            .map_err(|_| ApiError::Auth("Token verification failed".into()))?;

        Ok(AuthUser(identity))
    }
}

/// Extractor for admin-only endpoints: authentication plus a role check.
pub struct AdminUser(pub CallerIdentity);

#[async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
    TokenService: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthUser(identity) = AuthUser::from_request_parts(parts, state).await?;
        if identity.role != "admin" {
            return Err(ApiError::Forbidden("Admin access required".into()));
        }
        Ok(AdminUser(identity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_and_verify_round_trip() {
        let tokens = TokenService::new("test-secret", 24);
        let token = tokens.issue("user-1", "user").unwrap();

        let identity = tokens.verify(&token).expect("verify should succeed");
        assert_eq!(identity.id, "user-1");
        assert_eq!(identity.role, "user");
    }

    #[test]
    fn test_verify_rejects_wrong_secret() {
        let tokens = TokenService::new("test-secret", 24);
        let other = TokenService::new("other-secret", 24);

        let token = tokens.issue("user-1", "user").unwrap();
        assert!(other.verify(&token).is_err());
    }

    #[test]
    fn test_verify_rejects_expired_token() {
        // TTL in the past; the default validation applies a small leeway, so go well past it.
        let tokens = TokenService::new("test-secret", -2);
        let token = tokens.issue("user-1", "user").unwrap();
        assert!(tokens.verify(&token).is_err());
    }

    #[test]
    fn test_verify_rejects_garbage() {
        let tokens = TokenService::new("test-secret", 24);
        assert!(tokens.verify("not-a-token").is_err());
    }
}
