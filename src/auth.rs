use async_graphql::{Context, ErrorExtensions, Guard};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::context::RequestContext;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum AuthError {
    #[error("Missing authentication token")]
    MissingToken,

    #[error("Invalid authentication token")]
    InvalidToken,

    #[error("Token generation failed: {0}")]
    Generation(String),
}

impl ErrorExtensions for AuthError {
    fn extend(&self) -> async_graphql::Error {
        async_graphql::Error::new(self.to_string()).extend_with(|_, e| match self {
            AuthError::MissingToken | AuthError::InvalidToken => e.set("code", "UNAUTHENTICATED"),
            AuthError::Generation(_) => e.set("code", "INTERNAL_SERVER_ERROR"),
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
}

/// Issues and verifies HS256 access tokens.
#[derive(Clone)]
pub struct TokenService {
    secret: String,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: impl Into<String>, ttl_days: i64) -> Self {
        Self {
            secret: secret.into(),
            // out-of-range lifetimes surface as an error from `issue`
            ttl: Duration::try_days(ttl_days).unwrap_or(Duration::MAX),
        }
    }

    pub fn issue(&self, user_id: &str) -> Result<String, AuthError> {
        let expires_at = Utc::now()
            .checked_add_signed(self.ttl)
            .ok_or_else(|| AuthError::Generation("token lifetime out of range".to_string()))?;
        let claims = Claims {
            sub: user_id.to_string(),
            exp: expires_at.timestamp() as usize,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_ref()),
        )
        .map_err(|e| AuthError::Generation(e.to_string()))
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_ref()),
            &Validation::new(Algorithm::HS256),
        )
        .map(|data| data.claims)
        .map_err(|_| AuthError::InvalidToken)
    }
}

/// Resolves the authenticated user id for the current request.
///
/// The token is verified once per request; [`AuthGuard`] and the resolver it
/// protects share the outcome through the [`RequestContext`].
pub fn authenticated_user_id(ctx: &Context<'_>) -> async_graphql::Result<String> {
    let request = ctx.data::<RequestContext>()?;
    let tokens = ctx.data::<TokenService>()?;

    request.user_id(tokens).map_err(|e| e.extend())
}

/// Field guard admitting only requests with a valid bearer token.
pub struct AuthGuard;

impl Guard for AuthGuard {
    async fn check(&self, ctx: &Context<'_>) -> async_graphql::Result<()> {
        authenticated_user_id(ctx).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_and_verify() {
        let tokens = TokenService::new("test-secret", 1);
        let token = tokens.issue("user-1").unwrap();

        let claims = tokens.verify(&token).unwrap();
        assert_eq!(claims.sub, "user-1");
        assert!(claims.exp > Utc::now().timestamp() as usize);
    }

    #[test]
    fn test_verify_rejects_foreign_secret() {
        let token = TokenService::new("secret-a", 1).issue("user-1").unwrap();
        let result = TokenService::new("secret-b", 1).verify(&token);

        assert_eq!(result.unwrap_err(), AuthError::InvalidToken);
    }

    #[test]
    fn test_verify_rejects_expired_token() {
        // well past the default validation leeway
        let tokens = TokenService::new("test-secret", -1);
        let token = tokens.issue("user-1").unwrap();

        assert!(tokens.verify(&token).is_err());
    }

    #[test]
    fn test_issue_fails_instead_of_overflowing() {
        for ttl_days in [100_000_000, i64::MAX] {
            let result = TokenService::new("test-secret", ttl_days).issue("user-1");
            assert!(
                matches!(result, Err(AuthError::Generation(_))),
                "ttl of {ttl_days} days should not issue a token"
            );
        }
    }

    #[test]
    fn test_verify_rejects_garbage() {
        let tokens = TokenService::new("test-secret", 1);
        assert_eq!(tokens.verify("not-a-jwt").unwrap_err(), AuthError::InvalidToken);
    }

    #[test]
    fn test_error_extension_code() {
        let err = AuthError::MissingToken.extend();
        let code = err
            .extensions
            .as_ref()
            .and_then(|ext| ext.get("code"))
            .cloned();
        assert_eq!(code, Some(async_graphql::Value::from("UNAUTHENTICATED")));
    }
}
