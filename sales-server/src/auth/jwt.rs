//! JWT issuing and validation

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use shared::error::AppError;
use shared::models::Role;

const JWT_EXPIRY_HOURS: i64 = 24;

/// JWT claims for an authenticated user
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: i64,
    /// Username
    pub username: String,
    /// Assigned role, if any
    pub role: Option<Role>,
    /// Superuser flag — bypasses role checks
    #[serde(default)]
    pub su: bool,
    /// Expiration (Unix timestamp seconds)
    pub exp: usize,
    /// Issued at (Unix timestamp seconds)
    pub iat: usize,
}

/// Create a signed token for a user
pub fn create_token(
    user_id: i64,
    username: &str,
    role: Option<Role>,
    is_superuser: bool,
    secret: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now();
    let claims = Claims {
        sub: user_id,
        username: username.to_string(),
        role,
        su: is_superuser,
        exp: (now + chrono::Duration::hours(JWT_EXPIRY_HOURS)).timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Validate a token and return its claims
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, AppError> {
    let validation = Validation::default();
    jsonwebtoken::decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => AppError::token_expired(),
        _ => AppError::invalid_token("Invalid token"),
    })
}

/// Extract the token from an `Authorization: Bearer <token>` header value
pub fn extract_from_header(header: &str) -> Option<&str> {
    header.strip_prefix("Bearer ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::error::ErrorCode;

    #[test]
    fn test_create_and_validate() {
        let token = create_token(7, "seller1", Some(Role::Seller), false, "test-secret").unwrap();
        let claims = validate_token(&token, "test-secret").unwrap();
        assert_eq!(claims.sub, 7);
        assert_eq!(claims.username, "seller1");
        assert_eq!(claims.role, Some(Role::Seller));
        assert!(!claims.su);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = create_token(1, "admin", None, true, "secret-a").unwrap();
        let err = validate_token(&token, "secret-b").unwrap_err();
        assert_eq!(err.code, ErrorCode::TokenInvalid);
    }

    #[test]
    fn test_extract_from_header() {
        assert_eq!(extract_from_header("Bearer abc.def.ghi"), Some("abc.def.ghi"));
        assert_eq!(extract_from_header("Basic dXNlcg=="), None);
    }
}
