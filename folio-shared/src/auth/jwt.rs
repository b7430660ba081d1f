/// JWT token generation and validation
///
/// Session tokens are signed with HS256 (HMAC-SHA256) and carry the caller's
/// identity and role. Signature, expiration, and issuer are all checked on
/// validation; revocation is layered on top by the session authority, which
/// consults the deny-list after the signature check passes.
///
/// # Security
///
/// - **Algorithm**: HS256 (HMAC with SHA-256)
/// - **Expiration**: configurable per deployment (default 24 hours)
/// - **Secret**: at least 32 bytes (256 bits)
///
/// # Example
///
/// ```
/// use folio_shared::auth::jwt::{create_token, validate_token, Claims};
/// use folio_shared::db::Role;
/// use chrono::Duration;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let claims = Claims::new(
///     Uuid::new_v4(),
///     "owner@example.com",
///     Role::Owner,
///     Duration::hours(24),
/// );
///
/// let token = create_token(&claims, "a-secret-key-at-least-32-bytes-long")?;
/// let validated = validate_token(&token, "a-secret-key-at-least-32-bytes-long")?;
/// assert_eq!(validated.sub, claims.sub);
/// # Ok(())
/// # }
/// ```
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::Role;

/// Issuer claim stamped into every token
pub const ISSUER: &str = "folio";

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Failed to validate token
    #[error("Failed to validate token: {0}")]
    ValidationError(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Invalid issuer
    #[error("Invalid issuer: expected {expected}")]
    InvalidIssuer { expected: String },
}

/// JWT claims structure
///
/// # Standard Claims
///
/// - `sub`: Subject (account ID)
/// - `iss`: Issuer (always "folio")
/// - `iat`: Issued at timestamp
/// - `exp`: Expiration timestamp
///
/// # Custom Claims
///
/// - `email`: Account email at issue time
/// - `role`: Privilege tier ("OWNER" or "VISITOR")
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - account ID
    pub sub: Uuid,

    /// Issuer - always "folio"
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Account email (custom claim)
    pub email: String,

    /// Privilege tier (custom claim)
    pub role: Role,
}

impl Claims {
    /// Creates new claims expiring `ttl` from now
    pub fn new(account_id: Uuid, email: &str, role: Role, ttl: Duration) -> Self {
        let now = Utc::now();
        let expiration = now + ttl;

        Self {
            sub: account_id,
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
            email: email.to_string(),
            role,
        }
    }

    /// Checks if token has expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }

    /// Gets time until expiration, or None if already expired
    pub fn time_until_expiration(&self) -> Option<Duration> {
        let now = Utc::now().timestamp();
        if self.exp > now {
            Some(Duration::seconds(self.exp - now))
        } else {
            None
        }
    }
}

/// Creates a JWT token from claims
///
/// Signs the token using HS256 with the provided secret.
///
/// # Errors
///
/// Returns `JwtError::CreateError` if token encoding fails.
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key)
        .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Validates a JWT token and extracts claims
///
/// Verifies the signature, expiration, and that the issuer is "folio".
/// Does NOT consult the deny-list; callers that need revocation go through
/// [`crate::auth::session::SessionAuthority::verify`].
///
/// # Errors
///
/// Returns an error if the signature is invalid, the token has expired, the
/// issuer doesn't match, or the token format is malformed.
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.validate_exp = true;

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
        jsonwebtoken::errors::ErrorKind::InvalidIssuer => JwtError::InvalidIssuer {
            expected: ISSUER.to_string(),
        },
        _ => JwtError::ValidationError(format!("Token validation failed: {}", e)),
    })?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    #[test]
    fn test_claims_creation() {
        let account_id = Uuid::new_v4();
        let claims = Claims::new(account_id, "o@example.com", Role::Owner, Duration::hours(24));

        assert_eq!(claims.sub, account_id);
        assert_eq!(claims.email, "o@example.com");
        assert_eq!(claims.role, Role::Owner);
        assert_eq!(claims.iss, "folio");
        assert!(!claims.is_expired());
    }

    #[test]
    fn test_claims_expiration_window() {
        let claims = Claims::new(
            Uuid::new_v4(),
            "v@example.com",
            Role::Visitor,
            Duration::hours(1),
        );

        let time_left = claims.time_until_expiration().unwrap();
        assert!(time_left.num_seconds() > 3500);
        assert!(time_left.num_seconds() <= 3600);
    }

    #[test]
    fn test_create_and_validate_token() {
        let account_id = Uuid::new_v4();
        let claims = Claims::new(account_id, "o@example.com", Role::Owner, Duration::hours(24));
        let token = create_token(&claims, SECRET).expect("Should create token");

        let validated = validate_token(&token, SECRET).expect("Should validate token");
        assert_eq!(validated.sub, account_id);
        assert_eq!(validated.email, "o@example.com");
        assert_eq!(validated.role, Role::Owner);
        assert_eq!(validated.iss, "folio");
    }

    #[test]
    fn test_validate_with_wrong_secret() {
        let claims = Claims::new(
            Uuid::new_v4(),
            "v@example.com",
            Role::Visitor,
            Duration::hours(1),
        );
        let token = create_token(&claims, "secret1-needs-to-be-long-enough!").unwrap();

        let result = validate_token(&token, "wrong-secret-also-long-enough!!!");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_expired_token() {
        let claims = Claims::new(
            Uuid::new_v4(),
            "v@example.com",
            Role::Visitor,
            Duration::seconds(-3600),
        );

        assert!(claims.is_expired());
        assert!(claims.time_until_expiration().is_none());

        let token = create_token(&claims, SECRET).unwrap();
        let result = validate_token(&token, SECRET);

        assert!(matches!(result.unwrap_err(), JwtError::Expired));
    }

    #[test]
    fn test_role_claim_survives_roundtrip() {
        for role in [Role::Owner, Role::Visitor] {
            let claims = Claims::new(Uuid::new_v4(), "a@example.com", role, Duration::hours(1));
            let token = create_token(&claims, SECRET).unwrap();
            let validated = validate_token(&token, SECRET).unwrap();
            assert_eq!(validated.role, role);
        }
    }
}
