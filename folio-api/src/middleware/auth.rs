/// Authentication middleware
///
/// Session tokens arrive either in a cookie or in a bearer header. The
/// cookie name depends on which frontend is calling, signalled by the
/// `X-Frontend` header: the admin dashboard uses `token_admin`, everything
/// else `token_user`. When both a cookie and a header are present the
/// cookie wins.
///
/// Three extraction variants cover the route surface:
/// - `require_owner`: valid session with the owner role, else 401
/// - `require_auth`: any valid session, else 401
/// - `optional_auth`: best effort; failures degrade to anonymous
///
/// A separate basic-auth gate protects the login and reset endpoints.

use crate::app::AppState;
use crate::error::ApiError;
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use sha2::{Digest, Sha256};

use folio_shared::auth::Claims;
use folio_shared::db::Role;

/// Cookie used by the admin frontend
pub const ADMIN_COOKIE: &str = "token_admin";

/// Cookie used by the public frontend
pub const USER_COOKIE: &str = "token_user";

/// Verified session attached to the request extensions
#[derive(Debug, Clone)]
pub struct AuthSession {
    /// The raw token, needed again at logout to revoke it
    pub token: String,

    /// Verified claims
    pub claims: Claims,
}

/// Picks the session cookie name from the `X-Frontend` header
pub fn cookie_name(headers: &HeaderMap) -> &'static str {
    match headers.get("X-Frontend").and_then(|v| v.to_str().ok()) {
        Some("admin") => ADMIN_COOKIE,
        _ => USER_COOKIE,
    }
}

/// Reads one cookie value out of the `Cookie` header
fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    let raw = headers.get(header::COOKIE)?.to_str().ok()?;

    raw.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        if key == name && !value.is_empty() {
            Some(value.to_string())
        } else {
            None
        }
    })
}

/// Reads a bearer token from the `Authorization` or `Auth` header
fn bearer_value(headers: &HeaderMap) -> Option<String> {
    let raw = headers
        .get(header::AUTHORIZATION)
        .or_else(|| headers.get("Auth"))?
        .to_str()
        .ok()?;

    match raw.split_once(' ') {
        Some(("Bearer", token)) if !token.is_empty() => Some(token.to_string()),
        _ => None,
    }
}

/// Extracts the session token: cookie first, then bearer header
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    cookie_value(headers, cookie_name(headers)).or_else(|| bearer_value(headers))
}

async fn verify_session(state: &AppState, headers: &HeaderMap) -> Result<AuthSession, ApiError> {
    let token = extract_token(headers)
        .ok_or_else(|| ApiError::Unauthorized("Missing session token".to_string()))?;

    // The deny-list is only readable by the owner role.
    let claims = state.sessions.verify(&state.pools.owner, &token).await?;

    Ok(AuthSession { token, claims })
}

/// Requires a valid session with the owner role
pub async fn require_owner(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let session = verify_session(&state, request.headers()).await?;

    if session.claims.role != Role::Owner {
        return Err(ApiError::Unauthorized(
            "Owner privileges required".to_string(),
        ));
    }

    request.extensions_mut().insert(session);
    Ok(next.run(request).await)
}

/// Requires any valid session
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let session = verify_session(&state, request.headers()).await?;

    request.extensions_mut().insert(session);
    Ok(next.run(request).await)
}

/// Attaches a session when one is present and valid; anonymous otherwise
pub async fn optional_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    if let Ok(session) = verify_session(&state, request.headers()).await {
        request.extensions_mut().insert(session);
    }

    next.run(request).await
}

fn digest_eq(a: &str, b: &str) -> bool {
    // Comparing fixed-size digests instead of the raw strings keeps the
    // comparison length-independent of the supplied credential.
    let a = Sha256::digest(a.as_bytes());
    let b = Sha256::digest(b.as_bytes());

    a == b
}

/// Basic-auth gate for the login and reset endpoints
pub async fn basic_auth(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let supplied = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|raw| raw.strip_prefix("Basic "))
        .and_then(decode_basic)
        .ok_or_else(|| ApiError::Unauthorized("Missing credentials".to_string()))?;

    let (username, password) = supplied;
    let expected = &state.config.basic_auth;

    if !digest_eq(&username, &expected.username) || !digest_eq(&password, &expected.password) {
        return Err(ApiError::Unauthorized("Invalid credentials".to_string()));
    }

    Ok(next.run(request).await)
}

/// Decodes a base64 `user:pass` basic-auth payload
fn decode_basic(encoded: &str) -> Option<(String, String)> {
    let bytes = STANDARD.decode(encoded).ok()?;
    let decoded = String::from_utf8(bytes).ok()?;
    let (username, password) = decoded.split_once(':')?;

    Some((username.to_string(), password.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(
                axum::http::HeaderName::from_bytes(name.as_bytes()).expect("Valid header name"),
                HeaderValue::from_str(value).expect("Valid header value"),
            );
        }
        map
    }

    #[test]
    fn test_cookie_name_follows_frontend_header() {
        assert_eq!(cookie_name(&headers(&[("X-Frontend", "admin")])), ADMIN_COOKIE);
        assert_eq!(cookie_name(&headers(&[("X-Frontend", "web")])), USER_COOKIE);
        assert_eq!(cookie_name(&headers(&[])), USER_COOKIE);
    }

    #[test]
    fn test_cookie_wins_over_bearer() {
        let map = headers(&[
            ("Cookie", "token_user=cookie-token; other=1"),
            ("Authorization", "Bearer header-token"),
        ]);

        assert_eq!(extract_token(&map), Some("cookie-token".to_string()));
    }

    #[test]
    fn test_bearer_fallback() {
        let map = headers(&[("Authorization", "Bearer header-token")]);
        assert_eq!(extract_token(&map), Some("header-token".to_string()));

        let map = headers(&[("Auth", "Bearer alt-token")]);
        assert_eq!(extract_token(&map), Some("alt-token".to_string()));
    }

    #[test]
    fn test_admin_frontend_reads_admin_cookie() {
        let map = headers(&[
            ("X-Frontend", "admin"),
            ("Cookie", "token_user=user-token; token_admin=admin-token"),
        ]);

        assert_eq!(extract_token(&map), Some("admin-token".to_string()));
    }

    #[test]
    fn test_missing_token() {
        let map = headers(&[("Cookie", "unrelated=1")]);
        assert_eq!(extract_token(&map), None);

        let map = headers(&[("Authorization", "Bearer")]);
        assert_eq!(extract_token(&map), None);
    }

    #[test]
    fn test_decode_basic() {
        // "gate:secret"
        assert_eq!(
            decode_basic("Z2F0ZTpzZWNyZXQ="),
            Some(("gate".to_string(), "secret".to_string()))
        );
        assert_eq!(decode_basic("!!!"), None);
    }

    #[test]
    fn test_digest_eq() {
        assert!(digest_eq("secret", "secret"));
        assert!(!digest_eq("secret", "Secret"));
    }
}
