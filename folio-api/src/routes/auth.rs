/// Account and session endpoints
///
/// This module provides the authentication surface:
/// - Login (owner or visitor, role-dispatched) and logout
/// - Visitor registration and Google sign-in
/// - Token verification, password change, password reset
/// - Avatar upload and removal
///
/// # Endpoints
///
/// - `POST /api/user/login` - Login, sets the session cookie
/// - `POST /api/user/register` - Register a visitor account
/// - `POST /api/user/google` - Google ID-token sign-in
/// - `POST /api/user/logout` - Revoke the session, clear cookies
/// - `GET /api/user/verify-token` - Echo the verified claims
/// - `PATCH /api/user/password` - Change password
/// - `POST /api/user/reset-request` / `reset-submit` - Password reset
/// - `POST /api/user/avatar` / `DELETE /api/user/avatar` - Avatar management

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    middleware::auth::{cookie_name, AuthSession, ADMIN_COOKIE, USER_COOKIE},
};
use axum::{
    extract::{Multipart, State},
    http::{header, HeaderMap, StatusCode},
    response::{AppendHeaders, IntoResponse},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use validator::Validate;

use folio_shared::auth::password;
use folio_shared::db::Role;
use folio_shared::models::visitor::CreateVisitor;
use folio_shared::models::{Owner, Visitor};
use folio_shared::storage;

/// Login request
///
/// The role decides which account table is consulted; omitting it defaults
/// to a visitor login.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,

    /// Account role to authenticate against
    pub role: Option<Role>,
}

/// Login response
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    /// Account ID
    pub account_id: String,

    /// Display name
    pub name: String,

    /// Account email
    pub email: String,

    /// Privilege tier
    pub role: Role,

    /// Avatar URL, when one is set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,

    /// Session token (also set as a cookie)
    pub token: String,

    /// Token expiration
    pub expires_at: DateTime<Utc>,
}

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Display name
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password (will be validated for strength)
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

/// Google sign-in request
#[derive(Debug, Deserialize)]
pub struct GoogleLoginRequest {
    /// Google-issued ID token from the frontend sign-in flow
    pub id_token: String,
}

/// Fields returned by Google's tokeninfo endpoint that we use
#[derive(Debug, Deserialize)]
struct GoogleTokenInfo {
    /// Audience: must equal the configured client id
    aud: String,

    /// Google subject id, stable per account
    sub: String,

    email: String,

    #[serde(default)]
    name: Option<String>,

    #[serde(default)]
    picture: Option<String>,
}

/// Change-password request
#[derive(Debug, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub new_password: String,
}

/// Reset-request payload: confirms the account exists before the frontend
/// proceeds to the submit step
#[derive(Debug, Deserialize, Validate)]
pub struct ResetRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    pub role: Option<Role>,
}

/// Reset-submit payload
#[derive(Debug, Deserialize, Validate)]
pub struct ResetSubmitRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub new_password: String,

    pub role: Option<Role>,
}

/// Simple message envelope for operations with no payload
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Builds the session cookie string for a successful login
fn session_cookie(name: &str, token: &str, expires_at: DateTime<Utc>, production: bool) -> String {
    let expires = expires_at.format("%a, %d %b %Y %H:%M:%S GMT");

    if production {
        format!(
            "{}={}; Path=/; HttpOnly; Expires={}; SameSite=None; Secure",
            name, token, expires
        )
    } else {
        format!(
            "{}={}; Path=/; HttpOnly; Expires={}; SameSite=Lax",
            name, token, expires
        )
    }
}

/// Builds an expired cookie that clears the session on the client
fn clear_cookie(name: &str) -> String {
    format!("{}=; Path=/; HttpOnly; Max-Age=0", name)
}

/// Login endpoint
///
/// Authenticates against the owners or visitors table depending on the
/// requested role (default: visitor), issues a session token, and sets it
/// as a cookie named for the calling frontend.
///
/// # Endpoint
///
/// ```text
/// POST /api/user/login
/// Content-Type: application/json
///
/// {
///   "email": "user@example.com",
///   "password": "SecureP@ss123",
///   "role": "OWNER"
/// }
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: Invalid credentials
/// - `400 Bad Request`: Validation failed
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    req.validate()?;

    let role = req.role.unwrap_or(Role::Visitor);

    // Account tables are only readable through the owner pool.
    let pool = &state.pools.owner;

    let (account_id, name, email, avatar_url, password_hash) = match role {
        Role::Owner => {
            let owner = Owner::find_by_email(pool, &req.email)
                .await?
                .ok_or_else(|| ApiError::Unauthorized("Invalid email or password".to_string()))?;
            (
                owner.id,
                owner.name,
                owner.email,
                owner.avatar_url,
                owner.password_hash,
            )
        }
        Role::Visitor => {
            let visitor = Visitor::find_by_email(pool, &req.email)
                .await?
                .ok_or_else(|| ApiError::Unauthorized("Invalid email or password".to_string()))?;
            (
                visitor.id,
                visitor.name,
                visitor.email,
                visitor.avatar_url,
                visitor.password_hash,
            )
        }
    };

    let valid = password::verify_password(&req.password, &password_hash)?;
    if !valid {
        return Err(ApiError::Unauthorized(
            "Invalid email or password".to_string(),
        ));
    }

    let session = state.sessions.issue(account_id, &email, role)?;
    let cookie = session_cookie(
        cookie_name(&headers),
        &session.token,
        session.expires_at,
        state.config.production,
    );

    tracing::info!(account_id = %account_id, role = role.as_str(), "Login successful");

    Ok((
        AppendHeaders([(header::SET_COOKIE, cookie)]),
        Json(SessionResponse {
            account_id: account_id.to_string(),
            name,
            email,
            role,
            avatar_url,
            token: session.token,
            expires_at: session.expires_at,
        }),
    ))
}

/// Register a new visitor account
///
/// # Errors
///
/// - `409 Conflict`: Email already exists
/// - `400 Bad Request`: Validation failed
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<Visitor>)> {
    req.validate()?;

    password::validate_password_strength(&req.password).map_err(|e| {
        ApiError::ValidationError(vec![crate::error::ValidationErrorDetail {
            field: "password".to_string(),
            message: e,
        }])
    })?;

    let password_hash = password::hash_password(&req.password)?;

    let visitor = Visitor::create(
        &state.pools.owner,
        CreateVisitor {
            name: req.name,
            email: req.email,
            password_hash,
            google_id: None,
            avatar_url: None,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(visitor)))
}

/// Google sign-in
///
/// Validates the ID token against Google's tokeninfo endpoint, checks the
/// audience matches the configured client id, then finds or creates the
/// visitor account and issues a session like a regular login.
///
/// # Errors
///
/// - `401 Unauthorized`: Token rejected by Google or wrong audience
/// - `503 Service Unavailable`: Tokeninfo endpoint unreachable
pub async fn google_login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<GoogleLoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let response = reqwest::Client::new()
        .get("https://oauth2.googleapis.com/tokeninfo")
        .query(&[("id_token", req.id_token.as_str())])
        .send()
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Tokeninfo request failed");
            ApiError::ServiceUnavailable("Could not reach the sign-in service".to_string())
        })?;

    if !response.status().is_success() {
        return Err(ApiError::Unauthorized("Invalid Google token".to_string()));
    }

    let info: GoogleTokenInfo = response.json().await.map_err(|e| {
        tracing::error!(error = %e, "Tokeninfo response malformed");
        ApiError::Unauthorized("Invalid Google token".to_string())
    })?;

    if info.aud != state.config.google_client_id {
        tracing::warn!(aud = %info.aud, "Google token with wrong audience");
        return Err(ApiError::Unauthorized("Invalid Google token".to_string()));
    }

    // Federated accounts never use the local password, but the column must
    // hold a real hash.
    let generated_hash = password::hash_password(&password::random_password())?;

    let visitor = Visitor::find_or_create_google(
        &state.pools.owner,
        &info.sub,
        &info.email,
        info.name.as_deref().unwrap_or(&info.email),
        info.picture.as_deref(),
        &generated_hash,
    )
    .await?;

    let session = state
        .sessions
        .issue(visitor.id, &visitor.email, Role::Visitor)?;
    let cookie = session_cookie(
        cookie_name(&headers),
        &session.token,
        session.expires_at,
        state.config.production,
    );

    tracing::info!(account_id = %visitor.id, "Google sign-in successful");

    Ok((
        AppendHeaders([(header::SET_COOKIE, cookie)]),
        Json(SessionResponse {
            account_id: visitor.id.to_string(),
            name: visitor.name,
            email: visitor.email,
            role: Role::Visitor,
            avatar_url: visitor.avatar_url,
            token: session.token,
            expires_at: session.expires_at,
        }),
    ))
}

/// Logout endpoint
///
/// Revokes the current token on the deny-list and clears both session
/// cookies. Idempotent: logging out twice succeeds.
pub async fn logout(
    State(state): State<AppState>,
    Extension(session): Extension<AuthSession>,
) -> ApiResult<impl IntoResponse> {
    state
        .sessions
        .revoke(&state.pools.owner, &session.token)
        .await?;

    Ok((
        AppendHeaders([
            (header::SET_COOKIE, clear_cookie(ADMIN_COOKIE)),
            (header::SET_COOKIE, clear_cookie(USER_COOKIE)),
        ]),
        Json(MessageResponse {
            message: "Logged out successfully".to_string(),
        }),
    ))
}

/// Verified-claims echo
#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub account_id: String,
    pub email: String,
    pub role: Role,
    pub expires_at: i64,
}

/// Verify-token endpoint
///
/// The auth middleware has already validated the session; this just echoes
/// the claims so frontends can restore their login state.
pub async fn verify_token(
    Extension(session): Extension<AuthSession>,
) -> Json<VerifyResponse> {
    Json(VerifyResponse {
        account_id: session.claims.sub.to_string(),
        email: session.claims.email,
        role: session.claims.role,
        expires_at: session.claims.exp,
    })
}

/// Change-password endpoint
///
/// Requires the current password; the new one must pass the strength check.
pub async fn change_password(
    State(state): State<AppState>,
    Extension(session): Extension<AuthSession>,
    Json(req): Json<ChangePasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    req.validate()?;

    password::validate_password_strength(&req.new_password).map_err(|e| {
        ApiError::ValidationError(vec![crate::error::ValidationErrorDetail {
            field: "new_password".to_string(),
            message: e,
        }])
    })?;

    let pool = &state.pools.owner;
    let account_id = session.claims.sub;

    let current_hash = match session.claims.role {
        Role::Owner => Owner::find_by_id(pool, account_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Account not found".to_string()))?
            .password_hash,
        Role::Visitor => Visitor::find_by_id(pool, account_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Account not found".to_string()))?
            .password_hash,
    };

    if !password::verify_password(&req.current_password, &current_hash)? {
        return Err(ApiError::Unauthorized(
            "Current password is incorrect".to_string(),
        ));
    }

    let new_hash = password::hash_password(&req.new_password)?;
    let updated = match session.claims.role {
        Role::Owner => Owner::update_password(pool, account_id, &new_hash).await?,
        Role::Visitor => Visitor::update_password(pool, account_id, &new_hash).await?,
    };

    if !updated {
        return Err(ApiError::NotFound("Account not found".to_string()));
    }

    Ok(Json(MessageResponse {
        message: "Password updated".to_string(),
    }))
}

/// Reset-request endpoint
///
/// First step of the reset flow: confirms an account exists for the email.
pub async fn reset_request(
    State(state): State<AppState>,
    Json(req): Json<ResetRequest>,
) -> ApiResult<Json<MessageResponse>> {
    req.validate()?;

    let pool = &state.pools.owner;
    let exists = match req.role.unwrap_or(Role::Visitor) {
        Role::Owner => Owner::find_by_email(pool, &req.email).await?.is_some(),
        Role::Visitor => Visitor::find_by_email(pool, &req.email).await?.is_some(),
    };

    if !exists {
        return Err(ApiError::NotFound("Account not found".to_string()));
    }

    Ok(Json(MessageResponse {
        message: "Account found".to_string(),
    }))
}

/// Reset-submit endpoint
///
/// Second step: replaces the password for the account with that email.
pub async fn reset_submit(
    State(state): State<AppState>,
    Json(req): Json<ResetSubmitRequest>,
) -> ApiResult<Json<MessageResponse>> {
    req.validate()?;

    password::validate_password_strength(&req.new_password).map_err(|e| {
        ApiError::ValidationError(vec![crate::error::ValidationErrorDetail {
            field: "new_password".to_string(),
            message: e,
        }])
    })?;

    let pool = &state.pools.owner;
    let new_hash = password::hash_password(&req.new_password)?;

    let updated = match req.role.unwrap_or(Role::Visitor) {
        Role::Owner => Owner::update_password_by_email(pool, &req.email, &new_hash).await?,
        Role::Visitor => {
            let visitor = Visitor::find_by_email(pool, &req.email).await?;
            match visitor {
                Some(v) => Visitor::update_password(pool, v.id, &new_hash).await?,
                None => false,
            }
        }
    };

    if !updated {
        return Err(ApiError::NotFound("Account not found".to_string()));
    }

    Ok(Json(MessageResponse {
        message: "Password reset".to_string(),
    }))
}

/// Avatar upload response
#[derive(Debug, Serialize)]
pub struct AvatarResponse {
    pub avatar_url: String,
}

/// Avatar upload endpoint
///
/// Accepts a multipart form with one file field, saves it under
/// `uploads/avatars/`, points the account at the new URL, and removes the
/// previous file (tolerating its absence).
///
/// # Errors
///
/// - `400 Bad Request`: No file field in the form
pub async fn upload_avatar(
    State(state): State<AppState>,
    Extension(session): Extension<AuthSession>,
    mut multipart: Multipart,
) -> ApiResult<Json<AvatarResponse>> {
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Malformed multipart body: {}", e)))?
    {
        if field.file_name().is_some() {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::BadRequest(format!("Failed to read upload: {}", e)))?;
            upload = Some((file_name, bytes.to_vec()));
            break;
        }
    }

    let (file_name, bytes) =
        upload.ok_or_else(|| ApiError::BadRequest("No file in upload".to_string()))?;

    let extension = Path::new(&file_name)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("bin");

    let account_id = session.claims.sub;
    let media_name = storage::generate_media_name(&account_id.to_string());
    let avatar_url = format!("/uploads/avatars/{}.{}", media_name, extension);

    storage::save_media(&storage::media_path(&avatar_url), &bytes)
        .await
        .map_err(|e| ApiError::InternalError(format!("Failed to store avatar: {}", e)))?;

    let pool = &state.pools.owner;
    let old_url = match session.claims.role {
        Role::Owner => Owner::update_avatar(pool, account_id, Some(&avatar_url)).await?,
        Role::Visitor => Visitor::update_avatar(pool, account_id, Some(&avatar_url)).await?,
    };

    if let Some(old) = old_url {
        if let Err(e) = storage::remove_media(&old).await {
            tracing::warn!(error = %e, url = %old, "Could not remove previous avatar");
        }
    }

    Ok(Json(AvatarResponse { avatar_url }))
}

/// Avatar delete endpoint
///
/// Clears the account's avatar URL and removes the backing file.
pub async fn delete_avatar(
    State(state): State<AppState>,
    Extension(session): Extension<AuthSession>,
) -> ApiResult<Json<MessageResponse>> {
    let pool = &state.pools.owner;
    let account_id = session.claims.sub;

    let old_url = match session.claims.role {
        Role::Owner => Owner::update_avatar(pool, account_id, None).await?,
        Role::Visitor => Visitor::update_avatar(pool, account_id, None).await?,
    };

    if let Some(old) = old_url {
        if let Err(e) = storage::remove_media(&old).await {
            tracing::warn!(error = %e, url = %old, "Could not remove avatar file");
        }
    }

    Ok(Json(MessageResponse {
        message: "Avatar removed".to_string(),
    }))
}
