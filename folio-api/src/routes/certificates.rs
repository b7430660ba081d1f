/// Certificate endpoints
///
/// # Endpoints
///
/// - `GET /api/certificates` - Paginated list (public, optional auth)
/// - `GET /api/certificates/:id` - One certificate (public)
/// - `POST /api/certificates` - Create with image upload (owner, multipart)
/// - `DELETE /api/certificates/:id` - Delete certificate and image (owner)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    middleware::auth::AuthSession,
    routes::auth::MessageResponse,
};
use axum::{
    extract::{Multipart, Path as UrlPath, Query, State},
    http::StatusCode,
    Extension, Json,
};
use std::path::Path;
use uuid::Uuid;

use folio_shared::models::certificate::{Certificate, CreateCertificate};
use folio_shared::pagination::{PageQuery, Paginated};
use folio_shared::storage;

/// Paginated certificate list
///
/// Anonymous callers read through the visitor pool; a logged-in owner
/// reads through the owner pool.
pub async fn list_certificates(
    State(state): State<AppState>,
    session: Option<Extension<AuthSession>>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<Paginated<Certificate>>> {
    let role = session.map(|Extension(s)| s.claims.role);
    let pool = state.pools.pool_for(role);

    let total = Certificate::count(pool).await?;
    let certificates = Certificate::list(pool, query.limit(), query.offset()).await?;

    Ok(Json(Paginated::new(certificates, &query, total)))
}

/// One certificate (public)
pub async fn get_certificate(
    State(state): State<AppState>,
    UrlPath(id): UrlPath<Uuid>,
) -> ApiResult<Json<Certificate>> {
    let certificate = Certificate::find_by_id(state.pools.pool_for(None), id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Certificate not found".to_string()))?;

    Ok(Json(certificate))
}

/// Create-certificate handler (owner only)
///
/// Multipart form: text fields `name`, `credential_url` plus one image
/// file. The image is saved under `uploads/certificates/` first.
pub async fn create_certificate(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<Certificate>)> {
    let mut name = None;
    let mut credential_url = None;
    let mut img_url = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Malformed multipart body: {}", e)))?
    {
        let field_name = field.name().unwrap_or_default().to_string();

        if let Some(file_name) = field.file_name() {
            let extension = Path::new(file_name)
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("bin")
                .to_string();

            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::BadRequest(format!("Failed to read upload: {}", e)))?;

            let media_name = storage::generate_media_name("certificate");
            let url = format!("/uploads/certificates/{}.{}", media_name, extension);

            storage::save_media(&storage::media_path(&url), &bytes)
                .await
                .map_err(|e| ApiError::InternalError(format!("Failed to store image: {}", e)))?;

            img_url = Some(url);
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Failed to read field: {}", e)))?;

        match field_name.as_str() {
            "name" => name = Some(value),
            "credential_url" => credential_url = Some(value),
            _ => {}
        }
    }

    let name = name
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Missing field: name".to_string()))?;
    let credential_url = credential_url
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Missing field: credential_url".to_string()))?;
    let img_url =
        img_url.ok_or_else(|| ApiError::BadRequest("Missing certificate image".to_string()))?;

    let certificate = Certificate::create(
        &state.pools.owner,
        CreateCertificate {
            name,
            img_url,
            credential_url,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(certificate)))
}

/// Delete-certificate handler (owner only)
///
/// Removes the row first, then the backing image file, tolerating a file
/// that is already gone.
pub async fn delete_certificate(
    State(state): State<AppState>,
    UrlPath(id): UrlPath<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    let img_url = Certificate::delete(&state.pools.owner, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Certificate not found".to_string()))?;

    if let Err(e) = storage::remove_media(&img_url).await {
        tracing::warn!(error = %e, url = %img_url, "Could not remove certificate image");
    }

    Ok(Json(MessageResponse {
        message: "Certificate deleted".to_string(),
    }))
}
