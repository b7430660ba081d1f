/// Dictionary endpoints
///
/// # Endpoints
///
/// - `GET /api/dictionary` - Paginated list with keyword filter (public)
/// - `GET /api/dictionary/categories/:category` - All entries in a category
/// - `GET /api/dictionary/terms/:term` - Lookup by term (public)
/// - `POST /api/dictionary` - Create with video upload (owner, multipart)
/// - `DELETE /api/dictionary/:id` - Delete entry and its video (owner)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::auth::MessageResponse,
};
use axum::{
    extract::{Multipart, Path as UrlPath, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use std::path::Path;
use uuid::Uuid;

use folio_shared::models::dictionary::{CreateDictionaryEntry, DictionaryEntry};
use folio_shared::pagination::{PageQuery, Paginated};
use folio_shared::storage;

/// Query parameters for the dictionary list: pagination plus an optional
/// keyword matched case-insensitively against term and category
#[derive(Debug, Deserialize)]
pub struct DictionaryListQuery {
    #[serde(flatten)]
    pub page: PageQuery,

    pub keyword: Option<String>,
}

/// Paginated dictionary list (public)
pub async fn list_entries(
    State(state): State<AppState>,
    Query(query): Query<DictionaryListQuery>,
) -> ApiResult<Json<Paginated<DictionaryEntry>>> {
    let pool = state.pools.pool_for(None);
    let keyword = query.keyword.as_deref().filter(|k| !k.is_empty());

    let total = DictionaryEntry::count(pool, keyword).await?;
    let entries =
        DictionaryEntry::list(pool, keyword, query.page.limit(), query.page.offset()).await?;

    Ok(Json(Paginated::new(entries, &query.page, total)))
}

/// All entries in one category (public)
pub async fn list_by_category(
    State(state): State<AppState>,
    UrlPath(category): UrlPath<String>,
) -> ApiResult<Json<Vec<DictionaryEntry>>> {
    let entries = DictionaryEntry::list_by_category(state.pools.pool_for(None), &category).await?;

    Ok(Json(entries))
}

/// Lookup by term (public)
pub async fn get_by_term(
    State(state): State<AppState>,
    UrlPath(term): UrlPath<String>,
) -> ApiResult<Json<DictionaryEntry>> {
    let entry = DictionaryEntry::find_by_term(state.pools.pool_for(None), &term)
        .await?
        .ok_or_else(|| ApiError::NotFound("Term not found".to_string()))?;

    Ok(Json(entry))
}

/// Create-entry handler (owner only)
///
/// Multipart form: text fields `term`, `category` plus one video file. The
/// video is saved under `dictionary_videos/<category>/` before the row is
/// written, so the category must arrive before the file in the form.
///
/// # Errors
///
/// - `400 Bad Request`: Missing fields, or the file preceded the category
/// - `409 Conflict`: Term already exists
pub async fn create_entry(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<DictionaryEntry>)> {
    let mut term = None;
    let mut category: Option<String> = None;
    let mut video_url = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Malformed multipart body: {}", e)))?
    {
        let field_name = field.name().unwrap_or_default().to_string();

        if let Some(file_name) = field.file_name() {
            let category = category.as_deref().ok_or_else(|| {
                ApiError::BadRequest("Category must precede the video file".to_string())
            })?;

            let extension = Path::new(file_name)
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("mp4")
                .to_string();

            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::BadRequest(format!("Failed to read upload: {}", e)))?;

            let media_name = storage::generate_media_name("entry");
            let url = format!("/dictionary_videos/{}/{}.{}", category, media_name, extension);

            storage::save_media(&storage::media_path(&url), &bytes)
                .await
                .map_err(|e| ApiError::InternalError(format!("Failed to store video: {}", e)))?;

            video_url = Some(url);
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Failed to read field: {}", e)))?;

        match field_name.as_str() {
            "term" => term = Some(value),
            "category" => category = Some(value),
            _ => {}
        }
    }

    let term = term
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Missing field: term".to_string()))?;
    let category = category
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Missing field: category".to_string()))?;
    let video_url =
        video_url.ok_or_else(|| ApiError::BadRequest("Missing video file".to_string()))?;

    let entry = DictionaryEntry::create(
        &state.pools.owner,
        CreateDictionaryEntry {
            term,
            category,
            video_url,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(entry)))
}

/// Delete-entry handler (owner only)
///
/// The video file goes before the row: if removal fails for any reason
/// other than the file already being gone, the row is kept so a retry
/// still knows the URL.
pub async fn delete_entry(
    State(state): State<AppState>,
    UrlPath(id): UrlPath<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    let pool = &state.pools.owner;

    let entry = DictionaryEntry::find_by_id(pool, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Entry not found".to_string()))?;

    storage::remove_media(&entry.video_url)
        .await
        .map_err(|e| ApiError::InternalError(format!("Failed to remove entry video: {}", e)))?;

    DictionaryEntry::delete(pool, id).await?;

    Ok(Json(MessageResponse {
        message: "Entry deleted".to_string(),
    }))
}
