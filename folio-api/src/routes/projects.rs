/// Project endpoints
///
/// # Endpoints
///
/// - `GET /api/projects` - Paginated list (public)
/// - `GET /api/projects/all` - Full list with images preloaded (public)
/// - `GET /api/projects/:id` - One project with images (public)
/// - `POST /api/projects` - Create with image uploads (owner, multipart)
/// - `DELETE /api/projects/:id` - Delete project, images, and files (owner)

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
use std::path::Path;

use folio_shared::models::project::{CreateProject, Project, ProjectWithImages};
use folio_shared::pagination::{PageQuery, Paginated};
use folio_shared::storage;
use uuid::Uuid;

/// Paginated project list (public)
///
/// The total comes from a COUNT query run before LIMIT/OFFSET, so it is the
/// dataset size regardless of the requested page.
pub async fn list_projects(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<Paginated<Project>>> {
    let pool = state.pools.pool_for(None);

    let total = Project::count(pool).await?;
    let projects = Project::list(pool, query.limit(), query.offset()).await?;

    Ok(Json(Paginated::new(projects, &query, total)))
}

/// Full project list with images preloaded (public)
pub async fn list_all_projects(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<ProjectWithImages>>> {
    let projects = Project::list_with_images(state.pools.pool_for(None)).await?;

    Ok(Json(projects))
}

/// One project with its images (public)
pub async fn get_project(
    State(state): State<AppState>,
    UrlPath(id): UrlPath<Uuid>,
) -> ApiResult<Json<ProjectWithImages>> {
    let pool = state.pools.pool_for(None);

    let project = Project::find_by_id(pool, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;
    let images = Project::images(pool, id).await?;

    Ok(Json(ProjectWithImages { project, images }))
}

/// Create-project handler (owner only)
///
/// Multipart form: text fields `name`, `description`, `project_url` plus any
/// number of image file fields. Files are saved under `uploads/projects/`
/// before the database rows are written.
///
/// # Errors
///
/// - `400 Bad Request`: Missing text fields or malformed form
pub async fn create_project(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<Project>)> {
    let mut name = None;
    let mut description = None;
    let mut project_url = None;
    let mut image_urls = Vec::new();

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

            let media_name = storage::generate_media_name("project");
            let url = format!("/uploads/projects/{}.{}", media_name, extension);

            storage::save_media(&storage::media_path(&url), &bytes)
                .await
                .map_err(|e| ApiError::InternalError(format!("Failed to store image: {}", e)))?;

            image_urls.push(url);
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Failed to read field: {}", e)))?;

        match field_name.as_str() {
            "name" => name = Some(value),
            "description" => description = Some(value),
            "project_url" => project_url = Some(value),
            _ => {}
        }
    }

    let name = name
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Missing field: name".to_string()))?;
    let description = description
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Missing field: description".to_string()))?;
    let project_url = project_url
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Missing field: project_url".to_string()))?;

    let project = Project::create(
        &state.pools.owner,
        CreateProject {
            name,
            description,
            project_url,
            image_urls,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(project)))
}

/// Delete-project handler (owner only)
///
/// Image rows and the project go in one transaction; the backing image
/// files are removed after the transaction commits, tolerating files that
/// are already gone.
pub async fn delete_project(
    State(state): State<AppState>,
    UrlPath(id): UrlPath<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    let image_urls = Project::delete(&state.pools.owner, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    for url in image_urls {
        if let Err(e) = storage::remove_media(&url).await {
            tracing::warn!(error = %e, url = %url, "Could not remove project image");
        }
    }

    Ok(Json(MessageResponse {
        message: "Project deleted".to_string(),
    }))
}
