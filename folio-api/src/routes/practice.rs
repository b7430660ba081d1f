/// Practice endpoints
///
/// Same surface as quizzes without options or videos; scores are
/// fractional because practice grading awards partial credit.
///
/// # Endpoints
///
/// - `GET /api/practice` - Paginated set list with `is_done` flags
/// - `GET /api/practice/:id` - Full set aggregate (authenticated)
/// - `POST /api/practice` - Create a set (owner)
/// - `DELETE /api/practice/:id` - Delete a set and everything under it (owner)
/// - `POST /api/practice/:id/attempts` - Submit a scored attempt (authenticated)
/// - `GET /api/practice/stats` - Caller's latest attempt per set (authenticated)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    middleware::auth::AuthSession,
    routes::auth::MessageResponse,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use folio_shared::models::practice::{
    CreatePracticeSet, PracticeAttempt, PracticeAttemptSummary, PracticeSet, PracticeSetDetail,
    PracticeSetSummary,
};
use folio_shared::pagination::{PageQuery, Paginated};

/// Paginated set list
pub async fn list_sets(
    State(state): State<AppState>,
    session: Option<Extension<AuthSession>>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<Paginated<PracticeSetSummary>>> {
    let (role, user_id) = match session {
        Some(Extension(s)) => (Some(s.claims.role), Some(s.claims.sub)),
        None => (None, None),
    };
    let pool = state.pools.pool_for(role);

    let total = PracticeSet::count(pool).await?;
    let sets = PracticeSet::list(pool, user_id, query.limit(), query.offset()).await?;

    Ok(Json(Paginated::new(sets, &query, total)))
}

/// Full set aggregate (authenticated)
pub async fn get_set(
    State(state): State<AppState>,
    Extension(session): Extension<AuthSession>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<PracticeSetDetail>> {
    let pool = state.pools.pool_for(Some(session.claims.role));

    let set = PracticeSet::find_by_id(pool, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Practice set not found".to_string()))?;

    Ok(Json(set))
}

/// Create-set request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateSetRequest {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,

    /// Prompts are upper-cased at storage time
    #[validate(length(min = 1, message = "At least one prompt is required"))]
    pub prompts: Vec<String>,
}

/// Create-set handler (owner only)
pub async fn create_set(
    State(state): State<AppState>,
    Json(req): Json<CreateSetRequest>,
) -> ApiResult<(StatusCode, Json<PracticeSet>)> {
    req.validate()?;

    let set = PracticeSet::create(
        &state.pools.owner,
        CreatePracticeSet {
            name: req.name,
            prompts: req.prompts,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(set)))
}

/// Delete-set handler (owner only)
pub async fn delete_set(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    let deleted = PracticeSet::delete(&state.pools.owner, id).await?;

    if !deleted {
        return Err(ApiError::NotFound("Practice set not found".to_string()));
    }

    Ok(Json(MessageResponse {
        message: "Practice set deleted".to_string(),
    }))
}

/// Attempt submission payload
#[derive(Debug, Deserialize, Validate)]
pub struct SubmitAttemptRequest {
    /// Fractional score, e.g. 7.5 out of 10
    #[validate(range(min = 0.0, message = "Score cannot be negative"))]
    pub score: f64,
}

/// Submit-attempt handler (authenticated)
pub async fn submit_attempt(
    State(state): State<AppState>,
    Extension(session): Extension<AuthSession>,
    Path(id): Path<Uuid>,
    Json(req): Json<SubmitAttemptRequest>,
) -> ApiResult<(StatusCode, Json<PracticeAttempt>)> {
    req.validate()?;

    let attempt = PracticeAttempt::record(&state.pools.owner, id, session.claims.sub, req.score)
        .await?
        .ok_or_else(|| ApiError::NotFound("Practice set not found".to_string()))?;

    Ok((StatusCode::CREATED, Json(attempt)))
}

/// Stats handler (authenticated)
pub async fn stats(
    State(state): State<AppState>,
    Extension(session): Extension<AuthSession>,
) -> ApiResult<Json<Vec<PracticeAttemptSummary>>> {
    let summaries =
        PracticeAttempt::latest_per_set(&state.pools.owner, session.claims.sub).await?;

    Ok(Json(summaries))
}
