/// Quiz endpoints
///
/// # Endpoints
///
/// - `GET /api/quizzes` - Paginated module list with `is_done` flags
/// - `GET /api/quizzes/:id` - Full module aggregate (authenticated)
/// - `POST /api/quizzes` - Create a module (owner)
/// - `DELETE /api/quizzes/:id` - Delete a module and everything under it (owner)
/// - `POST /api/quizzes/:id/attempts` - Submit a scored attempt (authenticated)
/// - `GET /api/quizzes/stats` - Caller's latest attempt per module (authenticated)

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
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use folio_shared::models::quiz::{
    CreateQuizModule, QuizAttempt, QuizAttemptSummary, QuizModule, QuizModuleDetail,
    QuizModuleSummary,
};
use folio_shared::pagination::{PageQuery, Paginated};

/// Paginated module list
///
/// `is_done` reflects whether the calling account has at least one attempt
/// on each module; anonymous callers get `false` everywhere.
pub async fn list_modules(
    State(state): State<AppState>,
    session: Option<Extension<AuthSession>>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<Paginated<QuizModuleSummary>>> {
    let (role, user_id) = match session {
        Some(Extension(s)) => (Some(s.claims.role), Some(s.claims.sub)),
        None => (None, None),
    };
    let pool = state.pools.pool_for(role);

    let total = QuizModule::count(pool).await?;
    let modules = QuizModule::list(pool, user_id, query.limit(), query.offset()).await?;

    Ok(Json(Paginated::new(modules, &query, total)))
}

/// Full module aggregate (authenticated)
pub async fn get_module(
    State(state): State<AppState>,
    Extension(session): Extension<AuthSession>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<QuizModuleDetail>> {
    let pool = state.pools.pool_for(Some(session.claims.role));

    let module = QuizModule::find_by_id(pool, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Quiz module not found".to_string()))?;

    Ok(Json(module))
}

/// Create-module request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateModuleRequest {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,

    /// Time limit in minutes
    #[validate(range(min = 1, message = "Time limit must be at least 1 minute"))]
    pub time_limit: i32,

    #[validate(length(min = 1, message = "At least one question is required"))]
    pub questions: Vec<CreateQuestionRequest>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct CreateQuestionRequest {
    pub question: String,

    /// Must match a dictionary term; the question inherits its video
    pub answer: String,

    pub options: Vec<CreateOptionRequest>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct CreateOptionRequest {
    pub label: String,
    pub text: String,
}

/// Create-module handler (owner only)
///
/// Runs in one transaction: answers are title-cased and resolved against
/// the dictionary (inheriting each entry's video URL), option labels are
/// upper-cased, option text title-cased, and `total_questions` is derived
/// from the payload.
///
/// # Errors
///
/// - `404 Not Found`: An answer doesn't match any dictionary term
pub async fn create_module(
    State(state): State<AppState>,
    Json(req): Json<CreateModuleRequest>,
) -> ApiResult<(StatusCode, Json<QuizModule>)> {
    req.validate()?;

    let data = CreateQuizModule {
        name: req.name,
        time_limit: req.time_limit,
        questions: req
            .questions
            .into_iter()
            .map(|q| folio_shared::models::quiz::CreateQuizQuestion {
                question: q.question,
                answer: q.answer,
                options: q
                    .options
                    .into_iter()
                    .map(|o| folio_shared::models::quiz::CreateQuizOption {
                        label: o.label,
                        text: o.text,
                    })
                    .collect(),
            })
            .collect(),
    };

    let module = QuizModule::create(&state.pools.owner, data).await?;

    Ok((StatusCode::CREATED, Json(module)))
}

/// Delete-module handler (owner only)
///
/// Options, questions, and attempts go before the module, all in one
/// transaction.
pub async fn delete_module(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    let deleted = QuizModule::delete(&state.pools.owner, id).await?;

    if !deleted {
        return Err(ApiError::NotFound("Quiz module not found".to_string()));
    }

    Ok(Json(MessageResponse {
        message: "Quiz module deleted".to_string(),
    }))
}

/// Attempt submission payload
#[derive(Debug, Deserialize, Validate)]
pub struct SubmitAttemptRequest {
    #[validate(range(min = 0, message = "Score cannot be negative"))]
    pub score: i32,
}

/// Submit-attempt handler (authenticated)
///
/// Attempts are written through the owner pool regardless of the caller's
/// tier: visitors may not write anywhere else, and this is the one table
/// they produce rows in.
pub async fn submit_attempt(
    State(state): State<AppState>,
    Extension(session): Extension<AuthSession>,
    Path(id): Path<Uuid>,
    Json(req): Json<SubmitAttemptRequest>,
) -> ApiResult<(StatusCode, Json<QuizAttempt>)> {
    req.validate()?;

    let attempt = QuizAttempt::record(&state.pools.owner, id, session.claims.sub, req.score)
        .await?
        .ok_or_else(|| ApiError::NotFound("Quiz module not found".to_string()))?;

    Ok((StatusCode::CREATED, Json(attempt)))
}

/// Stats handler (authenticated)
///
/// Returns the caller's most recent attempt per module, newest first.
pub async fn stats(
    State(state): State<AppState>,
    Extension(session): Extension<AuthSession>,
) -> ApiResult<Json<Vec<QuizAttemptSummary>>> {
    let summaries =
        QuizAttempt::latest_per_module(&state.pools.owner, session.claims.sub).await?;

    Ok(Json(summaries))
}
