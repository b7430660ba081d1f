/// Profile card and skills endpoints
///
/// # Endpoints
///
/// - `GET /api/about` - Profile card (public)
/// - `GET /api/skills` - List skills (public)
/// - `POST /api/skills` - Add a skill (owner)
/// - `DELETE /api/skills/:id` - Remove a skill (owner)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    middleware::auth::AuthSession,
    routes::auth::MessageResponse,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use folio_shared::models::skill::CreateSkill;
use folio_shared::models::{About, Skill};

/// Profile card handler
///
/// Anonymous reads resolve to the visitor pool; an authenticated owner
/// reads through the owner pool. Either way the response is the same card.
pub async fn get_about(
    State(state): State<AppState>,
    session: Option<Extension<AuthSession>>,
) -> ApiResult<Json<About>> {
    let role = session.map(|Extension(s)| s.claims.role);
    let pool = state.pools.pool_for(role);

    let about = About::get(pool)
        .await?
        .ok_or_else(|| ApiError::NotFound("Profile has not been set up".to_string()))?;

    Ok(Json(about))
}

/// Skill list handler (public)
pub async fn list_skills(State(state): State<AppState>) -> ApiResult<Json<Vec<Skill>>> {
    let skills = Skill::list(state.pools.pool_for(None)).await?;

    Ok(Json(skills))
}

/// Create-skill request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateSkillRequest {
    pub about_id: Uuid,

    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,

    /// Proficiency as a percentage
    #[validate(range(min = 0, max = 100, message = "Ratio must be between 0 and 100"))]
    pub ratio: i32,

    #[validate(range(min = 0, message = "Experience cannot be negative"))]
    pub experience: i32,

    #[validate(length(min = 1, message = "Period is required"))]
    pub period: String,

    #[validate(length(min = 1, message = "Image URL is required"))]
    pub img_url: String,
}

/// Create-skill handler (owner only)
pub async fn create_skill(
    State(state): State<AppState>,
    Json(req): Json<CreateSkillRequest>,
) -> ApiResult<(StatusCode, Json<Skill>)> {
    req.validate()?;

    let skill = Skill::create(
        &state.pools.owner,
        CreateSkill {
            about_id: req.about_id,
            name: req.name,
            ratio: req.ratio,
            experience: req.experience,
            period: req.period,
            img_url: req.img_url,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(skill)))
}

/// Delete-skill handler (owner only)
pub async fn delete_skill(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    let deleted = Skill::delete(&state.pools.owner, id).await?;

    if !deleted {
        return Err(ApiError::NotFound("Skill not found".to_string()));
    }

    Ok(Json(MessageResponse {
        message: "Skill deleted".to_string(),
    }))
}
