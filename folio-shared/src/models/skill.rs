/// Skill rows attached to the profile card
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Skill {
    pub id: Uuid,

    /// Profile card this skill belongs to
    pub about_id: Uuid,

    pub name: String,

    /// Proficiency as a percentage (0-100)
    pub ratio: i32,

    /// Years of experience
    pub experience: i32,

    /// Free-form period description, e.g. "2021 - present"
    pub period: String,

    /// Icon/logo URL
    pub img_url: String,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Input for creating a skill
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSkill {
    pub about_id: Uuid,
    pub name: String,
    pub ratio: i32,
    pub experience: i32,
    pub period: String,
    pub img_url: String,
}

impl Skill {
    /// Lists all skills, newest first
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let skills = sqlx::query_as::<_, Skill>(
            r#"
            SELECT id, about_id, name, ratio, experience, period, img_url,
                   created_at, updated_at
            FROM skills
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(skills)
    }

    pub async fn create(pool: &PgPool, data: CreateSkill) -> Result<Self, sqlx::Error> {
        let skill = sqlx::query_as::<_, Skill>(
            r#"
            INSERT INTO skills (about_id, name, ratio, experience, period, img_url)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, about_id, name, ratio, experience, period, img_url,
                      created_at, updated_at
            "#,
        )
        .bind(data.about_id)
        .bind(data.name)
        .bind(data.ratio)
        .bind(data.experience)
        .bind(data.period)
        .bind(data.img_url)
        .fetch_one(pool)
        .await?;

        Ok(skill)
    }

    /// Deletes a skill; returns false if it didn't exist
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM skills WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
