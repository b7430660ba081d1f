/// About card shown on the public profile page
///
/// A single-row table in practice; the site owner maintains one card and
/// visitors read it anonymously.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct About {
    pub id: Uuid,

    /// Display name
    pub name: String,

    /// Student identification number
    pub student_id: String,

    pub major: String,

    pub faculty: String,

    pub biography: String,

    pub slogan: String,

    /// Portrait image URL, served from the static uploads directory
    pub img_url: String,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl About {
    /// Fetches the profile card, if one has been created
    pub async fn get(pool: &PgPool) -> Result<Option<Self>, sqlx::Error> {
        let about = sqlx::query_as::<_, About>(
            r#"
            SELECT id, name, student_id, major, faculty, biography, slogan, img_url,
                   created_at, updated_at
            FROM about
            ORDER BY created_at
            LIMIT 1
            "#,
        )
        .fetch_optional(pool)
        .await?;

        Ok(about)
    }
}
