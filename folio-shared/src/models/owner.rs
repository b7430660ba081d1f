/// Owner account model
///
/// Exactly one owner account administers the site. Passwords are stored as
/// Argon2id hashes; the avatar URL points into the static uploads directory.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE owners (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(255) NOT NULL,
///     username VARCHAR(255) NOT NULL UNIQUE,
///     email VARCHAR(255) NOT NULL UNIQUE,
///     password_hash VARCHAR(255) NOT NULL,
///     avatar_url VARCHAR(512),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Owner {
    pub id: Uuid,

    pub name: String,

    /// Login username, unique
    pub username: String,

    /// Email address, unique
    pub email: String,

    /// Argon2id password hash, never plaintext
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Avatar URL under the static uploads directory
    pub avatar_url: Option<String>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Owner {
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let owner = sqlx::query_as::<_, Owner>(
            r#"
            SELECT id, name, username, email, password_hash, avatar_url,
                   created_at, updated_at
            FROM owners
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(owner)
    }

    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        let owner = sqlx::query_as::<_, Owner>(
            r#"
            SELECT id, name, username, email, password_hash, avatar_url,
                   created_at, updated_at
            FROM owners
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(pool)
        .await?;

        Ok(owner)
    }

    /// Replaces the stored password hash
    pub async fn update_password(
        pool: &PgPool,
        id: Uuid,
        password_hash: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE owners
            SET password_hash = $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(password_hash)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Replaces the stored password hash, addressing the account by email
    pub async fn update_password_by_email(
        pool: &PgPool,
        email: &str,
        password_hash: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE owners
            SET password_hash = $2, updated_at = NOW()
            WHERE email = $1
            "#,
        )
        .bind(email)
        .bind(password_hash)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Points the account at a new avatar URL, returning the previous one
    /// so the caller can remove the old file after the update commits
    pub async fn update_avatar(
        pool: &PgPool,
        id: Uuid,
        avatar_url: Option<&str>,
    ) -> Result<Option<String>, sqlx::Error> {
        let old: Option<Option<String>> =
            sqlx::query_scalar("SELECT avatar_url FROM owners WHERE id = $1")
                .bind(id)
                .fetch_optional(pool)
                .await?;

        sqlx::query(
            r#"
            UPDATE owners
            SET avatar_url = $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(avatar_url)
        .execute(pool)
        .await?;

        Ok(old.flatten())
    }
}
