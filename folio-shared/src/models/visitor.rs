/// Visitor account model
///
/// Visitors take quizzes and practice sets. Accounts come from local
/// registration or Google sign-in; the latter stores a random generated
/// password so the credential column is never empty, and records the
/// Google subject id so repeat sign-ins reuse the same row.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE visitors (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(255) NOT NULL,
///     email VARCHAR(255) NOT NULL UNIQUE,
///     password_hash VARCHAR(255) NOT NULL,
///     google_id VARCHAR(255),
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
pub struct Visitor {
    pub id: Uuid,

    pub name: String,

    /// Email address, unique
    pub email: String,

    /// Argon2id password hash; a generated random credential for accounts
    /// created through Google sign-in
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Google subject id, set for federated accounts
    pub google_id: Option<String>,

    pub avatar_url: Option<String>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Input for creating a visitor account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateVisitor {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub google_id: Option<String>,
    pub avatar_url: Option<String>,
}

impl Visitor {
    /// Creates a new visitor account
    ///
    /// # Errors
    ///
    /// A duplicate email surfaces as a unique-constraint violation; the API
    /// layer maps it to a conflict response.
    pub async fn create(pool: &PgPool, data: CreateVisitor) -> Result<Self, sqlx::Error> {
        let visitor = sqlx::query_as::<_, Visitor>(
            r#"
            INSERT INTO visitors (name, email, password_hash, google_id, avatar_url)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, email, password_hash, google_id, avatar_url,
                      created_at, updated_at
            "#,
        )
        .bind(data.name)
        .bind(data.email)
        .bind(data.password_hash)
        .bind(data.google_id)
        .bind(data.avatar_url)
        .fetch_one(pool)
        .await?;

        Ok(visitor)
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let visitor = sqlx::query_as::<_, Visitor>(
            r#"
            SELECT id, name, email, password_hash, google_id, avatar_url,
                   created_at, updated_at
            FROM visitors
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(visitor)
    }

    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        let visitor = sqlx::query_as::<_, Visitor>(
            r#"
            SELECT id, name, email, password_hash, google_id, avatar_url,
                   created_at, updated_at
            FROM visitors
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(pool)
        .await?;

        Ok(visitor)
    }

    /// Replaces the stored password hash
    pub async fn update_password(
        pool: &PgPool,
        id: Uuid,
        password_hash: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE visitors
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

    /// Points the account at a new avatar URL, returning the previous one
    pub async fn update_avatar(
        pool: &PgPool,
        id: Uuid,
        avatar_url: Option<&str>,
    ) -> Result<Option<String>, sqlx::Error> {
        let old: Option<Option<String>> =
            sqlx::query_scalar("SELECT avatar_url FROM visitors WHERE id = $1")
                .bind(id)
                .fetch_optional(pool)
                .await?;

        sqlx::query(
            r#"
            UPDATE visitors
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

    /// Finds the account for a Google sign-in, creating one on first use
    ///
    /// Matches by Google subject id first, then by email (linking the
    /// Google id onto an existing local account), and finally creates a
    /// fresh account with a generated password hash.
    pub async fn find_or_create_google(
        pool: &PgPool,
        google_id: &str,
        email: &str,
        name: &str,
        avatar_url: Option<&str>,
        generated_password_hash: &str,
    ) -> Result<Self, sqlx::Error> {
        if let Some(visitor) = sqlx::query_as::<_, Visitor>(
            r#"
            SELECT id, name, email, password_hash, google_id, avatar_url,
                   created_at, updated_at
            FROM visitors
            WHERE google_id = $1
            "#,
        )
        .bind(google_id)
        .fetch_optional(pool)
        .await?
        {
            return Ok(visitor);
        }

        if let Some(existing) = Self::find_by_email(pool, email).await? {
            let linked = sqlx::query_as::<_, Visitor>(
                r#"
                UPDATE visitors
                SET google_id = $2, updated_at = NOW()
                WHERE id = $1
                RETURNING id, name, email, password_hash, google_id, avatar_url,
                          created_at, updated_at
                "#,
            )
            .bind(existing.id)
            .bind(google_id)
            .fetch_one(pool)
            .await?;

            return Ok(linked);
        }

        Self::create(
            pool,
            CreateVisitor {
                name: name.to_string(),
                email: email.to_string(),
                password_hash: generated_password_hash.to_string(),
                google_id: Some(google_id.to_string()),
                avatar_url: avatar_url.map(str::to_string),
            },
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_visitor_struct() {
        let create = CreateVisitor {
            name: "Test Visitor".to_string(),
            email: "visitor@example.com".to_string(),
            password_hash: "$argon2id$...".to_string(),
            google_id: None,
            avatar_url: None,
        };

        assert_eq!(create.email, "visitor@example.com");
        assert!(create.google_id.is_none());
    }

    // Integration tests for database operations are in the tests/ directory
}
