/// Dictionary of terms with attached instructional videos
///
/// Terms are unique; quiz creation depends on that to resolve each answer
/// to its entry and inherit the video URL.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE dictionary_entries (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     term VARCHAR(255) NOT NULL UNIQUE,
///     category VARCHAR(255) NOT NULL,
///     video_url TEXT NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct DictionaryEntry {
    pub id: Uuid,

    /// The term itself, unique across the dictionary
    pub term: String,

    pub category: String,

    /// Instructional video, served from the dictionary videos directory
    pub video_url: String,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Input for creating an entry; the video is already saved to disk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDictionaryEntry {
    pub term: String,
    pub category: String,
    pub video_url: String,
}

impl DictionaryEntry {
    /// Creates a new entry
    ///
    /// # Errors
    ///
    /// A duplicate term surfaces as a unique-constraint violation; the API
    /// layer maps it to a conflict response.
    pub async fn create(pool: &PgPool, data: CreateDictionaryEntry) -> Result<Self, sqlx::Error> {
        let entry = sqlx::query_as::<_, DictionaryEntry>(
            r#"
            INSERT INTO dictionary_entries (term, category, video_url)
            VALUES ($1, $2, $3)
            RETURNING id, term, category, video_url, created_at, updated_at
            "#,
        )
        .bind(data.term)
        .bind(data.category)
        .bind(data.video_url)
        .fetch_one(pool)
        .await?;

        Ok(entry)
    }

    /// All entries in one category
    pub async fn list_by_category(
        pool: &PgPool,
        category: &str,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let entries = sqlx::query_as::<_, DictionaryEntry>(
            r#"
            SELECT id, term, category, video_url, created_at, updated_at
            FROM dictionary_entries
            WHERE category = $1
            ORDER BY term
            "#,
        )
        .bind(category)
        .fetch_all(pool)
        .await?;

        Ok(entries)
    }

    /// One page of entries, optionally filtered by a keyword matched
    /// case-insensitively against term and category
    pub async fn list(
        pool: &PgPool,
        keyword: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let pattern = keyword.map(|k| format!("%{}%", k));

        let entries = sqlx::query_as::<_, DictionaryEntry>(
            r#"
            SELECT id, term, category, video_url, created_at, updated_at
            FROM dictionary_entries
            WHERE $1::text IS NULL OR term ILIKE $1 OR category ILIKE $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(pattern)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

        Ok(entries)
    }

    /// Total entries matching the same keyword filter as [`Self::list`]
    pub async fn count(pool: &PgPool, keyword: Option<&str>) -> Result<i64, sqlx::Error> {
        let pattern = keyword.map(|k| format!("%{}%", k));

        let (count,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*)
            FROM dictionary_entries
            WHERE $1::text IS NULL OR term ILIKE $1 OR category ILIKE $1
            "#,
        )
        .bind(pattern)
        .fetch_one(pool)
        .await?;

        Ok(count)
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let entry = sqlx::query_as::<_, DictionaryEntry>(
            r#"
            SELECT id, term, category, video_url, created_at, updated_at
            FROM dictionary_entries
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(entry)
    }

    pub async fn find_by_term(pool: &PgPool, term: &str) -> Result<Option<Self>, sqlx::Error> {
        let entry = sqlx::query_as::<_, DictionaryEntry>(
            r#"
            SELECT id, term, category, video_url, created_at, updated_at
            FROM dictionary_entries
            WHERE term = $1
            "#,
        )
        .bind(term)
        .fetch_optional(pool)
        .await?;

        Ok(entry)
    }

    /// Term lookup inside an open transaction, used by quiz creation
    pub async fn find_by_term_tx(
        tx: &mut Transaction<'_, Postgres>,
        term: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let entry = sqlx::query_as::<_, DictionaryEntry>(
            r#"
            SELECT id, term, category, video_url, created_at, updated_at
            FROM dictionary_entries
            WHERE term = $1
            "#,
        )
        .bind(term)
        .fetch_optional(&mut **tx)
        .await?;

        Ok(entry)
    }

    /// Deletes an entry, returning its video URL for file cleanup,
    /// or None if it didn't exist
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<Option<String>, sqlx::Error> {
        let video_url: Option<String> =
            sqlx::query_scalar("DELETE FROM dictionary_entries WHERE id = $1 RETURNING video_url")
                .bind(id)
                .fetch_optional(pool)
                .await?;

        Ok(video_url)
    }
}
