/// Certificate model
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Certificate {
    pub id: Uuid,

    pub name: String,

    /// Scan/photo of the certificate, under the static uploads directory
    pub img_url: String,

    /// External verification link
    pub credential_url: String,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Input for creating a certificate; the image is already saved to disk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCertificate {
    pub name: String,
    pub img_url: String,
    pub credential_url: String,
}

impl Certificate {
    pub async fn create(pool: &PgPool, data: CreateCertificate) -> Result<Self, sqlx::Error> {
        let certificate = sqlx::query_as::<_, Certificate>(
            r#"
            INSERT INTO certificates (name, img_url, credential_url)
            VALUES ($1, $2, $3)
            RETURNING id, name, img_url, credential_url, created_at, updated_at
            "#,
        )
        .bind(data.name)
        .bind(data.img_url)
        .bind(data.credential_url)
        .fetch_one(pool)
        .await?;

        Ok(certificate)
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let certificate = sqlx::query_as::<_, Certificate>(
            r#"
            SELECT id, name, img_url, credential_url, created_at, updated_at
            FROM certificates
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(certificate)
    }

    /// One page of certificates, newest first
    pub async fn list(pool: &PgPool, limit: i64, offset: i64) -> Result<Vec<Self>, sqlx::Error> {
        let certificates = sqlx::query_as::<_, Certificate>(
            r#"
            SELECT id, name, img_url, credential_url, created_at, updated_at
            FROM certificates
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

        Ok(certificates)
    }

    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM certificates")
            .fetch_one(pool)
            .await?;

        Ok(count)
    }

    /// Deletes a certificate, returning its image URL for file cleanup,
    /// or None if it didn't exist
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<Option<String>, sqlx::Error> {
        let img_url: Option<String> =
            sqlx::query_scalar("DELETE FROM certificates WHERE id = $1 RETURNING img_url")
                .bind(id)
                .fetch_optional(pool)
                .await?;

        Ok(img_url)
    }
}
