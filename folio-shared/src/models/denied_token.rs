/// Deny-list of revoked session tokens
///
/// Logging out does not invalidate a signed JWT by itself; the token is
/// recorded here and every verification checks the table after the
/// signature check. Rows past their expiration are useless (the signature
/// check already rejects the token) and are purged periodically.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE denied_tokens (
///     token TEXT PRIMARY KEY,
///     expires_at TIMESTAMPTZ NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
use chrono::{DateTime, Utc};
use sqlx::PgPool;

/// A revoked token, held until its natural expiration
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DeniedToken {
    /// The full encoded token string
    pub token: String,

    /// When the token would have expired on its own
    pub expires_at: DateTime<Utc>,

    /// When the token was revoked
    pub created_at: DateTime<Utc>,
}

impl DeniedToken {
    /// Records a token as revoked
    ///
    /// Idempotent: revoking the same token twice is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub async fn insert(
        pool: &PgPool,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO denied_tokens (token, expires_at)
            VALUES ($1, $2)
            ON CONFLICT (token) DO NOTHING
            "#,
        )
        .bind(token)
        .bind(expires_at)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Checks whether a token has been revoked
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup fails.
    pub async fn contains(pool: &PgPool, token: &str) -> Result<bool, sqlx::Error> {
        let denied: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM denied_tokens WHERE token = $1)")
                .bind(token)
                .fetch_one(pool)
                .await?;

        Ok(denied)
    }

    /// Removes entries whose tokens have expired on their own
    ///
    /// Returns the number of rows removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub async fn purge_expired(pool: &PgPool) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM denied_tokens WHERE expires_at < NOW()")
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    // Deny-list operations require a running database; integration tests
    // live in the tests/ directory.
}
