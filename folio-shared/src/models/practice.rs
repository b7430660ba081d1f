/// Practice sets, questions, and scored attempts
///
/// Same shape as quizzes without options or videos: a set owns questions,
/// attempts record a visitor's score per set. Prompts are upper-cased at
/// storage time.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PracticeSet {
    pub id: Uuid,

    pub name: String,

    /// Number of questions, derived from the creation payload
    pub total_questions: i32,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PracticeQuestion {
    pub id: Uuid,

    pub set_id: Uuid,

    /// The prompt to reproduce, upper-cased at storage time
    pub prompt: String,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PracticeAttempt {
    pub id: Uuid,

    pub set_id: Uuid,

    pub user_id: Uuid,

    /// Fractional score (practice grading is partial-credit)
    pub score: f64,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Input for creating a practice set with its prompts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePracticeSet {
    pub name: String,
    pub prompts: Vec<String>,
}

/// Set summary for listings: includes whether the caller has an attempt
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PracticeSetSummary {
    pub id: Uuid,
    pub name: String,
    pub total_questions: i32,
    pub is_done: bool,
}

/// Full set aggregate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PracticeSetDetail {
    #[serde(flatten)]
    pub set: PracticeSet,
    pub questions: Vec<PracticeQuestion>,
}

/// Attempt summary joined with its set, for per-user stats
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PracticeAttemptSummary {
    pub id: Uuid,
    pub set_id: Uuid,
    pub set_name: String,
    pub total_questions: i32,
    pub score: f64,
    pub created_at: DateTime<Utc>,
}

impl PracticeSet {
    /// Creates a set and its questions in one transaction
    ///
    /// Prompts are upper-cased before storage.
    pub async fn create(pool: &PgPool, data: CreatePracticeSet) -> Result<Self, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let set = sqlx::query_as::<_, PracticeSet>(
            r#"
            INSERT INTO practice_sets (name, total_questions)
            VALUES ($1, $2)
            RETURNING id, name, total_questions, created_at, updated_at
            "#,
        )
        .bind(&data.name)
        .bind(data.prompts.len() as i32)
        .fetch_one(&mut *tx)
        .await?;

        for prompt in &data.prompts {
            sqlx::query("INSERT INTO practice_questions (set_id, prompt) VALUES ($1, $2)")
                .bind(set.id)
                .bind(prompt.to_uppercase())
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        Ok(set)
    }

    /// One page of sets with the caller's completion flag
    pub async fn list(
        pool: &PgPool,
        user_id: Option<Uuid>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<PracticeSetSummary>, sqlx::Error> {
        let summaries = sqlx::query_as::<_, PracticeSetSummary>(
            r#"
            SELECT s.id, s.name, s.total_questions,
                   EXISTS (
                       SELECT 1 FROM practice_attempts a
                       WHERE a.set_id = s.id AND a.user_id = $1
                   ) AS is_done
            FROM practice_sets s
            ORDER BY s.created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

        Ok(summaries)
    }

    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM practice_sets")
            .fetch_one(pool)
            .await?;

        Ok(count)
    }

    /// Fetches the full aggregate: set plus questions
    pub async fn find_by_id(
        pool: &PgPool,
        id: Uuid,
    ) -> Result<Option<PracticeSetDetail>, sqlx::Error> {
        let set = sqlx::query_as::<_, PracticeSet>(
            r#"
            SELECT id, name, total_questions, created_at, updated_at
            FROM practice_sets
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        let Some(set) = set else {
            return Ok(None);
        };

        let questions = sqlx::query_as::<_, PracticeQuestion>(
            r#"
            SELECT id, set_id, prompt, created_at, updated_at
            FROM practice_questions
            WHERE set_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(id)
        .fetch_all(pool)
        .await?;

        Ok(Some(PracticeSetDetail { set, questions }))
    }

    /// Deletes a set and everything under it in one transaction
    ///
    /// Ordered children-first: questions, attempts, then the set.
    /// Returns false if the set didn't exist.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM practice_sets WHERE id = $1)")
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;

        if !exists {
            return Ok(false);
        }

        sqlx::query("DELETE FROM practice_questions WHERE set_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM practice_attempts WHERE set_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM practice_sets WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(true)
    }
}

impl PracticeAttempt {
    /// Records a scored attempt; returns None if the set doesn't exist
    pub async fn record(
        pool: &PgPool,
        set_id: Uuid,
        user_id: Uuid,
        score: f64,
    ) -> Result<Option<Self>, sqlx::Error> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM practice_sets WHERE id = $1)")
                .bind(set_id)
                .fetch_one(pool)
                .await?;

        if !exists {
            return Ok(None);
        }

        let attempt = sqlx::query_as::<_, PracticeAttempt>(
            r#"
            INSERT INTO practice_attempts (set_id, user_id, score)
            VALUES ($1, $2, $3)
            RETURNING id, set_id, user_id, score, created_at, updated_at
            "#,
        )
        .bind(set_id)
        .bind(user_id)
        .bind(score)
        .fetch_one(pool)
        .await?;

        Ok(Some(attempt))
    }

    /// The caller's most recent attempt per set, newest first
    pub async fn latest_per_set(
        pool: &PgPool,
        user_id: Uuid,
    ) -> Result<Vec<PracticeAttemptSummary>, sqlx::Error> {
        let summaries = sqlx::query_as::<_, PracticeAttemptSummary>(
            r#"
            SELECT latest.id, latest.set_id, s.name AS set_name,
                   s.total_questions, latest.score, latest.created_at
            FROM (
                SELECT DISTINCT ON (set_id) id, set_id, score, created_at
                FROM practice_attempts
                WHERE user_id = $1
                ORDER BY set_id, created_at DESC
            ) latest
            JOIN practice_sets s ON s.id = latest.set_id
            ORDER BY latest.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(summaries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_normalization() {
        let data = CreatePracticeSet {
            name: "Set 1".to_string(),
            prompts: vec!["ayam goreng".to_string()],
        };

        let normalized: Vec<String> = data.prompts.iter().map(|p| p.to_uppercase()).collect();
        assert_eq!(normalized, vec!["AYAM GORENG".to_string()]);
    }

    // Transactional create/delete behavior is covered by ignored
    // integration tests in the tests/ directory.
}
