/// Project model with attached images
///
/// Image rows are application-managed children: there is no database-level
/// cascade, so deletion removes image rows before the project inside one
/// transaction and reports the backing file URLs for cleanup afterwards.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Project {
    pub id: Uuid,

    pub name: String,

    pub description: String,

    /// Link to the live project or repository
    pub project_url: String,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProjectImage {
    pub id: Uuid,

    pub project_id: Uuid,

    /// Image URL under the static uploads directory
    pub img_url: String,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// A project with its images preloaded
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectWithImages {
    #[serde(flatten)]
    pub project: Project,
    pub images: Vec<ProjectImage>,
}

/// Input for creating a project; image URLs are already saved to disk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProject {
    pub name: String,
    pub description: String,
    pub project_url: String,
    pub image_urls: Vec<String>,
}

impl Project {
    /// Creates a project and its image rows in one transaction
    pub async fn create(pool: &PgPool, data: CreateProject) -> Result<Self, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let project = sqlx::query_as::<_, Project>(
            r#"
            INSERT INTO projects (name, description, project_url)
            VALUES ($1, $2, $3)
            RETURNING id, name, description, project_url, created_at, updated_at
            "#,
        )
        .bind(data.name)
        .bind(data.description)
        .bind(data.project_url)
        .fetch_one(&mut *tx)
        .await?;

        for img_url in &data.image_urls {
            sqlx::query("INSERT INTO project_images (project_id, img_url) VALUES ($1, $2)")
                .bind(project.id)
                .bind(img_url)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        Ok(project)
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            SELECT id, name, description, project_url, created_at, updated_at
            FROM projects
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(project)
    }

    /// Images belonging to one project
    pub async fn images(pool: &PgPool, project_id: Uuid) -> Result<Vec<ProjectImage>, sqlx::Error> {
        let images = sqlx::query_as::<_, ProjectImage>(
            r#"
            SELECT id, project_id, img_url, created_at, updated_at
            FROM project_images
            WHERE project_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(project_id)
        .fetch_all(pool)
        .await?;

        Ok(images)
    }

    /// Lists every project with its images preloaded
    pub async fn list_with_images(pool: &PgPool) -> Result<Vec<ProjectWithImages>, sqlx::Error> {
        let projects = sqlx::query_as::<_, Project>(
            r#"
            SELECT id, name, description, project_url, created_at, updated_at
            FROM projects
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(pool)
        .await?;

        let mut result = Vec::with_capacity(projects.len());
        for project in projects {
            let images = Self::images(pool, project.id).await?;
            result.push(ProjectWithImages { project, images });
        }

        Ok(result)
    }

    /// One page of projects, newest first
    pub async fn list(pool: &PgPool, limit: i64, offset: i64) -> Result<Vec<Self>, sqlx::Error> {
        let projects = sqlx::query_as::<_, Project>(
            r#"
            SELECT id, name, description, project_url, created_at, updated_at
            FROM projects
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

        Ok(projects)
    }

    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM projects")
            .fetch_one(pool)
            .await?;

        Ok(count)
    }

    /// Deletes a project and its image rows in one transaction
    ///
    /// Children first, then the parent. Returns the image URLs that were
    /// attached so the caller can remove the backing files after the
    /// transaction commits, or None if the project didn't exist.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<Option<Vec<String>>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM projects WHERE id = $1)")
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        if !exists {
            return Ok(None);
        }

        let image_urls: Vec<String> =
            sqlx::query_scalar("SELECT img_url FROM project_images WHERE project_id = $1")
                .bind(id)
                .fetch_all(&mut *tx)
                .await?;

        sqlx::query("DELETE FROM project_images WHERE project_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(Some(image_urls))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_project_struct() {
        let create = CreateProject {
            name: "Portfolio Site".to_string(),
            description: "Personal site".to_string(),
            project_url: "https://example.com".to_string(),
            image_urls: vec!["/uploads/projects/a.png".to_string()],
        };

        assert_eq!(create.image_urls.len(), 1);
    }

    // Cascade-delete behavior is covered by ignored integration tests in
    // the tests/ directory.
}
