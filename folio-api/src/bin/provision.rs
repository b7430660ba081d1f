//! Database role provisioning
//!
//! Connects as a bootstrap superuser and idempotently creates the two
//! application roles with their grants:
//!
//! - the visitor role gets SELECT on the public-content tables,
//! - the owner role gets ALL on every public table except the migrations
//!   ledger.
//!
//! Safe to run repeatedly; existing roles are left as they are.
//!
//! ## Usage
//!
//! ```bash
//! DATABASE_SUPERUSER_URL=postgresql://postgres:pw@localhost/folio \
//! DB_OWNER_USER=folio_owner DB_OWNER_PASSWORD=... \
//! DB_VISITOR_USER=folio_visitor DB_VISITOR_PASSWORD=... \
//! cargo run -p folio-api --bin provision
//! ```

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Tables the visitor role may read: the public content surface. Account
/// tables, session deny-list, and quiz/practice data stay owner-only reads
/// except where listed here.
const VISITOR_READ_TABLES: &[&str] = &[
    "about",
    "skills",
    "projects",
    "project_images",
    "certificates",
    "dictionary_entries",
    "quiz_modules",
    "quiz_questions",
    "quiz_options",
    "quiz_attempts",
    "practice_sets",
    "practice_questions",
    "practice_attempts",
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "provision=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();

    let superuser_url = std::env::var("DATABASE_SUPERUSER_URL")
        .context("DATABASE_SUPERUSER_URL environment variable is required")?;

    let owner_user = std::env::var("DB_OWNER_USER").context("DB_OWNER_USER is required")?;
    let owner_password =
        std::env::var("DB_OWNER_PASSWORD").context("DB_OWNER_PASSWORD is required")?;
    let visitor_user = std::env::var("DB_VISITOR_USER").context("DB_VISITOR_USER is required")?;
    let visitor_password =
        std::env::var("DB_VISITOR_PASSWORD").context("DB_VISITOR_PASSWORD is required")?;

    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(&superuser_url)
        .await
        .context("Failed to connect as the bootstrap superuser")?;

    create_role(&pool, &owner_user, &owner_password).await?;
    create_role(&pool, &visitor_user, &visitor_password).await?;

    grant_visitor_reads(&pool, &visitor_user).await?;
    grant_owner_all(&pool, &owner_user).await?;

    tracing::info!("Provisioning complete");

    Ok(())
}

/// Creates a login role if it doesn't already exist
///
/// Role names come from configuration, not request input, so interpolating
/// them into DDL (which cannot be parameterized) is acceptable here; they
/// are still quoted as identifiers.
async fn create_role(pool: &PgPool, name: &str, password: &str) -> anyhow::Result<()> {
    let statement = format!(
        r#"
        DO $$
        BEGIN
            IF NOT EXISTS (SELECT FROM pg_roles WHERE rolname = '{name}') THEN
                CREATE USER "{name}" WITH PASSWORD '{password}';
            END IF;
        END
        $$
        "#,
        name = name,
        password = password.replace('\'', "''"),
    );

    sqlx::query(&statement)
        .execute(pool)
        .await
        .with_context(|| format!("Failed to create role {}", name))?;

    tracing::info!(role = name, "Role ensured");

    Ok(())
}

/// Grants SELECT on the public-content tables to the visitor role
async fn grant_visitor_reads(pool: &PgPool, role: &str) -> anyhow::Result<()> {
    for table in VISITOR_READ_TABLES {
        let statement = format!(r#"GRANT SELECT ON "{}" TO "{}""#, table, role);
        sqlx::query(&statement)
            .execute(pool)
            .await
            .with_context(|| format!("Failed to grant SELECT on {} to {}", table, role))?;
    }

    tracing::info!(role, tables = VISITOR_READ_TABLES.len(), "Visitor grants applied");

    Ok(())
}

/// Grants ALL on every public table except the migrations ledger to the
/// owner role
async fn grant_owner_all(pool: &PgPool, role: &str) -> anyhow::Result<()> {
    let tables: Vec<String> = sqlx::query_scalar(
        r#"
        SELECT tablename FROM pg_tables
        WHERE schemaname = 'public' AND tablename <> '_sqlx_migrations'
        "#,
    )
    .fetch_all(pool)
    .await
    .context("Failed to list public tables")?;

    for table in &tables {
        let statement = format!(r#"GRANT ALL ON "{}" TO "{}""#, table, role);
        sqlx::query(&statement)
            .execute(pool)
            .await
            .with_context(|| format!("Failed to grant ALL on {} to {}", table, role))?;
    }

    tracing::info!(role, tables = tables.len(), "Owner grants applied");

    Ok(())
}
