use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

/// Creates and returns a PostgreSQL connection pool.
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    info!("Connecting to PostgreSQL...");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;

    info!("PostgreSQL connection pool established");
    Ok(pool)
}

/// Creates the `parsed_resumes` table and its owner index if missing.
pub async fn ensure_schema(pool: &PgPool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS parsed_resumes (
            id              UUID PRIMARY KEY,
            uploader        TEXT NOT NULL,
            file_name       TEXT NOT NULL,
            uploaded_at     TIMESTAMPTZ NOT NULL,
            raw_text        TEXT NOT NULL,
            extract         JSONB NOT NULL,
            score           JSONB NOT NULL,
            resume_score    INTEGER NOT NULL,
            scoring_version TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS parsed_resumes_uploader_idx ON parsed_resumes (uploader, uploaded_at DESC)",
    )
    .execute(pool)
    .await?;

    info!("Database schema ready");
    Ok(())
}
