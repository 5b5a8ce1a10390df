use async_trait::async_trait;
use chrono::Utc;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};

use crate::error::Result;
use crate::metadata::MetadataStore;
use crate::models::{FileRecord, HealthCheck};

/// Database connection pool wrapper
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Create a new database connection
    pub async fn new(path: &str) -> Result<Self> {
        // Create database URL
        let url = format!("sqlite:{}?mode=rwc", path);

        // Create connection pool
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&url)
            .await?;

        Ok(Self { pool })
    }

    /// Run database migrations
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS files (
                id TEXT PRIMARY KEY,
                file_name TEXT NOT NULL,
                url TEXT NOT NULL,
                upload_date TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS health_checks (
                check_id INTEGER PRIMARY KEY AUTOINCREMENT,
                checked_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        tracing::info!("Database migrations completed");
        Ok(())
    }
}

#[async_trait]
impl MetadataStore for Database {
    async fn create_file(&self, record: &FileRecord) -> Result<()> {
        sqlx::query("INSERT INTO files (id, file_name, url, upload_date) VALUES (?, ?, ?, ?)")
            .bind(&record.id)
            .bind(&record.file_name)
            .bind(&record.url)
            .bind(&record.upload_date)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn find_file(&self, id: &str) -> Result<Option<FileRecord>> {
        let file: Option<FileRecord> =
            sqlx::query_as("SELECT id, file_name, url, upload_date FROM files WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(file)
    }

    async fn delete_file(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM files WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn record_health_check(&self) -> Result<HealthCheck> {
        let check: HealthCheck = sqlx::query_as(
            "INSERT INTO health_checks (checked_at) VALUES (?) RETURNING check_id, checked_at",
        )
        .bind(Utc::now().to_rfc3339())
        .fetch_one(&self.pool)
        .await?;
        Ok(check)
    }
}
