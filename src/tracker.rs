// src/tracker.rs
//! Sqlite persistence of discovered jobs, analyses and application outcomes

use anyhow::{Context, Result};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::path::Path;
use tracing::info;
use uuid::Uuid;

use crate::types::{JobAnalysis, JobPosting};

/// Best-effort run history. The orchestrator logs and ignores tracker
/// failures; nothing here may abort a run.
pub struct ApplicationTracker {
    pool: SqlitePool,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct TrackerSummary {
    pub jobs: i64,
    pub applied: i64,
    pub failed: i64,
}

impl ApplicationTracker {
    pub async fn new(database_path: &Path) -> Result<Self> {
        if let Some(parent) = database_path.parent() {
            tokio::fs::create_dir_all(parent).await.with_context(|| {
                format!("Failed to create database directory: {}", parent.display())
            })?;
        }

        let database_url = format!("sqlite:{}?mode=rwc", database_path.display());
        let pool = SqlitePool::connect(&database_url).await.with_context(|| {
            format!("Failed to connect to database: {}", database_path.display())
        })?;

        info!(
            "Application tracker database ready: {}",
            database_path.display()
        );

        let tracker = Self { pool };
        tracker.migrate().await?;
        Ok(tracker)
    }

    /// Single-connection in-memory tracker, used by tests.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .context("Failed to open in-memory database")?;

        let tracker = Self { pool };
        tracker.migrate().await?;
        Ok(tracker)
    }

    async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS jobs (
                id TEXT PRIMARY KEY,
                url TEXT NOT NULL UNIQUE,
                title TEXT NOT NULL,
                company TEXT NOT NULL,
                location TEXT NOT NULL,
                discovered_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to create jobs table")?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS analyses (
                id TEXT PRIMARY KEY,
                job_url TEXT NOT NULL,
                role TEXT NOT NULL,
                company TEXT NOT NULL,
                match_score INTEGER NOT NULL,
                analysis TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to create analyses table")?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS applications (
                id TEXT PRIMARY KEY,
                job_url TEXT NOT NULL,
                status TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to create applications table")?;

        Ok(())
    }

    pub async fn record_job(&self, posting: &JobPosting) -> Result<()> {
        sqlx::query(
            "INSERT OR IGNORE INTO jobs (id, url, title, company, location, discovered_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&posting.url)
        .bind(&posting.title)
        .bind(&posting.company)
        .bind(&posting.location)
        .bind(posting.discovered_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .context("Failed to record discovered job")?;

        Ok(())
    }

    pub async fn record_analysis(&self, job_url: &str, analysis: &JobAnalysis) -> Result<()> {
        sqlx::query(
            "INSERT INTO analyses (id, job_url, role, company, match_score, analysis, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(job_url)
        .bind(&analysis.role)
        .bind(&analysis.company)
        .bind(analysis.match_score as i64)
        .bind(&analysis.analysis)
        .bind(chrono::Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .context("Failed to record job analysis")?;

        Ok(())
    }

    pub async fn record_application(&self, job_url: &str, status: &str) -> Result<()> {
        sqlx::query(
            "INSERT INTO applications (id, job_url, status, updated_at) VALUES (?, ?, ?, ?)",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(job_url)
        .bind(status)
        .bind(chrono::Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .context("Failed to record application outcome")?;

        Ok(())
    }

    pub async fn summary(&self) -> Result<TrackerSummary> {
        let jobs = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM jobs")
            .fetch_one(&self.pool)
            .await
            .context("Failed to count jobs")?;

        let applied = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM applications WHERE status = 'applied'",
        )
        .fetch_one(&self.pool)
        .await
        .context("Failed to count applications")?;

        let failed = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM applications WHERE status = 'failed'",
        )
        .fetch_one(&self.pool)
        .await
        .context("Failed to count failed applications")?;

        Ok(TrackerSummary {
            jobs,
            applied,
            failed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analysis() -> JobAnalysis {
        serde_json::from_value(serde_json::json!({
            "role": "Senior Developer",
            "company": "Acme Corp",
            "match_score": 90,
            "analysis": "Excellent fit"
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_records_jobs_and_applications() {
        let tracker = ApplicationTracker::in_memory().await.unwrap();
        let posting = JobPosting::new(
            "https://jobs.example/1",
            "Senior Developer",
            "Acme Corp",
            "Remote",
        );

        tracker.record_job(&posting).await.unwrap();
        tracker
            .record_analysis(&posting.url, &analysis())
            .await
            .unwrap();
        tracker
            .record_application(&posting.url, "applied")
            .await
            .unwrap();

        let summary = tracker.summary().await.unwrap();
        assert_eq!(summary.jobs, 1);
        assert_eq!(summary.applied, 1);
        assert_eq!(summary.failed, 0);
    }

    #[tokio::test]
    async fn test_duplicate_job_urls_are_ignored() {
        let tracker = ApplicationTracker::in_memory().await.unwrap();
        let posting = JobPosting::new("https://jobs.example/1", "Dev", "Acme", "Remote");

        tracker.record_job(&posting).await.unwrap();
        tracker.record_job(&posting).await.unwrap();

        let summary = tracker.summary().await.unwrap();
        assert_eq!(summary.jobs, 1);
    }
}
