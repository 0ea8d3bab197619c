//! SQLite storage backend implementation
//!
//! Persists feedback in a single append-only table and answers aggregate
//! queries directly in SQL. Uses rusqlite behind a deadpool connection
//! pool so blocking database work never runs on the async runtime.

use crate::error::{PhemeError, Result};
use crate::storage::FeedbackStore;
use crate::types::{FeedbackId, FeedbackRecord, FeedbackStats, NewFeedback};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use deadpool_sqlite::{Config, Pool, Runtime};
use rusqlite::params;
use std::path::Path;
use tracing::{debug, info};

/// Rounds to 2 decimal places for the stats aggregate
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// SQLite storage backend with connection pooling
pub struct SqliteStorage {
    pool: Pool,
}

impl SqliteStorage {
    /// Open (or create) the database at the given path
    ///
    /// The parent directory is created if it does not exist. Call
    /// [`init_schema`](Self::init_schema) once before serving requests.
    pub fn open<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let path = db_path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let path_str = path.to_string_lossy().to_string();
        info!("Opening SQLite database: {}", path_str);

        let config = Config::new(path_str);
        let pool = config
            .create_pool(Runtime::Tokio1)
            .map_err(|e| PhemeError::Database(format!("Failed to create connection pool: {}", e)))?;

        Ok(Self { pool })
    }

    /// Create the feedback table and indexes
    ///
    /// Safe to call at every startup (uses IF NOT EXISTS). The rating
    /// range is enforced by a CHECK constraint in addition to the
    /// validator, so no out-of-range value can be persisted.
    pub async fn init_schema(&self) -> Result<()> {
        debug!("Ensuring feedback schema exists");

        let conn = self.pool.get().await.map_err(|e| {
            PhemeError::Database(format!("Failed to get connection from pool: {}", e))
        })?;
        conn.interact(|conn| -> rusqlite::Result<()> {
            // WAL is persistent at the database level: readers are never
            // blocked by the single writer. The pragma returns the
            // resulting mode as a row, so query_row instead of execute.
            let _mode: String =
                conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))?;

            conn.execute_batch(
                r#"
                CREATE TABLE IF NOT EXISTS feedback (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL,
                    email TEXT NOT NULL,
                    message TEXT NOT NULL,
                    rating INTEGER NOT NULL CHECK(rating >= 1 AND rating <= 5),
                    created_at TEXT NOT NULL
                );
                CREATE INDEX IF NOT EXISTS idx_feedback_created_at
                    ON feedback(created_at);
                "#,
            )?;

            Ok(())
        })
        .await
        .map_err(|e| PhemeError::Database(format!("Pool interaction failed: {}", e)))??;

        info!("Feedback schema ready");
        Ok(())
    }
}

/// Convert a database row to a FeedbackRecord
///
/// `created_at` is stored as RFC 3339 TEXT and parsed back to UTC.
fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<FeedbackRecord> {
    let created_at_str: String = row.get("created_at")?;
    let created_at = DateTime::parse_from_rfc3339(&created_at_str)
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, Box::new(e))
        })?
        .with_timezone(&Utc);

    Ok(FeedbackRecord {
        id: FeedbackId(row.get("id")?),
        name: row.get("name")?,
        email: row.get("email")?,
        message: row.get("message")?,
        rating: row.get("rating")?,
        created_at,
    })
}

#[async_trait]
impl FeedbackStore for SqliteStorage {
    async fn insert(&self, feedback: &NewFeedback) -> Result<FeedbackRecord> {
        debug!("Storing feedback from: {}", feedback.name);

        let new = feedback.clone();
        let created_at = Utc::now();

        let conn = self.pool.get().await.map_err(|e| {
            PhemeError::Database(format!("Failed to get connection from pool: {}", e))
        })?;
        let record = conn
            .interact(move |conn| -> rusqlite::Result<FeedbackRecord> {
                // Single statement on one connection keeps the insert atomic
                conn.execute(
                    r#"
                    INSERT INTO feedback (name, email, message, rating, created_at)
                    VALUES (?1, ?2, ?3, ?4, ?5)
                    "#,
                    params![
                        new.name,
                        new.email,
                        new.message,
                        new.rating,
                        created_at.to_rfc3339(),
                    ],
                )?;

                Ok(FeedbackRecord {
                    id: FeedbackId(conn.last_insert_rowid()),
                    name: new.name,
                    email: new.email,
                    message: new.message,
                    rating: new.rating,
                    created_at,
                })
            })
            .await
            .map_err(|e| PhemeError::Database(format!("Pool interaction failed: {}", e)))??;

        debug!("Feedback stored with id: {}", record.id);
        Ok(record)
    }

    async fn list_all(&self) -> Result<Vec<FeedbackRecord>> {
        let conn = self.pool.get().await.map_err(|e| {
            PhemeError::Database(format!("Failed to get connection from pool: {}", e))
        })?;
        let records = conn
            .interact(|conn| -> rusqlite::Result<Vec<FeedbackRecord>> {
                // id DESC breaks ties between same-second inserts
                let mut stmt = conn.prepare(
                    r#"
                    SELECT id, name, email, message, rating, created_at
                    FROM feedback
                    ORDER BY created_at DESC, id DESC
                    "#,
                )?;

                let rows = stmt.query_map([], |row| row_to_record(row))?;
                rows.collect()
            })
            .await
            .map_err(|e| PhemeError::Database(format!("Pool interaction failed: {}", e)))??;

        debug!("Listed {} feedback records", records.len());
        Ok(records)
    }

    async fn stats(&self) -> Result<FeedbackStats> {
        let conn = self.pool.get().await.map_err(|e| {
            PhemeError::Database(format!("Failed to get connection from pool: {}", e))
        })?;
        let stats = conn
            .interact(|conn| -> rusqlite::Result<FeedbackStats> {
                conn.query_row(
                    r#"
                    SELECT
                        COUNT(*) AS total,
                        AVG(rating) AS avg_rating,
                        SUM(CASE WHEN rating >= 4 THEN 1 ELSE 0 END) AS positive,
                        SUM(CASE WHEN rating < 3 THEN 1 ELSE 0 END) AS negative
                    FROM feedback
                    "#,
                    [],
                    |row| {
                        let avg: Option<f64> = row.get("avg_rating")?;
                        let positive: Option<i64> = row.get("positive")?;
                        let negative: Option<i64> = row.get("negative")?;

                        Ok(FeedbackStats {
                            total: row.get("total")?,
                            avg_rating: avg.map(round2).unwrap_or(0.0),
                            positive: positive.unwrap_or(0),
                            negative: negative.unwrap_or(0),
                        })
                    },
                )
            })
            .await
            .map_err(|e| PhemeError::Database(format!("Pool interaction failed: {}", e)))??;

        Ok(stats)
    }
}
