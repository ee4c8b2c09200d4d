//! PostgreSQL backend.
//!
//! The only fully featured backend: enforces original-URL uniqueness,
//! supports per-owner listing, and owns the asynchronous deletion pipeline.
//! Uniqueness stays with the database; the application takes no locks around
//! the insert.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::Row;

use super::delete::{DeleteQueue, DeleteQueueConfig, TombstoneSink};
use super::models::{StoreStats, UserUrl};
use super::UrlStorage;
use crate::errors::{Result, ShortenerError};

const MAX_CONNECTIONS: u32 = 8;

pub struct PostgresStorage {
    pool: PgPool,
    delete_queue: DeleteQueue,
}

impl PostgresStorage {
    /// Connect, apply pending migrations, and start the deletion workers.
    /// Any failure here is fatal to startup.
    pub async fn connect(dsn: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect(dsn)
            .await
            .map_err(|e| {
                ShortenerError::storage(format!("failed to connect to postgres: {}", e))
            })?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| ShortenerError::storage(format!("migration failed: {}", e)))?;

        let sink = Arc::new(PgTombstoneSink { pool: pool.clone() });
        let delete_queue = DeleteQueue::start(sink, DeleteQueueConfig::default());

        Ok(Self { pool, delete_queue })
    }

    async fn find_by_original_url(&self, original_url: &str) -> Result<String> {
        let row = sqlx::query("SELECT short_code FROM shortened_urls WHERE original_url = $1")
            .bind(original_url)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(row.get("short_code")),
            None => Err(ShortenerError::not_found("url is not mapped")),
        }
    }
}

#[async_trait]
impl UrlStorage for PostgresStorage {
    async fn store(&self, short_code: &str, original_url: &str, owner_id: &str) -> Result<()> {
        let result = sqlx::query(
            "INSERT INTO shortened_urls (short_code, original_url, owner_id, created_at) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(short_code)
        .bind(original_url)
        .bind(owner_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                // Recover the code the URL is already mapped to. A miss means
                // the violation was on the short code itself, which the
                // service's pre-check should have made unreachable.
                match self.find_by_original_url(original_url).await {
                    Ok(existing_code) => Err(ShortenerError::Conflict { existing_code }),
                    Err(ShortenerError::NotFound(_)) => Err(ShortenerError::storage(format!(
                        "short code collision on insert: {}",
                        short_code
                    ))),
                    Err(e) => Err(e),
                }
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn get(&self, short_code: &str) -> Result<String> {
        let row = sqlx::query(
            "SELECT original_url, is_deleted FROM shortened_urls WHERE short_code = $1",
        )
        .bind(short_code)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Err(ShortenerError::not_found(short_code));
        };

        if row.get::<bool, _>("is_deleted") {
            return Err(ShortenerError::gone(short_code));
        }
        Ok(row.get("original_url"))
    }

    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<UserUrl>> {
        let rows = sqlx::query(
            "SELECT short_code, original_url FROM shortened_urls \
             WHERE owner_id = $1 ORDER BY created_at DESC",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| UserUrl {
                short_url: row.get("short_code"),
                original_url: row.get("original_url"),
            })
            .collect())
    }

    fn delete_batch(&self, owner_id: &str, short_codes: Vec<String>) {
        self.delete_queue.enqueue(owner_id, short_codes);
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn stats(&self) -> Result<StoreStats> {
        let urls: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM shortened_urls WHERE is_deleted = false")
                .fetch_one(&self.pool)
                .await?;
        let users: i64 = sqlx::query_scalar("SELECT COUNT(DISTINCT owner_id) FROM shortened_urls")
            .fetch_one(&self.pool)
            .await?;

        Ok(StoreStats { urls, users })
    }

    async fn close(&self) -> Result<()> {
        // Stop accepting tasks and wait for the workers to drain before the
        // pool goes away underneath them.
        self.delete_queue.shutdown().await;
        self.pool.close().await;
        Ok(())
    }
}

/// Bulk tombstone writer used by the deletion workers.
struct PgTombstoneSink {
    pool: PgPool,
}

#[async_trait]
impl TombstoneSink for PgTombstoneSink {
    async fn apply_tombstones(&self, owner_id: &str, short_codes: &[String]) -> Result<u64> {
        if short_codes.is_empty() {
            return Ok(0);
        }

        let result = sqlx::query(
            "UPDATE shortened_urls SET is_deleted = true \
             WHERE owner_id = $1 AND short_code = ANY($2) AND is_deleted = false",
        )
        .bind(owner_id)
        .bind(short_codes)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
