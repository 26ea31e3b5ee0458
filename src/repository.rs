use crate::models::{Reply, Thread};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, types::Json};
use std::{collections::HashMap, sync::Arc};
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

/// RepositoryError
///
/// Infrastructure failures of a store. "Not found" is not an error here: lookups
/// return `Option` and mutations report whether anything matched.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Repository Trait
///
/// The document store contract for threads and their embedded replies. Handlers only
/// see `Arc<dyn Repository>`, so tests can swap the Postgres store for the in-memory one
/// or for a hand-written stub.
///
/// Every mutation is a single store operation. In particular `add_reply` appends the
/// reply and bumps the thread together, so concurrent replies to one thread cannot
/// overwrite each other.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Threads ---
    async fn create_thread(&self, thread: Thread) -> Result<Thread, RepositoryError>;
    // Most recently bumped first.
    async fn get_recent_threads(&self, board: &str, limit: i64) -> Result<Vec<Thread>, RepositoryError>;
    async fn get_thread(&self, board: &str, id: Uuid) -> Result<Option<Thread>, RepositoryError>;
    // Returns false when no thread matched.
    async fn report_thread(&self, board: &str, id: Uuid) -> Result<bool, RepositoryError>;
    // Removes the thread together with its replies.
    async fn delete_thread(&self, board: &str, id: Uuid) -> Result<bool, RepositoryError>;

    // --- Replies ---
    // Appends `reply` and sets `bumped_on` to its `created_on`. False when the thread is missing.
    async fn add_reply(&self, board: &str, thread_id: Uuid, reply: Reply) -> Result<bool, RepositoryError>;
    async fn report_reply(&self, board: &str, thread_id: Uuid, reply_id: Uuid) -> Result<bool, RepositoryError>;
    // Overwrites the reply's text, keeping its slot in the thread.
    async fn replace_reply_text(
        &self,
        board: &str,
        thread_id: Uuid,
        reply_id: Uuid,
        text: &str,
    ) -> Result<bool, RepositoryError>;
}

/// RepositoryState
///
/// The concrete type used to share the store across the application state.
pub type RepositoryState = Arc<dyn Repository>;

const THREAD_COLUMNS: &str =
    "id, board, text, created_on, bumped_on, reported, delete_password, replies";

/// PostgresRepository
///
/// Stores one row per thread. The reply sequence is an embedded JSONB array, which keeps
/// a thread and its replies a single document: one row to delete, one row to update.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Applies the embedded migrations (the `threads` table and its board index).
    pub async fn migrate(&self) -> Result<(), RepositoryError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    async fn create_thread(&self, thread: Thread) -> Result<Thread, RepositoryError> {
        let query = format!(
            "INSERT INTO threads ({THREAD_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {THREAD_COLUMNS}"
        );

        let created = sqlx::query_as::<_, Thread>(&query)
            .bind(thread.id)
            .bind(&thread.board)
            .bind(&thread.text)
            .bind(thread.created_on)
            .bind(thread.bumped_on)
            .bind(thread.reported)
            .bind(&thread.delete_password)
            .bind(Json(&thread.replies))
            .fetch_one(&self.pool)
            .await?;

        Ok(created)
    }

    /// get_recent_threads
    ///
    /// Served by the `(board, bumped_on DESC)` index.
    async fn get_recent_threads(&self, board: &str, limit: i64) -> Result<Vec<Thread>, RepositoryError> {
        let query = format!(
            "SELECT {THREAD_COLUMNS} FROM threads WHERE board = $1 ORDER BY bumped_on DESC, created_on DESC LIMIT $2"
        );

        let threads = sqlx::query_as::<_, Thread>(&query)
            .bind(board)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(threads)
    }

    async fn get_thread(&self, board: &str, id: Uuid) -> Result<Option<Thread>, RepositoryError> {
        let query = format!("SELECT {THREAD_COLUMNS} FROM threads WHERE board = $1 AND id = $2");

        let thread = sqlx::query_as::<_, Thread>(&query)
            .bind(board)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(thread)
    }

    async fn report_thread(&self, board: &str, id: Uuid) -> Result<bool, RepositoryError> {
        let result = sqlx::query("UPDATE threads SET reported = true WHERE board = $1 AND id = $2")
            .bind(board)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_thread(&self, board: &str, id: Uuid) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM threads WHERE board = $1 AND id = $2")
            .bind(board)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// add_reply
    ///
    /// Append and bump happen in the same UPDATE, so the row lock serializes concurrent
    /// replies. `GREATEST` keeps `bumped_on` monotonic if clocks disagree.
    async fn add_reply(&self, board: &str, thread_id: Uuid, reply: Reply) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE threads
            SET replies = replies || jsonb_build_array($3::jsonb),
                bumped_on = GREATEST(bumped_on, $4)
            WHERE board = $1 AND id = $2
            "#,
        )
        .bind(board)
        .bind(thread_id)
        .bind(Json(&reply))
        .bind(reply.created_on)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn report_reply(&self, board: &str, thread_id: Uuid, reply_id: Uuid) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE threads
            SET replies = COALESCE((
                SELECT jsonb_agg(
                    CASE WHEN elem->>'_id' = $3
                         THEN jsonb_set(elem, '{reported}', 'true'::jsonb)
                         ELSE elem END
                    ORDER BY position)
                FROM jsonb_array_elements(replies) WITH ORDINALITY AS r(elem, position)
            ), '[]'::jsonb)
            WHERE board = $1 AND id = $2
              AND replies @> jsonb_build_array(jsonb_build_object('_id', $3::text))
            "#,
        )
        .bind(board)
        .bind(thread_id)
        .bind(reply_id.to_string())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn replace_reply_text(
        &self,
        board: &str,
        thread_id: Uuid,
        reply_id: Uuid,
        text: &str,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE threads
            SET replies = COALESCE((
                SELECT jsonb_agg(
                    CASE WHEN elem->>'_id' = $3
                         THEN jsonb_set(elem, '{text}', to_jsonb($4::text))
                         ELSE elem END
                    ORDER BY position)
                FROM jsonb_array_elements(replies) WITH ORDINALITY AS r(elem, position)
            ), '[]'::jsonb)
            WHERE board = $1 AND id = $2
              AND replies @> jsonb_build_array(jsonb_build_object('_id', $3::text))
            "#,
        )
        .bind(board)
        .bind(thread_id)
        .bind(reply_id.to_string())
        .bind(text)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// InMemoryRepository
///
/// A process-local store behind one `RwLock`. Used by the test suite and by local runs
/// started without a `DATABASE_URL`. Each mutation holds the write lock for its whole
/// duration, which gives the same single-operation semantics as the Postgres store.
#[derive(Default)]
pub struct InMemoryRepository {
    threads: RwLock<HashMap<Uuid, Thread>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn bump(current: DateTime<Utc>, candidate: DateTime<Utc>) -> DateTime<Utc> {
    current.max(candidate)
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn create_thread(&self, thread: Thread) -> Result<Thread, RepositoryError> {
        self.threads.write().await.insert(thread.id, thread.clone());
        Ok(thread)
    }

    async fn get_recent_threads(&self, board: &str, limit: i64) -> Result<Vec<Thread>, RepositoryError> {
        let threads = self.threads.read().await;

        let mut matching: Vec<Thread> = threads
            .values()
            .filter(|thread| thread.board == board)
            .cloned()
            .collect();
        matching.sort_by(|a, b| {
            b.bumped_on
                .cmp(&a.bumped_on)
                .then_with(|| b.created_on.cmp(&a.created_on))
        });
        matching.truncate(usize::try_from(limit).unwrap_or(0));

        Ok(matching)
    }

    async fn get_thread(&self, board: &str, id: Uuid) -> Result<Option<Thread>, RepositoryError> {
        let threads = self.threads.read().await;
        Ok(threads.get(&id).filter(|thread| thread.board == board).cloned())
    }

    async fn report_thread(&self, board: &str, id: Uuid) -> Result<bool, RepositoryError> {
        let mut threads = self.threads.write().await;
        match threads.get_mut(&id).filter(|thread| thread.board == board) {
            Some(thread) => {
                thread.reported = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_thread(&self, board: &str, id: Uuid) -> Result<bool, RepositoryError> {
        let mut threads = self.threads.write().await;
        if threads.get(&id).is_some_and(|thread| thread.board == board) {
            threads.remove(&id);
            return Ok(true);
        }
        Ok(false)
    }

    async fn add_reply(&self, board: &str, thread_id: Uuid, reply: Reply) -> Result<bool, RepositoryError> {
        let mut threads = self.threads.write().await;
        match threads.get_mut(&thread_id).filter(|thread| thread.board == board) {
            Some(thread) => {
                thread.bumped_on = bump(thread.bumped_on, reply.created_on);
                thread.replies.push(reply);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn report_reply(&self, board: &str, thread_id: Uuid, reply_id: Uuid) -> Result<bool, RepositoryError> {
        let mut threads = self.threads.write().await;
        let reply = threads
            .get_mut(&thread_id)
            .filter(|thread| thread.board == board)
            .and_then(|thread| thread.replies.iter_mut().find(|reply| reply.id == reply_id));

        match reply {
            Some(reply) => {
                reply.reported = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn replace_reply_text(
        &self,
        board: &str,
        thread_id: Uuid,
        reply_id: Uuid,
        text: &str,
    ) -> Result<bool, RepositoryError> {
        let mut threads = self.threads.write().await;
        let reply = threads
            .get_mut(&thread_id)
            .filter(|thread| thread.board == board)
            .and_then(|thread| thread.replies.iter_mut().find(|reply| reply.id == reply_id));

        match reply {
            Some(reply) => {
                reply.text = text.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
