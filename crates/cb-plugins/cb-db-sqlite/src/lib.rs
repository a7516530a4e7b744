//! # cb-db-sqlite Implementation
//!
//! This crate implements the data mapping between the SQLite relational model
//! and the `cb-core` domain models. One `SqliteStore` implements every
//! repository port and is shared (cheaply cloned) between the services.

mod comments;
mod likes;
mod members;
mod posts;

use std::str::FromStr;
use std::time::Duration;

use cb_core::error::AppError;
use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// How long a writer waits for SQLite's write lock before giving up.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Opens (creating if missing) the database at `url` and applies migrations.
    ///
    /// # Developer Note
    /// In-memory databases live and die with their connection, so they get a
    /// single connection that is never recycled. File databases run in WAL
    /// mode so readers never block the writer.
    pub async fn new(url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(BUSY_TIMEOUT);

        let pool = if is_in_memory(url) {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await?
        } else {
            SqlitePoolOptions::new()
                .max_connections(max_connections.max(1))
                .connect_with(options.journal_mode(SqliteJournalMode::Wal))
                .await?
        };

        MIGRATOR.run(&pool).await?;
        tracing::debug!(max_connections, "sqlite store ready");

        Ok(Self { pool })
    }

    /// A private, empty database for tests and throwaway runs.
    pub async fn in_memory() -> anyhow::Result<Self> {
        Self::new("sqlite::memory:", 1).await
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn is_in_memory(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

/// Wraps an unclassified sqlx failure. Details stay in the message for logs;
/// the HTTP layer never forwards them.
pub(crate) fn storage(err: sqlx::Error) -> AppError {
    AppError::Storage(err.to_string())
}

pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

pub(crate) fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_foreign_key_violation())
}

#[cfg(test)]
pub(crate) mod test_support {
    use cb_core::models::{Member, Post};
    use cb_core::traits::{MemberRepo, PostRepo};

    use super::SqliteStore;

    pub async fn store_with_members(ids: &[&str]) -> SqliteStore {
        let store = SqliteStore::in_memory().await.unwrap();
        for id in ids {
            store
                .insert_member(Member {
                    user_id: id.to_string(),
                    credential: "pw".into(),
                    nickname: format!("nick-{id}"),
                })
                .await
                .unwrap();
        }
        store
    }

    pub async fn seed_post(store: &SqliteStore, author: &str) -> Post {
        let post = Post::new("title", "contents", author, format!("nick-{author}"));
        store.insert_post(post.clone()).await.unwrap();
        post
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_url_detection() {
        assert!(is_in_memory("sqlite::memory:"));
        assert!(is_in_memory("sqlite:file:board?mode=memory&cache=shared"));
        assert!(!is_in_memory("sqlite:community_board.db"));
    }

    #[tokio::test]
    async fn test_migrations_create_tables() {
        let store = SqliteStore::in_memory().await.unwrap();
        let tables: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE '\\_%' ESCAPE '\\' ORDER BY name",
        )
        .fetch_all(store.pool())
        .await
        .unwrap();
        assert_eq!(tables, vec!["comments", "members", "post_likes", "posts"]);
    }
}
