use async_trait::async_trait;
use cb_core::error::Result;
use cb_core::models::{Post, PostDetail};
use cb_core::traits::PostRepo;
use sqlx::sqlite::{SqliteConnection, SqliteRow};
use sqlx::Row;
use uuid::Uuid;

use crate::{storage, SqliteStore};

const POST_COLUMNS: &str = "id, title, contents, author_id, author_nickname, created_at, \
                            view_count, like_count, comment_count";

fn post_from_row(row: &SqliteRow) -> sqlx::Result<Post> {
    Ok(Post {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        contents: row.try_get("contents")?,
        author_id: row.try_get("author_id")?,
        author_nickname: row.try_get("author_nickname")?,
        created_at: row.try_get("created_at")?,
        view_count: row.try_get("view_count")?,
        like_count: row.try_get("like_count")?,
        comment_count: row.try_get("comment_count")?,
    })
}

/// `comment_count += 1`, evaluated by SQLite. Returns false if the post is gone.
/// Only called from inside the comment insert transaction.
pub(crate) async fn increment_comment_count(conn: &mut SqliteConnection, post_id: Uuid) -> Result<bool> {
    let result = sqlx::query("UPDATE posts SET comment_count = comment_count + 1 WHERE id = ?")
        .bind(post_id)
        .execute(&mut *conn)
        .await
        .map_err(storage)?;
    Ok(result.rows_affected() > 0)
}

/// `like_count += 1`, evaluated by SQLite. Returns false if the post is gone.
/// Only called from inside the like ledger transaction.
pub(crate) async fn increment_like_count(conn: &mut SqliteConnection, post_id: Uuid) -> Result<bool> {
    let result = sqlx::query("UPDATE posts SET like_count = like_count + 1 WHERE id = ?")
        .bind(post_id)
        .execute(&mut *conn)
        .await
        .map_err(storage)?;
    Ok(result.rows_affected() > 0)
}

#[async_trait]
impl PostRepo for SqliteStore {
    async fn list_posts(&self) -> Result<Vec<Post>> {
        let rows = sqlx::query(&format!("SELECT {POST_COLUMNS} FROM posts ORDER BY created_at ASC, id ASC"))
            .fetch_all(&self.pool)
            .await
            .map_err(storage)?;

        rows.iter().map(post_from_row).collect::<sqlx::Result<_>>().map_err(storage)
    }

    /// Bumps the view counter and reads the post back in one transaction.
    ///
    /// # Developer Note
    /// The UPDATE goes first: it takes SQLite's write lock before any read
    /// snapshot exists, so concurrent viewers queue on the busy timeout
    /// instead of failing a lock upgrade. The increment itself is computed
    /// by SQLite, never by us.
    async fn view_post(&self, id: Uuid) -> Result<Option<PostDetail>> {
        let mut tx = self.pool.begin().await.map_err(storage)?;

        let bumped = sqlx::query("UPDATE posts SET view_count = view_count + 1 WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(storage)?
            .rows_affected();
        if bumped == 0 {
            return Ok(None);
        }

        let row = sqlx::query(&format!("SELECT {POST_COLUMNS} FROM posts WHERE id = ?"))
            .bind(id)
            .fetch_one(&mut *tx)
            .await
            .map_err(storage)?;
        let post = post_from_row(&row).map_err(storage)?;

        let liker_ids: Vec<String> = sqlx::query_scalar("SELECT user_id FROM post_likes WHERE post_id = ? ORDER BY id")
            .bind(id)
            .fetch_all(&mut *tx)
            .await
            .map_err(storage)?;

        tx.commit().await.map_err(storage)?;
        Ok(Some(PostDetail { post, liker_ids }))
    }

    async fn insert_post(&self, post: Post) -> Result<()> {
        sqlx::query(
            "INSERT INTO posts (id, title, contents, author_id, author_nickname, created_at, view_count, like_count, comment_count) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(post.id)
        .bind(post.title)
        .bind(post.contents)
        .bind(post.author_id)
        .bind(post.author_nickname)
        .bind(post.created_at)
        .bind(post.view_count)
        .bind(post.like_count)
        .bind(post.comment_count)
        .execute(&self.pool)
        .await
        .map_err(storage)?;
        Ok(())
    }

    async fn update_post(&self, id: Uuid, title: &str, contents: &str) -> Result<bool> {
        let result = sqlx::query("UPDATE posts SET title = ?, contents = ? WHERE id = ?")
            .bind(title)
            .bind(contents)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(storage)?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_post(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(storage)?;
        Ok(result.rows_affected() > 0)
    }
}
