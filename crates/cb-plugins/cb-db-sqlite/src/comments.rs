use async_trait::async_trait;
use cb_core::error::{AppError, Result};
use cb_core::models::Comment;
use cb_core::traits::CommentRepo;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use crate::posts::increment_comment_count;
use crate::{storage, SqliteStore};

const COMMENT_COLUMNS: &str =
    "id, post_id, author_id, author_nickname, parent_id, content, created_at, is_deleted";

fn comment_from_row(row: &SqliteRow) -> sqlx::Result<Comment> {
    Ok(Comment {
        id: row.try_get("id")?,
        post_id: row.try_get("post_id")?,
        author_id: row.try_get("author_id")?,
        author_nickname: row.try_get("author_nickname")?,
        parent_id: row.try_get("parent_id")?,
        content: row.try_get("content")?,
        created_at: row.try_get("created_at")?,
        is_deleted: row.try_get("is_deleted")?,
    })
}

fn comments_from_rows(rows: Vec<SqliteRow>) -> Result<Vec<Comment>> {
    rows.iter().map(comment_from_row).collect::<sqlx::Result<_>>().map_err(storage)
}

#[async_trait]
impl CommentRepo for SqliteStore {
    async fn find_comment(&self, id: Uuid) -> Result<Option<Comment>> {
        let row = sqlx::query(&format!("SELECT {COMMENT_COLUMNS} FROM comments WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage)?;

        row.as_ref().map(comment_from_row).transpose().map_err(storage)
    }

    async fn list_top_level(&self, post_id: Uuid) -> Result<Vec<Comment>> {
        let rows = sqlx::query(&format!(
            "SELECT {COMMENT_COLUMNS} FROM comments \
             WHERE post_id = ? AND parent_id IS NULL \
             ORDER BY created_at DESC, id DESC"
        ))
        .bind(post_id)
        .fetch_all(&self.pool)
        .await
        .map_err(storage)?;

        comments_from_rows(rows)
    }

    async fn list_replies(&self, post_id: Uuid) -> Result<Vec<Comment>> {
        let rows = sqlx::query(&format!(
            "SELECT {COMMENT_COLUMNS} FROM comments \
             WHERE post_id = ? AND parent_id IS NOT NULL \
             ORDER BY created_at ASC, id ASC"
        ))
        .bind(post_id)
        .fetch_all(&self.pool)
        .await
        .map_err(storage)?;

        comments_from_rows(rows)
    }

    /// Inserts the comment and bumps the post's counter atomically.
    ///
    /// # Developer Note
    /// The counter UPDATE runs first so the transaction holds the write lock
    /// from its first statement, and so a vanished post is reported as
    /// `NotFound` instead of a foreign-key fault.
    async fn insert_comment(&self, comment: Comment) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(storage)?;

        if !increment_comment_count(&mut tx, comment.post_id).await? {
            return Err(AppError::not_found("post", comment.post_id));
        }

        sqlx::query(
            "INSERT INTO comments (id, post_id, author_id, author_nickname, parent_id, content, created_at, is_deleted) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(comment.id)
        .bind(comment.post_id)
        .bind(comment.author_id)
        .bind(comment.author_nickname)
        .bind(comment.parent_id)
        .bind(comment.content)
        .bind(comment.created_at)
        .bind(comment.is_deleted)
        .execute(&mut *tx)
        .await
        .map_err(storage)?;

        tx.commit().await.map_err(storage)?;
        Ok(())
    }

    async fn soft_delete_comment(&self, id: Uuid, placeholder: &str) -> Result<bool> {
        let result = sqlx::query("UPDATE comments SET content = ?, is_deleted = 1 WHERE id = ?")
            .bind(placeholder)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(storage)?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{seed_post, store_with_members};
    use cb_core::models::DELETED_COMMENT_PLACEHOLDER;
    use cb_core::traits::PostRepo;

    #[tokio::test]
    async fn test_insert_bumps_comment_count() {
        let store = store_with_members(&["alice"]).await;
        let post = seed_post(&store, "alice").await;

        let comment = Comment::new(post.id, "alice", "nick-alice", None, "hello");
        store.insert_comment(comment.clone()).await.unwrap();

        let found = store.find_comment(comment.id).await.unwrap().unwrap();
        assert_eq!(found.content, "hello");
        assert!(found.is_top_level());
        assert_eq!(store.list_posts().await.unwrap()[0].comment_count, 1);
    }

    #[tokio::test]
    async fn test_insert_on_missing_post_writes_nothing() {
        let store = store_with_members(&["alice"]).await;
        let comment = Comment::new(Uuid::now_v7(), "alice", "nick-alice", None, "hello");

        match store.insert_comment(comment.clone()).await {
            Err(AppError::NotFound(entity, _)) => assert_eq!(entity, "post"),
            other => panic!("expected NotFound, got {other:?}"),
        }
        assert!(store.find_comment(comment.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_thread_ordering() {
        let store = store_with_members(&["alice", "bob"]).await;
        let post = seed_post(&store, "alice").await;

        let older = Comment::new(post.id, "alice", "nick-alice", None, "older");
        store.insert_comment(older.clone()).await.unwrap();
        let newer = Comment::new(post.id, "bob", "nick-bob", None, "newer");
        store.insert_comment(newer.clone()).await.unwrap();
        let reply_a = Comment::new(post.id, "bob", "nick-bob", Some(older.id), "a");
        store.insert_comment(reply_a.clone()).await.unwrap();
        let reply_b = Comment::new(post.id, "alice", "nick-alice", Some(older.id), "b");
        store.insert_comment(reply_b.clone()).await.unwrap();

        let top: Vec<Uuid> = store.list_top_level(post.id).await.unwrap().iter().map(|c| c.id).collect();
        assert_eq!(top, vec![newer.id, older.id]);

        let replies: Vec<Uuid> = store.list_replies(post.id).await.unwrap().iter().map(|c| c.id).collect();
        assert_eq!(replies, vec![reply_a.id, reply_b.id]);
    }

    #[tokio::test]
    async fn test_soft_delete_keeps_row() {
        let store = store_with_members(&["alice"]).await;
        let post = seed_post(&store, "alice").await;
        let comment = Comment::new(post.id, "alice", "nick-alice", None, "oops");
        store.insert_comment(comment.clone()).await.unwrap();

        assert!(store.soft_delete_comment(comment.id, DELETED_COMMENT_PLACEHOLDER).await.unwrap());
        assert!(!store.soft_delete_comment(Uuid::now_v7(), DELETED_COMMENT_PLACEHOLDER).await.unwrap());

        let found = store.find_comment(comment.id).await.unwrap().unwrap();
        assert!(found.is_deleted);
        assert_eq!(found.content, DELETED_COMMENT_PLACEHOLDER);
        assert_eq!(store.list_posts().await.unwrap()[0].comment_count, 1);
    }

    #[tokio::test]
    async fn test_deleting_post_cascades_to_comments() {
        let store = store_with_members(&["alice"]).await;
        let post = seed_post(&store, "alice").await;
        let comment = Comment::new(post.id, "alice", "nick-alice", None, "bye");
        store.insert_comment(comment.clone()).await.unwrap();

        assert!(store.delete_post(post.id).await.unwrap());
        assert!(store.find_comment(comment.id).await.unwrap().is_none());
    }
}
