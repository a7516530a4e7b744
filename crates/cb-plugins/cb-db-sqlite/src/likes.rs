use async_trait::async_trait;
use cb_core::error::{AppError, Result};
use cb_core::traits::LikeRepo;
use chrono::Utc;
use uuid::Uuid;

use crate::posts::increment_like_count;
use crate::{is_foreign_key_violation, is_unique_violation, storage, SqliteStore};

#[async_trait]
impl LikeRepo for SqliteStore {
    async fn has_liked(&self, user_id: &str, post_id: Uuid) -> Result<bool> {
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM post_likes WHERE user_id = ? AND post_id = ?)")
            .bind(user_id)
            .bind(post_id)
            .fetch_one(&self.pool)
            .await
            .map_err(storage)
    }

    /// Atomic like: counter and ledger row commit together or not at all.
    ///
    /// # Developer Note
    /// Two racing calls for the same pair both reach the INSERT; the loser
    /// waits on the write lock, then hits the UNIQUE constraint and rolls its
    /// counter bump back. That violation is the real duplicate check.
    async fn add_like(&self, user_id: &str, post_id: Uuid) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(storage)?;

        if !increment_like_count(&mut tx, post_id).await? {
            tx.rollback().await.map_err(storage)?;
            return Err(AppError::not_found("post", post_id));
        }

        let inserted = sqlx::query("INSERT INTO post_likes (user_id, post_id, created_at) VALUES (?, ?, ?)")
            .bind(user_id)
            .bind(post_id)
            .bind(Utc::now())
            .execute(&mut *tx)
            .await;

        match inserted {
            Ok(_) => {
                tx.commit().await.map_err(storage)?;
                Ok(())
            }
            Err(e) if is_unique_violation(&e) => {
                tx.rollback().await.map_err(storage)?;
                Err(AppError::AlreadyLiked {
                    user_id: user_id.to_string(),
                    post_id,
                })
            }
            Err(e) if is_foreign_key_violation(&e) => {
                tx.rollback().await.map_err(storage)?;
                Err(AppError::not_found("member", user_id))
            }
            // Dropping the transaction rolls the counter back.
            Err(e) => Err(storage(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{seed_post, store_with_members};
    use cb_core::traits::PostRepo;

    #[tokio::test]
    async fn test_second_like_is_rejected() {
        let store = store_with_members(&["alice", "bob"]).await;
        let post = seed_post(&store, "alice").await;

        store.add_like("bob", post.id).await.unwrap();
        assert!(store.has_liked("bob", post.id).await.unwrap());
        assert!(!store.has_liked("alice", post.id).await.unwrap());

        match store.add_like("bob", post.id).await {
            Err(AppError::AlreadyLiked { user_id, .. }) => assert_eq!(user_id, "bob"),
            other => panic!("expected AlreadyLiked, got {other:?}"),
        }

        let detail = store.view_post(post.id).await.unwrap().unwrap();
        assert_eq!(detail.post.like_count, 1);
        assert_eq!(detail.liker_ids, vec!["bob".to_string()]);
    }

    #[tokio::test]
    async fn test_unknown_member_rolls_back_counter() {
        let store = store_with_members(&["alice"]).await;
        let post = seed_post(&store, "alice").await;

        match store.add_like("ghost", post.id).await {
            Err(AppError::NotFound(entity, id)) => {
                assert_eq!(entity, "member");
                assert_eq!(id, "ghost");
            }
            other => panic!("expected NotFound, got {other:?}"),
        }
        assert_eq!(store.list_posts().await.unwrap()[0].like_count, 0);
    }

    #[tokio::test]
    async fn test_like_on_missing_post() {
        let store = store_with_members(&["alice"]).await;
        let result = store.add_like("alice", Uuid::now_v7()).await;
        assert!(matches!(result, Err(AppError::NotFound(entity, _)) if entity == "post"));
    }
}
