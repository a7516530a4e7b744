use std::sync::Arc;

use cb_core::error::{AppError, Result};
use cb_core::traits::LikeRepo;
use uuid::Uuid;

/// One vote per (member, post).
#[derive(Clone)]
pub struct LikeLedger {
    likes: Arc<dyn LikeRepo>,
}

impl LikeLedger {
    pub fn new(likes: Arc<dyn LikeRepo>) -> Self {
        Self { likes }
    }

    /// The existence check only saves a write transaction for the common
    /// repeat click; `LikeRepo::add_like` still decides under concurrency.
    #[tracing::instrument(skip(self))]
    pub async fn add_like(&self, user_id: &str, post_id: Uuid) -> Result<()> {
        if self.likes.has_liked(user_id, post_id).await? {
            tracing::debug!("duplicate like rejected before write");
            return Err(AppError::AlreadyLiked {
                user_id: user_id.to_string(),
                post_id,
            });
        }

        self.likes.add_like(user_id, post_id).await?;
        tracing::info!("like recorded");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cb_core::traits::MockLikeRepo;

    #[tokio::test]
    async fn test_fast_path_skips_write() {
        let mut likes = MockLikeRepo::new();
        likes.expect_has_liked().returning(|_, _| Ok(true));
        likes.expect_add_like().never();

        let ledger = LikeLedger::new(Arc::new(likes));
        let err = ledger.add_like("bob", Uuid::now_v7()).await.unwrap_err();
        assert!(matches!(err, AppError::AlreadyLiked { .. }));
    }

    #[tokio::test]
    async fn test_storage_verdict_is_authoritative() {
        let mut likes = MockLikeRepo::new();
        likes.expect_has_liked().returning(|_, _| Ok(false));
        likes.expect_add_like().times(1).returning(|user_id, post_id| {
            Err(AppError::AlreadyLiked {
                user_id: user_id.to_string(),
                post_id,
            })
        });

        let ledger = LikeLedger::new(Arc::new(likes));
        let err = ledger.add_like("bob", Uuid::now_v7()).await.unwrap_err();
        assert!(matches!(err, AppError::AlreadyLiked { ref user_id, .. } if user_id == "bob"));
    }

    #[tokio::test]
    async fn test_first_like_is_written() {
        let mut likes = MockLikeRepo::new();
        likes.expect_has_liked().returning(|_, _| Ok(false));
        likes
            .expect_add_like()
            .withf(|user_id, _| user_id == "bob")
            .times(1)
            .returning(|_, _| Ok(()));

        let ledger = LikeLedger::new(Arc::new(likes));
        ledger.add_like("bob", Uuid::now_v7()).await.unwrap();
    }
}
