use std::sync::Arc;

use cb_core::error::{AppError, Result};
use cb_core::models::{Post, PostDetail};
use cb_core::traits::PostRepo;
use uuid::Uuid;

use crate::identity::IdentityLookup;

/// CRUD over posts. Counters are only ever changed by storage-side
/// increments; nothing here computes a new counter value.
#[derive(Clone)]
pub struct PostStore {
    posts: Arc<dyn PostRepo>,
    identity: IdentityLookup,
}

impl PostStore {
    pub fn new(posts: Arc<dyn PostRepo>, identity: IdentityLookup) -> Self {
        Self { posts, identity }
    }

    pub async fn list_posts(&self) -> Result<Vec<Post>> {
        self.posts.list_posts().await
    }

    /// Opens a post: counts the view and returns the post with its likers.
    #[tracing::instrument(skip(self))]
    pub async fn get_post(&self, post_id: Uuid) -> Result<PostDetail> {
        self.posts
            .view_post(post_id)
            .await?
            .ok_or_else(|| AppError::not_found("post", post_id))
    }

    /// Writes a post under the author's current nickname.
    #[tracing::instrument(skip(self, title, contents))]
    pub async fn create_post(&self, title: &str, contents: &str, author_id: &str) -> Result<Uuid> {
        let nickname = self.identity.resolve_nickname(author_id).await?;
        let post = Post::new(title, contents, author_id, nickname);
        let id = post.id;

        self.posts.insert_post(post).await?;
        tracing::info!(post_id = %id, "post created");
        Ok(id)
    }

    /// Unknown ids are ignored.
    #[tracing::instrument(skip(self, title, contents))]
    pub async fn update_post(&self, post_id: Uuid, title: &str, contents: &str) -> Result<()> {
        if !self.posts.update_post(post_id, title, contents).await? {
            tracing::debug!("update matched no post");
        }
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_post(&self, post_id: Uuid) -> Result<()> {
        if self.posts.delete_post(post_id).await? {
            tracing::info!("post deleted");
            Ok(())
        } else {
            Err(AppError::not_found("post", post_id))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cb_core::traits::{MockMemberRepo, MockPostRepo};
    use mockall::predicate::eq;

    fn identity_knowing(user: &'static str, nickname: &'static str) -> IdentityLookup {
        let mut members = MockMemberRepo::new();
        members.expect_find_nickname().returning(move |id| {
            Ok((id == user).then(|| nickname.to_string()))
        });
        IdentityLookup::new(Arc::new(members))
    }

    #[tokio::test]
    async fn test_create_denormalizes_nickname() {
        let mut posts = MockPostRepo::new();
        posts
            .expect_insert_post()
            .withf(|post| {
                post.author_id == "alice"
                    && post.author_nickname == "Alice"
                    && post.view_count == 0
                    && post.like_count == 0
                    && post.comment_count == 0
            })
            .times(1)
            .returning(|_| Ok(()));

        let store = PostStore::new(Arc::new(posts), identity_knowing("alice", "Alice"));
        let id = store.create_post("Hi", "first post", "alice").await.unwrap();
        assert_eq!(id.get_version_num(), 7);
    }

    #[tokio::test]
    async fn test_create_with_unknown_author_inserts_nothing() {
        let mut posts = MockPostRepo::new();
        posts.expect_insert_post().never();

        let store = PostStore::new(Arc::new(posts), identity_knowing("alice", "Alice"));
        let err = store.create_post("Hi", "body", "ghost").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(ref entity, _) if entity == "member"));
    }

    #[tokio::test]
    async fn test_get_missing_post_is_not_found() {
        let id = Uuid::now_v7();
        let mut posts = MockPostRepo::new();
        posts.expect_view_post().with(eq(id)).times(1).returning(|_| Ok(None));

        let store = PostStore::new(Arc::new(posts), identity_knowing("alice", "Alice"));
        assert!(matches!(store.get_post(id).await, Err(AppError::NotFound(..))));
    }

    #[tokio::test]
    async fn test_delete_missing_post_is_not_found() {
        let mut posts = MockPostRepo::new();
        posts.expect_delete_post().times(1).returning(|_| Ok(false));

        let store = PostStore::new(Arc::new(posts), identity_knowing("alice", "Alice"));
        assert!(matches!(store.delete_post(Uuid::now_v7()).await, Err(AppError::NotFound(..))));
    }

    #[tokio::test]
    async fn test_update_of_missing_post_is_silent() {
        let mut posts = MockPostRepo::new();
        posts.expect_update_post().times(1).returning(|_, _, _| Ok(false));

        let store = PostStore::new(Arc::new(posts), identity_knowing("alice", "Alice"));
        assert!(store.update_post(Uuid::now_v7(), "t", "c").await.is_ok());
    }
}
