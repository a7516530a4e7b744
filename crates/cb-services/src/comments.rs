use std::collections::HashMap;
use std::sync::Arc;

use cb_core::error::{AppError, Result};
use cb_core::models::{Comment, CommentThread, DELETED_COMMENT_PLACEHOLDER};
use cb_core::traits::CommentRepo;
use uuid::Uuid;

use crate::identity::IdentityLookup;

/// Two-level comment threads with soft delete.
#[derive(Clone)]
pub struct CommentStore {
    comments: Arc<dyn CommentRepo>,
    identity: IdentityLookup,
}

impl CommentStore {
    pub fn new(comments: Arc<dyn CommentRepo>, identity: IdentityLookup) -> Self {
        Self { comments, identity }
    }

    /// Newest top-level comment first, each with its replies oldest first.
    pub async fn list_comments(&self, post_id: Uuid) -> Result<Vec<CommentThread>> {
        let top_level = self.comments.list_top_level(post_id).await?;

        let mut replies_by_parent: HashMap<Uuid, Vec<Comment>> = HashMap::new();
        for reply in self.comments.list_replies(post_id).await? {
            if let Some(parent_id) = reply.parent_id {
                replies_by_parent.entry(parent_id).or_default().push(reply);
            }
        }

        Ok(top_level
            .into_iter()
            .map(|comment| {
                let replies = replies_by_parent.remove(&comment.id).unwrap_or_default();
                CommentThread { comment, replies }
            })
            .collect())
    }

    /// Adds a top-level comment, or a reply when `parent_id` is set.
    ///
    /// A parent must be a top-level comment on the same post.
    #[tracing::instrument(skip(self, content))]
    pub async fn add_comment(
        &self,
        post_id: Uuid,
        user_id: &str,
        parent_id: Option<Uuid>,
        content: &str,
    ) -> Result<Uuid> {
        let nickname = self.identity.resolve_nickname(user_id).await?;

        if let Some(parent_id) = parent_id {
            let parent = self
                .comments
                .find_comment(parent_id)
                .await?
                .ok_or_else(|| AppError::not_found("comment", parent_id))?;
            if parent.post_id != post_id {
                return Err(AppError::ValidationError(
                    "parent comment belongs to another post".into(),
                ));
            }
            if !parent.is_top_level() {
                return Err(AppError::ValidationError("replies cannot be nested".into()));
            }
        }

        let comment = Comment::new(post_id, user_id, nickname, parent_id, content);
        let id = comment.id;
        self.comments.insert_comment(comment).await?;

        tracing::info!(comment_id = %id, "comment added");
        Ok(id)
    }

    /// Blanks the content but keeps the row, its replies, and the post counter.
    #[tracing::instrument(skip(self))]
    pub async fn soft_delete_comment(&self, comment_id: Uuid) -> Result<()> {
        if self
            .comments
            .soft_delete_comment(comment_id, DELETED_COMMENT_PLACEHOLDER)
            .await?
        {
            tracing::info!("comment soft-deleted");
        } else {
            tracing::debug!("soft delete matched no comment");
        }
        Ok(())
    }
}
