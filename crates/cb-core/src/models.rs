//! # Domain Models
//!
//! These structs represent the core entities of the community board.
//! Posts and comments use UUID v7 so ids double as a creation-order tie-breaker.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Content written over a comment when it is soft-deleted.
pub const DELETED_COMMENT_PLACEHOLDER: &str = "삭제된 댓글 입니다.";

/// A registered account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    /// Login identifier chosen at signup. Never changes.
    pub user_id: String,
    /// Output of the configured `CredentialScheme`, never sent to clients.
    #[serde(skip_serializing)]
    pub credential: String,
    pub nickname: String,
}

/// A board article together with its derived counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub contents: String,
    pub author_id: String,
    /// Snapshot of the author's nickname when the post was written
    pub author_nickname: String,
    pub created_at: DateTime<Utc>,
    pub view_count: i64,
    pub like_count: i64,
    pub comment_count: i64,
}

impl Post {
    /// Builds a fresh post with all counters at zero.
    pub fn new(
        title: impl Into<String>,
        contents: impl Into<String>,
        author_id: impl Into<String>,
        author_nickname: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            title: title.into(),
            contents: contents.into(),
            author_id: author_id.into(),
            author_nickname: author_nickname.into(),
            created_at: Utc::now(),
            view_count: 0,
            like_count: 0,
            comment_count: 0,
        }
    }
}

/// What a reader gets back from opening a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostDetail {
    pub post: Post,
    /// Every member that liked the post
    pub liker_ids: Vec<String>,
}

/// A remark on a post, either top-level or a reply to a top-level comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author_id: String,
    pub author_nickname: String,
    /// `None` for top-level comments
    pub parent_id: Option<Uuid>,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub is_deleted: bool,
}

impl Comment {
    pub fn new(
        post_id: Uuid,
        author_id: impl Into<String>,
        author_nickname: impl Into<String>,
        parent_id: Option<Uuid>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            post_id,
            author_id: author_id.into(),
            author_nickname: author_nickname.into(),
            parent_id,
            content: content.into(),
            created_at: Utc::now(),
            is_deleted: false,
        }
    }

    pub fn is_top_level(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// A top-level comment with its replies attached, oldest reply first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentThread {
    #[serde(flatten)]
    pub comment: Comment,
    pub replies: Vec<Comment>,
}
