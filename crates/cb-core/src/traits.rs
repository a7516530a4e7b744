//! # Core Traits (Ports)
//!
//! Any storage or auth plugin must implement these traits to be wired into
//! the services. Counter updates are not exposed here: they only happen as
//! part of the operations that own them.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{Comment, Member, Post, PostDetail};

/// Persistence contract for member accounts.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait MemberRepo: Send + Sync {
    async fn find_member(&self, user_id: &str) -> Result<Option<Member>>;
    async fn find_nickname(&self, user_id: &str) -> Result<Option<String>>;
    async fn nickname_exists(&self, nickname: &str) -> Result<bool>;

    /// Stores a new member. A taken user id or nickname yields `Conflict`.
    async fn insert_member(&self, member: Member) -> Result<()>;
}

/// Persistence contract for posts and their counters.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait PostRepo: Send + Sync {
    async fn list_posts(&self) -> Result<Vec<Post>>;

    /// Atomically bumps `view_count` and returns the post with its likers.
    /// `None` when the post does not exist.
    async fn view_post(&self, id: Uuid) -> Result<Option<PostDetail>>;

    async fn insert_post(&self, post: Post) -> Result<()>;

    /// Overwrites title and contents. Returns false if no row matched.
    async fn update_post(&self, id: Uuid, title: &str, contents: &str) -> Result<bool>;

    /// Returns false if no row matched.
    async fn delete_post(&self, id: Uuid) -> Result<bool>;
}

/// Persistence contract for comment threads.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait CommentRepo: Send + Sync {
    async fn find_comment(&self, id: Uuid) -> Result<Option<Comment>>;

    /// Top-level comments of a post, newest first.
    async fn list_top_level(&self, post_id: Uuid) -> Result<Vec<Comment>>;

    /// Every reply on a post, oldest first.
    async fn list_replies(&self, post_id: Uuid) -> Result<Vec<Comment>>;

    /// Inserts the comment and bumps the post's `comment_count` in one unit.
    /// An unknown post yields `NotFound`.
    async fn insert_comment(&self, comment: Comment) -> Result<()>;

    /// Replaces the content with `placeholder` and flags the row deleted.
    /// Returns false if no row matched.
    async fn soft_delete_comment(&self, id: Uuid, placeholder: &str) -> Result<bool>;
}

/// Persistence contract for the one-vote-per-member like ledger.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait LikeRepo: Send + Sync {
    async fn has_liked(&self, user_id: &str, post_id: Uuid) -> Result<bool>;

    /// Records the vote and bumps `like_count` in one transaction.
    ///
    /// The storage uniqueness constraint is authoritative: a concurrent
    /// duplicate yields `AlreadyLiked` and leaves the counter untouched.
    async fn add_like(&self, user_id: &str, post_id: Uuid) -> Result<()>;
}

/// Seals and verifies stored member passwords.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait CredentialScheme: Send + Sync {
    /// Produces the value persisted in `Member::credential`.
    fn seal(&self, password: &str) -> Result<String>;

    fn verify(&self, password: &str, stored: &str) -> bool;
}
