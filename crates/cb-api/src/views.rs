//! Response shapes. Timestamps are rendered here, in the board's display
//! offset, never by the core.

use chrono::{DateTime, FixedOffset, Utc};
use serde::Serialize;
use uuid::Uuid;

use cb_core::models::{Comment, CommentThread, Post, PostDetail};

/// `YYYY-MM-DD HH:MM` in the given offset.
pub fn display_time(at: DateTime<Utc>, offset: &FixedOffset) -> String {
    at.with_timezone(offset).format("%Y-%m-%d %H:%M").to_string()
}

#[derive(Debug, Serialize)]
pub struct PostView {
    pub post_id: Uuid,
    pub title: String,
    pub contents: String,
    pub author_id: String,
    pub author_nickname: String,
    pub post_date: String,
    pub view_count: i64,
    pub like_count: i64,
    pub comment_count: i64,
}

impl PostView {
    pub fn render(post: Post, offset: &FixedOffset) -> Self {
        Self {
            post_id: post.id,
            post_date: display_time(post.created_at, offset),
            title: post.title,
            contents: post.contents,
            author_id: post.author_id,
            author_nickname: post.author_nickname,
            view_count: post.view_count,
            like_count: post.like_count,
            comment_count: post.comment_count,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PostDetailView {
    pub post: PostView,
    pub likes: Vec<String>,
}

impl PostDetailView {
    pub fn render(detail: PostDetail, offset: &FixedOffset) -> Self {
        Self {
            post: PostView::render(detail.post, offset),
            likes: detail.liker_ids,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CommentView {
    pub comment_id: Uuid,
    pub post_id: Uuid,
    pub author_id: String,
    pub author_nickname: String,
    pub parent_comment_id: Option<Uuid>,
    pub content: String,
    pub created_at: String,
    pub is_deleted: bool,
}

impl CommentView {
    pub fn render(comment: Comment, offset: &FixedOffset) -> Self {
        Self {
            comment_id: comment.id,
            post_id: comment.post_id,
            created_at: display_time(comment.created_at, offset),
            author_id: comment.author_id,
            author_nickname: comment.author_nickname,
            parent_comment_id: comment.parent_id,
            content: comment.content,
            is_deleted: comment.is_deleted,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CommentThreadView {
    #[serde(flatten)]
    pub comment: CommentView,
    pub replies: Vec<CommentView>,
}

impl CommentThreadView {
    pub fn render(thread: CommentThread, offset: &FixedOffset) -> Self {
        Self {
            comment: CommentView::render(thread.comment, offset),
            replies: thread
                .replies
                .into_iter()
                .map(|reply| CommentView::render(reply, offset))
                .collect(),
        }
    }
}
