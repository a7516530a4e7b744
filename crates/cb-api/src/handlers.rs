//! # cb-api Handlers
//!
//! Each handler parses one request, calls exactly one service operation,
//! and renders the result.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::FixedOffset;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use cb_core::error::AppError;
use cb_services::Services;

use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::views::{CommentThreadView, PostDetailView, PostView};

/// State shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    pub services: Services,
    /// Offset used when rendering timestamps
    pub display_offset: FixedOffset,
}

impl AppState {
    pub fn new(services: Services, display_offset: FixedOffset) -> Self {
        Self {
            services,
            display_offset,
        }
    }
}

fn message(text: &str) -> Json<Value> {
    Json(json!({ "message": text }))
}

// ── Accounts ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    #[serde(alias = "id")]
    pub user_id: String,
    pub password: String,
    pub nickname: String,
}

pub async fn signup(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<SignupRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    state
        .services
        .accounts
        .signup(&req.user_id, &req.password, &req.nickname)
        .await?;
    Ok((StatusCode::CREATED, message("User registered successfully")))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(alias = "id")]
    pub user_id: String,
    pub password: String,
}

pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> ApiResult<Json<Value>> {
    state.services.accounts.login(&req.user_id, &req.password).await?;
    Ok(message("Login successful"))
}

#[derive(Debug, Deserialize)]
pub struct NicknameQuery {
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}

pub async fn nickname(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<NicknameQuery>,
) -> ApiResult<Json<Value>> {
    let user_id = query
        .user_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::ValidationError("userId is required".into()))?;
    let nickname = state.services.accounts.nickname(&user_id).await?;
    Ok(Json(json!({ "nickname": nickname })))
}

// ── Posts ───────────────────────────────────────────────────────────────────

pub async fn list_posts(State(state): State<AppState>) -> ApiResult<Json<Vec<PostView>>> {
    let posts = state.services.posts.list_posts().await?;
    Ok(Json(
        posts
            .into_iter()
            .map(|post| PostView::render(post, &state.display_offset))
            .collect(),
    ))
}

pub async fn get_post(
    State(state): State<AppState>,
    ApiPath(post_id): ApiPath<Uuid>,
) -> ApiResult<Json<PostDetailView>> {
    let detail = state.services.posts.get_post(post_id).await?;
    Ok(Json(PostDetailView::render(detail, &state.display_offset)))
}

#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    #[serde(alias = "post_title")]
    pub title: String,
    #[serde(alias = "post_contents")]
    pub contents: String,
    #[serde(alias = "id")]
    pub author_id: String,
}

pub async fn create_post(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreatePostRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let post_id = state
        .services
        .posts
        .create_post(&req.title, &req.contents, &req.author_id)
        .await?;
    Ok((StatusCode::CREATED, Json(json!({ "post_id": post_id }))))
}

#[derive(Debug, Deserialize)]
pub struct UpdatePostRequest {
    #[serde(alias = "postTitle")]
    pub title: String,
    #[serde(alias = "postContents")]
    pub contents: String,
}

pub async fn update_post(
    State(state): State<AppState>,
    ApiPath(post_id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<UpdatePostRequest>,
) -> ApiResult<Json<Value>> {
    state
        .services
        .posts
        .update_post(post_id, &req.title, &req.contents)
        .await?;
    Ok(message("Post updated"))
}

pub async fn delete_post(
    State(state): State<AppState>,
    ApiPath(post_id): ApiPath<Uuid>,
) -> ApiResult<Json<Value>> {
    state.services.posts.delete_post(post_id).await?;
    Ok(message("Post deleted"))
}

#[derive(Debug, Deserialize)]
pub struct LikeRequest {
    #[serde(alias = "userId")]
    pub user_id: String,
    #[serde(alias = "postId")]
    pub post_id: Uuid,
}

pub async fn add_like(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LikeRequest>,
) -> ApiResult<Json<Value>> {
    state.services.likes.add_like(&req.user_id, req.post_id).await?;
    Ok(message("Like added"))
}

// ── Comments ────────────────────────────────────────────────────────────────

/// `GET /comments/{id}`: `id` is the post whose threads are listed.
pub async fn list_comments(
    State(state): State<AppState>,
    ApiPath(post_id): ApiPath<Uuid>,
) -> ApiResult<Json<Vec<CommentThreadView>>> {
    let threads = state.services.comments.list_comments(post_id).await?;
    Ok(Json(
        threads
            .into_iter()
            .map(|thread| CommentThreadView::render(thread, &state.display_offset))
            .collect(),
    ))
}

#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    pub post_id: Uuid,
    pub user_id: String,
    pub parent_comment_id: Option<Uuid>,
    pub content: String,
}

pub async fn add_comment(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreateCommentRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let comment_id = state
        .services
        .comments
        .add_comment(req.post_id, &req.user_id, req.parent_comment_id, &req.content)
        .await?;
    Ok((StatusCode::CREATED, Json(json!({ "comment_id": comment_id }))))
}

/// `PATCH /comments/{id}`: `id` is the comment to soft-delete.
pub async fn soft_delete_comment(
    State(state): State<AppState>,
    ApiPath(comment_id): ApiPath<Uuid>,
) -> ApiResult<Json<Value>> {
    state.services.comments.soft_delete_comment(comment_id).await?;
    Ok(message("Comment deleted"))
}
