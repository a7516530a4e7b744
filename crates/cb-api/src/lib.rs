//! # cb-api
//!
//! The HTTP routing layer for the community board.

pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod views;

use axum::routing::{get, post};
use axum::Router;

pub use handlers::AppState;

/// Builds the board's routes.
///
/// # Developer Note
/// Middleware is applied by the binary so tests can drive the bare router.
pub fn configure_routes(state: AppState) -> Router {
    Router::new()
        .route("/auth/signup", post(handlers::signup))
        .route("/auth/login", post(handlers::login))
        .route("/auth/nickname", get(handlers::nickname))
        .route("/posts", get(handlers::list_posts).post(handlers::create_post))
        .route("/posts/like", post(handlers::add_like))
        .route(
            "/posts/{post_id}",
            get(handlers::get_post)
                .put(handlers::update_post)
                .delete(handlers::delete_post),
        )
        .route("/comments", post(handlers::add_comment))
        .route(
            "/comments/{id}",
            get(handlers::list_comments).patch(handlers::soft_delete_comment),
        )
        .with_state(state)
}
