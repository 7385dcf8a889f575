use actix_web::{http::StatusCode, web, HttpRequest, HttpResponse};
use serde::Deserialize;

use super::parse_id;
use crate::error::{AppError, Result, StoreFailureStatus};
use crate::middleware::UserId;
use crate::services::CreatePostRequest;
use crate::state::AppState;
use crate::uploads::read_form;

#[derive(Debug, Deserialize)]
pub struct LikePostRequest {
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}

/// POST /posts
///
/// The author comes from the `userId` field, not from the token.
pub async fn create_post(
    state: web::Data<AppState>,
    caller: UserId,
    req: HttpRequest,
    payload: web::Payload,
) -> Result<HttpResponse> {
    let mut form = read_form(&req, payload, &state.uploads).await?;

    let user_id = parse_id(&form.require("userId")?, "User")
        .map_err(|_| AppError::Conflict("User not found".to_string()))?;
    let picture_path = match form.picture.take() {
        Some(stored) => Some(stored.file_name),
        None => form.take("picturePath"),
    };

    tracing::debug!(caller = %caller.0, author = %user_id, "creating post");

    let posts = state
        .posts
        .create_post(CreatePostRequest {
            user_id,
            description: form.take("description"),
            picture_path,
        })
        .await
        .store_failure_status(StatusCode::CONFLICT)?;

    Ok(HttpResponse::Created().json(posts))
}

/// GET /posts
pub async fn get_feed_posts(state: web::Data<AppState>) -> Result<HttpResponse> {
    let posts = state
        .posts
        .feed()
        .await
        .store_failure_status(StatusCode::NOT_FOUND)?;

    Ok(HttpResponse::Ok().json(posts))
}

/// GET /posts/{userId}/posts
pub async fn get_user_posts(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let author_id = parse_id(&path, "User")?;
    let posts = state
        .posts
        .user_posts(author_id)
        .await
        .store_failure_status(StatusCode::NOT_FOUND)?;

    Ok(HttpResponse::Ok().json(posts))
}

/// PATCH /posts/{id}/like
///
/// Flips `userId` in the post's likes and returns the updated post.
pub async fn like_post(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<LikePostRequest>,
) -> Result<HttpResponse> {
    let post_id = parse_id(&path, "Post")?;
    let user_id = body
        .into_inner()
        .user_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| AppError::Validation("userId is required".to_string()))?;

    let post = state
        .posts
        .toggle_like(post_id, &user_id)
        .await
        .store_failure_status(StatusCode::NOT_FOUND)?;

    Ok(HttpResponse::Ok().json(post))
}
