use actix_web::{http::StatusCode, web, HttpResponse};

use super::parse_id;
use crate::error::{Result, StoreFailureStatus};
use crate::state::AppState;

/// GET /users/{id}
pub async fn get_user(state: web::Data<AppState>, path: web::Path<String>) -> Result<HttpResponse> {
    let user_id = parse_id(&path, "User")?;
    let user = state
        .users
        .get_user(user_id)
        .await
        .store_failure_status(StatusCode::NOT_FOUND)?;

    Ok(HttpResponse::Ok().json(user))
}

/// GET /users/{id}/friends
pub async fn get_user_friends(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let user_id = parse_id(&path, "User")?;
    let friends = state
        .users
        .friends(user_id)
        .await
        .store_failure_status(StatusCode::NOT_FOUND)?;

    Ok(HttpResponse::Ok().json(friends))
}

/// PATCH /users/{id}/{friendId}
pub async fn add_remove_friend(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse> {
    let (id, friend_id) = path.into_inner();
    let user_id = parse_id(&id, "User")?;
    let friend_id = parse_id(&friend_id, "Friend")?;

    let friends = state
        .users
        .toggle_friend(user_id, friend_id)
        .await
        .store_failure_status(StatusCode::NOT_FOUND)?;

    Ok(HttpResponse::Ok().json(friends))
}
