use actix_web::{http::StatusCode, web, HttpRequest, HttpResponse};

use crate::error::{Result, StoreFailureStatus};
use crate::services::{LoginRequest, RegisterRequest};
use crate::state::AppState;
use crate::uploads::read_form;

/// POST /auth/register
///
/// Multipart (with an optional `picture` file) or JSON. The stored picture's
/// file name wins over any `picturePath` field.
pub async fn register(
    state: web::Data<AppState>,
    req: HttpRequest,
    payload: web::Payload,
) -> Result<HttpResponse> {
    let mut form = read_form(&req, payload, &state.uploads).await?;

    let picture_path = match form.picture.take() {
        Some(stored) => stored.file_name,
        None => form.take("picturePath").unwrap_or_default(),
    };

    let request = RegisterRequest {
        first_name: form.require("firstName")?,
        last_name: form.require("lastName")?,
        email: form.require("email")?,
        password: form.require("password")?,
        picture_path,
        location: form.take("location"),
        occupation: form.take("occupation"),
    };

    let user = state
        .auth
        .register(request)
        .await
        .store_failure_status(StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok(HttpResponse::Created().json(user))
}

/// POST /auth/login
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> Result<HttpResponse> {
    let response = state
        .auth
        .login(body.into_inner())
        .await
        .store_failure_status(StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok(HttpResponse::Ok().json(response))
}
