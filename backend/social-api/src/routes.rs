use actix_web::{error::JsonPayloadError, web, HttpRequest};
use std::sync::Arc;

use crate::error::AppError;
use crate::handlers;
use crate::metrics::serve_metrics;
use crate::middleware::JwtAuthMiddleware;
use crate::security::JwtKeys;

/// Register every route on an `App`.
///
/// `/auth`, `/assets`, health and metrics are public; `/users` and `/posts`
/// sit behind [`JwtAuthMiddleware`].
pub fn configure(cfg: &mut web::ServiceConfig, keys: Arc<JwtKeys>, json_limit: usize) {
    cfg.app_data(
        web::JsonConfig::default()
            .limit(json_limit)
            .error_handler(json_error),
    )
    .route("/health", web::get().to(handlers::health))
    .route("/health/live", web::get().to(handlers::liveness))
    .route("/metrics", web::get().to(serve_metrics))
    .route("/assets/{filename}", web::get().to(handlers::serve_asset))
    .service(
        web::scope("/auth")
            .route("/register", web::post().to(handlers::register))
            .route("/login", web::post().to(handlers::login)),
    )
    .service(
        web::scope("/users")
            .wrap(JwtAuthMiddleware::new(keys.clone()))
            .route("/{id}", web::get().to(handlers::get_user))
            .route("/{id}/friends", web::get().to(handlers::get_user_friends))
            .route("/{id}/{friend_id}", web::patch().to(handlers::add_remove_friend)),
    )
    .service(
        web::scope("/posts")
            .wrap(JwtAuthMiddleware::new(keys))
            .route("", web::post().to(handlers::create_post))
            .route("", web::get().to(handlers::get_feed_posts))
            .route("/{user_id}/posts", web::get().to(handlers::get_user_posts))
            .route("/{id}/like", web::patch().to(handlers::like_post)),
    );
}

fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::BadRequest(format!("Invalid JSON body: {}", err)).into()
}
