use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::state::AppState;

/// GET /health
///
/// Pings the store under the store deadline; 503 when it does not answer.
pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    let check = resilience::with_timeout_result(state.store_timeout, state.store_health.health_check());

    match check.await {
        Ok(()) => HttpResponse::Ok().json(json!({
            "status": "ok",
            "service": "social-api",
            "version": env!("CARGO_PKG_VERSION"),
        })),
        Err(err) => {
            tracing::warn!(error = %err, "health check failed");
            HttpResponse::ServiceUnavailable().json(json!({
                "status": "unavailable",
                "message": err.to_string(),
            }))
        }
    }
}

/// GET /health/live
pub async fn liveness() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "status": "alive" }))
}
