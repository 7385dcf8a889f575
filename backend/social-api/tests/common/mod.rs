#![allow(dead_code)]

use actix_web::web;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use social_api::db::InMemoryStore;
use social_api::security::JwtKeys;
use social_api::uploads::UploadSettings;
use social_api::{AppState, Stores};

pub const BOUNDARY: &str = "----socialapitestboundary";
pub const TEST_UPLOAD_LIMIT: usize = 1024 * 1024;

pub struct TestContext {
    pub state: web::Data<AppState>,
    pub keys: Arc<JwtKeys>,
    pub assets_dir: PathBuf,
}

impl TestContext {
    pub fn new() -> Self {
        let store = Arc::new(InMemoryStore::new());
        let keys = Arc::new(JwtKeys::new("integration-test-secret", 24));
        let assets_dir = std::env::temp_dir().join(format!("social-api-test-{}", Uuid::new_v4()));

        let state = web::Data::new(AppState::new(
            Stores {
                posts: store.clone(),
                users: store,
            },
            keys.clone(),
            UploadSettings {
                assets_dir: assets_dir.clone(),
                max_upload_bytes: TEST_UPLOAD_LIMIT,
            },
            Duration::from_secs(2),
        ));

        Self {
            state,
            keys,
            assets_dir,
        }
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.assets_dir);
    }
}

/// Build the full app over a [`TestContext`].
macro_rules! test_app {
    ($ctx:expr) => {{
        let keys = $ctx.keys.clone();
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data($ctx.state.clone())
                .wrap(social_api::middleware::security_headers())
                .configure(move |cfg| {
                    social_api::routes::configure(cfg, keys.clone(), common::TEST_UPLOAD_LIMIT)
                }),
        )
        .await
    }};
}

/// Register a user over HTTP and log them in; yields `(token, user_json)`.
macro_rules! register_and_login {
    ($app:expr, $first_name:expr, $email:expr) => {{
        let req = actix_web::test::TestRequest::post()
            .uri("/auth/register")
            .set_json(common::register_json($first_name, $email))
            .to_request();
        let resp = actix_web::test::call_service(&$app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::CREATED);

        let req = actix_web::test::TestRequest::post()
            .uri("/auth/login")
            .set_json(serde_json::json!({ "email": $email, "password": "hunter22" }))
            .to_request();
        let resp = actix_web::test::call_service(&$app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::OK);

        let body: serde_json::Value = actix_web::test::read_body_json(resp).await;
        (
            body["token"].as_str().unwrap().to_string(),
            body["user"].clone(),
        )
    }};
}

pub fn register_json(first_name: &str, email: &str) -> serde_json::Value {
    serde_json::json!({
        "firstName": first_name,
        "lastName": "Tester",
        "email": email,
        "password": "hunter22",
        "location": "Lisbon",
        "occupation": "Engineer",
    })
}

/// Build a `multipart/form-data` body; returns (content type, body).
pub fn multipart_body(
    fields: &[(&str, &str)],
    file: Option<(&str, &str, &[u8])>,
) -> (String, Vec<u8>) {
    let mut body = Vec::new();

    for (name, value) in fields {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
        );
        body.extend_from_slice(value.as_bytes());
        body.extend_from_slice(b"\r\n");
    }

    if let Some((name, file_name, bytes)) = file {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                name, file_name
            )
            .as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    (format!("multipart/form-data; boundary={}", BOUNDARY), body)
}

pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token))
}
