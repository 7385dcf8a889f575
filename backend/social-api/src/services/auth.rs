use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use validator::Validate;

use super::store_call;
use crate::db::UserStore;
use crate::error::{AppError, Result};
use crate::metrics::social::AUTH_EVENTS_TOTAL;
use crate::models::{NewUser, User};
use crate::security::{hash_password, verify_password, JwtKeys};

/// Upper bound (exclusive) of the random profile counters given to new users.
const PROFILE_COUNTER_MAX: i32 = 10_000;

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(length(min = 2, max = 50))]
    pub first_name: String,
    #[validate(length(min = 2, max = 50))]
    pub last_name: String,
    #[validate(email, length(max = 50))]
    pub email: String,
    #[validate(length(min = 5))]
    pub password: String,
    #[serde(default)]
    pub picture_path: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub occupation: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

pub struct AuthService {
    users: Arc<dyn UserStore>,
    keys: Arc<JwtKeys>,
    deadline: Duration,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, keys: Arc<JwtKeys>, deadline: Duration) -> Self {
        Self {
            users,
            keys,
            deadline,
        }
    }

    pub async fn register(&self, mut req: RegisterRequest) -> Result<User> {
        req.email = req.email.trim().to_lowercase();
        if let Err(errors) = req.validate() {
            AUTH_EVENTS_TOTAL
                .with_label_values(&["register", "failure"])
                .inc();
            return Err(errors.into());
        }

        let password_hash = hash_password(&req.password)?;
        let (viewed_profile, impressions) = {
            let mut rng = rand::thread_rng();
            (
                rng.gen_range(0..PROFILE_COUNTER_MAX),
                rng.gen_range(0..PROFILE_COUNTER_MAX),
            )
        };

        let new_user = NewUser {
            first_name: req.first_name,
            last_name: req.last_name,
            email: req.email,
            password_hash,
            picture_path: req.picture_path,
            location: req.location,
            occupation: req.occupation,
            viewed_profile,
            impressions,
        };

        let user = match store_call("insert_user", self.deadline, self.users.insert_user(new_user))
            .await
        {
            Ok(user) => user,
            Err(err) => {
                AUTH_EVENTS_TOTAL
                    .with_label_values(&["register", "failure"])
                    .inc();
                return Err(err.into());
            }
        };

        AUTH_EVENTS_TOTAL
            .with_label_values(&["register", "success"])
            .inc();
        info!(user_id = %user.id, "user registered");
        Ok(user)
    }

    pub async fn login(&self, req: LoginRequest) -> Result<LoginResponse> {
        let email = req.email.trim().to_lowercase();

        let user = store_call(
            "find_user_by_email",
            self.deadline,
            self.users.find_user_by_email(&email),
        )
        .await?;

        let Some(user) = user else {
            AUTH_EVENTS_TOTAL.with_label_values(&["login", "failure"]).inc();
            return Err(AppError::BadRequest("User does not exist.".to_string()));
        };

        if !verify_password(&req.password, &user.password_hash)? {
            AUTH_EVENTS_TOTAL.with_label_values(&["login", "failure"]).inc();
            warn!(user_id = %user.id, "login rejected: wrong password");
            return Err(AppError::BadRequest("Invalid credentials.".to_string()));
        }

        let token = self
            .keys
            .issue_token(user.id)
            .map_err(|e| AppError::Internal(e.to_string()))?;

        AUTH_EVENTS_TOTAL.with_label_values(&["login", "success"]).inc();
        info!(user_id = %user.id, "user logged in");
        Ok(LoginResponse { token, user })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::InMemoryStore;

    fn service() -> AuthService {
        AuthService::new(
            Arc::new(InMemoryStore::new()),
            Arc::new(JwtKeys::new("test-secret", 24)),
            Duration::from_secs(1),
        )
    }

    fn register_request(email: &str) -> RegisterRequest {
        RegisterRequest {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: email.into(),
            password: "hunter22".into(),
            picture_path: String::new(),
            location: None,
            occupation: None,
        }
    }

    #[tokio::test]
    async fn test_register_normalizes_email() {
        let service = service();
        let user = service
            .register(register_request("Ada@Example.COM"))
            .await
            .unwrap();

        assert_eq!(user.email, "ada@example.com");
        assert!((0..PROFILE_COUNTER_MAX).contains(&user.viewed_profile));
        assert!((0..PROFILE_COUNTER_MAX).contains(&user.impressions));
        assert!(user.friends.is_empty());
        assert_ne!(user.password_hash, "hunter22");
    }

    #[tokio::test]
    async fn test_register_duplicate_email_conflicts() {
        let service = service();
        service
            .register(register_request("ada@example.com"))
            .await
            .unwrap();

        let err = service
            .register(register_request("ADA@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_register_validation() {
        let service = service();

        let mut short_name = register_request("ada@example.com");
        short_name.first_name = "A".into();
        assert!(matches!(
            service.register(short_name).await.unwrap_err(),
            AppError::Validation(_)
        ));

        let mut short_password = register_request("ada@example.com");
        short_password.password = "1234".into();
        assert!(matches!(
            service.register(short_password).await.unwrap_err(),
            AppError::Validation(_)
        ));

        let bad_email = register_request("not-an-email");
        assert!(matches!(
            service.register(bad_email).await.unwrap_err(),
            AppError::Validation(_)
        ));
    }

    #[tokio::test]
    async fn test_login_flow() {
        let service = service();
        let user = service
            .register(register_request("ada@example.com"))
            .await
            .unwrap();

        let resp = service
            .login(LoginRequest {
                email: "ADA@example.com".into(),
                password: "hunter22".into(),
            })
            .await
            .unwrap();
        assert_eq!(resp.user.id, user.id);
        assert_eq!(service.keys.user_id_from_token(&resp.token).unwrap(), user.id);

        let err = service
            .login(LoginRequest {
                email: "ada@example.com".into(),
                password: "wrong-pass".into(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid credentials.");

        let err = service
            .login(LoginRequest {
                email: "nobody@example.com".into(),
                password: "hunter22".into(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "User does not exist.");
    }
}
