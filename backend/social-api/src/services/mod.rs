//! Business logic between handlers and the stores
pub mod auth;
pub mod posts;
pub mod users;

pub use auth::{AuthService, LoginRequest, LoginResponse, RegisterRequest};
pub use posts::{CreatePostRequest, PostService};
pub use users::UserService;

use std::future::Future;
use std::time::Duration;

use crate::db::StoreError;
use crate::metrics::social::STORE_CALL_DURATION_SECONDS;

/// Run one store call under the configured deadline, recording its latency.
///
/// An elapsed deadline surfaces as `StoreError::Timeout`.
pub(crate) async fn store_call<T, F>(
    operation: &'static str,
    deadline: Duration,
    future: F,
) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    let timer = STORE_CALL_DURATION_SECONDS
        .with_label_values(&[operation])
        .start_timer();
    let result = resilience::with_timeout_result(deadline, future).await;
    timer.observe_duration();

    if let Err(err) = &result {
        tracing::warn!(operation, error = %err, "store call failed");
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_store_call_deadline() {
        let result: Result<(), StoreError> =
            store_call("test_op", Duration::from_millis(10), async {
                tokio::time::sleep(Duration::from_secs(1)).await;
                Ok(())
            })
            .await;

        assert!(matches!(result, Err(StoreError::Timeout(_))));
    }

    #[tokio::test]
    async fn test_store_call_passes_value() {
        let result = store_call("test_op", Duration::from_secs(1), async {
            Ok::<_, StoreError>(7)
        })
        .await;
        assert_eq!(result.unwrap(), 7);
    }
}
