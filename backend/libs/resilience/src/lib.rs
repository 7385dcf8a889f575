/// Resilience helpers shared by the backend crates
///
/// Every call that leaves the process (database, object storage) should run
/// under an explicit deadline. This crate provides the deadline wrapper and its
/// error type so callers map an elapsed deadline into their own error enums.
///
/// # Example: Store call with timeout
///
/// ```rust,no_run
/// use resilience::{with_timeout_result, TimeoutConfig, TimeoutError};
///
/// #[derive(Debug)]
/// enum StoreError {
///     Timeout(TimeoutError),
///     Query(String),
/// }
///
/// impl From<TimeoutError> for StoreError {
///     fn from(err: TimeoutError) -> Self {
///         StoreError::Timeout(err)
///     }
/// }
///
/// #[tokio::main]
/// async fn main() {
///     let config = TimeoutConfig::from_millis(5_000);
///     let result: Result<u32, StoreError> =
///         with_timeout_result(config.duration, async { Ok(1) }).await;
///     assert!(result.is_ok());
/// }
/// ```
pub mod timeout;

pub use timeout::{with_timeout_result, TimeoutConfig, TimeoutError};
