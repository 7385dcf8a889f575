/// HTTP request handlers
pub mod assets;
pub mod auth;
pub mod health;
pub mod posts;
pub mod users;

pub use assets::*;
pub use auth::*;
pub use health::*;
pub use posts::*;
pub use users::*;

use uuid::Uuid;

use crate::error::AppError;

/// Parse an id taken from the path or a form field.
///
/// A malformed id cannot name an existing record, so it is reported as 404.
pub(crate) fn parse_id(raw: &str, what: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw.trim()).map_err(|_| AppError::NotFound(format!("{} not found", what)))
}
