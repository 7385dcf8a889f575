//! Environment variable parsing utilities
//!
//! Small helpers for reading typed settings from the environment with
//! defaults, so callers never need `unwrap()` on a parse.

use std::str::FromStr;

/// Parse an environment variable with a default fallback
///
/// Missing and unparsable values both yield `default`.
///
/// # Example
/// ```ignore
/// let port: u16 = parse_env_with_default("PORT", 3001);
/// ```
pub fn parse_env_with_default<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Parse an environment variable, failing on a missing or malformed value
///
/// # Example
/// ```ignore
/// let database_url = parse_env_required::<String>("DATABASE_URL")?;
/// ```
pub fn parse_env_required<T: FromStr>(key: &str) -> Result<T, String> {
    std::env::var(key)
        .map_err(|_| format!("Environment variable {} not found", key))?
        .parse()
        .map_err(|_| format!("Failed to parse environment variable {}", key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[serial_test::serial]
    fn test_parse_env_with_default() {
        let result: u32 = parse_env_with_default("DB_POOL_NONEXISTENT_VAR", 42);
        assert_eq!(result, 42);

        std::env::set_var("DB_POOL_TEST_PORT", "8080");
        let result: u16 = parse_env_with_default("DB_POOL_TEST_PORT", 3000);
        assert_eq!(result, 8080);

        std::env::set_var("DB_POOL_TEST_PORT", "not-a-port");
        let result: u16 = parse_env_with_default("DB_POOL_TEST_PORT", 3000);
        assert_eq!(result, 3000);
        std::env::remove_var("DB_POOL_TEST_PORT");
    }

    #[test]
    #[serial_test::serial]
    fn test_parse_env_required() {
        let result = parse_env_required::<u32>("DB_POOL_NONEXISTENT_VAR");
        assert!(result.is_err());

        std::env::set_var("DB_POOL_TEST_REQ", "456");
        let result = parse_env_required::<u32>("DB_POOL_TEST_REQ");
        assert_eq!(result, Ok(456));
        std::env::remove_var("DB_POOL_TEST_REQ");
    }
}
