//! Social API
//!
//! A small social-media backend: registration and login, user profiles and
//! friendships, posts with a like toggle, and picture uploads.
//!
//! Handlers are thin; business rules live in [`services`], persistence behind
//! the [`db::PostStore`] and [`db::UserStore`] traits.

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod security;
pub mod services;
pub mod state;
pub mod uploads;

pub use config::Config;
pub use error::{AppError, Result};
pub use state::{AppState, Stores};
