/// Storage for users and posts
///
/// Services talk to the [`PostStore`] and [`UserStore`] traits. Two backends
/// implement them: PostgreSQL (`post_repo`, `user_repo`) and an in-process
/// store (`memory`) used for local runs and tests.
pub mod memory;
pub mod post_repo;
pub mod user_repo;

pub use memory::InMemoryStore;
pub use post_repo::PgPostStore;
pub use user_repo::PgUserStore;

use async_trait::async_trait;
use resilience::TimeoutError;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{NewPost, NewUser, Post, User};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{0}")]
    Timeout(#[from] TimeoutError),

    /// A uniqueness constraint was violated; carries the offending field.
    #[error("{0} already exists")]
    Duplicate(String),
}

#[async_trait]
pub trait PostStore: Send + Sync {
    async fn insert_post(&self, post: NewPost) -> Result<Post, StoreError>;

    async fn find_post(&self, post_id: Uuid) -> Result<Option<Post>, StoreError>;

    /// All posts, oldest first.
    async fn list_posts(&self) -> Result<Vec<Post>, StoreError>;

    /// Posts by one author, oldest first.
    async fn list_posts_by_author(&self, author_id: Uuid) -> Result<Vec<Post>, StoreError>;

    /// Flip `user_id` in the post's likes as one atomic step.
    ///
    /// Returns the post as stored after the flip, or `None` if it does not exist.
    async fn toggle_like(&self, post_id: Uuid, user_id: &str) -> Result<Option<Post>, StoreError>;

    async fn health_check(&self) -> Result<(), StoreError>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError>;

    async fn find_user(&self, user_id: Uuid) -> Result<Option<User>, StoreError>;

    /// Lookup by already-lowercased email.
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Users with the given ids; missing ids are skipped.
    async fn find_users(&self, user_ids: &[Uuid]) -> Result<Vec<User>, StoreError>;

    /// Add or remove the friendship between two users on both sides.
    ///
    /// Returns `user_id`'s record after the change, or `None` if either user
    /// does not exist.
    async fn toggle_friend(&self, user_id: Uuid, friend_id: Uuid)
        -> Result<Option<User>, StoreError>;
}
