use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};
use uuid::Uuid;

use super::store_call;
use crate::db::{PostStore, UserStore};
use crate::error::{AppError, Result};
use crate::metrics::social::{LIKE_TOGGLES_TOTAL, POSTS_CREATED_TOTAL};
use crate::models::{AuthorSnapshot, LikeState, NewPost, Post};

#[derive(Debug, Clone)]
pub struct CreatePostRequest {
    pub user_id: Uuid,
    pub description: Option<String>,
    pub picture_path: Option<String>,
}

/// Post creation, listing and the like toggle.
pub struct PostService {
    posts: Arc<dyn PostStore>,
    users: Arc<dyn UserStore>,
    deadline: Duration,
}

impl PostService {
    pub fn new(posts: Arc<dyn PostStore>, users: Arc<dyn UserStore>, deadline: Duration) -> Self {
        Self {
            posts,
            users,
            deadline,
        }
    }

    /// Create a post for an existing author and return the whole feed.
    ///
    /// An unknown author is a 409, like every other failure of this route.
    pub async fn create_post(&self, req: CreatePostRequest) -> Result<Vec<Post>> {
        let author = store_call("find_user", self.deadline, self.users.find_user(req.user_id))
            .await?
            .ok_or_else(|| AppError::Conflict("User not found".to_string()))?;

        let new_post = NewPost {
            author_id: author.id,
            author: AuthorSnapshot::of(&author),
            description: req.description,
            media_path: req.picture_path,
        };

        let post = store_call("insert_post", self.deadline, self.posts.insert_post(new_post)).await?;
        POSTS_CREATED_TOTAL.inc();
        info!(post_id = %post.id, author_id = %post.author_id, "post created");

        self.feed().await
    }

    /// Every post, oldest first.
    pub async fn feed(&self) -> Result<Vec<Post>> {
        let posts = store_call("list_posts", self.deadline, self.posts.list_posts()).await?;
        debug!(count = posts.len(), "feed loaded");
        Ok(posts)
    }

    pub async fn user_posts(&self, author_id: Uuid) -> Result<Vec<Post>> {
        let posts = store_call(
            "list_posts_by_author",
            self.deadline,
            self.posts.list_posts_by_author(author_id),
        )
        .await?;
        Ok(posts)
    }

    /// Flip `user_id`'s like on a post and return the post as stored afterwards.
    pub async fn toggle_like(&self, post_id: Uuid, user_id: &str) -> Result<Post> {
        let post = store_call(
            "toggle_like",
            self.deadline,
            self.posts.toggle_like(post_id, user_id),
        )
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Post {} not found", post_id)))?;

        let state = if post.likes.contains(user_id) {
            LikeState::Liked
        } else {
            LikeState::Unliked
        };
        LIKE_TOGGLES_TOTAL.with_label_values(&[state.as_str()]).inc();
        debug!(post_id = %post_id, user_id, outcome = state.as_str(), "like toggled");

        Ok(post)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{InMemoryStore, StoreError};
    use crate::models::{NewUser, User};
    use async_trait::async_trait;

    async fn setup() -> (PostService, User) {
        let store = Arc::new(InMemoryStore::new());
        let author = store
            .insert_user(NewUser {
                first_name: "Ada".into(),
                last_name: "Lovelace".into(),
                email: "ada@example.com".into(),
                password_hash: "hash".into(),
                picture_path: "ada.png".into(),
                location: Some("London".into()),
                occupation: None,
                viewed_profile: 0,
                impressions: 0,
            })
            .await
            .unwrap();

        let service = PostService::new(store.clone(), store, Duration::from_secs(1));
        (service, author)
    }

    fn request(author: &User, description: &str) -> CreatePostRequest {
        CreatePostRequest {
            user_id: author.id,
            description: Some(description.into()),
            picture_path: None,
        }
    }

    #[tokio::test]
    async fn test_create_post_snapshots_author() {
        let (service, author) = setup().await;

        let feed = service.create_post(request(&author, "hello")).await.unwrap();
        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].author, AuthorSnapshot::of(&author));
        assert!(feed[0].likes.is_empty());
        assert!(feed[0].comments.is_empty());
    }

    #[tokio::test]
    async fn test_create_post_unknown_author() {
        let (service, _) = setup().await;
        let err = service
            .create_post(CreatePostRequest {
                user_id: Uuid::new_v4(),
                description: None,
                picture_path: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_toggle_like_twice_restores_state() {
        let (service, author) = setup().await;
        let post_id = service.create_post(request(&author, "hello")).await.unwrap()[0].id;

        let liked = service.toggle_like(post_id, "u1").await.unwrap();
        assert!(liked.likes.contains("u1"));

        let unliked = service.toggle_like(post_id, "u1").await.unwrap();
        assert!(!unliked.likes.contains("u1"));
        assert!(unliked.likes.is_empty());
    }

    #[tokio::test]
    async fn test_toggle_like_unknown_post() {
        let (service, _) = setup().await;
        let err = service.toggle_like(Uuid::new_v4(), "u1").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    struct StalledStore;

    #[async_trait]
    impl PostStore for StalledStore {
        async fn insert_post(&self, _: NewPost) -> std::result::Result<Post, StoreError> {
            unreachable!()
        }
        async fn find_post(&self, _: Uuid) -> std::result::Result<Option<Post>, StoreError> {
            unreachable!()
        }
        async fn list_posts(&self) -> std::result::Result<Vec<Post>, StoreError> {
            unreachable!()
        }
        async fn list_posts_by_author(
            &self,
            _: Uuid,
        ) -> std::result::Result<Vec<Post>, StoreError> {
            unreachable!()
        }
        async fn toggle_like(
            &self,
            _: Uuid,
            _: &str,
        ) -> std::result::Result<Option<Post>, StoreError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(None)
        }
        async fn health_check(&self) -> std::result::Result<(), StoreError> {
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_toggle_like_store_timeout() {
        let service = PostService::new(
            Arc::new(StalledStore),
            Arc::new(InMemoryStore::new()),
            Duration::from_millis(50),
        );

        let err = service.toggle_like(Uuid::new_v4(), "u1").await.unwrap_err();
        assert!(matches!(err, AppError::StoreFailure(StoreError::Timeout(_))));
    }
}
