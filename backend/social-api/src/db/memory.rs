use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{PostStore, StoreError, UserStore};
use crate::models::{Likes, NewPost, NewUser, Post, User};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    posts: Vec<Post>,
}

/// In-process store implementing both [`PostStore`] and [`UserStore`].
///
/// Every operation runs under one lock, which makes the like and friend
/// toggles atomic. Vectors keep insertion order, which is creation order.
#[derive(Default)]
pub struct InMemoryStore {
    tables: Mutex<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PostStore for InMemoryStore {
    async fn insert_post(&self, post: NewPost) -> Result<Post, StoreError> {
        let now = Utc::now();
        let created = Post {
            id: Uuid::new_v4(),
            author_id: post.author_id,
            author: post.author,
            description: post.description,
            media_path: post.media_path,
            likes: Likes::default(),
            comments: Vec::new(),
            created_at: now,
            updated_at: now,
        };

        self.tables.lock().await.posts.push(created.clone());
        Ok(created)
    }

    async fn find_post(&self, post_id: Uuid) -> Result<Option<Post>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables.posts.iter().find(|p| p.id == post_id).cloned())
    }

    async fn list_posts(&self) -> Result<Vec<Post>, StoreError> {
        Ok(self.tables.lock().await.posts.clone())
    }

    async fn list_posts_by_author(&self, author_id: Uuid) -> Result<Vec<Post>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .posts
            .iter()
            .filter(|p| p.author_id == author_id)
            .cloned()
            .collect())
    }

    async fn toggle_like(&self, post_id: Uuid, user_id: &str) -> Result<Option<Post>, StoreError> {
        let mut tables = self.tables.lock().await;
        let Some(post) = tables.posts.iter_mut().find(|p| p.id == post_id) else {
            return Ok(None);
        };

        post.likes.toggle(user_id);
        post.updated_at = Utc::now();
        Ok(Some(post.clone()))
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError> {
        let mut tables = self.tables.lock().await;
        if tables.users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::Duplicate("Email".to_string()));
        }

        let now = Utc::now();
        let created = User {
            id: Uuid::new_v4(),
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            password_hash: user.password_hash,
            picture_path: user.picture_path,
            friends: Vec::new(),
            location: user.location,
            occupation: user.occupation,
            viewed_profile: user.viewed_profile,
            impressions: user.impressions,
            created_at: now,
            updated_at: now,
        };

        tables.users.push(created.clone());
        Ok(created)
    }

    async fn find_user(&self, user_id: Uuid) -> Result<Option<User>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables.users.iter().find(|u| u.id == user_id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables.users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_users(&self, user_ids: &[Uuid]) -> Result<Vec<User>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .users
            .iter()
            .filter(|u| user_ids.contains(&u.id))
            .cloned()
            .collect())
    }

    async fn toggle_friend(
        &self,
        user_id: Uuid,
        friend_id: Uuid,
    ) -> Result<Option<User>, StoreError> {
        let mut tables = self.tables.lock().await;
        let (Some(user_idx), Some(friend_idx)) = (
            tables.users.iter().position(|u| u.id == user_id),
            tables.users.iter().position(|u| u.id == friend_id),
        ) else {
            return Ok(None);
        };

        let now = Utc::now();
        let already_friends = tables.users[user_idx].friends.contains(&friend_id);

        for (idx, other) in [(user_idx, friend_id), (friend_idx, user_id)] {
            let entry = &mut tables.users[idx];
            entry.friends.retain(|id| *id != other);
            if !already_friends {
                entry.friends.push(other);
            }
            entry.updated_at = now;
        }

        Ok(Some(tables.users[user_idx].clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AuthorSnapshot;
    use std::sync::Arc;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            first_name: "Grace".into(),
            last_name: "Hopper".into(),
            email: email.into(),
            password_hash: "hash".into(),
            picture_path: "grace.png".into(),
            location: None,
            occupation: None,
            viewed_profile: 0,
            impressions: 0,
        }
    }

    fn new_post(author: &User, description: &str) -> NewPost {
        NewPost {
            author_id: author.id,
            author: AuthorSnapshot::of(author),
            description: Some(description.into()),
            media_path: None,
        }
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let store = InMemoryStore::new();
        store.insert_user(new_user("a@example.com")).await.unwrap();

        let err = store.insert_user(new_user("a@example.com")).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(_)));
    }

    #[tokio::test]
    async fn test_posts_listed_in_creation_order() {
        let store = InMemoryStore::new();
        let author = store.insert_user(new_user("a@example.com")).await.unwrap();
        let other = store.insert_user(new_user("b@example.com")).await.unwrap();

        store.insert_post(new_post(&author, "one")).await.unwrap();
        store.insert_post(new_post(&other, "two")).await.unwrap();
        store.insert_post(new_post(&author, "three")).await.unwrap();

        let all: Vec<_> = store
            .list_posts()
            .await
            .unwrap()
            .into_iter()
            .filter_map(|p| p.description)
            .collect();
        assert_eq!(all, vec!["one", "two", "three"]);

        let mine = store.list_posts_by_author(author.id).await.unwrap();
        assert_eq!(mine.len(), 2);
    }

    #[tokio::test]
    async fn test_toggle_like_missing_post() {
        let store = InMemoryStore::new();
        assert!(store
            .toggle_like(Uuid::new_v4(), "u1")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_concurrent_toggles_cancel_out() {
        let store = Arc::new(InMemoryStore::new());
        let author = store.insert_user(new_user("a@example.com")).await.unwrap();
        let post_id = store.insert_post(new_post(&author, "hello")).await.unwrap().id;

        let handles: Vec<_> = (0..2)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.toggle_like(post_id, "u1").await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let stored = store.find_post(post_id).await.unwrap().unwrap();
        assert!(!stored.likes.contains("u1"));
    }

    #[tokio::test]
    async fn test_concurrent_toggles_by_distinct_users() {
        let store = Arc::new(InMemoryStore::new());
        let author = store.insert_user(new_user("a@example.com")).await.unwrap();
        let post_id = store.insert_post(new_post(&author, "hello")).await.unwrap().id;

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move { store.toggle_like(post_id, &format!("u{}", i)).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let stored = store.find_post(post_id).await.unwrap().unwrap();
        assert_eq!(stored.likes.len(), 16);
    }

    #[tokio::test]
    async fn test_toggle_friend_is_mutual() {
        let store = InMemoryStore::new();
        let a = store.insert_user(new_user("a@example.com")).await.unwrap();
        let b = store.insert_user(new_user("b@example.com")).await.unwrap();

        let updated = store.toggle_friend(a.id, b.id).await.unwrap().unwrap();
        assert_eq!(updated.friends, vec![b.id]);
        let b_now = store.find_user(b.id).await.unwrap().unwrap();
        assert_eq!(b_now.friends, vec![a.id]);

        let updated = store.toggle_friend(a.id, b.id).await.unwrap().unwrap();
        assert!(updated.friends.is_empty());
        let b_now = store.find_user(b.id).await.unwrap().unwrap();
        assert!(b_now.friends.is_empty());
    }

    #[tokio::test]
    async fn test_toggle_friend_unknown_user() {
        let store = InMemoryStore::new();
        let a = store.insert_user(new_user("a@example.com")).await.unwrap();
        assert!(store
            .toggle_friend(a.id, Uuid::new_v4())
            .await
            .unwrap()
            .is_none());
    }
}
