use std::sync::Arc;
use std::time::Duration;

use tracing::info;
use uuid::Uuid;

use super::store_call;
use crate::db::UserStore;
use crate::error::{AppError, Result};
use crate::models::{FriendSummary, User};

pub struct UserService {
    users: Arc<dyn UserStore>,
    deadline: Duration,
}

impl UserService {
    pub fn new(users: Arc<dyn UserStore>, deadline: Duration) -> Self {
        Self { users, deadline }
    }

    pub async fn get_user(&self, user_id: Uuid) -> Result<User> {
        store_call("find_user", self.deadline, self.users.find_user(user_id))
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    /// Friends of `user_id` in the order they were added.
    pub async fn friends(&self, user_id: Uuid) -> Result<Vec<FriendSummary>> {
        let user = self.get_user(user_id).await?;
        self.summarize(&user.friends).await
    }

    /// Add or remove a mutual friendship, returning the caller's new friend list.
    pub async fn toggle_friend(&self, user_id: Uuid, friend_id: Uuid) -> Result<Vec<FriendSummary>> {
        if user_id == friend_id {
            return Err(AppError::BadRequest(
                "A user cannot befriend themselves".to_string(),
            ));
        }

        let user = store_call(
            "toggle_friend",
            self.deadline,
            self.users.toggle_friend(user_id, friend_id),
        )
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        info!(
            user_id = %user_id,
            friend_id = %friend_id,
            now_friends = user.friends.contains(&friend_id),
            "friendship toggled"
        );

        self.summarize(&user.friends).await
    }

    async fn summarize(&self, friend_ids: &[Uuid]) -> Result<Vec<FriendSummary>> {
        let found = store_call("find_users", self.deadline, self.users.find_users(friend_ids)).await?;

        Ok(friend_ids
            .iter()
            .filter_map(|id| found.iter().find(|u| u.id == *id))
            .map(FriendSummary::from)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::InMemoryStore;
    use crate::models::NewUser;

    fn new_user(first_name: &str, email: &str) -> NewUser {
        NewUser {
            first_name: first_name.into(),
            last_name: "Tester".into(),
            email: email.into(),
            password_hash: "hash".into(),
            picture_path: format!("{}.png", first_name),
            location: None,
            occupation: None,
            viewed_profile: 0,
            impressions: 0,
        }
    }

    #[tokio::test]
    async fn test_friend_toggle_and_listing() {
        let store = Arc::new(InMemoryStore::new());
        let a = store.insert_user(new_user("Ann", "ann@example.com")).await.unwrap();
        let b = store.insert_user(new_user("Bob", "bob@example.com")).await.unwrap();
        let c = store.insert_user(new_user("Cat", "cat@example.com")).await.unwrap();
        let service = UserService::new(store, Duration::from_secs(1));

        service.toggle_friend(a.id, c.id).await.unwrap();
        let friends = service.toggle_friend(a.id, b.id).await.unwrap();
        let names: Vec<_> = friends.iter().map(|f| f.first_name.as_str()).collect();
        assert_eq!(names, vec!["Cat", "Bob"]);

        let bobs = service.friends(b.id).await.unwrap();
        assert_eq!(bobs.len(), 1);
        assert_eq!(bobs[0].id, a.id);

        let friends = service.toggle_friend(a.id, c.id).await.unwrap();
        assert_eq!(friends.len(), 1);
        assert!(service.friends(c.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_self_friend_rejected() {
        let store = Arc::new(InMemoryStore::new());
        let a = store.insert_user(new_user("Ann", "ann@example.com")).await.unwrap();
        let service = UserService::new(store, Duration::from_secs(1));

        let err = service.toggle_friend(a.id, a.id).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_unknown_user() {
        let service = UserService::new(Arc::new(InMemoryStore::new()), Duration::from_secs(1));
        assert!(matches!(
            service.get_user(Uuid::new_v4()).await.unwrap_err(),
            AppError::NotFound(_)
        ));
        assert!(matches!(
            service.toggle_friend(Uuid::new_v4(), Uuid::new_v4()).await.unwrap_err(),
            AppError::NotFound(_)
        ));
    }
}
