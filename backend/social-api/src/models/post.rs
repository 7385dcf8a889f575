use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::BTreeMap;
use uuid::Uuid;

use super::User;

/// Author display fields copied onto a post when it is created.
///
/// The copy is never refreshed, so later profile edits do not show up on
/// older posts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AuthorSnapshot {
    pub first_name: String,
    pub last_name: String,
    pub location: Option<String>,
    pub user_picture_path: String,
}

impl AuthorSnapshot {
    pub fn of(user: &User) -> Self {
        Self {
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            location: user.location.clone(),
            user_picture_path: user.picture_path.clone(),
        }
    }
}

/// Outcome of flipping one user's like on a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeState {
    Liked,
    Unliked,
}

impl LikeState {
    pub fn as_str(&self) -> &'static str {
        match self {
            LikeState::Liked => "liked",
            LikeState::Unliked => "unliked",
        }
    }
}

/// The set of users who like a post.
///
/// Serialized as a JSON object from user id to `true`; a user who does not
/// like the post has no key at all.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Likes(BTreeMap<String, bool>);

impl Likes {
    pub fn contains(&self, user_id: &str) -> bool {
        self.0.contains_key(user_id)
    }

    /// Remove `user_id` if present, otherwise add it.
    pub fn toggle(&mut self, user_id: &str) -> LikeState {
        if self.0.remove(user_id).is_some() {
            LikeState::Unliked
        } else {
            self.0.insert(user_id.to_string(), true);
            LikeState::Liked
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn user_ids(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    #[serde(rename = "_id")]
    pub id: Uuid,
    #[serde(rename = "userId")]
    pub author_id: Uuid,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub author: AuthorSnapshot,
    pub description: Option<String>,
    #[serde(rename = "picturePath")]
    pub media_path: Option<String>,
    #[sqlx(json)]
    pub likes: Likes,
    #[sqlx(json)]
    pub comments: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Everything needed to insert a post; ids and timestamps are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub author_id: Uuid,
    pub author: AuthorSnapshot,
    pub description: Option<String>,
    pub media_path: Option<String>,
}
