use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{StoreError, UserStore};
use crate::models::{NewUser, User};

/// PostgreSQL-backed user storage
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError> {
        let result = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (
                id, first_name, last_name, email, password_hash, picture_path,
                location, occupation, viewed_profile, impressions
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id, first_name, last_name, email, password_hash, picture_path, friends,
                      location, occupation, viewed_profile, impressions, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.picture_path)
        .bind(&user.location)
        .bind(&user.occupation)
        .bind(user.viewed_profile)
        .bind(user.impressions)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(created) => Ok(created),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(StoreError::Duplicate("Email".to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn find_user(&self, user_id: Uuid) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, first_name, last_name, email, password_hash, picture_path, friends,
                   location, occupation, viewed_profile, impressions, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, first_name, last_name, email, password_hash, picture_path, friends,
                   location, occupation, viewed_profile, impressions, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_users(&self, user_ids: &[Uuid]) -> Result<Vec<User>, StoreError> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }

        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, first_name, last_name, email, password_hash, picture_path, friends,
                   location, occupation, viewed_profile, impressions, created_at, updated_at
            FROM users
            WHERE id = ANY($1)
            "#,
        )
        .bind(user_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    async fn toggle_friend(
        &self,
        user_id: Uuid,
        friend_id: Uuid,
    ) -> Result<Option<User>, StoreError> {
        let mut tx = self.pool.begin().await?;

        // Lock both rows in id order so opposite toggles cannot deadlock.
        let locked: Vec<(Uuid, Vec<Uuid>)> = sqlx::query_as(
            r#"
            SELECT id, friends
            FROM users
            WHERE id = ANY($1)
            ORDER BY id
            FOR UPDATE
            "#,
        )
        .bind(&[user_id, friend_id][..])
        .fetch_all(&mut *tx)
        .await?;

        let Some((_, friends)) = locked.iter().find(|(id, _)| *id == user_id) else {
            return Ok(None);
        };
        if !locked.iter().any(|(id, _)| *id == friend_id) {
            return Ok(None);
        }

        if friends.contains(&friend_id) {
            sqlx::query(
                r#"
                UPDATE users
                SET friends = array_remove(friends, $2), updated_at = NOW()
                WHERE id = $1
                "#,
            )
            .bind(user_id)
            .bind(friend_id)
            .execute(&mut *tx)
            .await?;

            sqlx::query(
                r#"
                UPDATE users
                SET friends = array_remove(friends, $2), updated_at = NOW()
                WHERE id = $1
                "#,
            )
            .bind(friend_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        } else {
            sqlx::query(
                r#"
                UPDATE users
                SET friends = array_append(friends, $2), updated_at = NOW()
                WHERE id = $1 AND NOT ($2 = ANY(friends))
                "#,
            )
            .bind(user_id)
            .bind(friend_id)
            .execute(&mut *tx)
            .await?;

            sqlx::query(
                r#"
                UPDATE users
                SET friends = array_append(friends, $2), updated_at = NOW()
                WHERE id = $1 AND NOT ($2 = ANY(friends))
                "#,
            )
            .bind(friend_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        }

        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, first_name, last_name, email, password_hash, picture_path, friends,
                   location, occupation, viewed_profile, impressions, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(user))
    }
}
