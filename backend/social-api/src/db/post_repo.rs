use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{PostStore, StoreError};
use crate::models::{NewPost, Post};

/// PostgreSQL-backed post storage
#[derive(Clone)]
pub struct PgPostStore {
    pool: PgPool,
}

impl PgPostStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PostStore for PgPostStore {
    async fn insert_post(&self, post: NewPost) -> Result<Post, StoreError> {
        let created = sqlx::query_as::<_, Post>(
            r#"
            INSERT INTO posts (
                id, author_id, first_name, last_name, location, user_picture_path,
                description, media_path, likes, comments
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, '{}'::jsonb, '[]'::jsonb)
            RETURNING id, author_id, first_name, last_name, location, user_picture_path,
                      description, media_path, likes, comments, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(post.author_id)
        .bind(&post.author.first_name)
        .bind(&post.author.last_name)
        .bind(&post.author.location)
        .bind(&post.author.user_picture_path)
        .bind(&post.description)
        .bind(&post.media_path)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn find_post(&self, post_id: Uuid) -> Result<Option<Post>, StoreError> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            SELECT id, author_id, first_name, last_name, location, user_picture_path,
                   description, media_path, likes, comments, created_at, updated_at
            FROM posts
            WHERE id = $1
            "#,
        )
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(post)
    }

    async fn list_posts(&self) -> Result<Vec<Post>, StoreError> {
        let posts = sqlx::query_as::<_, Post>(
            r#"
            SELECT id, author_id, first_name, last_name, location, user_picture_path,
                   description, media_path, likes, comments, created_at, updated_at
            FROM posts
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(posts)
    }

    async fn list_posts_by_author(&self, author_id: Uuid) -> Result<Vec<Post>, StoreError> {
        let posts = sqlx::query_as::<_, Post>(
            r#"
            SELECT id, author_id, first_name, last_name, location, user_picture_path,
                   description, media_path, likes, comments, created_at, updated_at
            FROM posts
            WHERE author_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(author_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(posts)
    }

    async fn toggle_like(&self, post_id: Uuid, user_id: &str) -> Result<Option<Post>, StoreError> {
        // Membership test and flip happen in a single row update, so two
        // concurrent toggles by the same user always cancel out.
        let post = sqlx::query_as::<_, Post>(
            r#"
            UPDATE posts
            SET likes = CASE
                    WHEN likes ? $2::text THEN likes - $2::text
                    ELSE likes || jsonb_build_object($2::text, true)
                END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, author_id, first_name, last_name, location, user_picture_path,
                      description, media_path, likes, comments, created_at, updated_at
            "#,
        )
        .bind(post_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(post)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
