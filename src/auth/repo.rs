use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// User record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl User {
    /// Find a user by email.
    pub async fn find_by_email(db: &PgPool, email: &str) -> sqlx::Result<Option<User>> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await
    }

    /// Find a user holding either the email or the username.
    pub async fn find_by_email_or_username(
        db: &PgPool,
        email: &str,
        username: &str,
    ) -> sqlx::Result<Option<User>> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, created_at, updated_at
            FROM users
            WHERE email = $1 OR username = $2
            "#,
        )
        .bind(email)
        .bind(username)
        .fetch_optional(db)
        .await
    }

    /// Create a new user with a hashed password.
    pub async fn create(
        db: &PgPool,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> sqlx::Result<User> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, username, email, password_hash, created_at, updated_at
            "#,
        )
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .fetch_one(db)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use axum::http::StatusCode;

    async fn user_count(pool: &PgPool, email: &str) -> i64 {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE email = $1")
            .bind(email)
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[sqlx::test]
    async fn duplicate_email_is_rejected_and_one_record_survives(pool: PgPool) {
        User::create(&pool, "alice", "alice@x.com", "hash-1")
            .await
            .unwrap();

        let err = User::create(&pool, "other", "alice@x.com", "hash-2")
            .await
            .unwrap_err();
        let api = ApiError::from(err);
        assert_eq!(api.status(), StatusCode::CONFLICT);

        assert_eq!(user_count(&pool, "alice@x.com").await, 1);
        let survivor = User::find_by_email(&pool, "alice@x.com")
            .await
            .unwrap()
            .expect("first registration should survive");
        assert_eq!(survivor.username, "alice");
        assert_eq!(survivor.password_hash, "hash-1");
    }

    #[sqlx::test]
    async fn duplicate_username_is_rejected(pool: PgPool) {
        User::create(&pool, "alice", "alice@x.com", "hash-1")
            .await
            .unwrap();

        let err = User::create(&pool, "alice", "other@x.com", "hash-2")
            .await
            .unwrap_err();
        assert_eq!(ApiError::from(err).status(), StatusCode::CONFLICT);
        assert_eq!(user_count(&pool, "other@x.com").await, 0);
    }

    #[sqlx::test]
    async fn find_by_email_or_username_matches_either(pool: PgPool) {
        let created = User::create(&pool, "alice", "alice@x.com", "hash-1")
            .await
            .unwrap();

        let by_email = User::find_by_email_or_username(&pool, "alice@x.com", "someone-else")
            .await
            .unwrap()
            .expect("email should match");
        assert_eq!(by_email.id, created.id);

        let by_username = User::find_by_email_or_username(&pool, "other@x.com", "alice")
            .await
            .unwrap()
            .expect("username should match");
        assert_eq!(by_username.id, created.id);

        assert!(
            User::find_by_email_or_username(&pool, "other@x.com", "someone-else")
                .await
                .unwrap()
                .is_none()
        );
    }
}
