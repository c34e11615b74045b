use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::data::user_repository::{NewUser, UserCredentials, UserRepository};
use crate::domain::error::DomainError;
use crate::domain::user::{ProfileForm, User};

#[derive(Debug, Clone)]
pub(crate) struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    username: String,
    email: String,
    first_name: String,
    last_name: String,
    is_staff: bool,
    created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct UserCredentialsRow {
    #[sqlx(flatten)]
    user: UserRow,
    password_hash: String,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            username: row.username,
            email: row.email,
            first_name: row.first_name,
            last_name: row.last_name,
            is_staff: row.is_staff,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create_user(&self, input: NewUser) -> Result<User, DomainError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (username, email, password_hash, is_staff)
            VALUES ($1, $2, $3, $4)
            RETURNING id, username, email, first_name, last_name, is_staff, created_at
            "#,
        )
        .bind(&input.username)
        .bind(&input.email)
        .bind(&input.password_hash)
        .bind(input.is_staff)
        .fetch_one(&self.pool)
        .await
        .map_err(map_user_db_error)?;

        Ok(row.into())
    }

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserCredentials>, DomainError> {
        let row = sqlx::query_as::<_, UserCredentialsRow>(
            r#"
            SELECT
            id,
            username,
            email,
            first_name,
            last_name,
            is_staff,
            created_at,
            password_hash
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_user_db_error)?;

        Ok(row.map(|r| UserCredentials {
            user: r.user.into(),
            password_hash: r.password_hash,
        }))
    }

    async fn get_user(&self, id: i64) -> Result<Option<User>, DomainError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, email, first_name, last_name, is_staff, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_user_db_error)?;

        Ok(row.map(User::from))
    }

    async fn update_profile(
        &self,
        id: i64,
        input: ProfileForm,
    ) -> Result<Option<User>, DomainError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            UPDATE users
            SET first_name = $2,
                last_name = $3,
                username = $4,
                email = $5
            WHERE id = $1
            RETURNING id, username, email, first_name, last_name, is_staff, created_at
            "#,
        )
        .bind(id)
        .bind(&input.first_name)
        .bind(&input.last_name)
        .bind(&input.username)
        .bind(&input.email)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_user_db_error)?;

        Ok(row.map(User::from))
    }

    async fn delete_user(&self, id: i64) -> Result<Option<Vec<String>>, DomainError> {
        let mut tx = self.pool.begin().await.map_err(map_user_db_error)?;

        sqlx::query(
            r#"
            DELETE FROM comments
            WHERE author_id = $1
               OR post_id IN (SELECT id FROM posts WHERE author_id = $1)
            "#,
        )
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(map_user_db_error)?;
        let images: Vec<Option<String>> =
            sqlx::query_scalar("DELETE FROM posts WHERE author_id = $1 RETURNING image")
                .bind(id)
                .fetch_all(&mut *tx)
                .await
                .map_err(map_user_db_error)?;
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(map_user_db_error)?;

        tx.commit().await.map_err(map_user_db_error)?;
        if result.rows_affected() == 0 {
            return Ok(None);
        }
        Ok(Some(images.into_iter().flatten().collect()))
    }
}

fn map_user_db_error(err: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db_err) = &err
        && db_err.code().as_deref() == Some("23505")
    {
        let resource = match db_err.constraint() {
            Some("users_username_key") => "username",
            Some("users_email_key") => "email",
            _ => "user",
        };
        return DomainError::AlreadyExists(resource);
    }
    DomainError::Unexpected(err.to_string())
}
