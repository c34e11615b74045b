use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::data::comment_repository::{CommentRepository, NewComment};
use crate::data::post_repository::Pagination;
use crate::domain::comment::Comment;
use crate::domain::error::DomainError;
use crate::domain::post::AuthorRef;

macro_rules! select_comments {
    ($tail:expr) => {
        concat!(
            r#"
            SELECT
                cm.id,
                cm.text,
                cm.post_id,
                cm.created_at,
                u.id AS author_id,
                u.username AS author_username
            FROM comments cm
            JOIN users u ON u.id = cm.author_id
            "#,
            $tail
        )
    };
}

#[derive(Debug, Clone)]
pub(crate) struct PostgresCommentRepository {
    pool: PgPool,
}

impl PostgresCommentRepository {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct CommentRow {
    id: i64,
    text: String,
    post_id: i64,
    created_at: DateTime<Utc>,
    author_id: i64,
    author_username: String,
}

impl From<CommentRow> for Comment {
    fn from(row: CommentRow) -> Self {
        Comment {
            id: row.id,
            text: row.text,
            author: AuthorRef {
                id: row.author_id,
                username: row.author_username,
            },
            post_id: row.post_id,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn create_comment(&self, input: NewComment) -> Result<Comment, DomainError> {
        let row = sqlx::query_as::<_, CommentRow>(
            r#"
            WITH inserted AS (
                INSERT INTO comments (text, author_id, post_id)
                VALUES ($1, $2, $3)
                RETURNING id, text, post_id, created_at, author_id
            )
            SELECT
                inserted.id,
                inserted.text,
                inserted.post_id,
                inserted.created_at,
                u.id AS author_id,
                u.username AS author_username
            FROM inserted
            JOIN users u ON u.id = inserted.author_id
            "#,
        )
        .bind(&input.text)
        .bind(input.author_id)
        .bind(input.post_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_comment_db_error)?;

        Ok(row.into())
    }

    async fn get_comment(&self, id: i64) -> Result<Option<Comment>, DomainError> {
        let row = sqlx::query_as::<_, CommentRow>(select_comments!("WHERE cm.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_comment_db_error)?;

        Ok(row.map(Comment::from))
    }

    async fn update_comment(&self, id: i64, text: String) -> Result<Option<Comment>, DomainError> {
        let updated = sqlx::query("UPDATE comments SET text = $2 WHERE id = $1")
            .bind(id)
            .bind(text)
            .execute(&self.pool)
            .await
            .map_err(map_comment_db_error)?;

        if updated.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_comment(id).await
    }

    async fn delete_comment(&self, id: i64) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_comment_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_for_post(&self, post_id: i64) -> Result<Vec<Comment>, DomainError> {
        let rows = sqlx::query_as::<_, CommentRow>(select_comments!(
            "WHERE cm.post_id = $1 ORDER BY cm.created_at ASC, cm.id ASC"
        ))
        .bind(post_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_comment_db_error)?;

        Ok(rows.into_iter().map(Comment::from).collect())
    }

    async fn list_comments(&self, pagination: Pagination) -> Result<Vec<Comment>, DomainError> {
        let rows = sqlx::query_as::<_, CommentRow>(select_comments!(
            "ORDER BY cm.created_at DESC, cm.id DESC LIMIT $1 OFFSET $2"
        ))
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(map_comment_db_error)?;

        Ok(rows.into_iter().map(Comment::from).collect())
    }
}

fn map_comment_db_error(err: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db_err) = &err
        && db_err.code().as_deref() == Some("23503")
    {
        return match db_err.constraint() {
            Some("comments_post_id_fkey") => DomainError::not_found("post", "referenced by comment"),
            _ => DomainError::not_found("author", "referenced by comment"),
        };
    }
    DomainError::Unexpected(err.to_string())
}
