use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::data::post_repository::{NewPost, Pagination, PostFilter, PostPatch, PostRepository};
use crate::domain::category::CategoryRef;
use crate::domain::error::DomainError;
use crate::domain::location::LocationRef;
use crate::domain::post::{AuthorRef, Post};
use crate::domain::publication::Publication;

/// Post columns joined with author, location, category and comment count.
macro_rules! select_posts {
    ($($tail:expr),+ $(,)?) => {
        concat!(
            r#"
            SELECT
                p.id,
                p.title,
                p.text,
                p.pub_date,
                p.image,
                p.is_published,
                p.created_at,
                u.id AS author_id,
                u.username AS author_username,
                l.id AS location_id,
                l.name AS location_name,
                c.id AS category_id,
                c.title AS category_title,
                c.slug AS category_slug,
                c.is_published AS category_is_published,
                (SELECT COUNT(*) FROM comments cm WHERE cm.post_id = p.id) AS comment_count
            FROM posts p
            JOIN users u ON u.id = p.author_id
            LEFT JOIN locations l ON l.id = p.location_id
            LEFT JOIN categories c ON c.id = p.category_id
            "#,
            $($tail),+
        )
    };
}

/// Binds, in order: include_hidden, now, viewer_id, author_id, category_id,
/// location_id.
macro_rules! post_filter {
    () => {
        r#"
        WHERE ($1 OR (p.is_published AND p.pub_date <= $2 AND c.is_published IS TRUE)
               OR p.author_id = $3)
          AND ($4::BIGINT IS NULL OR p.author_id = $4)
          AND ($5::BIGINT IS NULL OR p.category_id = $5)
          AND ($6::BIGINT IS NULL OR p.location_id = $6)
        "#
    };
}

#[derive(Debug, Clone)]
pub(crate) struct PostgresPostRepository {
    pool: PgPool,
}

impl PostgresPostRepository {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_post(&self, id: i64) -> Result<Option<Post>, DomainError> {
        let row = sqlx::query_as::<_, PostRow>(select_posts!("WHERE p.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_post_db_error)?;

        Ok(row.map(Post::from))
    }
}

#[derive(sqlx::FromRow)]
struct PostRow {
    id: i64,
    title: String,
    text: String,
    pub_date: DateTime<Utc>,
    image: Option<String>,
    is_published: bool,
    created_at: DateTime<Utc>,
    author_id: i64,
    author_username: String,
    location_id: Option<i64>,
    location_name: Option<String>,
    category_id: Option<i64>,
    category_title: Option<String>,
    category_slug: Option<String>,
    category_is_published: Option<bool>,
    comment_count: i64,
}

impl From<PostRow> for Post {
    fn from(row: PostRow) -> Self {
        let location = match (row.location_id, row.location_name) {
            (Some(id), Some(name)) => Some(LocationRef { id, name }),
            _ => None,
        };
        let category = match (
            row.category_id,
            row.category_title,
            row.category_slug,
            row.category_is_published,
        ) {
            (Some(id), Some(title), Some(slug), Some(is_published)) => Some(CategoryRef {
                id,
                title,
                slug,
                is_published,
            }),
            _ => None,
        };

        Post {
            id: row.id,
            title: row.title,
            text: row.text,
            pub_date: row.pub_date,
            author: AuthorRef {
                id: row.author_id,
                username: row.author_username,
            },
            location,
            category,
            image: row.image,
            comment_count: row.comment_count,
            publication: Publication::new(row.is_published, row.created_at),
        }
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO posts (title, text, pub_date, is_published, location_id, category_id, author_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(&input.title)
        .bind(&input.text)
        .bind(input.pub_date)
        .bind(input.is_published)
        .bind(input.location_id)
        .bind(input.category_id)
        .bind(input.author_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        self.fetch_post(id)
            .await?
            .ok_or_else(|| DomainError::Unexpected(format!("post {id} vanished after insert")))
    }

    async fn get_post(&self, id: i64) -> Result<Option<Post>, DomainError> {
        self.fetch_post(id).await
    }

    async fn update_post(&self, id: i64, patch: PostPatch) -> Result<Option<Post>, DomainError> {
        let updated = sqlx::query(
            r#"
            UPDATE posts
            SET title = $2,
                text = $3,
                pub_date = $4,
                is_published = $5,
                location_id = $6,
                category_id = $7
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&patch.title)
        .bind(&patch.text)
        .bind(patch.pub_date)
        .bind(patch.is_published)
        .bind(patch.location_id)
        .bind(patch.category_id)
        .execute(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        if updated.rows_affected() == 0 {
            return Ok(None);
        }
        self.fetch_post(id).await
    }

    async fn set_image(
        &self,
        id: i64,
        image: Option<String>,
    ) -> Result<Option<Post>, DomainError> {
        let updated = sqlx::query("UPDATE posts SET image = $2 WHERE id = $1")
            .bind(id)
            .bind(image)
            .execute(&self.pool)
            .await
            .map_err(map_post_db_error)?;

        if updated.rows_affected() == 0 {
            return Ok(None);
        }
        self.fetch_post(id).await
    }

    async fn delete_post(&self, id: i64) -> Result<bool, DomainError> {
        let mut tx = self.pool.begin().await.map_err(map_post_db_error)?;

        sqlx::query("DELETE FROM comments WHERE post_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(map_post_db_error)?;
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(map_post_db_error)?;

        tx.commit().await.map_err(map_post_db_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_posts(
        &self,
        filter: &PostFilter,
        pagination: Pagination,
    ) -> Result<Vec<Post>, DomainError> {
        let rows = sqlx::query_as::<_, PostRow>(select_posts!(
            post_filter!(),
            "ORDER BY p.pub_date DESC, p.id DESC LIMIT $7 OFFSET $8"
        ))
        .bind(filter.include_hidden)
        .bind(filter.now)
        .bind(filter.viewer_id)
        .bind(filter.author_id)
        .bind(filter.category_id)
        .bind(filter.location_id)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        Ok(rows.into_iter().map(Post::from).collect())
    }

    async fn count_posts(&self, filter: &PostFilter) -> Result<i64, DomainError> {
        sqlx::query_scalar::<_, i64>(concat!(
            r#"
            SELECT COUNT(*)
            FROM posts p
            LEFT JOIN categories c ON c.id = p.category_id
            "#,
            post_filter!()
        ))
        .bind(filter.include_hidden)
        .bind(filter.now)
        .bind(filter.viewer_id)
        .bind(filter.author_id)
        .bind(filter.category_id)
        .bind(filter.location_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_post_db_error)
    }
}

fn map_post_db_error(err: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db_err) = &err
        && db_err.code().as_deref() == Some("23503")
    {
        return match db_err.constraint() {
            Some("posts_category_id_fkey") => DomainError::invalid("category", "does not exist"),
            Some("posts_location_id_fkey") => DomainError::invalid("location", "does not exist"),
            _ => DomainError::not_found("author", "referenced by post"),
        };
    }
    DomainError::Unexpected(err.to_string())
}
