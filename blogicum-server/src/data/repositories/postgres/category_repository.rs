use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::data::category_repository::CategoryRepository;
use crate::domain::category::{Category, CategoryForm};
use crate::domain::error::DomainError;
use crate::domain::publication::Publication;

#[derive(Debug, Clone)]
pub(crate) struct PostgresCategoryRepository {
    pool: PgPool,
}

impl PostgresCategoryRepository {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct CategoryRow {
    id: i64,
    title: String,
    description: String,
    slug: String,
    is_published: bool,
    created_at: DateTime<Utc>,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Category {
            id: row.id,
            title: row.title,
            description: row.description,
            slug: row.slug,
            publication: Publication::new(row.is_published, row.created_at),
        }
    }
}

#[async_trait]
impl CategoryRepository for PostgresCategoryRepository {
    async fn create_category(&self, input: CategoryForm) -> Result<Category, DomainError> {
        let row = sqlx::query_as::<_, CategoryRow>(
            r#"
            INSERT INTO categories (title, description, slug, is_published)
            VALUES ($1, $2, $3, $4)
            RETURNING id, title, description, slug, is_published, created_at
            "#,
        )
        .bind(&input.title)
        .bind(&input.description)
        .bind(&input.slug)
        .bind(input.is_published)
        .fetch_one(&self.pool)
        .await
        .map_err(map_category_db_error)?;

        Ok(row.into())
    }

    async fn get_category(&self, id: i64) -> Result<Option<Category>, DomainError> {
        let row = sqlx::query_as::<_, CategoryRow>(
            r#"
            SELECT id, title, description, slug, is_published, created_at
            FROM categories
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_category_db_error)?;

        Ok(row.map(Category::from))
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Category>, DomainError> {
        let row = sqlx::query_as::<_, CategoryRow>(
            r#"
            SELECT id, title, description, slug, is_published, created_at
            FROM categories
            WHERE slug = $1
            "#,
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_category_db_error)?;

        Ok(row.map(Category::from))
    }

    async fn update_category(
        &self,
        id: i64,
        input: CategoryForm,
    ) -> Result<Option<Category>, DomainError> {
        let row = sqlx::query_as::<_, CategoryRow>(
            r#"
            UPDATE categories
            SET title = $2,
                description = $3,
                slug = $4,
                is_published = $5
            WHERE id = $1
            RETURNING id, title, description, slug, is_published, created_at
            "#,
        )
        .bind(id)
        .bind(&input.title)
        .bind(&input.description)
        .bind(&input.slug)
        .bind(input.is_published)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_category_db_error)?;

        Ok(row.map(Category::from))
    }

    async fn delete_category(&self, id: i64) -> Result<bool, DomainError> {
        let mut tx = self.pool.begin().await.map_err(map_category_db_error)?;

        sqlx::query("UPDATE posts SET category_id = NULL WHERE category_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(map_category_db_error)?;
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(map_category_db_error)?;

        tx.commit().await.map_err(map_category_db_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_categories(&self) -> Result<Vec<Category>, DomainError> {
        let rows = sqlx::query_as::<_, CategoryRow>(
            r#"
            SELECT id, title, description, slug, is_published, created_at
            FROM categories
            ORDER BY title ASC, id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_category_db_error)?;

        Ok(rows.into_iter().map(Category::from).collect())
    }
}

fn map_category_db_error(err: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db_err) = &err {
        match db_err.code().as_deref() {
            Some("23505") => return DomainError::invalid("slug", "must be unique"),
            Some("23514") => {
                return DomainError::invalid(
                    "slug",
                    "only latin letters, digits, hyphen and underscore are allowed",
                );
            }
            _ => {}
        }
    }
    DomainError::Unexpected(err.to_string())
}
