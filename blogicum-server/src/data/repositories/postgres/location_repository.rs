use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::data::location_repository::LocationRepository;
use crate::domain::error::DomainError;
use crate::domain::location::{Location, LocationForm};
use crate::domain::publication::Publication;

#[derive(Debug, Clone)]
pub(crate) struct PostgresLocationRepository {
    pool: PgPool,
}

impl PostgresLocationRepository {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct LocationRow {
    id: i64,
    name: String,
    is_published: bool,
    created_at: DateTime<Utc>,
}

impl From<LocationRow> for Location {
    fn from(row: LocationRow) -> Self {
        Location {
            id: row.id,
            name: row.name,
            publication: Publication::new(row.is_published, row.created_at),
        }
    }
}

#[async_trait]
impl LocationRepository for PostgresLocationRepository {
    async fn create_location(&self, input: LocationForm) -> Result<Location, DomainError> {
        let row = sqlx::query_as::<_, LocationRow>(
            r#"
            INSERT INTO locations (name, is_published)
            VALUES ($1, $2)
            RETURNING id, name, is_published, created_at
            "#,
        )
        .bind(&input.name)
        .bind(input.is_published)
        .fetch_one(&self.pool)
        .await
        .map_err(map_location_db_error)?;

        Ok(row.into())
    }

    async fn get_location(&self, id: i64) -> Result<Option<Location>, DomainError> {
        let row = sqlx::query_as::<_, LocationRow>(
            "SELECT id, name, is_published, created_at FROM locations WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_location_db_error)?;

        Ok(row.map(Location::from))
    }

    async fn update_location(
        &self,
        id: i64,
        input: LocationForm,
    ) -> Result<Option<Location>, DomainError> {
        let row = sqlx::query_as::<_, LocationRow>(
            r#"
            UPDATE locations
            SET name = $2,
                is_published = $3
            WHERE id = $1
            RETURNING id, name, is_published, created_at
            "#,
        )
        .bind(id)
        .bind(&input.name)
        .bind(input.is_published)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_location_db_error)?;

        Ok(row.map(Location::from))
    }

    async fn delete_location(&self, id: i64) -> Result<bool, DomainError> {
        let mut tx = self.pool.begin().await.map_err(map_location_db_error)?;

        sqlx::query("UPDATE posts SET location_id = NULL WHERE location_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(map_location_db_error)?;
        let result = sqlx::query("DELETE FROM locations WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(map_location_db_error)?;

        tx.commit().await.map_err(map_location_db_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_locations(&self) -> Result<Vec<Location>, DomainError> {
        let rows = sqlx::query_as::<_, LocationRow>(
            "SELECT id, name, is_published, created_at FROM locations ORDER BY name ASC, id ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_location_db_error)?;

        Ok(rows.into_iter().map(Location::from).collect())
    }
}

fn map_location_db_error(err: sqlx::Error) -> DomainError {
    DomainError::Unexpected(err.to_string())
}
