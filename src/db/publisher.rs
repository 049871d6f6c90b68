use sqlx::PgPool;
use uuid::Uuid;

use crate::{error::Error, model::Publisher};

use super::error::DatabaseError;

#[tracing::instrument(name = "insert publisher", skip_all)]
pub async fn insert_publisher(
    pool: &PgPool,
    name: String,
    country: Option<String>,
) -> Result<Publisher, Error> {
    let publisher = sqlx::query_as::<_, Publisher>(
        r#"
        INSERT INTO publishers
            (id, name, country)
        VALUES
            ($1, $2, $3)
        RETURNING id, name, country, created_at, updated_at;
    "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(country)
    .fetch_one(pool)
    .await
    .map_err(DatabaseError::from)?;

    Ok(publisher)
}

#[tracing::instrument(name = "get publishers", skip_all)]
pub async fn get_publishers(pool: &PgPool) -> Result<Vec<Publisher>, Error> {
    let publishers = sqlx::query_as::<_, Publisher>(
        r#"
        SELECT
            id, name, country, created_at, updated_at
        FROM
            publishers
        ORDER BY name ASC
    "#,
    )
    .fetch_all(pool)
    .await
    .map_err(DatabaseError::DatabaseError)?;

    Ok(publishers)
}

#[tracing::instrument(name = "get publisher by id", skip_all, fields(publisher_id = %publisher_id))]
pub async fn get_publisher_by_id(
    pool: &PgPool,
    publisher_id: Uuid,
) -> Result<Option<Publisher>, Error> {
    let publisher = sqlx::query_as::<_, Publisher>(
        r#"
        SELECT
            id, name, country, created_at, updated_at
        FROM
            publishers
        WHERE
            id = $1
    "#,
    )
    .bind(publisher_id)
    .fetch_optional(pool)
    .await
    .map_err(DatabaseError::DatabaseError)?;

    Ok(publisher)
}
