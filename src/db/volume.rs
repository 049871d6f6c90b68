use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    error::Error,
    model::{NewVolume, Volume},
};

use super::error::DatabaseError;

const VOLUME_COLUMNS: &str =
    "id, number, title_id, title, cover_image, release_at, created_at, updated_at";

#[tracing::instrument(name = "get volumes by title", skip_all, fields(title_id = %title_id))]
pub async fn get_volumes_by_title(pool: &PgPool, title_id: Uuid) -> Result<Vec<Volume>, Error> {
    let volumes = sqlx::query_as::<_, Volume>(&format!(
        r#"
        SELECT {VOLUME_COLUMNS}
        FROM
            volumes
        WHERE
            title_id = $1
        ORDER BY number ASC
    "#
    ))
    .bind(title_id)
    .fetch_all(pool)
    .await
    .map_err(DatabaseError::DatabaseError)?;

    Ok(volumes)
}

#[tracing::instrument(name = "get volume by number", skip_all, fields(title_id = %title_id, number))]
pub async fn get_volume_by_title_and_number(
    pool: &PgPool,
    title_id: Uuid,
    number: i32,
) -> Result<Option<Volume>, Error> {
    let volume = sqlx::query_as::<_, Volume>(&format!(
        r#"
        SELECT {VOLUME_COLUMNS}
        FROM
            volumes
        WHERE
            title_id = $1 AND number = $2
    "#
    ))
    .bind(title_id)
    .bind(number)
    .fetch_optional(pool)
    .await
    .map_err(DatabaseError::DatabaseError)?;

    Ok(volume)
}

#[tracing::instrument(name = "insert volume", skip_all, fields(title_id = %title_id, number = volume.number))]
pub async fn insert_volume(pool: &PgPool, title_id: Uuid, volume: NewVolume) -> Result<Volume, Error> {
    let volume = sqlx::query_as::<_, Volume>(&format!(
        r#"
        INSERT INTO volumes
            (id, number, title_id, title, cover_image)
        VALUES
            ($1, $2, $3, $4, $5)
        RETURNING {VOLUME_COLUMNS};
    "#
    ))
    .bind(Uuid::new_v4())
    .bind(volume.number)
    .bind(title_id)
    .bind(volume.title)
    .bind(volume.cover_image)
    .fetch_one(pool)
    .await
    .map_err(DatabaseError::from)?;

    Ok(volume)
}

#[tracing::instrument(name = "update volume cover", skip_all, fields(volume_id = %volume_id))]
pub async fn update_volume_cover_image(
    pool: &PgPool,
    volume_id: Uuid,
    cover_image: &str,
) -> Result<(), Error> {
    sqlx::query(
        r#"
        UPDATE volumes
        SET
            cover_image = $2,
            updated_at = now()
        WHERE
            id = $1
    "#,
    )
    .bind(volume_id)
    .bind(cover_image)
    .execute(pool)
    .await
    .map_err(DatabaseError::DatabaseError)?;

    Ok(())
}
