use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    error::Error,
    model::{NewTitle, NewVolume, Title, TitleChanges, Volume},
};

use super::{PostgresTransaction, error::DatabaseError};

const TITLE_COLUMNS: &str = r#"
    id, name, slug, publisher_id, status,
    synopsis, author, genre, cover_image,
    created_at, updated_at
"#;

#[tracing::instrument(name = "insert title", skip_all, fields(slug = %title.slug))]
pub async fn insert_title(pool: &PgPool, title: NewTitle) -> Result<(Title, Vec<Volume>), Error> {
    let mut tx = pool.begin().await.map_err(DatabaseError::DatabaseError)?;

    let created = sqlx::query_as::<_, Title>(&format!(
        r#"
        INSERT INTO titles
            (id, name, slug, publisher_id, status, synopsis, author, genre, cover_image)
        VALUES
            ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING {TITLE_COLUMNS};
    "#
    ))
    .bind(Uuid::new_v4())
    .bind(&title.name)
    .bind(&title.slug)
    .bind(title.publisher_id)
    .bind(title.status)
    .bind(&title.synopsis)
    .bind(&title.author)
    .bind(&title.genre)
    .bind(&title.cover_image)
    .fetch_one(&mut *tx)
    .await
    .map_err(DatabaseError::from)?;

    let volumes = insert_volumes(&mut tx, created.id, &title.volumes).await?;

    tx.commit().await.map_err(DatabaseError::DatabaseError)?;

    Ok((created, volumes))
}

async fn insert_volumes(
    tx: &mut PostgresTransaction,
    title_id: Uuid,
    data: &[NewVolume],
) -> Result<Vec<Volume>, Error> {
    let mut volumes = Vec::with_capacity(data.len());

    for batch in data.chunks(200) {
        let mut volume_builder: QueryBuilder<Postgres> = QueryBuilder::new(
            r#"
            INSERT INTO volumes
                (id, number, title_id, title, cover_image)
        "#,
        );

        volume_builder.push_values(batch, |mut b, volume| {
            b.push_bind(Uuid::new_v4())
                .push_bind(volume.number)
                .push_bind(title_id)
                .push_bind(&volume.title)
                .push_bind(&volume.cover_image);
        });
        volume_builder.push(
            r#"
            RETURNING id, number, title_id, title, cover_image, release_at, created_at, updated_at;
        "#,
        );

        let mut inserted = volume_builder
            .build_query_as::<Volume>()
            .fetch_all(&mut **tx)
            .await
            .map_err(DatabaseError::from)?;
        volumes.append(&mut inserted);
    }

    volumes.sort_by_key(|v| v.number);

    Ok(volumes)
}

#[tracing::instrument(name = "get titles", skip_all)]
pub async fn get_titles(pool: &PgPool) -> Result<Vec<Title>, Error> {
    let titles = sqlx::query_as::<_, Title>(&format!(
        r#"
        SELECT {TITLE_COLUMNS}
        FROM
            titles
        ORDER BY created_at DESC
    "#
    ))
    .fetch_all(pool)
    .await
    .map_err(DatabaseError::DatabaseError)?;

    Ok(titles)
}

#[tracing::instrument(name = "get titles by publisher", skip_all, fields(publisher_id = %publisher_id))]
pub async fn get_titles_by_publisher(pool: &PgPool, publisher_id: Uuid) -> Result<Vec<Title>, Error> {
    let titles = sqlx::query_as::<_, Title>(&format!(
        r#"
        SELECT {TITLE_COLUMNS}
        FROM
            titles
        WHERE
            publisher_id = $1
        ORDER BY name ASC
    "#
    ))
    .bind(publisher_id)
    .fetch_all(pool)
    .await
    .map_err(DatabaseError::DatabaseError)?;

    Ok(titles)
}

#[tracing::instrument(name = "get title by id", skip_all, fields(title_id = %title_id))]
pub async fn get_title_by_id(pool: &PgPool, title_id: Uuid) -> Result<Option<Title>, Error> {
    let title = sqlx::query_as::<_, Title>(&format!(
        r#"
        SELECT {TITLE_COLUMNS}
        FROM
            titles
        WHERE
            id = $1
    "#
    ))
    .bind(title_id)
    .fetch_optional(pool)
    .await
    .map_err(DatabaseError::DatabaseError)?;

    Ok(title)
}

#[tracing::instrument(name = "update title", skip_all, fields(title_id = %title_id))]
pub async fn update_title(
    pool: &PgPool,
    title_id: Uuid,
    changes: TitleChanges,
) -> Result<Option<Title>, Error> {
    let title = sqlx::query_as::<_, Title>(&format!(
        r#"
        UPDATE titles
        SET
            name = COALESCE($2, name),
            slug = COALESCE($3, slug),
            publisher_id = COALESCE($4, publisher_id),
            status = COALESCE($5, status),
            synopsis = COALESCE($6, synopsis),
            author = COALESCE($7, author),
            genre = COALESCE($8, genre),
            cover_image = COALESCE($9, cover_image),
            updated_at = now()
        WHERE
            id = $1
        RETURNING {TITLE_COLUMNS};
    "#
    ))
    .bind(title_id)
    .bind(changes.name)
    .bind(changes.slug)
    .bind(changes.publisher_id)
    .bind(changes.status)
    .bind(changes.synopsis)
    .bind(changes.author)
    .bind(changes.genre)
    .bind(changes.cover_image)
    .fetch_optional(pool)
    .await
    .map_err(DatabaseError::from)?;

    Ok(title)
}

#[tracing::instrument(name = "delete title", skip_all, fields(title_id = %title_id))]
pub async fn delete_title(pool: &PgPool, title_id: Uuid) -> Result<bool, Error> {
    let result = sqlx::query(
        r#"
        DELETE FROM titles
        WHERE
            id = $1
    "#,
    )
    .bind(title_id)
    .execute(pool)
    .await
    .map_err(DatabaseError::DatabaseError)?;

    Ok(result.rows_affected() > 0)
}
