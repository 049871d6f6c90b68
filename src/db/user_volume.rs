use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    error::Error,
    model::{UserVolume, VolumeProgressUpdate},
};

use super::error::DatabaseError;

#[tracing::instrument(name = "get user volumes", skip_all, fields(user_id = %user_id, volumes = volume_ids.len()))]
pub async fn get_user_volumes(
    pool: &PgPool,
    user_id: Uuid,
    volume_ids: &[Uuid],
) -> Result<Vec<UserVolume>, Error> {
    if volume_ids.is_empty() {
        return Ok(Vec::new());
    }

    let user_volumes = sqlx::query_as::<_, UserVolume>(
        r#"
        SELECT
            user_id, volume_id, owned, notified, created_at, updated_at
        FROM
            user_volumes
        WHERE
            user_id = $1 AND volume_id = ANY($2)
    "#,
    )
    .bind(user_id)
    .bind(volume_ids)
    .fetch_all(pool)
    .await
    .map_err(DatabaseError::DatabaseError)?;

    Ok(user_volumes)
}

/// One multi-row upsert inside a transaction, so either every row lands or none does.
#[tracing::instrument(name = "upsert user volumes", skip_all, fields(user_id = %user_id, volumes = updates.len()))]
pub async fn upsert_user_volumes(
    pool: &PgPool,
    user_id: Uuid,
    updates: &[VolumeProgressUpdate],
) -> Result<Vec<UserVolume>, Error> {
    if updates.is_empty() {
        return Ok(Vec::new());
    }

    let mut tx = pool.begin().await.map_err(DatabaseError::DatabaseError)?;

    let mut user_volume_builder: QueryBuilder<Postgres> = QueryBuilder::new(
        r#"
        INSERT INTO user_volumes
            (user_id, volume_id, owned, notified)
    "#,
    );
    user_volume_builder.push_values(updates, |mut b, update| {
        b.push_bind(user_id)
            .push_bind(update.volume_id)
            .push_bind(update.owned)
            .push_bind(false);
    });
    user_volume_builder.push(
        r#"
        ON CONFLICT (user_id, volume_id)
        DO UPDATE SET
            owned = EXCLUDED.owned,
            updated_at = now()
        RETURNING user_id, volume_id, owned, notified, created_at, updated_at;
    "#,
    );

    let user_volumes = user_volume_builder
        .build_query_as::<UserVolume>()
        .fetch_all(&mut *tx)
        .await
        .map_err(DatabaseError::from)?;

    tx.commit().await.map_err(DatabaseError::DatabaseError)?;

    Ok(user_volumes)
}
