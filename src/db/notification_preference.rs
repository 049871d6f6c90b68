use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    error::Error,
    model::{NotificationPreference, Subscriber},
};

use super::error::DatabaseError;

#[tracing::instrument(name = "get notification preference", skip_all, fields(user_id = %user_id, title_id = %title_id))]
pub async fn get_notification_preference(
    pool: &PgPool,
    user_id: Uuid,
    title_id: Uuid,
) -> Result<Option<NotificationPreference>, Error> {
    let preference = sqlx::query_as::<_, NotificationPreference>(
        r#"
        SELECT
            user_id, title_id, email_on_new_volume, created_at, updated_at
        FROM
            notification_preferences
        WHERE
            user_id = $1 AND title_id = $2
    "#,
    )
    .bind(user_id)
    .bind(title_id)
    .fetch_optional(pool)
    .await
    .map_err(DatabaseError::DatabaseError)?;

    Ok(preference)
}

#[tracing::instrument(name = "upsert notification preference", skip_all, fields(user_id = %user_id, title_id = %title_id, enabled))]
pub async fn upsert_notification_preference(
    pool: &PgPool,
    user_id: Uuid,
    title_id: Uuid,
    enabled: bool,
) -> Result<NotificationPreference, Error> {
    let preference = sqlx::query_as::<_, NotificationPreference>(
        r#"
        INSERT INTO notification_preferences
            (user_id, title_id, email_on_new_volume)
        VALUES
            ($1, $2, $3)
        ON CONFLICT (user_id, title_id)
        DO UPDATE SET
            email_on_new_volume = EXCLUDED.email_on_new_volume,
            updated_at = now()
        RETURNING user_id, title_id, email_on_new_volume, created_at, updated_at;
    "#,
    )
    .bind(user_id)
    .bind(title_id)
    .bind(enabled)
    .fetch_one(pool)
    .await
    .map_err(DatabaseError::from)?;

    Ok(preference)
}

#[tracing::instrument(name = "get subscribers", skip_all, fields(title_id = %title_id))]
pub async fn get_subscribers(pool: &PgPool, title_id: Uuid) -> Result<Vec<Subscriber>, Error> {
    let subscribers = sqlx::query_as::<_, Subscriber>(
        r#"
        SELECT
            users.id AS user_id, users.email, users.name, titles.name AS title_name
        FROM
            notification_preferences
        INNER JOIN
            users ON notification_preferences.user_id = users.id
        INNER JOIN
            titles ON notification_preferences.title_id = titles.id
        WHERE
            notification_preferences.title_id = $1
            AND notification_preferences.email_on_new_volume
    "#,
    )
    .bind(title_id)
    .fetch_all(pool)
    .await
    .map_err(DatabaseError::DatabaseError)?;

    Ok(subscribers)
}
