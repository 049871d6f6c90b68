use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    error::Error,
    model::{NewUser, User, UserCredential, UserRole},
};

use super::error::DatabaseError;

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    email: String,
    role: UserRole,
    password: String,
}

#[tracing::instrument(name = "get user by email", skip_all)]
pub async fn get_user_by_email(pool: &PgPool, email: &str) -> Result<Option<UserCredential>, Error> {
    let row = sqlx::query_as::<_, UserRow>(
        r#"
        SELECT
            id, name, email, role, password
        FROM
            users
        WHERE
            email = $1
    "#,
    )
    .bind(email)
    .fetch_optional(pool)
    .await
    .map_err(DatabaseError::DatabaseError)?;

    Ok(row.map(|row| UserCredential {
        user: User {
            id: row.id,
            name: row.name,
            email: row.email,
            role: row.role,
        },
        password_hash: row.password,
    }))
}

#[tracing::instrument(name = "get user by id", skip_all, fields(user_id = %user_id))]
pub async fn get_user_by_id_optional(pool: &PgPool, user_id: Uuid) -> Result<Option<User>, Error> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT
            id, name, email, role
        FROM
            users
        WHERE
            id = $1;
    "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await
    .map_err(|e| Error::Database(DatabaseError::DatabaseError(e)))
}

#[tracing::instrument(name = "insert user", skip_all)]
pub async fn insert_user(pool: &PgPool, user: NewUser) -> Result<User, Error> {
    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users
            (id, name, email, password, role)
        VALUES
            ($1, $2, $3, $4, $5)
        RETURNING id, name, email, role;
    "#,
    )
    .bind(Uuid::new_v4())
    .bind(user.name)
    .bind(user.email)
    .bind(user.password_hash)
    .bind(user.role)
    .fetch_one(pool)
    .await
    .map_err(DatabaseError::from)?;

    Ok(user)
}
