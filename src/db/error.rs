#[derive(thiserror::Error, Debug)]
pub enum DatabaseError {
    #[error("Database error")]
    DatabaseError(sqlx::Error),
    #[error("Constraint violated: {0}")]
    Constraint(String),
}

impl From<sqlx::Error> for DatabaseError {
    fn from(value: sqlx::Error) -> Self {
        match &value {
            sqlx::Error::Database(db_error)
                if db_error.is_unique_violation() || db_error.is_foreign_key_violation() =>
            {
                DatabaseError::Constraint(db_error.message().to_string())
            }
            _ => DatabaseError::DatabaseError(value),
        }
    }
}
