use std::borrow::Cow;

use axum::{Json, http::StatusCode, response::IntoResponse};
use validator::{ValidationError, ValidationErrors};

use crate::{auth::error::AuthError, db::error::DatabaseError, model::ApiResponse};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Database error")]
    Database(DatabaseError),

    #[error("Auth error")]
    Auth(AuthError),

    #[error("Validation error")]
    Validation(ValidationErrors),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Other error: {0}")]
    Other(anyhow::Error),
}

impl From<DatabaseError> for Error {
    fn from(value: DatabaseError) -> Self {
        Self::Database(value)
    }
}

impl From<sqlx::Error> for Error {
    fn from(value: sqlx::Error) -> Self {
        Self::Database(value.into())
    }
}

impl From<AuthError> for Error {
    fn from(value: AuthError) -> Self {
        Self::Auth(value)
    }
}

/// Single-field validation failure, e.g. a volume that belongs to another title.
pub fn validation_error(field: &'static str, code: &'static str, message: &'static str) -> Error {
    let mut errors = ValidationErrors::new();
    errors.add(
        field,
        ValidationError::new(code).with_message(Cow::from(message)),
    );
    Error::Validation(errors)
}

fn failure(status: StatusCode, message: impl Into<String>) -> axum::response::Response {
    (status, Json(ApiResponse::failure(message))).into_response()
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        match self {
            Error::Database(database_error) => match database_error {
                DatabaseError::DatabaseError(error) => {
                    tracing::error!(err.msg = %error, err.details=?error, "Database Error");

                    StatusCode::INTERNAL_SERVER_ERROR.into_response()
                }
                DatabaseError::Constraint(message) => {
                    tracing::warn!(err.msg = %message, "Constraint Error");

                    failure(StatusCode::CONFLICT, message)
                }
            },
            Error::Auth(auth_error) => match auth_error {
                AuthError::JwtError(error) => {
                    tracing::error!(err.msg = %error, err.details=?error, "JWT Error");

                    StatusCode::INTERNAL_SERVER_ERROR.into_response()
                }
                AuthError::PasswordError(error) => {
                    tracing::error!(err.msg = %error, err.details=?error, "Password Hash Error");

                    StatusCode::INTERNAL_SERVER_ERROR.into_response()
                }
                AuthError::Unauthenticated => StatusCode::UNAUTHORIZED.into_response(),
                AuthError::IncorrectCredential => {
                    failure(StatusCode::UNAUTHORIZED, AuthError::IncorrectCredential.to_string())
                }
                AuthError::Forbidden => StatusCode::FORBIDDEN.into_response(),
                AuthError::EmailTaken => {
                    failure(StatusCode::CONFLICT, AuthError::EmailTaken.to_string())
                }
                AuthError::RegistrationDisabled => {
                    failure(StatusCode::FORBIDDEN, AuthError::RegistrationDisabled.to_string())
                }
            },
            Error::NotFound(entity) => failure(StatusCode::NOT_FOUND, format!("{} not found", entity)),
            Error::Other(error) => {
                tracing::error!(err.msg = %error, err.details=?error, "Other Error");

                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
            Error::Validation(validation_error) => {
                tracing::warn!(err.msg = %validation_error, err.details=?validation_error, "Validation Error");

                failure(StatusCode::BAD_REQUEST, validation_error.to_string())
            }
        }
    }
}
