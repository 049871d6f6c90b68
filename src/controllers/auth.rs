use std::borrow::Cow;

use anyhow::Context;
use axum::{Json, extract::State, http::StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidateEmail, ValidateLength, ValidationError, ValidationErrors};

use crate::{
    auth::{compute_password_hash, encode_jwt, error::AuthError, verify_password_hash},
    db::error::DatabaseError,
    error::Error,
    model::{ApiResponse, NewUser, User, UserRole},
    state::SharedAppState,
    telemetry::spawn_blocking_with_tracing,
};

fn validate_email(email: &str, errors: &mut ValidationErrors) {
    if !email.validate_email() {
        errors.add(
            "email",
            ValidationError::new("email_email").with_message(Cow::from("Incorrect email format")),
        );
    }
    if !email.validate_length(Some(1), Some(100), None) {
        errors.add(
            "email",
            ValidationError::new("email_length")
                .with_message(Cow::from("Email length must be between 1 and 100")),
        );
    }
}

fn validate_password(password: &SecretString, min: u64, errors: &mut ValidationErrors) {
    if !password
        .expose_secret()
        .validate_length(Some(min), Some(64), None)
    {
        errors.add(
            "password",
            ValidationError::new("password_length").with_message(Cow::from(format!(
                "Password length must be between {} and 64",
                min
            ))),
        );
    }
}

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: SecretString,
}

impl Validate for RegisterRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if !self.name.trim().validate_length(Some(1), Some(100), None) {
            errors.add(
                "name",
                ValidationError::new("name_length")
                    .with_message(Cow::from("Name length must be between 1 and 100")),
            );
        }
        validate_email(&self.email, &mut errors);
        validate_password(&self.password, 6, &mut errors);

        if !errors.errors().is_empty() {
            return Err(errors);
        }

        Ok(())
    }
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: SecretString,
}

impl Validate for LoginRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        validate_email(&self.email, &mut errors);
        validate_password(&self.password, 1, &mut errors);

        if !errors.errors().is_empty() {
            return Err(errors);
        }

        Ok(())
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct AuthResponse {
    pub access_token: String,
    pub user: User,
}

#[tracing::instrument(name = "[POST] auth/register", skip_all)]
pub async fn register(
    State(app_state): State<SharedAppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AuthResponse>>), Error> {
    if !app_state.config.application.allow_registration {
        return Err(Error::Auth(AuthError::RegistrationDisabled));
    }
    request.validate().map_err(Error::Validation)?;

    let email = request.email.trim().to_lowercase();
    if app_state.gateway.find_user_by_email(&email).await?.is_some() {
        return Err(Error::Auth(AuthError::EmailTaken));
    }

    let password = request.password;
    let password_hash = spawn_blocking_with_tracing(move || compute_password_hash(password))
        .await
        .context("compute password hash")
        .map_err(Error::Other)??;

    let user = app_state
        .gateway
        .create_user(NewUser {
            name: request.name.trim().to_string(),
            email,
            password_hash,
            role: UserRole::User,
        })
        .await
        .map_err(|e| match e {
            // Lost a race with another registration for the same address.
            Error::Database(DatabaseError::Constraint(_)) => Error::Auth(AuthError::EmailTaken),
            other => other,
        })?;

    let access_token = encode_jwt(&user, &app_state.config.jwt)?;
    tracing::info!(user_id = %user.id, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(
            AuthResponse { access_token, user },
            "User registered",
        )),
    ))
}

#[tracing::instrument(name = "[POST] auth/login", skip_all)]
pub async fn login(
    State(app_state): State<SharedAppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<ApiResponse<AuthResponse>>, Error> {
    request.validate().map_err(Error::Validation)?;

    let credential = app_state
        .gateway
        .find_user_by_email(&request.email.trim().to_lowercase())
        .await?
        .ok_or(Error::Auth(AuthError::IncorrectCredential))?;

    let password_hash = credential.password_hash;
    spawn_blocking_with_tracing(move || verify_password_hash(password_hash, request.password))
        .await
        .context("verify password hash")
        .map_err(Error::Other)?
        .map_err(|_| Error::Auth(AuthError::IncorrectCredential))?;

    let user = credential.user;
    let access_token = encode_jwt(&user, &app_state.config.jwt)?;

    Ok(Json(ApiResponse::with_message(
        AuthResponse { access_token, user },
        "Logged in",
    )))
}
