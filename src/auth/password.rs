use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version,
    password_hash::{SaltString, rand_core::OsRng},
};
use secrecy::{ExposeSecret, SecretString};

use crate::error::Error;

use super::error::AuthError;

#[tracing::instrument(name = "compute password hash", skip_all)]
pub fn compute_password_hash(password: SecretString) -> Result<String, Error> {
    let salt = SaltString::generate(&mut OsRng);
    let params = Params::new(15000, 2, 1, None).map_err(|e| Error::Other(e.into()))?;
    let password_hash = Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
        .hash_password(password.expose_secret().as_bytes(), &salt)
        .map_err(|e| Error::Auth(AuthError::PasswordError(e)))?
        .to_string();

    Ok(password_hash)
}

#[tracing::instrument(name = "verify password hash", skip_all)]
pub fn verify_password_hash(password_hashed: String, password: SecretString) -> Result<(), Error> {
    let expected_password_hash = PasswordHash::new(&password_hashed)
        .map_err(|e| Error::Auth(AuthError::PasswordError(e)))?;

    Argon2::default()
        .verify_password(password.expose_secret().as_bytes(), &expected_password_hash)
        .map_err(|_| Error::Auth(AuthError::IncorrectCredential))
}
