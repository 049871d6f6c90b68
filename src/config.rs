use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use secrecy::{ExposeSecret, SecretString};
use serde_aux::field_attributes::deserialize_number_from_string;
use sqlx::postgres::PgConnectOptions;

#[derive(serde::Deserialize, Debug, Clone)]
pub struct Config {
    pub application: Application,
    pub database: Database,
    pub jwt: Jwt,
    pub email: Email,
    pub notifications: Notifications,
}

#[derive(serde::Deserialize, Debug, Clone)]
pub struct Application {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    pub host: String,
    pub allow_registration: bool,
    pub run_migration: bool,
    pub frontend_url: String,
}

impl Application {
    pub fn get_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(serde::Deserialize, Debug, Clone)]
pub struct Jwt {
    pub secret: SecretString,
    pub iss: SecretString,
    pub aud: SecretString,
    #[serde(default = "default_expire_hours")]
    pub expire_hours: i64,
}

fn default_expire_hours() -> i64 {
    24
}

#[derive(serde::Deserialize, Debug, Clone)]
pub struct Database {
    pub username: String,
    pub password: SecretString,
    pub host: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    pub database_name: String,
    #[serde(default)]
    pub in_memory: bool,
}

impl Database {
    pub fn without_db(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.username)
            .password(self.password.expose_secret())
    }

    pub fn with_db(&self) -> PgConnectOptions {
        self.without_db().database(&self.database_name)
    }
}

#[derive(serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EmailDriver {
    Log,
    Http,
}

#[derive(serde::Deserialize, Debug, Clone)]
pub struct Email {
    pub driver: EmailDriver,
    pub endpoint: String,
    pub api_key: SecretString,
    pub from: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub send_timeout_secs: u64,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub max_concurrent_sends: usize,
}

impl Email {
    pub fn send_timeout(&self) -> Duration {
        Duration::from_secs(self.send_timeout_secs)
    }
}

#[derive(serde::Deserialize, Debug, Clone)]
pub struct Notifications {
    /// Run fanout in its own task once the catalog mutation has returned.
    pub detached: bool,
    /// How long shutdown waits for detached fanouts that are still sending.
    #[serde(
        default = "default_shutdown_grace_secs",
        deserialize_with = "deserialize_number_from_string"
    )]
    pub shutdown_grace_secs: u64,
}

fn default_shutdown_grace_secs() -> u64 {
    30
}

impl Notifications {
    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }
}

pub enum Environment {
    Local,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Production => "production",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            other => Err(format!(
                "{} is not a supported environment. Use either `local` or `production`.",
                other
            )),
        }
    }
}

impl Config {
    pub fn new() -> Result<Self, figment::Error> {
        let base_path = std::env::current_dir()
            .map_err(|e| figment::Error::from(format!("current directory: {}", e)))?;
        let config_directory = base_path.join("configuration");

        let environment: Environment = std::env::var("APP_ENVIRONMENT")
            .unwrap_or_else(|_| "local".into())
            .try_into()
            .map_err(figment::Error::from)?;

        let environment_filename = format!("{}.yaml", environment.as_str());

        Figment::new()
            .merge(Yaml::file(config_directory.join("base.yaml")))
            .merge(Yaml::file(config_directory.join(environment_filename)))
            .merge(Env::raw().split("__"))
            .extract()
    }
}
