use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(sqlx::Type, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[sqlx(type_name = "user_role", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum UserRole {
    #[default]
    User,
    Admin,
}

#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: UserRole,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

/// A user together with the stored argon2 hash, only ever used for login.
#[derive(Debug, Clone)]
pub struct UserCredential {
    pub user: User,
    pub password_hash: String,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
}

#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Publisher {
    pub id: Uuid,
    pub name: String,
    pub country: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(sqlx::Type, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[sqlx(type_name = "title_status", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum TitleStatus {
    #[default]
    Ongoing,
    Completed,
    Hiatus,
}

#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Title {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub publisher_id: Uuid,
    pub status: TitleStatus,
    pub synopsis: Option<String>,
    pub author: Option<String>,
    pub genre: Option<String>,
    pub cover_image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Volume {
    pub id: Uuid,
    pub number: i32,
    pub title_id: Uuid,
    pub title: Option<String>,
    pub cover_image: Option<String>,
    pub release_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Ownership fact. A missing row means the volume is not owned.
#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserVolume {
    pub user_id: Uuid,
    pub volume_id: Uuid,
    pub owned: bool,
    pub notified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPreference {
    pub user_id: Uuid,
    pub title_id: Uuid,
    pub email_on_new_volume: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A user subscribed to new-volume e-mails for one title.
#[derive(sqlx::FromRow, Debug, Clone, PartialEq, Eq)]
pub struct Subscriber {
    pub user_id: Uuid,
    pub email: String,
    pub name: String,
    pub title_name: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VolumeProgress {
    pub volume_id: Uuid,
    pub volume_number: i32,
    pub volume_title: Option<String>,
    pub owned: bool,
    pub notified: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VolumeProgressUpdate {
    pub volume_id: Uuid,
    pub owned: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewVolume {
    pub number: i32,
    pub title: Option<String>,
    pub cover_image: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewTitle {
    pub name: String,
    pub slug: String,
    pub publisher_id: Uuid,
    pub status: TitleStatus,
    pub synopsis: Option<String>,
    pub author: Option<String>,
    pub genre: Option<String>,
    pub cover_image: Option<String>,
    pub volumes: Vec<NewVolume>,
}

/// Column changes for a title update. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default)]
pub struct TitleChanges {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub publisher_id: Option<Uuid>,
    pub status: Option<TitleStatus>,
    pub synopsis: Option<String>,
    pub author: Option<String>,
    pub genre: Option<String>,
    pub cover_image: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TitleDetail {
    #[serde(flatten)]
    pub title: Title,
    pub volumes: Vec<Volume>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PublisherDetail {
    #[serde(flatten)]
    pub publisher: Publisher,
    pub titles: Vec<Title>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NotificationSetting {
    pub email_on_new_volume: bool,
}

/// JSON envelope shared by every endpoint.
#[derive(Serialize, Deserialize, Debug)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn data(data: T) -> Self {
        ApiResponse {
            success: true,
            message: None,
            data: Some(data),
        }
    }

    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        ApiResponse {
            success: true,
            message: Some(message.into()),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    pub fn message(message: impl Into<String>) -> Self {
        ApiResponse {
            success: true,
            message: Some(message.into()),
            data: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        ApiResponse {
            success: false,
            message: Some(message.into()),
            data: None,
        }
    }
}

/// Lowercase, hyphen-separated slug keeping only ASCII letters and digits.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_separator = false;

    for c in name.to_lowercase().chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.push(c);
        } else if c.is_whitespace() || c == '-' {
            pending_separator = true;
        }
    }

    slug
}
