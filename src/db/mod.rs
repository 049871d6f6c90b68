//! Persistence gateway.
//!
//! Services only ever talk to [`Gateway`]. [`postgres::PgGateway`] is the
//! production implementation built from the per-table query modules below;
//! [`memory::MemoryGateway`] keeps everything in process and enforces the same
//! key constraints.

use async_trait::async_trait;
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::{
    error::Error,
    model::{
        NewTitle, NewUser, NewVolume, NotificationPreference, Publisher, Subscriber, Title,
        TitleChanges, User, UserCredential, UserVolume, Volume, VolumeProgressUpdate,
    },
};

pub mod error;
pub mod memory;
pub mod notification_preference;
pub mod postgres;
pub mod publisher;
pub mod title;
pub mod user;
pub mod user_volume;
pub mod volume;

pub type PostgresTransaction = Transaction<'static, Postgres>;

#[async_trait]
pub trait Gateway: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserCredential>, Error>;
    async fn find_user_by_id(&self, user_id: Uuid) -> Result<Option<User>, Error>;
    async fn create_user(&self, user: NewUser) -> Result<User, Error>;

    async fn create_publisher(&self, name: String, country: Option<String>)
    -> Result<Publisher, Error>;
    /// Ordered by name.
    async fn find_publishers(&self) -> Result<Vec<Publisher>, Error>;
    async fn find_publisher_by_id(&self, publisher_id: Uuid) -> Result<Option<Publisher>, Error>;

    /// Inserts the title and its initial volumes atomically.
    async fn create_title(&self, title: NewTitle) -> Result<(Title, Vec<Volume>), Error>;
    /// Newest first.
    async fn find_titles(&self) -> Result<Vec<Title>, Error>;
    async fn find_titles_by_publisher(&self, publisher_id: Uuid) -> Result<Vec<Title>, Error>;
    async fn find_title_by_id(&self, title_id: Uuid) -> Result<Option<Title>, Error>;
    async fn update_title(
        &self,
        title_id: Uuid,
        changes: TitleChanges,
    ) -> Result<Option<Title>, Error>;
    /// Removes the title together with everything hanging off it.
    async fn delete_title(&self, title_id: Uuid) -> Result<bool, Error>;

    /// Ordered by ascending number.
    async fn find_volumes_by_title(&self, title_id: Uuid) -> Result<Vec<Volume>, Error>;
    async fn find_volume_by_title_and_number(
        &self,
        title_id: Uuid,
        number: i32,
    ) -> Result<Option<Volume>, Error>;
    async fn create_volume(&self, title_id: Uuid, volume: NewVolume) -> Result<Volume, Error>;
    async fn update_volume_cover_image(
        &self,
        volume_id: Uuid,
        cover_image: &str,
    ) -> Result<(), Error>;

    async fn find_user_volumes(
        &self,
        user_id: Uuid,
        volume_ids: &[Uuid],
    ) -> Result<Vec<UserVolume>, Error>;
    /// Upserts every `(user_id, volume_id)` row in one all-or-nothing write.
    /// New rows start with `notified = false`.
    async fn upsert_user_volumes(
        &self,
        user_id: Uuid,
        updates: &[VolumeProgressUpdate],
    ) -> Result<Vec<UserVolume>, Error>;

    async fn find_notification_preference(
        &self,
        user_id: Uuid,
        title_id: Uuid,
    ) -> Result<Option<NotificationPreference>, Error>;
    async fn upsert_notification_preference(
        &self,
        user_id: Uuid,
        title_id: Uuid,
        enabled: bool,
    ) -> Result<NotificationPreference, Error>;
    /// Users with `email_on_new_volume = true` for the title, joined with the title name.
    async fn find_subscribers(&self, title_id: Uuid) -> Result<Vec<Subscriber>, Error>;
}
