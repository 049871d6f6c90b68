use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    error::Error,
    model::{
        NewTitle, NewUser, NewVolume, NotificationPreference, Publisher, Subscriber, Title,
        TitleChanges, User, UserCredential, UserVolume, Volume, VolumeProgressUpdate,
    },
};

use super::{Gateway, notification_preference, publisher, title, user, user_volume, volume};

#[derive(Clone)]
pub struct PgGateway {
    pool: PgPool,
}

impl PgGateway {
    pub fn new(pool: PgPool) -> Self {
        PgGateway { pool }
    }
}

#[async_trait]
impl Gateway for PgGateway {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserCredential>, Error> {
        user::get_user_by_email(&self.pool, email).await
    }

    async fn find_user_by_id(&self, user_id: Uuid) -> Result<Option<User>, Error> {
        user::get_user_by_id_optional(&self.pool, user_id).await
    }

    async fn create_user(&self, new_user: NewUser) -> Result<User, Error> {
        user::insert_user(&self.pool, new_user).await
    }

    async fn create_publisher(
        &self,
        name: String,
        country: Option<String>,
    ) -> Result<Publisher, Error> {
        publisher::insert_publisher(&self.pool, name, country).await
    }

    async fn find_publishers(&self) -> Result<Vec<Publisher>, Error> {
        publisher::get_publishers(&self.pool).await
    }

    async fn find_publisher_by_id(&self, publisher_id: Uuid) -> Result<Option<Publisher>, Error> {
        publisher::get_publisher_by_id(&self.pool, publisher_id).await
    }

    async fn create_title(&self, new_title: NewTitle) -> Result<(Title, Vec<Volume>), Error> {
        title::insert_title(&self.pool, new_title).await
    }

    async fn find_titles(&self) -> Result<Vec<Title>, Error> {
        title::get_titles(&self.pool).await
    }

    async fn find_titles_by_publisher(&self, publisher_id: Uuid) -> Result<Vec<Title>, Error> {
        title::get_titles_by_publisher(&self.pool, publisher_id).await
    }

    async fn find_title_by_id(&self, title_id: Uuid) -> Result<Option<Title>, Error> {
        title::get_title_by_id(&self.pool, title_id).await
    }

    async fn update_title(
        &self,
        title_id: Uuid,
        changes: TitleChanges,
    ) -> Result<Option<Title>, Error> {
        title::update_title(&self.pool, title_id, changes).await
    }

    async fn delete_title(&self, title_id: Uuid) -> Result<bool, Error> {
        title::delete_title(&self.pool, title_id).await
    }

    async fn find_volumes_by_title(&self, title_id: Uuid) -> Result<Vec<Volume>, Error> {
        volume::get_volumes_by_title(&self.pool, title_id).await
    }

    async fn find_volume_by_title_and_number(
        &self,
        title_id: Uuid,
        number: i32,
    ) -> Result<Option<Volume>, Error> {
        volume::get_volume_by_title_and_number(&self.pool, title_id, number).await
    }

    async fn create_volume(&self, title_id: Uuid, new_volume: NewVolume) -> Result<Volume, Error> {
        volume::insert_volume(&self.pool, title_id, new_volume).await
    }

    async fn update_volume_cover_image(
        &self,
        volume_id: Uuid,
        cover_image: &str,
    ) -> Result<(), Error> {
        volume::update_volume_cover_image(&self.pool, volume_id, cover_image).await
    }

    async fn find_user_volumes(
        &self,
        user_id: Uuid,
        volume_ids: &[Uuid],
    ) -> Result<Vec<UserVolume>, Error> {
        user_volume::get_user_volumes(&self.pool, user_id, volume_ids).await
    }

    async fn upsert_user_volumes(
        &self,
        user_id: Uuid,
        updates: &[VolumeProgressUpdate],
    ) -> Result<Vec<UserVolume>, Error> {
        user_volume::upsert_user_volumes(&self.pool, user_id, updates).await
    }

    async fn find_notification_preference(
        &self,
        user_id: Uuid,
        title_id: Uuid,
    ) -> Result<Option<NotificationPreference>, Error> {
        notification_preference::get_notification_preference(&self.pool, user_id, title_id).await
    }

    async fn upsert_notification_preference(
        &self,
        user_id: Uuid,
        title_id: Uuid,
        enabled: bool,
    ) -> Result<NotificationPreference, Error> {
        notification_preference::upsert_notification_preference(
            &self.pool, user_id, title_id, enabled,
        )
        .await
    }

    async fn find_subscribers(&self, title_id: Uuid) -> Result<Vec<Subscriber>, Error> {
        notification_preference::get_subscribers(&self.pool, title_id).await
    }
}
