use std::{
    collections::{HashMap, HashSet},
    sync::atomic::{AtomicBool, Ordering},
};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{
    error::Error,
    model::{
        NewTitle, NewUser, NewVolume, NotificationPreference, Publisher, Subscriber, Title,
        TitleChanges, User, UserCredential, UserVolume, Volume, VolumeProgressUpdate,
    },
};

use super::{Gateway, error::DatabaseError};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, UserCredential>,
    publishers: HashMap<Uuid, Publisher>,
    titles: HashMap<Uuid, Title>,
    volumes: HashMap<Uuid, Volume>,
    user_volumes: HashMap<(Uuid, Uuid), UserVolume>,
    preferences: HashMap<(Uuid, Uuid), NotificationPreference>,
}

fn constraint(message: impl Into<String>) -> Error {
    Error::Database(DatabaseError::Constraint(message.into()))
}

impl Tables {
    fn volume_number_taken(&self, title_id: Uuid, number: i32) -> bool {
        self.volumes
            .values()
            .any(|v| v.title_id == title_id && v.number == number)
    }

    fn insert_volume(&mut self, title_id: Uuid, volume: NewVolume) -> Result<Volume, Error> {
        if !self.titles.contains_key(&title_id) {
            return Err(constraint("volumes_title_id_fkey"));
        }
        if volume.number <= 0 {
            return Err(constraint("volumes_number_check"));
        }
        if self.volume_number_taken(title_id, volume.number) {
            return Err(constraint("volumes_title_id_number_key"));
        }

        let now = Utc::now();
        let volume = Volume {
            id: Uuid::new_v4(),
            number: volume.number,
            title_id,
            title: volume.title,
            cover_image: volume.cover_image,
            release_at: None,
            created_at: now,
            updated_at: now,
        };
        self.volumes.insert(volume.id, volume.clone());

        Ok(volume)
    }

    fn volumes_of(&self, title_id: Uuid) -> Vec<Volume> {
        let mut volumes: Vec<Volume> = self
            .volumes
            .values()
            .filter(|v| v.title_id == title_id)
            .cloned()
            .collect();
        volumes.sort_by_key(|v| v.number);
        volumes
    }
}

/// Process-local gateway with the same key and foreign-key rules as the Postgres schema.
#[derive(Default)]
pub struct MemoryGateway {
    tables: Mutex<Tables>,
    fail_progress_writes: AtomicBool,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every following `upsert_user_volumes` call fail without writing anything.
    pub fn fail_progress_writes(&self, fail: bool) {
        self.fail_progress_writes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl Gateway for MemoryGateway {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserCredential>, Error> {
        let tables = self.tables.lock().await;
        Ok(tables
            .users
            .values()
            .find(|c| c.user.email == email)
            .cloned())
    }

    async fn find_user_by_id(&self, user_id: Uuid) -> Result<Option<User>, Error> {
        let tables = self.tables.lock().await;
        Ok(tables.users.get(&user_id).map(|c| c.user.clone()))
    }

    async fn create_user(&self, new_user: NewUser) -> Result<User, Error> {
        let mut tables = self.tables.lock().await;
        if tables.users.values().any(|c| c.user.email == new_user.email) {
            return Err(constraint("users_email_key"));
        }

        let user = User {
            id: Uuid::new_v4(),
            name: new_user.name,
            email: new_user.email,
            role: new_user.role,
        };
        tables.users.insert(
            user.id,
            UserCredential {
                user: user.clone(),
                password_hash: new_user.password_hash,
            },
        );

        Ok(user)
    }

    async fn create_publisher(
        &self,
        name: String,
        country: Option<String>,
    ) -> Result<Publisher, Error> {
        let now = Utc::now();
        let publisher = Publisher {
            id: Uuid::new_v4(),
            name,
            country,
            created_at: now,
            updated_at: now,
        };
        self.tables
            .lock()
            .await
            .publishers
            .insert(publisher.id, publisher.clone());

        Ok(publisher)
    }

    async fn find_publishers(&self) -> Result<Vec<Publisher>, Error> {
        let tables = self.tables.lock().await;
        let mut publishers: Vec<Publisher> = tables.publishers.values().cloned().collect();
        publishers.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(publishers)
    }

    async fn find_publisher_by_id(&self, publisher_id: Uuid) -> Result<Option<Publisher>, Error> {
        Ok(self
            .tables
            .lock()
            .await
            .publishers
            .get(&publisher_id)
            .cloned())
    }

    async fn create_title(&self, new_title: NewTitle) -> Result<(Title, Vec<Volume>), Error> {
        let mut tables = self.tables.lock().await;
        if !tables.publishers.contains_key(&new_title.publisher_id) {
            return Err(constraint("titles_publisher_id_fkey"));
        }

        let mut numbers = HashSet::new();
        for volume in &new_title.volumes {
            if volume.number <= 0 {
                return Err(constraint("volumes_number_check"));
            }
            if !numbers.insert(volume.number) {
                return Err(constraint("volumes_title_id_number_key"));
            }
        }

        let now = Utc::now();
        let title = Title {
            id: Uuid::new_v4(),
            name: new_title.name,
            slug: new_title.slug,
            publisher_id: new_title.publisher_id,
            status: new_title.status,
            synopsis: new_title.synopsis,
            author: new_title.author,
            genre: new_title.genre,
            cover_image: new_title.cover_image,
            created_at: now,
            updated_at: now,
        };
        tables.titles.insert(title.id, title.clone());

        for volume in new_title.volumes {
            tables.insert_volume(title.id, volume)?;
        }
        let volumes = tables.volumes_of(title.id);

        Ok((title, volumes))
    }

    async fn find_titles(&self) -> Result<Vec<Title>, Error> {
        let tables = self.tables.lock().await;
        let mut titles: Vec<Title> = tables.titles.values().cloned().collect();
        titles.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(titles)
    }

    async fn find_titles_by_publisher(&self, publisher_id: Uuid) -> Result<Vec<Title>, Error> {
        let tables = self.tables.lock().await;
        let mut titles: Vec<Title> = tables
            .titles
            .values()
            .filter(|t| t.publisher_id == publisher_id)
            .cloned()
            .collect();
        titles.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(titles)
    }

    async fn find_title_by_id(&self, title_id: Uuid) -> Result<Option<Title>, Error> {
        Ok(self.tables.lock().await.titles.get(&title_id).cloned())
    }

    async fn update_title(
        &self,
        title_id: Uuid,
        changes: TitleChanges,
    ) -> Result<Option<Title>, Error> {
        let mut tables = self.tables.lock().await;
        if let Some(publisher_id) = changes.publisher_id {
            if !tables.publishers.contains_key(&publisher_id) {
                return Err(constraint("titles_publisher_id_fkey"));
            }
        }

        let Some(title) = tables.titles.get_mut(&title_id) else {
            return Ok(None);
        };

        if let Some(name) = changes.name {
            title.name = name;
        }
        if let Some(slug) = changes.slug {
            title.slug = slug;
        }
        if let Some(publisher_id) = changes.publisher_id {
            title.publisher_id = publisher_id;
        }
        if let Some(status) = changes.status {
            title.status = status;
        }
        if changes.synopsis.is_some() {
            title.synopsis = changes.synopsis;
        }
        if changes.author.is_some() {
            title.author = changes.author;
        }
        if changes.genre.is_some() {
            title.genre = changes.genre;
        }
        if changes.cover_image.is_some() {
            title.cover_image = changes.cover_image;
        }
        title.updated_at = Utc::now();

        Ok(Some(title.clone()))
    }

    async fn delete_title(&self, title_id: Uuid) -> Result<bool, Error> {
        let mut tables = self.tables.lock().await;
        if tables.titles.remove(&title_id).is_none() {
            return Ok(false);
        }

        let volume_ids: HashSet<Uuid> = tables
            .volumes
            .values()
            .filter(|v| v.title_id == title_id)
            .map(|v| v.id)
            .collect();
        tables.volumes.retain(|id, _| !volume_ids.contains(id));
        tables
            .user_volumes
            .retain(|(_, volume_id), _| !volume_ids.contains(volume_id));
        tables
            .preferences
            .retain(|(_, preference_title_id), _| *preference_title_id != title_id);

        Ok(true)
    }

    async fn find_volumes_by_title(&self, title_id: Uuid) -> Result<Vec<Volume>, Error> {
        Ok(self.tables.lock().await.volumes_of(title_id))
    }

    async fn find_volume_by_title_and_number(
        &self,
        title_id: Uuid,
        number: i32,
    ) -> Result<Option<Volume>, Error> {
        let tables = self.tables.lock().await;
        Ok(tables
            .volumes
            .values()
            .find(|v| v.title_id == title_id && v.number == number)
            .cloned())
    }

    async fn create_volume(&self, title_id: Uuid, new_volume: NewVolume) -> Result<Volume, Error> {
        self.tables.lock().await.insert_volume(title_id, new_volume)
    }

    async fn update_volume_cover_image(
        &self,
        volume_id: Uuid,
        cover_image: &str,
    ) -> Result<(), Error> {
        let mut tables = self.tables.lock().await;
        if let Some(volume) = tables.volumes.get_mut(&volume_id) {
            volume.cover_image = Some(cover_image.to_string());
            volume.updated_at = Utc::now();
        }

        Ok(())
    }

    async fn find_user_volumes(
        &self,
        user_id: Uuid,
        volume_ids: &[Uuid],
    ) -> Result<Vec<UserVolume>, Error> {
        let tables = self.tables.lock().await;
        Ok(volume_ids
            .iter()
            .filter_map(|volume_id| tables.user_volumes.get(&(user_id, *volume_id)))
            .cloned()
            .collect())
    }

    async fn upsert_user_volumes(
        &self,
        user_id: Uuid,
        updates: &[VolumeProgressUpdate],
    ) -> Result<Vec<UserVolume>, Error> {
        let mut tables = self.tables.lock().await;

        if self.fail_progress_writes.load(Ordering::SeqCst) {
            return Err(Error::Database(DatabaseError::DatabaseError(
                sqlx::Error::PoolTimedOut,
            )));
        }
        if !tables.users.contains_key(&user_id) {
            return Err(constraint("user_volumes_user_id_fkey"));
        }
        if updates
            .iter()
            .any(|update| !tables.volumes.contains_key(&update.volume_id))
        {
            return Err(constraint("user_volumes_volume_id_fkey"));
        }

        let now = Utc::now();
        let mut written = Vec::with_capacity(updates.len());
        for update in updates {
            let row = tables
                .user_volumes
                .entry((user_id, update.volume_id))
                .and_modify(|row| {
                    row.owned = update.owned;
                    row.updated_at = now;
                })
                .or_insert_with(|| UserVolume {
                    user_id,
                    volume_id: update.volume_id,
                    owned: update.owned,
                    notified: false,
                    created_at: now,
                    updated_at: now,
                });
            written.push(row.clone());
        }

        Ok(written)
    }

    async fn find_notification_preference(
        &self,
        user_id: Uuid,
        title_id: Uuid,
    ) -> Result<Option<NotificationPreference>, Error> {
        let tables = self.tables.lock().await;
        Ok(tables.preferences.get(&(user_id, title_id)).cloned())
    }

    async fn upsert_notification_preference(
        &self,
        user_id: Uuid,
        title_id: Uuid,
        enabled: bool,
    ) -> Result<NotificationPreference, Error> {
        let mut tables = self.tables.lock().await;
        if !tables.users.contains_key(&user_id) {
            return Err(constraint("notification_preferences_user_id_fkey"));
        }
        if !tables.titles.contains_key(&title_id) {
            return Err(constraint("notification_preferences_title_id_fkey"));
        }

        let now = Utc::now();
        let preference = tables
            .preferences
            .entry((user_id, title_id))
            .and_modify(|p| {
                p.email_on_new_volume = enabled;
                p.updated_at = now;
            })
            .or_insert_with(|| NotificationPreference {
                user_id,
                title_id,
                email_on_new_volume: enabled,
                created_at: now,
                updated_at: now,
            });

        Ok(preference.clone())
    }

    async fn find_subscribers(&self, title_id: Uuid) -> Result<Vec<Subscriber>, Error> {
        let tables = self.tables.lock().await;
        let Some(title) = tables.titles.get(&title_id) else {
            return Ok(Vec::new());
        };

        Ok(tables
            .preferences
            .values()
            .filter(|p| p.title_id == title_id && p.email_on_new_volume)
            .filter_map(|p| tables.users.get(&p.user_id))
            .map(|c| Subscriber {
                user_id: c.user.id,
                email: c.user.email.clone(),
                name: c.user.name.clone(),
                title_name: title.name.clone(),
            })
            .collect())
    }
}
