use std::sync::Arc;

use uuid::Uuid;

use crate::{
    db::Gateway,
    error::{Error, validation_error},
    model::{
        NewTitle, NewVolume, Publisher, PublisherDetail, Title, TitleChanges, TitleDetail,
        TitleStatus, Volume, slugify,
    },
};

use super::events::{VolumeAdded, VolumeEventSink};

#[derive(Debug, Clone, Default)]
pub struct CreateTitle {
    pub name: String,
    pub publisher_id: Uuid,
    pub status: Option<TitleStatus>,
    pub synopsis: Option<String>,
    pub author: Option<String>,
    pub genre: Option<String>,
    pub cover_image: Option<String>,
    pub volumes: Vec<NewVolume>,
}

/// `None` fields are left as stored; `volumes` goes through [`CatalogService::apply_volume_changes`].
#[derive(Debug, Clone, Default)]
pub struct UpdateTitle {
    pub name: Option<String>,
    pub publisher_id: Option<Uuid>,
    pub status: Option<TitleStatus>,
    pub synopsis: Option<String>,
    pub author: Option<String>,
    pub genre: Option<String>,
    pub cover_image: Option<String>,
    pub volumes: Vec<NewVolume>,
}

/// What a call to [`CatalogService::apply_volume_changes`] actually did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VolumeChangeSummary {
    pub created: Vec<i32>,
    pub covers_updated: Vec<i32>,
}

#[derive(Clone)]
pub struct CatalogService {
    gateway: Arc<dyn Gateway>,
    events: Arc<dyn VolumeEventSink>,
}

impl CatalogService {
    pub fn new(gateway: Arc<dyn Gateway>, events: Arc<dyn VolumeEventSink>) -> Self {
        CatalogService { gateway, events }
    }

    #[tracing::instrument(name = "Create publisher", skip(self))]
    pub async fn create_publisher(
        &self,
        name: String,
        country: Option<String>,
    ) -> Result<Publisher, Error> {
        self.gateway.create_publisher(name, country).await
    }

    pub async fn list_publishers(&self) -> Result<Vec<Publisher>, Error> {
        self.gateway.find_publishers().await
    }

    #[tracing::instrument(name = "Get publisher", skip(self))]
    pub async fn get_publisher(&self, publisher_id: Uuid) -> Result<PublisherDetail, Error> {
        let publisher = self
            .gateway
            .find_publisher_by_id(publisher_id)
            .await?
            .ok_or(Error::NotFound("Publisher"))?;
        let titles = self.gateway.find_titles_by_publisher(publisher_id).await?;

        Ok(PublisherDetail { publisher, titles })
    }

    /// Initial volumes are part of the title, so they do not notify anyone.
    #[tracing::instrument(name = "Create title", skip(self, request), fields(name = %request.name))]
    pub async fn create_title(&self, request: CreateTitle) -> Result<TitleDetail, Error> {
        self.ensure_publisher(request.publisher_id).await?;

        let (title, mut volumes) = self
            .gateway
            .create_title(NewTitle {
                slug: slugify(&request.name),
                name: request.name,
                publisher_id: request.publisher_id,
                status: request.status.unwrap_or_default(),
                synopsis: request.synopsis,
                author: request.author,
                genre: request.genre,
                cover_image: request.cover_image,
                volumes: request.volumes,
            })
            .await?;
        volumes.sort_by_key(|v| v.number);

        Ok(TitleDetail { title, volumes })
    }

    pub async fn list_titles(&self) -> Result<Vec<Title>, Error> {
        self.gateway.find_titles().await
    }

    #[tracing::instrument(name = "Get title", skip(self))]
    pub async fn get_title(&self, title_id: Uuid) -> Result<TitleDetail, Error> {
        let title = self.find_title(title_id).await?;
        let volumes = self.gateway.find_volumes_by_title(title_id).await?;

        Ok(TitleDetail { title, volumes })
    }

    pub async fn list_volumes(&self, title_id: Uuid) -> Result<Vec<Volume>, Error> {
        self.find_title(title_id).await?;
        self.gateway.find_volumes_by_title(title_id).await
    }

    #[tracing::instrument(name = "Update title", skip(self, request))]
    pub async fn update_title(
        &self,
        title_id: Uuid,
        request: UpdateTitle,
    ) -> Result<TitleDetail, Error> {
        if let Some(publisher_id) = request.publisher_id {
            self.ensure_publisher(publisher_id).await?;
        }

        let changes = TitleChanges {
            slug: request.name.as_deref().map(slugify),
            name: request.name,
            publisher_id: request.publisher_id,
            status: request.status,
            synopsis: request.synopsis,
            author: request.author,
            genre: request.genre,
            cover_image: request.cover_image,
        };
        let title = self
            .gateway
            .update_title(title_id, changes)
            .await?
            .ok_or(Error::NotFound("Title"))?;

        self.apply_volume_changes(title_id, &request.volumes).await?;
        let volumes = self.gateway.find_volumes_by_title(title_id).await?;

        Ok(TitleDetail { title, volumes })
    }

    /// Creates every requested volume number the title does not have yet and
    /// publishes one [`VolumeAdded`] per creation, after it is stored. Existing
    /// numbers only get their cover replaced, when one is given. Volumes missing
    /// from the request are left alone.
    #[tracing::instrument(name = "Apply volume changes", skip(self, requested), fields(requested = requested.len()))]
    pub async fn apply_volume_changes(
        &self,
        title_id: Uuid,
        requested: &[NewVolume],
    ) -> Result<VolumeChangeSummary, Error> {
        let mut summary = VolumeChangeSummary::default();

        for entry in requested {
            let existing = self
                .gateway
                .find_volume_by_title_and_number(title_id, entry.number)
                .await?;

            match existing {
                None => {
                    let volume = self.gateway.create_volume(title_id, entry.clone()).await?;
                    summary.created.push(volume.number);

                    self.events
                        .volume_added(VolumeAdded {
                            title_id,
                            volume_number: volume.number,
                        })
                        .await;
                }
                Some(volume) => {
                    if let Some(cover_image) = entry.cover_image.as_deref() {
                        self.gateway
                            .update_volume_cover_image(volume.id, cover_image)
                            .await?;
                        summary.covers_updated.push(volume.number);
                    }
                }
            }
        }

        if !summary.created.is_empty() {
            tracing::info!(created = ?summary.created, "New volumes added");
        }

        Ok(summary)
    }

    #[tracing::instrument(name = "Delete title", skip(self))]
    pub async fn delete_title(&self, title_id: Uuid) -> Result<(), Error> {
        if !self.gateway.delete_title(title_id).await? {
            return Err(Error::NotFound("Title"));
        }

        Ok(())
    }

    async fn find_title(&self, title_id: Uuid) -> Result<Title, Error> {
        self.gateway
            .find_title_by_id(title_id)
            .await?
            .ok_or(Error::NotFound("Title"))
    }

    async fn ensure_publisher(&self, publisher_id: Uuid) -> Result<(), Error> {
        if self.gateway.find_publisher_by_id(publisher_id).await?.is_none() {
            return Err(validation_error(
                "publisherId",
                "publisher_not_found",
                "Publisher does not exist",
            ));
        }

        Ok(())
    }
}
