use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use uuid::Uuid;

use crate::{
    db::Gateway,
    error::{Error, validation_error},
    model::{UserVolume, Volume, VolumeProgress, VolumeProgressUpdate},
};

#[derive(Clone)]
pub struct ProgressService {
    gateway: Arc<dyn Gateway>,
}

impl ProgressService {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        ProgressService { gateway }
    }

    /// One entry per volume of the title in ascending number order, whether or
    /// not the user ever touched it.
    #[tracing::instrument(name = "Get progress", skip(self))]
    pub async fn get_progress(
        &self,
        user_id: Uuid,
        title_id: Uuid,
    ) -> Result<Vec<VolumeProgress>, Error> {
        if self.gateway.find_title_by_id(title_id).await?.is_none() {
            return Err(Error::NotFound("Title"));
        }

        let volumes = self.gateway.find_volumes_by_title(title_id).await?;
        let volume_ids: Vec<Uuid> = volumes.iter().map(|v| v.id).collect();
        let ownership = self.gateway.find_user_volumes(user_id, &volume_ids).await?;

        Ok(reconcile(volumes, ownership))
    }

    /// Applies every update or none of them. A volume id that does not belong
    /// to the title rejects the whole batch before anything is written.
    #[tracing::instrument(name = "Update progress", skip(self, updates), fields(updates = updates.len()))]
    pub async fn update_progress(
        &self,
        user_id: Uuid,
        title_id: Uuid,
        updates: Vec<VolumeProgressUpdate>,
    ) -> Result<Vec<UserVolume>, Error> {
        if self.gateway.find_title_by_id(title_id).await?.is_none() {
            return Err(Error::NotFound("Title"));
        }

        let updates = collapse_updates(updates);
        if updates.is_empty() {
            return Ok(Vec::new());
        }

        let volume_ids: HashSet<Uuid> = self
            .gateway
            .find_volumes_by_title(title_id)
            .await?
            .into_iter()
            .map(|v| v.id)
            .collect();
        if updates
            .iter()
            .any(|update| !volume_ids.contains(&update.volume_id))
        {
            return Err(validation_error(
                "volumes",
                "volume_not_in_title",
                "Some volumes do not belong to this title",
            ));
        }

        self.gateway.upsert_user_volumes(user_id, &updates).await
    }
}

/// Joins the title's volumes with whatever ownership rows exist. A volume
/// without a row is reported as not owned and not notified.
pub fn reconcile(mut volumes: Vec<Volume>, ownership: Vec<UserVolume>) -> Vec<VolumeProgress> {
    let ownership: HashMap<Uuid, UserVolume> = ownership
        .into_iter()
        .map(|row| (row.volume_id, row))
        .collect();

    volumes.sort_by_key(|v| v.number);
    volumes
        .into_iter()
        .map(|volume| {
            let row = ownership.get(&volume.id);
            VolumeProgress {
                volume_id: volume.id,
                volume_number: volume.number,
                volume_title: volume.title,
                owned: row.is_some_and(|r| r.owned),
                notified: row.is_some_and(|r| r.notified),
            }
        })
        .collect()
}

/// Later entries for the same volume win; first-seen order is kept.
fn collapse_updates(updates: Vec<VolumeProgressUpdate>) -> Vec<VolumeProgressUpdate> {
    let mut positions: HashMap<Uuid, usize> = HashMap::new();
    let mut collapsed: Vec<VolumeProgressUpdate> = Vec::with_capacity(updates.len());

    for update in updates {
        match positions.get(&update.volume_id) {
            Some(&index) => collapsed[index].owned = update.owned,
            None => {
                positions.insert(update.volume_id, collapsed.len());
                collapsed.push(update);
            }
        }
    }

    collapsed
}
