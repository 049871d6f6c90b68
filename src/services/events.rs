use async_trait::async_trait;
use uuid::Uuid;

/// Published once per volume number that did not exist for the title before.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VolumeAdded {
    pub title_id: Uuid,
    pub volume_number: i32,
}

/// Receives catalog events after the write that produced them has been persisted.
/// Implementations must not fail the publisher.
#[async_trait]
pub trait VolumeEventSink: Send + Sync {
    async fn volume_added(&self, event: VolumeAdded);
}
