pub mod catalog;
pub mod events;
pub mod notification;
pub mod progress;

pub use catalog::CatalogService;
pub use events::{VolumeAdded, VolumeEventSink};
pub use notification::{DetachedNotifier, FanoutReport, NotificationService, drain_fanouts};
pub use progress::ProgressService;
