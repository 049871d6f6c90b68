use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use futures::{StreamExt, stream};
use tokio_util::task::TaskTracker;
use uuid::Uuid;

use crate::{
    config::Email,
    db::Gateway,
    email::{DeliveryError, Mailer, NewVolumeMessage},
    error::Error,
    model::{NotificationSetting, Subscriber},
    telemetry::spawn_tracked_with_tracing,
};

use super::events::{VolumeAdded, VolumeEventSink};

/// Outcome of one fanout. Failures are counted here and logged, never returned.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FanoutReport {
    pub attempted: usize,
    pub delivered: usize,
    pub failed: usize,
}

#[derive(Clone)]
pub struct NotificationService {
    gateway: Arc<dyn Gateway>,
    mailer: Arc<dyn Mailer>,
    send_timeout: Duration,
    max_concurrent_sends: usize,
}

impl NotificationService {
    pub fn new(gateway: Arc<dyn Gateway>, mailer: Arc<dyn Mailer>, config: &Email) -> Self {
        NotificationService {
            gateway,
            mailer,
            send_timeout: config.send_timeout(),
            max_concurrent_sends: config.max_concurrent_sends.max(1),
        }
    }

    /// A missing preference row reads as disabled.
    #[tracing::instrument(name = "Get notification preference", skip(self))]
    pub async fn get_preference(
        &self,
        user_id: Uuid,
        title_id: Uuid,
    ) -> Result<NotificationSetting, Error> {
        let preference = self
            .gateway
            .find_notification_preference(user_id, title_id)
            .await?;

        Ok(NotificationSetting {
            email_on_new_volume: preference.is_some_and(|p| p.email_on_new_volume),
        })
    }

    #[tracing::instrument(name = "Set notification preference", skip(self))]
    pub async fn set_preference(
        &self,
        user_id: Uuid,
        title_id: Uuid,
        email_on_new_volume: bool,
    ) -> Result<NotificationSetting, Error> {
        if self.gateway.find_title_by_id(title_id).await?.is_none() {
            return Err(Error::NotFound("Title"));
        }

        let preference = self
            .gateway
            .upsert_notification_preference(user_id, title_id, email_on_new_volume)
            .await?;

        Ok(NotificationSetting {
            email_on_new_volume: preference.email_on_new_volume,
        })
    }

    /// Sends the new-volume e-mail to every subscriber of the title. One
    /// recipient failing, hanging past the send timeout, or the subscriber
    /// lookup itself failing never stops the other deliveries or the caller.
    #[tracing::instrument(name = "Notify new volume", skip(self))]
    pub async fn notify_new_volume(&self, title_id: Uuid, volume_number: i32) -> FanoutReport {
        let subscribers = match self.gateway.find_subscribers(title_id).await {
            Ok(subscribers) => subscribers,
            Err(error) => {
                tracing::error!(
                    err.msg = %error,
                    err.details = ?error,
                    %title_id,
                    volume_number,
                    "Failed loading subscribers for new volume"
                );
                return FanoutReport::default();
            }
        };

        let outcomes: Vec<bool> = stream::iter(subscribers)
            .map(|subscriber| self.deliver(subscriber, volume_number))
            .buffer_unordered(self.max_concurrent_sends)
            .collect()
            .await;

        let delivered = outcomes.iter().filter(|delivered| **delivered).count();
        let report = FanoutReport {
            attempted: outcomes.len(),
            delivered,
            failed: outcomes.len() - delivered,
        };
        tracing::info!(
            attempted = report.attempted,
            delivered = report.delivered,
            failed = report.failed,
            "New volume fanout finished"
        );

        report
    }

    async fn deliver(&self, subscriber: Subscriber, volume_number: i32) -> bool {
        let message = NewVolumeMessage {
            recipient_email: subscriber.email,
            recipient_name: subscriber.name,
            title_name: subscriber.title_name,
            volume_number,
        };

        let result = tokio::time::timeout(self.send_timeout, self.mailer.send_new_volume(&message))
            .await
            .unwrap_or(Err(DeliveryError::Timeout));

        match result {
            Ok(()) => true,
            Err(error) => {
                tracing::error!(
                    err.msg = %error,
                    err.details = ?error,
                    user_id = %subscriber.user_id,
                    recipient = %message.recipient_email,
                    title = %message.title_name,
                    volume_number,
                    "Failed sending new volume e-mail"
                );
                false
            }
        }
    }
}

/// Runs the fanout before returning to the publisher.
#[async_trait]
impl VolumeEventSink for NotificationService {
    async fn volume_added(&self, event: VolumeAdded) {
        self.notify_new_volume(event.title_id, event.volume_number)
            .await;
    }
}

/// Hands the fanout to a background task so the publisher returns right away.
/// Every task is registered on `tasks` so shutdown can wait for it.
#[derive(Clone)]
pub struct DetachedNotifier {
    notifications: NotificationService,
    tasks: TaskTracker,
}

impl DetachedNotifier {
    pub fn new(notifications: NotificationService, tasks: TaskTracker) -> Self {
        DetachedNotifier {
            notifications,
            tasks,
        }
    }
}

#[async_trait]
impl VolumeEventSink for DetachedNotifier {
    async fn volume_added(&self, event: VolumeAdded) {
        let notifications = self.notifications.clone();
        spawn_tracked_with_tracing(&self.tasks, async move {
            notifications
                .notify_new_volume(event.title_id, event.volume_number)
                .await
        });
    }
}

/// Waits up to `grace` for detached fanouts. Returns `false` when some were
/// still running and get dropped with the runtime.
#[tracing::instrument(name = "Drain detached fanouts", skip(tasks))]
pub async fn drain_fanouts(tasks: &TaskTracker, grace: Duration) -> bool {
    tasks.close();
    if tasks.is_empty() {
        return true;
    }

    tracing::info!(pending = tasks.len(), "Waiting for detached fanouts");
    match tokio::time::timeout(grace, tasks.wait()).await {
        Ok(()) => true,
        Err(_) => {
            tracing::error!(
                pending = tasks.len(),
                "Detached fanouts still running at shutdown, their remaining e-mails are lost"
            );
            false
        }
    }
}
