use async_trait::async_trait;

use super::{DeliveryError, Mailer, NewVolumeMessage};

/// Writes the message to the log instead of sending it.
#[derive(Debug, Default, Clone)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send_new_volume(&self, message: &NewVolumeMessage) -> Result<(), DeliveryError> {
        tracing::info!(
            recipient = %message.recipient_email,
            title = %message.title_name,
            volume = message.volume_number,
            subject = %message.subject(),
            "New volume e-mail (log driver)"
        );

        Ok(())
    }
}
