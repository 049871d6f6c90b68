use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use crate::config::Email;

use super::{DeliveryError, Mailer, NewVolumeMessage};

#[derive(Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: String,
    text: String,
    html: String,
}

/// Posts messages as JSON to a transactional mail API.
#[derive(Clone)]
pub struct HttpMailer {
    client: reqwest::Client,
    endpoint: String,
    api_key: SecretString,
    from: String,
    frontend_url: String,
}

impl HttpMailer {
    pub fn new(config: &Email, frontend_url: String) -> Result<Self, DeliveryError> {
        let client = reqwest::Client::builder()
            .timeout(config.send_timeout())
            .build()?;

        Ok(HttpMailer {
            client,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            from: config.from.clone(),
            frontend_url,
        })
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    #[tracing::instrument(
        name = "send new volume email",
        skip_all,
        fields(recipient = %message.recipient_email, volume = message.volume_number)
    )]
    async fn send_new_volume(&self, message: &NewVolumeMessage) -> Result<(), DeliveryError> {
        let body = SendEmailRequest {
            from: &self.from,
            to: &message.recipient_email,
            subject: message.subject(),
            text: message.text_body(&self.frontend_url),
            html: message.html_body(&self.frontend_url),
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DeliveryError::Rejected(status));
        }

        Ok(())
    }
}
