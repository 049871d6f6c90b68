//! Outgoing e-mail for new-volume notifications.

use async_trait::async_trait;

pub mod http;
pub mod log;

pub use self::http::HttpMailer;
pub use self::log::LogMailer;

#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("Mail transport error")]
    Transport(#[from] reqwest::Error),
    #[error("Mail provider rejected the message with status {0}")]
    Rejected(reqwest::StatusCode),
    #[error("Mail delivery timed out")]
    Timeout,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewVolumeMessage {
    pub recipient_email: String,
    pub recipient_name: String,
    pub title_name: String,
    pub volume_number: i32,
}

impl NewVolumeMessage {
    pub fn subject(&self) -> String {
        format!("New volume available: {}", self.title_name)
    }

    pub fn text_body(&self, frontend_url: &str) -> String {
        format!(
            "New volume available!\n\n\
             Hi {name},\n\n\
             Good news! A new volume of \"{title}\" has been added.\n\n\
             Volume {number}\n\
             Title: {title}\n\n\
             Sign in to Kushon to update your progress and mark this volume as owned.\n\n\
             Link: {url}\n\n\
             ---\n\
             You are receiving this e-mail because you enabled notifications for \"{title}\".\n\
             To stop them, turn notifications off in the title settings of your account.\n",
            name = self.recipient_name,
            title = self.title_name,
            number = self.volume_number,
            url = frontend_url,
        )
    }

    pub fn html_body(&self, frontend_url: &str) -> String {
        format!(
            r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
  <h2 style="color: #3498db;">New volume available!</h2>
  <p>Hi {name},</p>
  <p>Good news! A new volume of <strong>{title}</strong> has been added.</p>
  <div style="background-color: #f8f9fa; padding: 20px; border-radius: 8px; margin: 20px 0;">
    <h3 style="color: #2c3e50; margin-top: 0;">Volume {number}</h3>
    <p style="margin-bottom: 0;"><strong>Title:</strong> {title}</p>
  </div>
  <p>Sign in to Kushon to update your progress and mark this volume as owned.</p>
  <p style="text-align: center; margin: 30px 0;"><a href="{url}">Open Kushon</a></p>
  <hr style="border: none; border-top: 1px solid #eee; margin: 30px 0;">
  <p style="color: #7f8c8d; font-size: 12px;">
    You are receiving this e-mail because you enabled notifications for "{title}".
    To stop them, turn notifications off in the title settings of your account.
  </p>
</div>"#,
            name = escape_html(&self.recipient_name),
            title = escape_html(&self.title_name),
            number = self.volume_number,
            url = escape_html(frontend_url),
        )
    }
}

fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Delivers a single message. Implementations report failures, callers decide what to do with them.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_new_volume(&self, message: &NewVolumeMessage) -> Result<(), DeliveryError>;
}
