//! Completion notifications — an opaque side effect behind the `Notifier`
//! seam, implemented against the Resend email API.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tracing::{error, info, warn};
use uuid::Uuid;

const RESEND_API_URL: &str = "https://api.resend.com/emails";

/// Notification seam. Implementations return true when the notification was
/// accepted; failures are reported, never propagated. A finished render is
/// not undone by a lost email.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn render_complete(&self, recipient: &str, job_id: Uuid, video_url: &str) -> bool;
}

/// Resend-backed mailer. Without an API key it stays constructible but
/// declines every send, so local development needs no mail credentials.
pub struct ResendMailer {
    client: Client,
    api_key: Option<String>,
    from_email: String,
}

impl ResendMailer {
    pub fn new(api_key: Option<String>, from_email: String) -> Self {
        match api_key {
            Some(_) => info!("Resend API key found, email notifications enabled"),
            None => warn!("RESEND_API_KEY not set, email notifications disabled"),
        }
        Self {
            client: Client::new(),
            api_key,
            from_email,
        }
    }
}

#[async_trait]
impl Notifier for ResendMailer {
    async fn render_complete(&self, recipient: &str, job_id: Uuid, video_url: &str) -> bool {
        let Some(api_key) = self.api_key.as_deref() else {
            error!("Cannot send notification: RESEND_API_KEY is not set");
            return false;
        };
        if recipient.is_empty() {
            warn!("Recipient email missing, skipping notification");
            return false;
        }

        let payload = json!({
            "from": format!("Leap <{}>", self.from_email),
            "to": [recipient],
            "subject": "Your Leap animation is ready!",
            "html": notification_html(job_id, video_url),
        });

        let response = self
            .client
            .post(RESEND_API_URL)
            .bearer_auth(api_key)
            .json(&payload)
            .send()
            .await;

        match response {
            Ok(r) if r.status().is_success() => {
                info!(recipient, %job_id, "Notification email sent");
                true
            }
            Ok(r) => {
                let status = r.status();
                let body = r.text().await.unwrap_or_default();
                error!(recipient, %status, "Notification send failed: {body}");
                false
            }
            Err(e) => {
                error!(recipient, "Notification request failed: {e}");
                false
            }
        }
    }
}

fn notification_html(job_id: Uuid, video_url: &str) -> String {
    format!(
        "<h1>Your animation is ready!</h1>\
         <p>Your requested animation has been generated and is ready to view.</p>\
         <p><a href=\"{video_url}\">Click here to view your animation</a></p>\
         <p>Job ID: {job_id}</p>\
         <p>Thank you for using Leap!</p>"
    )
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notification_html_embeds_link_and_job_id() {
        let job_id = Uuid::new_v4();
        let html = notification_html(job_id, "https://cdn.example.com/v.mp4");
        assert!(html.contains("href=\"https://cdn.example.com/v.mp4\""));
        assert!(html.contains(&job_id.to_string()));
    }

    #[tokio::test]
    async fn test_mailer_without_key_declines_send() {
        let mailer = ResendMailer::new(None, "notifications@askleap.dev".to_string());
        let sent = mailer
            .render_complete("user@example.com", Uuid::new_v4(), "http://x/v.mp4")
            .await;
        assert!(!sent);
    }

    #[tokio::test]
    async fn test_mailer_rejects_empty_recipient() {
        let mailer = ResendMailer::new(
            Some("re_test_key".to_string()),
            "notifications@askleap.dev".to_string(),
        );
        assert!(!mailer.render_complete("", Uuid::new_v4(), "http://x/v.mp4").await);
    }
}
