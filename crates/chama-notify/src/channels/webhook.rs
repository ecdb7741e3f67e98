use crate::error::{NotifyError, Result};
use crate::plugin::ChannelPlugin;
use crate::utils::send_with_retry;
use crate::NotificationChannel;
use async_trait::async_trait;
use chama_common::types::Member;
use serde::Deserialize;
use serde_json::Value;

pub struct WebhookChannel {
    client: reqwest::Client,
    url: String,
    body_template: Option<String>,
}

impl WebhookChannel {
    pub fn new(url: &str, body_template: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.to_string(),
            body_template,
        }
    }

    pub fn render_body(&self, recipient: &Member, message: &str) -> String {
        if let Some(template) = &self.body_template {
            template
                .replace("{{member_id}}", &recipient.id)
                .replace("{{member_name}}", &recipient.name)
                .replace("{{contact}}", recipient.contact().unwrap_or(""))
                .replace("{{message}}", message)
        } else {
            serde_json::json!({
                "member_id": recipient.id,
                "member_name": recipient.name,
                "phone": recipient.phone,
                "npub": recipient.npub,
                "message": message,
            })
            .to_string()
        }
    }
}

#[async_trait]
impl NotificationChannel for WebhookChannel {
    async fn send(&self, recipient: &Member, message: &str) -> Result<()> {
        let body = self.render_body(recipient, message);
        send_with_retry("webhook", || {
            self.client
                .post(self.url.as_str())
                .header("Content-Type", "application/json")
                .body(body.clone())
        })
        .await
        .inspect_err(|e| {
            tracing::error!(url = %self.url, member_id = %recipient.id, error = %e, "Webhook failed after retries");
        })
    }

    fn channel_name(&self) -> &str {
        "webhook"
    }
}

// Plugin

#[derive(Deserialize)]
struct WebhookConfig {
    url: String,
    #[serde(default)]
    body_template: Option<String>,
}

pub struct WebhookPlugin;

impl ChannelPlugin for WebhookPlugin {
    fn name(&self) -> &str {
        "webhook"
    }

    fn validate_config(&self, config: &Value) -> Result<()> {
        serde_json::from_value::<WebhookConfig>(config.clone())
            .map_err(|e| NotifyError::InvalidConfig(format!("webhook: {e}")))?;
        Ok(())
    }

    fn create_channel(&self, config: &Value) -> Result<Box<dyn NotificationChannel>> {
        let cfg: WebhookConfig = serde_json::from_value(config.clone())
            .map_err(|e| NotifyError::InvalidConfig(format!("webhook: {e}")))?;
        Ok(Box::new(WebhookChannel::new(&cfg.url, cfg.body_template)))
    }
}
