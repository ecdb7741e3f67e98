use crate::error::{NotifyError, Result};
use crate::plugin::ChannelPlugin;
use crate::utils::send_with_retry;
use crate::NotificationChannel;
use async_trait::async_trait;
use chama_common::types::Member;
use serde::Deserialize;
use serde_json::Value;

pub struct SmsChannel {
    client: reqwest::Client,
    gateway_url: String,
    api_key: String,
    sender_id: Option<String>,
}

impl SmsChannel {
    pub fn new(gateway_url: &str, api_key: &str, sender_id: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            gateway_url: gateway_url.to_string(),
            api_key: api_key.to_string(),
            sender_id,
        }
    }

    fn payload(&self, phone: &str, message: &str) -> Value {
        let mut payload = serde_json::json!({
            "to": phone,
            "message": message,
        });
        if let Some(sender) = &self.sender_id {
            payload["from"] = Value::String(sender.clone());
        }
        payload
    }
}

#[async_trait]
impl NotificationChannel for SmsChannel {
    async fn send(&self, recipient: &Member, message: &str) -> Result<()> {
        let phone = recipient
            .phone
            .as_deref()
            .ok_or_else(|| NotifyError::MissingContact {
                member_id: recipient.id.clone(),
                channel: "sms".to_string(),
                contact: "phone number",
            })?;

        let payload = self.payload(phone, message);
        send_with_retry("sms", || {
            self.client
                .post(&self.gateway_url)
                .header("Authorization", format!("Bearer {}", self.api_key))
                .json(&payload)
        })
        .await
        .inspect_err(|e| {
            tracing::error!(phone = %phone, error = %e, "SMS failed after retries");
        })
    }

    fn channel_name(&self) -> &str {
        "sms"
    }
}

// Plugin

#[derive(Deserialize)]
struct SmsConfig {
    gateway_url: String,
    api_key: String,
    #[serde(default)]
    sender_id: Option<String>,
}

pub struct SmsPlugin;

impl ChannelPlugin for SmsPlugin {
    fn name(&self) -> &str {
        "sms"
    }

    fn validate_config(&self, config: &Value) -> Result<()> {
        serde_json::from_value::<SmsConfig>(config.clone())
            .map_err(|e| NotifyError::InvalidConfig(format!("sms: {e}")))?;
        Ok(())
    }

    fn create_channel(&self, config: &Value) -> Result<Box<dyn NotificationChannel>> {
        let cfg: SmsConfig = serde_json::from_value(config.clone())
            .map_err(|e| NotifyError::InvalidConfig(format!("sms: {e}")))?;
        Ok(Box::new(SmsChannel::new(
            &cfg.gateway_url,
            &cfg.api_key,
            cfg.sender_id,
        )))
    }
}
