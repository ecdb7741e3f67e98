use crate::error::Result;
use crate::plugin::ChannelPlugin;
use crate::NotificationChannel;
use async_trait::async_trait;
use chama_common::types::Member;
use serde_json::Value;

/// Writes each notification to the log instead of an external service.
/// Used in development and as the fallback when no channel is configured.
pub struct LogChannel;

impl LogChannel {
    pub fn format_line(recipient: &Member, message: &str) -> String {
        format!(
            "To: {} ({}): {}",
            recipient.name,
            recipient.contact().unwrap_or("no contact"),
            message
        )
    }
}

#[async_trait]
impl NotificationChannel for LogChannel {
    async fn send(&self, recipient: &Member, message: &str) -> Result<()> {
        tracing::info!(
            member_id = %recipient.id,
            "[NOTIFICATION] {}",
            Self::format_line(recipient, message)
        );
        Ok(())
    }

    fn channel_name(&self) -> &str {
        "log"
    }
}

// Plugin

pub struct LogPlugin;

impl ChannelPlugin for LogPlugin {
    fn name(&self) -> &str {
        "log"
    }

    fn validate_config(&self, _config: &Value) -> Result<()> {
        Ok(())
    }

    fn create_channel(&self, _config: &Value) -> Result<Box<dyn NotificationChannel>> {
        Ok(Box::new(LogChannel))
    }
}
