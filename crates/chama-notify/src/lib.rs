//! Member notification delivery.
//!
//! Messages are delivered to chama members through one or more
//! [`NotificationChannel`] implementations. [`manager::NotificationManager`]
//! ties the configured channels together behind the [`Notifier`] trait,
//! which is what rule actions depend on. Built-in channels are a log
//! channel, an SMS gateway channel, and a JSON webhook channel.

pub mod channels;
pub mod error;
pub mod manager;
pub mod plugin;
pub mod utils;

#[cfg(test)]
mod tests;

use async_trait::async_trait;
use chama_common::types::Member;
use error::Result;
use serde::Serialize;

/// A delivery channel that sends a text message to a single member through
/// an external service (e.g., SMS gateway, webhook).
///
/// Implementations are created by the corresponding [`plugin::ChannelPlugin`].
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    /// Delivers `message` to `recipient` through this channel.
    ///
    /// # Errors
    ///
    /// Returns an error if the member has no contact this channel can use,
    /// or if delivery fails after retries (if applicable).
    async fn send(&self, recipient: &Member, message: &str) -> Result<()>;

    /// Returns the channel type name (e.g., `"sms"`, `"webhook"`).
    fn channel_name(&self) -> &str;
}

/// Result of delivering one message to one member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeliveryOutcome {
    pub member_id: String,
    pub member_name: String,
    /// `None` on success, otherwise the delivery error rendered as text.
    pub error: Option<String>,
}

impl DeliveryOutcome {
    pub fn from_result(member: &Member, result: Result<()>) -> Self {
        Self {
            member_id: member.id.clone(),
            member_name: member.name.clone(),
            error: result.err().map(|e| e.to_string()),
        }
    }

    pub fn is_delivered(&self) -> bool {
        self.error.is_none()
    }
}

/// Dispatches messages to members.
///
/// `notify_many` fans out `notify_one` to every member concurrently and
/// never stops at the first failure: each member gets exactly one
/// [`DeliveryOutcome`], in roster order.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify_one(&self, member: &Member, message: &str) -> Result<()>;

    async fn notify_many(&self, members: &[Member], message: &str) -> Vec<DeliveryOutcome> {
        tracing::debug!(recipients = members.len(), "Fanning out notification");
        let sends = members.iter().map(|member| async move {
            let result = self.notify_one(member, message).await;
            if let Err(e) = &result {
                tracing::warn!(member_id = %member.id, error = %e, "Notification not delivered");
            }
            DeliveryOutcome::from_result(member, result)
        });
        futures::future::join_all(sends).await
    }
}
