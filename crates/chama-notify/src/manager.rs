use crate::error::{NotifyError, Result};
use crate::{NotificationChannel, Notifier};
use async_trait::async_trait;
use chama_common::types::Member;

/// Delivers member notifications through every configured channel.
///
/// A member counts as notified when at least one channel accepted the
/// message; channel failures are logged and only surface if all of them
/// failed.
pub struct NotificationManager {
    channels: Vec<Box<dyn NotificationChannel>>,
}

impl std::fmt::Debug for NotificationManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationManager")
            .field(
                "channels",
                &self.channels.iter().map(|c| c.channel_name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl NotificationManager {
    pub fn new(channels: Vec<Box<dyn NotificationChannel>>) -> Self {
        Self { channels }
    }

    pub fn channels(&self) -> &[Box<dyn NotificationChannel>] {
        &self.channels
    }
}

#[async_trait]
impl Notifier for NotificationManager {
    async fn notify_one(&self, member: &Member, message: &str) -> Result<()> {
        if self.channels.is_empty() {
            return Err(NotifyError::NoChannels);
        }

        let mut failures = Vec::new();
        for channel in &self.channels {
            match channel.send(member, message).await {
                Ok(()) => {
                    tracing::debug!(
                        channel = channel.channel_name(),
                        member_id = %member.id,
                        "Notification delivered"
                    );
                }
                Err(e) => {
                    tracing::error!(
                        channel = channel.channel_name(),
                        member_id = %member.id,
                        error = %e,
                        "Failed to send notification"
                    );
                    failures.push(format!("{}: {e}", channel.channel_name()));
                }
            }
        }

        if failures.len() == self.channels.len() {
            Err(NotifyError::Undelivered {
                member_id: member.id.clone(),
                reasons: failures.join("; "),
            })
        } else {
            Ok(())
        }
    }
}
