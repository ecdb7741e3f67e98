use crate::Action;
use anyhow::Context;
use async_trait::async_trait;
use chama_common::types::Wallet;
use chama_notify::Notifier;
use chama_store::{ChamaStore, WalletStore};
use chrono::{DateTime, Local};
use std::sync::Arc;

/// Tells every member of the chama linked to a wallet what its balance is.
///
/// A missing wallet or an empty roster is logged and treated as a completed
/// run with nothing to send. Per-member delivery failures are logged and do
/// not stop the remaining deliveries. Lookup errors from the stores are
/// returned to the engine.
pub struct WalletBalanceNotification {
    wallet_id: String,
    wallets: Arc<dyn WalletStore>,
    chamas: Arc<dyn ChamaStore>,
    notifier: Arc<dyn Notifier>,
}

impl WalletBalanceNotification {
    pub fn new(
        wallet_id: impl Into<String>,
        wallets: Arc<dyn WalletStore>,
        chamas: Arc<dyn ChamaStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            wallet_id: wallet_id.into(),
            wallets,
            chamas,
            notifier,
        }
    }

    pub fn wallet_id(&self) -> &str {
        &self.wallet_id
    }

    pub fn format_message(wallet: &Wallet, at: DateTime<Local>) -> String {
        format!(
            "Your chama wallet balance is {} {}. Updated at {}",
            wallet.balance,
            wallet.currency,
            at.format("%Y-%m-%d %H:%M:%S"),
        )
    }
}

#[async_trait]
impl Action for WalletBalanceNotification {
    fn kind(&self) -> &str {
        "wallet_balance"
    }

    async fn execute(&self) -> anyhow::Result<()> {
        let wallet = self
            .wallets
            .get_wallet(&self.wallet_id)
            .await
            .with_context(|| format!("wallet lookup failed for {}", self.wallet_id))?;
        let Some(wallet) = wallet else {
            tracing::warn!(wallet_id = %self.wallet_id, "Wallet not found, nothing to notify");
            return Ok(());
        };

        let members = self
            .chamas
            .members_of_wallet(&self.wallet_id)
            .await
            .with_context(|| format!("member lookup failed for wallet {}", self.wallet_id))?;
        if members.is_empty() {
            tracing::warn!(wallet_id = %self.wallet_id, "No members found for wallet, nothing to notify");
            return Ok(());
        }

        let message = Self::format_message(&wallet, Local::now());
        let outcomes = self.notifier.notify_many(&members, &message).await;

        let failed = outcomes.iter().filter(|o| !o.is_delivered()).count();
        if failed > 0 {
            tracing::warn!(
                wallet_id = %self.wallet_id,
                recipients = outcomes.len(),
                failed,
                "Wallet balance notification partially delivered"
            );
        } else {
            tracing::info!(
                wallet_id = %self.wallet_id,
                recipients = outcomes.len(),
                "Wallet balance notification sent"
            );
        }
        Ok(())
    }
}
