use crate::actions::WalletBalanceNotification;
use crate::conditions::AlwaysTrue;
use crate::error::Result;
use crate::rule::{Rule, Schedule};
use crate::Condition;
use chama_notify::Notifier;
use chama_store::{ChamaStore, WalletStore};
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_RULE_NAME: &str = "Hourly Wallet Balance Notification";
pub const DEFAULT_RULE_DESCRIPTION: &str =
    "Notifies all chama members of the wallet balance every hour";
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Builds rules that notify a wallet's chama members of its balance.
///
/// Defaults to an active, hourly, unconditional rule.
///
/// # Examples
///
/// ```rust
/// use chama_notify::manager::NotificationManager;
/// use chama_rules::factory::WalletBalanceRuleBuilder;
/// use chama_store::{InMemoryChamaStore, InMemoryWalletStore};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// let rule = WalletBalanceRuleBuilder::new(
///     "w1",
///     Arc::new(InMemoryWalletStore::new()),
///     Arc::new(InMemoryChamaStore::new()),
///     Arc::new(NotificationManager::new(vec![])),
/// )
/// .interval(Duration::from_secs(300))
/// .build()
/// .unwrap();
///
/// assert_eq!(rule.schedule().unwrap().interval(), Duration::from_secs(300));
/// assert!(rule.is_active());
/// ```
pub struct WalletBalanceRuleBuilder {
    wallet_id: String,
    wallets: Arc<dyn WalletStore>,
    chamas: Arc<dyn ChamaStore>,
    notifier: Arc<dyn Notifier>,
    id: Option<String>,
    name: String,
    description: String,
    is_active: bool,
    interval: Duration,
    condition: Arc<dyn Condition>,
}

impl WalletBalanceRuleBuilder {
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
            id: None,
            name: DEFAULT_RULE_NAME.to_string(),
            description: DEFAULT_RULE_DESCRIPTION.to_string(),
            is_active: true,
            interval: DEFAULT_INTERVAL,
            condition: Arc::new(AlwaysTrue),
        }
    }

    /// Use a fixed id instead of a generated one.
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }

    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn condition(mut self, condition: Arc<dyn Condition>) -> Self {
        self.condition = condition;
        self
    }

    /// # Errors
    ///
    /// Returns the [`crate::error::RuleError`] from [`Schedule::every`] for an
    /// interval that is zero or out of range.
    pub fn build(self) -> Result<Rule> {
        let schedule = Schedule::every(self.interval)?;
        let action = Arc::new(WalletBalanceNotification::new(
            self.wallet_id,
            self.wallets,
            self.chamas,
            self.notifier,
        ));

        let rule = match self.id {
            Some(id) => Rule::with_id(id, self.name, self.condition, action),
            None => Rule::new(self.name, self.condition, action),
        };
        Ok(rule
            .description(self.description)
            .with_schedule(schedule)
            .active(self.is_active))
    }
}

/// The default hourly wallet-balance rule for `wallet_id`.
pub fn hourly_wallet_balance_rule(
    wallet_id: impl Into<String>,
    wallets: Arc<dyn WalletStore>,
    chamas: Arc<dyn ChamaStore>,
    notifier: Arc<dyn Notifier>,
) -> Rule {
    let action = Arc::new(WalletBalanceNotification::new(
        wallet_id, wallets, chamas, notifier,
    ));
    Rule::new(DEFAULT_RULE_NAME, Arc::new(AlwaysTrue), action)
        .description(DEFAULT_RULE_DESCRIPTION)
        .with_schedule(Schedule::hourly())
}
