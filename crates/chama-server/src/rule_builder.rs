use crate::config::{ConditionConfig, NotificationConfig, WalletRuleConfig};
use anyhow::{Context, Result};
use chama_notify::manager::NotificationManager;
use chama_notify::plugin::ChannelRegistry;
use chama_notify::Notifier;
use chama_rules::conditions::{AlwaysTrue, CompositeCondition, LogicalOperator, TimeWindowCondition};
use chama_rules::factory::WalletBalanceRuleBuilder;
use chama_rules::rule::Rule;
use chama_rules::Condition;
use chama_store::{ChamaStore, WalletStore};
use std::sync::Arc;
use std::time::Duration;

/// Lookups and dispatch shared by every wallet rule.
#[derive(Clone)]
pub struct RuleDeps {
    pub wallets: Arc<dyn WalletStore>,
    pub chamas: Arc<dyn ChamaStore>,
    pub notifier: Arc<dyn Notifier>,
}

// ---- Config -> Condition trait object ----

pub fn build_condition(config: &ConditionConfig) -> Result<Arc<dyn Condition>> {
    match config {
        ConditionConfig::Always => Ok(Arc::new(AlwaysTrue)),
        ConditionConfig::TimeWindow {
            day_of_week,
            hour_of_day,
            minute_of_hour,
        } => {
            let cond = TimeWindowCondition::new(*day_of_week, *hour_of_day, *minute_of_hour)?;
            Ok(Arc::new(cond))
        }
        ConditionConfig::Composite {
            operator,
            conditions,
        } => {
            let operator: LogicalOperator = operator.parse()?;
            let conditions = conditions
                .iter()
                .map(build_condition)
                .collect::<Result<Vec<_>>>()?;
            Ok(Arc::new(CompositeCondition::new(conditions, operator)))
        }
    }
}

// ---- Config -> Rule ----

/// Convert a single `[[wallet_rules]]` entry into a [`Rule`].
pub fn build_rule_from_config(
    config: &WalletRuleConfig,
    default_interval_secs: u64,
    deps: &RuleDeps,
) -> Result<Rule> {
    if config.wallet_id.trim().is_empty() {
        anyhow::bail!("wallet_id must not be empty");
    }

    let condition = build_condition(&config.condition)
        .with_context(|| format!("invalid condition for wallet {}", config.wallet_id))?;
    let interval = Duration::from_secs(config.interval_secs.unwrap_or(default_interval_secs));

    let mut builder = WalletBalanceRuleBuilder::new(
        config.wallet_id.clone(),
        deps.wallets.clone(),
        deps.chamas.clone(),
        deps.notifier.clone(),
    )
    .active(config.enabled)
    .interval(interval)
    .condition(condition);

    if let Some(id) = &config.id {
        builder = builder.id(id.clone());
    }
    if let Some(name) = &config.name {
        builder = builder.name(name.clone());
    }
    if let Some(description) = &config.description {
        builder = builder.description(description.clone());
    }

    builder
        .build()
        .with_context(|| format!("invalid schedule for wallet {}", config.wallet_id))
}

/// Convert multiple entries, skipping invalid ones with warnings.
pub fn build_rules_from_config(
    configs: &[WalletRuleConfig],
    default_interval_secs: u64,
    deps: &RuleDeps,
) -> Vec<Rule> {
    let mut rules = Vec::with_capacity(configs.len());
    for config in configs {
        match build_rule_from_config(config, default_interval_secs, deps) {
            Ok(rule) => rules.push(rule),
            Err(e) => {
                tracing::warn!(
                    wallet_id = %config.wallet_id,
                    rule_name = config.name.as_deref().unwrap_or("-"),
                    error = %format!("{e:#}"),
                    "Skipping invalid wallet rule"
                );
            }
        }
    }
    rules
}

// ---- Config -> Notifier ----

/// Build the notification manager. An unknown channel type or invalid
/// channel config is a startup error.
pub fn build_notifier(
    config: &NotificationConfig,
    registry: &ChannelRegistry,
) -> Result<NotificationManager> {
    registry
        .build_manager(
            config
                .channels
                .iter()
                .map(|c| (c.channel_type.as_str(), &c.config)),
        )
        .context("invalid notification channel configuration")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ChannelConfig;
    use chama_notify::channels::log::LogChannel;
    use chama_store::{InMemoryChamaStore, InMemoryWalletStore};

    fn deps() -> RuleDeps {
        RuleDeps {
            wallets: Arc::new(InMemoryWalletStore::new()),
            chamas: Arc::new(InMemoryChamaStore::new()),
            notifier: Arc::new(NotificationManager::new(vec![Box::new(LogChannel)])),
        }
    }

    fn rule_config(wallet_id: &str) -> WalletRuleConfig {
        WalletRuleConfig {
            wallet_id: wallet_id.to_string(),
            id: None,
            name: None,
            description: None,
            enabled: true,
            interval_secs: None,
            condition: ConditionConfig::Always,
        }
    }

    #[test]
    fn defaults_produce_hourly_always_true_rule() {
        let rule = build_rule_from_config(&rule_config("W1"), 3600, &deps()).unwrap();
        assert_eq!(rule.name, "Hourly Wallet Balance Notification");
        assert_eq!(rule.schedule().unwrap().interval(), Duration::from_secs(3600));
        assert_eq!(rule.condition().kind(), "always_true");
        assert!(rule.is_active());
    }

    #[test]
    fn entry_overrides_apply() {
        let mut config = rule_config("W1");
        config.id = Some("w1-balance".into());
        config.name = Some("Morning balance".into());
        config.enabled = false;
        config.interval_secs = Some(120);
        config.condition = ConditionConfig::TimeWindow {
            day_of_week: None,
            hour_of_day: Some(8),
            minute_of_hour: None,
        };

        let rule = build_rule_from_config(&config, 3600, &deps()).unwrap();
        assert_eq!(rule.id(), "w1-balance");
        assert_eq!(rule.name, "Morning balance");
        assert!(!rule.is_active());
        assert_eq!(rule.schedule().unwrap().interval(), Duration::from_secs(120));
        assert_eq!(rule.condition().kind(), "time_window");
    }

    #[test]
    fn invalid_entries_are_rejected() {
        let mut zero_interval = rule_config("W1");
        zero_interval.interval_secs = Some(0);
        assert!(build_rule_from_config(&zero_interval, 3600, &deps()).is_err());

        let mut bad_hour = rule_config("W1");
        bad_hour.condition = ConditionConfig::TimeWindow {
            day_of_week: None,
            hour_of_day: Some(24),
            minute_of_hour: None,
        };
        assert!(build_rule_from_config(&bad_hour, 3600, &deps()).is_err());

        let mut bad_operator = rule_config("W1");
        bad_operator.condition = ConditionConfig::Composite {
            operator: "xor".into(),
            conditions: vec![],
        };
        let err = build_rule_from_config(&bad_operator, 3600, &deps()).unwrap_err();
        assert!(format!("{err:#}").contains("xor"));

        assert!(build_rule_from_config(&rule_config("  "), 3600, &deps()).is_err());
    }

    #[test]
    fn build_rules_skips_invalid_entries() {
        let mut bad = rule_config("W2");
        bad.interval_secs = Some(0);
        let configs = vec![rule_config("W1"), bad, rule_config("W3")];

        let rules = build_rules_from_config(&configs, 3600, &deps());
        assert_eq!(rules.len(), 2);
    }

    #[test]
    fn nested_composite_builds() {
        let config = ConditionConfig::Composite {
            operator: "and".into(),
            conditions: vec![
                ConditionConfig::Always,
                ConditionConfig::Composite {
                    operator: "any".into(),
                    conditions: vec![],
                },
            ],
        };
        assert_eq!(build_condition(&config).unwrap().kind(), "composite");
    }

    #[test]
    fn empty_channel_list_falls_back_to_log() {
        let notifier =
            build_notifier(&NotificationConfig::default(), &ChannelRegistry::default()).unwrap();
        assert_eq!(notifier.channels().len(), 1);
        assert_eq!(notifier.channels()[0].channel_name(), "log");
    }

    #[test]
    fn unknown_channel_type_is_a_startup_error() {
        let config = NotificationConfig {
            channels: vec![ChannelConfig {
                channel_type: "pigeon".into(),
                config: serde_json::json!({}),
            }],
        };
        let err = build_notifier(&config, &ChannelRegistry::default()).unwrap_err();
        assert!(format!("{err:#}").contains("'pigeon'"));
    }

    #[test]
    fn oversized_interval_is_rejected() {
        let mut huge = rule_config("W1");
        huge.interval_secs = Some(u64::MAX);
        let err = build_rule_from_config(&huge, 3600, &deps()).unwrap_err();
        assert!(format!("{err:#}").contains("must be between"));

        let rules = build_rules_from_config(&[huge, rule_config("W2")], 3600, &deps());
        assert_eq!(rules.len(), 1);
    }
}
