use crate::config::ServerConfig;
use crate::rule_builder::{self, RuleDeps};
use crate::seed;
use anyhow::Result;
use chama_notify::manager::NotificationManager;
use chama_notify::plugin::ChannelRegistry;
use chama_rules::engine::RuleEngine;
use chama_store::{InMemoryChamaStore, InMemoryWalletStore};
use std::sync::Arc;

/// Everything the running process holds on to.
#[derive(Clone)]
pub struct AppState {
    pub wallets: Arc<InMemoryWalletStore>,
    pub chamas: Arc<InMemoryChamaStore>,
    pub notifier: Arc<NotificationManager>,
    pub engine: RuleEngine,
    pub config: Arc<ServerConfig>,
}

/// Build stores, notifier and engine from `config` and register the
/// configured wallet rules. Does not start scheduling.
pub fn build_app_state(config: ServerConfig) -> Result<AppState> {
    let wallets = Arc::new(InMemoryWalletStore::new());
    let chamas = Arc::new(InMemoryChamaStore::new());

    if let Some(path) = &config.seed_path {
        let seed = seed::load_seed_file(path)?;
        seed::apply_seed(seed, &wallets, &chamas);
    }

    let registry = ChannelRegistry::default();
    let notifier = Arc::new(rule_builder::build_notifier(&config.notification, &registry)?);

    let deps = RuleDeps {
        wallets: wallets.clone(),
        chamas: chamas.clone(),
        notifier: notifier.clone(),
    };
    let rules = rule_builder::build_rules_from_config(
        &config.wallet_rules,
        config.engine.default_interval_secs,
        &deps,
    );

    let engine = RuleEngine::new();
    for rule in rules {
        engine.add_rule(rule);
    }
    tracing::info!(
        configured = config.wallet_rules.len(),
        registered = engine.len(),
        "Wallet rules loaded"
    );

    Ok(AppState {
        wallets,
        chamas,
        notifier,
        engine,
        config: Arc::new(config),
    })
}
