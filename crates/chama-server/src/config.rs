use anyhow::Context;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Optional JSON file with wallets and chamas loaded into the in-memory
    /// stores at startup.
    #[serde(default)]
    pub seed_path: Option<String>,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub notification: NotificationConfig,
    #[serde(default)]
    pub wallet_rules: Vec<WalletRuleConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Start scheduled rules as soon as they are registered.
    #[serde(default = "default_autostart")]
    pub autostart: bool,
    /// Interval for wallet rules that do not set their own.
    #[serde(default = "default_interval_secs")]
    pub default_interval_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            autostart: default_autostart(),
            default_interval_secs: default_interval_secs(),
        }
    }
}

fn default_autostart() -> bool {
    true
}

fn default_interval_secs() -> u64 {
    3600
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// Delivery channels. When empty, messages go to the log channel only.
    #[serde(default)]
    pub channels: Vec<ChannelConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelConfig {
    /// Registered plugin name: `log`, `sms` or `webhook`.
    pub channel_type: String,
    #[serde(default = "default_channel_config")]
    pub config: serde_json::Value,
}

fn default_channel_config() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

/// One balance-notification rule for a wallet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletRuleConfig {
    pub wallet_id: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Falls back to `[engine].default_interval_secs`.
    #[serde(default)]
    pub interval_secs: Option<u64>,
    #[serde(default)]
    pub condition: ConditionConfig,
}

fn default_enabled() -> bool {
    true
}

/// Condition tree as written in TOML, tagged by `type`.
///
/// ```toml
/// [wallet_rules.condition]
/// type = "composite"
/// operator = "or"
/// conditions = [
///   { type = "time_window", day_of_week = 1, hour_of_day = 8 },
///   { type = "time_window", day_of_week = 5, hour_of_day = 17 },
/// ]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConditionConfig {
    #[default]
    Always,
    TimeWindow {
        #[serde(default)]
        day_of_week: Option<u32>,
        #[serde(default)]
        hour_of_day: Option<u32>,
        #[serde(default)]
        minute_of_hour: Option<u32>,
    },
    Composite {
        #[serde(default = "default_operator")]
        operator: String,
        #[serde(default)]
        conditions: Vec<ConditionConfig>,
    },
}

fn default_operator() -> String {
    "and".to_string()
}

impl ServerConfig {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file '{path}'"))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse config file '{path}'"))
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }
}
