use crate::channels::log::LogChannel;
use crate::error::{NotifyError, Result};
use crate::manager::NotificationManager;
use crate::NotificationChannel;
use serde_json::Value;
use std::collections::HashMap;

/// Factory for creating [`NotificationChannel`] instances from JSON
/// configuration.
///
/// Each plugin is registered in the [`ChannelRegistry`] by its `name()`.
pub trait ChannelPlugin: Send + Sync {
    /// Returns the plugin type name (e.g., `"sms"`, `"webhook"`).
    fn name(&self) -> &str;

    /// Validates a JSON config blob against this plugin's expected schema.
    fn validate_config(&self, config: &Value) -> Result<()>;

    /// Creates a configured channel instance from a validated JSON config.
    fn create_channel(&self, config: &Value) -> Result<Box<dyn NotificationChannel>>;

    /// Returns a copy of `config` safe to log.
    fn redact_config(&self, config: &Value) -> Value {
        crate::utils::redact_sensitive_json(config)
    }
}

/// Registry of available [`ChannelPlugin`]s, used to instantiate
/// notification channels from configuration.
///
/// # Examples
///
/// ```
/// use chama_notify::plugin::ChannelRegistry;
///
/// let registry = ChannelRegistry::default();
/// assert!(registry.has_plugin("log"));
/// assert!(registry.has_plugin("sms"));
/// assert!(registry.has_plugin("webhook"));
/// assert!(!registry.has_plugin("nonexistent"));
/// ```
pub struct ChannelRegistry {
    plugins: HashMap<String, Box<dyn ChannelPlugin>>,
}

impl ChannelRegistry {
    pub fn new() -> Self {
        Self {
            plugins: HashMap::new(),
        }
    }

    pub fn register(&mut self, plugin: Box<dyn ChannelPlugin>) {
        let name = plugin.name().to_string();
        self.plugins.insert(name, plugin);
    }

    pub fn create_channel(
        &self,
        type_name: &str,
        config: &Value,
    ) -> Result<Box<dyn NotificationChannel>> {
        let plugin = self
            .plugins
            .get(type_name)
            .ok_or_else(|| NotifyError::UnknownChannelType(type_name.to_string()))?;
        plugin.validate_config(config)?;
        tracing::debug!(
            channel_type = type_name,
            config = %plugin.redact_config(config),
            "Creating notification channel"
        );
        plugin.create_channel(config)
    }

    /// Build the member notifier from `(channel_type, config)` pairs, in
    /// order. With no channels configured, notifications go to the log.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError::ChannelSetup`] naming the first channel that
    /// is unknown or misconfigured.
    pub fn build_manager<'a, I>(&self, channels: I) -> Result<NotificationManager>
    where
        I: IntoIterator<Item = (&'a str, &'a Value)>,
    {
        let mut built: Vec<Box<dyn NotificationChannel>> = Vec::new();
        for (channel_type, config) in channels {
            let channel = self.create_channel(channel_type, config).map_err(|source| {
                NotifyError::ChannelSetup {
                    channel_type: channel_type.to_string(),
                    source: Box::new(source),
                }
            })?;
            built.push(channel);
        }

        if built.is_empty() {
            tracing::info!("No notification channels configured, using log channel");
            built.push(Box::new(LogChannel));
        }
        tracing::info!(channel_count = built.len(), "Notification channels loaded");
        Ok(NotificationManager::new(built))
    }

    pub fn get_plugin(&self, type_name: &str) -> Option<&dyn ChannelPlugin> {
        self.plugins.get(type_name).map(|p| p.as_ref())
    }

    pub fn has_plugin(&self, type_name: &str) -> bool {
        self.plugins.contains_key(type_name)
    }

    pub fn plugin_names(&self) -> Vec<&str> {
        self.plugins.keys().map(|s| s.as_str()).collect()
    }
}

impl Default for ChannelRegistry {
    fn default() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(crate::channels::log::LogPlugin));
        registry.register(Box::new(crate::channels::sms::SmsPlugin));
        registry.register(Box::new(crate::channels::webhook::WebhookPlugin));
        registry
    }
}
