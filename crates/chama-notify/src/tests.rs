use crate::channels::log::LogChannel;
use crate::channels::webhook::WebhookChannel;
use crate::error::{NotifyError, Result};
use crate::manager::NotificationManager;
use crate::plugin::ChannelRegistry;
use crate::{NotificationChannel, Notifier};
use async_trait::async_trait;
use chama_common::types::Member;
use std::sync::{Arc, Mutex};

/// Records every delivery and fails for the listed member ids.
struct RecordingChannel {
    sent: Arc<Mutex<Vec<(String, String)>>>,
    fail_for: Vec<String>,
}

impl RecordingChannel {
    fn new(fail_for: &[&str]) -> (Self, Arc<Mutex<Vec<(String, String)>>>) {
        let sent = Arc::new(Mutex::new(Vec::new()));
        let channel = Self {
            sent: sent.clone(),
            fail_for: fail_for.iter().map(|s| s.to_string()).collect(),
        };
        (channel, sent)
    }
}

#[async_trait]
impl NotificationChannel for RecordingChannel {
    async fn send(&self, recipient: &Member, message: &str) -> Result<()> {
        if self.fail_for.contains(&recipient.id) {
            return Err(NotifyError::Other(format!("refused {}", recipient.id)));
        }
        self.sent
            .lock()
            .unwrap()
            .push((recipient.id.clone(), message.to_string()));
        Ok(())
    }

    fn channel_name(&self) -> &str {
        "recording"
    }
}

fn roster() -> Vec<Member> {
    vec![
        Member::new("m1", "Achieng"),
        Member::new("m2", "Baraka"),
        Member::new("m3", "Chebet"),
    ]
}

// ── Manager / fan-out tests ──

#[tokio::test]
async fn notify_many_reaches_every_member() {
    let (channel, sent) = RecordingChannel::new(&[]);
    let manager = NotificationManager::new(vec![Box::new(channel)]);

    let outcomes = manager.notify_many(&roster(), "hello").await;

    assert_eq!(outcomes.len(), 3);
    assert!(outcomes.iter().all(|o| o.is_delivered()));
    assert_eq!(sent.lock().unwrap().len(), 3);
}

#[tokio::test]
async fn notify_many_continues_past_failed_recipient() {
    let (channel, sent) = RecordingChannel::new(&["m1"]);
    let manager = NotificationManager::new(vec![Box::new(channel)]);

    let outcomes = manager.notify_many(&roster(), "hello").await;

    let ids: Vec<&str> = outcomes.iter().map(|o| o.member_id.as_str()).collect();
    assert_eq!(ids, vec!["m1", "m2", "m3"]);
    assert!(!outcomes[0].is_delivered());
    assert!(outcomes[1].is_delivered());
    assert!(outcomes[2].is_delivered());

    let delivered: Vec<String> = sent.lock().unwrap().iter().map(|(id, _)| id.clone()).collect();
    assert_eq!(delivered.len(), 2);
    assert!(!delivered.contains(&"m1".to_string()));
}

#[tokio::test]
async fn notify_one_succeeds_if_any_channel_delivers() {
    let (failing, _) = RecordingChannel::new(&["m1"]);
    let (working, sent) = RecordingChannel::new(&[]);
    let manager = NotificationManager::new(vec![Box::new(failing), Box::new(working)]);

    manager
        .notify_one(&Member::new("m1", "Achieng"), "hi")
        .await
        .expect("second channel should deliver");
    assert_eq!(sent.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn notify_one_fails_when_all_channels_fail() {
    let (a, _) = RecordingChannel::new(&["m1"]);
    let (b, _) = RecordingChannel::new(&["m1"]);
    let manager = NotificationManager::new(vec![Box::new(a), Box::new(b)]);

    let err = manager
        .notify_one(&Member::new("m1", "Achieng"), "hi")
        .await
        .unwrap_err();
    assert!(matches!(err, NotifyError::Undelivered { ref member_id, .. } if member_id == "m1"));
}

#[tokio::test]
async fn notify_one_without_channels_is_an_error() {
    let manager = NotificationManager::new(vec![]);
    let err = manager
        .notify_one(&Member::new("m1", "Achieng"), "hi")
        .await
        .unwrap_err();
    assert!(matches!(err, NotifyError::NoChannels));
}

// ── Channel tests ──

#[tokio::test]
async fn log_channel_always_delivers() {
    let channel = LogChannel;
    assert!(channel.send(&Member::new("m1", "Achieng"), "hi").await.is_ok());
}

#[test]
fn log_line_falls_back_when_member_has_no_contact() {
    let mut member = Member::new("m1", "Achieng");
    assert_eq!(
        LogChannel::format_line(&member, "hi"),
        "To: Achieng (no contact): hi"
    );
    member.phone = Some("+254700000001".into());
    assert_eq!(
        LogChannel::format_line(&member, "hi"),
        "To: Achieng (+254700000001): hi"
    );
}

#[tokio::test]
async fn sms_channel_requires_phone_number() {
    let channel = crate::channels::sms::SmsChannel::new("http://127.0.0.1:9/send", "k", None);
    let mut member = Member::new("m1", "Achieng");
    member.npub = Some("npub1xyz".into());

    let err = channel.send(&member, "hi").await.unwrap_err();
    assert!(matches!(err, NotifyError::MissingContact { contact: "phone number", .. }));
}

#[test]
fn webhook_default_body_is_json() {
    let channel = WebhookChannel::new("https://hooks.example.com/chama", None);
    let body = channel.render_body(&Member::new("m1", "Achieng"), "balance 10 KES");
    let value: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(value["member_id"], "m1");
    assert_eq!(value["message"], "balance 10 KES");
}

#[test]
fn webhook_template_substitutes_placeholders() {
    let channel = WebhookChannel::new(
        "https://hooks.example.com/chama",
        Some("{{member_name}}: {{message}}".into()),
    );
    let body = channel.render_body(&Member::new("m1", "Achieng"), "hi");
    assert_eq!(body, "Achieng: hi");
}

// ── Plugin registry tests ──

#[test]
fn registry_default_has_all_builtin_plugins() {
    let registry = ChannelRegistry::default();
    let mut names = registry.plugin_names();
    names.sort();
    assert_eq!(names, vec!["log", "sms", "webhook"]);
}

#[test]
fn registry_unknown_plugin_returns_error() {
    let registry = ChannelRegistry::default();
    let config = serde_json::json!({});
    let err = registry
        .create_channel("nonexistent", &config)
        .err()
        .expect("should return error for unknown plugin");
    assert!(matches!(err, NotifyError::UnknownChannelType(_)));
}

#[test]
fn sms_plugin_validates_config() {
    let registry = ChannelRegistry::default();

    let valid = serde_json::json!({
        "gateway_url": "https://sms.example.com/send",
        "api_key": "test-key"
    });
    assert!(registry.create_channel("sms", &valid).is_ok());

    let invalid = serde_json::json!({ "gateway_url": "https://sms.example.com/send" });
    assert!(registry.create_channel("sms", &invalid).is_err());
}

#[test]
fn webhook_plugin_validates_config() {
    let registry = ChannelRegistry::default();

    let valid = serde_json::json!({ "url": "https://hooks.example.com/webhook" });
    assert!(registry.create_channel("webhook", &valid).is_ok());

    let invalid = serde_json::json!({});
    assert!(registry.create_channel("webhook", &invalid).is_err());
}

#[test]
fn plugin_redacts_secrets_for_logging() {
    let registry = ChannelRegistry::default();
    let plugin = registry.get_plugin("sms").unwrap();
    let redacted = plugin.redact_config(&serde_json::json!({
        "gateway_url": "https://sms.example.com/send",
        "api_key": "test-key"
    }));
    assert_eq!(redacted["api_key"], "***");
}

#[test]
fn registry_builds_manager_in_configured_order() {
    let registry = ChannelRegistry::default();
    let sms = serde_json::json!({
        "gateway_url": "https://sms.example.com/send",
        "api_key": "test-key"
    });
    let log = serde_json::json!({});

    let manager = registry
        .build_manager([("sms", &sms), ("log", &log)])
        .unwrap();
    let names: Vec<&str> = manager.channels().iter().map(|c| c.channel_name()).collect();
    assert_eq!(names, vec!["sms", "log"]);
}

#[test]
fn registry_builds_log_only_manager_without_channels() {
    let manager = ChannelRegistry::default()
        .build_manager(Vec::<(&str, &serde_json::Value)>::new())
        .unwrap();
    assert_eq!(manager.channels().len(), 1);
    assert_eq!(manager.channels()[0].channel_name(), "log");
}

#[test]
fn registry_names_the_channel_that_failed_to_build() {
    let registry = ChannelRegistry::default();
    let log = serde_json::json!({});
    let webhook = serde_json::json!({});

    let err = registry
        .build_manager([("log", &log), ("webhook", &webhook)])
        .err()
        .expect("webhook without url should fail");
    match err {
        NotifyError::ChannelSetup {
            channel_type,
            source,
        } => {
            assert_eq!(channel_type, "webhook");
            assert!(matches!(*source, NotifyError::InvalidConfig(_)));
        }
        other => panic!("unexpected error: {other}"),
    }
}
