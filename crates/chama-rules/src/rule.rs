use crate::error::{Result, RuleError};
use crate::{Action, Condition};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::sync::Arc;
use std::time::Duration;

// ---------------------------------------------------------------------------
// Schedule
// ---------------------------------------------------------------------------

/// Shortest accepted interval. Intervals are persisted in whole milliseconds.
pub const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Longest accepted interval (366 days).
pub const MAX_INTERVAL: Duration = Duration::from_secs(366 * 24 * 60 * 60);

fn validate_interval(interval: Duration) -> Result<()> {
    if interval.is_zero() {
        return Err(RuleError::InvalidInterval);
    }
    if interval < MIN_INTERVAL || interval > MAX_INTERVAL {
        return Err(RuleError::IntervalOutOfRange {
            interval,
            min: MIN_INTERVAL,
            max: MAX_INTERVAL,
        });
    }
    Ok(())
}

/// Fixed-interval recurrence, counted from the moment the rule is scheduled.
///
/// `start_time` and `end_time` are descriptive: they are carried with the
/// rule but do not gate firing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    #[serde(
        rename = "interval_ms",
        serialize_with = "serialize_duration_ms",
        deserialize_with = "deserialize_duration_ms"
    )]
    interval: Duration,
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
}

impl Schedule {
    /// # Errors
    ///
    /// Returns [`RuleError::InvalidInterval`] for a zero interval and
    /// [`RuleError::IntervalOutOfRange`] outside [`MIN_INTERVAL`]..=[`MAX_INTERVAL`].
    pub fn every(interval: Duration) -> Result<Self> {
        validate_interval(interval)?;
        Ok(Self {
            interval,
            start_time: None,
            end_time: None,
        })
    }

    pub fn hourly() -> Self {
        Self {
            interval: Duration::from_secs(60 * 60),
            start_time: None,
            end_time: None,
        }
    }

    pub fn with_window(
        mut self,
        start_time: Option<DateTime<Utc>>,
        end_time: Option<DateTime<Utc>>,
    ) -> Self {
        self.start_time = start_time;
        self.end_time = end_time;
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

// ---------------------------------------------------------------------------
// Rule
// ---------------------------------------------------------------------------

/// A named binding of one condition to one action.
///
/// Once registered, a rule is owned by the engine; only the engine mutates
/// `is_active`, `schedule` and the timestamps.
#[derive(Clone)]
pub struct Rule {
    id: String,
    pub name: String,
    pub description: Option<String>,
    pub(crate) condition: Arc<dyn Condition>,
    pub(crate) action: Arc<dyn Action>,
    pub(crate) is_active: bool,
    pub(crate) schedule: Option<Schedule>,
    created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
    pub(crate) last_executed: Option<DateTime<Utc>>,
}

impl Rule {
    /// Create an active, manual-trigger-only rule with a fresh id.
    pub fn new(
        name: impl Into<String>,
        condition: Arc<dyn Condition>,
        action: Arc<dyn Action>,
    ) -> Self {
        Self::with_id(chama_common::id::next_id(), name, condition, action)
    }

    /// Like [`Rule::new`] but with a caller-chosen id. Registering a rule
    /// whose id is already present replaces the earlier definition.
    pub fn with_id(
        id: impl Into<String>,
        name: impl Into<String>,
        condition: Arc<dyn Condition>,
        action: Arc<dyn Action>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            condition,
            action,
            is_active: true,
            schedule: None,
            created_at: now,
            updated_at: now,
            last_executed: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_schedule(mut self, schedule: Schedule) -> Self {
        self.schedule = Some(schedule);
        self
    }

    pub fn active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn schedule(&self) -> Option<&Schedule> {
        self.schedule.as_ref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn last_executed(&self) -> Option<DateTime<Utc>> {
        self.last_executed
    }

    pub fn condition(&self) -> &Arc<dyn Condition> {
        &self.condition
    }

    pub fn action(&self) -> &Arc<dyn Action> {
        &self.action
    }

    pub(crate) fn touch(&mut self) {
        self.updated_at = Utc::now().max(self.updated_at);
    }

    pub(crate) fn snapshot(&self, scheduled: bool) -> RuleSnapshot {
        RuleSnapshot {
            id: self.id.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            condition_kind: self.condition.kind().to_string(),
            action_kind: self.action.kind().to_string(),
            is_active: self.is_active,
            schedule: self.schedule.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
            last_executed: self.last_executed,
            scheduled,
        }
    }
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("condition", &self.condition.kind())
            .field("action", &self.action.kind())
            .field("is_active", &self.is_active)
            .field("schedule", &self.schedule)
            .field("last_executed", &self.last_executed)
            .finish()
    }
}

/// Read-only view of a registered rule.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleSnapshot {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub condition_kind: String,
    pub action_kind: String,
    pub is_active: bool,
    pub schedule: Option<Schedule>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_executed: Option<DateTime<Utc>>,
    /// Whether a live timer currently exists for this rule.
    pub scheduled: bool,
}

// ---------------------------------------------------------------------------
// Serde helpers for Duration (serialized as milliseconds: u64)
// ---------------------------------------------------------------------------

fn serialize_duration_ms<S>(d: &Duration, s: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    s.serialize_u64(d.as_millis() as u64)
}

fn deserialize_duration_ms<'de, D>(d: D) -> std::result::Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let interval = Duration::from_millis(u64::deserialize(d)?);
    validate_interval(interval).map_err(serde::de::Error::custom)?;
    Ok(interval)
}
