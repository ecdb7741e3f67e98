use crate::rule::{Rule, RuleSnapshot, Schedule};
use anyhow::Context;
use chrono::Utc;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Why an execution stopped before running the rule's action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    UnknownRule,
    Inactive,
    /// A timer tick whose timer was cancelled or replaced after it fired.
    TimerCancelled,
    /// The rule was redefined under the same id while its condition ran.
    Replaced,
}

/// Result of one execution attempt. Never an error: faults inside a rule are
/// absorbed and reported as [`ExecutionOutcome::Failed`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionOutcome {
    Skipped(SkipReason),
    ConditionFalse,
    Completed,
    Failed(String),
}

impl ExecutionOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, ExecutionOutcome::Completed)
    }
}

struct ScheduledTask {
    handle: JoinHandle<()>,
    generation: u64,
}

#[derive(Default)]
struct EngineState {
    rules: HashMap<String, Rule>,
    timers: HashMap<String, ScheduledTask>,
    running: bool,
    generation: u64,
}

/// The only place that decides whether a rule should have a live timer.
fn should_schedule(running: bool, rule: &Rule) -> bool {
    running && rule.is_active && rule.schedule.is_some()
}

impl EngineState {
    fn cancel_timer(&mut self, id: &str) -> bool {
        match self.timers.remove(id) {
            Some(task) => {
                task.handle.abort();
                tracing::debug!(rule_id = id, "Rule timer cancelled");
                true
            }
            None => false,
        }
    }

    /// Cancel any timer for `id`, then install a fresh one if the rule should
    /// be ticking. Every path that starts a timer goes through here.
    fn reconcile(&mut self, id: &str, engine: &Weak<EngineInner>) {
        self.cancel_timer(id);

        let interval = match self.rules.get(id) {
            Some(rule) if should_schedule(self.running, rule) => {
                rule.schedule.as_ref().map(Schedule::interval)
            }
            _ => None,
        };
        let Some(interval) = interval else {
            return;
        };

        self.generation += 1;
        let generation = self.generation;
        let handle = spawn_timer(engine.clone(), id.to_string(), interval, generation);
        self.timers
            .insert(id.to_string(), ScheduledTask { handle, generation });
        tracing::debug!(
            rule_id = id,
            interval_secs = interval.as_secs_f64(),
            "Rule timer scheduled"
        );
    }

    /// Look up a rule that may run now. Ticks must also belong to the live
    /// timer generation.
    fn admit(&self, id: &str, generation: Option<u64>) -> Result<&Rule, SkipReason> {
        if let Some(generation) = generation {
            let current = self.timers.get(id).map(|t| t.generation);
            if current != Some(generation) {
                return Err(SkipReason::TimerCancelled);
            }
        }
        let rule = self.rules.get(id).ok_or(SkipReason::UnknownRule)?;
        if !rule.is_active {
            return Err(SkipReason::Inactive);
        }
        Ok(rule)
    }

    fn cancel_all(&mut self) -> usize {
        let count = self.timers.len();
        for (_, task) in self.timers.drain() {
            task.handle.abort();
        }
        count
    }
}

struct EngineInner {
    state: Mutex<EngineState>,
}

impl EngineInner {
    fn lock(&self) -> MutexGuard<'_, EngineState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Shared by manual execution and timer ticks. `generation` is set for
    /// ticks and must still match the live timer for the rule to run.
    ///
    /// The rule is admitted twice: before its condition is evaluated and
    /// again before its action starts. The action only runs if the same
    /// definition is still registered and active at that point.
    async fn execute(&self, id: &str, generation: Option<u64>) -> ExecutionOutcome {
        let (name, condition, action) = {
            let state = self.lock();
            let rule = match state.admit(id, generation) {
                Ok(rule) => rule,
                Err(reason) => return ExecutionOutcome::Skipped(reason),
            };
            (
                rule.name.clone(),
                rule.condition.clone(),
                rule.action.clone(),
            )
        };

        let evaluated = isolated(async move {
            condition
                .evaluate()
                .await
                .with_context(|| format!("{} condition evaluation failed", condition.kind()))
        })
        .await;
        match evaluated {
            Ok(Ok(true)) => {}
            Ok(Ok(false)) => {
                tracing::debug!(rule_id = id, rule_name = %name, "Rule condition not met");
                return ExecutionOutcome::ConditionFalse;
            }
            Ok(Err(e)) => return failed(id, &name, format!("{e:#}")),
            Err(reason) => return failed(id, &name, reason),
        }

        {
            let state = self.lock();
            let readmitted = state.admit(id, generation).and_then(|rule| {
                if Arc::ptr_eq(&rule.action, &action) {
                    Ok(())
                } else {
                    Err(SkipReason::Replaced)
                }
            });
            if let Err(reason) = readmitted {
                tracing::info!(
                    rule_id = id,
                    rule_name = %name,
                    reason = ?reason,
                    "Rule changed during condition evaluation, action withheld"
                );
                return ExecutionOutcome::Skipped(reason);
            }
        }

        let task_action = action.clone();
        let acted = isolated(async move {
            task_action
                .execute()
                .await
                .with_context(|| format!("{} action failed", task_action.kind()))
        })
        .await;
        match acted {
            Ok(Ok(())) => {
                self.record_execution(id, &action);
                tracing::info!(rule_id = id, rule_name = %name, "Rule executed");
                ExecutionOutcome::Completed
            }
            Ok(Err(e)) => failed(id, &name, format!("{e:#}")),
            Err(reason) => failed(id, &name, reason),
        }
    }

    /// Stamp `last_executed`, unless the rule was removed or redefined while
    /// the action was running.
    fn record_execution(&self, id: &str, action: &Arc<dyn crate::Action>) {
        let mut state = self.lock();
        if let Some(rule) = state.rules.get_mut(id) {
            if Arc::ptr_eq(&rule.action, action) {
                let now = Utc::now();
                rule.last_executed = Some(rule.last_executed.map_or(now, |prev| prev.max(now)));
            }
        }
    }
}

impl Drop for EngineInner {
    fn drop(&mut self) {
        let state = self
            .state
            .get_mut()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        state.cancel_all();
    }
}

/// Run `fut` on its own task so a panic inside a condition or action is
/// reported instead of unwinding into the engine.
async fn isolated<F>(fut: F) -> std::result::Result<F::Output, String>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    tokio::spawn(fut).await.map_err(|e| {
        if e.is_panic() {
            "rule execution panicked".to_string()
        } else {
            "rule execution was cancelled".to_string()
        }
    })
}

fn failed(id: &str, name: &str, reason: String) -> ExecutionOutcome {
    tracing::error!(rule_id = id, rule_name = %name, error = %reason, "Rule execution failed");
    ExecutionOutcome::Failed(reason)
}

fn spawn_timer(
    engine: Weak<EngineInner>,
    id: String,
    interval: Duration,
    generation: u64,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut tick = interval_at(Instant::now() + interval, interval);
        tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tick.tick().await;
            let Some(inner) = engine.upgrade() else {
                break;
            };
            let id = id.clone();
            tokio::spawn(async move {
                inner.execute(&id, Some(generation)).await;
            });
        }
    })
}

/// Registry of rules plus one recurring timer per scheduled rule.
///
/// Cloning is cheap and every clone drives the same engine. Timers only run
/// between [`RuleEngine::start_scheduled_rules`] and
/// [`RuleEngine::stop_scheduled_rules`]; dropping the last handle cancels
/// them all. Calls that may start a timer must be made inside a Tokio
/// runtime.
///
/// # Examples
///
/// ```rust
/// use chama_rules::conditions::AlwaysTrue;
/// use chama_rules::engine::{ExecutionOutcome, RuleEngine};
/// use chama_rules::rule::Rule;
/// use chama_rules::Action;
/// use std::sync::Arc;
///
/// struct Noop;
///
/// #[async_trait::async_trait]
/// impl Action for Noop {
///     fn kind(&self) -> &str { "noop" }
///     async fn execute(&self) -> anyhow::Result<()> { Ok(()) }
/// }
///
/// # #[tokio::main]
/// # async fn main() {
/// let engine = RuleEngine::new();
/// let id = engine.add_rule(Rule::new("noop", Arc::new(AlwaysTrue), Arc::new(Noop)));
/// assert_eq!(engine.execute_rule(&id).await, ExecutionOutcome::Completed);
/// assert!(engine.get_rule(&id).unwrap().last_executed.is_some());
/// # }
/// ```
#[derive(Clone)]
pub struct RuleEngine {
    inner: Arc<EngineInner>,
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleEngine {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(EngineInner {
                state: Mutex::new(EngineState::default()),
            }),
        }
    }

    /// Register `rule`, replacing any rule with the same id. Returns the id.
    pub fn add_rule(&self, rule: Rule) -> String {
        let id = rule.id().to_string();
        let weak = Arc::downgrade(&self.inner);
        let mut state = self.inner.lock();
        let replaced = state.rules.insert(id.clone(), rule).is_some();
        state.reconcile(&id, &weak);
        tracing::info!(
            rule_id = %id,
            replaced,
            scheduled = state.timers.contains_key(&id),
            "Rule registered"
        );
        id
    }

    /// Cancel the rule's timer and delete it. Returns whether it existed.
    pub fn remove_rule(&self, id: &str) -> bool {
        let mut state = self.inner.lock();
        state.cancel_timer(id);
        let removed = state.rules.remove(id).is_some();
        if removed {
            tracing::info!(rule_id = id, "Rule removed");
        }
        removed
    }

    /// Returns false for an unknown id.
    pub fn enable_rule(&self, id: &str) -> bool {
        self.set_active(id, true)
    }

    /// Returns false for an unknown id.
    pub fn disable_rule(&self, id: &str) -> bool {
        self.set_active(id, false)
    }

    fn set_active(&self, id: &str, is_active: bool) -> bool {
        let weak = Arc::downgrade(&self.inner);
        let mut state = self.inner.lock();
        let Some(rule) = state.rules.get_mut(id) else {
            return false;
        };
        rule.is_active = is_active;
        rule.touch();
        state.reconcile(id, &weak);
        tracing::info!(rule_id = id, is_active, "Rule activity changed");
        true
    }

    /// Replace or clear a rule's schedule. Returns false for an unknown id.
    pub fn set_schedule(&self, id: &str, schedule: Option<Schedule>) -> bool {
        let weak = Arc::downgrade(&self.inner);
        let mut state = self.inner.lock();
        let Some(rule) = state.rules.get_mut(id) else {
            return false;
        };
        rule.schedule = schedule;
        rule.touch();
        state.reconcile(id, &weak);
        true
    }

    /// Run the rule once now, regardless of whether the engine is running.
    pub async fn execute_rule(&self, id: &str) -> ExecutionOutcome {
        self.inner.execute(id, None).await
    }

    /// Start a timer for every active scheduled rule. No-op when running.
    pub fn start_scheduled_rules(&self) {
        let weak = Arc::downgrade(&self.inner);
        let mut state = self.inner.lock();
        if state.running {
            tracing::debug!("Rule engine already running");
            return;
        }
        state.running = true;

        let ids: Vec<String> = state.rules.keys().cloned().collect();
        for id in &ids {
            state.reconcile(id, &weak);
        }
        tracing::info!(
            rules = ids.len(),
            scheduled = state.timers.len(),
            "Rule engine started"
        );
    }

    /// Cancel every timer. Rule definitions and activity flags are untouched.
    pub fn stop_scheduled_rules(&self) {
        let mut state = self.inner.lock();
        let was_running = std::mem::replace(&mut state.running, false);
        let cancelled = state.cancel_all();
        if was_running || cancelled > 0 {
            tracing::info!(cancelled, "Rule engine stopped");
        }
    }

    pub fn get_rule(&self, id: &str) -> Option<RuleSnapshot> {
        let state = self.inner.lock();
        state
            .rules
            .get(id)
            .map(|rule| rule.snapshot(state.timers.contains_key(id)))
    }

    /// All rules, oldest first.
    pub fn list_rules(&self) -> Vec<RuleSnapshot> {
        let state = self.inner.lock();
        let mut rules: Vec<RuleSnapshot> = state
            .rules
            .values()
            .map(|rule| rule.snapshot(state.timers.contains_key(rule.id())))
            .collect();
        rules.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        rules
    }

    pub fn is_running(&self) -> bool {
        self.inner.lock().running
    }

    pub fn is_scheduled(&self, id: &str) -> bool {
        self.inner.lock().timers.contains_key(id)
    }

    pub fn live_timer_count(&self) -> usize {
        self.inner.lock().timers.len()
    }

    #[cfg(test)]
    pub(crate) fn timer_generation(&self, id: &str) -> Option<u64> {
        self.inner.lock().timers.get(id).map(|t| t.generation)
    }

    /// Deliver a timer tick stamped with `generation`, as the timer task would.
    #[cfg(test)]
    pub(crate) async fn deliver_tick(&self, id: &str, generation: u64) -> ExecutionOutcome {
        self.inner.execute(id, Some(generation)).await
    }

    pub fn len(&self) -> usize {
        self.inner.lock().rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().rules.is_empty()
    }
}
