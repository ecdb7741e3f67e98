//! Rule engine pairing conditions with actions.
//!
//! A [`rule::Rule`] binds one [`Condition`] to one [`Action`], an activity
//! flag and an optional fixed-interval [`rule::Schedule`]. The
//! [`engine::RuleEngine`] owns the registry, runs rules on demand, and keeps
//! one recurring timer per active scheduled rule while it is running.
//! Built-in conditions are always-true, time-window and AND/OR composite;
//! the built-in action notifies chama members of their wallet balance.

pub mod actions;
pub mod conditions;
pub mod engine;
pub mod error;
pub mod factory;
pub mod rule;


use async_trait::async_trait;

/// A predicate deciding whether a rule's action should run.
///
/// Implementations must be side-effect free and safe to evaluate
/// concurrently; the engine may evaluate the same condition from a manual
/// trigger and a timer tick at the same time.
#[async_trait]
pub trait Condition: Send + Sync {
    /// Short type name used in log fields (e.g., `"time_window"`).
    fn kind(&self) -> &str;

    /// Evaluates the predicate against the current moment.
    ///
    /// # Errors
    ///
    /// An error means the predicate could not be decided; the engine logs it
    /// and skips the action for this execution.
    async fn evaluate(&self) -> anyhow::Result<bool>;
}

/// The effect a rule performs when its condition holds.
///
/// Expected, recoverable misses (a wallet that no longer exists, an empty
/// roster) should be logged and reported as success. Return an error only
/// for faults; the engine absorbs it and does not record the execution.
#[async_trait]
pub trait Action: Send + Sync {
    /// Short type name used in log fields (e.g., `"wallet_balance"`).
    fn kind(&self) -> &str;

    async fn execute(&self) -> anyhow::Result<()>;
}
