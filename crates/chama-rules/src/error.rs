/// Errors raised while building rules, conditions or schedules.
///
/// Execution-time faults never use this type: they are absorbed by the
/// engine and only logged.
///
/// # Examples
///
/// ```rust
/// use chama_rules::error::RuleError;
///
/// let err = RuleError::InvalidTimeWindow { field: "hour_of_day", value: 24, max: 23 };
/// assert!(err.to_string().contains("hour_of_day"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleError {
    /// A schedule interval must be strictly positive.
    #[error("Rule: schedule interval must be greater than zero")]
    InvalidInterval,

    /// A schedule interval is below one millisecond or above the maximum.
    #[error("Rule: schedule interval {interval:?} must be between {min:?} and {max:?}")]
    IntervalOutOfRange {
        interval: std::time::Duration,
        min: std::time::Duration,
        max: std::time::Duration,
    },

    /// A time-window field is outside its allowed range.
    #[error("Rule: {field} must be between 0 and {max}, got {value}")]
    InvalidTimeWindow {
        field: &'static str,
        value: u32,
        max: u32,
    },

    /// The composite operator is not `and` / `or`.
    #[error("Rule: unknown logical operator '{0}'")]
    UnknownOperator(String),

    /// Rule configuration is missing a required field or is inconsistent.
    #[error("Rule: invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Convenience `Result` alias for rule construction.
pub type Result<T> = std::result::Result<T, RuleError>;
