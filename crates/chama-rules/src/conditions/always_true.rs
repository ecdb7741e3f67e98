use crate::Condition;
use async_trait::async_trait;

/// Holds unconditionally. Used for rules gated only by their schedule.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysTrue;

#[async_trait]
impl Condition for AlwaysTrue {
    fn kind(&self) -> &str {
        "always_true"
    }

    async fn evaluate(&self) -> anyhow::Result<bool> {
        Ok(true)
    }
}
