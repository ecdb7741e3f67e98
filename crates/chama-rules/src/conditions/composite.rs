use crate::error::RuleError;
use crate::Condition;
use async_trait::async_trait;
use std::str::FromStr;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogicalOperator {
    #[default]
    And,
    Or,
}

impl FromStr for LogicalOperator {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "and" | "all" => Ok(Self::And),
            "or" | "any" => Ok(Self::Or),
            _ => Err(RuleError::UnknownOperator(s.to_string())),
        }
    }
}

impl std::fmt::Display for LogicalOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::And => write!(f, "AND"),
            Self::Or => write!(f, "OR"),
        }
    }
}

/// Combines sub-conditions with AND / OR.
///
/// All sub-conditions are evaluated concurrently, then reduced. An empty
/// list holds under either operator. If any sub-condition fails to
/// evaluate, the composite fails too.
pub struct CompositeCondition {
    conditions: Vec<Arc<dyn Condition>>,
    operator: LogicalOperator,
}

impl CompositeCondition {
    pub fn new(conditions: Vec<Arc<dyn Condition>>, operator: LogicalOperator) -> Self {
        Self {
            conditions,
            operator,
        }
    }

    pub fn all(conditions: Vec<Arc<dyn Condition>>) -> Self {
        Self::new(conditions, LogicalOperator::And)
    }

    pub fn any(conditions: Vec<Arc<dyn Condition>>) -> Self {
        Self::new(conditions, LogicalOperator::Or)
    }

    pub fn operator(&self) -> LogicalOperator {
        self.operator
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }
}

#[async_trait]
impl Condition for CompositeCondition {
    fn kind(&self) -> &str {
        "composite"
    }

    async fn evaluate(&self) -> anyhow::Result<bool> {
        if self.conditions.is_empty() {
            return Ok(true);
        }

        let results = futures::future::join_all(self.conditions.iter().map(|c| c.evaluate())).await;
        let results = results.into_iter().collect::<anyhow::Result<Vec<bool>>>()?;

        Ok(match self.operator {
            LogicalOperator::And => results.iter().all(|r| *r),
            LogicalOperator::Or => results.iter().any(|r| *r),
        })
    }
}
