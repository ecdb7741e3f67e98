pub mod always_true;
pub mod composite;
pub mod time_window;

pub use always_true::AlwaysTrue;
pub use composite::{CompositeCondition, LogicalOperator};
pub use time_window::TimeWindowCondition;
