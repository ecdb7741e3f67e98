use crate::error::{Result, RuleError};
use crate::Condition;
use async_trait::async_trait;
use chrono::{Datelike, Local, NaiveDateTime, Timelike};

/// Holds when the local wall-clock time matches every specified field.
///
/// Unspecified fields impose no constraint. Matching is at whole-minute
/// granularity: `hour_of_day = 14` holds from 14:00:00 through 14:59:59.
///
/// # Examples
///
/// ```
/// use chama_rules::conditions::TimeWindowCondition;
/// use chrono::NaiveDate;
///
/// // Mondays at 08:30
/// let cond = TimeWindowCondition::new(Some(1), Some(8), Some(30)).unwrap();
/// let monday = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(8, 30, 15).unwrap();
/// assert!(cond.matches(&monday));
/// assert!(TimeWindowCondition::new(None, Some(24), None).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimeWindowCondition {
    /// 0-6, 0 = Sunday
    day_of_week: Option<u32>,
    /// 0-23
    hour_of_day: Option<u32>,
    /// 0-59
    minute_of_hour: Option<u32>,
}

impl TimeWindowCondition {
    pub fn new(
        day_of_week: Option<u32>,
        hour_of_day: Option<u32>,
        minute_of_hour: Option<u32>,
    ) -> Result<Self> {
        check_range("day_of_week", day_of_week, 6)?;
        check_range("hour_of_day", hour_of_day, 23)?;
        check_range("minute_of_hour", minute_of_hour, 59)?;
        Ok(Self {
            day_of_week,
            hour_of_day,
            minute_of_hour,
        })
    }

    pub fn day_of_week(&self) -> Option<u32> {
        self.day_of_week
    }

    pub fn hour_of_day(&self) -> Option<u32> {
        self.hour_of_day
    }

    pub fn minute_of_hour(&self) -> Option<u32> {
        self.minute_of_hour
    }

    /// Pure check against a given local time.
    pub fn matches(&self, at: &NaiveDateTime) -> bool {
        let field_ok = |expected: Option<u32>, actual: u32| expected.map_or(true, |e| e == actual);

        field_ok(self.day_of_week, at.weekday().num_days_from_sunday())
            && field_ok(self.hour_of_day, at.hour())
            && field_ok(self.minute_of_hour, at.minute())
    }
}

fn check_range(field: &'static str, value: Option<u32>, max: u32) -> Result<()> {
    match value {
        Some(v) if v > max => Err(RuleError::InvalidTimeWindow {
            field,
            value: v,
            max,
        }),
        _ => Ok(()),
    }
}

#[async_trait]
impl Condition for TimeWindowCondition {
    fn kind(&self) -> &str {
        "time_window"
    }

    async fn evaluate(&self) -> anyhow::Result<bool> {
        Ok(self.matches(&Local::now().naive_local()))
    }
}
