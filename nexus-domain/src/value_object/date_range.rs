use super::ValueObject;
use crate::error::{DomainError, DomainResult};
use chrono::{DateTime, Datelike, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 时间区间（起止时刻均为 UTC，`start <= end`）
///
/// `contains` 两端闭区间；`overlaps` 为严格重叠，首尾相接不算重叠。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "DateRangeRepr")]
pub struct DateRange {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

#[derive(Deserialize)]
struct DateRangeRepr {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl DateRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> DomainResult<Self> {
        if start > end {
            return Err(DomainError::validation(
                "start date cannot be after end date",
            ));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// 完整天数（不足一天的部分舍去）
    pub fn duration_in_days(&self) -> i64 {
        self.duration().num_days()
    }

    /// 按日历年月差计算，忽略日
    pub fn duration_in_months(&self) -> i32 {
        let years = self.end.year() - self.start.year();
        let months = self.end.month() as i32 - self.start.month() as i32;
        years * 12 + months
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant <= self.end
    }

    pub fn overlaps(&self, other: &DateRange) -> bool {
        self.start < other.end && self.end > other.start
    }
}

impl ValueObject for DateRange {
    fn validate(&self) -> DomainResult<()> {
        DateRange::new(self.start, self.end).map(|_| ())
    }
}

/// `YYYY-MM-DD to YYYY-MM-DD`
impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} to {}",
            self.start.format("%Y-%m-%d"),
            self.end.format("%Y-%m-%d")
        )
    }
}

impl TryFrom<DateRangeRepr> for DateRange {
    type Error = DomainError;

    fn try_from(value: DateRangeRepr) -> Result<Self, Self::Error> {
        Self::new(value.start, value.end)
    }
}
