use super::{Money, ValueObject};
use crate::error::{DomainError, DomainResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 百分比，取值范围 `[0, 100]`
///
/// 加减运算结果同样需要落在范围内，越界时返回错误而不是截断。
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Percentage(f64);

impl Percentage {
    pub fn new(value: f64) -> DomainResult<Self> {
        if !(0.0..=100.0).contains(&value) {
            return Err(DomainError::out_of_range(format!(
                "percentage must be between 0 and 100, got {value}"
            )));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    /// 小数形式，例如 `12.5%` -> `0.125`
    pub fn decimal(&self) -> f64 {
        self.0 / 100.0
    }

    pub fn add(&self, other: &Percentage) -> DomainResult<Percentage> {
        Self::new(self.0 + other.0)
    }

    pub fn subtract(&self, other: &Percentage) -> DomainResult<Percentage> {
        Self::new(self.0 - other.0)
    }

    /// 计算金额的百分比部分（向零截断到分）
    ///
    /// 先乘后除，整数百分比作用于整数分时没有舍入误差。
    pub fn apply_to(&self, money: &Money) -> Money {
        let cents = (money.cents() as f64 * self.0 / 100.0).trunc();
        money.with_amount(cents as i64)
    }
}

impl ValueObject for Percentage {
    fn validate(&self) -> DomainResult<()> {
        Percentage::new(self.0).map(|_| ())
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}%", self.0)
    }
}

impl TryFrom<f64> for Percentage {
    type Error = DomainError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Percentage> for f64 {
    fn from(value: Percentage) -> Self {
        value.0
    }
}
