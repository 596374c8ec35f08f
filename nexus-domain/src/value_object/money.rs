use super::ValueObject;
use crate::error::{DomainError, DomainResult};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// 货币金额
///
/// 以最小货币单位（分）的整数存储，附带大写的三位货币代码。
/// 两个金额之间的加减与比较要求币种一致，否则返回 `CurrencyMismatch`；
/// 与标量的乘除总是按“向零截断”得到新的金额，除数为零时返回 `DivisionByZero`。
///
/// ```
/// use nexus_domain::value_object::Money;
///
/// let a = Money::from_major(10.00, "BRL").unwrap();
/// let b = Money::from_major(5.00, "brl").unwrap();
/// assert_eq!(a.add(&b).unwrap().cents(), 1500);
///
/// let usd = Money::from_major(5.00, "USD").unwrap();
/// assert!(a.add(&usd).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "MoneyRepr")]
pub struct Money {
    amount: i64,
    currency: String,
}

#[derive(Deserialize)]
struct MoneyRepr {
    amount: i64,
    currency: String,
}

fn normalize_currency(currency: &str) -> DomainResult<String> {
    let code = currency.trim().to_uppercase();
    if code.len() != 3 || !code.bytes().all(|b| b.is_ascii_uppercase()) {
        return Err(DomainError::validation(format!(
            "invalid currency code: {currency}"
        )));
    }
    Ok(code)
}

impl Money {
    /// 以最小货币单位创建
    pub fn from_cents(cents: i64, currency: &str) -> DomainResult<Self> {
        Ok(Self {
            amount: cents,
            currency: normalize_currency(currency)?,
        })
    }

    /// 以主货币单位创建（四舍五入到分）
    pub fn from_major(amount: f64, currency: &str) -> DomainResult<Self> {
        let cents = (amount * 100.0).round();
        if !cents.is_finite() || cents < i64::MIN as f64 || cents > i64::MAX as f64 {
            return Err(DomainError::out_of_range(format!(
                "amount not representable: {amount}"
            )));
        }
        Self::from_cents(cents as i64, currency)
    }

    pub fn zero(currency: &str) -> DomainResult<Self> {
        Self::from_cents(0, currency)
    }

    /// 主货币单位金额
    pub fn amount(&self) -> f64 {
        self.amount as f64 / 100.0
    }

    pub fn cents(&self) -> i64 {
        self.amount
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    fn ensure_same_currency(&self, other: &Money) -> DomainResult<()> {
        if self.currency != other.currency {
            return Err(DomainError::CurrencyMismatch {
                left: self.currency.clone(),
                right: other.currency.clone(),
            });
        }
        Ok(())
    }

    pub(super) fn with_amount(&self, amount: i64) -> Self {
        Self {
            amount,
            currency: self.currency.clone(),
        }
    }

    pub fn add(&self, other: &Money) -> DomainResult<Money> {
        self.ensure_same_currency(other)?;
        let amount = self
            .amount
            .checked_add(other.amount)
            .ok_or_else(|| DomainError::out_of_range("money addition overflow"))?;
        Ok(self.with_amount(amount))
    }

    pub fn subtract(&self, other: &Money) -> DomainResult<Money> {
        self.ensure_same_currency(other)?;
        let amount = self
            .amount
            .checked_sub(other.amount)
            .ok_or_else(|| DomainError::out_of_range("money subtraction overflow"))?;
        Ok(self.with_amount(amount))
    }

    /// 乘以标量，结果向零截断
    ///
    /// 与 [`add`](Self::add) 不同，这里不报告溢出：超出 `i64` 的结果饱和到边界值，
    /// `NaN` 因子得到零。需要检查时使用 [`divide`](Self::divide) 或先校验因子。
    pub fn multiply(&self, factor: f64) -> Money {
        self.with_amount((self.amount as f64 * factor) as i64)
    }

    /// 除以标量，结果向零截断
    ///
    /// 除数为 `NaN` 或结果超出 `i64` 范围时返回 `OutOfRange`。
    pub fn divide(&self, divisor: f64) -> DomainResult<Money> {
        if divisor == 0.0 {
            return Err(DomainError::DivisionByZero);
        }
        let amount = (self.amount as f64 / divisor).trunc();
        if !amount.is_finite() || amount < i64::MIN as f64 || amount >= i64::MAX as f64 {
            return Err(DomainError::out_of_range(format!(
                "money division not representable: {self} / {divisor}"
            )));
        }
        Ok(self.with_amount(amount as i64))
    }

    /// 同币种比较
    pub fn compare(&self, other: &Money) -> DomainResult<Ordering> {
        self.ensure_same_currency(other)?;
        Ok(self.amount.cmp(&other.amount))
    }

    pub fn greater_than(&self, other: &Money) -> DomainResult<bool> {
        Ok(self.compare(other)? == Ordering::Greater)
    }

    pub fn less_than(&self, other: &Money) -> DomainResult<bool> {
        Ok(self.compare(other)? == Ordering::Less)
    }

    pub fn is_positive(&self) -> bool {
        self.amount > 0
    }

    pub fn is_negative(&self) -> bool {
        self.amount < 0
    }

    pub fn is_zero(&self) -> bool {
        self.amount == 0
    }

    /// 本地化展示：BRL `R$ 1.234,56`，USD `$1,234.56`，EUR `€ 1.234,56`，其余同 `Display`
    pub fn formatted(&self) -> String {
        let sign = if self.amount < 0 { "-" } else { "" };
        let abs = self.amount.unsigned_abs();
        let (units, cents) = (abs / 100, abs % 100);
        match self.currency.as_str() {
            "BRL" => format!("{sign}R$ {},{cents:02}", group_thousands(units, '.')),
            "EUR" => format!("{sign}€ {},{cents:02}", group_thousands(units, '.')),
            "USD" => format!("{sign}${}.{cents:02}", group_thousands(units, ',')),
            _ => self.to_string(),
        }
    }
}

fn group_thousands(mut units: u64, separator: char) -> String {
    let mut groups = Vec::new();
    loop {
        if units < 1000 {
            groups.push(units.to_string());
            break;
        }
        groups.push(format!("{:03}", units % 1000));
        units /= 1000;
    }
    groups.reverse();
    groups.join(&separator.to_string())
}

impl ValueObject for Money {
    fn validate(&self) -> DomainResult<()> {
        normalize_currency(&self.currency).map(|_| ())
    }
}

/// `10.00 BRL`
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.amount < 0 { "-" } else { "" };
        let abs = self.amount.unsigned_abs();
        write!(f, "{sign}{}.{:02} {}", abs / 100, abs % 100, self.currency)
    }
}

impl TryFrom<MoneyRepr> for Money {
    type Error = DomainError;

    fn try_from(value: MoneyRepr) -> Result<Self, Self::Error> {
        Self::from_cents(value.amount, &value.currency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn brl(major: f64) -> Money {
        Money::from_major(major, "BRL").unwrap()
    }

    #[test]
    fn add_same_currency() {
        let total = brl(10.00).add(&brl(5.00)).unwrap();
        assert_eq!(total.cents(), 1500);
        assert_eq!(total.currency(), "BRL");
    }

    #[test]
    fn add_different_currency_fails() {
        let usd = Money::from_major(5.00, "USD").unwrap();
        let err = brl(10.00).add(&usd).unwrap_err();
        match err {
            DomainError::CurrencyMismatch { left, right } => {
                assert_eq!(left, "BRL");
                assert_eq!(right, "USD");
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(brl(10.00).subtract(&usd).is_err());
        assert!(brl(10.00).greater_than(&usd).is_err());
        assert!(brl(10.00).less_than(&usd).is_err());
    }

    #[test]
    fn multiply_and_divide_truncate_toward_zero() {
        let m = Money::from_cents(1001, "BRL").unwrap();
        assert_eq!(m.multiply(0.5).cents(), 500);
        assert_eq!(m.divide(3.0).unwrap().cents(), 333);

        let neg = Money::from_cents(-1001, "BRL").unwrap();
        assert_eq!(neg.multiply(0.5).cents(), -500);
        assert_eq!(neg.divide(3.0).unwrap().cents(), -333);
    }

    #[test]
    fn multiply_saturates_while_divide_reports_overflow() {
        let max = Money::from_cents(i64::MAX, "BRL").unwrap();
        assert_eq!(max.multiply(2.0).cents(), i64::MAX);
        assert_eq!(brl(10.0).multiply(f64::NAN).cents(), 0);

        assert!(matches!(
            max.divide(0.5),
            Err(DomainError::OutOfRange { .. })
        ));
        assert!(matches!(
            brl(10.0).divide(f64::NAN),
            Err(DomainError::OutOfRange { .. })
        ));
        assert_eq!(brl(10.0).divide(f64::INFINITY).unwrap().cents(), 0);
    }

    #[test]
    fn divide_by_zero_is_signaled() {
        let err = brl(10.0).divide(0.0).unwrap_err();
        assert!(matches!(err, DomainError::DivisionByZero));
    }

    #[test]
    fn comparisons_and_predicates() {
        assert!(brl(10.0).greater_than(&brl(5.0)).unwrap());
        assert!(brl(5.0).less_than(&brl(10.0)).unwrap());
        assert_eq!(brl(5.0).compare(&brl(5.0)).unwrap(), Ordering::Equal);
        assert!(brl(1.0).is_positive());
        assert!(brl(-1.0).is_negative());
        assert!(Money::zero("BRL").unwrap().is_zero());
        assert_ne!(brl(5.0), Money::from_major(5.0, "USD").unwrap());
    }

    #[test]
    fn from_major_rounds_to_cents() {
        assert_eq!(brl(10.01).cents(), 1001);
        assert_eq!(brl(0.29).cents(), 29);
        assert!(Money::from_major(f64::NAN, "BRL").is_err());
        assert!(Money::from_major(f64::INFINITY, "BRL").is_err());
    }

    #[test]
    fn rejects_malformed_currency_codes() {
        assert!(Money::from_cents(1, "").is_err());
        assert!(Money::from_cents(1, "REAL").is_err());
        assert!(Money::from_cents(1, "R$").is_err());
        assert_eq!(Money::from_cents(1, " usd ").unwrap().currency(), "USD");
    }

    #[test]
    fn overflow_is_out_of_range() {
        let max = Money::from_cents(i64::MAX, "BRL").unwrap();
        let one = Money::from_cents(1, "BRL").unwrap();
        assert!(matches!(max.add(&one), Err(DomainError::OutOfRange { .. })));
    }

    #[test]
    fn display_and_localized_formats() {
        assert_eq!(brl(10.0).to_string(), "10.00 BRL");
        assert_eq!(Money::from_cents(-5, "BRL").unwrap().to_string(), "-0.05 BRL");
        assert_eq!(Money::from_cents(123456, "BRL").unwrap().formatted(), "R$ 1.234,56");
        assert_eq!(Money::from_cents(123456789, "USD").unwrap().formatted(), "$1,234,567.89");
        assert_eq!(Money::from_cents(-1050, "EUR").unwrap().formatted(), "-€ 10,50");
        assert_eq!(Money::from_cents(1050, "JPY").unwrap().formatted(), "10.50 JPY");
    }

    #[test]
    fn serde_round_trip_revalidates() {
        let m = brl(12.34);
        let json = serde_json::to_string(&m).unwrap();
        assert_eq!(json, r#"{"amount":1234,"currency":"BRL"}"#);
        assert_eq!(serde_json::from_str::<Money>(&json).unwrap(), m);
        assert!(serde_json::from_str::<Money>(r#"{"amount":1,"currency":"XX"}"#).is_err());
    }

    proptest! {
        #[test]
        fn add_then_subtract_restores(a in -1_000_000_000i64..1_000_000_000, b in -1_000_000_000i64..1_000_000_000) {
            let x = Money::from_cents(a, "BRL").unwrap();
            let y = Money::from_cents(b, "BRL").unwrap();
            let back = x.add(&y).unwrap().subtract(&y).unwrap();
            prop_assert_eq!(back, x);
        }
    }
}
