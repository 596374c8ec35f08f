//! 国家证件号：个人纳税人识别号（CPF，11 位）与企业纳税人识别号（CNPJ，14 位）
//!
//! 两者均为公开的标准算法：前 N 位数字按权重加权求和后对 11 取模得到两位校验位。
//! 校验规则必须与官方算法逐位一致，包括“结果过大时校验位取 0”的边界情况。

use super::{ValueObject, digits_only, to_digits};
use crate::error::{DomainError, DomainResult};
use serde::{Deserialize, Serialize};
use std::fmt;

const CPF_LEN: usize = 11;
const CNPJ_LEN: usize = 14;

const CNPJ_FIRST_WEIGHTS: [u32; 12] = [5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];
const CNPJ_SECOND_WEIGHTS: [u32; 13] = [6, 5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];

/// 个人纳税人识别号（CPF）
///
/// 规范形式为 11 位纯数字；`formatted()` 输出 `DDD.DDD.DDD-DD`。
///
/// ```
/// use nexus_domain::value_object::Cpf;
///
/// let cpf = Cpf::new("529.982.247-25").unwrap();
/// assert_eq!(cpf.as_str(), "52998224725");
/// assert_eq!(cpf.formatted(), "529.982.247-25");
/// assert!(Cpf::new("111.111.111-11").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Cpf(String);

impl Cpf {
    pub fn new(raw: &str) -> DomainResult<Self> {
        let digits = digits_only(raw);

        if digits.len() != CPF_LEN {
            return Err(DomainError::validation("CPF must have 11 digits"));
        }

        if !is_valid_cpf(&digits) {
            return Err(DomainError::validation(format!("invalid CPF: {digits}")));
        }

        Ok(Self(digits))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn formatted(&self) -> String {
        let v = &self.0;
        format!("{}.{}.{}-{}", &v[..3], &v[3..6], &v[6..9], &v[9..])
    }
}

/// CPF 校验位：`11 - (sum mod 11)`，结果 >= 10 时取 0
fn cpf_check_digit(digits: &[u32]) -> u32 {
    let top_weight = digits.len() as u32 + 1;
    let sum: u32 = digits
        .iter()
        .enumerate()
        .map(|(i, d)| d * (top_weight - i as u32))
        .sum();
    let digit = 11 - (sum % 11);
    if digit >= 10 { 0 } else { digit }
}

fn is_valid_cpf(digits: &str) -> bool {
    let d = to_digits(digits);

    // 全部相同的数字序列可以通过校验位计算，但不是合法号码
    if d.iter().all(|x| *x == d[0]) {
        return false;
    }

    cpf_check_digit(&d[..9]) == d[9] && cpf_check_digit(&d[..10]) == d[10]
}

impl ValueObject for Cpf {
    fn validate(&self) -> DomainResult<()> {
        Cpf::new(&self.0).map(|_| ())
    }
}

impl fmt::Display for Cpf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Cpf {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<Cpf> for String {
    fn from(value: Cpf) -> Self {
        value.0
    }
}

/// 企业纳税人识别号（CNPJ）
///
/// 规范形式为 14 位纯数字；`formatted()` 输出 `DD.DDD.DDD/DDDD-DD`。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Cnpj(String);

impl Cnpj {
    pub fn new(raw: &str) -> DomainResult<Self> {
        let digits = digits_only(raw);

        if digits.len() != CNPJ_LEN {
            return Err(DomainError::validation("CNPJ must have 14 digits"));
        }

        if !is_valid_cnpj(&digits) {
            return Err(DomainError::validation(format!("invalid CNPJ: {digits}")));
        }

        Ok(Self(digits))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn formatted(&self) -> String {
        let v = &self.0;
        format!(
            "{}.{}.{}/{}-{}",
            &v[..2],
            &v[2..5],
            &v[5..8],
            &v[8..12],
            &v[12..]
        )
    }
}

/// CNPJ 校验位：`sum mod 11 < 2` 时取 0，否则 `11 - (sum mod 11)`
fn cnpj_check_digit(digits: &[u32], weights: &[u32]) -> u32 {
    let sum: u32 = digits.iter().zip(weights).map(|(d, w)| d * w).sum();
    let rem = sum % 11;
    if rem < 2 { 0 } else { 11 - rem }
}

fn is_valid_cnpj(digits: &str) -> bool {
    let d = to_digits(digits);
    cnpj_check_digit(&d[..12], &CNPJ_FIRST_WEIGHTS) == d[12]
        && cnpj_check_digit(&d[..13], &CNPJ_SECOND_WEIGHTS) == d[13]
}

impl ValueObject for Cnpj {
    fn validate(&self) -> DomainResult<()> {
        Cnpj::new(&self.0).map(|_| ())
    }
}

impl fmt::Display for Cnpj {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Cnpj {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<Cnpj> for String {
    fn from(value: Cnpj) -> Self {
        value.0
    }
}
