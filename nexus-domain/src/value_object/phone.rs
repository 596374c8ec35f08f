use super::{ValueObject, digits_only};
use crate::error::{DomainError, DomainResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 有效的两位区号
const VALID_AREA_CODES: &[&str] = &[
    "11", "12", "13", "14", "15", "16", "17", "18", "19", //
    "21", "22", "24", "27", "28", //
    "31", "32", "33", "34", "35", "37", "38", //
    "41", "42", "43", "44", "45", "46", "47", "48", "49", //
    "51", "53", "54", "55", //
    "61", "62", "63", "64", "65", "66", "67", "68", "69", //
    "71", "73", "74", "75", "77", "79", //
    "81", "82", "83", "84", "85", "86", "87", "88", "89", //
    "91", "92", "93", "94", "95", "96", "97", "98", "99",
];

/// 本地电话号码（10 或 11 位纯数字，前两位为区号）
///
/// 11 位且第三位为 `9` 的号码视为手机号。
///
/// ```
/// use nexus_domain::value_object::Phone;
///
/// let phone = Phone::new("(41) 99868-2343").unwrap();
/// assert_eq!(phone.as_str(), "41998682343");
/// assert_eq!(phone.formatted(), "(41) 99868-2343");
/// assert!(phone.is_mobile());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Phone(String);

impl Phone {
    pub fn new(raw: &str) -> DomainResult<Self> {
        let digits = digits_only(raw);

        if !(10..=11).contains(&digits.len()) {
            return Err(DomainError::validation("phone must have 10 or 11 digits"));
        }

        let area_code = &digits[..2];
        if !VALID_AREA_CODES.contains(&area_code) {
            return Err(DomainError::validation(format!(
                "invalid area code: {area_code}"
            )));
        }

        Ok(Self(digits))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn area_code(&self) -> &str {
        &self.0[..2]
    }

    /// `(AA) NNNN-NNNN` 或 `(AA) NNNNN-NNNN`
    pub fn formatted(&self) -> String {
        let v = &self.0;
        let split = v.len() - 4;
        format!("({}) {}-{}", &v[..2], &v[2..split], &v[split..])
    }

    pub fn is_mobile(&self) -> bool {
        self.0.len() == 11 && self.0.as_bytes()[2] == b'9'
    }
}

impl ValueObject for Phone {
    fn validate(&self) -> DomainResult<()> {
        Phone::new(&self.0).map(|_| ())
    }
}

impl fmt::Display for Phone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Phone {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<Phone> for String {
    fn from(value: Phone) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn landline_and_mobile_formats() {
        let landline = Phone::new("4133224455").unwrap();
        assert_eq!(landline.formatted(), "(41) 3322-4455");
        assert!(!landline.is_mobile());

        let mobile = Phone::new("41998682343").unwrap();
        assert_eq!(mobile.formatted(), "(41) 99868-2343");
        assert!(mobile.is_mobile());
        assert_eq!(mobile.area_code(), "41");
    }

    #[test]
    fn eleven_digits_without_nine_is_not_mobile() {
        let phone = Phone::new("41898682343").unwrap();
        assert!(!phone.is_mobile());
    }

    #[test]
    fn rejects_invalid_area_codes_and_lengths() {
        assert!(Phone::new("2033224455").is_err());
        assert!(Phone::new("0033224455").is_err());
        assert!(Phone::new("413322445").is_err());
        assert!(Phone::new("419986823431").is_err());
    }

    proptest! {
        // 格式化后再解析得到等价的规范值
        #[test]
        fn formatting_round_trips(
            area in proptest::sample::select(VALID_AREA_CODES),
            rest in "[0-9]{8,9}",
        ) {
            let phone = Phone::new(&format!("{area}{rest}")).unwrap();
            let reparsed = Phone::new(&phone.formatted()).unwrap();
            prop_assert_eq!(&reparsed, &phone);
            prop_assert_eq!(reparsed.formatted(), phone.formatted());
        }
    }
}
