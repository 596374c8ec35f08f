use super::ValueObject;
use crate::error::{DomainError, DomainResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 字母数字编码（大写，仅 `[A-Z0-9]`），长度范围由调用方指定
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Code(String);

fn is_code_charset(code: &str) -> bool {
    !code.is_empty()
        && code
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
}

impl Code {
    pub fn new(raw: &str, min: usize, max: usize) -> DomainResult<Self> {
        let code = raw.trim().to_uppercase();

        let len = code.chars().count();
        if len < min || len > max {
            return Err(DomainError::validation(format!(
                "code must be between {min} and {max} characters"
            )));
        }
        if !is_code_charset(&code) {
            return Err(DomainError::validation(
                "code must contain only letters and numbers",
            ));
        }

        Ok(Self(code))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl ValueObject for Code {
    fn validate(&self) -> DomainResult<()> {
        if is_code_charset(&self.0) {
            Ok(())
        } else {
            Err(DomainError::validation(
                "code must contain only letters and numbers",
            ))
        }
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 存储中的编码不携带长度约束，仅复核字符集
impl TryFrom<String> for Code {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let len = value.chars().count();
        Self::new(&value, 1, len.max(1))
    }
}

impl From<Code> for String {
    fn from(value: Code) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uppercases_and_checks_length() {
        let code = Code::new(" abc123 ", 3, 10).unwrap();
        assert_eq!(code.as_str(), "ABC123");
        assert_eq!(code.len(), 6);
        assert!(Code::new("ab", 3, 10).is_err());
        assert!(Code::new("abcdefghijk", 3, 10).is_err());
    }

    #[test]
    fn rejects_non_alphanumeric() {
        assert!(Code::new("AB-12", 1, 10).is_err());
        assert!(Code::new("ÇA", 1, 10).is_err());
        assert!(Code::new("", 0, 10).is_err());
    }

    #[test]
    fn deserialization_checks_charset_only() {
        let code: Code = serde_json::from_str("\"PROMO2024\"").unwrap();
        assert_eq!(code.as_str(), "PROMO2024");
        assert!(serde_json::from_str::<Code>("\"bad code\"").is_err());
        assert!(serde_json::from_str::<Code>("\"\"").is_err());
    }
}
