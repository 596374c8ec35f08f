use super::ValueObject;
use crate::error::{DomainError, DomainResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

const MAX_SLUG_LEN: usize = 100;

/// URL 友好的标识片段
///
/// 生成规则：转小写，去掉重音符号，只保留 `[a-z0-9]`、空白与连字符，
/// 空白折叠为单个连字符，连续连字符合并，首尾连字符去掉。
///
/// ```
/// use nexus_domain::value_object::Slug;
///
/// assert_eq!(Slug::new("Café & Pão").unwrap().as_str(), "cafe-pao");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Slug(String);

fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_hyphen = false;

    for c in text.trim().to_lowercase().nfd().filter(|c| !is_combining_mark(*c)) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else if c == '-' || c.is_whitespace() {
            pending_hyphen = true;
        }
        // 其余字符直接丢弃
    }

    slug
}

impl Slug {
    pub fn new(text: &str) -> DomainResult<Self> {
        let slug = slugify(text);

        if slug.is_empty() {
            return Err(DomainError::validation(
                "invalid slug: cannot be empty after processing",
            ));
        }
        if slug.len() > MAX_SLUG_LEN {
            return Err(DomainError::validation(format!(
                "slug too long: maximum {MAX_SLUG_LEN} characters"
            )));
        }

        Ok(Self(slug))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ValueObject for Slug {
    fn validate(&self) -> DomainResult<()> {
        Slug::new(&self.0).map(|_| ())
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Slug {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<Slug> for String {
    fn from(value: Slug) -> Self {
        value.0
    }
}
