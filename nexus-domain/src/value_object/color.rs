use super::ValueObject;
use crate::error::{DomainError, DomainResult};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// 十六进制颜色 `#RRGGBB`（大写）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color(String);

fn color_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"^#[0-9A-F]{6}$").expect("Invalid regex"))
}

impl Color {
    pub fn new(raw: &str) -> DomainResult<Self> {
        let mut color = raw.trim().to_uppercase();
        if !color.starts_with('#') {
            color.insert(0, '#');
        }

        if !color_regex().is_match(&color) {
            return Err(DomainError::validation(
                "invalid color format: must be #RRGGBB",
            ));
        }

        Ok(Self(color))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn rgb(&self) -> (u8, u8, u8) {
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&self.0[range], 16).unwrap_or_default()
        };
        (channel(1..3), channel(3..5), channel(5..7))
    }

    /// 感知亮度 `(r*299 + g*587 + b*114) / 1000 > 128`
    pub fn is_light(&self) -> bool {
        let (r, g, b) = self.rgb();
        let brightness = (u32::from(r) * 299 + u32::from(g) * 587 + u32::from(b) * 114) / 1000;
        brightness > 128
    }
}

impl ValueObject for Color {
    fn validate(&self) -> DomainResult<()> {
        Color::new(&self.0).map(|_| ())
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Color {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<Color> for String {
    fn from(value: Color) -> Self {
        value.0
    }
}
