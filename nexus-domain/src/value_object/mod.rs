//! 值对象（Value Object）
//!
//! 无标识、以值相等为准的不可变对象。每个值对象只能通过校验构造函数创建，
//! 构造成功即保证在整个生命周期内有效（parse, don't validate）；
//! 反序列化同样经过构造函数，存储中的脏数据无法绕过校验。
//!
//! 任何“修改”都表现为产生一个新实例。
//!
mod address;
mod code;
mod color;
mod date_range;
mod email;
mod money;
mod national_id;
mod percentage;
mod phone;
mod slug;
mod version;

pub use address::Address;
pub use code::Code;
pub use color::Color;
pub use date_range::DateRange;
pub use email::Email;
pub use money::Money;
pub use national_id::{Cnpj, Cpf};
pub use percentage::Percentage;
pub use phone::Phone;
pub use slug::Slug;
pub use version::Version;

use crate::error::DomainResult;
use std::fmt;

/// 值对象抽象
pub trait ValueObject: Clone + PartialEq + fmt::Debug {
    /// 重新校验实例的不变式
    ///
    /// 通过构造函数得到的实例总是满足不变式，这里主要用于组合对象的整体校验。
    fn validate(&self) -> DomainResult<()>;
}

/// 仅保留 ASCII 数字
pub(crate) fn digits_only(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// 将数字字符串转换为逐位数组（调用方保证只含 ASCII 数字）
pub(crate) fn to_digits(digits: &str) -> Vec<u32> {
    digits.bytes().map(|b| u32::from(b - b'0')).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digits_only_strips_punctuation() {
        assert_eq!(digits_only("529.982.247-25"), "52998224725");
        assert_eq!(digits_only("(41) 99868-2343"), "41998682343");
        assert_eq!(digits_only("abc"), "");
    }

    #[test]
    fn to_digits_maps_each_position() {
        assert_eq!(to_digits("0912"), vec![0, 9, 1, 2]);
    }
}
