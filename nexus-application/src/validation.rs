//! 输入校验协作者
//!
//! 校验失败以字段级错误列表表达（字段名 + 违反的约束），
//! 由 [`ensure_valid`] 统一转换为 `AppError::Validation`。
//!
use crate::error::AppError;
use nexus_domain::error::{DomainError, DomainResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 字段级校验错误
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub constraint: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, constraint: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            constraint: constraint.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.constraint)
    }
}

/// 可校验的输入
pub trait Validate {
    fn validate(&self) -> Vec<FieldError>;
}

/// 存在字段错误时返回 `AppError::Validation`
pub fn ensure_valid<T>(input: &T) -> Result<(), AppError>
where
    T: Validate + ?Sized,
{
    let errors = input.validate();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(errors))
    }
}

/// 字段错误收集器
#[derive(Debug, Default)]
pub struct Violations {
    errors: Vec<FieldError>,
}

impl Violations {
    pub fn new() -> Self {
        Self::default()
    }

    /// 条件不成立时记录错误
    pub fn check(&mut self, ok: bool, field: &str, constraint: &str) -> &mut Self {
        if !ok {
            self.errors.push(FieldError::new(field, constraint));
        }
        self
    }

    pub fn required(&mut self, value: &str, field: &str) -> &mut Self {
        self.check(!value.trim().is_empty(), field, "required")
    }

    /// 收集值对象构造结果；失败时以领域错误描述作为约束
    pub fn value<T>(&mut self, field: &str, result: DomainResult<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                self.errors.push(FieldError::new(field, constraint_of(&err)));
                None
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn into_errors(self) -> Vec<FieldError> {
        self.errors
    }

    pub fn finish(self) -> Result<(), AppError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(self.errors))
        }
    }
}

fn constraint_of(err: &DomainError) -> String {
    match err {
        DomainError::Validation { reason } | DomainError::OutOfRange { reason } => reason.clone(),
        other => other.to_string(),
    }
}
