//! 领域层统一错误定义
//!
//! 聚焦值对象校验、算术兼容性、仓储与事务、领域结果（未找到/冲突/鉴权）等最小必要集合，
//! 便于在各实现层统一转换为 `DomainError`，并由传输层按 [`ErrorCode`] 映射状态码。
//!
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// 统一错误类型（内核最小必要集）
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum DomainError {
    // --- 值对象/输入校验 ---
    #[error("validation failed: {reason}")]
    Validation { reason: String },
    #[error("currency mismatch: {left} and {right}")]
    CurrencyMismatch { left: String, right: String },
    #[error("value out of range: {reason}")]
    OutOfRange { reason: String },
    #[error("division by zero")]
    DivisionByZero,

    // --- 领域结果 ---
    #[error("not found: {reason}")]
    NotFound { reason: String },
    #[error("conflict: {reason}")]
    Conflict { reason: String },
    #[error("version conflict: expected={expected}, actual={actual}")]
    VersionConflict { expected: usize, actual: usize },
    #[error("unauthorized: {reason}")]
    Unauthorized { reason: String },
    #[error("forbidden: {reason}")]
    Forbidden { reason: String },
    #[error("invalid state: {reason}")]
    InvalidState { reason: String },

    // --- 事务/仓储/持久化 ---
    #[error("transaction error: {reason}")]
    Transaction { reason: String },
    #[error("repository error: {reason}")]
    Repository { reason: String },
    #[error("type mismatch: expected={expected}, found={found}")]
    TypeMismatch { expected: String, found: String },
    #[error("serialization error: {source}")]
    Serde {
        #[from]
        source: serde_json::Error,
    },

    // --- 通用 ---
    #[error("internal error: {reason}")]
    Internal { reason: String },
}

/// 统一 Result 类型别名
pub type DomainResult<T> = Result<T, DomainError>;

impl DomainError {
    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation {
            reason: reason.into(),
        }
    }

    pub fn out_of_range(reason: impl Into<String>) -> Self {
        Self::OutOfRange {
            reason: reason.into(),
        }
    }

    pub fn not_found(reason: impl Into<String>) -> Self {
        Self::NotFound {
            reason: reason.into(),
        }
    }

    pub fn conflict(reason: impl Into<String>) -> Self {
        Self::Conflict {
            reason: reason.into(),
        }
    }

    pub fn invalid_state(reason: impl Into<String>) -> Self {
        Self::InvalidState {
            reason: reason.into(),
        }
    }

    pub fn transaction(reason: impl Into<String>) -> Self {
        Self::Transaction {
            reason: reason.into(),
        }
    }

    pub fn repository(reason: impl Into<String>) -> Self {
        Self::Repository {
            reason: reason.into(),
        }
    }

    /// 错误分类码（传输层据此映射状态码）
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Validation { .. }
            | Self::CurrencyMismatch { .. }
            | Self::OutOfRange { .. }
            | Self::DivisionByZero
            | Self::InvalidState { .. } => ErrorCode::InvalidInput,
            Self::NotFound { .. } => ErrorCode::NotFound,
            Self::Conflict { .. } | Self::VersionConflict { .. } => ErrorCode::Conflict,
            Self::Unauthorized { .. } => ErrorCode::Unauthorized,
            Self::Forbidden { .. } => ErrorCode::Forbidden,
            Self::Transaction { .. }
            | Self::Repository { .. }
            | Self::TypeMismatch { .. }
            | Self::Serde { .. }
            | Self::Internal { .. } => ErrorCode::Internal,
        }
    }
}

/// 错误分类码
///
/// 字符串形式保持稳定（`NOT_FOUND`、`INVALID_INPUT` 等），供响应信封直接输出。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    NotFound,
    InvalidInput,
    Unauthorized,
    Forbidden,
    Conflict,
    #[serde(rename = "INTERNAL_SERVER")]
    Internal,
}

impl ErrorCode {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NotFound => "NOT_FOUND",
            Self::InvalidInput => "INVALID_INPUT",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden => "FORBIDDEN",
            Self::Conflict => "CONFLICT",
            Self::Internal => "INTERNAL_SERVER",
        }
    }

    /// 解析分类码，未知值一律归为内部错误
    pub fn parse(code: &str) -> Self {
        match code {
            "NOT_FOUND" => Self::NotFound,
            "INVALID_INPUT" => Self::InvalidInput,
            "UNAUTHORIZED" => Self::Unauthorized,
            "FORBIDDEN" => Self::Forbidden,
            "CONFLICT" => Self::Conflict,
            _ => Self::Internal,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<uuid::Error> for DomainError {
    fn from(err: uuid::Error) -> Self {
        DomainError::Validation {
            reason: err.to_string(),
        }
    }
}

impl From<ulid::DecodeError> for DomainError {
    fn from(err: ulid::DecodeError) -> Self {
        DomainError::Validation {
            reason: err.to_string(),
        }
    }
}

impl From<chrono::ParseError> for DomainError {
    fn from(err: chrono::ParseError) -> Self {
        DomainError::Validation {
            reason: err.to_string(),
        }
    }
}
