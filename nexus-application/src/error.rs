use crate::validation::FieldError;
use nexus_domain::error::{DomainError, ErrorCode};

pub type AppResult<T> = Result<T, AppError>;

#[non_exhaustive]
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("domain: {0}")]
    Domain(#[from] DomainError),

    #[error("validation: {} field error(s)", .0.len())]
    Validation(Vec<FieldError>),

    #[error("authorization: {0}")]
    Authorization(String),

    #[error("infra: {0}")]
    Infra(String),

    #[error("config: {0}")]
    Config(String),
}

impl AppError {
    /// 错误分类码
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Domain(err) => err.code(),
            Self::Validation(_) => ErrorCode::InvalidInput,
            Self::Authorization(_) => ErrorCode::Unauthorized,
            Self::Infra(_) | Self::Config(_) => ErrorCode::Internal,
        }
    }

    /// 是否应当对外隐藏细节
    pub fn is_internal(&self) -> bool {
        self.code() == ErrorCode::Internal
    }
}

impl From<::config::ConfigError> for AppError {
    fn from(err: ::config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}
