//! 响应信封与状态码映射
//!
//! 错误分类码到 HTTP 状态码的翻译只在这里发生。
//! 内部错误统一使用通用消息且不携带细节。
//!
use crate::error::AppError;
use http::StatusCode;
use nexus_domain::error::ErrorCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::error;

pub const INTERNAL_MESSAGE: &str = "Internal server error";

/// 分类码到状态码
pub trait ErrorStatus {
    fn status(&self) -> StatusCode;
}

impl ErrorStatus for ErrorCode {
    fn status(&self) -> StatusCode {
        match self {
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::InvalidInput => StatusCode::BAD_REQUEST,
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::Forbidden => StatusCode::FORBIDDEN,
            ErrorCode::Conflict => StatusCode::CONFLICT,
            ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// 按字符串分类码取状态码，未知分类码视为 500
pub fn status_for(code: &str) -> StatusCode {
    ErrorCode::parse(code).status()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

/// 统一响应信封 `{success, data?, error?}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(err: &AppError) -> Self {
        let code = err.code();
        let error = if code == ErrorCode::Internal {
            error!(error = %err, "internal error returned to caller");
            ApiError {
                code,
                message: INTERNAL_MESSAGE.to_string(),
                details: None,
            }
        } else {
            ApiError {
                code,
                message: err.to_string(),
                details: details_of(err),
            }
        };

        Self {
            success: false,
            data: None,
            error: Some(error),
        }
    }

    pub fn from_result(result: Result<T, AppError>) -> Self {
        match result {
            Ok(data) => Self::success(data),
            Err(err) => Self::failure(&err),
        }
    }

    pub fn status(&self) -> StatusCode {
        match &self.error {
            None => StatusCode::OK,
            Some(err) => err.code.status(),
        }
    }
}

fn details_of(err: &AppError) -> Option<Value> {
    match err {
        AppError::Validation(fields) => serde_json::to_value(fields).ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::FieldError;
    use nexus_domain::error::DomainError;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn codes_map_to_statuses() {
        let cases = [
            ("NOT_FOUND", 404),
            ("INVALID_INPUT", 400),
            ("UNAUTHORIZED", 401),
            ("FORBIDDEN", 403),
            ("CONFLICT", 409),
            ("INTERNAL_SERVER", 500),
            ("TEAPOT", 500),
        ];
        for (code, status) in cases {
            assert_eq!(status_for(code).as_u16(), status, "{code}");
        }
    }

    #[test]
    fn success_envelope() {
        let resp = ApiResponse::success(json!({"id": "u-1"}));
        assert_eq!(resp.status(), StatusCode::OK);
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json, json!({"success": true, "data": {"id": "u-1"}}));
    }

    #[test]
    fn validation_failure_carries_field_details() {
        let err = AppError::Validation(vec![FieldError::new("email", "invalid email")]);
        let resp: ApiResponse<()> = ApiResponse::failure(&err);
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"]["code"], "INVALID_INPUT");
        assert_eq!(json["error"]["details"][0]["field"], "email");
        assert!(json.get("data").is_none());
    }

    #[test]
    fn internal_failure_hides_details() {
        let err = AppError::from(DomainError::repository("connection reset by peer"));
        let resp: ApiResponse<()> = ApiResponse::from_result(Err(err));
        let error = resp.error.clone().unwrap();
        assert_eq!(error.code, ErrorCode::Internal);
        assert_eq!(error.message, INTERNAL_MESSAGE);
        assert!(error.details.is_none());
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn domain_failure_keeps_message() {
        let err = AppError::from(DomainError::not_found("user u-9"));
        let resp: ApiResponse<()> = ApiResponse::failure(&err);
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert!(resp.error.unwrap().message.contains("u-9"));
    }

    proptest! {
        #[test]
        fn unknown_codes_map_to_500(code in "[a-z_]{1,20}") {
            prop_assert_eq!(status_for(&code), StatusCode::INTERNAL_SERVER_ERROR);
        }

        #[test]
        fn infra_messages_never_reach_the_caller(reason in "[a-zA-Z0-9 .:/]{1,60}") {
            let resp: ApiResponse<()> = ApiResponse::failure(&AppError::Infra(reason));
            let error = resp.error.clone().unwrap();
            prop_assert_eq!(error.message.as_str(), INTERNAL_MESSAGE);
            prop_assert!(error.details.is_none());
            prop_assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        }
    }
}
