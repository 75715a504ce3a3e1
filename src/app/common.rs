use crate::api::error::ApiError;
use crate::importer::ParseIssue;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

// ==========================================
// 公共工具：错误映射
// ==========================================

/// 错误响应（整批失败时返回给调用方）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// 错误消息
    pub error: String,

    /// 表格解析错误明细（可选）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ParseIssue>>,
}

/// ApiError → HTTP 状态码
pub fn status_of(err: &ApiError) -> StatusCode {
    if err.is_client_error() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_of(&self);
        if status.is_server_error() {
            tracing::error!(error = %self, "导入请求失败");
        } else {
            tracing::warn!(error = %self, "导入请求被拒绝");
        }

        let issues = self.parse_issues();
        let body = ErrorResponse {
            error: self.to_string(),
            details: if issues.is_empty() {
                None
            } else {
                Some(issues.to_vec())
            },
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importer::ImportError;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_of(&ApiError::from(ImportError::MissingFile("zip".to_string()))),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(&ApiError::from(ImportError::ReferenceLoadError("x".to_string()))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_error_body_omits_empty_details() {
        let body = ErrorResponse {
            error: "Missing required file: zip".to_string(),
            details: None,
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({ "error": "Missing required file: zip" })
        );
    }
}
