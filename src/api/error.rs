// ==========================================
// 商品目录导入系统 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，区分调用方错误（400）与服务端错误（500）
// ==========================================

use crate::importer::error::{ImportError, ParseIssue};
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 请求错误
    // ==========================================
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // ==========================================
    // 导入任务错误（整批失败）
    // ==========================================
    #[error(transparent)]
    Import(#[from] ImportError),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("Database error: {0}")]
    DatabaseError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("Internal error: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    /// 是否为调用方错误（HTTP 400）
    pub fn is_client_error(&self) -> bool {
        match self {
            ApiError::InvalidInput(_) => true,
            ApiError::Import(e) => e.is_client_error(),
            _ => false,
        }
    }

    /// 表格解析错误明细（无则为空）
    pub fn parse_issues(&self) -> &[ParseIssue] {
        match self {
            ApiError::Import(e) => e.parse_issues(),
            _ => &[],
        }
    }
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::FieldValueError { field, message } => {
                ApiError::InvalidInput(format!("{}: {}", field, message))
            }
            RepositoryError::InternalError(msg) => ApiError::InternalError(msg),
            RepositoryError::Other(err) => ApiError::Other(err),
            other => ApiError::DatabaseError(other.to_string()),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
