// ==========================================
// 商品目录导入系统 - 导入模块错误类型
// ==========================================
// 两级错误:
// - ImportError: 任务级（整批中止，不处理任何行）
// - RowError:    行级（仅本行失败，继续处理后续行）
// 工具: thiserror 派生宏
// ==========================================

use crate::domain::types::TaxType;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ==========================================
// ParseIssue - 表格解析错误（带行上下文）
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseIssue {
    pub row: usize, // 数据行号（1 起始，不含表头）
    pub message: String,
}

/// 任务级错误
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 请求相关错误 =====
    #[error("Missing required file: {0}")]
    MissingFile(String),

    // ===== 表格解析错误 =====
    #[error("File is not valid UTF-8 text: {0}")]
    Utf8Decode(String),

    #[error("CSV parse failed with {} error(s)", .0.len())]
    CsvParseErrors(Vec<ParseIssue>),

    #[error("Spreadsheet parse failed: {0}")]
    ExcelParseError(String),

    #[error("Spreadsheet contains no worksheet")]
    EmptyWorkbook,

    #[error("Too many rows: {actual} (limit {limit})")]
    TooManyRows { limit: usize, actual: usize },

    // ===== 压缩包错误 =====
    #[error("Failed to open ZIP archive: {0}")]
    ArchiveOpenError(String),

    // ===== 参考数据/配置错误 =====
    #[error("Failed to load tax rates: {0}")]
    ReferenceLoadError(String),

    #[error("Config read failed (key: {key}): {message}")]
    ConfigReadError { key: String, message: String },

    // ===== 通用错误 =====
    #[error("Internal error: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ImportError {
    /// 是否由调用方输入导致（HTTP 400），否则为服务端错误（HTTP 500）
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ImportError::MissingFile(_)
                | ImportError::Utf8Decode(_)
                | ImportError::CsvParseErrors(_)
                | ImportError::ExcelParseError(_)
                | ImportError::EmptyWorkbook
                | ImportError::TooManyRows { .. }
                | ImportError::ArchiveOpenError(_)
        )
    }

    /// 结构化解析错误列表（仅 CSV 解析失败时非空）
    pub fn parse_issues(&self) -> &[ParseIssue] {
        match self {
            ImportError::CsvParseErrors(issues) => issues,
            _ => &[],
        }
    }
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::InternalError(err.to_string())
    }
}

// 实现 From<csv::Error>（单条错误，行号取自 csv 位置信息）
impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        // csv 的 record 序号含表头（表头为 0），恰好等于数据行号
        let row = err.position().map(|p| p.record() as usize).unwrap_or(0);
        ImportError::CsvParseErrors(vec![ParseIssue {
            row,
            message: err.to_string(),
        }])
    }
}

// 实现 From<calamine::Error>
impl From<calamine::Error> for ImportError {
    fn from(err: calamine::Error) -> Self {
        ImportError::ExcelParseError(err.to_string())
    }
}

// 实现 From<zip::result::ZipError>
impl From<zip::result::ZipError> for ImportError {
    fn from(err: zip::result::ZipError) -> Self {
        ImportError::ArchiveOpenError(err.to_string())
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;

// ==========================================
// RowError - 行级错误
// ==========================================
// Display 文本即返回给调用方的 error 字段
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RowError {
    #[error("Missing product name")]
    MissingName,

    #[error("Invalid {tax_type}: {value}")]
    InvalidTax { tax_type: TaxType, value: f64 },

    #[error("Invalid price: {0}")]
    InvalidPrice(f64),

    #[error("Duplicate item (skipped)")]
    Duplicate,

    #[error("Image not found in ZIP: {0}")]
    ImageNotFound(String),

    #[error("{0}")]
    AssetWrite(String),

    #[error("{0}")]
    Store(String),
}

/// 行级 Result 类型别名
pub type RowResult<T> = Result<T, RowError>;
