// ==========================================
// 商品目录导入系统 - 导入任务与结果报告
// ==========================================
// 生命周期: 每次请求创建,响应返回后销毁,不落库
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ==========================================
// UploadedFile - 上传文件（文件名 + 原始字节）
// ==========================================
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }
}

// ==========================================
// ImportJob - 单次导入任务
// ==========================================
#[derive(Debug, Clone)]
pub struct ImportJob {
    pub job_id: String,
    pub tenant_id: String,
    pub tabular: UploadedFile, // 表格文件（CSV / Excel）
    pub archive: UploadedFile, // 图片压缩包（ZIP）
    pub started_at: DateTime<Utc>,
}

impl ImportJob {
    pub fn new(tenant_id: impl Into<String>, tabular: UploadedFile, archive: UploadedFile) -> Self {
        Self {
            job_id: Uuid::new_v4().to_string(),
            tenant_id: tenant_id.into(),
            tabular,
            archive,
            started_at: Utc::now(),
        }
    }
}

// ==========================================
// RowOutcome - 单行处理结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    Success,
    Failure { reason: String },
}

// ==========================================
// RowErrorEntry - 失败行明细
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowErrorEntry {
    pub row: usize, // 1 起始行号
    pub error: String,
}

// ==========================================
// ImportReport - 结果报告
// ==========================================
// JSON: { success, failed, errors: [{row, error}] }
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportReport {
    pub success: usize,
    pub failed: usize,
    pub errors: Vec<RowErrorEntry>,

    /// 提前终止原因（超时/取消）；完整执行时不输出
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stopped_early: Option<String>,
}

impl ImportReport {
    /// 累计一行结果；行号需按升序传入
    pub fn record(&mut self, row: usize, outcome: RowOutcome) {
        match outcome {
            RowOutcome::Success => self.success += 1,
            RowOutcome::Failure { reason } => {
                self.failed += 1;
                self.errors.push(RowErrorEntry { row, error: reason });
            }
        }
    }

    pub fn processed(&self) -> usize {
        self.success + self.failed
    }
}
