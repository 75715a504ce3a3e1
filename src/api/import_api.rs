// ==========================================
// 商品目录批量导入API
// ==========================================
// 职责: 校验请求输入，组装导入任务，调用导入器
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::import_job::{ImportJob, ImportReport, UploadedFile};
use crate::importer::{CatalogImporter, ImportError};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// 表格文件的表单字段名
pub const TABULAR_PART: &str = "file";
/// 图片压缩包的表单字段名
pub const ARCHIVE_PART: &str = "zip";

/// 导入API
pub struct ImportApi {
    importer: Arc<dyn CatalogImporter>,
}

impl ImportApi {
    /// 创建新的ImportApi实例
    pub fn new(importer: Arc<dyn CatalogImporter>) -> Self {
        Self { importer }
    }

    /// 批量导入商品
    ///
    /// # 参数
    /// - tenant_id: 租户 ID（由外部认证确定）
    /// - tabular: 表格文件
    /// - archive: 图片压缩包
    /// - cancel: 取消令牌（行间检查）
    ///
    /// # 返回
    /// - Ok(ImportReport): 逐行结果（部分失败仍为 Ok）
    /// - Err(ApiError): 缺少文件/解析失败等整批错误
    pub async fn import_items(
        &self,
        tenant_id: &str,
        tabular: Option<UploadedFile>,
        archive: Option<UploadedFile>,
        cancel: CancellationToken,
    ) -> ApiResult<ImportReport> {
        let tenant_id = tenant_id.trim();
        if tenant_id.is_empty() {
            return Err(ApiError::InvalidInput("Missing tenant id".to_string()));
        }

        let tabular = tabular.ok_or_else(|| ImportError::MissingFile(TABULAR_PART.to_string()))?;
        let archive = archive.ok_or_else(|| ImportError::MissingFile(ARCHIVE_PART.to_string()))?;

        let job = ImportJob::new(tenant_id, tabular, archive);
        info!(job_id = %job.job_id, tenant_id, "收到批量导入请求");

        let report = self.importer.run(job, cancel).await?;
        Ok(report)
    }
}
