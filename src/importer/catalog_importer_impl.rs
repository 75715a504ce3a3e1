// ==========================================
// 商品目录导入系统 - 导入器实现
// ==========================================
// 职责: 串联导入管道，从上传字节到落库与结果报告
// 流程: 税率加载 → 压缩包索引 → 表格解析 → 逐行(解析 → 校验 → 查重 → 图片 → 写入) → 汇总
// 约束: 行严格顺序处理；单行失败不影响其他行
// ==========================================

use crate::config::ImportConfigReader;
use crate::domain::catalog::{NewItem, RawRecord};
use crate::domain::import_job::{ImportJob, ImportReport, RowOutcome};
use crate::domain::tax::TaxReferenceSet;
use crate::importer::archive_indexer::ArchiveIndex;
use crate::importer::asset_resolver::AssetResolver;
use crate::importer::catalog_importer_trait::{
    CatalogImporter, ConflictHandler, DqValidator, FieldMapper, FileParser, RecordWriter,
};
use crate::importer::conflict_handler::{
    ConflictHandler as ConflictHandlerImpl, RecordWriter as RecordWriterImpl,
};
use crate::importer::dq_validator::DqValidator as DqValidatorImpl;
use crate::importer::error::{ImportError, ImportResult, RowResult};
use crate::importer::field_mapper::FieldMapper as FieldMapperImpl;
use crate::importer::file_parser::UniversalFileParser;
use crate::repository::{ItemRepository, TaxRateRepository};
use crate::storage::BlobStore;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

// ==========================================
// ImportSettings - 单次任务的配置快照
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct ImportSettings {
    pub allow_substring: bool,
    pub default_image_extension: String,
    pub max_import_rows: usize,
    pub job_timeout: Duration,
}

impl ImportSettings {
    /// 任务开始时读取一次，任务期间不再变化
    pub async fn load<C: ImportConfigReader + ?Sized>(config: &C) -> ImportResult<Self> {
        fn read_err(key: &str, e: Box<dyn std::error::Error + Send + Sync>) -> ImportError {
            ImportError::ConfigReadError {
                key: key.to_string(),
                message: e.to_string(),
            }
        }

        use crate::config::config_keys as keys;
        Ok(Self {
            allow_substring: config
                .get_substring_match_enabled()
                .await
                .map_err(|e| read_err(keys::SUBSTRING_MATCH_ENABLED, e))?,
            default_image_extension: config
                .get_default_image_extension()
                .await
                .map_err(|e| read_err(keys::DEFAULT_IMAGE_EXTENSION, e))?,
            max_import_rows: config
                .get_max_import_rows()
                .await
                .map_err(|e| read_err(keys::MAX_IMPORT_ROWS, e))?,
            job_timeout: Duration::from_secs(
                config
                    .get_job_timeout_secs()
                    .await
                    .map_err(|e| read_err(keys::JOB_TIMEOUT_SECS, e))?,
            ),
        })
    }
}

// ==========================================
// CatalogImporterImpl - 导入器实现
// ==========================================
pub struct CatalogImporterImpl<T, C>
where
    T: TaxRateRepository,
    C: ImportConfigReader,
{
    // 数据访问层
    tax_repo: Arc<T>,

    // 配置读取器
    config: Arc<C>,

    // 导入组件
    file_parser: Box<dyn FileParser>,
    field_mapper: Box<dyn FieldMapper>,
    dq_validator: Box<dyn DqValidator>,
    conflict_handler: Box<dyn ConflictHandler>,
    record_writer: Box<dyn RecordWriter>,
    asset_resolver: AssetResolver,
}

impl<T, C> CatalogImporterImpl<T, C>
where
    T: TaxRateRepository,
    C: ImportConfigReader,
{
    /// 创建新的 CatalogImporter 实例
    ///
    /// # 参数
    /// - tax_repo: 税率仓储（参考数据）
    /// - config: 配置读取器
    /// - file_parser: 表格解析器
    /// - field_mapper: 字段解析器
    /// - dq_validator: 行校验器
    /// - conflict_handler: 查重器
    /// - record_writer: 记录写入器
    /// - asset_resolver: 图片解析与落盘
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        tax_repo: Arc<T>,
        config: Arc<C>,
        file_parser: Box<dyn FileParser>,
        field_mapper: Box<dyn FieldMapper>,
        dq_validator: Box<dyn DqValidator>,
        conflict_handler: Box<dyn ConflictHandler>,
        record_writer: Box<dyn RecordWriter>,
        asset_resolver: AssetResolver,
    ) -> Self {
        Self {
            tax_repo,
            config,
            file_parser,
            field_mapper,
            dq_validator,
            conflict_handler,
            record_writer,
            asset_resolver,
        }
    }

    /// 使用默认组件装配
    pub fn with_defaults<R>(
        item_repo: Arc<R>,
        tax_repo: Arc<T>,
        config: Arc<C>,
        blob_store: Arc<dyn BlobStore>,
    ) -> Self
    where
        R: ItemRepository + 'static,
    {
        Self::new(
            tax_repo,
            config,
            Box::new(UniversalFileParser),
            Box::new(FieldMapperImpl::default()),
            Box::new(DqValidatorImpl),
            Box::new(ConflictHandlerImpl::new(item_repo.clone())),
            Box::new(RecordWriterImpl::new(item_repo)),
            AssetResolver::new(blob_store),
        )
    }

    /// 处理单行：解析 → 校验 → 查重 → 图片 → 写入
    ///
    /// 图片在查重通过后才落盘；写入失败时删除已落盘图片
    async fn process_row(
        &self,
        tenant_id: &str,
        record: &RawRecord,
        row_number: usize,
        taxes: &TaxReferenceSet,
        archive: &mut ArchiveIndex,
        settings: &ImportSettings,
    ) -> RowResult<String> {
        let resolved = self
            .field_mapper
            .map_to_resolved(record, row_number, settings.allow_substring);

        let name = self.dq_validator.validate(&resolved, taxes)?;

        self.conflict_handler
            .check_duplicate(tenant_id, &name)
            .await?;

        let asset = match resolved.image_path.as_deref() {
            Some(path) => Some(
                self.asset_resolver
                    .resolve(archive, path, &settings.default_image_extension)
                    .await?,
            ),
            None => None,
        };

        let image_url = asset.as_ref().map(|a| a.public_url.clone());
        let item = NewItem::from_resolved(tenant_id, name, &resolved, image_url);

        match self.record_writer.write(item).await {
            Ok(item_id) => Ok(item_id),
            Err(e) => {
                if let Some(asset) = &asset {
                    self.asset_resolver.discard(asset).await;
                }
                Err(e)
            }
        }
    }
}

#[async_trait]
impl<T, C> CatalogImporter for CatalogImporterImpl<T, C>
where
    T: TaxRateRepository,
    C: ImportConfigReader,
{
    #[instrument(
        skip(self, job, cancel),
        fields(job_id = %job.job_id, tenant_id = %job.tenant_id)
    )]
    async fn run(&self, job: ImportJob, cancel: CancellationToken) -> ImportResult<ImportReport> {
        let start_time = Instant::now();
        info!(
            tabular = %job.tabular.file_name,
            archive = %job.archive.file_name,
            "开始导入商品目录"
        );

        let settings = ImportSettings::load(self.config.as_ref()).await?;
        let ImportJob {
            tenant_id,
            tabular,
            archive,
            ..
        } = job;

        // === 步骤 1: 加载税率参考数据 ===
        debug!("步骤 1: 加载税率参考数据");
        let taxes = self
            .tax_repo
            .get_active_tax_rates(&tenant_id)
            .await
            .map_err(|e| {
                error!(error = %e, "税率加载失败");
                ImportError::ReferenceLoadError(e.to_string())
            })?;
        debug!(rates = taxes.total_rates(), "税率加载完成");

        // === 步骤 2: 建立压缩包索引 ===
        debug!("步骤 2: 建立压缩包索引");
        let mut archive_index = ArchiveIndex::open(archive.bytes).map_err(|e| {
            error!(error = %e, "压缩包打开失败");
            e
        })?;

        // === 步骤 3: 解析表格 ===
        debug!("步骤 3: 解析表格");
        let records = self
            .file_parser
            .parse_to_raw_records(&tabular.file_name, &tabular.bytes)
            .map_err(|e| {
                error!(error = %e, "表格解析失败");
                e
            })?;

        let total_rows = records.len();
        if total_rows > settings.max_import_rows {
            error!(total_rows, limit = settings.max_import_rows, "行数超出上限");
            return Err(ImportError::TooManyRows {
                limit: settings.max_import_rows,
                actual: total_rows,
            });
        }
        info!(total_rows, images = archive_index.len(), "表格解析完成");

        // === 步骤 4: 逐行处理 ===
        debug!("步骤 4: 逐行处理");
        // 超时设置过大无法表示时视为不限时
        let deadline = start_time.checked_add(settings.job_timeout);
        let mut report = ImportReport::default();

        for (idx, record) in records.iter().enumerate() {
            // 行间检查取消与超时
            if cancel.is_cancelled() {
                warn!(processed = report.processed(), total_rows, "导入被取消");
                report.stopped_early = Some("cancelled".to_string());
                break;
            }
            if deadline.is_some_and(|d| Instant::now() >= d) {
                warn!(processed = report.processed(), total_rows, "导入超时");
                report.stopped_early = Some(format!(
                    "timed out after {}s",
                    settings.job_timeout.as_secs()
                ));
                break;
            }

            let row_number = idx + 1;
            let outcome = match self
                .process_row(
                    &tenant_id,
                    record,
                    row_number,
                    &taxes,
                    &mut archive_index,
                    &settings,
                )
                .await
            {
                Ok(item_id) => {
                    debug!(row_number, item_id = %item_id, "行导入成功");
                    RowOutcome::Success
                }
                Err(e) => {
                    warn!(row_number, error = %e, "行导入失败");
                    RowOutcome::Failure {
                        reason: e.to_string(),
                    }
                }
            };
            report.record(row_number, outcome);
        }

        let elapsed_ms = start_time.elapsed().as_millis() as u64;
        info!(
            success = report.success,
            failed = report.failed,
            total_rows,
            elapsed_ms,
            "商品目录导入完成"
        );

        Ok(report)
    }
}
