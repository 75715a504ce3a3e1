// ==========================================
// 商品目录导入系统 - 导入管道 Trait
// ==========================================
// 职责: 定义导入管道各阶段接口（不包含实现）
// 管道: 表格解析 → 字段解析 → 行校验 → 查重 → 图片落盘 → 写入
// ==========================================

use crate::domain::catalog::{CellValue, NewItem, RawRecord, ResolvedRecord};
use crate::domain::import_job::{ImportJob, ImportReport};
use crate::domain::tax::TaxReferenceSet;
use crate::importer::error::{ImportResult, RowResult};
use crate::importer::field_mapper::{CatalogField, FieldMatch};
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

// ==========================================
// CatalogImporter Trait
// ==========================================
// 用途: 导入主接口
// 实现者: CatalogImporterImpl
#[async_trait]
pub trait CatalogImporter: Send + Sync {
    /// 执行一次完整导入任务
    ///
    /// # 返回
    /// - Ok(ImportReport): 行级结果汇总（部分行失败仍为 Ok）
    /// - Err(ImportError): 任务级失败，未处理任何行
    ///
    /// # 说明
    /// - 行严格按表格顺序逐行处理
    /// - cancel 被触发或超过任务时限时，在行间停止并返回已处理部分
    async fn run(&self, job: ImportJob, cancel: CancellationToken) -> ImportResult<ImportReport>;
}

// ==========================================
// FileParser Trait
// ==========================================
// 用途: 表格解析（阶段 0）
// 实现者: CsvParser, ExcelParser, UniversalFileParser
pub trait FileParser: Send + Sync {
    /// 解析表格字节为有序行记录（键已 trim，空白行已跳过）
    ///
    /// 行号按返回记录计数（1 起始），空白行不占行号，
    /// 因此可能与源文件中的数据行位置不一致
    fn parse_to_raw_records(&self, file_name: &str, bytes: &[u8])
        -> ImportResult<Vec<RawRecord>>;
}

// ==========================================
// FieldMapper Trait
// ==========================================
// 用途: 字段解析（阶段 1）
// 实现者: FieldMapperImpl
pub trait FieldMapper: Send + Sync {
    /// 三级匹配解析单个标准字段；无别名命中返回 None
    fn resolve_field(
        &self,
        record: &RawRecord,
        field: CatalogField,
        allow_substring: bool,
    ) -> Option<FieldMatch>;

    /// 将原始行记录映射为 ResolvedRecord（含类型转换，不做校验）
    fn map_to_resolved(
        &self,
        record: &RawRecord,
        row_number: usize,
        allow_substring: bool,
    ) -> ResolvedRecord;
}

// ==========================================
// DataCleaner Trait
// ==========================================
// 用途: 单元格清洗与类型转换
// 实现者: DataCleanerImpl
pub trait DataCleaner: Send + Sync {
    /// TRIM；空串 → None
    fn clean_text(&self, value: Option<&CellValue>) -> Option<String>;

    /// 去除数字、'.'、'-' 以外的字符后解析；失败 → 0
    fn coerce_number(&self, value: Option<&CellValue>) -> f64;

    /// "true" / "1" / "yes"（忽略大小写）→ true；其他 → false
    fn coerce_bool(&self, value: Option<&CellValue>) -> bool;
}

// ==========================================
// DqValidator Trait
// ==========================================
// 用途: 行校验（阶段 2）
// 实现者: DqValidatorImpl
pub trait DqValidator: Send + Sync {
    /// 必填字段校验；通过时返回已 trim 的名称
    fn validate_required_fields(&self, record: &ResolvedRecord) -> RowResult<String>;

    /// 数值范围校验
    fn validate_ranges(&self, record: &ResolvedRecord) -> RowResult<()>;

    /// 税率校验（仅在 apply_tax 为 true 时生效）
    fn validate_tax(&self, record: &ResolvedRecord, taxes: &TaxReferenceSet) -> RowResult<()>;

    /// 完整校验，按 名称 → 数值 → 税率 顺序，首个失败即返回
    fn validate(&self, record: &ResolvedRecord, taxes: &TaxReferenceSet) -> RowResult<String> {
        let name = self.validate_required_fields(record)?;
        self.validate_ranges(record)?;
        self.validate_tax(record, taxes)?;
        Ok(name)
    }
}

// ==========================================
// ConflictHandler Trait
// ==========================================
// 用途: 租户内按名称查重（阶段 3）
// 实现者: ConflictHandlerImpl
#[async_trait]
pub trait ConflictHandler: Send + Sync {
    /// 已存在同名商品 → Err(RowError::Duplicate)
    async fn check_duplicate(&self, tenant_id: &str, name: &str) -> RowResult<()>;
}

// ==========================================
// RecordWriter Trait
// ==========================================
// 用途: 商品记录落库（阶段 5）
// 实现者: RecordWriterImpl
#[async_trait]
pub trait RecordWriter: Send + Sync {
    /// 写入一条商品记录，返回新记录 ID
    async fn write(&self, item: NewItem) -> RowResult<String>;
}
