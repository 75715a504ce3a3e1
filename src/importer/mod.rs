// ==========================================
// 商品目录导入系统 - 导入层
// ==========================================
// 职责: 表格 + 图片压缩包 → 商品记录 + 逐行结果报告
// 支持: CSV / TSV / Excel / ODS + ZIP
// ==========================================

// 模块声明
pub mod archive_indexer;
pub mod asset_resolver;
pub mod catalog_importer_impl;
pub mod catalog_importer_trait;
pub mod conflict_handler;
pub mod data_cleaner;
pub mod dq_validator;
pub mod error;
pub mod field_mapper;
pub mod file_parser;

// 重导出核心类型
pub use archive_indexer::{normalize_archive_path, ArchiveIndex, AssetHandle};
pub use asset_resolver::{AssetResolver, StoredAsset};
pub use catalog_importer_impl::{CatalogImporterImpl, ImportSettings};
pub use conflict_handler::{
    ConflictHandler as ConflictHandlerImpl, RecordWriter as RecordWriterImpl,
};
pub use data_cleaner::DataCleaner as DataCleanerImpl;
pub use dq_validator::DqValidator as DqValidatorImpl;
pub use error::{ImportError, ImportResult, ParseIssue, RowError, RowResult};
pub use field_mapper::{CatalogField, FieldAliases, FieldMapper as FieldMapperImpl, FieldMatch};
pub use file_parser::{CsvParser, ExcelParser, UniversalFileParser};

// 重导出 Trait 接口
pub use catalog_importer_trait::{
    CatalogImporter, ConflictHandler, DataCleaner, DqValidator, FieldMapper, FileParser,
    RecordWriter,
};
