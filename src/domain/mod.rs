// ==========================================
// 商品目录导入系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、值类型
// 红线: 不含数据访问逻辑,不含导入流程逻辑
// ==========================================

pub mod catalog;
pub mod import_job;
pub mod tax;
pub mod types;

// 重导出核心类型
pub use catalog::{CellValue, Item, NewItem, RawRecord, ResolvedRecord};
pub use import_job::{ImportJob, ImportReport, RowErrorEntry, RowOutcome, UploadedFile};
pub use tax::TaxReferenceSet;
pub use types::{MatchTier, TaxType};
