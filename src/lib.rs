// ==========================================
// 商品目录导入系统 - 核心库
// ==========================================
// 系统定位: 表格 + 图片压缩包批量导入商品目录
// 技术栈: Rust + Tokio + Axum + SQLite
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 图片存储层
pub mod storage;

// 导入层 - 导入管道
pub mod importer;

// 配置层 - 运行时配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// 应用层 - HTTP 集成
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{MatchTier, TaxType};

// 领域实体
pub use domain::{
    CellValue, ImportJob, ImportReport, Item, NewItem, RawRecord, ResolvedRecord, RowErrorEntry,
    RowOutcome, TaxReferenceSet, UploadedFile,
};

// 导入器
pub use importer::{CatalogImporter, CatalogImporterImpl, ImportError, RowError};

// API
pub use api::{ApiError, ImportApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "商品目录导入系统";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
