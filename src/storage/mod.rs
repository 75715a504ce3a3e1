// ==========================================
// 商品目录导入系统 - 图片存储层
// ==========================================

pub mod blob_store;

pub use blob_store::{BlobStore, LocalFsBlobStore, StorageError, StorageResult};
