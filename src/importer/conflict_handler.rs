// ==========================================
// 商品目录导入系统 - 查重与写入
// ==========================================
// 查重: 同租户下按名称精确匹配（区分大小写）
// 写入: 存储层唯一约束冲突同样判定为重复（并发导入的最终防线）
// ==========================================

use crate::domain::catalog::NewItem;
use crate::importer::catalog_importer_trait::{
    ConflictHandler as ConflictHandlerTrait, RecordWriter as RecordWriterTrait,
};
use crate::importer::error::{RowError, RowResult};
use crate::repository::{ItemRepository, RepositoryError};
use async_trait::async_trait;
use std::sync::Arc;

// ==========================================
// ConflictHandler - 租户内查重
// ==========================================
pub struct ConflictHandler<R: ItemRepository> {
    item_repo: Arc<R>,
}

impl<R: ItemRepository> ConflictHandler<R> {
    pub fn new(item_repo: Arc<R>) -> Self {
        Self { item_repo }
    }
}

#[async_trait]
impl<R: ItemRepository> ConflictHandlerTrait for ConflictHandler<R> {
    async fn check_duplicate(&self, tenant_id: &str, name: &str) -> RowResult<()> {
        match self.item_repo.find_one(tenant_id, name).await {
            Ok(Some(_)) => Err(RowError::Duplicate),
            Ok(None) => Ok(()),
            Err(e) => Err(RowError::Store(e.to_string())),
        }
    }
}

// ==========================================
// RecordWriter - 商品落库
// ==========================================
pub struct RecordWriter<R: ItemRepository> {
    item_repo: Arc<R>,
}

impl<R: ItemRepository> RecordWriter<R> {
    pub fn new(item_repo: Arc<R>) -> Self {
        Self { item_repo }
    }
}

#[async_trait]
impl<R: ItemRepository> RecordWriterTrait for RecordWriter<R> {
    async fn write(&self, item: NewItem) -> RowResult<String> {
        match self.item_repo.create(item).await {
            Ok(created) => Ok(created.item_id),
            Err(RepositoryError::UniqueConstraintViolation(_)) => Err(RowError::Duplicate),
            Err(e) => Err(RowError::Store(e.to_string())),
        }
    }
}
