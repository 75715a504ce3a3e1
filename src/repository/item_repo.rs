// ==========================================
// 商品目录导入系统 - 商品 Repository Trait
// ==========================================
// 职责: 定义商品记录存储接口（不包含业务逻辑）
// 红线: Repository 不含业务规则，只做数据 CRUD
// ==========================================

use crate::domain::catalog::{Item, NewItem};
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;

// ==========================================
// ItemRepository Trait
// ==========================================
// 用途: 导入管道的查重与写入
// 实现者: ItemRepositoryImpl（使用 rusqlite）
#[async_trait]
pub trait ItemRepository: Send + Sync {
    /// 按 (tenant_id, name) 查询商品
    ///
    /// # 返回
    /// - Ok(Some(Item)): 已存在
    /// - Ok(None): 不存在
    async fn find_one(&self, tenant_id: &str, name: &str) -> RepositoryResult<Option<Item>>;

    /// 插入一条商品记录
    ///
    /// # 返回
    /// - Ok(Item): 带 item_id 与审计时间的落库记录
    /// - Err(UniqueConstraintViolation): 同租户下名称已存在
    async fn create(&self, item: NewItem) -> RepositoryResult<Item>;

    /// 租户商品总数
    async fn count_by_tenant(&self, tenant_id: &str) -> RepositoryResult<usize>;
}
