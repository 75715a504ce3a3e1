// ==========================================
// 商品目录导入系统 - 商品 Repository 实现
// ==========================================
// 职责: 实现 items 表数据访问（使用 rusqlite）
// 红线: Repository 不含业务规则，只做数据 CRUD
// ==========================================

use crate::domain::catalog::{Item, NewItem};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::item_repo::ItemRepository;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

// ==========================================
// ItemRepositoryImpl
// ==========================================
pub struct ItemRepositoryImpl {
    conn: Arc<Mutex<Connection>>,
}

impl ItemRepositoryImpl {
    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn parse_timestamp(raw: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now())
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<Item> {
        Ok(Item {
            item_id: row.get(0)?,
            tenant_id: row.get(1)?,
            name: row.get(2)?,
            description: row.get(3)?,
            unit_type: row.get(4)?,
            price: row.get(5)?,
            hsn_code: row.get(6)?,
            apply_tax: row.get::<_, i64>(7)? != 0,
            cgst: row.get(8)?,
            sgst: row.get(9)?,
            igst: row.get(10)?,
            is_active: row.get::<_, i64>(11)? != 0,
            image_url: row.get(12)?,
            created_at: Self::parse_timestamp(&row.get::<_, String>(13)?),
            updated_at: Self::parse_timestamp(&row.get::<_, String>(14)?),
        })
    }
}

const SELECT_COLUMNS: &str = r#"
    item_id, tenant_id, name, description, unit_type, price, hsn_code,
    apply_tax, cgst, sgst, igst, is_active, image_url, created_at, updated_at
"#;

#[async_trait]
impl ItemRepository for ItemRepositoryImpl {
    async fn find_one(&self, tenant_id: &str, name: &str) -> RepositoryResult<Option<Item>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM items WHERE tenant_id = ?1 AND name = ?2",
            SELECT_COLUMNS
        );

        let item = conn
            .query_row(&sql, params![tenant_id, name], Self::map_row)
            .optional()?;
        Ok(item)
    }

    async fn create(&self, item: NewItem) -> RepositoryResult<Item> {
        let now = Utc::now();
        let item_id = Uuid::new_v4().to_string();

        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO items (
                item_id, tenant_id, name, description, unit_type, price, hsn_code,
                apply_tax, cgst, sgst, igst, is_active, image_url, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
            "#,
            params![
                item_id,
                item.tenant_id,
                item.name,
                item.description,
                item.unit_type,
                item.price,
                item.hsn_code,
                item.apply_tax as i64,
                item.cgst,
                item.sgst,
                item.igst,
                item.is_active as i64,
                item.image_url,
                now.to_rfc3339(),
                now.to_rfc3339(),
            ],
        )?;

        Ok(Item {
            item_id,
            tenant_id: item.tenant_id,
            name: item.name,
            description: item.description,
            unit_type: item.unit_type,
            price: item.price,
            hsn_code: item.hsn_code,
            apply_tax: item.apply_tax,
            cgst: item.cgst,
            sgst: item.sgst,
            igst: item.igst,
            is_active: item.is_active,
            image_url: item.image_url,
            created_at: now,
            updated_at: now,
        })
    }

    async fn count_by_tenant(&self, tenant_id: &str) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM items WHERE tenant_id = ?1",
            params![tenant_id],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::ensure_schema;

    fn repo() -> ItemRepositoryImpl {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        ItemRepositoryImpl::from_connection(Arc::new(Mutex::new(conn)))
    }

    fn new_item(tenant: &str, name: &str) -> NewItem {
        NewItem {
            tenant_id: tenant.to_string(),
            name: name.to_string(),
            description: Some("desc".to_string()),
            unit_type: None,
            price: 12.5,
            hsn_code: Some("8471".to_string()),
            apply_tax: true,
            cgst: 6.0,
            sgst: 6.0,
            igst: 0.0,
            is_active: true,
            image_url: None,
        }
    }

    #[tokio::test]
    async fn test_create_then_find_one() {
        let repo = repo();
        let created = repo.create(new_item("t1", "Widget")).await.unwrap();

        let found = repo.find_one("t1", "Widget").await.unwrap().unwrap();
        assert_eq!(found.item_id, created.item_id);
        assert_eq!(found.price, 12.5);
        assert!(found.apply_tax);
        assert_eq!(found.hsn_code, Some("8471".to_string()));

        assert!(repo.find_one("t2", "Widget").await.unwrap().is_none());
        assert!(repo.find_one("t1", "widget").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_duplicate_is_unique_violation() {
        let repo = repo();
        repo.create(new_item("t1", "Widget")).await.unwrap();

        let err = repo.create(new_item("t1", "Widget")).await.unwrap_err();
        assert!(matches!(err, RepositoryError::UniqueConstraintViolation(_)));

        repo.create(new_item("t2", "Widget")).await.unwrap();
        assert_eq!(repo.count_by_tenant("t1").await.unwrap(), 1);
        assert_eq!(repo.count_by_tenant("t2").await.unwrap(), 1);
    }
}
