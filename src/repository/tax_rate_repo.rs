// ==========================================
// 商品目录导入系统 - 税率 Repository
// ==========================================
// 职责: 读取租户有效税率（参考数据），维护 tax_rates 表
// 红线: 只做数据访问，不做税率合法性判断
// ==========================================

use crate::domain::tax::TaxReferenceSet;
use crate::domain::types::TaxType;
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};
use tracing::warn;

// ==========================================
// TaxRateRepository Trait
// ==========================================
#[async_trait]
pub trait TaxRateRepository: Send + Sync {
    /// 读取租户当前有效税率，按税种分组
    async fn get_active_tax_rates(&self, tenant_id: &str) -> RepositoryResult<TaxReferenceSet>;
}

// ==========================================
// TaxRateRepositoryImpl
// ==========================================
pub struct TaxRateRepositoryImpl {
    conn: Arc<Mutex<Connection>>,
}

impl TaxRateRepositoryImpl {
    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 新增一条税率
    pub fn insert_tax_rate(
        &self,
        tenant_id: &str,
        tax_type: TaxType,
        rate: f64,
        is_active: bool,
    ) -> RepositoryResult<i64> {
        if !rate.is_finite() || rate < 0.0 {
            return Err(RepositoryError::FieldValueError {
                field: "rate".to_string(),
                message: format!("税率非法: {}", rate),
            });
        }

        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO tax_rates (tenant_id, tax_type, rate, is_active) VALUES (?1, ?2, ?3, ?4)",
            params![tenant_id, tax_type.as_str(), rate, is_active as i64],
        )?;
        Ok(conn.last_insert_rowid())
    }
}

#[async_trait]
impl TaxRateRepository for TaxRateRepositoryImpl {
    async fn get_active_tax_rates(&self, tenant_id: &str) -> RepositoryResult<TaxReferenceSet> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT tax_type, rate
            FROM tax_rates
            WHERE tenant_id = ?1 AND is_active = 1
            ORDER BY tax_type, rate
            "#,
        )?;

        let rows = stmt.query_map(params![tenant_id], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, f64>(1)?))
        })?;

        let mut set = TaxReferenceSet::default();
        for row in rows {
            let (raw_type, rate) = row?;
            match TaxType::from_str_opt(&raw_type) {
                Some(tax_type) => set.push(tax_type, rate),
                None => warn!(tenant_id, tax_type = %raw_type, "忽略未知税种"),
            }
        }

        Ok(set)
    }
}
