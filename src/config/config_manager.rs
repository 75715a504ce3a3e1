// ==========================================
// 商品目录导入系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::import_config_trait::{ConfigResult, ImportConfigReader};
use crate::db::open_sqlite_connection;
use async_trait::async_trait;
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};
use tracing::warn;

const GLOBAL_SCOPE: &str = "global";

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> ConfigResult<Self> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> ConfigResult<Self> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    fn get_config_value(&self, key: &str) -> ConfigResult<Option<String>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = ?1 AND key = ?2",
            params![GLOBAL_SCOPE, key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 从 config_kv 表读取配置值，带默认值
    fn get_config_or_default(&self, key: &str, default: &str) -> ConfigResult<String> {
        Ok(self
            .get_config_value(key)?
            .unwrap_or_else(|| default.to_string()))
    }

    /// 读取并解析配置；解析失败回落默认值并告警
    fn get_parsed_or_default<T>(&self, key: &str, default: T) -> ConfigResult<T>
    where
        T: std::str::FromStr + Copy + std::fmt::Display,
    {
        match self.get_config_value(key)? {
            None => Ok(default),
            Some(raw) => match raw.trim().parse::<T>() {
                Ok(v) => Ok(v),
                Err(_) => {
                    warn!(key, value = %raw, default = %default, "配置值无法解析，使用默认值");
                    Ok(default)
                }
            },
        }
    }

    /// 写入 global scope 配置（UPSERT）
    pub fn set_config_value(&self, key: &str, value: &str) -> ConfigResult<()> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value, updated_at)
             VALUES (?1, ?2, ?3, datetime('now'))
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?3, updated_at = datetime('now')",
            params![GLOBAL_SCOPE, key, value],
        )?;
        Ok(())
    }
}

#[async_trait]
impl ImportConfigReader for ConfigManager {
    // ===== 图片存储 =====

    async fn get_public_asset_root(&self) -> ConfigResult<String> {
        self.get_config_or_default(config_keys::PUBLIC_ASSET_ROOT, defaults::PUBLIC_ASSET_ROOT)
    }

    async fn get_asset_storage_dir(&self) -> ConfigResult<String> {
        self.get_config_or_default(config_keys::ASSET_STORAGE_DIR, defaults::ASSET_STORAGE_DIR)
    }

    async fn get_default_image_extension(&self) -> ConfigResult<String> {
        let value = self.get_config_or_default(
            config_keys::DEFAULT_IMAGE_EXTENSION,
            defaults::DEFAULT_IMAGE_EXTENSION,
        )?;
        let value = value.trim();
        // 统一为带点的形式
        if value.is_empty() {
            Ok(defaults::DEFAULT_IMAGE_EXTENSION.to_string())
        } else if value.starts_with('.') {
            Ok(value.to_string())
        } else {
            Ok(format!(".{}", value))
        }
    }

    // ===== 任务预算 =====

    async fn get_max_import_rows(&self) -> ConfigResult<usize> {
        self.get_parsed_or_default(config_keys::MAX_IMPORT_ROWS, defaults::MAX_IMPORT_ROWS)
    }

    async fn get_job_timeout_secs(&self) -> ConfigResult<u64> {
        self.get_parsed_or_default(config_keys::JOB_TIMEOUT_SECS, defaults::JOB_TIMEOUT_SECS)
    }

    // ===== 字段解析 =====

    async fn get_substring_match_enabled(&self) -> ConfigResult<bool> {
        let value = self.get_config_or_default(config_keys::SUBSTRING_MATCH_ENABLED, "true")?;
        match value.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" => Ok(false),
            other => {
                warn!(value = other, "substring_match_enabled 无法解析，使用默认值 true");
                Ok(defaults::SUBSTRING_MATCH_ENABLED)
            }
        }
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 图片存储
    pub const PUBLIC_ASSET_ROOT: &str = "public_asset_root";
    pub const ASSET_STORAGE_DIR: &str = "asset_storage_dir";
    pub const DEFAULT_IMAGE_EXTENSION: &str = "default_image_extension";

    // 任务预算
    pub const MAX_IMPORT_ROWS: &str = "max_import_rows";
    pub const JOB_TIMEOUT_SECS: &str = "job_timeout_secs";

    // 字段解析
    pub const SUBSTRING_MATCH_ENABLED: &str = "substring_match_enabled";
}

// ==========================================
// 配置默认值
// ==========================================
pub mod defaults {
    pub const PUBLIC_ASSET_ROOT: &str = "/uploads";
    pub const ASSET_STORAGE_DIR: &str = "uploads";
    pub const DEFAULT_IMAGE_EXTENSION: &str = ".jpg";
    pub const MAX_IMPORT_ROWS: usize = 10_000;
    pub const JOB_TIMEOUT_SECS: u64 = 300;
    pub const SUBSTRING_MATCH_ENABLED: bool = true;
}
