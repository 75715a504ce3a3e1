// ==========================================
// 商品目录导入系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// ==========================================

use crate::api::ImportApi;
use crate::config::{ConfigManager, ImportConfigReader};
use crate::db::{ensure_schema, open_sqlite_connection, read_schema_version, CURRENT_SCHEMA_VERSION};
use crate::importer::CatalogImporterImpl;
use crate::repository::{ItemRepositoryImpl, TaxRateRepositoryImpl};
use crate::storage::LocalFsBlobStore;
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

/// 数据库路径环境变量
pub const DB_PATH_ENV: &str = "CATALOG_IMPORT_DB_PATH";
/// 监听地址环境变量
pub const BIND_ADDR_ENV: &str = "CATALOG_IMPORT_BIND_ADDR";
/// 请求体上限环境变量（字节）
pub const MAX_BODY_BYTES_ENV: &str = "CATALOG_IMPORT_MAX_BODY_BYTES";

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
pub const DEFAULT_MAX_BODY_BYTES: usize = 64 * 1024 * 1024;

// ==========================================
// ServerConfig - 进程启动配置（环境变量）
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub db_path: String,
    pub bind_addr: String,
    pub max_body_bytes: usize,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let bind_addr = non_empty_env(BIND_ADDR_ENV).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());

        let max_body_bytes = match non_empty_env(MAX_BODY_BYTES_ENV) {
            Some(raw) => raw.parse::<usize>().unwrap_or_else(|_| {
                tracing::warn!(value = %raw, "请求体上限无法解析，使用默认值");
                DEFAULT_MAX_BODY_BYTES
            }),
            None => DEFAULT_MAX_BODY_BYTES,
        };

        Self {
            db_path: get_default_db_path(),
            bind_addr,
            max_body_bytes,
        }
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// 应用状态
///
/// 包含API实例和共享资源，作为 axum 路由状态
#[derive(Clone)]
pub struct AppState {
    /// 数据库路径
    pub db_path: String,
    /// 商品导入API
    pub import_api: Arc<ImportApi>,
    /// 税率仓储（参考数据维护）
    pub tax_rate_repo: Arc<TaxRateRepositoryImpl>,
    /// 进程级关闭信号（导入任务在行间检查）
    pub shutdown: CancellationToken,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 说明
    /// 该方法会：
    /// 1. 打开数据库并建表
    /// 2. 初始化所有Repository（共享同一连接）
    /// 3. 按配置创建图片存储
    /// 4. 创建API实例
    pub async fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let conn = open_sqlite_connection(&db_path).map_err(|e| format!("无法打开数据库: {}", e))?;
        ensure_schema(&conn).map_err(|e| format!("建表失败: {}", e))?;

        match read_schema_version(&conn) {
            Ok(Some(v)) if v == CURRENT_SCHEMA_VERSION => {}
            Ok(v) => tracing::warn!(
                found = ?v,
                expected = CURRENT_SCHEMA_VERSION,
                "schema_version 与代码不一致"
            ),
            Err(e) => tracing::warn!("schema_version 读取失败(将继续启动): {}", e),
        }

        let conn = Arc::new(Mutex::new(conn));

        // ==========================================
        // 初始化Repository层
        // ==========================================
        let item_repo = Arc::new(ItemRepositoryImpl::from_connection(conn.clone()));
        let tax_rate_repo = Arc::new(TaxRateRepositoryImpl::from_connection(conn.clone()));
        let config = Arc::new(
            ConfigManager::from_connection(conn.clone())
                .map_err(|e| format!("无法创建ConfigManager: {}", e))?,
        );

        // ==========================================
        // 图片存储
        // ==========================================
        let storage_dir = config
            .get_asset_storage_dir()
            .await
            .map_err(|e| format!("读取图片存储目录失败: {}", e))?;
        let public_root = config
            .get_public_asset_root()
            .await
            .map_err(|e| format!("读取图片公共地址失败: {}", e))?;
        tracing::info!(storage_dir = %storage_dir, public_root = %public_root, "图片存储已配置");
        let blob_store = Arc::new(LocalFsBlobStore::new(storage_dir, public_root));

        // ==========================================
        // 创建API实例
        // ==========================================
        let importer = CatalogImporterImpl::with_defaults(
            item_repo,
            tax_rate_repo.clone(),
            config,
            blob_store,
        );
        let import_api = Arc::new(ImportApi::new(Arc::new(importer)));

        tracing::info!("AppState初始化完成");

        Ok(Self {
            db_path,
            import_api,
            tax_rate_repo,
            shutdown: CancellationToken::new(),
        })
    }
}

/// 获取默认数据库路径
///
/// 优先使用环境变量 CATALOG_IMPORT_DB_PATH，否则放在用户数据目录下
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Some(path) = non_empty_env(DB_PATH_ENV) {
        return path;
    }

    let mut path = PathBuf::from("./catalog_import.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("catalog-import");
        // 目录创建失败时退回当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("catalog_import.db");
        }
    }

    path.to_string_lossy().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_default_db_path() {
        let path = get_default_db_path();
        assert!(!path.is_empty());
        assert!(path.ends_with(".db"));
    }

    #[tokio::test]
    async fn test_app_state_bootstraps_schema() {
        let dir = tempfile::TempDir::new().unwrap();
        let db_path = dir.path().join("state.db").to_string_lossy().to_string();

        let state = AppState::new(db_path.clone()).await.unwrap();
        assert_eq!(state.db_path, db_path);

        let conn = open_sqlite_connection(&db_path).unwrap();
        assert_eq!(
            read_schema_version(&conn).unwrap(),
            Some(CURRENT_SCHEMA_VERSION)
        );
    }
}
