// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供测试所需的数据库初始化、税率种子数据、压缩包构造等功能
// ==========================================

#![allow(dead_code)]

use async_trait::async_trait;
use catalog_import::config::ConfigManager;
use catalog_import::db::{ensure_schema, open_sqlite_connection};
use catalog_import::domain::{ImportJob, NewItem, TaxType, UploadedFile};
use catalog_import::importer::{
    AssetResolver, CatalogImporterImpl, ConflictHandlerImpl, DqValidatorImpl, FieldMapperImpl,
    RecordWriter, RecordWriterImpl, RowError, RowResult, UniversalFileParser,
};
use catalog_import::repository::{ItemRepositoryImpl, TaxRateRepositoryImpl};
use catalog_import::storage::{BlobStore, LocalFsBlobStore, StorageError, StorageResult};
use rusqlite::Connection;
use std::io::Write;
use std::sync::{Arc, Mutex};
use tempfile::{NamedTempFile, TempDir};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

pub const TENANT: &str = "tenant-001";

pub type TestImporter = CatalogImporterImpl<TaxRateRepositoryImpl, ConfigManager>;

/// 测试环境（临时数据库 + 临时图片目录，需要保持存活）
pub struct TestEnv {
    _db_file: NamedTempFile,
    pub db_path: String,
    pub storage_dir: TempDir,
    pub conn: Arc<Mutex<Connection>>,
    pub item_repo: Arc<ItemRepositoryImpl>,
    pub tax_repo: Arc<TaxRateRepositoryImpl>,
    pub config: Arc<ConfigManager>,
}

impl TestEnv {
    /// 创建临时数据库并初始化 schema
    pub fn new() -> Self {
        let db_file = NamedTempFile::new().expect("创建临时数据库失败");
        let db_path = db_file.path().to_str().unwrap().to_string();
        let storage_dir = TempDir::new().expect("创建临时图片目录失败");

        let conn = open_sqlite_connection(&db_path).expect("打开数据库失败");
        ensure_schema(&conn).expect("建表失败");
        let conn = Arc::new(Mutex::new(conn));

        let item_repo = Arc::new(ItemRepositoryImpl::from_connection(conn.clone()));
        let tax_repo = Arc::new(TaxRateRepositoryImpl::from_connection(conn.clone()));
        let config =
            Arc::new(ConfigManager::from_connection(conn.clone()).expect("创建ConfigManager失败"));

        Self {
            _db_file: db_file,
            db_path,
            storage_dir,
            conn,
            item_repo,
            tax_repo,
            config,
        }
    }

    /// 写入税率参考数据（均为有效）
    pub fn seed_tax_rates(&self, tenant_id: &str, tax_type: TaxType, rates: &[f64]) {
        for rate in rates {
            self.tax_repo
                .insert_tax_rate(tenant_id, tax_type, *rate, true)
                .expect("写入税率失败");
        }
    }

    pub fn set_config(&self, key: &str, value: &str) {
        self.config
            .set_config_value(key, value)
            .expect("写入配置失败");
    }

    /// 使用默认组件装配导入器（图片写入临时目录）
    pub fn importer(&self) -> TestImporter {
        let blob_store = Arc::new(self.blob_store());
        CatalogImporterImpl::with_defaults(
            self.item_repo.clone(),
            self.tax_repo.clone(),
            self.config.clone(),
            blob_store,
        )
    }

    pub fn blob_store(&self) -> LocalFsBlobStore {
        LocalFsBlobStore::new(self.storage_dir.path().to_path_buf(), "/uploads")
    }

    /// 指定写入器与图片存储装配导入器（用于模拟单行写入失败）
    pub fn importer_with(
        &self,
        record_writer: Box<dyn RecordWriter>,
        blob_store: Arc<dyn BlobStore>,
    ) -> TestImporter {
        CatalogImporterImpl::new(
            self.tax_repo.clone(),
            self.config.clone(),
            Box::new(UniversalFileParser),
            Box::new(FieldMapperImpl::default()),
            Box::new(DqValidatorImpl),
            Box::new(ConflictHandlerImpl::new(self.item_repo.clone())),
            record_writer,
            AssetResolver::new(blob_store),
        )
    }

    /// 真实写入器（包装后可按名称注入失败）
    pub fn record_writer(&self) -> RecordWriterImpl<ItemRepositoryImpl> {
        RecordWriterImpl::new(self.item_repo.clone())
    }

    /// 查询租户下的商品数量
    pub fn count_items(&self, tenant_id: &str) -> i64 {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT COUNT(*) FROM items WHERE tenant_id = ?1",
            [tenant_id],
            |row| row.get(0),
        )
        .unwrap()
    }

    /// 临时图片目录下的文件数（递归）
    pub fn stored_file_count(&self) -> usize {
        fn walk(dir: &std::path::Path) -> usize {
            std::fs::read_dir(dir)
                .map(|entries| {
                    entries
                        .filter_map(|e| e.ok())
                        .map(|e| {
                            let path = e.path();
                            if path.is_dir() {
                                walk(&path)
                            } else {
                                1
                            }
                        })
                        .sum()
                })
                .unwrap_or(0)
        }
        walk(self.storage_dir.path())
    }
}

// ==========================================
// 故障注入
// ==========================================

/// 指定名称的商品写入失败，其余委托给真实写入器
pub struct FailingRecordWriter<W: RecordWriter> {
    pub inner: W,
    pub fail_name: &'static str,
}

#[async_trait]
impl<W: RecordWriter> RecordWriter for FailingRecordWriter<W> {
    async fn write(&self, item: NewItem) -> RowResult<String> {
        if item.name == self.fail_name {
            return Err(RowError::Store("database is locked".to_string()));
        }
        self.inner.write(item).await
    }
}

/// 路径包含指定片段时写入失败，其余委托给本地存储
pub struct FailingBlobStore {
    pub inner: LocalFsBlobStore,
    pub fail_fragment: &'static str,
}

#[async_trait]
impl BlobStore for FailingBlobStore {
    async fn write(&self, relative_path: &str, bytes: &[u8]) -> StorageResult<()> {
        if relative_path.contains(self.fail_fragment) {
            return Err(StorageError::Io(std::io::Error::other("disk full")));
        }
        self.inner.write(relative_path, bytes).await
    }

    async fn delete(&self, relative_path: &str) -> StorageResult<()> {
        self.inner.delete(relative_path).await
    }

    fn public_url(&self, relative_path: &str) -> String {
        self.inner.public_url(relative_path)
    }
}

/// 构造内存 ZIP
pub fn build_zip(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = ZipWriter::new(std::io::Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    for (name, bytes) in entries {
        writer.start_file(*name, options).unwrap();
        writer.write_all(bytes).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

pub fn empty_zip() -> Vec<u8> {
    build_zip(&[])
}

/// CSV + ZIP 导入任务
pub fn csv_job(tenant_id: &str, csv: &str, zip: Vec<u8>) -> ImportJob {
    ImportJob::new(
        tenant_id,
        UploadedFile::new("items.csv", csv.as_bytes().to_vec()),
        UploadedFile::new("images.zip", zip),
    )
}
