// ==========================================
// 商品目录导入系统 - 压缩包索引
// ==========================================
// 职责: 打开 ZIP，建立 规范化路径 → 条目 的查找表
// 规范化: '\' → '/'，去掉开头的 "./" 与 "/"，转小写
// 约束: 目录条目跳过；越界条目（zip-slip）跳过；重复键保留首个
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use std::collections::HashMap;
use std::io::{Cursor, Read};
use tracing::{debug, warn};
use zip::result::ZipError;
use zip::ZipArchive;

/// 规范化压缩包路径（条目名与引用路径使用同一规则）
pub fn normalize_archive_path(path: &str) -> String {
    let mut normalized = path.trim().replace('\\', "/");
    loop {
        if let Some(rest) = normalized.strip_prefix("./") {
            normalized = rest.to_string();
        } else if let Some(rest) = normalized.strip_prefix('/') {
            normalized = rest.to_string();
        } else {
            break;
        }
    }
    normalized.to_lowercase()
}

// ==========================================
// AssetHandle - 条目句柄
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetHandle {
    pub index: usize,       // 条目在压缩包中的序号
    pub entry_name: String, // 原始条目名（保留大小写）
}

// ==========================================
// ArchiveIndex - 任务期间只读的图片索引
// ==========================================
pub struct ArchiveIndex {
    archive: ZipArchive<Cursor<Vec<u8>>>,
    entries: HashMap<String, AssetHandle>,
}

impl ArchiveIndex {
    /// 打开压缩包并建立索引
    ///
    /// # 返回
    /// - Err(ArchiveOpenError): 非法 ZIP（任务级失败）
    pub fn open(bytes: Vec<u8>) -> ImportResult<Self> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))?;
        let mut entries: HashMap<String, AssetHandle> = HashMap::new();

        for index in 0..archive.len() {
            let file = archive
                .by_index(index)
                .map_err(|e| ImportError::ArchiveOpenError(e.to_string()))?;

            if file.is_dir() {
                continue;
            }

            let entry_name = file.name().to_string();
            if file.enclosed_name().is_none() {
                warn!(entry = %entry_name, "跳过越界压缩包条目");
                continue;
            }

            let key = normalize_archive_path(&entry_name);
            if let Some(existing) = entries.get(&key) {
                warn!(
                    entry = %entry_name,
                    kept = %existing.entry_name,
                    "规范化后路径重复，保留首个条目"
                );
                continue;
            }

            entries.insert(key, AssetHandle { index, entry_name });
        }

        debug!(entries = entries.len(), "压缩包索引完成");
        Ok(Self { archive, entries })
    }

    /// 按引用路径查找（规范化后比较）
    pub fn lookup(&self, path: &str) -> Option<AssetHandle> {
        self.entries.get(&normalize_archive_path(path)).cloned()
    }

    /// 读取条目内容
    pub fn extract(&mut self, handle: &AssetHandle) -> Result<Vec<u8>, ZipError> {
        let mut file = self.archive.by_index(handle.index)?;
        // 不按条目头声明的大小预分配
        let mut buf = Vec::new();
        file.read_to_end(&mut buf)?;
        Ok(buf)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
