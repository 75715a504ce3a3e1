// ==========================================
// 商品目录导入系统 - 图片存储
// ==========================================
// 职责: 按相对路径写入/删除图片字节，生成公共访问地址
// 约束: 相对路径不得为绝对路径，不得包含 ".."
// ==========================================

use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// 存储层错误类型
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("非法存储路径: {0}")]
    InvalidPath(String),

    #[error("文件读写失败: {0}")]
    Io(#[from] std::io::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

// ==========================================
// BlobStore Trait
// ==========================================
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// 写入字节（父目录不存在时自动创建）
    async fn write(&self, relative_path: &str, bytes: &[u8]) -> StorageResult<()>;

    /// 删除（不存在视为成功）
    async fn delete(&self, relative_path: &str) -> StorageResult<()>;

    /// 公共访问地址
    fn public_url(&self, relative_path: &str) -> String;
}

// ==========================================
// LocalFsBlobStore - 本地文件系统实现
// ==========================================
pub struct LocalFsBlobStore {
    root: PathBuf,
    public_root: String,
}

impl LocalFsBlobStore {
    pub fn new(root: impl Into<PathBuf>, public_root: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_root: public_root.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// 相对路径 → 磁盘绝对路径（拒绝越界路径）
    fn resolve(&self, relative_path: &str) -> StorageResult<PathBuf> {
        let rel = Path::new(relative_path);
        if relative_path.trim().is_empty() {
            return Err(StorageError::InvalidPath(relative_path.to_string()));
        }
        for component in rel.components() {
            match component {
                Component::Normal(_) | Component::CurDir => {}
                _ => return Err(StorageError::InvalidPath(relative_path.to_string())),
            }
        }
        Ok(self.root.join(rel))
    }
}

#[async_trait]
impl BlobStore for LocalFsBlobStore {
    async fn write(&self, relative_path: &str, bytes: &[u8]) -> StorageResult<()> {
        let path = self.resolve(relative_path)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, bytes).await?;
        debug!(path = %path.display(), size = bytes.len(), "图片已写入");
        Ok(())
    }

    async fn delete(&self, relative_path: &str) -> StorageResult<()> {
        let path = self.resolve(relative_path)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn public_url(&self, relative_path: &str) -> String {
        let root = self.public_root.trim_end_matches('/');
        let rel = relative_path.replace('\\', "/");
        format!("{}/{}", root, rel.trim_start_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_creates_directories_and_delete_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let store = LocalFsBlobStore::new(dir.path(), "/uploads");

        store.write("images/shoe_1.png", b"png").await.unwrap();
        let on_disk = dir.path().join("images/shoe_1.png");
        assert_eq!(std::fs::read(&on_disk).unwrap(), b"png");

        store.delete("images/shoe_1.png").await.unwrap();
        assert!(!on_disk.exists());
        store.delete("images/shoe_1.png").await.unwrap();
    }

    #[tokio::test]
    async fn test_rejects_escaping_paths() {
        let dir = TempDir::new().unwrap();
        let store = LocalFsBlobStore::new(dir.path(), "/uploads");

        for bad in ["../evil.png", "/etc/passwd", "a/../../b.png", ""] {
            assert!(
                matches!(store.write(bad, b"x").await, Err(StorageError::InvalidPath(_))),
                "{bad} 应被拒绝"
            );
        }
    }

    #[test]
    fn test_public_url() {
        let store = LocalFsBlobStore::new("/tmp/x", "/uploads/");
        assert_eq!(store.public_url("images/a.png"), "/uploads/images/a.png");
        assert_eq!(store.public_url("a.png"), "/uploads/a.png");
    }
}
