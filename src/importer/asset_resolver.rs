// ==========================================
// 商品目录导入系统 - 图片解析与落盘
// ==========================================
// 职责: 引用路径 → 压缩包条目 → 唯一文件名落盘 → 公共地址
// 文件名: <原文件名主干>_<uuid><扩展名>，目录沿用条目所在目录
// ==========================================

use crate::importer::archive_indexer::{ArchiveIndex, AssetHandle};
use crate::importer::error::{RowError, RowResult};
use crate::storage::BlobStore;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

// ==========================================
// StoredAsset - 已落盘图片
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredAsset {
    pub storage_path: String, // 存储相对路径
    pub public_url: String,   // 公共访问地址
}

/// 生成目标相对路径（同目录，唯一文件名）
pub fn build_destination(entry_name: &str, token: &str, default_ext: &str) -> String {
    let mut name = entry_name.replace('\\', "/");
    while let Some(rest) = name.strip_prefix("./").or_else(|| name.strip_prefix('/')) {
        name = rest.to_string();
    }

    let (dir, file_name) = match name.rfind('/') {
        Some(pos) => (&name[..pos], &name[pos + 1..]),
        None => ("", name.as_str()),
    };

    // 仅把最后一个 '.' 之后视为扩展名；以 '.' 开头的文件名视为无扩展名
    let (stem, ext) = match file_name.rfind('.') {
        Some(pos) if pos > 0 => (&file_name[..pos], file_name[pos..].to_string()),
        _ => (file_name, default_ext.to_string()),
    };

    let unique = format!("{}_{}{}", stem, token, ext);
    if dir.is_empty() {
        unique
    } else {
        format!("{}/{}", dir, unique)
    }
}

pub struct AssetResolver {
    blob_store: Arc<dyn BlobStore>,
}

impl AssetResolver {
    pub fn new(blob_store: Arc<dyn BlobStore>) -> Self {
        Self { blob_store }
    }

    /// 查找、读取并写入图片
    ///
    /// # 返回
    /// - Ok(StoredAsset): 已写入
    /// - Err(ImageNotFound): 压缩包中无此条目
    /// - Err(AssetWrite): 读取或写入失败
    pub async fn resolve(
        &self,
        archive: &mut ArchiveIndex,
        image_path: &str,
        default_ext: &str,
    ) -> RowResult<StoredAsset> {
        let handle: AssetHandle = archive
            .lookup(image_path)
            .ok_or_else(|| RowError::ImageNotFound(image_path.to_string()))?;

        let bytes = archive.extract(&handle).map_err(|e| {
            RowError::AssetWrite(format!("Failed to read image from ZIP: {}", e))
        })?;

        let token = Uuid::new_v4().simple().to_string();
        let storage_path = build_destination(&handle.entry_name, &token, default_ext);

        self.blob_store
            .write(&storage_path, &bytes)
            .await
            .map_err(|e| RowError::AssetWrite(format!("Failed to save image: {}", e)))?;

        let public_url = self.blob_store.public_url(&storage_path);
        debug!(entry = %handle.entry_name, storage_path = %storage_path, "图片已落盘");

        Ok(StoredAsset {
            storage_path,
            public_url,
        })
    }

    /// 撤销已写入的图片（尽力而为，失败只记日志）
    pub async fn discard(&self, asset: &StoredAsset) {
        if let Err(e) = self.blob_store.delete(&asset.storage_path).await {
            warn!(storage_path = %asset.storage_path, error = %e, "图片回滚删除失败");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::LocalFsBlobStore;
    use std::io::{Cursor, Write};
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn archive_with(name: &str, bytes: &[u8]) -> ArchiveIndex {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        writer.start_file(name, SimpleFileOptions::default()).unwrap();
        writer.write_all(bytes).unwrap();
        let data = writer.finish().unwrap().into_inner();
        ArchiveIndex::open(data).unwrap()
    }

    #[test]
    fn test_build_destination() {
        assert_eq!(
            build_destination("images/shoe.png", "abc", ".jpg"),
            "images/shoe_abc.png"
        );
        assert_eq!(build_destination("shoe", "abc", ".jpg"), "shoe_abc.jpg");
        assert_eq!(
            build_destination("./a/b/photo.final.JPEG", "t", ".jpg"),
            "a/b/photo.final_t.JPEG"
        );
        assert_eq!(build_destination(".hidden", "t", ".jpg"), ".hidden_t.jpg");
    }

    #[tokio::test]
    async fn test_resolve_writes_unique_file() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(LocalFsBlobStore::new(dir.path(), "/uploads"));
        let resolver = AssetResolver::new(store);
        let mut archive = archive_with("images/Shoe.png", b"png-bytes");

        let first = resolver
            .resolve(&mut archive, "IMAGES/shoe.png", ".jpg")
            .await
            .unwrap();
        let second = resolver
            .resolve(&mut archive, "images/shoe.png", ".jpg")
            .await
            .unwrap();

        assert_ne!(first.storage_path, second.storage_path);
        assert!(first.storage_path.starts_with("images/Shoe_"));
        assert!(first.storage_path.ends_with(".png"));
        assert_eq!(first.public_url, format!("/uploads/{}", first.storage_path));
        assert_eq!(
            std::fs::read(dir.path().join(&first.storage_path)).unwrap(),
            b"png-bytes"
        );

        resolver.discard(&first).await;
        assert!(!dir.path().join(&first.storage_path).exists());
    }

    #[tokio::test]
    async fn test_missing_image() {
        let dir = TempDir::new().unwrap();
        let resolver = AssetResolver::new(Arc::new(LocalFsBlobStore::new(dir.path(), "/uploads")));
        let mut archive = archive_with("images/a.png", b"x");

        let err = resolver
            .resolve(&mut archive, "images/b.png", ".jpg")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Image not found in ZIP: images/b.png");
    }
}
