// ==========================================
// 商品目录导入系统 - 导入配置读取 Trait
// ==========================================
// 职责: 定义导入模块所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use async_trait::async_trait;
use std::error::Error;

pub type ConfigResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

// ==========================================
// ImportConfigReader Trait
// ==========================================
// 用途: 导入模块所需的配置读取接口
// 实现者: ConfigManager（从 config_kv 表读取）
#[async_trait]
pub trait ImportConfigReader: Send + Sync {
    // ===== 图片存储 =====

    /// 图片公共访问地址前缀
    ///
    /// # 默认值
    /// - "/uploads"
    async fn get_public_asset_root(&self) -> ConfigResult<String>;

    /// 图片落盘根目录
    ///
    /// # 默认值
    /// - "uploads"
    async fn get_asset_storage_dir(&self) -> ConfigResult<String>;

    /// 引用路径无扩展名时使用的扩展名
    ///
    /// # 默认值
    /// - ".jpg"
    async fn get_default_image_extension(&self) -> ConfigResult<String>;

    // ===== 任务预算 =====

    /// 单次导入最大行数
    ///
    /// # 默认值
    /// - 10000
    async fn get_max_import_rows(&self) -> ConfigResult<usize>;

    /// 单次导入最长执行时间（秒）
    ///
    /// # 默认值
    /// - 300
    async fn get_job_timeout_secs(&self) -> ConfigResult<u64>;

    // ===== 字段解析 =====

    /// 是否启用子串列名匹配
    ///
    /// # 默认值
    /// - true
    async fn get_substring_match_enabled(&self) -> ConfigResult<bool>;
}
