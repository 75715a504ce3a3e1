// ==========================================
// 商品目录导入系统 - 领域类型定义
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 税种 (Tax Type)
// ==========================================
// 三个税种各自维护参考税率集合,校验时按税种分别比对
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaxType {
    Cgst, // 中央商品服务税
    Sgst, // 邦商品服务税
    Igst, // 跨邦商品服务税
}

impl TaxType {
    pub const ALL: [TaxType; 3] = [TaxType::Cgst, TaxType::Sgst, TaxType::Igst];

    /// 数据库存储值
    pub fn as_str(&self) -> &'static str {
        match self {
            TaxType::Cgst => "CGST",
            TaxType::Sgst => "SGST",
            TaxType::Igst => "IGST",
        }
    }

    /// 从数据库存储值解析（大小写不敏感）
    pub fn from_str_opt(raw: &str) -> Option<Self> {
        match raw.trim().to_uppercase().as_str() {
            "CGST" => Some(TaxType::Cgst),
            "SGST" => Some(TaxType::Sgst),
            "IGST" => Some(TaxType::Igst),
            _ => None,
        }
    }
}

impl fmt::Display for TaxType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 列名匹配层级 (Match Tier)
// ==========================================
// 优先级: 精确 > 忽略大小写 > 子串
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MatchTier {
    Exact,           // 精确匹配
    CaseInsensitive, // 忽略大小写匹配
    Substring,       // 子串匹配（最易误配，需留痕）
}

impl fmt::Display for MatchTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchTier::Exact => write!(f, "EXACT"),
            MatchTier::CaseInsensitive => write!(f, "CASE_INSENSITIVE"),
            MatchTier::Substring => write!(f, "SUBSTRING"),
        }
    }
}
