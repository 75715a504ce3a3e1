// ==========================================
// 商品目录导入系统 - 商品领域模型
// ==========================================
// 用途: 导入管道各阶段的数据形态
// 流转: RawRecord → ResolvedRecord → NewItem → Item
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// CellValue - 单元格标量值
// ==========================================
// CSV 只产生 Text；表格文件保留原始类型
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl CellValue {
    /// 是否为空白（空单元格或纯空白文本）
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Text(s) => write!(f, "{}", s),
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

// ==========================================
// RawRecord - 原始行记录
// ==========================================
// 按表头列顺序保存（列名, 值），列名已去除首尾空白
// 列名不可信：各租户大小写/命名习惯不一致
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    fields: Vec<(String, CellValue)>,
}

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一列；列名统一 trim，同名列保留首次出现的值
    pub fn insert(&mut self, key: &str, value: CellValue) {
        let key = key.trim();
        if key.is_empty() || self.get(key).is_some() {
            return;
        }
        self.fields.push((key.to_string(), value));
    }

    /// 精确列名取值
    pub fn get(&self, key: &str) -> Option<&CellValue> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// 按表头顺序遍历
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// 所有单元格均为空白
    pub fn is_blank(&self) -> bool {
        self.fields.iter().all(|(_, v)| v.is_blank())
    }
}

impl<K: AsRef<str>> FromIterator<(K, CellValue)> for RawRecord {
    fn from_iter<T: IntoIterator<Item = (K, CellValue)>>(iter: T) -> Self {
        let mut record = RawRecord::new();
        for (k, v) in iter {
            record.insert(k.as_ref(), v);
        }
        record
    }
}

// ==========================================
// ResolvedRecord - 字段解析 + 类型转换后的记录
// ==========================================
// 尚未通过业务校验；row_number 为 1 起始
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedRecord {
    pub row_number: usize,

    // ===== 基础信息 =====
    pub name: Option<String>,        // 商品名称（必填）
    pub description: Option<String>, // 描述
    pub unit_type: Option<String>,   // 计量单位
    pub price: f64,                  // 单价（解析失败为 0）
    pub hsn_code: Option<String>,    // HSN 编码

    // ===== 税务 =====
    pub apply_tax: bool, // 是否计税
    pub cgst: f64,
    pub sgst: f64,
    pub igst: f64,

    // ===== 状态与图片 =====
    pub is_active: bool,
    pub image_path: Option<String>, // 压缩包内相对路径
}

// ==========================================
// NewItem - 待写入的商品
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewItem {
    pub tenant_id: String,
    pub name: String,
    pub description: Option<String>,
    pub unit_type: Option<String>,
    pub price: f64,
    pub hsn_code: Option<String>,
    pub apply_tax: bool,
    pub cgst: f64,
    pub sgst: f64,
    pub igst: f64,
    pub is_active: bool,
    pub image_url: Option<String>, // 公共访问地址（无图片为 None）
}

impl NewItem {
    /// 由通过校验的记录构造（name 已确认非空）
    pub fn from_resolved(
        tenant_id: &str,
        name: String,
        record: &ResolvedRecord,
        image_url: Option<String>,
    ) -> Self {
        Self {
            tenant_id: tenant_id.to_string(),
            name,
            description: record.description.clone(),
            unit_type: record.unit_type.clone(),
            price: record.price,
            hsn_code: record.hsn_code.clone(),
            apply_tax: record.apply_tax,
            cgst: record.cgst,
            sgst: record.sgst,
            igst: record.igst,
            is_active: record.is_active,
            image_url,
        }
    }
}

// ==========================================
// Item - 已落库商品
// ==========================================
// 唯一性: (name, tenant_id)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub item_id: String,
    pub tenant_id: String,
    pub name: String,
    pub description: Option<String>,
    pub unit_type: Option<String>,
    pub price: f64,
    pub hsn_code: Option<String>,
    pub apply_tax: bool,
    pub cgst: f64,
    pub sgst: f64,
    pub igst: f64,
    pub is_active: bool,
    pub image_url: Option<String>,

    // ===== 审计字段 =====
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_record_keeps_header_order_and_first_duplicate() {
        let mut record = RawRecord::new();
        record.insert(" Name ", CellValue::from("Widget"));
        record.insert("price", CellValue::Number(10.0));
        record.insert("Name", CellValue::from("Other"));

        let keys: Vec<&str> = record.keys().collect();
        assert_eq!(keys, vec!["Name", "price"]);
        assert_eq!(record.get("Name"), Some(&CellValue::from("Widget")));
    }

    #[test]
    fn test_raw_record_ignores_blank_header() {
        let mut record = RawRecord::new();
        record.insert("   ", CellValue::from("x"));
        assert!(record.is_empty());
    }

    #[test]
    fn test_raw_record_blank_detection() {
        let record: RawRecord = vec![
            ("a", CellValue::Empty),
            ("b", CellValue::from("  ")),
        ]
        .into_iter()
        .collect();
        assert!(record.is_blank());

        let record: RawRecord = vec![("a", CellValue::Number(0.0))].into_iter().collect();
        assert!(!record.is_blank());
    }

    #[test]
    fn test_cell_value_display() {
        assert_eq!(CellValue::Number(7.0).to_string(), "7");
        assert_eq!(CellValue::Number(6.5).to_string(), "6.5");
        assert_eq!(CellValue::Bool(true).to_string(), "true");
        assert_eq!(CellValue::Empty.to_string(), "");
    }
}
