// ==========================================
// 商品目录导入系统 - 数据清洗器实现
// ==========================================
// 职责: TRIM / 空值标准化 / 宽松数值与布尔转换
// 数值规则: 仅保留数字、'.'、'-' 后解析，失败按 0 处理（不判行失败）
// ==========================================

use crate::domain::catalog::CellValue;
use crate::importer::catalog_importer_trait::DataCleaner as DataCleanerTrait;

pub struct DataCleaner;

impl DataCleaner {
    /// 去除数字、'.'、'-' 以外的全部字符
    pub fn strip_numeric_noise(value: &str) -> String {
        value
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
            .collect()
    }
}

impl DataCleanerTrait for DataCleaner {
    fn clean_text(&self, value: Option<&CellValue>) -> Option<String> {
        let text = value?.to_string();
        let trimmed = text.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }

    fn coerce_number(&self, value: Option<&CellValue>) -> f64 {
        let parsed = match value {
            None | Some(CellValue::Empty) | Some(CellValue::Bool(_)) => 0.0,
            Some(CellValue::Number(n)) => *n,
            Some(CellValue::Text(s)) => Self::strip_numeric_noise(s).parse::<f64>().unwrap_or(0.0),
        };

        if parsed.is_finite() {
            parsed
        } else {
            0.0
        }
    }

    fn coerce_bool(&self, value: Option<&CellValue>) -> bool {
        match value {
            None | Some(CellValue::Empty) => false,
            Some(CellValue::Bool(b)) => *b,
            Some(CellValue::Number(n)) => *n == 1.0,
            Some(CellValue::Text(s)) => {
                matches!(s.trim().to_lowercase().as_str(), "true" | "1" | "yes")
            }
        }
    }
}
