// ==========================================
// 商品目录导入系统 - 字段映射器实现
// ==========================================
// 职责: 源列名 → 标准字段（三级匹配）+ 类型转换
// 匹配顺序: 精确 → 忽略大小写 → 子串（子串匹配可关闭，命中必留痕）
// ==========================================

use crate::domain::catalog::{CellValue, RawRecord, ResolvedRecord};
use crate::domain::types::MatchTier;
use crate::importer::catalog_importer_trait::{DataCleaner, FieldMapper as FieldMapperTrait};
use crate::importer::data_cleaner::DataCleaner as DefaultCleaner;
use serde::{Deserialize, Serialize};
use tracing::warn;

// ==========================================
// CatalogField - 标准业务字段
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CatalogField {
    Name,
    Description,
    UnitType,
    Price,
    HsnCode,
    ApplyTax,
    Cgst,
    Sgst,
    Igst,
    IsActive,
    Image,
}

impl CatalogField {
    pub const ALL: [CatalogField; 11] = [
        CatalogField::Name,
        CatalogField::Description,
        CatalogField::UnitType,
        CatalogField::Price,
        CatalogField::HsnCode,
        CatalogField::ApplyTax,
        CatalogField::Cgst,
        CatalogField::Sgst,
        CatalogField::Igst,
        CatalogField::IsActive,
        CatalogField::Image,
    ];

    /// 默认列名别名（按优先级排列）
    ///
    /// 不收录 rate / amount / unit / sac 等短别名：子串匹配时会误命中
    /// cgstRate、unitPrice、Transaction Id 等无关列
    pub fn default_aliases(&self) -> &'static [&'static str] {
        match self {
            CatalogField::Name => &["name", "productName", "product_name", "itemName", "item_name"],
            CatalogField::Description => &["description", "desc", "details"],
            CatalogField::UnitType => &["unitType", "unit_type", "uom"],
            CatalogField::Price => &["price", "mrp", "sellingPrice"],
            CatalogField::HsnCode => &["hsnCode", "hsn", "hsn_code"],
            CatalogField::ApplyTax => &["applyTax", "apply_tax", "taxable", "isTaxable"],
            CatalogField::Cgst => &["cgst", "cgstRate", "cgst_rate"],
            CatalogField::Sgst => &["sgst", "sgstRate", "sgst_rate"],
            CatalogField::Igst => &["igst", "igstRate", "igst_rate"],
            CatalogField::IsActive => &["isActive", "is_active", "active", "status"],
            CatalogField::Image => &["image", "imagePath", "image_path", "img", "photo"],
        }
    }
}

// ==========================================
// FieldAliases - 别名表（标准字段 → 候选列名）
// ==========================================
#[derive(Debug, Clone)]
pub struct FieldAliases {
    table: Vec<(CatalogField, Vec<String>)>,
}

impl Default for FieldAliases {
    fn default() -> Self {
        let table = CatalogField::ALL
            .iter()
            .map(|field| {
                let aliases = field
                    .default_aliases()
                    .iter()
                    .map(|a| a.to_string())
                    .collect();
                (*field, aliases)
            })
            .collect();
        Self { table }
    }
}

impl FieldAliases {
    /// 覆盖某字段的别名
    pub fn with_aliases(mut self, field: CatalogField, aliases: Vec<String>) -> Self {
        match self.table.iter_mut().find(|(f, _)| *f == field) {
            Some((_, existing)) => *existing = aliases,
            None => self.table.push((field, aliases)),
        }
        self
    }

    pub fn aliases(&self, field: CatalogField) -> &[String] {
        self.table
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, a)| a.as_slice())
            .unwrap_or(&[])
    }
}

// ==========================================
// FieldMatch - 单字段解析结果
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct FieldMatch {
    pub value: CellValue,
    pub matched_key: String, // 实际命中的源列名
    pub tier: MatchTier,
}

/// 三级匹配：逐级遍历全部别名，首个命中即返回；同级多列命中取表头顺序第一个
pub fn resolve_alias(
    record: &RawRecord,
    aliases: &[String],
    allow_substring: bool,
) -> Option<FieldMatch> {
    // 1) 精确匹配
    for alias in aliases {
        if let Some(value) = record.get(alias) {
            return Some(FieldMatch {
                value: value.clone(),
                matched_key: alias.clone(),
                tier: MatchTier::Exact,
            });
        }
    }

    // 2) 忽略大小写
    for alias in aliases {
        let alias_lower = alias.to_lowercase();
        if let Some((key, value)) = record
            .iter()
            .find(|(key, _)| key.to_lowercase() == alias_lower)
        {
            return Some(FieldMatch {
                value: value.clone(),
                matched_key: key.to_string(),
                tier: MatchTier::CaseInsensitive,
            });
        }
    }

    // 3) 子串（别名出现在列名任意位置，忽略大小写）
    if allow_substring {
        for alias in aliases {
            let alias_lower = alias.to_lowercase();
            if let Some((key, value)) = record
                .iter()
                .find(|(key, _)| key.to_lowercase().contains(&alias_lower))
            {
                return Some(FieldMatch {
                    value: value.clone(),
                    matched_key: key.to_string(),
                    tier: MatchTier::Substring,
                });
            }
        }
    }

    None
}

// ==========================================
// FieldMapper 实现
// ==========================================
pub struct FieldMapper {
    aliases: FieldAliases,
    cleaner: Box<dyn DataCleaner>,
}

impl Default for FieldMapper {
    fn default() -> Self {
        Self::new(FieldAliases::default())
    }
}

impl FieldMapper {
    pub fn new(aliases: FieldAliases) -> Self {
        Self {
            aliases,
            cleaner: Box::new(DefaultCleaner),
        }
    }

    fn value(
        &self,
        record: &RawRecord,
        field: CatalogField,
        row_number: usize,
        allow_substring: bool,
    ) -> Option<CellValue> {
        self.resolve_field(record, field, allow_substring)
            .map(|m| {
                if m.tier == MatchTier::Substring {
                    warn!(
                        row_number,
                        field = ?field,
                        matched_key = %m.matched_key,
                        "字段通过子串匹配解析"
                    );
                }
                m.value
            })
    }
}

impl FieldMapperTrait for FieldMapper {
    fn resolve_field(
        &self,
        record: &RawRecord,
        field: CatalogField,
        allow_substring: bool,
    ) -> Option<FieldMatch> {
        resolve_alias(record, self.aliases.aliases(field), allow_substring)
    }

    fn map_to_resolved(
        &self,
        record: &RawRecord,
        row_number: usize,
        allow_substring: bool,
    ) -> ResolvedRecord {
        let get = |field| self.value(record, field, row_number, allow_substring);
        let cleaner = self.cleaner.as_ref();

        // 未提供启用列时默认启用；提供时按布尔规则转换
        let is_active = match get(CatalogField::IsActive) {
            None => true,
            Some(v) => cleaner.coerce_bool(Some(&v)),
        };

        ResolvedRecord {
            row_number,
            name: cleaner.clean_text(get(CatalogField::Name).as_ref()),
            description: cleaner.clean_text(get(CatalogField::Description).as_ref()),
            unit_type: cleaner.clean_text(get(CatalogField::UnitType).as_ref()),
            price: cleaner.coerce_number(get(CatalogField::Price).as_ref()),
            hsn_code: cleaner.clean_text(get(CatalogField::HsnCode).as_ref()),
            apply_tax: cleaner.coerce_bool(get(CatalogField::ApplyTax).as_ref()),
            cgst: cleaner.coerce_number(get(CatalogField::Cgst).as_ref()),
            sgst: cleaner.coerce_number(get(CatalogField::Sgst).as_ref()),
            igst: cleaner.coerce_number(get(CatalogField::Igst).as_ref()),
            is_active,
            image_path: cleaner.clean_text(get(CatalogField::Image).as_ref()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pairs: &[(&str, &str)]) -> RawRecord {
        pairs
            .iter()
            .map(|(k, v)| (*k, CellValue::from(*v)))
            .collect()
    }

    fn aliases(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_exact_match_wins_over_case_insensitive() {
        // "Price " 经解析器 trim 后为 "Price"
        let row = record(&[("Price", "20"), ("price", "10")]);
        let m = resolve_alias(&row, &aliases(&["price"]), true).unwrap();

        assert_eq!(m.tier, MatchTier::Exact);
        assert_eq!(m.value, CellValue::from("10"));
        assert_eq!(m.matched_key, "price");
    }

    #[test]
    fn test_falls_back_to_case_insensitive() {
        let row = record(&[("Price", "20")]);
        let m = resolve_alias(&row, &aliases(&["price"]), true).unwrap();

        assert_eq!(m.tier, MatchTier::CaseInsensitive);
        assert_eq!(m.matched_key, "Price");
        assert_eq!(m.value, CellValue::from("20"));
    }

    #[test]
    fn test_later_alias_exact_beats_earlier_alias_case_insensitive() {
        let row = record(&[("HSNCODE", "a"), ("hsn", "b")]);
        let m = resolve_alias(&row, &aliases(&["hsnCode", "hsn", "hsn_code"]), true).unwrap();

        assert_eq!(m.tier, MatchTier::Exact);
        assert_eq!(m.value, CellValue::from("b"));
    }

    #[test]
    fn test_substring_match_first_seen_and_opt_in() {
        let row = record(&[("Item HSN No", "1234"), ("hsn backup", "9999")]);
        let m = resolve_alias(&row, &aliases(&["hsn"]), true).unwrap();

        assert_eq!(m.tier, MatchTier::Substring);
        assert_eq!(m.matched_key, "Item HSN No");
        assert_eq!(m.value, CellValue::from("1234"));

        assert!(resolve_alias(&row, &aliases(&["hsn"]), false).is_none());
    }

    #[test]
    fn test_empty_value_still_counts_as_match() {
        let row = record(&[("name", ""), ("Name", "Widget")]);
        let m = resolve_alias(&row, &aliases(&["name"]), true).unwrap();
        assert_eq!(m.value, CellValue::from(""));
    }

    #[test]
    fn test_no_alias_matches() {
        let row = record(&[("foo", "1")]);
        assert!(resolve_alias(&row, &aliases(&["price"]), true).is_none());
    }

    #[test]
    fn test_map_to_resolved_basic() {
        let row = record(&[
            ("Product Name", "  Widget  "),
            ("Price", "₹1,234.50"),
            ("HSN", "8471"),
            ("Apply Tax", "Yes"),
            ("cgst", "6"),
            ("image", "images/shoe.png"),
        ]);

        let mapper = FieldMapper::default();
        let resolved = mapper.map_to_resolved(&row, 1, true);

        assert_eq!(resolved.name, Some("Widget".to_string()));
        assert_eq!(resolved.price, 1234.5);
        assert_eq!(resolved.hsn_code, Some("8471".to_string()));
        // "Apply Tax" 不命中任何别名
        assert!(!resolved.apply_tax);
        assert_eq!(resolved.cgst, 6.0);
        assert_eq!(resolved.sgst, 0.0);
        assert!(resolved.is_active);
        assert_eq!(resolved.image_path, Some("images/shoe.png".to_string()));
    }

    #[test]
    fn test_short_headers_do_not_capture_unrelated_columns() {
        let row = record(&[
            ("name", "Widget"),
            ("unitPrice", "10"),
            ("Transaction Id", "T-1"),
        ]);
        let resolved = FieldMapper::default().map_to_resolved(&row, 1, true);

        assert_eq!(resolved.unit_type, None);
        assert_eq!(resolved.hsn_code, None);
    }

    #[test]
    fn test_map_to_resolved_active_flag_present() {
        let row = record(&[("name", "Widget"), ("isActive", "no")]);
        let resolved = FieldMapper::default().map_to_resolved(&row, 3, true);

        assert_eq!(resolved.row_number, 3);
        assert!(!resolved.is_active);
    }

    #[test]
    fn test_custom_aliases_override() {
        let aliases = FieldAliases::default()
            .with_aliases(CatalogField::Name, vec!["title".to_string()]);
        let row = record(&[("title", "Widget"), ("name", "Ignored")]);
        let resolved = FieldMapper::new(aliases).map_to_resolved(&row, 1, true);

        assert_eq!(resolved.name, Some("Widget".to_string()));
    }
}
