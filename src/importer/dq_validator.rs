// ==========================================
// 商品目录导入系统 - 行校验器实现
// ==========================================
// 职责: 必填字段 / 数值范围 / 税率合法性校验
// 规则: 校验顺序固定（名称 → 价格 → CGST → SGST → IGST），首个失败即为行结果
// ==========================================

use crate::domain::catalog::ResolvedRecord;
use crate::domain::tax::TaxReferenceSet;
use crate::domain::types::TaxType;
use crate::importer::catalog_importer_trait::DqValidator as DqValidatorTrait;
use crate::importer::error::{RowError, RowResult};

pub struct DqValidator;

/// 指定税种的行内税率
fn tax_component(record: &ResolvedRecord, tax_type: TaxType) -> f64 {
    match tax_type {
        TaxType::Cgst => record.cgst,
        TaxType::Sgst => record.sgst,
        TaxType::Igst => record.igst,
    }
}

impl DqValidatorTrait for DqValidator {
    fn validate_required_fields(&self, record: &ResolvedRecord) -> RowResult<String> {
        match record.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => Ok(name.to_string()),
            _ => Err(RowError::MissingName),
        }
    }

    fn validate_ranges(&self, record: &ResolvedRecord) -> RowResult<()> {
        if record.price < 0.0 {
            return Err(RowError::InvalidPrice(record.price));
        }
        Ok(())
    }

    fn validate_tax(&self, record: &ResolvedRecord, taxes: &TaxReferenceSet) -> RowResult<()> {
        if !record.apply_tax {
            return Ok(());
        }

        for tax_type in TaxType::ALL {
            let value = tax_component(record, tax_type);
            // 仅校验大于 0 的税率
            if value > 0.0 && !taxes.contains(tax_type, value) {
                return Err(RowError::InvalidTax { tax_type, value });
            }
        }

        Ok(())
    }
}
