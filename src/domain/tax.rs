// ==========================================
// 商品目录导入系统 - 税率参考数据
// ==========================================
// 生命周期: 每个导入任务加载一次,任务期间只读
// ==========================================

use crate::domain::types::TaxType;
use serde::{Deserialize, Serialize};

/// 税率比较容差
const RATE_EPSILON: f64 = 1e-9;

// ==========================================
// TaxReferenceSet - 租户当前有效税率
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaxReferenceSet {
    pub cgst: Vec<f64>,
    pub sgst: Vec<f64>,
    pub igst: Vec<f64>,
}

impl TaxReferenceSet {
    pub fn new(cgst: Vec<f64>, sgst: Vec<f64>, igst: Vec<f64>) -> Self {
        Self { cgst, sgst, igst }
    }

    /// 指定税种的有效税率
    pub fn rates(&self, tax_type: TaxType) -> &[f64] {
        match tax_type {
            TaxType::Cgst => &self.cgst,
            TaxType::Sgst => &self.sgst,
            TaxType::Igst => &self.igst,
        }
    }

    /// 追加一个税率（重复值忽略）
    pub fn push(&mut self, tax_type: TaxType, rate: f64) {
        let bucket = match tax_type {
            TaxType::Cgst => &mut self.cgst,
            TaxType::Sgst => &mut self.sgst,
            TaxType::Igst => &mut self.igst,
        };
        if !bucket.iter().any(|r| (r - rate).abs() < RATE_EPSILON) {
            bucket.push(rate);
        }
    }

    /// 税率是否属于该税种的有效集合
    pub fn contains(&self, tax_type: TaxType, rate: f64) -> bool {
        self.rates(tax_type)
            .iter()
            .any(|r| (r - rate).abs() < RATE_EPSILON)
    }

    pub fn total_rates(&self) -> usize {
        self.cgst.len() + self.sgst.len() + self.igst.len()
    }
}
