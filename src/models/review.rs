use crate::models::{Invoice, MappingResult, MatchType, ValueRecord, ValueRecordLine};
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

/// 匹配结果的金额汇总
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedTotals {
    /// COVE合计 - 本币 (MXN)
    pub total_value_record_amount: BigDecimal,
    /// COVE合计 - 外币 (USD)
    pub total_value_record_amount_foreign: BigDecimal,
    pub total_invoice_amount: BigDecimal,
    pub mapping_count: usize,
}

impl AggregatedTotals {
    /// 由本币合计和汇率反推的外币合计
    /// 汇率为0时返回 `None`
    pub fn implied_foreign_total(&self, exchange_rate: &BigDecimal) -> Option<BigDecimal> {
        use bigdecimal::Zero;
        if exchange_rate.is_zero() {
            return None;
        }
        Some(&self.total_value_record_amount / exchange_rate)
    }
}

/// 汇总时整张COVE按哪种币种处理
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordCurrency {
    Foreign,
    Local,
}

/// 已匹配COVE的商品明细，附带来源索引
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappedLine {
    pub line: ValueRecordLine,
    pub invoice_number: String,
    pub value_record_number: String,
    pub mapping_index: usize,
    pub line_index: usize,
    pub invoice_index: usize,
    pub value_record_index: usize,
}

/// 审核明细行 - 每个匹配一行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingDetail {
    pub name: String,
    pub invoice_amount: BigDecimal,
    pub invoice_currency: String,
    pub value_record_total: BigDecimal,
    pub value_record_currency: Option<String>,
    pub match_type: MatchType,
    pub confidence: f64,
}

/// 业务场景
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scenario {
    SingleInvoice,
    MultipleSingleIncoterm,
    MultipleDifferentIncoterms,
}

/// 审核输入
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewInput {
    pub invoices: Vec<Invoice>,
    pub value_records: Vec<ValueRecord>,
    pub exchange_rate: BigDecimal,
    /// 报关单上的贸易术语，每张发票一个
    #[serde(default)]
    pub incoterms: Vec<Option<String>>,
}

/// 审核输出: 匹配、金额汇总、场景与明细
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewReport {
    pub mapping: MappingResult,
    pub totals: AggregatedTotals,
    pub implied_foreign_total: Option<BigDecimal>,
    pub scenario: Scenario,
    pub details: Vec<MappingDetail>,
    pub lines: Vec<MappedLine>,
}
