use crate::models::{Invoice, ValueRecord};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 匹配类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    Exact,
    Partial,
}

impl MatchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchType::Exact => "exact",
            MatchType::Partial => "partial",
        }
    }
}

impl fmt::Display for MatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 发票与COVE的匹配对
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentMapping {
    pub invoice: Invoice,
    pub value_record: ValueRecord,
    pub invoice_index: usize,
    pub value_record_index: usize,
    pub match_type: MatchType,
    /// 相似度，取值 [0, 1]
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnmappedInvoice {
    pub invoice: Invoice,
    pub index: usize,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnmappedValueRecord {
    pub value_record: ValueRecord,
    pub index: usize,
    pub reason: String,
}

/// 匹配后双方剩余的单据
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UnmappedDocuments {
    pub invoices: Vec<UnmappedInvoice>,
    pub value_records: Vec<UnmappedValueRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingSummary {
    pub total_invoices: usize,
    pub total_value_records: usize,
    pub exact_count: usize,
    pub partial_count: usize,
    pub unmapped_invoice_count: usize,
    pub unmapped_value_record_count: usize,
}

/// 一次匹配的完整结果
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MappingResult {
    pub mappings: Vec<DocumentMapping>,
    pub unmapped: UnmappedDocuments,
    pub summary: MappingSummary,
}

impl MappingResult {
    /// 组装结果并计算统计信息
    pub fn new(
        mappings: Vec<DocumentMapping>,
        unmapped: UnmappedDocuments,
        total_invoices: usize,
        total_value_records: usize,
    ) -> Self {
        let exact_count = mappings
            .iter()
            .filter(|m| m.match_type == MatchType::Exact)
            .count();
        let partial_count = mappings
            .iter()
            .filter(|m| m.match_type == MatchType::Partial)
            .count();

        let summary = MappingSummary {
            total_invoices,
            total_value_records,
            exact_count,
            partial_count,
            unmapped_invoice_count: unmapped.invoices.len(),
            unmapped_value_record_count: unmapped.value_records.len(),
        };

        Self {
            mappings,
            unmapped,
            summary,
        }
    }
}
