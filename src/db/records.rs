use crate::error::{GlosaError, Result};
use crate::models::MappingResult;
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// 匹配结果表 (t_glosa_document_mapping)
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct MappingRecord {
    pub review_id: i64,
    pub invoice_index: i64,
    pub value_record_index: i64,
    pub invoice_number: String,
    pub value_record_number: String,
    pub cove_id: Option<String>,
    pub match_type: String,
    pub confidence: f64,
    pub invoice_amount: BigDecimal,
    pub invoice_currency: String,
    pub value_record_amount: BigDecimal,
    pub created_at: DateTime<Utc>,
}

/// 未匹配单据表 (t_glosa_unmapped_document)
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct UnmappedRecord {
    pub review_id: i64,
    /// "invoice" 或 "value_record"
    pub side: String,
    pub item_index: i64,
    pub identifier: String,
    pub reason: String,
    pub created_at: DateTime<Utc>,
}

pub const SIDE_INVOICE: &str = "invoice";
pub const SIDE_VALUE_RECORD: &str = "value_record";

/// 索引转为BIGINT列值
pub fn index_column(index: usize) -> Result<i64> {
    i64::try_from(index).map_err(|_| GlosaError::InvalidInput(format!("index {} does not fit a BIGINT column", index)))
}

/// 匹配结果展开为数据库行，使用同一时间戳
pub fn to_records(review_id: i64, result: &MappingResult) -> Result<(Vec<MappingRecord>, Vec<UnmappedRecord>)> {
    let now = Utc::now();

    let mappings = result
        .mappings
        .iter()
        .map(|m| {
            Ok(MappingRecord {
                review_id,
                invoice_index: index_column(m.invoice_index)?,
                value_record_index: index_column(m.value_record_index)?,
                invoice_number: m.invoice.invoice_number.clone(),
                value_record_number: m.value_record.invoice_number.clone(),
                cove_id: m.value_record.cove_id.clone(),
                match_type: m.match_type.as_str().to_string(),
                confidence: m.confidence,
                invoice_amount: m.invoice.total_amount.clone(),
                invoice_currency: m.invoice.currency_code.clone(),
                value_record_amount: m.value_record.total_value(),
                created_at: now,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let unmapped_invoices = result.unmapped.invoices.iter().map(|u| {
        Ok(UnmappedRecord {
            review_id,
            side: SIDE_INVOICE.to_string(),
            item_index: index_column(u.index)?,
            identifier: u.invoice.invoice_number.clone(),
            reason: u.reason.clone(),
            created_at: now,
        })
    });
    let unmapped_records = result.unmapped.value_records.iter().map(|u| {
        Ok(UnmappedRecord {
            review_id,
            side: SIDE_VALUE_RECORD.to_string(),
            item_index: index_column(u.index)?,
            identifier: u.value_record.invoice_number.clone(),
            reason: u.reason.clone(),
            created_at: now,
        })
    });
    let unmapped = unmapped_invoices
        .chain(unmapped_records)
        .collect::<Result<Vec<_>>>()?;

    Ok((mappings, unmapped))
}
