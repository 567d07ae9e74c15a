use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

/// 商业发票 (抽取阶段的输出)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub invoice_number: String,
    pub total_amount: BigDecimal,
    pub currency_code: String,
    #[serde(default)]
    pub line_items: Vec<InvoiceLineItem>,
    /// 发票上的贸易术语 (FOB, EXW, ...)
    #[serde(default)]
    pub payment_terms: Option<String>,
}

/// 发票明细
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceLineItem {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub quantity: Option<BigDecimal>,
    #[serde(default)]
    pub unit_price: Option<BigDecimal>,
    pub amount: BigDecimal,
}
