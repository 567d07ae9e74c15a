use bigdecimal::{BigDecimal, Zero};
use serde::{Deserialize, Serialize};

/// COVE价值凭证 - 对应一张发票
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueRecord {
    #[serde(default)]
    pub cove_id: Option<String>,
    /// COVE上记载的发票号
    pub invoice_number: String,
    #[serde(default)]
    pub lines: Vec<ValueRecordLine>,
}

/// COVE商品明细
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValueRecordLine {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub unit_price: Option<BigDecimal>,
    #[serde(default)]
    pub total_value: Option<BigDecimal>,
    /// 明细金额（参考币种USD）
    #[serde(default)]
    pub total_value_usd: Option<BigDecimal>,
}

impl ValueRecord {
    /// 所有明细`total_value`之和，缺失按0计
    pub fn total_value(&self) -> BigDecimal {
        self.lines
            .iter()
            .filter_map(|l| l.total_value.as_ref())
            .fold(BigDecimal::zero(), |acc, v| acc + v)
    }

    /// 所有明细`total_value_usd`之和，缺失按0计
    pub fn total_value_usd(&self) -> BigDecimal {
        self.lines
            .iter()
            .filter_map(|l| l.total_value_usd.as_ref())
            .fold(BigDecimal::zero(), |acc, v| acc + v)
    }

    /// 首条明细的币种
    pub fn first_line_currency(&self) -> Option<&str> {
        self.lines.first().and_then(|l| l.currency.as_deref())
    }
}
