use crate::models::{AggregatedTotals, DocumentMapping, RecordCurrency, ValueRecord};
use bigdecimal::{BigDecimal, Zero};

/// 外币标记
pub const FOREIGN_CURRENCY_TAG: &str = "USD";

/// 默认币种判定: 只看首条明细
///
/// 明细币种混合时仍按首条明细判定；
/// 需要其他规则时使用 [`aggregate_with_policy`]
pub fn first_line_currency(record: &ValueRecord) -> RecordCurrency {
    match record.first_line_currency() {
        Some(FOREIGN_CURRENCY_TAG) => RecordCurrency::Foreign,
        _ => RecordCurrency::Local,
    }
}

/// 按默认币种判定汇总本币/外币合计
pub fn aggregate(mappings: &[DocumentMapping], exchange_rate: &BigDecimal) -> AggregatedTotals {
    aggregate_with_policy(mappings, exchange_rate, first_line_currency)
}

/// 汇总金额，每张COVE的币种由 `policy` 判定
///
/// 外币COVE: 金额计入外币合计，
/// `金额 * 汇率` 计入本币合计；本币COVE: 金额计入本币合计，
/// USD列计入外币合计
pub fn aggregate_with_policy<P>(
    mappings: &[DocumentMapping],
    exchange_rate: &BigDecimal,
    policy: P,
) -> AggregatedTotals
where
    P: Fn(&ValueRecord) -> RecordCurrency,
{
    let mut local_total = BigDecimal::zero();
    let mut foreign_total = BigDecimal::zero();
    let mut invoice_total = BigDecimal::zero();

    for mapping in mappings {
        let record = &mapping.value_record;
        let record_value = record.total_value();

        match policy(record) {
            RecordCurrency::Foreign => {
                local_total += &record_value * exchange_rate;
                foreign_total += record_value;
            }
            RecordCurrency::Local => {
                local_total += record_value;
                foreign_total += record.total_value_usd();
            }
        }

        invoice_total += &mapping.invoice.total_amount;
    }

    tracing::debug!(
        "[Aggregate] {} mappings: local {}, foreign {}, invoices {}",
        mappings.len(),
        local_total,
        foreign_total,
        invoice_total
    );

    AggregatedTotals {
        total_value_record_amount: local_total,
        total_value_record_amount_foreign: foreign_total,
        total_invoice_amount: invoice_total,
        mapping_count: mappings.len(),
    }
}
