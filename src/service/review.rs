use crate::models::{DocumentMapping, MappedLine, MappingDetail, ReviewInput, ReviewReport, Scenario};
use crate::service::aggregate::aggregate;
use crate::service::document_matcher::DocumentMatcher;
use crate::service::similarity::SimilarityStrategy;
use std::collections::HashSet;

/// 审核一笔业务: 匹配、汇总、总结
pub fn review<S: SimilarityStrategy>(matcher: &DocumentMatcher<S>, input: &ReviewInput) -> ReviewReport {
    let mapping = matcher.map_documents(&input.invoices, &input.value_records);
    let totals = aggregate(&mapping.mappings, &input.exchange_rate);
    let implied_foreign_total = totals.implied_foreign_total(&input.exchange_rate);
    let scenario = classify_scenario(mapping.mappings.len(), &input.incoterms);
    let details = mapping_details(&mapping.mappings);
    let lines = collect_mapped_lines(&mapping.mappings);

    tracing::info!(
        "[Review] scenario {:?}, {} mappings, {} lines, value records total {}",
        scenario,
        totals.mapping_count,
        lines.len(),
        totals.total_value_record_amount
    );

    ReviewReport {
        mapping,
        totals,
        implied_foreign_total,
        scenario,
        details,
        lines,
    }
}

/// 所有已匹配COVE的商品明细，按匹配顺序
pub fn collect_mapped_lines(mappings: &[DocumentMapping]) -> Vec<MappedLine> {
    mappings
        .iter()
        .enumerate()
        .flat_map(|(mapping_index, mapping)| {
            mapping
                .value_record
                .lines
                .iter()
                .enumerate()
                .map(move |(line_index, line)| MappedLine {
                    line: line.clone(),
                    invoice_number: mapping.invoice.invoice_number.clone(),
                    value_record_number: mapping.value_record.invoice_number.clone(),
                    mapping_index,
                    line_index,
                    invoice_index: mapping.invoice_index,
                    value_record_index: mapping.value_record_index,
                })
        })
        .collect()
}

/// 每个匹配生成一行审核明细
pub fn mapping_details(mappings: &[DocumentMapping]) -> Vec<MappingDetail> {
    mappings
        .iter()
        .map(|m| MappingDetail {
            name: format!(
                "Invoice {} vs value record {}",
                m.invoice.invoice_number, m.value_record.invoice_number
            ),
            invoice_amount: m.invoice.total_amount.clone(),
            invoice_currency: m.invoice.currency_code.clone(),
            value_record_total: m.value_record.total_value(),
            value_record_currency: m.value_record.first_line_currency().map(str::to_string),
            match_type: m.match_type,
            confidence: m.confidence,
        })
        .collect()
}

/// 场景判定: 单张发票、多张同一贸易术语、
/// 多张不同（或缺失）贸易术语
pub fn classify_scenario(mapping_count: usize, incoterms: &[Option<String>]) -> Scenario {
    if mapping_count == 1 {
        return Scenario::SingleInvoice;
    }

    let distinct: HashSet<&str> = incoterms
        .iter()
        .filter_map(|i| i.as_deref())
        .filter(|i| !i.is_empty())
        .collect();

    if distinct.len() == 1 {
        Scenario::MultipleSingleIncoterm
    } else {
        Scenario::MultipleDifferentIncoterms
    }
}
