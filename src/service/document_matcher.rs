use crate::config::MatchingConfig;
use crate::models::{
    DocumentMapping, Invoice, MappingResult, MatchType, UnmappedDocuments, UnmappedInvoice,
    UnmappedValueRecord, ValueRecord,
};
use crate::service::similarity::{
    normalize_identifier, MatchThresholds, PositionalSimilarity, SimilarityStrategy,
};
use indexmap::IndexSet;

/// 单张发票的最优未使用COVE
#[derive(Debug, Clone, Copy)]
struct Candidate {
    value_record_index: usize,
    match_type: MatchType,
    confidence: f64,
}

/// 发票-COVE匹配器
///
/// 按输入顺序贪心匹配: 第一轮只提交exact，
/// 第二轮为剩余发票提交partial。
/// 靠前的发票优先认领，
/// 同分时索引最小的COVE胜出
pub struct DocumentMatcher<S = PositionalSimilarity> {
    strategy: S,
    thresholds: MatchThresholds,
}

impl Default for DocumentMatcher<PositionalSimilarity> {
    fn default() -> Self {
        Self::new(PositionalSimilarity::default(), MatchThresholds::default())
    }
}

impl DocumentMatcher<Box<dyn SimilarityStrategy>> {
    /// 按配置构建策略和阈值
    pub fn from_config(config: &MatchingConfig) -> Self {
        Self::new(
            config.strategy.build(config.substring_penalty),
            MatchThresholds {
                exact: config.exact_threshold,
                partial: config.partial_threshold,
            },
        )
    }
}

impl<S: SimilarityStrategy> DocumentMatcher<S> {
    pub fn new(strategy: S, thresholds: MatchThresholds) -> Self {
        Self {
            strategy,
            thresholds,
        }
    }

    pub fn thresholds(&self) -> MatchThresholds {
        self.thresholds
    }

    /// 匹配发票与COVE，并记录所有未匹配单据
    pub fn map_documents(&self, invoices: &[Invoice], value_records: &[ValueRecord]) -> MappingResult {
        // 阶段1: 归一化发票号
        let invoice_ids: Vec<String> = invoices
            .iter()
            .map(|i| normalize_identifier(&i.invoice_number))
            .collect();
        let record_ids: Vec<String> = value_records
            .iter()
            .map(|r| normalize_identifier(&r.invoice_number))
            .collect();

        // 阶段2: 先exact，后partial
        let mut used_invoices: IndexSet<usize> = IndexSet::new();
        let mut used_records: IndexSet<usize> = IndexSet::new();
        let mut mappings: Vec<DocumentMapping> = Vec::new();

        for pass in [MatchType::Exact, MatchType::Partial] {
            for (invoice_index, invoice) in invoices.iter().enumerate() {
                if used_invoices.contains(&invoice_index) {
                    continue;
                }

                let Some(candidate) =
                    self.find_best_match(&invoice_ids[invoice_index], &record_ids, &used_records)
                else {
                    continue;
                };

                if candidate.match_type != pass {
                    continue;
                }

                let value_record = &value_records[candidate.value_record_index];
                tracing::debug!(
                    "[Mapping] {} match: invoice {} (#{}) -> value record {} (#{}), confidence {:.3}",
                    pass,
                    invoice.invoice_number,
                    invoice_index,
                    value_record.invoice_number,
                    candidate.value_record_index,
                    candidate.confidence
                );

                used_invoices.insert(invoice_index);
                used_records.insert(candidate.value_record_index);
                mappings.push(DocumentMapping {
                    invoice: invoice.clone(),
                    value_record: value_record.clone(),
                    invoice_index,
                    value_record_index: candidate.value_record_index,
                    match_type: candidate.match_type,
                    confidence: candidate.confidence,
                });
            }
        }

        // 阶段3: 未匹配单据
        let unmapped = UnmappedDocuments {
            invoices: invoices
                .iter()
                .enumerate()
                .filter(|(index, _)| !used_invoices.contains(index))
                .map(|(index, invoice)| UnmappedInvoice {
                    invoice: invoice.clone(),
                    index,
                    reason: format!("no counterpart found for identifier {}", invoice.invoice_number),
                })
                .collect(),
            value_records: value_records
                .iter()
                .enumerate()
                .filter(|(index, _)| !used_records.contains(index))
                .map(|(index, record)| UnmappedValueRecord {
                    value_record: record.clone(),
                    index,
                    reason: format!("no counterpart found for identifier {}", record.invoice_number),
                })
                .collect(),
        };

        let result = MappingResult::new(mappings, unmapped, invoices.len(), value_records.len());

        tracing::info!(
            "[Mapping] done - invoices: {}, value records: {}, exact: {}, partial: {}, unmapped invoices: {}, unmapped value records: {}",
            result.summary.total_invoices,
            result.summary.total_value_records,
            result.summary.exact_count,
            result.summary.partial_count,
            result.summary.unmapped_invoice_count,
            result.summary.unmapped_value_record_count
        );

        result
    }

    /// 未使用COVE中的最高分
    /// 严格大于才替换，同分保留最早的索引
    fn find_best_match(
        &self,
        invoice_id: &str,
        record_ids: &[String],
        used_records: &IndexSet<usize>,
    ) -> Option<Candidate> {
        let mut best: Option<Candidate> = None;
        let mut best_score = 0.0;

        for (value_record_index, record_id) in record_ids.iter().enumerate() {
            if used_records.contains(&value_record_index) {
                continue;
            }

            let score = self.strategy.score(invoice_id, record_id).clamp(0.0, 1.0);
            if score > best_score {
                if let Some(match_type) = self.thresholds.classify(score) {
                    best = Some(Candidate {
                        value_record_index,
                        match_type,
                        confidence: score,
                    });
                    best_score = score;
                }
            }
        }

        best
    }
}

/// 使用默认策略和阈值匹配
pub fn map_documents(invoices: &[Invoice], value_records: &[ValueRecord]) -> MappingResult {
    DocumentMatcher::default().map_documents(invoices, value_records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::similarity::{FnSimilarity, LevenshteinSimilarity, SimilarityKind};
    use bigdecimal::BigDecimal;
    use std::collections::HashSet;

    fn invoice(number: &str) -> Invoice {
        Invoice {
            invoice_number: number.to_string(),
            total_amount: BigDecimal::from(100),
            currency_code: "USD".to_string(),
            line_items: vec![],
            payment_terms: None,
        }
    }

    fn record(number: &str) -> ValueRecord {
        ValueRecord {
            cove_id: Some(format!("COVE-{number}")),
            invoice_number: number.to_string(),
            lines: vec![],
        }
    }

    fn assert_partitioned(result: &MappingResult, invoices: usize, records: usize) {
        let mapped_inv: HashSet<usize> = result.mappings.iter().map(|m| m.invoice_index).collect();
        let unmapped_inv: HashSet<usize> = result.unmapped.invoices.iter().map(|u| u.index).collect();
        assert_eq!(mapped_inv.len(), result.mappings.len());
        assert!(mapped_inv.is_disjoint(&unmapped_inv));
        assert_eq!(mapped_inv.len() + unmapped_inv.len(), invoices);

        let mapped_rec: HashSet<usize> = result.mappings.iter().map(|m| m.value_record_index).collect();
        let unmapped_rec: HashSet<usize> =
            result.unmapped.value_records.iter().map(|u| u.index).collect();
        assert_eq!(mapped_rec.len(), result.mappings.len());
        assert!(mapped_rec.is_disjoint(&unmapped_rec));
        assert_eq!(mapped_rec.len() + unmapped_rec.len(), records);

        assert_eq!(
            result.summary.exact_count + result.summary.partial_count,
            result.mappings.len()
        );
    }

    #[test]
    fn empty_inputs_give_empty_result() {
        let result = map_documents(&[], &[]);
        assert!(result.mappings.is_empty());
        assert!(result.unmapped.invoices.is_empty());
        assert!(result.unmapped.value_records.is_empty());
        assert_eq!(result.summary, Default::default());
    }

    #[test]
    fn exact_and_partial_matches_are_classified() {
        let invoices = vec![invoice("FAC-001"), invoice("1234567890")];
        let records = vec![record("1234567899"), record("fac 001")];

        let result = map_documents(&invoices, &records);

        assert_eq!(result.mappings.len(), 2);
        assert_eq!(result.mappings[0].invoice_index, 0);
        assert_eq!(result.mappings[0].value_record_index, 1);
        assert_eq!(result.mappings[0].match_type, MatchType::Exact);
        assert_eq!(result.mappings[0].confidence, 1.0);

        assert_eq!(result.mappings[1].invoice_index, 1);
        assert_eq!(result.mappings[1].value_record_index, 0);
        assert_eq!(result.mappings[1].match_type, MatchType::Partial);
        assert!((result.mappings[1].confidence - 0.9).abs() < 1e-9);

        assert_eq!(result.summary.exact_count, 1);
        assert_eq!(result.summary.partial_count, 1);
        assert_partitioned(&result, 2, 2);
    }

    #[test]
    fn exact_pass_runs_before_partial_pass() {
        // 如果两轮交错，发票0会以partial抢走记录0；
        // 发票1与之exact匹配，必须胜出
        let invoices = vec![invoice("1234567890"), invoice("1234567899")];
        let records = vec![record("1234567899")];

        let result = map_documents(&invoices, &records);

        assert_eq!(result.mappings.len(), 1);
        assert_eq!(result.mappings[0].invoice_index, 1);
        assert_eq!(result.mappings[0].match_type, MatchType::Exact);
        assert_eq!(result.unmapped.invoices.len(), 1);
        assert_eq!(result.unmapped.invoices[0].index, 0);
        assert_eq!(
            result.unmapped.invoices[0].reason,
            "no counterpart found for identifier 1234567890"
        );
        assert_partitioned(&result, 2, 1);
    }

    #[test]
    fn earlier_value_record_wins_a_tie() {
        let invoices = vec![invoice("INV-77")];
        let records = vec![record("INV-77"), record("INV-77")];

        let result = map_documents(&invoices, &records);

        assert_eq!(result.mappings.len(), 1);
        assert_eq!(result.mappings[0].value_record_index, 0);
        assert_eq!(result.unmapped.value_records.len(), 1);
        assert_eq!(result.unmapped.value_records[0].index, 1);
        assert_eq!(
            result.unmapped.value_records[0].reason,
            "no counterpart found for identifier INV-77"
        );
    }

    #[test]
    fn earlier_invoice_claims_an_ambiguous_record() {
        let invoices = vec![invoice("INV-77"), invoice("inv 77")];
        let records = vec![record("INV77")];

        let result = map_documents(&invoices, &records);

        assert_eq!(result.mappings.len(), 1);
        assert_eq!(result.mappings[0].invoice_index, 0);
        assert_eq!(result.unmapped.invoices[0].index, 1);
    }

    #[test]
    fn unrelated_ids_stay_unmapped() {
        let invoices = vec![invoice("A-100"), invoice("B-200")];
        let records = vec![record("ZZZ-999")];

        let result = map_documents(&invoices, &records);

        assert!(result.mappings.is_empty());
        assert_eq!(result.summary.unmapped_invoice_count, 2);
        assert_eq!(result.summary.unmapped_value_record_count, 1);
        assert_partitioned(&result, 2, 1);
    }

    #[test]
    fn matching_is_deterministic() {
        let invoices = vec![
            invoice("FAC-001"),
            invoice("X123456789"),
            invoice("77"),
            invoice("FAC-002"),
        ];
        let records = vec![
            record("fac002"),
            record("123456789"),
            record("FAC_001"),
            record("FAC_001"),
        ];

        let first = map_documents(&invoices, &records);
        let second = map_documents(&invoices, &records);
        assert_eq!(first, second);
        assert_partitioned(&first, 4, 4);
        assert_eq!(first.summary.exact_count, 2);
        assert_eq!(first.summary.partial_count, 1);
    }

    #[test]
    fn inputs_are_left_untouched() {
        let invoices = vec![invoice("A-1")];
        let records = vec![record("a1")];
        let before = (invoices.clone(), records.clone());
        let _ = map_documents(&invoices, &records);
        assert_eq!((invoices, records), before);
    }

    #[test]
    fn injected_thresholds_are_respected() {
        let matcher = DocumentMatcher::new(
            PositionalSimilarity::default(),
            MatchThresholds {
                exact: 0.99,
                partial: 0.95,
            },
        );
        let result = matcher.map_documents(&[invoice("1234567890")], &[record("1234567899")]);
        assert!(result.mappings.is_empty());
    }

    #[test]
    fn from_config_applies_strategy_and_thresholds() {
        let config = MatchingConfig {
            strategy: SimilarityKind::Levenshtein,
            exact_threshold: 0.9,
            partial_threshold: 0.6,
            substring_penalty: 0.8,
        };
        let matcher = DocumentMatcher::from_config(&config);

        assert_eq!(matcher.thresholds().exact, 0.9);
        assert_eq!(matcher.thresholds().partial, 0.6);

        // 插入1个字符: 编辑距离 8/9，按位置 1/9
        let result = matcher.map_documents(&[invoice("A1234567")], &[record("AB1234567")]);
        assert_eq!(result.mappings.len(), 1);
        assert_eq!(result.mappings[0].match_type, MatchType::Partial);
    }

    #[test]
    fn injected_strategy_is_used() {
        let matcher = DocumentMatcher::new(
            FnSimilarity(|_: &str, _: &str| 0.8),
            MatchThresholds::default(),
        );
        let result = matcher.map_documents(&[invoice("A")], &[record("B"), record("C")]);
        assert_eq!(result.mappings.len(), 1);
        assert_eq!(result.mappings[0].value_record_index, 0);
        assert_eq!(result.mappings[0].match_type, MatchType::Partial);
    }

    #[test]
    fn out_of_range_scores_are_clamped() {
        let matcher = DocumentMatcher::new(
            FnSimilarity(|_: &str, _: &str| 3.5),
            MatchThresholds::default(),
        );
        let result = matcher.map_documents(&[invoice("A")], &[record("B")]);
        assert_eq!(result.mappings[0].confidence, 1.0);
    }

    #[test]
    fn levenshtein_recovers_shifted_ids() {
        let invoices = vec![invoice("A1234567")];
        let records = vec![record("AB1234567")];

        assert!(map_documents(&invoices, &records).mappings.is_empty());

        let matcher = DocumentMatcher::new(LevenshteinSimilarity::default(), MatchThresholds::default());
        let result = matcher.map_documents(&invoices, &records);
        assert_eq!(result.mappings.len(), 1);
        assert_eq!(result.mappings[0].match_type, MatchType::Partial);
    }
}
