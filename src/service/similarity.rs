use crate::models::MatchType;
use serde::{Deserialize, Serialize};

/// 包含关系的折扣系数
pub const DEFAULT_SUBSTRING_PENALTY: f64 = 0.8;

/// 发票号归一化: 转小写，去掉空白、
/// 连字符和下划线
pub fn normalize_identifier(identifier: &str) -> String {
    identifier
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
        .collect()
}

/// 相似度评分（归一化后的发票号），取值 [0, 1]
pub trait SimilarityStrategy: Send + Sync {
    fn score(&self, left: &str, right: &str) -> f64;
}

impl<S: SimilarityStrategy + ?Sized> SimilarityStrategy for Box<S> {
    fn score(&self, left: &str, right: &str) -> f64 {
        (**self).score(left, right)
    }
}

impl<S: SimilarityStrategy + ?Sized> SimilarityStrategy for std::sync::Arc<S> {
    fn score(&self, left: &str, right: &str) -> f64 {
        (**self).score(left, right)
    }
}

/// 内置策略共用的相等/包含规则
/// 都不满足时返回 `None`
fn identity_or_containment(left: &str, right: &str, substring_penalty: f64) -> Option<f64> {
    if left == right {
        return Some(1.0);
    }
    if left.contains(right) || right.contains(left) {
        let l = left.chars().count();
        let r = right.chars().count();
        let shorter = l.min(r) as f64;
        let longer = l.max(r) as f64;
        return Some(shorter / longer * substring_penalty);
    }
    None
}

/// 默认策略: 相等、包含，其次按位置逐字符比较
/// 不是编辑距离；插入一个字符会让后续位置全部错开
#[derive(Debug, Clone, Copy)]
pub struct PositionalSimilarity {
    pub substring_penalty: f64,
}

impl Default for PositionalSimilarity {
    fn default() -> Self {
        Self {
            substring_penalty: DEFAULT_SUBSTRING_PENALTY,
        }
    }
}

impl SimilarityStrategy for PositionalSimilarity {
    fn score(&self, left: &str, right: &str) -> f64 {
        if let Some(score) = identity_or_containment(left, right, self.substring_penalty) {
            return score;
        }

        let left: Vec<char> = left.chars().collect();
        let right: Vec<char> = right.chars().collect();
        let max_len = left.len().max(right.len());
        if max_len == 0 {
            return 1.0;
        }

        let mismatches = (0..max_len)
            .filter(|&i| left.get(i) != right.get(i))
            .count();

        (1.0 - mismatches as f64 / max_len as f64).max(0.0)
    }
}

/// 可选策略: 相等/包含规则相同，
/// 其余情况使用Levenshtein距离
#[derive(Debug, Clone, Copy)]
pub struct LevenshteinSimilarity {
    pub substring_penalty: f64,
}

impl Default for LevenshteinSimilarity {
    fn default() -> Self {
        Self {
            substring_penalty: DEFAULT_SUBSTRING_PENALTY,
        }
    }
}

impl SimilarityStrategy for LevenshteinSimilarity {
    fn score(&self, left: &str, right: &str) -> f64 {
        if let Some(score) = identity_or_containment(left, right, self.substring_penalty) {
            return score;
        }

        let max_len = left.chars().count().max(right.chars().count());
        if max_len == 0 {
            return 1.0;
        }

        (1.0 - levenshtein_distance(left, right) as f64 / max_len as f64).max(0.0)
    }
}

/// 编辑距离（按char，两行滚动数组）
pub fn levenshtein_distance(left: &str, right: &str) -> usize {
    let left: Vec<char> = left.chars().collect();
    let right: Vec<char> = right.chars().collect();

    let mut prev: Vec<usize> = (0..=right.len()).collect();
    let mut curr = vec![0; right.len() + 1];

    for i in 1..=left.len() {
        curr[0] = i;
        for j in 1..=right.len() {
            let cost = if left[i - 1] == right[j - 1] { 0 } else { 1 };
            curr[j] = (prev[j] + 1) // deletion
                .min(curr[j - 1] + 1) // insertion
                .min(prev[j - 1] + cost); // substitution
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[right.len()]
}

/// 闭包适配为评分策略
pub struct FnSimilarity<F>(pub F);

impl<F> SimilarityStrategy for FnSimilarity<F>
where
    F: Fn(&str, &str) -> f64 + Send + Sync,
{
    fn score(&self, left: &str, right: &str) -> f64 {
        (self.0)(left, right)
    }
}

/// 配置中可选的策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimilarityKind {
    #[default]
    Positional,
    Levenshtein,
}

impl SimilarityKind {
    pub fn build(self, substring_penalty: f64) -> Box<dyn SimilarityStrategy> {
        match self {
            SimilarityKind::Positional => Box::new(PositionalSimilarity { substring_penalty }),
            SimilarityKind::Levenshtein => Box::new(LevenshteinSimilarity { substring_penalty }),
        }
    }
}

/// 匹配阈值
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchThresholds {
    pub exact: f64,
    pub partial: f64,
}

impl Default for MatchThresholds {
    fn default() -> Self {
        Self {
            exact: 0.95,
            partial: 0.70,
        }
    }
}

impl MatchThresholds {
    /// `None` 表示分数不足以匹配
    pub fn classify(&self, score: f64) -> Option<MatchType> {
        if score >= self.exact {
            Some(MatchType::Exact)
        } else if score >= self.partial {
            Some(MatchType::Partial)
        } else {
            None
        }
    }
}

/// 原始发票号: 归一化后用默认策略评分
pub fn similarity(left: &str, right: &str) -> f64 {
    PositionalSimilarity::default().score(&normalize_identifier(left), &normalize_identifier(right))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_strips_separators_and_case() {
        assert_eq!(normalize_identifier(" INV-12 345_a "), "inv12345a");
        assert_eq!(normalize_identifier("inv12345"), "inv12345");
    }

    #[test]
    fn hyphenated_uppercase_id_normalizes_to_identical() {
        assert_eq!(similarity("INV-12345", "inv12345"), 1.0);
        assert_eq!(
            MatchThresholds::default().classify(similarity("INV-12345", "inv12345")),
            Some(MatchType::Exact)
        );
    }

    #[test]
    fn identical_ids_score_one() {
        assert_eq!(similarity("FAC 001", "FAC 001"), 1.0);
        assert_eq!(similarity("", ""), 1.0);
    }

    #[test]
    fn containment_is_penalized() {
        let score = similarity("X123456789", "123456789");
        assert!((score - 0.72).abs() < 1e-9);
        assert_eq!(MatchThresholds::default().classify(score), Some(MatchType::Partial));

        // 8个字符中5个: 0.5，不匹配
        let score = similarity("INV-12345", "12345");
        assert!((score - 0.5).abs() < 1e-9);
        assert_eq!(MatchThresholds::default().classify(score), None);
    }

    #[test]
    fn empty_against_non_empty_scores_zero() {
        assert_eq!(similarity("", "A1"), 0.0);
    }

    #[test]
    fn positional_mismatch_ratio() {
        // 10个字符中替换1个
        let score = similarity("1234567890", "1234567899");
        assert!((score - 0.9).abs() < 1e-9);
        assert_eq!(MatchThresholds::default().classify(score), Some(MatchType::Partial));
    }

    #[test]
    fn positional_is_shift_sensitive_where_levenshtein_is_not() {
        let left = normalize_identifier("A1234567");
        let right = normalize_identifier("AB1234567");

        let positional = PositionalSimilarity::default().score(&left, &right);
        let levenshtein = LevenshteinSimilarity::default().score(&left, &right);

        // 插入后只有首字符对齐
        assert!((positional - 1.0 / 9.0).abs() < 1e-9);
        // 9个字符中插入1个
        assert!((levenshtein - 8.0 / 9.0).abs() < 1e-9);
    }

    #[test]
    fn levenshtein_distance_basics() {
        assert_eq!(levenshtein_distance("", ""), 0);
        assert_eq!(levenshtein_distance("abc", ""), 3);
        assert_eq!(levenshtein_distance("kitten", "sitting"), 3);
        assert_eq!(levenshtein_distance("ñandú", "nandu"), 2);
    }

    #[test]
    fn closure_strategy() {
        let strategy = FnSimilarity(|a: &str, b: &str| if a.len() == b.len() { 1.0 } else { 0.0 });
        assert_eq!(strategy.score("abc", "xyz"), 1.0);
        assert_eq!(strategy.score("abc", "xy"), 0.0);
    }

    #[test]
    fn threshold_boundaries() {
        let thresholds = MatchThresholds::default();
        assert_eq!(thresholds.classify(0.95), Some(MatchType::Exact));
        assert_eq!(thresholds.classify(0.9499), Some(MatchType::Partial));
        assert_eq!(thresholds.classify(0.70), Some(MatchType::Partial));
        assert_eq!(thresholds.classify(0.6999), None);
    }

    #[test]
    fn kind_builds_matching_strategy() {
        let strategy = SimilarityKind::Levenshtein.build(DEFAULT_SUBSTRING_PENALTY);
        assert!((strategy.score("abcd", "abxd") - 0.75).abs() < 1e-9);
        let strategy = SimilarityKind::Positional.build(DEFAULT_SUBSTRING_PENALTY);
        assert!((strategy.score("abcd", "abxd") - 0.75).abs() < 1e-9);
    }
}
