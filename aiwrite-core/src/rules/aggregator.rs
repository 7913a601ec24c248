use crate::types::{Category, RuleFamily, Severity};
use std::collections::BTreeMap;

const GUIDELINE_URL: &str =
    "https://github.com/textlint-ja/textlint-rule-preset-ai-writing/blob/main/docs/tech-writing-guidelines.md";

/// Per-category match counts for one traversal. Owned by the traversal that
/// fills it; nothing else writes to it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryTally {
    counts: BTreeMap<Category, usize>,
}

impl CategoryTally {
    pub fn record(&mut self, category: Category) {
        *self.counts.entry(category).or_insert(0) += 1;
    }

    pub fn count(&self, category: Category) -> usize {
        self.counts.get(&category).copied().unwrap_or(0)
    }

    /// Non-zero counts in category declaration order
    pub fn iter(&self) -> impl Iterator<Item = (Category, usize)> + '_ {
        self.counts
            .iter()
            .filter(|(_, count)| **count > 0)
            .map(|(category, count)| (*category, *count))
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }
}

/// Document-level summary of the writing-guideline findings
#[derive(Debug, Clone)]
pub struct DocumentAggregator {
    severity: Severity,
}

impl DocumentAggregator {
    pub fn new(severity: Severity) -> Self {
        Self { severity }
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// One summary message, or None when the guideline family found nothing.
    /// Only categories owned by the tech-writing family are counted.
    pub fn summarize(&self, tally: &CategoryTally) -> Option<String> {
        let breakdown: Vec<(Category, usize)> = tally
            .iter()
            .filter(|(category, _)| category.family() == RuleFamily::TechWriting)
            .collect();
        let total: usize = breakdown.iter().map(|(_, count)| count).sum();
        if total == 0 {
            return None;
        }

        let parts: Vec<String> = breakdown
            .iter()
            .map(|(category, count)| format!("{}: {}件", category.label(), count))
            .collect();
        Some(format!(
            "【テクニカルライティング品質分析】この文書で{}件の改善提案が見つかりました [内訳: {}]。効果的なテクニカルライティングの7つのC（Clear, Concise, Correct, Coherent, Concrete, Complete, Courteous）の原則に基づいて見直しを検討してください。詳細なガイドライン: {}",
            total,
            parts.join(", "),
            GUIDELINE_URL
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_tally_has_no_summary() {
        let aggregator = DocumentAggregator::new(Severity::Info);
        assert_eq!(aggregator.summarize(&CategoryTally::default()), None);
    }

    #[test]
    fn breakdown_omits_zero_and_foreign_categories() {
        let mut tally = CategoryTally::default();
        tally.record(Category::Voice);
        tally.record(Category::Redundancy);
        tally.record(Category::Redundancy);
        tally.record(Category::StockPhrase);

        let message = DocumentAggregator::new(Severity::Error)
            .summarize(&tally)
            .unwrap();
        assert!(message.contains("この文書で3件の改善提案"));
        assert!(message.contains("[内訳: 簡潔性: 2件, 明確性: 1件]"));
        assert!(!message.contains("具体性"));
        assert_eq!(tally.total(), 4);
        assert_eq!(tally.count(Category::Clarity), 0);
    }

    #[test]
    fn only_foreign_categories_means_no_summary() {
        let mut tally = CategoryTally::default();
        tally.record(Category::LabelColonList);
        assert_eq!(DocumentAggregator::new(Severity::Error).summarize(&tally), None);
    }
}
