use crate::allow::AllowList;
use crate::config::EmphasisPatternsConfig;
use crate::error::ConfigError;
use crate::patterns::PatternTable;
use crate::types::{Category, Match, RuleFamily, Severity};
use async_trait::async_trait;
use std::sync::Arc;

use super::engine::{scan, NodeContext, Rule, Target, TextView};

const LIST_ITEM_PREFIX: &str = "リストアイテムで";

/// Emoji-plus-bold, bold info labels and bold inside headings. Works on raw
/// source because the markup itself is what gets flagged.
pub struct EmphasisPatternsRule {
    table: Arc<PatternTable>,
    categories: Vec<Category>,
    severity: Severity,
    allows: AllowList,
}

impl EmphasisPatternsRule {
    pub fn new(
        config: &EmphasisPatternsConfig,
        table: Arc<PatternTable>,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            table,
            categories: config.categories(),
            severity: config.common.severity,
            allows: AllowList::new(&config.common.allows)?,
        })
    }

    fn enabled(&self, wanted: &[Category]) -> Vec<Category> {
        wanted
            .iter()
            .copied()
            .filter(|category| self.categories.contains(category))
            .collect()
    }
}

#[async_trait]
impl Rule for EmphasisPatternsRule {
    fn family(&self) -> RuleFamily {
        RuleFamily::EmphasisPatterns
    }

    fn severity(&self) -> Severity {
        self.severity
    }

    fn targets(&self) -> &'static [Target] {
        &[Target::Paragraph, Target::ListItem, Target::Heading]
    }

    fn allow_list(&self) -> &AllowList {
        &self.allows
    }

    async fn check(&self, target: Target, cx: &NodeContext<'_>) -> Vec<Match> {
        match target {
            Target::Heading => {
                let categories = self.enabled(&[Category::HeadingEmphasis]);
                scan(cx, TextView::Source, self.table.select(&categories))
            }
            Target::Paragraph => {
                let categories = self.enabled(&[Category::SymbolEmphasis, Category::EmphasisLabel]);
                scan(cx, TextView::Source, self.table.select(&categories))
            }
            Target::ListItem => {
                let categories = self.enabled(&[Category::SymbolEmphasis, Category::EmphasisLabel]);
                let mut matches = scan(cx, TextView::Source, self.table.select(&categories));
                matches.retain(|found| !cx.in_nested_block(&found.range));
                for found in &mut matches {
                    found.message.insert_str(0, LIST_ITEM_PREFIX);
                }
                matches
            }
            Target::TableCell => Vec::new(),
        }
    }
}
