use crate::allow::AllowList;
use crate::config::ListFormattingConfig;
use crate::error::ConfigError;
use crate::patterns::PatternTable;
use crate::types::{Category, Match, RuleFamily, Severity};
use async_trait::async_trait;
use std::sync::Arc;

use super::engine::{scan, NodeContext, Rule, Target, TextView};

/// Bold-label-plus-colon prefixes and decorative emoji in list items.
pub struct ListFormattingRule {
    table: Arc<PatternTable>,
    categories: Vec<Category>,
    severity: Severity,
    allows: AllowList,
}

impl ListFormattingRule {
    pub fn new(
        config: &ListFormattingConfig,
        table: Arc<PatternTable>,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            table,
            categories: config.categories(),
            severity: config.common.severity,
            allows: AllowList::new(&config.common.allows)?,
        })
    }
}

#[async_trait]
impl Rule for ListFormattingRule {
    fn family(&self) -> RuleFamily {
        RuleFamily::ListFormatting
    }

    fn severity(&self) -> Severity {
        self.severity
    }

    fn targets(&self) -> &'static [Target] {
        &[Target::ListItem]
    }

    fn allow_list(&self) -> &AllowList {
        &self.allows
    }

    async fn check(&self, _target: Target, cx: &NodeContext<'_>) -> Vec<Match> {
        let mut matches = scan(cx, TextView::Source, self.table.select(&self.categories));
        // nested lists are evaluated item by item; code and quotes are not ours
        matches.retain(|found| !cx.in_nested_block(&found.range));

        // one emoji report per item, the earliest
        let mut seen_symbol = false;
        matches.retain(|found| {
            if found.category != Category::DecorativeSymbol {
                return true;
            }
            !std::mem::replace(&mut seen_symbol, true)
        });
        matches
    }
}
