use crate::allow::AllowList;
use crate::config::FormalExpressionsConfig;
use crate::error::ConfigError;
use crate::patterns::PatternTable;
use crate::types::{Category, Match, RuleFamily, Severity};
use async_trait::async_trait;
use std::sync::Arc;

use super::engine::{scan, NodeContext, Rule, Target, TextView};

/// Stock transitional phrases, matched on rendered text so emphasis markers
/// inside a phrase do not hide it.
pub struct FormalExpressionsRule {
    table: Arc<PatternTable>,
    severity: Severity,
    allows: AllowList,
}

impl FormalExpressionsRule {
    pub fn new(
        config: &FormalExpressionsConfig,
        table: Arc<PatternTable>,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            table,
            severity: config.common.severity,
            allows: AllowList::new(&config.common.allows)?,
        })
    }
}

#[async_trait]
impl Rule for FormalExpressionsRule {
    fn family(&self) -> RuleFamily {
        RuleFamily::FormalExpressions
    }

    fn severity(&self) -> Severity {
        self.severity
    }

    fn targets(&self) -> &'static [Target] {
        &[Target::Paragraph, Target::Heading, Target::TableCell]
    }

    fn allow_list(&self) -> &AllowList {
        &self.allows
    }

    fn allow_view(&self) -> TextView {
        TextView::Plain
    }

    async fn check(&self, _target: Target, cx: &NodeContext<'_>) -> Vec<Match> {
        scan(cx, TextView::Plain, self.table.by_category(Category::StockPhrase))
    }
}
