use crate::allow::AllowList;
use crate::config::HypeExpressionsConfig;
use crate::error::ConfigError;
use crate::patterns::PatternTable;
use crate::types::{Category, Match, RuleFamily, Severity};
use async_trait::async_trait;
use std::sync::Arc;

use super::engine::{scan, NodeContext, Rule, Target, TextView};

pub struct HypeExpressionsRule {
    table: Arc<PatternTable>,
    categories: Vec<Category>,
    severity: Severity,
    allows: AllowList,
}

impl HypeExpressionsRule {
    pub fn new(
        config: &HypeExpressionsConfig,
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
impl Rule for HypeExpressionsRule {
    fn family(&self) -> RuleFamily {
        RuleFamily::HypeExpressions
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
        scan(cx, TextView::Plain, self.table.select(&self.categories))
    }
}
