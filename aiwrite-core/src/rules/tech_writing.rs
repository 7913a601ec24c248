use crate::allow::AllowList;
use crate::config::TechWritingConfig;
use crate::error::ConfigError;
use crate::patterns::PatternTable;
use crate::types::{Category, Match, RuleFamily, Severity};
use async_trait::async_trait;
use std::sync::Arc;

use super::engine::{scan, NodeContext, Rule, Target, TextView};

/// Writing-guideline hints (redundancy, voice, clarity, consistency,
/// structure) over paragraph text with inline code removed. The document
/// summary is produced by the aggregator, not here.
pub struct TechWritingRule {
    table: Arc<PatternTable>,
    categories: Vec<Category>,
    severity: Severity,
    allows: AllowList,
}

impl TechWritingRule {
    pub fn new(config: &TechWritingConfig, table: Arc<PatternTable>) -> Result<Self, ConfigError> {
        Ok(Self {
            table,
            categories: config.categories(),
            severity: config.common.severity,
            allows: AllowList::new(&config.common.allows)?,
        })
    }
}

#[async_trait]
impl Rule for TechWritingRule {
    fn family(&self) -> RuleFamily {
        RuleFamily::TechWriting
    }

    fn severity(&self) -> Severity {
        self.severity
    }

    fn targets(&self) -> &'static [Target] {
        &[Target::Paragraph]
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
