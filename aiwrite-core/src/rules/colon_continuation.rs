use crate::allow::AllowList;
use crate::classifier::{ColonClass, MorphologicalClassifier};
use crate::config::ColonContinuationConfig;
use crate::document::BlockTrigger;
use crate::error::ConfigError;
use crate::patterns::{Detector, PatternTable};
use crate::types::{Category, Match, RuleFamily, Severity};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use super::engine::{NodeContext, Rule, Target, TextView};

/// A paragraph ending in a colon right before a code block, list, quote or
/// table, where the text in front of the colon is a predicate
/// (`実行します：`) rather than a noun (`使用方法：`).
pub struct ColonContinuationRule {
    table: Arc<PatternTable>,
    classifier: Arc<MorphologicalClassifier>,
    triggers: Vec<BlockTrigger>,
    severity: Severity,
    allows: AllowList,
}

impl ColonContinuationRule {
    pub fn new(
        config: &ColonContinuationConfig,
        table: Arc<PatternTable>,
        classifier: Arc<MorphologicalClassifier>,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            table,
            classifier,
            triggers: config.triggers(),
            severity: config.common.severity,
            allows: AllowList::new(&config.common.allows)?,
        })
    }

    fn detector(&self) -> Option<&Detector> {
        self.table.by_category(Category::ColonBeforeBlock).next()
    }

    fn followed_by_trigger(&self, detector: &Detector, cx: &NodeContext<'_>) -> bool {
        cx.next_sibling()
            .and_then(|sibling| sibling.kind.block_trigger())
            .is_some_and(|trigger| {
                detector.triggers().contains(&trigger) && self.triggers.contains(&trigger)
            })
    }
}

fn ends_with_colon(text: &str) -> bool {
    text.trim_end().ends_with(['：', ':'])
}

#[async_trait]
impl Rule for ColonContinuationRule {
    fn family(&self) -> RuleFamily {
        RuleFamily::ColonContinuation
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
        let Some(detector) = self.detector() else {
            return Vec::new();
        };
        if !ends_with_colon(cx.source()) || !self.followed_by_trigger(detector, cx) {
            return Vec::new();
        }

        let plain = cx.plain().as_str();
        // the colon must survive markup stripping (not inside code or a link)
        let Some(span) = detector.find(plain).into_iter().next() else {
            return Vec::new();
        };
        let colon = &plain[span.range.clone()];
        let before = plain[..span.range.start].trim();

        if self.classifier.classify_trailing_colon(before).await == ColonClass::Noun {
            return Vec::new();
        }

        let Some(range) = cx.map_plain(span.range.clone()) else {
            debug!(node = cx.node().id.0, "colon could not be mapped to source");
            return Vec::new();
        };
        vec![Match {
            detector: detector.id,
            category: detector.category,
            range,
            message: detector.message.render(&[colon, before, colon]),
        }]
    }
}
