use crate::allow::AllowList;
use crate::classifier::MorphologicalClassifier;
use crate::config::LintConfig;
use crate::document::{Document, Node, NodeId, NodeKind};
use crate::error::ConfigError;
use crate::offsets::{strip, PlainText};
use crate::patterns::{Detector, PatternTable};
use crate::types::{Diagnostic, Match, RuleFamily, Severity};
use async_trait::async_trait;
use std::ops::Range;
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};
use tracing::{debug, info};

use super::aggregator::{CategoryTally, DocumentAggregator};
use super::colon_continuation::ColonContinuationRule;
use super::emphasis_patterns::EmphasisPatternsRule;
use super::formal_expressions::FormalExpressionsRule;
use super::hype_expressions::HypeExpressionsRule;
use super::list_formatting::ListFormattingRule;
use super::tech_writing::TechWritingRule;

// ===== NODE TARGETS =====

/// Node kinds a rule family can be evaluated on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Paragraph,
    ListItem,
    Heading,
    TableCell,
}

impl Target {
    pub fn of(kind: &NodeKind) -> Option<Self> {
        match kind {
            NodeKind::Paragraph => Some(Target::Paragraph),
            NodeKind::ListItem => Some(Target::ListItem),
            NodeKind::Heading { .. } => Some(Target::Heading),
            NodeKind::TableCell => Some(Target::TableCell),
            NodeKind::Document
            | NodeKind::List { .. }
            | NodeKind::BlockQuote
            | NodeKind::CodeBlock
            | NodeKind::Table
            | NodeKind::TableRow
            | NodeKind::ThematicBreak
            | NodeKind::Html
            | NodeKind::Str
            | NodeKind::Emphasis
            | NodeKind::Strong
            | NodeKind::Delete
            | NodeKind::Link
            | NodeKind::Image
            | NodeKind::InlineCode
            | NodeKind::Break { .. }
            | NodeKind::Other => None,
        }
    }
}

/// Which rendering of a node a rule reads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextView {
    /// Raw source including markup
    Source,
    /// Markup-free text from the offset mapper
    Plain,
}

// ===== NODE CONTEXT =====

/// Everything a rule may look at for one node. The plain-text view is
/// computed at most once, on first use.
pub struct NodeContext<'a> {
    document: &'a Document,
    node: &'a Node,
    plain: OnceLock<PlainText>,
}

impl<'a> NodeContext<'a> {
    pub fn new(document: &'a Document, id: NodeId) -> Self {
        Self {
            document,
            node: document.node(id),
            plain: OnceLock::new(),
        }
    }

    pub fn document(&self) -> &'a Document {
        self.document
    }

    pub fn node(&self) -> &'a Node {
        self.node
    }

    pub fn source(&self) -> &'a str {
        self.document.source_text(self.node.id)
    }

    pub fn plain(&self) -> &PlainText {
        self.plain.get_or_init(|| strip(self.document, self.node.id))
    }

    pub fn parent(&self) -> Option<&'a Node> {
        self.document.parent(self.node.id)
    }

    pub fn next_sibling(&self) -> Option<&'a Node> {
        self.document.next_sibling(self.node.id)
    }

    pub fn text(&self, view: TextView) -> &str {
        match view {
            TextView::Source => self.source(),
            TextView::Plain => self.plain().as_str(),
        }
    }

    /// Node-relative source range for a plain-text range
    pub fn map_plain(&self, range: Range<usize>) -> Option<Range<usize>> {
        self.plain().source_range(range)
    }

    /// Node-relative ranges of the lists, quotes, code blocks, tables and
    /// HTML blocks directly inside this node
    pub fn nested_block_ranges(&self) -> Vec<Range<usize>> {
        let base = self.node.range.start;
        self.document
            .children(self.node.id)
            .filter(|child| child.kind.is_nested_block())
            .filter_map(|child| {
                let start = child.range.start.checked_sub(base)?;
                let end = child.range.end.checked_sub(base)?;
                Some(start..end)
            })
            .collect()
    }

    /// Whether `range` touches any nested block's text
    pub fn in_nested_block(&self, range: &Range<usize>) -> bool {
        self.nested_block_ranges()
            .iter()
            .any(|nested| range.start < nested.end && range.end > nested.start)
    }
}

/// Run detectors over one view of a node and return node-relative matches.
/// Plain-text spans that cannot be mapped back to the source are dropped.
pub fn scan<'d>(
    cx: &NodeContext<'_>,
    view: TextView,
    detectors: impl Iterator<Item = &'d Detector>,
) -> Vec<Match> {
    let text = cx.text(view);
    let mut matches = Vec::new();
    for detector in detectors {
        for span in detector.find(text) {
            let range = match view {
                TextView::Source => Some(span.range.clone()),
                TextView::Plain => cx.map_plain(span.range.clone()),
            };
            let Some(range) = range else {
                debug!(
                    detector = detector.id,
                    node = cx.node().id.0,
                    plain = ?span.range,
                    "unmappable match skipped"
                );
                continue;
            };
            matches.push(Match {
                detector: detector.id,
                category: detector.category,
                range,
                message: detector.message_for(&span),
            });
        }
    }
    matches
}

// ===== RULE CONTRACT =====

/// One independently configured rule family.
#[async_trait]
pub trait Rule: Send + Sync {
    fn family(&self) -> RuleFamily;

    fn severity(&self) -> Severity;

    /// Node kinds this family evaluates
    fn targets(&self) -> &'static [Target];

    fn allow_list(&self) -> &AllowList;

    /// Text the allow-list is matched against
    fn allow_view(&self) -> TextView {
        TextView::Source
    }

    /// Produce node-relative matches for one node. May suspend (morphological
    /// classification); the evaluator awaits it before moving on.
    async fn check(&self, target: Target, cx: &NodeContext<'_>) -> Vec<Match>;
}

/// Receiver for reported diagnostics, in document order
pub trait DiagnosticSink {
    fn report(&mut self, node: &Node, diagnostic: Diagnostic);
}

impl DiagnosticSink for Vec<Diagnostic> {
    fn report(&mut self, _node: &Node, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

/// Counters from one traversal
#[derive(Debug, Clone, Default)]
pub struct LintOutcome {
    pub nodes_visited: usize,
    pub nodes_allowed: usize,
    pub diagnostics: usize,
    /// Time spent inside each family's `check`, in rule order
    pub rule_timings: Vec<(RuleFamily, Duration)>,
    pub elapsed: Duration,
}

// ===== LINTER =====

pub struct Linter {
    rules: Vec<Box<dyn Rule>>,
    aggregator: Option<DocumentAggregator>,
    table: Arc<PatternTable>,
}

impl Linter {
    /// Build the enabled rule families. Configuration misuse is reported
    /// here, never during a traversal.
    pub fn new(config: &LintConfig) -> Result<Self, ConfigError> {
        let classifier = MorphologicalClassifier::from_config(&config.classifier);
        Self::with_classifier(config, Arc::new(classifier))
    }

    pub fn with_classifier(
        config: &LintConfig,
        classifier: Arc<MorphologicalClassifier>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let table = Arc::new(PatternTable::builtin()?);
        let mut rules = Vec::new();

        for family in RuleFamily::ALL {
            if !config.is_enabled(family, &table) {
                debug!(rule = %family, "rule disabled");
                continue;
            }
            rules.push(build_rule_by_name(family, config, &table, &classifier)?);
        }

        let tech_writing = &config.rules.tech_writing;
        let aggregator = (config.is_enabled(RuleFamily::TechWriting, &table)
            && tech_writing.enable_document_analysis)
            .then(|| DocumentAggregator::new(tech_writing.common.severity));

        info!(
            rules = rules.len(),
            preset = %config.preset,
            tokenizer = classifier.tokenizer_name(),
            document_analysis = aggregator.is_some(),
            "linter ready"
        );

        Ok(Self {
            rules,
            aggregator,
            table,
        })
    }

    pub fn rule_families(&self) -> Vec<RuleFamily> {
        self.rules.iter().map(|rule| rule.family()).collect()
    }

    pub fn pattern_table(&self) -> &PatternTable {
        &self.table
    }

    /// Walk the document in pre-order and report every diagnostic to `sink`
    /// in document order.
    pub async fn lint(&self, document: &Document, sink: &mut dyn DiagnosticSink) -> LintOutcome {
        let started = Instant::now();
        let mut outcome = LintOutcome::default();
        let mut timings: Vec<Duration> = vec![Duration::ZERO; self.rules.len()];
        let mut tally = CategoryTally::default();

        let mut stack = vec![document.root()];
        while let Some(id) = stack.pop() {
            let node = document.node(id);
            outcome.nodes_visited += 1;
            stack.extend(node.children.iter().rev().copied());

            let Some(target) = Target::of(&node.kind) else {
                continue;
            };
            let cx = NodeContext::new(document, id);
            let mut candidates: Vec<(usize, Match)> = Vec::new();

            for (index, rule) in self.rules.iter().enumerate() {
                if !self.applies(rule.as_ref(), target, &cx) {
                    continue;
                }
                if rule.allow_list().matches(cx.text(rule.allow_view())) {
                    debug!(rule = %rule.family(), node = id.0, "node allow-listed");
                    outcome.nodes_allowed += 1;
                    continue;
                }
                let rule_start = Instant::now();
                let matches = rule.check(target, &cx).await;
                timings[index] += rule_start.elapsed();
                candidates.extend(matches.into_iter().map(|found| (index, found)));
            }

            for (index, found) in suppress_overlaps(candidates) {
                let rule = &self.rules[index];
                let range =
                    node.range.start + found.range.start..node.range.start + found.range.end;
                debug!(
                    rule = %rule.family(),
                    detector = found.detector,
                    node = id.0,
                    range = ?range,
                    "match"
                );
                tally.record(found.category);
                sink.report(
                    node,
                    Diagnostic {
                        rule: rule.family(),
                        category: Some(found.category),
                        severity: rule.severity(),
                        message: found.message,
                        node: id,
                        range: Some(range),
                    },
                );
                outcome.diagnostics += 1;
            }
        }

        if let Some(aggregator) = &self.aggregator {
            if let Some(message) = aggregator.summarize(&tally) {
                let root = document.node(document.root());
                sink.report(
                    root,
                    Diagnostic {
                        rule: RuleFamily::TechWriting,
                        category: None,
                        severity: aggregator.severity(),
                        message,
                        node: root.id,
                        range: None,
                    },
                );
                outcome.diagnostics += 1;
            }
        }

        outcome.rule_timings = self
            .rules
            .iter()
            .zip(timings)
            .map(|(rule, duration)| (rule.family(), duration))
            .collect();
        outcome.elapsed = started.elapsed();
        info!(
            nodes = outcome.nodes_visited,
            allowed = outcome.nodes_allowed,
            diagnostics = outcome.diagnostics,
            elapsed_ms = outcome.elapsed.as_millis() as u64,
            "lint finished"
        );
        outcome
    }

    /// Convenience wrapper collecting diagnostics into a Vec
    pub async fn lint_document(&self, document: &Document) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        self.lint(document, &mut diagnostics).await;
        diagnostics
    }

    fn applies(&self, rule: &dyn Rule, target: Target, cx: &NodeContext<'_>) -> bool {
        let targets = rule.targets();
        if !targets.contains(&target) {
            return false;
        }
        // A family that scans whole list items leaves the item's own
        // paragraphs alone.
        if target == Target::Paragraph && targets.contains(&Target::ListItem) {
            if let Some(parent) = cx.parent() {
                if parent.kind == NodeKind::ListItem {
                    return false;
                }
            }
        }
        true
    }
}

fn build_rule_by_name(
    family: RuleFamily,
    config: &LintConfig,
    table: &Arc<PatternTable>,
    classifier: &Arc<MorphologicalClassifier>,
) -> Result<Box<dyn Rule>, ConfigError> {
    let rules = &config.rules;
    let rule: Box<dyn Rule> = match family {
        RuleFamily::ListFormatting => Box::new(ListFormattingRule::new(
            &rules.list_formatting,
            Arc::clone(table),
        )?),
        RuleFamily::FormalExpressions => Box::new(FormalExpressionsRule::new(
            &rules.formal_expressions,
            Arc::clone(table),
        )?),
        RuleFamily::HypeExpressions => Box::new(HypeExpressionsRule::new(
            &rules.hype_expressions,
            Arc::clone(table),
        )?),
        RuleFamily::EmphasisPatterns => Box::new(EmphasisPatternsRule::new(
            &rules.emphasis_patterns,
            Arc::clone(table),
        )?),
        RuleFamily::TechWriting => Box::new(TechWritingRule::new(
            &rules.tech_writing,
            Arc::clone(table),
        )?),
        RuleFamily::ColonContinuation => Box::new(ColonContinuationRule::new(
            &rules.colon_continuation,
            Arc::clone(table),
            Arc::clone(classifier),
        )?),
    };
    debug!(rule = %family, "rule enabled");
    Ok(rule)
}

// ===== OVERLAP SUPPRESSION =====

fn intersects(a: &Range<usize>, b: &Range<usize>) -> bool {
    a.start < b.end && a.end > b.start
}

/// Drop matches that intersect a more specific match of another category.
/// Candidates are tagged with the index of the rule that produced them;
/// survivors come back in source order.
pub fn suppress_overlaps(candidates: Vec<(usize, Match)>) -> Vec<(usize, Match)> {
    let mut ranked: Vec<(usize, (usize, Match))> = candidates.into_iter().enumerate().collect();
    ranked.sort_by(|(a_order, (_, a)), (b_order, (_, b))| {
        b.category
            .specificity()
            .cmp(&a.category.specificity())
            .then(a_order.cmp(b_order))
    });

    let mut accepted: Vec<(usize, (usize, Match))> = Vec::with_capacity(ranked.len());
    for (order, (rule, candidate)) in ranked {
        let beaten = accepted.iter().any(|(_, (_, kept))| {
            kept.category != candidate.category && intersects(&kept.range, &candidate.range)
        });
        if beaten {
            debug!(detector = candidate.detector, "overlapping match suppressed");
            continue;
        }
        accepted.push((order, (rule, candidate)));
    }

    accepted.sort_by(|(a_order, (_, a)), (b_order, (_, b))| {
        a.range
            .start
            .cmp(&b.range.start)
            .then(a.range.end.cmp(&b.range.end))
            .then(a_order.cmp(b_order))
    });
    accepted.into_iter().map(|(_, tagged)| tagged).collect()
}
