use crate::config::LintConfig;
use crate::document::{Document, Node};
use crate::preprocessors::{MarkdownPreprocessor, Preprocessor};
use crate::rules::{DiagnosticSink, LintOutcome, Linter};
use crate::types::{Diagnostic, FileReport, LintReport, LocatedDiagnostic};
use anyhow::{Context, Result};
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Records how long each processing step took and logs a summary at the end
pub struct StepProfiler {
    enabled: bool,
    timings: Vec<(String, Duration)>,
}

impl StepProfiler {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            timings: Vec::new(),
        }
    }

    pub fn time_step<F, R>(&mut self, step_name: &str, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        if !self.enabled {
            return f();
        }

        let start = Instant::now();
        let result = f();
        self.record(step_name, start.elapsed());
        result
    }

    /// Add a measurement taken elsewhere (async steps time themselves)
    pub fn record(&mut self, step_name: &str, elapsed: Duration) {
        if !self.enabled {
            return;
        }
        debug!(step = step_name, elapsed_ms = elapsed.as_millis() as u64, "step finished");
        self.timings.push((step_name.to_string(), elapsed));
    }

    pub fn timings(&self) -> &[(String, Duration)] {
        &self.timings
    }

    pub fn log_summary(&self) {
        if !self.enabled || self.timings.is_empty() {
            return;
        }

        let total: Duration = self.timings.iter().map(|(_, d)| *d).sum();
        for (step, duration) in &self.timings {
            let percentage = if total.is_zero() {
                0.0
            } else {
                (duration.as_secs_f64() / total.as_secs_f64()) * 100.0
            };
            info!(
                step = %step,
                elapsed_ms = duration.as_millis() as u64,
                share = format!("{percentage:.1}%"),
                "profile"
            );
        }
        info!(total_ms = total.as_millis() as u64, "profile total");
    }
}

/// Sink that resolves line/column positions as diagnostics arrive
struct LocatingSink<'a> {
    document: &'a Document,
    diagnostics: Vec<LocatedDiagnostic>,
}

impl DiagnosticSink for LocatingSink<'_> {
    fn report(&mut self, node: &Node, diagnostic: Diagnostic) {
        let offset = diagnostic
            .range
            .as_ref()
            .map(|range| range.start)
            .unwrap_or(node.range.start);
        let (line, column) = self.document.line_col(offset);
        self.diagnostics.push(LocatedDiagnostic {
            rule: diagnostic.rule,
            category: diagnostic.category,
            severity: diagnostic.severity,
            message: diagnostic.message,
            line,
            column,
            range: diagnostic.range,
        });
    }
}

/// Parse → lint → locate, one file at a time
pub struct DocumentProcessor {
    preprocessor: Box<dyn Preprocessor>,
    linter: Linter,
    profile: bool,
}

impl DocumentProcessor {
    /// Markdown input with the given configuration
    pub fn new(config: &LintConfig) -> Result<Self> {
        let linter = Linter::new(config).context("failed to build rule set")?;
        Ok(Self::new_with_dependencies(
            Box::new(MarkdownPreprocessor::new()),
            linter,
        ))
    }

    pub fn new_with_dependencies(preprocessor: Box<dyn Preprocessor>, linter: Linter) -> Self {
        Self {
            preprocessor,
            linter,
            profile: false,
        }
    }

    /// Log per-step and per-rule timings for every processed file
    pub fn with_profiling(mut self, enabled: bool) -> Self {
        self.profile = enabled;
        self
    }

    pub fn linter(&self) -> &Linter {
        &self.linter
    }

    pub fn supports(&self, path: &Path) -> bool {
        self.preprocessor.supports_file_type(path)
    }

    pub async fn process_file(&self, path: &Path) -> Result<FileReport> {
        let mut profiler = StepProfiler::new(self.profile);
        let document = profiler.time_step("Read + Parse", || self.preprocessor.process_file(path))?;
        self.lint_parsed(&path.display().to_string(), &document, profiler)
            .await
    }

    /// Lint already loaded text. `label` is used as the report path.
    pub async fn process_str(&self, label: &str, source: &str) -> Result<FileReport> {
        let mut profiler = StepProfiler::new(self.profile);
        let document = profiler
            .time_step("Parse", || self.preprocessor.parse(source))
            .with_context(|| format!("failed to parse {label}"))?;
        self.lint_parsed(label, &document, profiler).await
    }

    async fn lint_parsed(
        &self,
        label: &str,
        document: &Document,
        mut profiler: StepProfiler,
    ) -> Result<FileReport> {
        debug!(
            path = label,
            preprocessor = self.preprocessor.name(),
            nodes = document.len(),
            "document parsed"
        );

        let mut sink = LocatingSink {
            document,
            diagnostics: Vec::new(),
        };
        let outcome: LintOutcome = self.linter.lint(document, &mut sink).await;
        profiler.record("Lint", outcome.elapsed);
        for (family, elapsed) in &outcome.rule_timings {
            profiler.record(family.id(), *elapsed);
        }
        profiler.log_summary();

        Ok(FileReport {
            path: label.to_string(),
            diagnostics: sink.diagnostics,
        })
    }

    /// Lint several files in order and collect one report
    pub async fn process_files(&self, paths: &[&Path]) -> Result<LintReport> {
        let mut files = Vec::with_capacity(paths.len());
        for path in paths {
            files.push(self.process_file(path).await?);
        }
        Ok(LintReport::new(files))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Preset;
    use std::io::Write;

    #[tokio::test]
    async fn reports_line_and_column() {
        let processor = DocumentProcessor::new(&LintConfig::default()).unwrap();
        let report = processor
            .process_str("memo.md", "# メモ\n\n手順は以下のような流れです。\n")
            .await
            .unwrap();
        assert_eq!(report.diagnostics.len(), 1);
        let diagnostic = &report.diagnostics[0];
        assert_eq!(diagnostic.line, 3);
        assert_eq!(diagnostic.column, 4);
        assert!(report.has_errors());
    }

    #[tokio::test]
    async fn summary_is_located_at_document_start() {
        let config = LintConfig::with_preset(Preset::All);
        let processor = DocumentProcessor::new(&config).unwrap().with_profiling(true);
        let report = processor
            .process_str("doc.md", "説明\n\nまず最初に設定を確認します。\n")
            .await
            .unwrap();
        let summary = report
            .diagnostics
            .iter()
            .find(|diagnostic| diagnostic.range.is_none())
            .expect("document summary");
        assert_eq!((summary.line, summary.column), (1, 1));
    }

    #[tokio::test]
    async fn reads_files_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "- ✅ 完了した項目").unwrap();
        let processor = DocumentProcessor::new(&LintConfig::default()).unwrap();
        let report = processor.process_files(&[file.path()]).await.unwrap();
        assert_eq!(report.total(), 1);
        assert_eq!(report.files[0].diagnostics[0].range, Some(2..5));
    }

    #[tokio::test]
    async fn missing_file_is_an_error() {
        let processor = DocumentProcessor::new(&LintConfig::default()).unwrap();
        assert!(processor
            .process_file(Path::new("/nonexistent/readme.md"))
            .await
            .is_err());
    }

    #[test]
    fn disabled_profiler_records_nothing() {
        let mut profiler = StepProfiler::new(false);
        let value = profiler.time_step("Parse", || 7);
        profiler.record("Lint", Duration::from_millis(3));
        assert_eq!(value, 7);
        assert!(profiler.timings().is_empty());
    }
}
