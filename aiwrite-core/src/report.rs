use crate::types::*;
use anyhow::{bail, Result};
use std::fmt::Write as _;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    /// `path:line:column: severity message [rule]`, one line per finding
    #[default]
    Text,
    Json,
}

impl FromStr for ReportFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "text" => Ok(ReportFormat::Text),
            "json" => Ok(ReportFormat::Json),
            other => bail!("unknown report format '{other}' (expected 'text' or 'json')"),
        }
    }
}

impl LintReport {
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for file in &self.files {
            for diagnostic in &file.diagnostics {
                let _ = writeln!(
                    out,
                    "{}:{}:{}: {} {} [{}]",
                    file.path,
                    diagnostic.line,
                    diagnostic.column,
                    diagnostic.severity,
                    diagnostic.message,
                    diagnostic.rule
                );
            }
        }

        let total = self.total();
        let errors = self
            .files
            .iter()
            .flat_map(|file| &file.diagnostics)
            .filter(|diagnostic| diagnostic.severity == Severity::Error)
            .count();
        let _ = writeln!(
            out,
            "{} problem{} ({} error{}) in {} file{}",
            total,
            plural(total),
            errors,
            plural(errors),
            self.files.len(),
            plural(self.files.len())
        );
        out
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn render(&self, format: ReportFormat) -> Result<String> {
        match format {
            ReportFormat::Text => Ok(self.to_text()),
            ReportFormat::Json => self.to_json_pretty(),
        }
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> LintReport {
        LintReport::new(vec![FileReport {
            path: "notes.md".to_string(),
            diagnostics: vec![LocatedDiagnostic {
                rule: RuleFamily::ListFormatting,
                category: Some(Category::DecorativeSymbol),
                severity: Severity::Warning,
                message: "絵文字".to_string(),
                line: 2,
                column: 3,
                range: Some(10..13),
            }],
        }])
    }

    #[test]
    fn text_lines_carry_location_and_rule() {
        let text = sample().to_text();
        assert!(text.starts_with("notes.md:2:3: warning 絵文字 [no-ai-list-formatting]\n"));
        assert!(text.ends_with("1 problem (0 errors) in 1 file\n"));
    }

    #[test]
    fn json_carries_schema_and_ranges() {
        let json = sample().render(ReportFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["schema_version"], SCHEMA_VERSION);
        let diagnostic = &value["files"][0]["diagnostics"][0];
        assert_eq!(diagnostic["rule"], "no-ai-list-formatting");
        assert_eq!(diagnostic["category"], "decorative-symbol");
        assert_eq!(diagnostic["range"]["start"], 10);
        assert!(value["created_at"].is_string());
    }

    #[test]
    fn format_names_parse() {
        assert_eq!("json".parse::<ReportFormat>().unwrap(), ReportFormat::Json);
        assert!("xml".parse::<ReportFormat>().is_err());
    }
}
