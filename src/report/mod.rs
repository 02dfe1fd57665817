mod json;
mod terminal;

pub use json::JsonReporter;
pub use terminal::TerminalReporter;

use crate::intersect::Fingerprint;
use miette::Result;
use serde::Serialize;
use std::path::PathBuf;

/// Output format for reports
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ReportFormat {
    #[default]
    Terminal,
    Json,
}

impl ReportFormat {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "terminal" | "text" => Some(ReportFormat::Terminal),
            "json" => Some(ReportFormat::Json),
            _ => None,
        }
    }
}

/// Outcome of matching one extra APK against the manifest pattern
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatternCheck {
    pub label: String,

    /// `None` when the APK has no manifest to test
    pub matched: Option<bool>,

    /// Tracked manifest tags whose count lies outside the family's range
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags_out_of_range: Vec<String>,
}

/// Reporter for intersection results
pub struct Reporter {
    format: ReportFormat,
    output_path: Option<PathBuf>,
    max_items: usize,
}

impl Reporter {
    pub fn new(format: ReportFormat, output_path: Option<PathBuf>) -> Self {
        Self {
            format,
            output_path,
            max_items: 50,
        }
    }

    pub fn with_max_items(mut self, max_items: usize) -> Self {
        self.max_items = max_items;
        self
    }

    pub fn report(&self, fingerprint: &Fingerprint, checks: &[PatternCheck]) -> Result<()> {
        match &self.format {
            ReportFormat::Terminal => {
                let reporter = TerminalReporter::new().with_max_items(self.max_items);
                reporter.report(fingerprint, checks)
            }
            ReportFormat::Json => {
                let reporter = JsonReporter::new(self.output_path.clone());
                reporter.report(fingerprint, checks)
            }
        }
    }
}
