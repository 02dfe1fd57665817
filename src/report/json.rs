use super::PatternCheck;
use crate::intersect::Fingerprint;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::path::PathBuf;

/// JSON reporter for programmatic output
pub struct JsonReporter {
    output_path: Option<PathBuf>,
}

impl JsonReporter {
    pub fn new(output_path: Option<PathBuf>) -> Self {
        Self { output_path }
    }

    pub fn report(&self, fingerprint: &Fingerprint, checks: &[PatternCheck]) -> Result<()> {
        let json = render(fingerprint, checks)?;

        if let Some(path) = &self.output_path {
            std::fs::write(path, &json).into_diagnostic()?;
            println!("Report written to: {}", path.display());
        } else {
            println!("{}", json);
        }

        Ok(())
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    version: &'static str,
    fingerprint: &'a Fingerprint,
    #[serde(skip_serializing_if = "no_checks")]
    checks: &'a [PatternCheck],
}

fn no_checks(checks: &&[PatternCheck]) -> bool {
    checks.is_empty()
}

fn render(fingerprint: &Fingerprint, checks: &[PatternCheck]) -> Result<String> {
    let report = JsonReport {
        version: env!("CARGO_PKG_VERSION"),
        fingerprint,
        checks,
    };
    serde_json::to_string_pretty(&report).into_diagnostic()
}
