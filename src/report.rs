/*!
 * Console summary of a snapshot run, rendered with tabled
 */

use std::time::Duration;

use tabled::{
    settings::{object::Columns, Alignment, Modify, Padding, Style},
    Table, Tabled,
};

use crate::tokenizer::TokenEstimate;
use crate::utils::{format_count, format_file_size};

/// Where the snapshot ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// Written to a file
    File(String),
    /// Printed to stdout
    Stdout,
    /// Nothing written (cancelled)
    None,
}

/// Statistics of one snapshot run
#[derive(Debug, Clone)]
pub struct SnapshotReport {
    /// Output destination
    pub destination: Destination,
    /// Whether the text was also copied to the clipboard
    pub copied: bool,
    /// Time taken by scan and build
    pub duration: Duration,
    /// Detected or requested framework
    pub framework: Option<String>,
    /// Template applied
    pub template: String,
    /// Checked files in the snapshot
    pub files_selected: usize,
    /// Files emitted as skip annotations
    pub files_skipped: usize,
    /// Token estimate of the final text
    pub estimate: TokenEstimate,
    /// Bytes of the written text
    pub bytes: usize,
    /// Number of parts when the output was split
    pub parts: Option<usize>,
}

#[derive(Tabled)]
struct SummaryRow {
    #[tabled(rename = "Metric")]
    key: String,

    #[tabled(rename = "Value")]
    value: String,
}

fn row(key: &str, value: impl Into<String>) -> SummaryRow {
    SummaryRow {
        key: key.to_string(),
        value: value.into(),
    }
}

impl SnapshotReport {
    fn rows(&self) -> Vec<SummaryRow> {
        let mut rows = Vec::new();

        let output = match &self.destination {
            Destination::File(path) => path.clone(),
            Destination::Stdout => "stdout".to_string(),
            Destination::None => "not written".to_string(),
        };
        rows.push(row("📂 Output", output));
        if self.copied {
            rows.push(row("📋 Clipboard", "copied"));
        }
        rows.push(row("⏱️ Process Time", format!("{:.4?}", self.duration)));

        if let Some(framework) = &self.framework {
            rows.push(row("🧩 Framework", framework.as_str()));
        }
        rows.push(row("📝 Template", self.template.as_str()));
        rows.push(row("📄 Files Selected", format_count(self.files_selected)));
        if self.files_skipped > 0 {
            rows.push(row("⏭️ Files Skipped", format_count(self.files_skipped)));
        }
        rows.push(row("🔤 Characters", format_count(self.estimate.characters)));
        if self.bytes > 0 {
            rows.push(row("💾 Size", format_file_size(self.bytes as u64)));
        }

        let status = if self.estimate.within_limit { "within" } else { "over" };
        rows.push(row(
            "📦 LLM Tokens",
            format!(
                "{} estimated ({} limit of {})",
                format_count(self.estimate.tokens),
                status,
                format_count(self.estimate.limit)
            ),
        ));

        if let Some(parts) = self.parts {
            rows.push(row("✂️ Parts", parts.to_string()));
        }

        rows
    }

    /// Render the summary table
    pub fn render(&self) -> String {
        let mut table = Table::new(self.rows());
        table
            .with(Style::rounded())
            .with(Padding::new(1, 1, 0, 0))
            .with(Modify::new(Columns::new(..)).with(Alignment::left()));

        format!("✅  SNAPSHOT COMPLETE\n{}", table)
    }

    /// Print the summary to stderr so stdout stays clean for `--stdout`
    pub fn print(&self) {
        eprintln!("\n{}", self.render());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::estimate_tokens;

    fn report() -> SnapshotReport {
        SnapshotReport {
            destination: Destination::File(".snapfs.snapshot.md".to_string()),
            copied: false,
            duration: Duration::from_millis(12),
            framework: Some("Rust".to_string()),
            template: "default".to_string(),
            files_selected: 1234,
            files_skipped: 0,
            estimate: estimate_tokens(&"x".repeat(8000), 1000),
            bytes: 8000,
            parts: None,
        }
    }

    #[test]
    fn test_render_summary() {
        let text = report().render();
        assert!(text.starts_with("✅  SNAPSHOT COMPLETE"));
        assert!(text.contains(".snapfs.snapshot.md"));
        assert!(text.contains("Rust"));
        assert!(text.contains("1,234"));
        assert!(text.contains("2,000 estimated (over limit of 1,000)"));
        assert!(text.contains("7.81 KB"));
        assert!(!text.contains("Files Skipped"));
        assert!(!text.contains("Parts"));
    }

    #[test]
    fn test_optional_rows() {
        let mut report = report();
        report.destination = Destination::Stdout;
        report.copied = true;
        report.files_skipped = 2;
        report.parts = Some(3);

        let text = report.render();
        assert!(text.contains("stdout"));
        assert!(text.contains("copied"));
        assert!(text.contains("Files Skipped"));
        assert!(text.contains("Parts"));
    }
}
