/*!
 * Reporting functionality for wixgen
 *
 * Prints a summary of a generation run, either as tables rendered with the
 * tabled library or as JSON for scripting.
 */

use std::time::Duration;

use clap::ValueEnum;
use serde::Serialize;
use tabled::{
    settings::{object::Columns, Alignment, Modify, Padding, Style},
    Table, Tabled,
};

use crate::error::Result;
use crate::utils::format_count;

/// Most components a report carries, longer runs keep only the first ones
pub const LISTED_COMPONENTS: usize = 15;

/// Rows shown in the console table when a run has more than `LISTED_COMPONENTS`
const TRUNCATED_ROWS: usize = 10;

/// Component listed in the report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentSummary {
    /// Component identifier
    pub id: String,
    /// Source path of the file
    pub source: String,
}

/// Statistics for a generation run
#[derive(Debug, Clone, Serialize)]
pub struct GenerationReport {
    /// Output file path
    pub output_file: String,
    /// Time taken to walk and write
    pub duration: Duration,
    /// Number of nested directories written
    pub containers: usize,
    /// Number of components emitted by traversal
    pub component_count: usize,
    /// First components emitted by traversal, in document order
    pub components: Vec<ComponentSummary>,
    /// Component references in the feature section
    pub manifest: Vec<String>,
}

/// Format of the report output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ReportFormat {
    /// Console table output
    #[default]
    Table,
    /// JSON on stdout
    Json,
    /// No report
    None,
}

/// Report generator for generation results
pub struct Reporter {
    format: ReportFormat,
}

impl Reporter {
    /// Create a new reporter
    pub fn new(format: ReportFormat) -> Self {
        Self { format }
    }

    /// Generate a report string, `None` when reporting is disabled
    pub fn generate_report(&self, report: &GenerationReport) -> Result<Option<String>> {
        match self.format {
            ReportFormat::Table => Ok(Some(self.generate_console_report(report))),
            ReportFormat::Json => Ok(Some(serde_json::to_string_pretty(report)?)),
            ReportFormat::None => Ok(None),
        }
    }

    /// Print the report to stdout
    pub fn print_report(&self, report: &GenerationReport) -> Result<()> {
        if let Some(text) = self.generate_report(report)? {
            println!("\n{}", text);
        }
        Ok(())
    }

    // Keep the tail of long paths, it holds the file name
    fn format_path(&self, path: &str, max_len: usize) -> String {
        if path.chars().count() <= max_len {
            return path.to_string();
        }

        let mut segments = Vec::new();
        let mut current_len = 3; // "..."
        for part in path.rsplit('/') {
            let part_len = part.chars().count() + 1;
            if current_len + part_len > max_len {
                break;
            }
            segments.push(part);
            current_len += part_len;
        }

        if segments.is_empty() {
            let tail: String = path
                .chars()
                .rev()
                .take(max_len.saturating_sub(3))
                .collect::<Vec<_>>()
                .into_iter()
                .rev()
                .collect();
            return format!("...{}", tail);
        }

        let mut result = String::from("...");
        for part in segments.iter().rev() {
            result.push('/');
            result.push_str(part);
        }
        result
    }

    fn styled(table: &mut Table) -> String {
        table
            .with(Style::rounded())
            .with(Padding::new(1, 1, 0, 0))
            .with(Modify::new(Columns::new(..)).with(Alignment::left()));
        table.to_string()
    }

    fn create_summary_table(&self, report: &GenerationReport) -> String {
        #[derive(Tabled)]
        struct SummaryRow {
            #[tabled(rename = "Metric")]
            key: String,

            #[tabled(rename = "Value")]
            value: String,
        }

        let rows = vec![
            SummaryRow {
                key: "📂 Output File".to_string(),
                value: report.output_file.clone(),
            },
            SummaryRow {
                key: "⏱️ Process Time".to_string(),
                value: format!("{:.4?}", report.duration),
            },
            SummaryRow {
                key: "🗂️ Directories".to_string(),
                value: format_count(report.containers),
            },
            SummaryRow {
                key: "📄 Components".to_string(),
                value: format_count(report.component_count),
            },
            SummaryRow {
                key: "📦 Feature Entries".to_string(),
                value: format_count(report.manifest.len()),
            },
        ];

        Self::styled(&mut Table::new(rows))
    }

    fn create_components_table(&self, report: &GenerationReport) -> String {
        #[derive(Tabled)]
        struct ComponentRow {
            #[tabled(rename = "Component")]
            id: String,

            #[tabled(rename = "Source")]
            source: String,
        }

        // Long listings only show their first entries
        let shown = if report.component_count > LISTED_COMPONENTS {
            &report.components[..TRUNCATED_ROWS.min(report.components.len())]
        } else {
            &report.components[..]
        };

        let rows: Vec<ComponentRow> = shown
            .iter()
            .map(|c| ComponentRow {
                id: c.id.clone(),
                source: self.format_path(&c.source, 60),
            })
            .collect();

        Self::styled(&mut Table::new(rows))
    }

    fn generate_console_report(&self, report: &GenerationReport) -> String {
        let summary_table = self.create_summary_table(report);
        let summary_title = "✅  INSTALLER SOURCE WRITTEN";

        if report.components.is_empty() {
            return format!("{}\n{}", summary_title, summary_table);
        }

        let components_table = self.create_components_table(report);
        let components_title = if report.component_count > LISTED_COMPONENTS {
            "📋  FIRST 10 COMPONENTS"
        } else {
            "📋  COMPONENTS"
        };

        format!(
            "{}\n{}\n\n{}\n{}",
            components_title, components_table, summary_title, summary_table
        )
    }
}
