//! Presentation: batch reports and store status for the terminal.

use crate::error::ApiError;
use crate::generation::{GenerationReport, ItemStatus};
use crate::model::CompletionRecord;
use comfy_table::Table;
use owo_colors::OwoColorize;

/// One line per item, then a summary line.
pub fn format_generation_report(title: &str, report: &GenerationReport) -> String {
    let mut lines = vec![format!("{}", title.bold().underline())];
    for outcome in &report.outcomes {
        let line = match &outcome.status {
            ItemStatus::Ok => format!("{} {}", "OK".green(), outcome.key),
            ItemStatus::Failed { kinds } => {
                let kinds: Vec<&str> = kinds.iter().map(|k| k.as_str()).collect();
                format!(
                    "{} {} [{}]",
                    "FAILED".red(),
                    outcome.key,
                    kinds.join(", ")
                )
            }
            ItemStatus::Skipped => format!("{} {}", "SKIPPED".dimmed(), outcome.key),
            ItemStatus::Aborted { reason } => {
                format!("{} {}: {}", "ABORTED".yellow(), outcome.key, reason)
            }
        };
        lines.push(line);
    }
    lines.push(format!(
        "\n{} items: {} ok, {} failed, {} skipped, {} aborted",
        report.total(),
        report.succeeded,
        report.failed,
        report.skipped,
        report.aborted
    ));
    lines.join("\n")
}

pub fn format_status_text(succeeded: usize, failed: &[CompletionRecord]) -> String {
    let mut out = format!(
        "{}\n  Succeeded: {}\n  Failed: {}",
        "Completion store".bold().underline(),
        succeeded,
        failed.len()
    );
    if failed.is_empty() {
        return out;
    }

    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.set_header(vec!["Keyword", "Category", "Failed fields", "Reasons"]);
    for record in failed {
        let errors = record.errors.as_deref().unwrap_or_default();
        let kinds: Vec<&str> = errors.iter().map(|e| e.kind.as_str()).collect();
        let reasons: Vec<&str> = errors.iter().map(|e| e.reason.as_str()).collect();
        table.add_row(vec![
            record.input.key.clone(),
            record.input.category.clone(),
            kinds.join(", "),
            reasons.join("\n"),
        ]);
    }
    out.push_str(&format!("\n\n{}", table));
    out
}

pub fn format_status_json(
    succeeded: usize,
    failed: &[CompletionRecord],
) -> Result<String, ApiError> {
    let failed_rows: Vec<serde_json::Value> = failed
        .iter()
        .map(|record| {
            serde_json::json!({
                "keyword": record.input.key,
                "category": record.input.category,
                "errors": record.errors,
            })
        })
        .collect();
    let out = serde_json::json!({
        "succeeded": succeeded,
        "failed": failed.len(),
        "failed_records": failed_rows,
    });
    serde_json::to_string_pretty(&out)
        .map_err(|e| ApiError::RenderError(format!("status: {}", e)))
}
