//! Row and summary → human/json string formatting.
//!
//! Two modes:
//! - **Human** (default): one `column  value` line per column, `(nil)` for nulls
//! - **JSON** (`--json`): one compact JSON object per row, suitable for NDJSON

use eventsink_core::{BoundValue, Error, ProjectedRow};
use eventsink_engine::SinkStats;

/// Output formatting mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
}

/// Format a written row.
pub fn format_row(row: &ProjectedRow, line: usize, mode: OutputMode) -> String {
    match mode {
        OutputMode::Json => row.to_json().to_string(),
        OutputMode::Human => {
            let width = row.names().map(str::len).max().unwrap_or(0);
            let mut out = format!("(row) line {}", line);
            for (name, value) in row.iter() {
                out.push_str(&format!("\n  {:<width$}  {}", name, format_value_human(value)));
            }
            out
        }
    }
}

fn format_value_human(value: &BoundValue) -> String {
    match value {
        BoundValue::Null => "(nil)".to_string(),
        BoundValue::Uuid(u) => u.to_string(),
        other => other.to_json().to_string(),
    }
}

/// Format a record-local failure.
pub fn format_error(err: &Error, line: usize, mode: OutputMode) -> String {
    match mode {
        OutputMode::Json => serde_json::json!({
            "line": line,
            "error": err.to_string(),
        })
        .to_string(),
        OutputMode::Human => format!("(error) line {}: {}", line, err),
    }
}

/// Format the end-of-input summary.
pub fn format_summary(stats: &SinkStats, malformed: u64, mode: OutputMode) -> String {
    match mode {
        OutputMode::Json => serde_json::json!({
            "written": stats.written,
            "rejected": stats.rejected,
            "failed": stats.failed,
            "malformed": malformed,
        })
        .to_string(),
        OutputMode::Human => format!(
            "{} written, {} rejected, {} failed, {} malformed",
            stats.written, stats.rejected, stats.failed, malformed
        ),
    }
}
