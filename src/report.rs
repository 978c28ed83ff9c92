// src/report.rs
use std::collections::BTreeMap;

use serde_json::Value;

use crate::models::{Batch, ResultSet};

pub const PREVIEW_MAX_CHARS: usize = 40;

/// Sum of every step's cost across every record of a result set; a missing
/// cost counts as zero.
pub fn total_cost(results: &ResultSet) -> f64 {
    results
        .results
        .values()
        .flat_map(|steps| steps.iter())
        .map(|step| step.total_cost.unwrap_or(0.0))
        .sum()
}

/// Costs render as fixed 4-decimal dollars; an absent cost is "N/A", never zero.
pub fn format_cost(cost: Option<f64>) -> String {
    match cost {
        Some(value) => format!("${value:.4}"),
        None => "N/A".to_string(),
    }
}

pub fn format_count(count: Option<u64>) -> String {
    count.map_or_else(|| "N/A".to_string(), |value| value.to_string())
}

/// Short preview of a step output: non-strings are serialized to JSON text
/// first, anything longer than 40 chars is clipped to 37 plus `...`.
pub fn truncate_preview(output: &Value) -> String {
    let text = match output {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    if text.chars().count() <= PREVIEW_MAX_CHARS {
        return text;
    }
    let clipped: String = text.chars().take(PREVIEW_MAX_CHARS - 3).collect();
    format!("{clipped}...")
}

/// Markdown summary: one row per batch. The cost column aggregates the
/// batch's fetched result set when available, otherwise "N/A".
pub fn summary_table(batches: &[Batch], results: &BTreeMap<String, ResultSet>) -> String {
    let mut out = String::new();
    out.push_str("| Eval | Total Records | Processed | Failed | Status | Total Cost |\n");
    out.push_str("|------|---------------|-----------|--------|--------|------------|\n");
    for batch in batches {
        let cost = results.get(&batch.batch_execution_id).map(total_cost);
        out.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} |\n",
            batch.eval_name,
            format_count(batch.total_records),
            format_count(batch.processed_records),
            format_count(batch.failed_records),
            batch.status,
            format_cost(cost),
        ));
    }
    out
}

/// Markdown detail section for one batch: a sub-table per record.
pub fn detail_section(batch: &Batch, results: &ResultSet) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "## {} ({})\n\n",
        batch.eval_name, batch.batch_execution_id
    ));

    if results.results.is_empty() {
        out.push_str("No records returned.\n\n");
        return out;
    }

    for (record_id, steps) in &results.results {
        out.push_str(&format!("### Record `{record_id}`\n\n"));
        out.push_str("| Step | Type | Model | Duration (ms) | Cost | Output |\n");
        out.push_str("|------|------|-------|---------------|------|--------|\n");
        for step in steps {
            out.push_str(&format!(
                "| {} | {} | {} | {} | {} | {} |\n",
                step.step_name,
                step.step_type,
                step.model_used.as_deref().unwrap_or("N/A"),
                format_count(step.duration_ms),
                format_cost(step.total_cost),
                step.output.as_ref().map_or_else(String::new, truncate_preview),
            ));
        }
        out.push('\n');
    }
    out
}

/// Full markdown document: summary first, then one detail section per batch
/// whose results were fetched. Deterministic for identical input.
pub fn build_report(
    batches: &[Batch],
    results: &BTreeMap<String, ResultSet>,
    generated_at: &str,
) -> String {
    let mut out = String::new();
    out.push_str("# Evaluation Report\n\n");
    out.push_str(&format!("Generated: {generated_at}\n\n"));
    out.push_str("## Summary\n\n");
    out.push_str(&summary_table(batches, results));
    out.push('\n');
    for batch in batches {
        if let Some(set) = results.get(&batch.batch_execution_id) {
            out.push_str(&detail_section(batch, set));
        }
    }
    out
}
