// src/runner.rs
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use log::warn;

use crate::client::ApiClient;
use crate::config::{AppConfig, EvalJobConfig};
use crate::errors::Result;
use crate::models::{Batch, ResultSet, SubmitResponse};
use crate::poller;
use crate::report;

/// Runs one job end to end: submit, poll to completion, fetch per-batch
/// results, write the markdown report, and mirror the results to the console.
pub async fn run_job(
    api: &ApiClient,
    config: &AppConfig,
    job: &EvalJobConfig,
    output_path: &Path,
) -> Result<()> {
    let submitted = api.submit(job).await?;
    print_submission(&submitted);

    let batches = poller::poll_until_done(
        api,
        &submitted.submissions,
        Duration::from_millis(config.poll_interval_ms),
        Duration::from_millis(config.max_wait_ms),
    )
    .await?;

    // One fetch at a time; a failed fetch drops that batch from the detail
    // output but never the run.
    let mut results: BTreeMap<String, ResultSet> = BTreeMap::new();
    for batch in &batches {
        match api.get_results(&batch.batch_execution_id).await {
            Ok(set) => {
                results.insert(batch.batch_execution_id.clone(), set);
            }
            Err(e) => {
                warn!(
                    "⚠️  Skipping results for batch {}: {}",
                    batch.batch_execution_id, e
                );
            }
        }
    }

    let generated_at = chrono::Utc::now().to_rfc3339();
    let markdown = report::build_report(&batches, &results, &generated_at);
    match std::fs::write(output_path, &markdown) {
        Ok(()) => println!("📝 Report written to {}", output_path.display()),
        Err(e) => warn!(
            "⚠️  Could not write report to {}: {}",
            output_path.display(),
            e
        ),
    }

    print_summary(&batches, &results);
    print_details(&batches, &results);

    Ok(())
}

fn print_submission(submitted: &SubmitResponse) {
    let group = submitted.eval_group_id.as_deref().unwrap_or("(no group id)");
    let total = submitted
        .total_evals
        .unwrap_or(submitted.submissions.len() as u64);
    println!("🚀 Submitted {} eval(s) in group {}", total, group);
    for sub in &submitted.submissions {
        println!(
            "   • {} → batch {} ({})",
            sub.eval_name, sub.batch_execution_id, sub.status
        );
    }
    println!();
}

/// Console twin of `report::summary_table`, kept as its own code path so the
/// terminal stays readable without markdown glue.
fn print_summary(batches: &[Batch], results: &BTreeMap<String, ResultSet>) {
    let separator = "=".repeat(60);
    println!("\n{}", separator);
    println!("📊 Batch summary");
    println!("{}", separator);
    for batch in batches {
        let cost = results.get(&batch.batch_execution_id).map(report::total_cost);
        println!(
            "  {} [{}] records: {} processed: {} failed: {} cost: {}",
            batch.eval_name,
            batch.status,
            report::format_count(batch.total_records),
            report::format_count(batch.processed_records),
            report::format_count(batch.failed_records),
            report::format_cost(cost),
        );
    }
}

fn print_details(batches: &[Batch], results: &BTreeMap<String, ResultSet>) {
    for batch in batches {
        let Some(set) = results.get(&batch.batch_execution_id) else {
            continue;
        };
        println!("\n🎯 {} ({})", batch.eval_name, batch.batch_execution_id);
        for (record_id, steps) in &set.results {
            println!("  Record {}", record_id);
            for step in steps {
                println!(
                    "    {} [{}] model: {} duration: {}ms cost: {} output: {}",
                    step.step_name,
                    step.step_type,
                    step.model_used.as_deref().unwrap_or("N/A"),
                    report::format_count(step.duration_ms),
                    report::format_cost(step.total_cost),
                    step.output
                        .as_ref()
                        .map_or_else(String::new, report::truncate_preview),
                );
            }
        }
    }
    println!();
}
