// src/poller.rs
use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use log::warn;
use tokio::time::{Instant, sleep};

use crate::client::BatchSource;
use crate::errors::{EvalError, Result};
use crate::models::{Batch, Submission};

/// Polls the status endpoint until every submitted batch reports a terminal
/// status, or the aggregate deadline elapses.
///
/// A transient listing error counts as a missed iteration: logged, slept
/// through, retried. There is no backoff and no retry cap; only the deadline
/// stops the loop. A batch the server never lists keeps the loop alive until
/// the deadline fires.
pub async fn poll_until_done<S: BatchSource>(
    source: &S,
    submissions: &[Submission],
    poll_interval: Duration,
    max_wait: Duration,
) -> Result<Vec<Batch>> {
    let targets: BTreeSet<&str> = submissions
        .iter()
        .map(|s| s.batch_execution_id.as_str())
        .collect();

    let start = Instant::now();
    let mut pending = targets.len();

    loop {
        let elapsed = start.elapsed();
        if elapsed > max_wait {
            return Err(EvalError::Timeout {
                waited_ms: elapsed.as_millis() as u64,
                pending,
            });
        }

        match source.list_batches(None).await {
            Ok(list) => {
                // Keyed by id so a duplicate row in the listing cannot be
                // counted twice against the target set.
                let mut tracked: BTreeMap<String, Batch> = BTreeMap::new();
                for batch in list.batches {
                    if targets.contains(batch.batch_execution_id.as_str()) {
                        tracked.insert(batch.batch_execution_id.clone(), batch);
                    }
                }

                print_progress(&tracked, targets.len());

                let terminal = tracked.values().filter(|b| b.is_terminal()).count();
                pending = targets.len() - terminal;
                if tracked.len() == targets.len() && pending == 0 {
                    return Ok(tracked.into_values().collect());
                }
            }
            Err(e) => {
                warn!("⚠️  Status check failed, will retry: {}", e);
            }
        }

        sleep(poll_interval).await;
    }
}

/// One console line per poll: counts grouped by status, plus how many of the
/// submitted batches the server is reporting at all.
fn print_progress(tracked: &BTreeMap<String, Batch>, total: usize) {
    let mut by_status: BTreeMap<&str, usize> = BTreeMap::new();
    for batch in tracked.values() {
        *by_status.entry(batch.status.as_str()).or_insert(0) += 1;
    }

    let summary = if by_status.is_empty() {
        "no batches reported yet".to_string()
    } else {
        by_status
            .iter()
            .map(|(status, count)| format!("{count} {status}"))
            .collect::<Vec<_>>()
            .join(", ")
    };

    println!("📊 Poll: {} ({}/{} reporting)", summary, tracked.len(), total);
}
