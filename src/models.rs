// src/models.rs
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::Result;

/// One server-side job created by a submit call. Its `batch_execution_id`
/// is the join key for all later polling and result fetching.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Submission {
    pub batch_execution_id: String,
    #[serde(default)]
    pub eval_name: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub queue_name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct SubmitResponse {
    #[serde(default)]
    pub eval_group_id: Option<String>,
    #[serde(default)]
    pub total_evals: Option<u64>,
    #[serde(default)]
    pub submissions: Vec<Submission>,
}

/// Server-reported status record for one batch. Mutates only on the server;
/// the client re-reads it on every poll.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Batch {
    pub batch_execution_id: String,
    #[serde(default)]
    pub eval_name: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub total_records: Option<u64>,
    #[serde(default)]
    pub processed_records: Option<u64>,
    #[serde(default)]
    pub failed_records: Option<u64>,
}

impl Batch {
    /// The status set is open-ended server-side; only these two end a poll.
    pub fn is_terminal(&self) -> bool {
        matches!(self.status.as_str(), "completed" | "failed")
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct BatchList {
    #[serde(default)]
    pub batches: Vec<Batch>,
}

/// Detailed results for one batch, keyed by record identifier. A BTreeMap
/// keeps record iteration stable across renders.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct ResultSet {
    #[serde(default)]
    pub eval_name: String,
    #[serde(default)]
    pub results: BTreeMap<String, Vec<StepResult>>,
}

/// One execution step's outcome within a record.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct StepResult {
    #[serde(default)]
    pub step_name: String,
    #[serde(default)]
    pub step_type: String,
    #[serde(default)]
    pub model_used: Option<String>,
    #[serde(default)]
    pub duration_ms: Option<u64>,
    #[serde(default)]
    pub total_cost: Option<f64>,
    #[serde(default)]
    pub output: Option<Value>,
}

/// Rewrites every object key in an API response to snake_case, recursively.
/// The server answers in either naming convention depending on deployment;
/// downstream code only ever sees the snake_case form. When both spellings
/// are present the snake_case value wins unless it is null.
pub fn normalize_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut out = serde_json::Map::with_capacity(map.len());
            let mut renamed: Vec<(String, Value)> = Vec::new();
            for (key, val) in map {
                let val = normalize_keys(val);
                let snake = to_snake_case(&key);
                if snake == key {
                    out.insert(key, val);
                } else {
                    renamed.push((snake, val));
                }
            }
            for (snake, val) in renamed {
                match out.get(&snake) {
                    Some(existing) if !existing.is_null() => {}
                    _ => {
                        out.insert(snake, val);
                    }
                }
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(normalize_keys).collect()),
        other => other,
    }
}

fn to_snake_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for (i, ch) in key.chars().enumerate() {
        if ch.is_ascii_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

/// Parses a raw API response into its typed shape after key normalization.
pub fn from_normalized<T: serde::de::DeserializeOwned>(raw: Value) -> Result<T> {
    Ok(serde_json::from_value(normalize_keys(raw))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_camel_case_keys_become_snake_case() {
        let raw = json!({
            "batchExecutionId": "b1",
            "evalName": "e1",
            "totalRecords": 10,
            "processedRecords": 7,
            "failedRecords": 1,
            "status": "running"
        });

        let batch: Batch = from_normalized(raw).unwrap();
        assert_eq!(batch.batch_execution_id, "b1");
        assert_eq!(batch.eval_name, "e1");
        assert_eq!(batch.total_records, Some(10));
        assert_eq!(batch.processed_records, Some(7));
        assert_eq!(batch.failed_records, Some(1));
    }

    #[test]
    fn test_snake_case_wins_when_both_present() {
        let raw = json!({"total_records": 5, "totalRecords": 9});
        let normalized = normalize_keys(raw);
        assert_eq!(normalized["total_records"], json!(5));
        assert!(normalized.get("totalRecords").is_none());
    }

    #[test]
    fn test_camel_case_fills_in_for_null_snake_case() {
        let raw = json!({"total_records": null, "totalRecords": 9});
        let normalized = normalize_keys(raw);
        assert_eq!(normalized["total_records"], json!(9));
    }

    #[test]
    fn test_normalization_recurses_into_arrays_and_objects() {
        let raw = json!({
            "batches": [
                {"batchExecutionId": "b1", "status": "queued"},
                {"batch_execution_id": "b2", "status": "running"}
            ]
        });

        let list: BatchList = from_normalized(raw).unwrap();
        assert_eq!(list.batches.len(), 2);
        assert_eq!(list.batches[0].batch_execution_id, "b1");
        assert_eq!(list.batches[1].batch_execution_id, "b2");
    }

    #[test]
    fn test_result_set_records_stay_ordered() {
        let raw = json!({
            "evalName": "e1",
            "results": {
                "rec-2": [{"stepName": "s", "stepType": "model"}],
                "rec-1": [{"step_name": "s", "step_type": "tool"}]
            }
        });

        let set: ResultSet = from_normalized(raw).unwrap();
        let keys: Vec<_> = set.results.keys().cloned().collect();
        assert_eq!(keys, vec!["rec-1".to_string(), "rec-2".to_string()]);
        assert_eq!(set.results["rec-1"][0].step_type, "tool");
    }

    #[test]
    fn test_terminal_statuses() {
        let mut batch = Batch {
            batch_execution_id: "b1".to_string(),
            eval_name: String::new(),
            status: "running".to_string(),
            total_records: None,
            processed_records: None,
            failed_records: None,
        };
        assert!(!batch.is_terminal());
        batch.status = "completed".to_string();
        assert!(batch.is_terminal());
        batch.status = "failed".to_string();
        assert!(batch.is_terminal());
    }
}
