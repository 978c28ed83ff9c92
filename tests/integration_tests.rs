// tests/integration_tests.rs
use std::collections::BTreeMap;
use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use evalrun::client::ApiClient;
use evalrun::config::{AppConfig, EvalJobConfig};
use evalrun::models::ResultSet;
use evalrun::{poller, report};

fn test_config(base_url: &str) -> AppConfig {
    AppConfig {
        api_key: "test-key".to_string(),
        base_url: base_url.to_string(),
        poll_interval_ms: 10,
        max_wait_ms: 5_000,
        debug: false,
    }
}

/// End-to-end pass over a mock server: submit a two-record car-finder job,
/// watch its single batch go running → completed, fetch the one-step result
/// and check the rendered summary row.
#[tokio::test]
async fn submitted_job_polls_to_completion_and_renders_costs() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/eval/submit"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "evalGroupId": "g1",
            "totalEvals": 1,
            "submissions": [{
                "batchExecutionId": "b1",
                "evalName": "e1",
                "status": "queued"
            }]
        })))
        .mount(&server)
        .await;

    // first poll sees the batch still running, every later poll sees it done
    Mock::given(method("GET"))
        .and(path("/v1/eval/batches"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "batches": [{
                "batchExecutionId": "b1",
                "evalName": "e1",
                "status": "running",
                "totalRecords": 2,
                "processedRecords": 1,
                "failedRecords": 0
            }]
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/eval/batches"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "batches": [{
                "batchExecutionId": "b1",
                "evalName": "e1",
                "status": "completed",
                "totalRecords": 2,
                "processedRecords": 2,
                "failedRecords": 0
            }]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/eval/b1/results"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "evalName": "e1",
            "results": {
                "rec-1": [{
                    "stepName": "search",
                    "stepType": "model",
                    "modelUsed": "small-1",
                    "durationMs": 87,
                    "totalCost": 0.0123,
                    "output": "found 3 listings"
                }]
            }
        })))
        .mount(&server)
        .await;

    let config = test_config(&server.uri());
    let api = ApiClient::new(reqwest::Client::new(), config.clone());
    let job = EvalJobConfig::from_value(json!({
        "flow_definition": {"name": "car-finder"},
        "records": [{}, {}],
        "eval_configs": [{}]
    }));

    let submitted = api.submit(&job).await.expect("submit failed");
    assert_eq!(submitted.submissions.len(), 1);

    let batches = poller::poll_until_done(
        &api,
        &submitted.submissions,
        Duration::from_millis(config.poll_interval_ms),
        Duration::from_millis(config.max_wait_ms),
    )
    .await
    .expect("poll failed");

    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0].status, "completed");

    let mut results: BTreeMap<String, ResultSet> = BTreeMap::new();
    for batch in &batches {
        let set = api
            .get_results(&batch.batch_execution_id)
            .await
            .expect("results fetch failed");
        results.insert(batch.batch_execution_id.clone(), set);
    }

    let table = report::summary_table(&batches, &results);
    assert!(table.contains("| e1 | 2 | 2 | 0 | completed | $0.0123 |"));

    let markdown = report::build_report(&batches, &results, "2026-02-03T04:05:06Z");
    assert!(markdown.contains("### Record `rec-1`"));
    assert!(markdown.contains("| search | model | small-1 | 87 | $0.0123 | found 3 listings |"));
}

/// A result fetch failure must not fail the run; the batch just loses its
/// cost column.
#[tokio::test]
async fn summary_renders_na_cost_when_results_were_not_fetched() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/eval/batches"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "batches": [{"batch_execution_id": "b1", "eval_name": "e1", "status": "failed"}]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/eval/b1/results"))
        .respond_with(ResponseTemplate::new(500).set_body_string("storage offline"))
        .mount(&server)
        .await;

    let config = test_config(&server.uri());
    let api = ApiClient::new(reqwest::Client::new(), config.clone());

    let submissions = vec![evalrun::models::Submission {
        batch_execution_id: "b1".to_string(),
        eval_name: "e1".to_string(),
        status: "queued".to_string(),
        queue_name: None,
    }];

    let batches = poller::poll_until_done(
        &api,
        &submissions,
        Duration::from_millis(config.poll_interval_ms),
        Duration::from_millis(config.max_wait_ms),
    )
    .await
    .expect("poll failed");

    assert!(api.get_results("b1").await.is_err());

    let table = report::summary_table(&batches, &BTreeMap::new());
    assert!(table.contains("| e1 | N/A | N/A | N/A | failed | N/A |"));
}
