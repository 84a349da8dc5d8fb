//! End-to-end forwarding tests against an in-process collector

use pipeshell_collector::{MemoryIngest, create_router};
use pipeshell_runner::{MemorySink, Shell};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// Serves a collector on an ephemeral port and returns its base URL
async fn start_collector() -> (String, MemoryIngest) {
    let ingest = MemoryIngest::new();
    let app = create_router(Arc::new(ingest.clone()));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), ingest)
}

fn parse(body: &str) -> Value {
    serde_json::from_str(body).unwrap()
}

#[tokio::test]
async fn stream_only_delivers_every_record_before_returning() {
    let (base, ingest) = start_collector().await;

    let output = Shell::new()
        .args(["sh", "-c", "echo hello world; echo 'no such file' >&2"])
        .http_stream_only(format!("{}/logs", base))
        .stream()
        .await
        .unwrap();

    assert!(output.success());

    // No waiting: close() already drained all deliveries
    let mut records: Vec<(String, String)> = ingest
        .bodies()
        .iter()
        .map(|b| {
            let v = parse(b);
            (
                v["level"].as_str().unwrap().to_string(),
                v["msg"].as_str().unwrap().to_string(),
            )
        })
        .collect();
    records.sort();

    assert_eq!(
        records,
        vec![
            ("error".to_string(), "no such file".to_string()),
            ("info".to_string(), "hello world".to_string()),
        ]
    );
}

#[tokio::test]
async fn tee_mode_writes_locally_and_forwards() {
    let (base, ingest) = start_collector().await;
    let local = MemorySink::new();

    Shell::new()
        .args(["sh", "-c", "echo one; echo two"])
        .log_kv("job", "tee")
        .http_stream(format!("{}/logs", base))
        .sink(Arc::new(local.clone()))
        .stream()
        .await
        .unwrap();

    let local_lines = local.lines();
    assert_eq!(local_lines.len(), 2);

    let mut forwarded = ingest.bodies();
    forwarded.sort();
    let mut expected = local_lines.clone();
    expected.sort();
    assert_eq!(forwarded, expected);

    for body in &forwarded {
        assert_eq!(parse(body)["job"], "tee");
    }
}

#[tokio::test]
async fn exec_forwards_output_as_single_records() {
    let (base, ingest) = start_collector().await;

    let stdout = Shell::new()
        .args(["sh", "-c", "echo line1; echo line2"])
        .http_stream_only(format!("{}/logs", base))
        .exec()
        .await
        .unwrap();

    assert_eq!(stdout, "line1\nline2");

    let bodies = ingest.bodies();
    assert_eq!(bodies.len(), 1);
    assert_eq!(parse(&bodies[0])["msg"], "line1\nline2");
}

#[tokio::test]
async fn auth_route_receives_records_with_headers() {
    let (base, ingest) = start_collector().await;

    Shell::new()
        .args(["echo", "authenticated"])
        .header("Authorization", "Bearer secret")
        .http_stream_only(format!("{}/logs/auth", base))
        .stream()
        .await
        .unwrap();

    let bodies = ingest.bodies();
    assert_eq!(bodies.len(), 1);
    assert_eq!(parse(&bodies[0])["msg"], "authenticated");
}

#[tokio::test]
async fn many_lines_all_arrive() {
    let (base, ingest) = start_collector().await;

    let output = Shell::new()
        .args(["sh", "-c", "i=1; while [ $i -le 200 ]; do echo line$i; i=$((i+1)); done"])
        .http_stream_only(format!("{}/logs", base))
        .http_timeout(Duration::from_secs(10))
        .stream()
        .await
        .unwrap();

    assert_eq!(output.stdout.lines().count(), 200);

    let mut received: Vec<String> = ingest
        .bodies()
        .iter()
        .map(|b| parse(b)["msg"].as_str().unwrap().to_string())
        .collect();
    received.sort();

    let mut expected: Vec<String> = (1..=200).map(|i| format!("line{}", i)).collect();
    expected.sort();

    assert_eq!(received, expected);
}

#[tokio::test]
async fn failing_command_still_delivers_records() {
    let (base, ingest) = start_collector().await;

    let err = Shell::new()
        .args(["sh", "-c", "echo 'about to fail' >&2; exit 2"])
        .http_stream_only(format!("{}/logs", base))
        .stream()
        .await
        .unwrap_err();

    assert_eq!(err.exit_code(), Some(2));

    let bodies = ingest.bodies();
    assert_eq!(bodies.len(), 1);
    assert_eq!(parse(&bodies[0])["level"], "error");
}

#[tokio::test]
async fn custom_field_names_reach_collector() {
    let (base, ingest) = start_collector().await;

    Shell::new()
        .args(["echo", "renamed"])
        .format(pipeshell_core::RecordFormat {
            timestamp_field: "ts".to_string(),
            level_field: "severity".to_string(),
            message_field: "message".to_string(),
        })
        .http_stream_only(format!("{}/logs", base))
        .stream()
        .await
        .unwrap();

    let record = parse(&ingest.bodies()[0]);
    assert_eq!(record["severity"], "info");
    assert_eq!(record["message"], "renamed");
    assert!(record["ts"].is_i64());
}
