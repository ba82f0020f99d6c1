use httpmock::prelude::*;
use receipt_statement_linker::{
    CategorySet, FileInput, HttpInferenceClient, LinkOptions, Linker, LlmCategorizer,
    LlmTranscriber, LlmVendorMatcher, LocalStorage,
};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

fn completion(content: serde_json::Value) -> serde_json::Value {
    serde_json::json!({
        "choices": [{ "index": 0, "message": { "role": "assistant", "content": content.to_string() } }]
    })
}

fn write_input(dir: &Path, name: &str) -> FileInput {
    let path = dir.join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(b"\x89PNG fake image bytes").unwrap();
    FileInput::new(path)
}

fn mock_transcription(server: &MockServer) -> (httpmock::Mock<'_>, httpmock::Mock<'_>) {
    let receipt_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/chat/completions")
            .body_contains("Transcribe this receipt");
        then.status(200).json_body(completion(serde_json::json!({
            "vendor": "Starbucks",
            "datetime": "2024-05-02T07:45:00",
            "items": [{ "quantity": 1, "name": "Grande Latte", "price": 4.50 }],
            "subtotal": 4.50,
            "grand_total": 4.50
        })));
    });

    let statement_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/chat/completions")
            .body_contains("Transcribe this bank statement");
        then.status(200).json_body(completion(serde_json::json!({
            "transcribed_statements": [{
                "opening_balance": 250.00,
                "closing_balance": 241.00,
                "transactions": [
                    { "name": "STARBUCKS #12", "datetime": "2024-05-02", "withdrawal_amount": 4.50, "deposit_amount": null },
                    { "name": "CVS PHARMACY", "datetime": "2024-05-03", "withdrawal_amount": 4.50, "deposit_amount": null }
                ]
            }]
        })));
    });

    (receipt_mock, statement_mock)
}

#[tokio::test]
async fn test_end_to_end_link_without_categories() {
    let temp_dir = TempDir::new().unwrap();
    let server = MockServer::start();
    let (receipt_mock, statement_mock) = mock_transcription(&server);

    let client = Arc::new(HttpInferenceClient::new(&server.base_url(), Some("test-key".to_string()), 10).unwrap());
    let linker: Linker<_, _, LlmCategorizer, _> = Linker::new(
        LlmTranscriber::new(client.clone(), "gemini-2.5-flash"),
        LlmVendorMatcher::new(client, "gemini-2.5-flash"),
        LocalStorage::new(temp_dir.path()),
        LinkOptions {
            output_path: "out/linked.json".to_string(),
            csv_output_path: Some("out/linked.csv".to_string()),
            concurrent_requests: 2,
        },
    );

    let receipts = vec![write_input(temp_dir.path(), "latte.png")];
    let statements = vec![write_input(temp_dir.path(), "may.png")];
    let report = linker.run(&receipts, &statements).await.unwrap();

    receipt_mock.assert();
    statement_mock.assert();
    assert_eq!(report.matched, 1);
    assert_eq!(report.unmatched, 1);

    let json: serde_json::Value =
        serde_json::from_slice(&std::fs::read(temp_dir.path().join("out/linked.json")).unwrap()).unwrap();
    let records = json.as_array().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["transaction"]["name"], "STARBUCKS #12");
    assert_eq!(records[0]["receipt"]["vendor"], "Starbucks");
    assert_eq!(records[1]["transaction"]["name"], "CVS PHARMACY");
    assert!(records[1]["receipt"].is_null());
    assert_ne!(records[0]["id"], records[1]["id"]);

    let csv = std::fs::read_to_string(temp_dir.path().join("out/linked.csv")).unwrap();
    assert_eq!(csv.lines().count(), 3);
    assert!(csv.lines().nth(1).unwrap().contains("STARBUCKS #12"));
}

#[tokio::test]
async fn test_end_to_end_link_with_categories() {
    let temp_dir = TempDir::new().unwrap();
    let server = MockServer::start();
    mock_transcription(&server);

    let transaction_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/chat/completions")
            .body_contains("Categorize this bank transaction");
        then.status(200)
            .json_body(completion(serde_json::json!({ "category": "eating out" })));
    });
    let items_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/chat/completions")
            .body_contains("Categorize each line item");
        then.status(200)
            .json_body(completion(serde_json::json!({ "categories": ["EATING_OUT"] })));
    });

    let client = Arc::new(HttpInferenceClient::new(&server.base_url(), None, 10).unwrap());
    let linker = Linker::new(
        LlmTranscriber::new(client.clone(), "gemini-2.5-flash"),
        LlmVendorMatcher::new(client.clone(), "gemini-2.5-flash"),
        LocalStorage::new(temp_dir.path()),
        LinkOptions {
            output_path: "linked.json".to_string(),
            csv_output_path: None,
            concurrent_requests: 1,
        },
    )
    .with_categorizer(LlmCategorizer::new(
        client,
        "gemini-2.5-flash-lite",
        CategorySet::default(),
        None,
    ));

    let receipts = vec![write_input(temp_dir.path(), "latte.png")];
    let statements = vec![write_input(temp_dir.path(), "may.png")];
    linker.run(&receipts, &statements).await.unwrap();

    transaction_mock.assert_hits(2);
    items_mock.assert_hits(1);

    let json: serde_json::Value =
        serde_json::from_slice(&std::fs::read(temp_dir.path().join("linked.json")).unwrap()).unwrap();
    assert_eq!(json[0]["transaction"]["category"], "EATING_OUT");
    assert_eq!(json[0]["receipt"]["items"][0]["name"], "Grande Latte");
    assert_eq!(json[0]["receipt"]["items"][0]["category"], "EATING_OUT");
    assert!(json[1]["receipt"].is_null());
}

#[tokio::test]
async fn test_end_to_end_inference_failure_writes_no_output() {
    let temp_dir = TempDir::new().unwrap();
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/chat/completions");
        then.status(500).body("internal error");
    });

    let client = Arc::new(HttpInferenceClient::new(&server.base_url(), None, 10).unwrap());
    let linker: Linker<_, _, LlmCategorizer, _> = Linker::new(
        LlmTranscriber::new(client.clone(), "gemini-2.5-flash"),
        LlmVendorMatcher::new(client, "gemini-2.5-flash"),
        LocalStorage::new(temp_dir.path()),
        LinkOptions::default(),
    );

    let receipts = vec![write_input(temp_dir.path(), "latte.png")];
    let statements = vec![write_input(temp_dir.path(), "may.png")];
    let result = linker.run(&receipts, &statements).await;

    let err = result.unwrap_err();
    assert!(err.is_retryable());
    assert!(!temp_dir.path().join("linked_transactions.json").exists());
}
