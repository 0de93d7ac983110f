//! Integration tests for `AssessmentClient` using wiremock HTTP mocks.

use aivis_analysis::{AnalysisError, AssessmentClient, AssessmentRequest};
use wiremock::matchers::{body_string_contains, method, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn request() -> AssessmentRequest {
    AssessmentRequest {
        keyword: "best crm software".to_string(),
        domain: "hypefresh.co".to_string(),
        text: "Top providers include Salesforce, HubSpot, and hypefresh.co.".to_string(),
    }
}

fn test_client(base_url: &str) -> AssessmentClient {
    AssessmentClient::with_base_url("test-key", 20, base_url)
        .expect("client construction should not fail")
}

fn reply_with_text(text: &str) -> serde_json::Value {
    serde_json::json!({
        "candidates": [
            {
                "content": { "parts": [ { "text": text } ] }
            }
        ]
    })
}

#[tokio::test]
async fn prose_wrapped_payload_is_extracted() {
    let server = MockServer::start().await;

    // The engine ignores the strict-JSON instruction and wraps the payload
    // in prose; exactly the three fields must still come through.
    let text = "Here is my assessment of the overview:\n\
        {\"sentiment\":\"Positive\",\"gap\":\"Missing comparison table\",\"strategy\":\"Publish a comparison table.\"}\n\
        Hope this helps!";

    Mock::given(method("POST"))
        .and(path_regex(r"^/v1beta/models/.+:generateContent$"))
        .and(body_string_contains("best crm software"))
        .respond_with(ResponseTemplate::new(200).set_body_json(reply_with_text(text)))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let analysis = client.assess(&request()).await.expect("should parse");

    assert!((analysis.sentiment_score - 0.7).abs() < f64::EPSILON);
    assert_eq!(analysis.gap.as_deref(), Some("Missing comparison table"));
    assert_eq!(
        analysis.strategy.as_deref(),
        Some("Publish a comparison table.")
    );
    assert!(analysis.sources.is_empty());
}

#[tokio::test]
async fn grounding_sources_are_collected_and_deduplicated() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "candidates": [
            {
                "content": {
                    "parts": [
                        { "text": "{\"sentiment\":\"Neutral\",\"gap\":\"g\",\"strategy\":\"s\",\"sources\":[\"https://a.example\"]}" }
                    ]
                },
                "groundingMetadata": {
                    "groundingChunks": [
                        { "web": { "uri": "https://a.example" } },
                        { "web": { "uri": "https://b.example" } },
                        { "web": {} }
                    ]
                }
            }
        ]
    });

    Mock::given(method("POST"))
        .and(path_regex(r":generateContent$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let analysis = client.assess(&request()).await.unwrap();

    assert_eq!(
        analysis.sources,
        vec!["https://a.example".to_string(), "https://b.example".to_string()]
    );
}

#[tokio::test]
async fn empty_candidate_list_is_an_empty_reply() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "candidates": [] })),
        )
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let result = client.assess(&request()).await;
    assert!(matches!(result, Err(AnalysisError::EmptyReply)));
}

#[tokio::test]
async fn reply_without_payload_degrades_to_no_payload() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(reply_with_text("I am unable to analyze this snippet.")),
        )
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let result = client.assess(&request()).await;
    assert!(matches!(result, Err(AnalysisError::NoPayload)));
}

#[tokio::test]
async fn engine_error_status_is_surfaced() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let result = client.assess(&request()).await;
    assert!(
        matches!(result, Err(AnalysisError::UnexpectedStatus { status: 500 })),
        "expected UnexpectedStatus(500), got: {result:?}"
    );
}
