//! Integration tests for `AnalysisClient` using wiremock HTTP mocks.

use leadscout_analysis::{AnalysisClient, AnalysisError};
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> AnalysisClient {
    AnalysisClient::with_base_url(
        "test-key",
        "claude-3-haiku-20240307",
        30,
        "leadscout-test",
        base_url,
    )
    .expect("client construction should not fail")
}

fn answer(text: &str) -> serde_json::Value {
    serde_json::json!({
        "id": "msg_01",
        "type": "message",
        "role": "assistant",
        "model": "claude-3-haiku-20240307",
        "content": [ { "type": "text", "text": text } ],
        "stop_reason": "end_turn"
    })
}

#[tokio::test]
async fn analyze_fetches_page_and_parses_answer() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<html><body><h1>Little Learners Daycare</h1><p>Ages 6 weeks to 5 years</p></body></html>",
        ))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/messages"))
        .and(header("x-api-key", "test-key"))
        .and(header("anthropic-version", "2023-06-01"))
        .and(body_string_contains("Little Learners Daycare"))
        .respond_with(ResponseTemplate::new(200).set_body_json(answer(
            r#"{"seo_score": 45, "critical_issues": ["8.5s load time"], "revenue_impact": "$5,000-8,000/month", "quick_wins": ["Compress hero images"], "pitch_angle": "Parents won't wait 8 seconds."}"#,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let analysis = test_client(&server.uri())
        .analyze(&format!("{}/", server.uri()), "Little Learners", "daycare")
        .await
        .expect("analysis should succeed");

    assert_eq!(analysis.seo_score, Some(45));
    assert_eq!(analysis.critical_issues, vec!["8.5s load time"]);
    assert_eq!(analysis.revenue_impact.as_deref(), Some("$5,000-8,000/month"));
    assert_eq!(analysis.quick_wins, vec!["Compress hero images"]);
    assert!(analysis.services_offered.is_empty());
}

#[tokio::test]
async fn api_error_is_surfaced_with_status() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/messages"))
        .respond_with(ResponseTemplate::new(401).set_body_string(
            r#"{"type":"error","error":{"type":"authentication_error","message":"invalid x-api-key"}}"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let err = test_client(&server.uri())
        .with_retry(3, 0)
        .analyze_text("https://site.example", "Site", "plumbers", "We fix pipes")
        .await
        .unwrap_err();

    assert!(
        matches!(err, AnalysisError::Api { status: 401, ref body } if body.contains("authentication_error")),
        "unexpected error: {err:?}"
    );
}

#[tokio::test]
async fn overloaded_api_is_retried() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/messages"))
        .respond_with(ResponseTemplate::new(529))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(answer(r#"{"cta_quality": "Weak"}"#)))
        .mount(&server)
        .await;

    let analysis = test_client(&server.uri())
        .with_retry(2, 0)
        .analyze_text("https://site.example", "Site", "plumbers", "We fix pipes")
        .await
        .expect("retry should recover");
    assert_eq!(analysis.cta_quality.as_deref(), Some("Weak"));
}

#[tokio::test]
async fn unreachable_page_is_a_fetch_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = test_client(&server.uri())
        .analyze(&format!("{}/", server.uri()), "Gone", "dentists")
        .await
        .unwrap_err();
    assert!(matches!(err, AnalysisError::PageFetch(_)));
}

#[tokio::test]
async fn prose_answer_is_a_deserialize_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/messages"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(answer("Sorry, I can't help with that.")),
        )
        .mount(&server)
        .await;

    let err = test_client(&server.uri())
        .analyze_text("https://site.example", "Site", "plumbers", "text")
        .await
        .unwrap_err();
    assert!(matches!(err, AnalysisError::Deserialize { .. }));
}
