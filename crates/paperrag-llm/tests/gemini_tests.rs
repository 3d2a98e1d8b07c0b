use paperrag_core::config::LlmSettings;
use paperrag_core::error::Error;
use paperrag_core::traits::GenerativeModel;
use paperrag_llm::GeminiClient;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> GeminiClient {
    GeminiClient::new(&LlmSettings {
        api_key: Some("g-key".to_string()),
        base_url: server.uri(),
        timeout_secs: 5,
        ..LlmSettings::default()
    })
    .expect("client")
}

#[tokio::test]
async fn generate_posts_prompt_and_reads_first_candidate() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.5-pro:generateContent"))
        .and(header("x-goog-api-key", "g-key"))
        .and(body_partial_json(json!({"contents": [{"role": "user", "parts": [{"text": "Why mice?"}]}]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{"content": {"role": "model", "parts": [{"text": "Because of genetic similarity."}]}, "finishReason": "STOP"}],
            "usageMetadata": {"promptTokenCount": 12}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = client_for(&server).generate("Why mice?").await.expect("generate");
    assert_eq!(response.into_text().expect("text"), "Because of genetic similarity.");
}

#[tokio::test]
async fn http_failure_is_a_synthesis_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_string("quota"))
        .expect(1)
        .mount(&server)
        .await;

    match client_for(&server).generate("q").await {
        Err(Error::Synthesis(msg)) => assert!(msg.contains("429"), "{msg}"),
        other => panic!("expected Synthesis, got {other:?}"),
    }
}

#[tokio::test]
async fn unrecognized_body_is_a_synthesis_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"promptFeedback": {"blockReason": "SAFETY"}})))
        .mount(&server)
        .await;

    assert!(matches!(client_for(&server).generate("q").await, Err(Error::Synthesis(_))));
}

#[tokio::test]
async fn slow_model_times_out_as_synthesis_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"text": "late"})).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let client = GeminiClient::new(&LlmSettings {
        api_key: Some("g-key".to_string()),
        base_url: server.uri(),
        timeout_secs: 1,
        ..LlmSettings::default()
    })
    .expect("client");
    match client.generate("q").await {
        Err(Error::Synthesis(msg)) => assert!(msg.contains("timed out"), "{msg}"),
        other => panic!("expected Synthesis, got {other:?}"),
    }
}
