//! Integration tests for the Gemini adapter and the model gateway, run
//! against a local mock of the `generateContent` endpoint.

use api_lib::adapters::{GeminiModelAdapter, ModelGateway};
use api_lib::config::ModelProvider;
use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};
use workbench_core::domain::{ChatMessage, NoteTask};
use workbench_core::ports::{GenerativeModelService, PortError};

fn completion_response(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "candidates": [{
            "content": {
                "parts": [{"text": text}],
                "role": "model"
            }
        }]
    }))
}

/// Pulls the prompt text out of a recorded `generateContent` request body.
fn sent_prompt(request: &wiremock::Request) -> String {
    let body: Value = serde_json::from_slice(&request.body).expect("JSON body");
    body["contents"][0]["parts"][0]["text"]
        .as_str()
        .expect("prompt text")
        .to_string()
}

#[tokio::test]
async fn chat_request_renders_transcript_with_default_temperature() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/gemini-2.5-flash:generateContent"))
        .and(query_param("key", "test-key"))
        .respond_with(completion_response("Hello there"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let adapter = GeminiModelAdapter::with_api_base("test-key", mock_server.uri());
    let history = vec![ChatMessage::user("Hi")];

    let text = adapter
        .complete_chat("gemini-2.5-flash", &history, Some("Be brief."), None)
        .await
        .expect("completion");
    assert_eq!(text, "Hello there");

    let requests = mock_server.received_requests().await.expect("recorded");
    assert_eq!(requests.len(), 1);

    let body: Value = serde_json::from_slice(&requests[0].body).expect("JSON body");
    assert_eq!(body["contents"][0]["role"], "user");
    assert_eq!(
        body["contents"][0]["parts"][0]["text"],
        "System: Be brief.\nuser: Hi\nmodel:"
    );
    // The instruction is rendered into the prompt, not the system channel.
    assert!(body.get("systemInstruction").is_none());

    let temperature = body["generationConfig"]["temperature"]
        .as_f64()
        .expect("temperature");
    assert!((temperature - 0.7).abs() < 1e-6);
}

#[tokio::test]
async fn document_is_truncated_at_the_transmission_limit() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(completion_response("ok"))
        .mount(&mock_server)
        .await;

    let adapter = GeminiModelAdapter::with_api_base("test-key", mock_server.uri());

    // 'a' does not occur in the surrounding prompt template or question.
    let at_limit = "a".repeat(30_000);
    let over_limit = "a".repeat(30_001);

    adapter
        .analyze_document("gemini-2.5-flash", &at_limit, "q?", None)
        .await
        .expect("analysis");
    adapter
        .analyze_document("gemini-2.5-flash", &over_limit, "q?", None)
        .await
        .expect("analysis");

    let requests = mock_server.received_requests().await.expect("recorded");
    assert_eq!(requests.len(), 2);
    assert_eq!(sent_prompt(&requests[0]).matches('a').count(), 30_000);
    assert_eq!(sent_prompt(&requests[1]).matches('a').count(), 30_000);
}

#[tokio::test]
async fn document_question_uses_the_system_channel() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(completion_response("An answer."))
        .mount(&mock_server)
        .await;

    let adapter = GeminiModelAdapter::with_api_base("test-key", mock_server.uri());
    adapter
        .analyze_document(
            "gemini-2.5-flash",
            "Paris is the capital of France.",
            "What is the capital?",
            Some("Answer from the document."),
        )
        .await
        .expect("analysis");

    let requests = mock_server.received_requests().await.expect("recorded");
    let body: Value = serde_json::from_slice(&requests[0].body).expect("JSON body");
    assert_eq!(
        body["systemInstruction"]["parts"][0]["text"],
        "Answer from the document."
    );
    assert_eq!(body["systemInstruction"]["role"], "system");

    let prompt = sent_prompt(&requests[0]);
    assert!(prompt.starts_with("Context Document:\n"));
    assert!(prompt.ends_with("Question: What is the capital?"));
}

#[tokio::test]
async fn notes_requests_select_the_fixed_templates() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(completion_response("# Notes"))
        .mount(&mock_server)
        .await;

    let adapter = GeminiModelAdapter::with_api_base("test-key", mock_server.uri());
    adapter
        .transform_notes("gemini-2.5-flash", "- a\n- b", NoteTask::ToMarkdown)
        .await
        .expect("transform");
    adapter
        .transform_notes("gemini-2.5-flash", "# Draft", NoteTask::Improve)
        .await
        .expect("improve");

    let requests = mock_server.received_requests().await.expect("recorded");
    assert_eq!(requests.len(), 2);

    let to_markdown = sent_prompt(&requests[0]);
    assert!(to_markdown.starts_with("Convert the following raw notes"));
    assert!(to_markdown.ends_with("- a\n- b"));

    let improve = sent_prompt(&requests[1]);
    assert!(improve.starts_with("Improve the formatting"));
    assert!(improve.ends_with("# Draft"));
}

#[tokio::test]
async fn provider_error_envelope_becomes_a_remote_error() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "error": {
                "code": 429,
                "message": "Quota exceeded",
                "status": "RESOURCE_EXHAUSTED"
            }
        })))
        .mount(&mock_server)
        .await;

    let adapter = GeminiModelAdapter::with_api_base("test-key", mock_server.uri());
    let history = vec![ChatMessage::user("Hi")];

    let err = adapter
        .complete_chat("gemini-2.5-flash", &history, None, None)
        .await
        .expect_err("provider rejected the call");
    match err {
        PortError::Remote(message) => {
            assert!(message.contains("429"));
            assert!(message.contains("RESOURCE_EXHAUSTED: Quota exceeded"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn gateway_degrades_remote_failures_to_display_text() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream gone"))
        .mount(&mock_server)
        .await;

    let gateway = ModelGateway::new(ModelProvider::Gemini, Some(mock_server.uri()));
    gateway.set_credential("test-key").await;

    let history = vec![ChatMessage::user("Hi")];
    let text = gateway
        .complete_chat("gemini-2.5-flash", &history, None, None)
        .await
        .expect("remote failures are not raised");
    assert!(text.starts_with("Error: "), "got: {}", text);
    assert!(text.contains("upstream gone"));
}

#[tokio::test]
async fn gateway_substitutes_fallback_for_empty_completions() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"candidates": []})))
        .mount(&mock_server)
        .await;

    let gateway = ModelGateway::new(ModelProvider::Gemini, Some(mock_server.uri()));
    gateway.set_credential("test-key").await;

    let text = gateway
        .analyze_document("gemini-2.5-flash", "doc", "q?", None)
        .await
        .expect("analysis");
    assert_eq!(text, "No analysis generated.");
}

#[tokio::test]
async fn gateway_without_credential_never_touches_the_network() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(completion_response("unreachable"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let gateway = ModelGateway::new(ModelProvider::Gemini, Some(mock_server.uri()));
    let err = gateway
        .analyze_document("gemini-2.5-flash", "doc", "q?", None)
        .await
        .expect_err("no credential was provided");
    assert!(matches!(err, PortError::CredentialMissing));
}
