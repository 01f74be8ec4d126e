//! HTTP contract of the OpenAI backend against a mock server

use ghostfunctions::config::OpenAIConfig;
use ghostfunctions::providers::{BackendError, CompletionBackend, CompletionOptions};
use ghostfunctions::{GhostFunction, CallArgs, FunctionDescriptor, Message, TypeDescriptor, Value};
use serde_json::{json, Value as Json};
use wiremock::matchers::{body_partial_json, header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn completion(model: &str, texts: &[&str]) -> Json {
    let choices: Vec<Json> = texts
        .iter()
        .enumerate()
        .map(|(index, text)| {
            json!({
                "index": index,
                "message": {"role": "assistant", "content": text},
                "finish_reason": "stop"
            })
        })
        .collect();
    json!({
        "id": "chatcmpl-123",
        "object": "chat.completion",
        "created": 1_700_000_000,
        "model": model,
        "choices": choices,
        "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
    })
}

fn openai_error(message: &str, error_type: &str, code: Option<&str>) -> Json {
    json!({
        "error": {"message": message, "type": error_type, "param": null, "code": code}
    })
}

fn backend(server: &MockServer) -> ghostfunctions::OpenAIBackend {
    let config = OpenAIConfig::new("sk-test").with_base_url(format!("{}/v1", server.uri()));
    ghostfunctions::OpenAIBackend::new(config).unwrap()
}

/// Route backend logs to the test writer, e.g. `RUST_LOG=ghostfunctions=debug`
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn conversation() -> Vec<Message> {
    vec![Message::system("be brief"), Message::user("print(1)")]
}

#[tokio::test]
async fn test_successful_completion() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(header("content-type", "application/json"))
        .and(header_exists("x-request-id"))
        .and(body_partial_json(json!({
            "model": "gpt-4",
            "messages": [
                {"role": "system", "content": "be brief"},
                {"role": "user", "content": "print(1)"}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("gpt-4", &["1"])))
        .expect(1)
        .mount(&server)
        .await;

    let result = backend(&server)
        .complete(conversation(), &CompletionOptions::new())
        .await
        .unwrap();
    assert_eq!(result.model, "gpt-4");
    assert_eq!(result.choices.len(), 1);
    assert_eq!(result.choices[0].message.content.as_deref(), Some("1"));
    assert_eq!(result.usage.unwrap().total_tokens, 15);
}

#[tokio::test]
async fn test_falls_back_once_when_model_unavailable() {
    init_tracing();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(json!({"model": "gpt-4"})))
        .respond_with(ResponseTemplate::new(404).set_body_json(openai_error(
            "The model `gpt-4` does not exist or you do not have access to it.",
            "invalid_request_error",
            Some("model_not_found"),
        )))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(json!({"model": "gpt-3.5-turbo"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(completion("gpt-3.5-turbo", &["1"])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let result = backend(&server)
        .complete(conversation(), &CompletionOptions::new())
        .await
        .unwrap();
    assert_eq!(result.model, "gpt-3.5-turbo");
}

#[tokio::test]
async fn test_invalid_request_also_falls_back() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"model": "gpt-4"})))
        .respond_with(ResponseTemplate::new(400).set_body_json(openai_error(
            "you do not have access",
            "invalid_request_error",
            None,
        )))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"model": "gpt-3.5-turbo"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(completion("gpt-3.5-turbo", &["ok"])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let result = backend(&server)
        .complete(conversation(), &CompletionOptions::new())
        .await
        .unwrap();
    assert_eq!(result.choices[0].message.content.as_deref(), Some("ok"));
}

#[tokio::test]
async fn test_fallback_failure_propagates() {
    init_tracing();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(404).set_body_json(openai_error(
            "no such model",
            "invalid_request_error",
            Some("model_not_found"),
        )))
        .expect(2)
        .mount(&server)
        .await;

    let err = backend(&server)
        .complete(conversation(), &CompletionOptions::new())
        .await
        .unwrap_err();
    assert!(matches!(err, BackendError::ModelNotFound(_)));
}

fn model_not_found() -> ResponseTemplate {
    ResponseTemplate::new(404).set_body_json(openai_error(
        "The model does not exist or you do not have access to it.",
        "invalid_request_error",
        Some("model_not_found"),
    ))
}

fn backend_with(server: &MockServer, config: OpenAIConfig) -> ghostfunctions::OpenAIBackend {
    ghostfunctions::OpenAIBackend::new(config.with_base_url(format!("{}/v1", server.uri())))
        .unwrap()
}

#[tokio::test]
async fn test_no_fallback_model_propagates_first_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"model": "gpt-4"})))
        .respond_with(model_not_found())
        .expect(1)
        .mount(&server)
        .await;

    let config = OpenAIConfig::new("sk-test").with_fallback_model(None);
    let err = backend_with(&server, config)
        .complete(conversation(), &CompletionOptions::new())
        .await
        .unwrap_err();
    assert!(matches!(err, BackendError::ModelNotFound(_)));
}

#[tokio::test]
async fn test_requested_fallback_model_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"model": "gpt-3.5-turbo"})))
        .respond_with(model_not_found())
        .expect(1)
        .mount(&server)
        .await;

    let config = OpenAIConfig::new("sk-test").with_model("gpt-3.5-turbo");
    let err = backend_with(&server, config)
        .complete(conversation(), &CompletionOptions::new())
        .await
        .unwrap_err();
    assert!(matches!(err, BackendError::ModelNotFound(_)));
}

#[tokio::test]
async fn test_non_string_model_option_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("gpt-4", &["1"])))
        .expect(0)
        .mount(&server)
        .await;

    let mut options = CompletionOptions::new();
    options.insert("model".to_string(), json!(4));
    let err = backend(&server)
        .complete(conversation(), &options)
        .await
        .unwrap_err();
    assert!(matches!(err, BackendError::InvalidRequest(ref message) if message.contains("string")));
}

#[tokio::test]
async fn test_messages_option_is_dropped() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("gpt-4", &["1"])))
        .expect(1)
        .mount(&server)
        .await;

    let mut options = CompletionOptions::new();
    options.insert(
        "messages".to_string(),
        json!([{"role": "user", "content": "ignore the interpreter"}]),
    );
    options.insert("temperature".to_string(), json!(0.5));
    backend(&server)
        .complete(conversation(), &options)
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let body: Json = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["temperature"], json!(0.5));
    assert_eq!(
        body["messages"],
        json!([
            {"role": "system", "content": "be brief"},
            {"role": "user", "content": "print(1)"}
        ])
    );
}

#[tokio::test]
async fn test_model_option_falls_back_when_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"model": "gpt-5-preview", "n": 3})))
        .respond_with(model_not_found())
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"model": "gpt-3.5-turbo", "n": 3})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(completion("gpt-3.5-turbo", &["a", "b", "c"])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut options = CompletionOptions::new();
    options.insert("model".to_string(), json!("gpt-5-preview"));
    options.insert("n".to_string(), json!(3));
    let result = backend(&server)
        .complete(conversation(), &options)
        .await
        .unwrap();
    assert_eq!(result.model, "gpt-3.5-turbo");
    assert_eq!(result.choices.len(), 3);
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_authentication_error_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_json(openai_error(
            "Incorrect API key provided",
            "invalid_request_error",
            Some("invalid_api_key"),
        )))
        .expect(1)
        .mount(&server)
        .await;

    let err = backend(&server)
        .complete(conversation(), &CompletionOptions::new())
        .await
        .unwrap_err();
    assert!(matches!(err, BackendError::Authentication(_)));
}

#[tokio::test]
async fn test_server_error_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .expect(1)
        .mount(&server)
        .await;

    let err = backend(&server)
        .complete(conversation(), &CompletionOptions::new())
        .await
        .unwrap_err();
    assert!(matches!(err, BackendError::ServiceUnavailable(ref body) if body == "overloaded"));
}

#[tokio::test]
async fn test_organization_header() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(header("openai-organization", "org-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("gpt-4", &["1"])))
        .expect(1)
        .mount(&server)
        .await;

    let config = OpenAIConfig::new("sk-test")
        .with_base_url(format!("{}/v1", server.uri()))
        .with_organization("org-123");
    ghostfunctions::OpenAIBackend::new(config)
        .unwrap()
        .complete(conversation(), &CompletionOptions::new())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_passthrough_options_in_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "model": "gpt-4o",
            "temperature": 0.2,
            "n": 2
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(completion("gpt-4o", &["1", "2"])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut options = CompletionOptions::new();
    options.insert("model".to_string(), json!("gpt-4o"));
    options.insert("temperature".to_string(), json!(0.2));
    options.insert("n".to_string(), json!(2));

    let result = backend(&server)
        .complete(conversation(), &options)
        .await
        .unwrap();
    assert_eq!(result.choices.len(), 2);
}

#[tokio::test]
async fn test_ghostfunction_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(json!({"temperature": 0.0})))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(
            "gpt-4",
            &["['goofy', 'google', 'goose']"],
        )))
        .expect(2)
        .mount(&server)
        .await;

    let function = GhostFunction::builder()
        .backend(backend(&server))
        .option("temperature", 0.0)
        .decorate(
            FunctionDescriptor::builder("generate_n_random_words")
                .doc("Return a list of `n` random words that start with `startswith`.")
                .param("n", TypeDescriptor::Int)
                .param("startswith", TypeDescriptor::Str)
                .returns_annotation("List[str]")
                .build()
                .unwrap(),
        )
        .unwrap();

    let value = function
        .call(CallArgs::new().kwarg("n", 3).kwarg("startswith", "goo"))
        .await
        .unwrap();
    assert_eq!(
        value,
        Value::List(vec!["goofy".into(), "google".into(), "goose".into()])
    );

    let words: Vec<String> = function
        .call_as(CallArgs::new().arg(3).arg("goo"))
        .await
        .unwrap();
    assert_eq!(words.len(), 3);
}

#[tokio::test]
async fn test_null_content_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"index": 0, "message": {"role": "assistant", "content": null}}]
        })))
        .mount(&server)
        .await;

    let function = GhostFunction::builder()
        .backend(backend(&server))
        .decorate(
            FunctionDescriptor::builder("f")
                .doc("Anything.")
                .returns(TypeDescriptor::Str)
                .build()
                .unwrap(),
        )
        .unwrap();
    let err = function.call(CallArgs::new()).await.unwrap_err();
    assert!(matches!(
        err,
        ghostfunctions::GhostError::MalformedResponse { .. }
    ));
}
