//! Default backend construction from the environment
//!
//! Kept in its own test binary with a single test so that no other test
//! observes the variables it changes.

use ghostfunctions::config::ConfigError;
use ghostfunctions::{ghostfunction, CallArgs, FunctionDescriptor, GhostError, TypeDescriptor, Value};
use serde_json::json;
use std::env;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn descriptor() -> FunctionDescriptor {
    FunctionDescriptor::builder("add")
        .doc("Add `a` and `b`.")
        .param("a", TypeDescriptor::Int)
        .param("b", TypeDescriptor::Int)
        .returns(TypeDescriptor::Int)
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_default_backend_from_environment() {
    env::remove_var("OPENAI_API_KEY");
    env::remove_var("OPENAI_ORGANIZATION");
    env::remove_var("OPENAI_BASE_URL");

    match ghostfunction(descriptor()).unwrap_err() {
        GhostError::Config(ConfigError::EnvVarNotFound { var }) => {
            assert_eq!(var, "OPENAI_API_KEY")
        }
        other => panic!("expected a missing key error, got {other}"),
    }

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-env"))
        .and(header("openai-organization", "org-env"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "5"}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    env::set_var("OPENAI_API_KEY", "sk-env");
    env::set_var("OPENAI_ORGANIZATION", "org-env");
    env::set_var("OPENAI_BASE_URL", format!("{}/v1", server.uri()));

    let add = ghostfunction(descriptor()).unwrap();

    env::remove_var("OPENAI_API_KEY");
    env::remove_var("OPENAI_ORGANIZATION");
    env::remove_var("OPENAI_BASE_URL");

    let value = add.call(CallArgs::new().arg(2).arg(3)).await.unwrap();
    assert_eq!(value, Value::Int(5));
}
