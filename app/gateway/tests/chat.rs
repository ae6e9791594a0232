//! Tests for the chat route: wire protocol, message assembly, and the
//! pre-stream error path.

use llm::{Message, Role};
use otter_gateway::{ChatRequest, GatewayConfig, chat::build_messages};

#[test]
fn decodes_the_camel_case_wire_protocol() {
    let json = r#"{
        "messages": [
            {"role": "user", "content": "hello"},
            {"role": "assistant", "content": "hi"}
        ],
        "modelConfig": {
            "provider": "OpenAI",
            "model": "gpt-4o",
            "maxTokens": 4096,
            "temperature": 0.7,
            "topP": 0.9
        },
        "apiKey": "sk-user",
        "customEndpoint": {"baseURL": "http://localhost:1234/v1", "apiKey": "local"}
    }"#;
    let request: ChatRequest = serde_json::from_str(json).unwrap();

    assert_eq!(request.messages.len(), 2);
    let model_config = request.model_config.unwrap();
    assert_eq!(model_config.provider.as_deref(), Some("OpenAI"));
    assert_eq!(model_config.max_tokens, Some(4096));
    assert_eq!(model_config.temperature, Some(0.7));
    assert_eq!(request.api_key.as_deref(), Some("sk-user"));
    let endpoint = request.custom_endpoint.unwrap();
    assert_eq!(endpoint.base_url.as_deref(), Some("http://localhost:1234/v1"));
    assert_eq!(endpoint.api_key.as_deref(), Some("local"));
}

#[test]
fn minimal_request_decodes_with_defaults() {
    let request: ChatRequest =
        serde_json::from_str(r#"{"messages": [{"role": "user", "content": "hi"}]}"#).unwrap();
    assert!(request.model_config.is_none());
    assert!(request.api_key.is_none());
    assert!(request.custom_endpoint.is_none());
}

#[test]
fn build_messages_prepends_the_system_prompt() {
    let history = vec![Message::user("hello")];
    let messages = build_messages("be helpful", &history);
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0], Message::system("be helpful"));
    assert_eq!(messages[1], Message::user("hello"));
}

#[test]
fn build_messages_keeps_a_client_supplied_system_prompt() {
    let history = vec![Message::system("custom"), Message::user("hello")];
    let messages = build_messages("be helpful", &history);
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role, Role::System);
    assert_eq!(messages[0].content, "custom");
}

#[test]
fn build_messages_skips_an_empty_system_prompt() {
    let history = vec![Message::user("hello")];
    let messages = build_messages("", &history);
    assert_eq!(messages.len(), 1);
}

#[tokio::test]
async fn unknown_provider_yields_a_structured_500() {
    let handle = otter_gateway::serve(GatewayConfig::default(), "127.0.0.1:0")
        .await
        .unwrap();
    let url = format!("http://127.0.0.1:{}/chat", handle.port);

    let response = reqwest::Client::new()
        .post(&url)
        .json(&serde_json::json!({
            "messages": [{"role": "user", "content": "hi"}],
            "modelConfig": {"provider": "Frontier9000"}
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 500);
    let payload: serde_json::Value = response.json().await.unwrap();
    assert!(
        payload["error"]
            .as_str()
            .unwrap()
            .contains("unknown provider")
    );

    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn serve_binds_an_ephemeral_port_and_shuts_down() {
    let handle = otter_gateway::serve(GatewayConfig::default(), "127.0.0.1:0")
        .await
        .unwrap();
    assert_ne!(handle.port, 0);
    handle.shutdown().await.unwrap();
}
