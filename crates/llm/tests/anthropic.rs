//! Tests for Anthropic event parsing and request construction.

use otter_llm::{
    Anthropic, Client, FinishReason, General, Message,
    anthropic::{Event, Request},
};

#[test]
fn text_delta_maps_to_content_chunk() {
    let data = r#"{"type":"content_block_delta","index":0,"delta":{"type":"text_delta","text":"Hello"}}"#;
    let event: Event = serde_json::from_str(data).unwrap();
    let chunk = event.into_chunk().unwrap();
    assert_eq!(chunk.content(), Some("Hello"));
}

#[test]
fn message_start_carries_metadata_only() {
    let data = r#"{"type":"message_start","message":{"id":"msg_01","model":"claude-3-5-sonnet-20240620"}}"#;
    let event: Event = serde_json::from_str(data).unwrap();
    let chunk = event.into_chunk().unwrap();
    assert_eq!(chunk.meta.id.as_str(), "msg_01");
    assert!(chunk.content().is_none());
}

#[test]
fn end_turn_maps_to_stop() {
    let data = r#"{"type":"message_delta","delta":{"stop_reason":"end_turn"},"usage":{"output_tokens":42}}"#;
    let event: Event = serde_json::from_str(data).unwrap();
    let chunk = event.into_chunk().unwrap();
    assert_eq!(chunk.reason(), Some(&FinishReason::Stop));
}

#[test]
fn max_tokens_maps_to_length() {
    let data = r#"{"type":"message_delta","delta":{"stop_reason":"max_tokens"}}"#;
    let event: Event = serde_json::from_str(data).unwrap();
    let chunk = event.into_chunk().unwrap();
    assert_eq!(chunk.reason(), Some(&FinishReason::Length));
}

#[test]
fn unknown_stop_reason_maps_to_other() {
    let data = r#"{"type":"message_delta","delta":{"stop_reason":"refusal"}}"#;
    let event: Event = serde_json::from_str(data).unwrap();
    let chunk = event.into_chunk().unwrap();
    assert_eq!(chunk.reason(), Some(&FinishReason::Other));
}

#[test]
fn ping_and_stop_events_produce_no_chunk() {
    let ping: Event = serde_json::from_str(r#"{"type":"ping"}"#).unwrap();
    assert!(ping.into_chunk().is_none());

    let stop: Event = serde_json::from_str(r#"{"type":"message_stop"}"#).unwrap();
    assert!(stop.into_chunk().is_none());
}

#[test]
fn unknown_event_types_are_ignored() {
    let event: Event =
        serde_json::from_str(r#"{"type":"brand_new_event","payload":{}}"#).unwrap();
    assert!(event.into_chunk().is_none());
}

#[test]
fn request_lifts_system_messages() {
    let request = Request::from(General::default()).messages(&[
        Message::system("be brief"),
        Message::user("hi"),
        Message::assistant("hello"),
    ]);

    assert_eq!(request.system(), Some("be brief"));
    assert_eq!(request.conversation().len(), 2);
    assert_eq!(request.conversation()[0], Message::user("hi"));
}

#[test]
fn request_concatenates_multiple_system_messages() {
    let request = Request::from(General::default())
        .messages(&[Message::system("one"), Message::system("two"), Message::user("hi")]);

    assert_eq!(request.system(), Some("one\n\ntwo"));
    assert_eq!(request.conversation().len(), 1);
}

#[test]
fn provider_sets_api_headers() {
    let provider = Anthropic::new(Client::new(), "sk-ant-test").unwrap();
    let headers = provider.headers();
    assert_eq!(headers.get("x-api-key").unwrap(), "sk-ant-test");
    assert_eq!(headers.get("anthropic-version").unwrap(), "2023-06-01");
    assert!(headers.get("anthropic-beta").is_some());
    assert!(headers.get("authorization").is_none());
}
