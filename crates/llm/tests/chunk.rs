//! Tests for stream chunk parsing.

use otter_llm::{FinishReason, StreamChunk};

#[test]
fn parses_a_content_delta_chunk() {
    let data = r#"{
        "id": "chatcmpl-123",
        "object": "chat.completion.chunk",
        "created": 1717000000,
        "model": "gpt-4o",
        "choices": [{"index": 0, "delta": {"content": "Hello"}, "finish_reason": null}]
    }"#;
    let chunk: StreamChunk = serde_json::from_str(data).unwrap();
    assert_eq!(chunk.content(), Some("Hello"));
    assert!(chunk.reason().is_none());
    assert_eq!(chunk.meta.model.as_str(), "gpt-4o");
}

#[test]
fn parses_a_finish_chunk() {
    let data = r#"{
        "choices": [{"index": 0, "delta": {}, "finish_reason": "length"}]
    }"#;
    let chunk: StreamChunk = serde_json::from_str(data).unwrap();
    assert!(chunk.content().is_none());
    assert_eq!(chunk.reason(), Some(&FinishReason::Length));
}

#[test]
fn unknown_finish_reason_maps_to_other() {
    let data = r#"{
        "choices": [{"index": 0, "delta": {}, "finish_reason": "moderation_stop"}]
    }"#;
    let chunk: StreamChunk = serde_json::from_str(data).unwrap();
    assert_eq!(chunk.reason(), Some(&FinishReason::Other));
}

#[test]
fn empty_content_is_filtered() {
    let data = r#"{
        "choices": [{"index": 0, "delta": {"content": ""}, "finish_reason": null}]
    }"#;
    let chunk: StreamChunk = serde_json::from_str(data).unwrap();
    assert!(chunk.content().is_none());
}

#[test]
fn chunk_with_no_choices_has_no_content() {
    let chunk: StreamChunk = serde_json::from_str(r#"{"id": "x"}"#).unwrap();
    assert!(chunk.content().is_none());
    assert!(chunk.reason().is_none());
}

#[test]
fn text_constructor_round_trips_through_accessors() {
    let chunk = StreamChunk::text("abc");
    assert_eq!(chunk.content(), Some("abc"));

    let chunk = StreamChunk::finish(FinishReason::Stop);
    assert_eq!(chunk.reason(), Some(&FinishReason::Stop));
}
