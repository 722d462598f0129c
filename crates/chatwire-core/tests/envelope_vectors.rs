//! Envelope vector tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::fs;

use chatwire_core::protocol::{Body, Envelope, MessageType, ReadReceiptPayload, SenderKind, TypingPayload};

fn load(name: &str) -> String {
    fs::read_to_string(format!("tests/vectors/{name}")).unwrap()
}

fn decode(name: &str) -> Envelope {
    Envelope::from_json(&load(name)).unwrap_or_else(|e| panic!("vector={name}: {e}"))
}

#[test]
fn parse_chat_keeps_extra_payload_fields() {
    let env = decode("chat_inbound.json");
    assert_eq!(env.message_type(), MessageType::Chat);
    assert_eq!(env.sender.kind, SenderKind::User);
    assert_eq!(env.message_id, "6c1d7f3e-2a41-4a8e-9f0e-1b8f3f1e2a10");

    let Body::Chat(p) = &env.body else { panic!("expected chat body") };
    assert_eq!(p.text, "hello @helper");
    assert!(p.format.is_none());
    assert_eq!(p.extra["group_id"], "7");
    assert_eq!(p.extra["mentions"][0]["type"], "agent");
    assert_eq!(env.metadata["client_info"]["device"], "browser");
}

#[test]
fn parse_agent_response() {
    let env = decode("agent_response.json");
    assert_eq!(env.message_type(), MessageType::AgentResponse);
    assert_eq!(env.sender.kind, SenderKind::Agent);
    assert_eq!(env.body.text(), Some("Hi alice, how can I help?"));

    let Body::AgentResponse(p) = &env.body else { panic!("expected agent_response body") };
    assert_eq!(p.format.as_deref(), Some("markdown"));
    assert_eq!(p.extra["reply_to"], "6c1d7f3e-2a41-4a8e-9f0e-1b8f3f1e2a10");
}

#[test]
fn parse_typing_and_read_receipt() {
    let env = decode("typing.json");
    let Body::Typing(p) = &env.body else { panic!("expected typing body") };
    assert_eq!(p.status, "typing");
    assert_eq!(p.remaining_text, 12);

    let env = decode("read_receipt.json");
    let Body::ReadReceipt(p) = &env.body else { panic!("expected read_receipt body") };
    assert_eq!(p.message_ids, vec!["a".to_string(), "b".to_string()]);
}

#[test]
fn parse_connect_ack_from_system_sender() {
    let env = decode("connect_ack.json");
    assert_eq!(env.sender.kind, SenderKind::System);
    let Body::ConnectAck(p) = &env.body else { panic!("expected connect_ack body") };
    assert_eq!(p.session_id, "5f2b8c1e-9d4a-4e7b-a6c3-2d1f0e9b8a77");
    assert_eq!(p.extra["server_info"]["version"], "1.0.0");
    assert_eq!(env.metadata["protocol_version"], "1.0");
}

#[test]
fn parse_remote_error_keeps_error_block() {
    let env = decode("error_remote.json");
    assert_eq!(env.message_type(), MessageType::Error);
    assert_eq!(env.body.text(), Some("sender id does not match the current user"));
    assert_eq!(env.extensions["error"]["code"], "MSG_FMT_100");

    let env = decode("error_without_text.json");
    assert_eq!(env.body.text(), None);
    assert_eq!(env.message_id, "");
    assert_eq!(env.extensions["error"]["message"], "invalid JSON");
}

#[test]
fn parse_pong_ignores_payload() {
    let env = decode("pong.json");
    assert_eq!(env.body, Body::Pong);
}

#[test]
fn unknown_type_is_reported_separately() {
    let err = Envelope::from_json(&load("unknown_type.json")).expect_err("must fail");
    assert_eq!(err.code().as_str(), "MSG_FMT_101");
}

#[test]
fn malformed_frames_are_rejected() {
    let err = Envelope::from_json(&load("not_json.txt")).expect_err("must fail");
    assert_eq!(err.code().as_str(), "MSG_FMT_103");

    let err = Envelope::from_json(&load("chat_wrong_shape.json")).expect_err("must fail");
    assert_eq!(err.code().as_str(), "MSG_FMT_103");

    let err = Envelope::from_json("[1, 2, 3]").expect_err("must fail");
    assert_eq!(err.code().as_str(), "MSG_FMT_103");
}

#[test]
fn missing_payload_fields_take_defaults() {
    let env = decode("chat_missing_text.json");
    let Body::Chat(p) = &env.body else { panic!("expected chat body") };
    assert_eq!(p.text, "");
    assert_eq!(p.extra["group_id"], "7");

    let frame = |message_type: &str, payload: &str| {
        format!(
            r#"{{"message_type":"{message_type}","sender":{{"id":"s","type":"system","name":"System"}},"payload":{payload}}}"#
        )
    };

    let env = Envelope::from_json(&frame("typing", "null")).unwrap();
    assert_eq!(env.body, Body::Typing(TypingPayload::typing(0)));

    let env = Envelope::from_json(&frame("read_receipt", "{}")).unwrap();
    assert_eq!(env.body, Body::ReadReceipt(ReadReceiptPayload { message_ids: vec![] }));

    let env = Envelope::from_json(&frame("connect_ack", "{}")).unwrap();
    let Body::ConnectAck(p) = &env.body else { panic!("expected connect_ack body") };
    assert_eq!(p.session_id, "");

    let env = Envelope::from_json(r#"{"message_type":"agent_response","sender":{"id":"a","type":"agent","name":"Helper"}}"#).unwrap();
    assert_eq!(env.body.text(), Some(""));
}

#[test]
fn inbound_extensions_survive_reencode() {
    let env = decode("error_remote.json");
    let v: serde_json::Value = serde_json::from_str(&env.to_json().unwrap()).unwrap();
    assert_eq!(v["message_type"], "error");
    assert_eq!(v["error"]["code"], "MSG_FMT_100");
    assert_eq!(v["payload"]["severity"], "error");
}
