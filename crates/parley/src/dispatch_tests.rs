// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;

use serde_json::{json, Value};

use super::*;
use crate::chat::model::MessageStatus;
use crate::test_support::{connect_user, drain, AppStateBuilder, FlakyStore, StoreOp};

async fn frame(state: &AppState, user_id: &str, value: Value) -> anyhow::Result<Option<Value>> {
    let reply = handle_frame(state, user_id, &serde_json::to_string(&value)?).await;
    Ok(reply.map(serde_json::to_value).transpose()?)
}

fn to_json(events: Vec<ServerEvent>) -> anyhow::Result<Vec<Value>> {
    Ok(events.into_iter().map(serde_json::to_value).collect::<Result<Vec<_>, _>>()?)
}

fn send(to: &str, content: &str) -> Value {
    json!({"event": "sendMessage", "data": {"recipientId": to, "content": content, "workspaceId": "w1"}})
}

#[tokio::test]
async fn both_online_message_is_delivered() -> anyhow::Result<()> {
    let state = AppStateBuilder::new().user("alice", "Alice").build();
    let (_, mut a_rx) = connect_user(&state, "alice");
    let (_, mut b_rx) = connect_user(&state, "bob");
    drain(&mut a_rx);
    drain(&mut b_rx);

    let ack = frame(&state, "alice", send("bob", "hi")).await?;
    let ack = ack.ok_or_else(|| anyhow::anyhow!("no ack"))?;
    assert_eq!(ack["event"], "newMessage");
    assert_eq!(ack["data"]["status"], "delivered");
    assert_eq!(ack["data"]["content"], "hi");
    assert_eq!(ack["data"]["sender"]["name"], "Alice");

    assert_eq!(to_json(drain(&mut b_rx))?, vec![ack.clone()]);

    let conversation_id = ack["data"]["conversationId"].as_str().unwrap_or_default();
    let stored = state.store.messages(conversation_id).await?;
    assert_eq!(stored[0].status, MessageStatus::Delivered);
    Ok(())
}

#[tokio::test]
async fn offline_recipient_gets_nothing_and_message_stays_sent() -> anyhow::Result<()> {
    let state = AppStateBuilder::new().build();
    let (_, mut a_rx) = connect_user(&state, "alice");
    drain(&mut a_rx);

    let ack = frame(&state, "alice", send("bob", "hi")).await?;
    let ack = ack.ok_or_else(|| anyhow::anyhow!("no ack"))?;
    assert_eq!(ack["data"]["status"], "sent");
    assert!(drain(&mut a_rx).is_empty());

    let conversation_id = ack["data"]["conversationId"].as_str().unwrap_or_default();
    let stored = state.store.messages(conversation_id).await?;
    assert_eq!(stored[0].status, MessageStatus::Sent);
    Ok(())
}

#[tokio::test]
async fn read_receipt_reaches_sender() -> anyhow::Result<()> {
    let state = AppStateBuilder::new().build();
    let (_, mut a_rx) = connect_user(&state, "alice");

    let first = frame(&state, "alice", send("bob", "one")).await?;
    frame(&state, "alice", send("bob", "two")).await?;
    let conversation_id = first
        .as_ref()
        .and_then(|ack| ack["data"]["conversationId"].as_str())
        .map(str::to_owned)
        .ok_or_else(|| anyhow::anyhow!("no conversation id"))?;

    let (_, mut b_rx) = connect_user(&state, "bob");
    drain(&mut a_rx);
    drain(&mut b_rx);

    let read = json!({
        "event": "markMessagesAsRead",
        "data": {"conversationId": conversation_id, "otherUserId": "alice"}
    });
    assert_eq!(frame(&state, "bob", read.clone()).await?, None);
    assert_eq!(
        to_json(drain(&mut a_rx))?,
        vec![json!({"event": "messagesRead", "data": {"conversationId": conversation_id}})]
    );
    let stored = state.store.messages(&conversation_id).await?;
    assert!(stored.iter().all(|m| m.status == MessageStatus::Read), "stored: {stored:?}");

    // Idempotent: a second receipt with nothing new notifies no one.
    frame(&state, "bob", read).await?;
    assert!(drain(&mut a_rx).is_empty());
    Ok(())
}

#[tokio::test]
async fn call_offer_and_answer_round_trip() -> anyhow::Result<()> {
    let state = AppStateBuilder::new().build();
    let (_, mut a_rx) = connect_user(&state, "alice");
    let (_, mut b_rx) = connect_user(&state, "bob");
    drain(&mut a_rx);
    drain(&mut b_rx);

    let offer = json!({"type": "offer", "sdp": "v=0\r\no=alice"});
    let from = json!({"id": "alice", "name": "Alice", "avatar": null});
    let call = json!({"event": "call-user", "data": {"to": "bob", "offer": offer, "from": from}});
    assert_eq!(frame(&state, "alice", call).await?, None);
    assert_eq!(
        to_json(drain(&mut b_rx))?,
        vec![json!({"event": "call-made", "data": {"offer": offer, "from": from}})]
    );

    let answer = json!({"type": "answer", "sdp": "v=0\r\no=bob"});
    let reply = json!({"event": "answer-call", "data": {"to": "alice", "answer": answer}});
    assert_eq!(frame(&state, "bob", reply).await?, None);
    assert_eq!(
        to_json(drain(&mut a_rx))?,
        vec![json!({"event": "answer-made", "data": {"answer": answer}})]
    );
    Ok(())
}

#[tokio::test]
async fn end_call_delivers_exactly_once_in_any_phase() -> anyhow::Result<()> {
    let state = AppStateBuilder::new().build();
    let (_, mut a_rx) = connect_user(&state, "alice");
    let (_, mut b_rx) = connect_user(&state, "bob");
    drain(&mut a_rx);
    drain(&mut b_rx);
    let end = json!({"event": "end-call", "data": {"to": "bob"}});

    // Idle.
    frame(&state, "alice", end.clone()).await?;
    assert_eq!(to_json(drain(&mut b_rx))?, vec![json!({"event": "call-ended"})]);

    // Ringing.
    let call = json!({"event": "call-user", "data": {"to": "bob", "offer": {}, "from": "alice"}});
    frame(&state, "alice", call).await?;
    drain(&mut b_rx);
    frame(&state, "alice", end).await?;
    assert_eq!(to_json(drain(&mut b_rx))?, vec![json!({"event": "call-ended"})]);
    assert!(drain(&mut a_rx).is_empty());
    Ok(())
}

#[tokio::test]
async fn typing_relays_to_recipient_only() -> anyhow::Result<()> {
    let state = AppStateBuilder::new().build();
    let (_, mut a_rx) = connect_user(&state, "alice");
    let (_, mut b_rx) = connect_user(&state, "bob");
    drain(&mut a_rx);
    drain(&mut b_rx);

    frame(&state, "alice", json!({"event": "startTyping", "data": {"recipientId": "bob"}})).await?;
    frame(&state, "alice", json!({"event": "stopTyping", "data": {"recipientId": "bob"}})).await?;
    assert_eq!(
        to_json(drain(&mut b_rx))?,
        vec![
            json!({"event": "typing", "data": {"senderId": "alice"}}),
            json!({"event": "stopTyping", "data": {"senderId": "alice"}}),
        ]
    );
    assert!(drain(&mut a_rx).is_empty());

    // Offline recipient: dropped without error.
    let offline = json!({"event": "startTyping", "data": {"recipientId": "carol"}});
    assert_eq!(frame(&state, "alice", offline).await?, None);
    Ok(())
}

#[tokio::test]
async fn ping_gets_pong() -> anyhow::Result<()> {
    let state = AppStateBuilder::new().build();
    assert_eq!(frame(&state, "alice", json!({"event": "ping"})).await?, Some(json!({"event": "pong"})));
    Ok(())
}

#[tokio::test]
async fn malformed_frames_get_error_reply() {
    let state = AppStateBuilder::new().build();
    let cases = [
        "not json",
        r#"{"event":"teleport","data":{}}"#,
        r#"{"event":"sendMessage","data":{"content":"hi"}}"#,
    ];
    for raw in cases {
        let reply = handle_frame(&state, "alice", raw).await;
        assert!(
            matches!(reply, Some(ServerEvent::Error(ref body)) if body.code == "BAD_REQUEST"),
            "raw: {raw}, reply: {reply:?}"
        );
    }
}

#[tokio::test]
async fn handler_failures_are_swallowed() -> anyhow::Result<()> {
    let store = Arc::new(FlakyStore::new());
    let state = AppStateBuilder::new().store(store.clone()).build();
    let (_, mut a_rx) = connect_user(&state, "alice");
    let (_, mut b_rx) = connect_user(&state, "bob");
    drain(&mut a_rx);
    drain(&mut b_rx);

    // Validation failure: no reply, no events.
    assert_eq!(frame(&state, "alice", send("alice", "me")).await?, None);

    // Persistence failure: no reply, no events.
    store.fail(StoreOp::InsertMessage);
    assert_eq!(frame(&state, "alice", send("bob", "hi")).await?, None);
    assert!(drain(&mut a_rx).is_empty());
    assert!(drain(&mut b_rx).is_empty());

    // The session keeps working afterwards.
    store.heal(StoreOp::InsertMessage);
    assert!(frame(&state, "alice", send("bob", "hi again")).await?.is_some());
    assert_eq!(drain(&mut b_rx).len(), 1);
    Ok(())
}

#[tokio::test]
async fn dispatch_to_departed_session_is_a_silent_miss() -> anyhow::Result<()> {
    let state = AppStateBuilder::new().build();
    let (bob_conn, b_rx) = connect_user(&state, "bob");
    // Receiver gone but not yet unregistered: the socket task is tearing down.
    drop(b_rx);

    let ack = frame(&state, "alice", send("bob", "hi")).await?;
    assert_eq!(ack.as_ref().map(|a| a["data"]["status"].clone()), Some(json!("delivered")));

    assert!(state.hub.disconnect("bob", bob_conn));
    let call = json!({"event": "call-user", "data": {"to": "bob", "offer": {}, "from": "alice"}});
    assert_eq!(
        frame(&state, "alice", call).await?,
        Some(json!({"event": "call-unavailable", "data": {"to": "bob"}}))
    );
    Ok(())
}
