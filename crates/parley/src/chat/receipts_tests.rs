// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;

use super::*;
use crate::chat::delivery::send_message;
use crate::chat::model::MessageStatus;
use crate::test_support::{connect_user, drain, send_request, AppStateBuilder, FlakyStore, StoreOp};

fn read_request(conversation_id: &str, other_user_id: &str) -> MarkMessagesAsRead {
    MarkMessagesAsRead {
        conversation_id: conversation_id.to_owned(),
        other_user_id: other_user_id.to_owned(),
    }
}

#[tokio::test]
async fn marks_peer_messages_and_notifies_once() -> anyhow::Result<()> {
    let state = AppStateBuilder::new().build();
    let (_, mut alice_rx) = connect_user(&state, "alice");
    let (_, mut bob_rx) = connect_user(&state, "bob");

    let first = send_message(&state, "alice", send_request("bob", "w1", "one")).await?;
    send_message(&state, "alice", send_request("bob", "w1", "two")).await?;
    let from_bob = send_message(&state, "bob", send_request("alice", "w1", "three")).await?;
    let conversation_id = first.view.message.conversation_id.clone();
    drain(&mut alice_rx);
    drain(&mut bob_rx);

    assert_eq!(mark_read(&state, "bob", read_request(&conversation_id, "alice")).await?, 2);
    assert_eq!(
        drain(&mut alice_rx),
        vec![ServerEvent::MessagesRead(MessagesRead { conversation_id: conversation_id.clone() })]
    );
    assert!(drain(&mut bob_rx).is_empty());

    let history = state.store.messages(&conversation_id).await?;
    for message in &history {
        let expected = if message.id == from_bob.view.message.id {
            MessageStatus::Delivered
        } else {
            MessageStatus::Read
        };
        assert_eq!(message.status, expected, "message: {message:?}");
    }

    // Nothing new: silent no-op.
    assert_eq!(mark_read(&state, "bob", read_request(&conversation_id, "alice")).await?, 0);
    assert!(drain(&mut alice_rx).is_empty());
    Ok(())
}

#[tokio::test]
async fn offline_peer_still_gets_messages_marked() -> anyhow::Result<()> {
    let state = AppStateBuilder::new().build();
    let ack = send_message(&state, "alice", send_request("bob", "w1", "hi")).await?;
    let conversation_id = ack.view.message.conversation_id;

    assert_eq!(mark_read(&state, "bob", read_request(&conversation_id, "alice")).await?, 1);
    let history = state.store.messages(&conversation_id).await?;
    assert_eq!(history[0].status, MessageStatus::Read);
    Ok(())
}

#[tokio::test]
async fn rejects_non_participants() -> anyhow::Result<()> {
    let state = AppStateBuilder::new().build();
    let ack = send_message(&state, "alice", send_request("bob", "w1", "hi")).await?;
    let conversation_id = ack.view.message.conversation_id;

    let cases = [
        ("carol", read_request(&conversation_id, "alice")),
        ("bob", read_request(&conversation_id, "carol")),
        ("bob", read_request(&conversation_id, "bob")),
        ("bob", read_request("missing", "alice")),
        ("bob", read_request("", "alice")),
    ];
    for (reader, req) in cases {
        let err = mark_read(&state, reader, req.clone()).await.err();
        assert!(matches!(err, Some(HandlerError::Validation(_))), "req: {req:?}, err: {err:?}");
    }

    let history = state.store.messages(&conversation_id).await?;
    assert_eq!(history[0].status, MessageStatus::Sent);
    Ok(())
}

#[tokio::test]
async fn store_failure_emits_nothing() -> anyhow::Result<()> {
    let store = Arc::new(FlakyStore::new());
    let state = AppStateBuilder::new().store(store.clone()).build();
    let (_, mut alice_rx) = connect_user(&state, "alice");
    let ack = send_message(&state, "alice", send_request("bob", "w1", "hi")).await?;
    drain(&mut alice_rx);

    store.fail(StoreOp::MarkRead);
    let req = read_request(&ack.view.message.conversation_id, "alice");
    let err = mark_read(&state, "bob", req).await.err();
    assert!(matches!(err, Some(HandlerError::Persistence(_))), "err: {err:?}");
    assert!(drain(&mut alice_rx).is_empty());
    Ok(())
}
