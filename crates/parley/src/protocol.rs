// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! WebSocket event types.
//!
//! Frames are adjacently tagged JSON: `{"event": "sendMessage", "data": {..}}`.
//! Events without a payload omit `data`. Event names keep the mixed
//! camelCase / kebab-case spelling browser clients already emit.

use serde::{Deserialize, Serialize};

use crate::chat::model::MessageView;
use crate::error::{ErrorBody, ErrorCode};

// ---------------------------------------------------------------------------
// Client -> Server
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ClientEvent {
    #[serde(rename = "sendMessage")]
    SendMessage(SendMessage),
    #[serde(rename = "markMessagesAsRead")]
    MarkMessagesAsRead(MarkMessagesAsRead),
    #[serde(rename = "startTyping")]
    StartTyping(TypingTarget),
    #[serde(rename = "stopTyping")]
    StopTyping(TypingTarget),
    #[serde(rename = "call-user")]
    CallUser(CallUser),
    #[serde(rename = "answer-call")]
    AnswerCall(AnswerCall),
    #[serde(rename = "ice-candidate")]
    IceCandidate(IceCandidate),
    #[serde(rename = "end-call")]
    EndCall(EndCall),
    #[serde(rename = "ping")]
    Ping,
}

impl ClientEvent {
    /// Wire name of the event, for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::SendMessage(_) => "sendMessage",
            Self::MarkMessagesAsRead(_) => "markMessagesAsRead",
            Self::StartTyping(_) => "startTyping",
            Self::StopTyping(_) => "stopTyping",
            Self::CallUser(_) => "call-user",
            Self::AnswerCall(_) => "answer-call",
            Self::IceCandidate(_) => "ice-candidate",
            Self::EndCall(_) => "end-call",
            Self::Ping => "ping",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessage {
    pub recipient_id: String,
    pub content: String,
    pub workspace_id: String,
    /// Client-side hint only; the conversation is resolved from the
    /// workspace and participant pair.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkMessagesAsRead {
    pub conversation_id: String,
    pub other_user_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypingTarget {
    pub recipient_id: String,
}

/// Call offer. `offer` and `from` are relayed verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallUser {
    pub to: String,
    pub offer: serde_json::Value,
    pub from: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerCall {
    pub to: String,
    pub answer: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IceCandidate {
    pub to: String,
    pub candidate: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndCall {
    pub to: String,
}

// ---------------------------------------------------------------------------
// Server -> Client
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerEvent {
    #[serde(rename = "getOnlineUsers")]
    GetOnlineUsers(Vec<String>),
    #[serde(rename = "newMessage")]
    NewMessage(MessagePayload),
    #[serde(rename = "messagesRead")]
    MessagesRead(MessagesRead),
    #[serde(rename = "typing")]
    Typing(TypingNotice),
    #[serde(rename = "stopTyping")]
    StopTyping(TypingNotice),
    #[serde(rename = "call-made")]
    CallMade(CallMade),
    #[serde(rename = "answer-made")]
    AnswerMade(AnswerMade),
    #[serde(rename = "ice-candidate")]
    IceCandidate(IceCandidateRelay),
    #[serde(rename = "call-ended")]
    CallEnded,
    #[serde(rename = "call-unavailable")]
    CallUnavailable(CallUnavailable),
    #[serde(rename = "error")]
    Error(ErrorBody),
    #[serde(rename = "pong")]
    Pong,
}

/// Denormalized message as rendered by clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagePayload {
    #[serde(flatten)]
    pub view: MessageView,
    pub recipient_id: String,
    pub workspace_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagesRead {
    pub conversation_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypingNotice {
    pub sender_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallMade {
    pub offer: serde_json::Value,
    pub from: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerMade {
    pub answer: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IceCandidateRelay {
    pub candidate: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallUnavailable {
    pub to: String,
}

/// Build an `error` event.
pub fn error_event(code: ErrorCode, message: impl Into<String>) -> ServerEvent {
    ServerEvent::Error(code.to_error_body(message))
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
