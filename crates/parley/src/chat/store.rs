// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Persistence seam for conversations, messages, and user profiles.

use std::fmt;

use async_trait::async_trait;

use crate::chat::model::{
    Conversation, ConversationKey, Message, MessageStatus, MessageView, NewMessage, UserProfile,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A record the caller referenced does not exist.
    NotFound(String),
    /// The backend failed to serve the request.
    Backend(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(what) => write!(f, "not found: {what}"),
            Self::Backend(msg) => write!(f, "backend error: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {}

pub type StoreResult<T> = Result<T, StoreError>;

/// Backing store used by the delivery pipeline and read-receipt tracker.
///
/// Implementations must make `find_or_create_conversation` atomic per key:
/// two concurrent calls for the same workspace and unordered pair return the
/// same conversation. `advance_status` and `mark_read` must never move a
/// message backwards in its lifecycle.
#[async_trait]
pub trait ChatStore: Send + Sync {
    async fn find_or_create_conversation(&self, key: &ConversationKey)
        -> StoreResult<Conversation>;

    async fn conversation(&self, conversation_id: &str) -> StoreResult<Option<Conversation>>;

    async fn insert_message(&self, message: NewMessage) -> StoreResult<Message>;

    async fn set_last_message(&self, conversation_id: &str, message_id: &str) -> StoreResult<()>;

    /// Fetch a message joined with its sender's display fields.
    async fn message_view(&self, message_id: &str) -> StoreResult<MessageView>;

    /// Move a message forward to `status`; returns the status actually stored.
    async fn advance_status(&self, message_id: &str, status: MessageStatus)
        -> StoreResult<MessageStatus>;

    /// Mark every message in the conversation authored by `sender_id` and not
    /// yet read as read, in one atomic update. Returns how many changed.
    async fn mark_read(&self, conversation_id: &str, sender_id: &str) -> StoreResult<usize>;

    /// Conversation history, oldest first.
    async fn messages(&self, conversation_id: &str) -> StoreResult<Vec<Message>>;

    async fn upsert_user(&self, profile: UserProfile) -> StoreResult<()>;

    async fn user(&self, user_id: &str) -> StoreResult<Option<UserProfile>>;
}
