// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process [`ChatStore`] backed by hash maps behind a single lock.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::chat::model::{
    Conversation, ConversationKey, Message, MessageStatus, MessageView, NewMessage, SenderView,
    UserProfile,
};
use crate::chat::store::{ChatStore, StoreError, StoreResult};
use crate::state::epoch_ms;

#[derive(Default)]
struct Inner {
    conversations: HashMap<String, Conversation>,
    by_key: HashMap<ConversationKey, String>,
    messages: HashMap<String, Message>,
    /// Message ids per conversation in insertion order.
    timeline: HashMap<String, Vec<String>>,
    users: HashMap<String, UserProfile>,
}

/// Volatile store. Everything is lost on restart.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed user profiles (e.g. from the users file at startup).
    pub fn with_users(users: impl IntoIterator<Item = UserProfile>) -> Self {
        let store = Self::new();
        {
            let mut inner = store.inner.write();
            for user in users {
                inner.users.insert(user.id.clone(), user);
            }
        }
        store
    }

    /// Number of conversations held.
    pub fn conversation_count(&self) -> usize {
        self.inner.read().conversations.len()
    }
}

#[async_trait]
impl ChatStore for MemoryStore {
    async fn find_or_create_conversation(
        &self,
        key: &ConversationKey,
    ) -> StoreResult<Conversation> {
        let mut inner = self.inner.write();
        if let Some(conv) = inner.by_key.get(key).and_then(|id| inner.conversations.get(id)) {
            return Ok(conv.clone());
        }

        let [a, b] = key.participants();
        let conv = Conversation {
            id: uuid::Uuid::new_v4().to_string(),
            participants: [a.to_owned(), b.to_owned()],
            workspace_id: key.workspace_id.clone(),
            last_message: None,
        };
        inner.by_key.insert(key.clone(), conv.id.clone());
        inner.timeline.insert(conv.id.clone(), Vec::new());
        inner.conversations.insert(conv.id.clone(), conv.clone());
        Ok(conv)
    }

    async fn conversation(&self, conversation_id: &str) -> StoreResult<Option<Conversation>> {
        Ok(self.inner.read().conversations.get(conversation_id).cloned())
    }

    async fn insert_message(&self, message: NewMessage) -> StoreResult<Message> {
        let mut inner = self.inner.write();
        if !inner.conversations.contains_key(&message.conversation_id) {
            return Err(StoreError::NotFound(format!(
                "conversation {}",
                message.conversation_id
            )));
        }

        let stored = Message {
            id: uuid::Uuid::new_v4().to_string(),
            conversation_id: message.conversation_id,
            sender_id: message.sender_id,
            content: message.content,
            status: MessageStatus::Sent,
            created_at: epoch_ms(),
        };
        inner.timeline.entry(stored.conversation_id.clone()).or_default().push(stored.id.clone());
        inner.messages.insert(stored.id.clone(), stored.clone());
        Ok(stored)
    }

    async fn set_last_message(&self, conversation_id: &str, message_id: &str) -> StoreResult<()> {
        let mut inner = self.inner.write();
        let conv = inner
            .conversations
            .get_mut(conversation_id)
            .ok_or_else(|| StoreError::NotFound(format!("conversation {conversation_id}")))?;
        conv.last_message = Some(message_id.to_owned());
        Ok(())
    }

    async fn message_view(&self, message_id: &str) -> StoreResult<MessageView> {
        let inner = self.inner.read();
        let message = inner
            .messages
            .get(message_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("message {message_id}")))?;
        let sender = SenderView::new(&message.sender_id, inner.users.get(&message.sender_id));
        Ok(MessageView { message, sender })
    }

    async fn advance_status(
        &self,
        message_id: &str,
        status: MessageStatus,
    ) -> StoreResult<MessageStatus> {
        let mut inner = self.inner.write();
        let message = inner
            .messages
            .get_mut(message_id)
            .ok_or_else(|| StoreError::NotFound(format!("message {message_id}")))?;
        message.status = message.status.advance(status);
        Ok(message.status)
    }

    async fn mark_read(&self, conversation_id: &str, sender_id: &str) -> StoreResult<usize> {
        let mut guard = self.inner.write();
        let inner = &mut *guard;
        let Some(ids) = inner.timeline.get(conversation_id) else {
            return Ok(0);
        };

        let mut changed = 0;
        for id in ids {
            if let Some(message) = inner.messages.get_mut(id) {
                if message.sender_id == sender_id && message.status != MessageStatus::Read {
                    message.status = MessageStatus::Read;
                    changed += 1;
                }
            }
        }
        Ok(changed)
    }

    async fn messages(&self, conversation_id: &str) -> StoreResult<Vec<Message>> {
        let inner = self.inner.read();
        let ids = inner
            .timeline
            .get(conversation_id)
            .ok_or_else(|| StoreError::NotFound(format!("conversation {conversation_id}")))?;
        Ok(ids.iter().filter_map(|id| inner.messages.get(id).cloned()).collect())
    }

    async fn upsert_user(&self, profile: UserProfile) -> StoreResult<()> {
        self.inner.write().users.insert(profile.id.clone(), profile);
        Ok(())
    }

    async fn user(&self, user_id: &str) -> StoreResult<Option<UserProfile>> {
        Ok(self.inner.read().users.get(user_id).cloned())
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
