// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Durable chat records and the denormalized view sent to clients.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Delivery status of a message.
///
/// Variants are declared in lifecycle order so the derived `Ord` matches
/// the only legal direction of travel: `Sent < Delivered < Read`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    Sent,
    Delivered,
    Read,
}

impl MessageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sent => "sent",
            Self::Delivered => "delivered",
            Self::Read => "read",
        }
    }

    /// Return the status after attempting to move to `next`.
    ///
    /// Never regresses: advancing a `read` message to `delivered` leaves it
    /// `read`.
    pub fn advance(self, next: MessageStatus) -> MessageStatus {
        self.max(next)
    }
}

impl fmt::Display for MessageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of a conversation: a workspace plus an unordered user pair.
///
/// The pair is normalized on construction so `(a, b)` and `(b, a)` compare
/// and hash equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConversationKey {
    pub workspace_id: String,
    low: String,
    high: String,
}

impl ConversationKey {
    pub fn new(workspace_id: &str, a: &str, b: &str) -> Self {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        Self { workspace_id: workspace_id.to_owned(), low: low.to_owned(), high: high.to_owned() }
    }

    pub fn participants(&self) -> [&str; 2] {
        [self.low.as_str(), self.high.as_str()]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: String,
    pub participants: [String; 2],
    pub workspace_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_message: Option<String>,
}

impl Conversation {
    /// The participant that is not `user_id`, if `user_id` is one of them.
    pub fn other_participant(&self, user_id: &str) -> Option<&str> {
        match &self.participants {
            [a, b] if a == user_id => Some(b.as_str()),
            [a, b] if b == user_id => Some(a.as_str()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub conversation_id: String,
    pub sender_id: String,
    pub content: String,
    pub status: MessageStatus,
    /// Epoch milliseconds.
    pub created_at: u64,
}

/// Fields required to persist a new message. Status always starts at `sent`.
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub conversation_id: String,
    pub sender_id: String,
    pub content: String,
}

/// Display fields for a user, joined into outgoing message payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_profile_picture_url: Option<String>,
}

/// Sender block of a message view. Display fields are absent when the
/// sender has no known profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SenderView {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_profile_picture_url: Option<String>,
}

impl SenderView {
    pub fn new(sender_id: &str, profile: Option<&UserProfile>) -> Self {
        match profile {
            Some(p) => Self {
                id: sender_id.to_owned(),
                name: Some(p.name.clone()),
                profile_picture: p.profile_picture.clone(),
                default_profile_picture_url: p.default_profile_picture_url.clone(),
            },
            None => Self {
                id: sender_id.to_owned(),
                name: None,
                profile_picture: None,
                default_profile_picture_url: None,
            },
        }
    }
}

/// A message joined with its sender's display fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageView {
    #[serde(flatten)]
    pub message: Message,
    pub sender: SenderView,
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn status_order_follows_lifecycle() {
        assert!(MessageStatus::Sent < MessageStatus::Delivered);
        assert!(MessageStatus::Delivered < MessageStatus::Read);
    }

    #[test]
    fn advance_never_regresses() {
        assert_eq!(MessageStatus::Sent.advance(MessageStatus::Delivered), MessageStatus::Delivered);
        assert_eq!(MessageStatus::Read.advance(MessageStatus::Delivered), MessageStatus::Read);
        assert_eq!(MessageStatus::Delivered.advance(MessageStatus::Sent), MessageStatus::Delivered);
    }

    fn status() -> impl Strategy<Value = MessageStatus> {
        prop_oneof![
            Just(MessageStatus::Sent),
            Just(MessageStatus::Delivered),
            Just(MessageStatus::Read),
        ]
    }

    proptest! {
        #[test]
        fn advance_is_monotonic(steps in proptest::collection::vec(status(), 0..16)) {
            let mut current = MessageStatus::Sent;
            for next in steps {
                let advanced = current.advance(next);
                prop_assert!(advanced >= current);
                prop_assert!(advanced >= next);
                current = advanced;
            }
        }
    }

    #[test]
    fn conversation_key_ignores_pair_order() {
        let ab = ConversationKey::new("w1", "alice", "bob");
        let ba = ConversationKey::new("w1", "bob", "alice");
        assert_eq!(ab, ba);
        assert_eq!(ab.participants(), ["alice", "bob"]);
        assert_ne!(ab, ConversationKey::new("w2", "alice", "bob"));
    }

    #[test]
    fn other_participant_lookup() {
        let conv = Conversation {
            id: "c1".to_owned(),
            participants: ["alice".to_owned(), "bob".to_owned()],
            workspace_id: "w1".to_owned(),
            last_message: None,
        };
        assert_eq!(conv.other_participant("alice"), Some("bob"));
        assert_eq!(conv.other_participant("bob"), Some("alice"));
        assert_eq!(conv.other_participant("carol"), None);
    }

    #[test]
    fn message_view_flattens_message_fields() -> anyhow::Result<()> {
        let view = MessageView {
            message: Message {
                id: "m1".to_owned(),
                conversation_id: "c1".to_owned(),
                sender_id: "alice".to_owned(),
                content: "hi".to_owned(),
                status: MessageStatus::Delivered,
                created_at: 42,
            },
            sender: SenderView::new("alice", None),
        };
        let json = serde_json::to_value(&view)?;
        assert_eq!(json["conversationId"], "c1");
        assert_eq!(json["status"], "delivered");
        assert_eq!(json["sender"]["id"], "alice");
        assert!(json["sender"].get("name").is_none(), "json: {json}");
        Ok(())
    }
}
