// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test infrastructure: builders, fault-injecting store, and
//! assertion helpers.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::auth::jwt::encode_hs256;
use crate::auth::Claims;
use crate::chat::memory::MemoryStore;
use crate::chat::model::{
    Conversation, ConversationKey, Message, MessageStatus, MessageView, NewMessage, UserProfile,
};
use crate::chat::store::{ChatStore, StoreError, StoreResult};
use crate::config::ParleyConfig;
use crate::protocol::{SendMessage, ServerEvent};
use crate::session::registry::{ConnectionId, SessionHandle};
use crate::state::{epoch_secs, AppState};

/// Builder for [`AppState`] backed by a [`MemoryStore`] unless overridden.
pub struct AppStateBuilder {
    config: ParleyConfig,
    users: Vec<UserProfile>,
    store: Option<Arc<dyn ChatStore>>,
}

impl Default for AppStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AppStateBuilder {
    pub fn new() -> Self {
        Self { config: ParleyConfig::test(), users: vec![], store: None }
    }

    pub fn media_credentials(mut self, key: &str, secret: &str) -> Self {
        self.config.media_api_key = Some(key.to_owned());
        self.config.media_api_secret = Some(secret.to_owned());
        self
    }

    pub fn auth_cookie(mut self, name: &str) -> Self {
        self.config.auth_cookie = name.to_owned();
        self
    }

    /// Seed a user profile into the default store.
    pub fn user(mut self, id: &str, name: &str) -> Self {
        self.users.push(profile(id, name));
        self
    }

    pub fn store(mut self, store: Arc<dyn ChatStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn build(self) -> Arc<AppState> {
        let store = match self.store {
            Some(store) => store,
            None => Arc::new(MemoryStore::with_users(self.users)),
        };
        Arc::new(AppState::new(self.config, store, CancellationToken::new()))
    }
}

pub fn profile(id: &str, name: &str) -> UserProfile {
    UserProfile {
        id: id.to_owned(),
        name: name.to_owned(),
        profile_picture: None,
        default_profile_picture_url: Some(format!("https://avatars.test/{id}.png")),
    }
}

/// Mint an access token for `user_id` valid for one hour.
pub fn mint_token(config: &ParleyConfig, user_id: &str, name: Option<&str>) -> anyhow::Result<String> {
    let now = epoch_secs();
    let claims = Claims {
        user_id: user_id.to_owned(),
        name: name.map(str::to_owned),
        exp: Some(now + 3600),
        nbf: None,
        iat: Some(now),
    };
    Ok(encode_hs256(&claims, config.jwt_secret.as_bytes())?)
}

/// Register an in-process session for `user_id`, bypassing the transport.
pub fn connect_user(
    state: &AppState,
    user_id: &str,
) -> (ConnectionId, mpsc::UnboundedReceiver<ServerEvent>) {
    let (handle, rx) = SessionHandle::channel();
    let conn_id = handle.conn_id();
    state.hub.connect(user_id, handle);
    (conn_id, rx)
}

/// Take every event currently queued on a session.
pub fn drain(rx: &mut mpsc::UnboundedReceiver<ServerEvent>) -> Vec<ServerEvent> {
    let mut events = vec![];
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

pub fn send_request(recipient_id: &str, workspace_id: &str, content: &str) -> SendMessage {
    SendMessage {
        recipient_id: recipient_id.to_owned(),
        content: content.to_owned(),
        workspace_id: workspace_id.to_owned(),
        conversation_id: None,
    }
}

/// Store operations that [`FlakyStore`] can be told to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    FindOrCreate,
    InsertMessage,
    SetLastMessage,
    MessageView,
    AdvanceStatus,
    MarkRead,
}

/// [`MemoryStore`] wrapper that fails selected operations on demand.
#[derive(Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    failing: Mutex<HashSet<StoreOp>>,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail(&self, op: StoreOp) {
        self.failing.lock().insert(op);
    }

    pub fn heal(&self, op: StoreOp) {
        self.failing.lock().remove(&op);
    }

    fn check(&self, op: StoreOp) -> StoreResult<()> {
        if self.failing.lock().contains(&op) {
            return Err(StoreError::Backend(format!("injected failure: {op:?}")));
        }
        Ok(())
    }
}

#[async_trait]
impl ChatStore for FlakyStore {
    async fn find_or_create_conversation(
        &self,
        key: &ConversationKey,
    ) -> StoreResult<Conversation> {
        self.check(StoreOp::FindOrCreate)?;
        self.inner.find_or_create_conversation(key).await
    }

    async fn conversation(&self, conversation_id: &str) -> StoreResult<Option<Conversation>> {
        self.inner.conversation(conversation_id).await
    }

    async fn insert_message(&self, message: NewMessage) -> StoreResult<Message> {
        self.check(StoreOp::InsertMessage)?;
        self.inner.insert_message(message).await
    }

    async fn set_last_message(&self, conversation_id: &str, message_id: &str) -> StoreResult<()> {
        self.check(StoreOp::SetLastMessage)?;
        self.inner.set_last_message(conversation_id, message_id).await
    }

    async fn message_view(&self, message_id: &str) -> StoreResult<MessageView> {
        self.check(StoreOp::MessageView)?;
        self.inner.message_view(message_id).await
    }

    async fn advance_status(
        &self,
        message_id: &str,
        status: MessageStatus,
    ) -> StoreResult<MessageStatus> {
        self.check(StoreOp::AdvanceStatus)?;
        self.inner.advance_status(message_id, status).await
    }

    async fn mark_read(&self, conversation_id: &str, sender_id: &str) -> StoreResult<usize> {
        self.check(StoreOp::MarkRead)?;
        self.inner.mark_read(conversation_id, sender_id).await
    }

    async fn messages(&self, conversation_id: &str) -> StoreResult<Vec<Message>> {
        self.inner.messages(conversation_id).await
    }

    async fn upsert_user(&self, profile: UserProfile) -> StoreResult<()> {
        self.inner.upsert_user(profile).await
    }

    async fn user(&self, user_id: &str) -> StoreResult<Option<UserProfile>> {
        self.inner.user(user_id).await
    }
}

/// Convert `Result<T, E: Display>` to `anyhow::Result<T>`.
pub trait AnyhowExt<T> {
    fn anyhow(self) -> anyhow::Result<T>;
}

impl<T, E: std::fmt::Display> AnyhowExt<T> for Result<T, E> {
    fn anyhow(self) -> anyhow::Result<T> {
        self.map_err(|e| anyhow::anyhow!("{e}"))
    }
}

/// Assert that an expression evaluates to `Err` whose Display output
/// contains the given substring.
#[macro_export]
macro_rules! assert_err_contains {
    ($expr:expr, $substr:expr) => {{
        let result = $expr;
        let err = result.expect_err(concat!("expected Err for: ", stringify!($expr)));
        let msg = err.to_string();
        assert!(msg.contains($substr), "expected error containing {:?}, got: {msg:?}", $substr);
    }};
}

/// Spawn an HTTP server on a random port for integration testing.
///
/// Returns the bound address and a join handle for the server task.
pub async fn spawn_http_server(
    state: Arc<AppState>,
) -> anyhow::Result<(std::net::SocketAddr, tokio::task::JoinHandle<()>)> {
    let router = crate::transport::build_router(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let handle = tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    Ok((addr, handle))
}
