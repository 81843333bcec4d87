// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! WebRTC signaling relay. Offers, answers, and ICE candidates are opaque
//! and forwarded to the named peer's current session.

use tracing::{debug, info};

use crate::error::HandlerError;
use crate::protocol::{
    AnswerCall, AnswerMade, CallMade, CallUnavailable, CallUser, EndCall, IceCandidate,
    IceCandidateRelay, ServerEvent,
};
use crate::state::AppState;

fn require_peer(from_user: &str, to: &str) -> Result<(), HandlerError> {
    if to.trim().is_empty() {
        return Err(HandlerError::validation("`to` is required"));
    }
    if to == from_user {
        return Err(HandlerError::validation("cannot signal yourself"));
    }
    Ok(())
}

/// Relay a call offer. Replies `call-unavailable` to the caller when the
/// callee has no session.
pub fn call_user(
    state: &AppState,
    from_user: &str,
    req: CallUser,
) -> Result<Option<ServerEvent>, HandlerError> {
    require_peer(from_user, &req.to)?;

    let event = ServerEvent::CallMade(CallMade { offer: req.offer, from: req.from });
    if !state.hub.deliver(&req.to, event) {
        debug!(from = from_user, to = %req.to, "callee offline");
        return Ok(Some(ServerEvent::CallUnavailable(CallUnavailable { to: req.to })));
    }

    state.calls.ring(from_user, &req.to);
    info!(from = from_user, to = %req.to, "call offered");
    Ok(None)
}

pub fn answer_call(
    state: &AppState,
    from_user: &str,
    req: AnswerCall,
) -> Result<Option<ServerEvent>, HandlerError> {
    require_peer(from_user, &req.to)?;

    if state.hub.deliver(&req.to, ServerEvent::AnswerMade(AnswerMade { answer: req.answer })) {
        if state.calls.answer(from_user, &req.to) {
            info!(from = from_user, to = %req.to, "call answered");
        }
    } else {
        debug!(from = from_user, to = %req.to, "answer dropped, caller offline");
    }
    Ok(None)
}

pub fn ice_candidate(
    state: &AppState,
    from_user: &str,
    req: IceCandidate,
) -> Result<Option<ServerEvent>, HandlerError> {
    require_peer(from_user, &req.to)?;

    let event = ServerEvent::IceCandidate(IceCandidateRelay { candidate: req.candidate });
    if !state.hub.deliver(&req.to, event) {
        debug!(from = from_user, to = %req.to, "ice candidate dropped, peer offline");
    }
    Ok(None)
}

/// Relay a hang-up. Safe when no call is in progress.
pub fn end_call(
    state: &AppState,
    from_user: &str,
    req: EndCall,
) -> Result<Option<ServerEvent>, HandlerError> {
    require_peer(from_user, &req.to)?;

    let phase = state.calls.end(from_user, &req.to);
    state.hub.deliver(&req.to, ServerEvent::CallEnded);
    info!(from = from_user, to = %req.to, ?phase, "call ended");
    Ok(None)
}

/// Tear down every call involving `user_id` after their session dropped,
/// notifying each peer once. Returns how many peers were notified.
pub fn end_calls_for(state: &AppState, user_id: &str) -> usize {
    let peers = state.calls.drop_user(user_id);
    let mut notified = 0;
    for peer in &peers {
        if state.hub.deliver(peer, ServerEvent::CallEnded) {
            notified += 1;
        }
        info!(user_id, peer = %peer, "call ended by disconnect");
    }
    notified
}

#[cfg(test)]
#[path = "relay_tests.rs"]
mod tests;
