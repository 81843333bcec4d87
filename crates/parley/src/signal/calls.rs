// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-pair call lifecycle, used to synthesize `call-ended` when a
//! participant's session drops mid-call.

use std::collections::HashMap;

use parking_lot::Mutex;

/// Phase of a tracked call. A pair with no entry is idle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallPhase {
    /// Offer relayed, no answer yet.
    Ringing,
    /// Answer relayed.
    Active,
}

#[derive(Debug, Clone)]
struct CallEntry {
    caller: String,
    phase: CallPhase,
}

type PairKey = (String, String);

fn pair_key(a: &str, b: &str) -> PairKey {
    if a <= b {
        (a.to_owned(), b.to_owned())
    } else {
        (b.to_owned(), a.to_owned())
    }
}

#[derive(Debug, Default)]
pub struct CallTracker {
    calls: Mutex<HashMap<PairKey, CallEntry>>,
}

impl CallTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an offer from `caller` to `callee`. A new offer restarts the
    /// pair at `Ringing`.
    pub fn ring(&self, caller: &str, callee: &str) {
        let entry = CallEntry { caller: caller.to_owned(), phase: CallPhase::Ringing };
        self.calls.lock().insert(pair_key(caller, callee), entry);
    }

    /// Record an answer. Returns false if no call was ringing for the pair.
    pub fn answer(&self, answerer: &str, caller: &str) -> bool {
        let mut calls = self.calls.lock();
        match calls.get_mut(&pair_key(answerer, caller)) {
            Some(entry) if entry.caller == caller => {
                entry.phase = CallPhase::Active;
                true
            }
            _ => false,
        }
    }

    /// Clear the pair. Returns the phase it was in, if any.
    pub fn end(&self, a: &str, b: &str) -> Option<CallPhase> {
        self.calls.lock().remove(&pair_key(a, b)).map(|entry| entry.phase)
    }

    pub fn phase(&self, a: &str, b: &str) -> Option<CallPhase> {
        self.calls.lock().get(&pair_key(a, b)).map(|entry| entry.phase)
    }

    /// Clear every pair involving `user_id` and return the peers, sorted.
    pub fn drop_user(&self, user_id: &str) -> Vec<String> {
        let mut calls = self.calls.lock();
        let mut peers = Vec::new();
        calls.retain(|(a, b), _| {
            if a == user_id {
                peers.push(b.clone());
                false
            } else if b == user_id {
                peers.push(a.clone());
                false
            } else {
                true
            }
        });
        peers.sort_unstable();
        peers
    }

    pub fn len(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.lock().is_empty()
    }
}
