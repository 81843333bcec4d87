// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Ephemeral peer-to-peer relays: call signaling and typing indicators.

pub mod calls;
pub mod relay;
pub mod typing;
