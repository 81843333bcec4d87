// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Durable chat: conversations, messages, delivery, and read receipts.

pub mod delivery;
pub mod memory;
pub mod model;
pub mod receipts;
pub mod store;
