// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Live session tracking and presence.

pub mod hub;
pub mod presence;
pub mod registry;
