// SPDX-FileCopyrightText: 2026 Lavka Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait definitions implemented by the adapter crates.

pub mod channel;
pub mod store;

pub use channel::ChatChannel;
pub use store::{CartStore, SessionStore};
