// SPDX-FileCopyrightText: 2026 Lavka Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation engine for the Lavka bot.
//!
//! Owns the per-user session/cart/state maps, the conversation state
//! machine with its single dispatch point, every user-facing flow
//! (authentication, registration, order building, cart, history, status,
//! catalog browsing, admin reports), and the courier-allocation routine.

mod allocation;
pub mod dispatch;
mod flows;
#[cfg(feature = "reports")]
mod reports;
pub mod state;
pub mod store;
pub mod text;

pub use dispatch::{BotLoop, payloads};
pub use state::ConversationState;
pub use store::{InMemoryCartStore, InMemorySessionStore};
