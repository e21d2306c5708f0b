// SPDX-FileCopyrightText: 2026 Lavka Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Lavka bot.
//!
//! Provides the closed error taxonomy, channel-agnostic chat types, and
//! the store/channel traits implemented elsewhere in the workspace.

pub mod error;
pub mod traits;
pub mod types;

pub use error::LavkaError;
pub use traits::{CartStore, ChatChannel, SessionStore};
pub use types::{
    Button, CartItem, ChatRef, EventKind, InboundEvent, Keyboard, MessageRef, OutboundMessage,
    Session, UserId, cart_total,
};
