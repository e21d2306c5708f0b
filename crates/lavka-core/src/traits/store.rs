// SPDX-FileCopyrightText: 2026 Lavka Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Store traits for per-user session and cart state.
//!
//! The bot keeps both in process memory today; the traits exist so the
//! storage can later move off-process without touching the flows.

use crate::types::{CartItem, Session, UserId};

/// Keyed storage for authenticated sessions.
pub trait SessionStore: Send + Sync {
    fn get(&self, user: UserId) -> Option<Session>;
    fn insert(&self, user: UserId, session: Session);
    /// Removes and returns the session, if any (logout).
    fn remove(&self, user: UserId) -> Option<Session>;
}

/// Keyed storage for in-progress carts.
///
/// A cart is an ordered list of line items; `start` resets it to empty,
/// which is how `/neworder` begins a selection round.
pub trait CartStore: Send + Sync {
    /// Current items, in selection order. Missing cart reads as empty.
    fn items(&self, user: UserId) -> Vec<CartItem>;
    /// Appends a line item, creating the cart if needed.
    fn push(&self, user: UserId, item: CartItem);
    /// Creates (or resets to) an empty cart.
    fn start(&self, user: UserId);
    /// Drops the cart entirely.
    fn clear(&self, user: UserId);
}
