// SPDX-FileCopyrightText: 2026 Lavka Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Flow handlers, one module per user-visible feature area.
//!
//! Handlers are free functions taking the turn context. They own the
//! recoverable error kinds: validation failures reprompt without a state
//! change, not-found conditions become user-visible messages. Anything
//! else is propagated for the dispatcher to fail the flow closed.

pub(crate) mod auth;
pub(crate) mod cart;
pub(crate) mod catalog;
pub(crate) mod history;
pub(crate) mod order;

/// Current UTC time in the business-data service's wire format.
pub(crate) fn now_wire() -> String {
    chrono::Utc::now()
        .format(crate::text::WIRE_DATE_FORMAT)
        .to_string()
}
