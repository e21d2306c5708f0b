// SPDX-FileCopyrightText: 2026 Lavka Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat channel trait for messaging platform integrations.

use async_trait::async_trait;

use crate::error::LavkaError;
use crate::types::{InboundEvent, OutboundMessage};

/// Adapter for a bidirectional chat transport.
///
/// The conversation engine only sees [`InboundEvent`]s and
/// [`OutboundMessage`]s; everything platform-specific (update polling,
/// markup encoding, photo delivery) lives behind this trait.
#[async_trait]
pub trait ChatChannel: Send + Sync {
    /// Delivers a message to the user. An `edit` reference that can no
    /// longer be honored degrades to a fresh send rather than an error.
    async fn send(&self, msg: OutboundMessage) -> Result<(), LavkaError>;

    /// Receives the next inbound event. Errors only when the transport
    /// is closed for good.
    async fn recv(&self) -> Result<InboundEvent, LavkaError>;
}
