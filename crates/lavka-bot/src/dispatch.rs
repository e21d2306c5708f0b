// SPDX-FileCopyrightText: 2026 Lavka Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The single dispatch point of the conversation state machine.
//!
//! Every received event is matched against (current state, event shape)
//! exactly once, here. Handlers live in `flows`; they recover validation
//! errors locally (reprompt) and surface not-found conditions themselves,
//! so any error reaching the dispatcher aborts the active flow: the state
//! entry is removed, the failure is logged with context, and the user
//! gets a generic message.

use std::sync::Arc;

use lavka_core::{
    ChatChannel, ChatRef, EventKind, InboundEvent, LavkaError, OutboundMessage, SessionStore,
    UserId,
};
use lavka_core::{CartStore, Session};
use lavka_odata::{ODataClient, PaymentMethod};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::flows;
use crate::state::ConversationState;
use crate::store::{InMemoryCartStore, InMemorySessionStore, StateMap};
use crate::text;

/// Opaque inline-button payloads of the chat interface.
pub mod payloads {
    pub const PRODUCT_PREFIX: &str = "product_";
    pub const ORDER_PREFIX: &str = "order_";
    pub const REPORT_PREFIX: &str = "report_";
    pub const FINISH_SELECTION: &str = "finish_selection";
    pub const PAYMENT_CASH: &str = "payment_cash";
    pub const PAYMENT_CARD: &str = "payment_card";
    pub const CONFIRM_ORDER: &str = "confirm_order";
    pub const CANCEL_ORDER: &str = "cancel_order";
    pub const CLEAR_CART: &str = "clear_cart";
}

/// Everything a flow handler needs for one turn.
pub(crate) struct Ctx<'a> {
    pub channel: &'a dyn ChatChannel,
    pub odata: &'a ODataClient,
    pub sessions: &'a dyn SessionStore,
    pub carts: &'a dyn CartStore,
    pub states: &'a StateMap,
    pub admin_phone: Option<&'a str>,
    pub user: UserId,
    pub chat: ChatRef,
}

impl Ctx<'_> {
    pub async fn send(&self, msg: OutboundMessage) -> Result<(), LavkaError> {
        self.channel.send(msg).await
    }

    pub async fn reply(&self, body: impl Into<String>) -> Result<(), LavkaError> {
        self.send(OutboundMessage::text(self.chat, body)).await
    }

    pub fn session(&self) -> Option<Session> {
        self.sessions.get(self.user)
    }

    /// The session, or `None` after prompting the user to authenticate.
    pub async fn authenticated(&self) -> Result<Option<Session>, LavkaError> {
        match self.session() {
            Some(session) => Ok(Some(session)),
            None => {
                self.reply(text::auth_required()).await?;
                Ok(None)
            }
        }
    }
}

/// The bot's event loop: one conversation turn at a time, run to
/// completion before the next is dispatched.
pub struct BotLoop {
    channel: Arc<dyn ChatChannel>,
    odata: Arc<ODataClient>,
    sessions: Arc<dyn SessionStore>,
    carts: Arc<dyn CartStore>,
    states: StateMap,
    admin_phone: Option<String>,
}

impl BotLoop {
    /// A bot with fresh in-memory session/cart stores.
    pub fn new(
        channel: Arc<dyn ChatChannel>,
        odata: Arc<ODataClient>,
        admin_phone: Option<String>,
    ) -> Self {
        Self::with_stores(
            channel,
            odata,
            admin_phone,
            Arc::new(InMemorySessionStore::new()),
            Arc::new(InMemoryCartStore::new()),
        )
    }

    /// A bot over caller-provided stores.
    pub fn with_stores(
        channel: Arc<dyn ChatChannel>,
        odata: Arc<ODataClient>,
        admin_phone: Option<String>,
        sessions: Arc<dyn SessionStore>,
        carts: Arc<dyn CartStore>,
    ) -> Self {
        Self {
            channel,
            odata,
            sessions,
            carts,
            states: StateMap::new(),
            admin_phone,
        }
    }

    pub fn sessions(&self) -> &dyn SessionStore {
        self.sessions.as_ref()
    }

    pub fn carts(&self) -> &dyn CartStore {
        self.carts.as_ref()
    }

    pub fn conversation_state(&self, user: UserId) -> Option<ConversationState> {
        self.states.get(user)
    }

    pub fn is_idle(&self, user: UserId) -> bool {
        self.states.is_idle(user)
    }

    /// Runs until the cancellation token fires or the channel closes.
    pub async fn run(&self, cancel: CancellationToken) -> Result<(), LavkaError> {
        info!("bot loop running");
        loop {
            tokio::select! {
                event = self.channel.recv() => {
                    match event {
                        Ok(event) => self.dispatch(event).await,
                        Err(e) => {
                            error!(error = %e, "channel receive error");
                            break;
                        }
                    }
                }
                _ = cancel.cancelled() => {
                    info!("shutdown signal received, stopping bot loop");
                    break;
                }
            }
        }
        info!("bot loop stopped");
        Ok(())
    }

    /// Handles one inbound event to completion.
    pub async fn dispatch(&self, event: InboundEvent) {
        let cx = Ctx {
            channel: self.channel.as_ref(),
            odata: self.odata.as_ref(),
            sessions: self.sessions.as_ref(),
            carts: self.carts.as_ref(),
            states: &self.states,
            admin_phone: self.admin_phone.as_deref(),
            user: event.user,
            chat: event.chat,
        };

        if let Err(err) = route(&cx, &event.kind).await {
            // Fail closed: the active flow is over, whatever it was.
            error!(
                user = event.user.0,
                state = ?self.states.get(event.user).map(|s| s.to_string()),
                error = %err,
                "turn failed"
            );
            self.states.clear(event.user);
            if let Err(send_err) = cx.reply(text::generic_error()).await {
                error!(error = %send_err, "failed to report error to user");
            }
        }
    }
}

/// The transition table: (event shape, current state) -> handler.
async fn route(cx: &Ctx<'_>, kind: &EventKind) -> Result<(), LavkaError> {
    match kind {
        EventKind::Command { name, args } => route_command(cx, name, args).await,
        EventKind::Text(input) => match cx.states.get(cx.user) {
            Some(ConversationState::EnteringPhone) => flows::auth::phone_entered(cx, input).await,
            Some(ConversationState::EnteringQuantity { product_key }) => {
                flows::order::quantity_entered(cx, &product_key, input).await
            }
            Some(ConversationState::EnteringAddress { payment }) => {
                flows::order::address_entered(cx, payment, input).await
            }
            _ => {
                // Free text outside of a text-expecting step is ignored.
                debug!(user = cx.user.0, "ignoring out-of-flow text");
                Ok(())
            }
        },
        EventKind::Button { payload, message } => route_button(cx, payload, *message).await,
    }
}

async fn route_command(cx: &Ctx<'_>, name: &str, args: &str) -> Result<(), LavkaError> {
    match name {
        "start" | "help" => {
            let is_admin = cx.session().map(|s| s.is_admin).unwrap_or(false);
            cx.reply(text::help(is_admin)).await
        }
        "login" => flows::auth::login_start(cx).await,
        "newclient" => flows::auth::register(cx, args).await,
        "logout" => flows::auth::logout(cx).await,
        "products" => flows::catalog::products(cx).await,
        "couriers" => flows::catalog::couriers(cx).await,
        "neworder" => flows::order::start(cx).await,
        "cart" => flows::cart::view(cx).await,
        "orders" => flows::history::orders(cx).await,
        "status" => flows::history::status(cx, args).await,
        #[cfg(feature = "reports")]
        "reports" => crate::reports::menu(cx).await,
        _ => {
            debug!(user = cx.user.0, command = name, "ignoring unknown command");
            Ok(())
        }
    }
}

async fn route_button(
    cx: &Ctx<'_>,
    payload: &str,
    message: Option<lavka_core::MessageRef>,
) -> Result<(), LavkaError> {
    use self::payloads::*;

    let state = cx.states.get(cx.user);
    match (payload, &state) {
        (p, Some(ConversationState::SelectingProducts)) if p.starts_with(PRODUCT_PREFIX) => {
            flows::order::product_selected(cx, &p[PRODUCT_PREFIX.len()..]).await
        }
        (FINISH_SELECTION, Some(ConversationState::SelectingProducts)) => {
            flows::order::finish_selection(cx, message).await
        }
        (PAYMENT_CASH, Some(ConversationState::SelectingPayment)) => {
            flows::order::payment_selected(cx, PaymentMethod::Cash, message).await
        }
        (PAYMENT_CARD, Some(ConversationState::SelectingPayment)) => {
            flows::order::payment_selected(cx, PaymentMethod::Card, message).await
        }
        (CONFIRM_ORDER, Some(ConversationState::ConfirmingOrder { payment, address })) => {
            flows::order::confirm(cx, *payment, address, message).await
        }
        (CANCEL_ORDER, Some(ConversationState::ConfirmingOrder { .. })) => {
            flows::order::cancel(cx, message).await
        }
        // Stateless buttons: valid from any conversation position.
        (CLEAR_CART, _) => flows::cart::clear(cx, message).await,
        (p, _) if p.starts_with(ORDER_PREFIX) => {
            flows::history::order_details(cx, &p[ORDER_PREFIX.len()..], message).await
        }
        #[cfg(feature = "reports")]
        (p, _) if p.starts_with(REPORT_PREFIX) => {
            crate::reports::run(cx, &p[REPORT_PREFIX.len()..], message).await
        }
        _ => {
            // A button from an aborted or superseded flow.
            debug!(user = cx.user.0, payload, "ignoring stale button");
            Ok(())
        }
    }
}
