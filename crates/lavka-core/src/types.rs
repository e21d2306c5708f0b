// SPDX-FileCopyrightText: 2026 Lavka Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Channel-agnostic chat types and the in-memory business entities
//! (session, cart) shared across the Lavka workspace.

use serde::{Deserialize, Serialize};

/// Chat-user identity. One session, one cart, and at most one active
/// conversation state exist per `UserId`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub i64);

/// Destination chat for outbound messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChatRef(pub i64);

/// Reference to an already-delivered message, used for edit-in-place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRef(pub i32);

/// The shape of a single received chat turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    /// A slash command, e.g. `/status 000000123` -> name `status`,
    /// args `000000123`.
    Command { name: String, args: String },
    /// Free text (quantity entry, address entry, phone entry).
    Text(String),
    /// An inline-button press carrying its opaque payload. `message`
    /// references the message the keyboard was attached to, when the
    /// transport makes it available for editing.
    Button {
        payload: String,
        message: Option<MessageRef>,
    },
}

/// An inbound chat event, already stripped of transport specifics.
#[derive(Debug, Clone)]
pub struct InboundEvent {
    pub user: UserId,
    pub chat: ChatRef,
    pub kind: EventKind,
}

/// A single inline-keyboard button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub label: String,
    pub payload: String,
}

impl Button {
    pub fn new(label: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            payload: payload.into(),
        }
    }
}

/// An inline keyboard as rows of buttons.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Keyboard {
    pub rows: Vec<Vec<Button>>,
}

impl Keyboard {
    /// One button per row -- the layout used by pickers and menus.
    pub fn column(buttons: impl IntoIterator<Item = Button>) -> Self {
        Self {
            rows: buttons.into_iter().map(|b| vec![b]).collect(),
        }
    }

    /// A single row of buttons side by side.
    pub fn row(buttons: impl IntoIterator<Item = Button>) -> Self {
        Self {
            rows: vec![buttons.into_iter().collect()],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.iter().all(|r| r.is_empty())
    }
}

/// An outbound chat message. Built with the `text`/`photo` constructors
/// and the chained setters.
#[derive(Debug, Clone)]
pub struct OutboundMessage {
    pub chat: ChatRef,
    pub body: String,
    pub keyboard: Option<Keyboard>,
    /// When set, the transport delivers the body as a photo caption.
    pub photo_url: Option<String>,
    /// When set, the transport edits this message in place instead of
    /// sending a new one.
    pub edit: Option<MessageRef>,
}

impl OutboundMessage {
    pub fn text(chat: ChatRef, body: impl Into<String>) -> Self {
        Self {
            chat,
            body: body.into(),
            keyboard: None,
            photo_url: None,
            edit: None,
        }
    }

    pub fn photo(chat: ChatRef, url: impl Into<String>, caption: impl Into<String>) -> Self {
        Self {
            chat,
            body: caption.into(),
            keyboard: None,
            photo_url: Some(url.into()),
            edit: None,
        }
    }

    pub fn keyboard(mut self, keyboard: Keyboard) -> Self {
        self.keyboard = Some(keyboard);
        self
    }

    /// Edit an existing message in place when the transport knows it;
    /// falls back to a fresh send otherwise.
    pub fn edit_of(mut self, message: Option<MessageRef>) -> Self {
        self.edit = message;
        self
    }
}

/// An authenticated chat user, created on login/registration and destroyed
/// on logout. Never persisted -- lost on process restart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// `Ref_Key` of the client record in the business-data service.
    pub client_key: String,
    pub phone: String,
    pub name: String,
    /// Default delivery address, suggested during address entry.
    pub address: String,
    pub is_admin: bool,
}

/// One selected line in a user's cart.
#[derive(Debug, Clone, PartialEq)]
pub struct CartItem {
    pub product_key: String,
    pub name: String,
    pub unit_price: f64,
    pub quantity: u32,
    pub image_url: Option<String>,
}

impl CartItem {
    /// Line total: unit price times quantity.
    pub fn subtotal(&self) -> f64 {
        self.unit_price * f64::from(self.quantity)
    }
}

/// Cart total, recomputed fresh from the items on every render so edits
/// can never drift from a cached figure.
pub fn cart_total(items: &[CartItem]) -> f64 {
    items.iter().map(CartItem::subtotal).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(price: f64, qty: u32) -> CartItem {
        CartItem {
            product_key: "p".into(),
            name: "Товар".into(),
            unit_price: price,
            quantity: qty,
            image_url: None,
        }
    }

    #[test]
    fn cart_total_sums_line_subtotals() {
        let items = vec![item(100.0, 2), item(50.0, 1)];
        assert_eq!(cart_total(&items), 250.0);
        assert_eq!(format!("{:.2}", cart_total(&items)), "250.00");
    }

    #[test]
    fn empty_cart_total_is_zero() {
        assert_eq!(cart_total(&[]), 0.0);
    }

    #[test]
    fn subtotal_is_price_times_quantity() {
        assert_eq!(item(19.9, 3).subtotal(), 19.9 * 3.0);
    }

    #[test]
    fn keyboard_column_puts_one_button_per_row() {
        let kb = Keyboard::column([Button::new("A", "a"), Button::new("B", "b")]);
        assert_eq!(kb.rows.len(), 2);
        assert_eq!(kb.rows[0].len(), 1);
    }

    #[test]
    fn keyboard_row_is_single_row() {
        let kb = Keyboard::row([Button::new("A", "a"), Button::new("B", "b")]);
        assert_eq!(kb.rows.len(), 1);
        assert_eq!(kb.rows[0].len(), 2);
    }

    #[test]
    fn outbound_builder_chains() {
        let msg = OutboundMessage::text(ChatRef(1), "hi")
            .keyboard(Keyboard::row([Button::new("ok", "ok")]))
            .edit_of(Some(MessageRef(7)));
        assert_eq!(msg.chat, ChatRef(1));
        assert!(msg.keyboard.is_some());
        assert_eq!(msg.edit, Some(MessageRef(7)));
        assert!(msg.photo_url.is_none());
    }
}
