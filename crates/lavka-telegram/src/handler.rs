// SPDX-FileCopyrightText: 2026 Lavka Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Update-to-event extraction.
//!
//! Converts Telegram messages and callback queries into the
//! channel-agnostic [`InboundEvent`] shape the conversation engine
//! consumes. Only private (DM) chats are processed.

use lavka_core::{ChatRef, EventKind, InboundEvent, MessageRef, UserId};
use teloxide::types::{CallbackQuery, ChatKind, Message};

/// Whether the message comes from a private (DM) chat. Group, supergroup,
/// and channel messages are ignored.
pub fn is_dm(msg: &Message) -> bool {
    matches!(msg.chat.kind, ChatKind::Private(_))
}

/// Parses message text into an event kind: `/command args` becomes
/// `Command` (with an optional `@botname` suffix stripped), anything else
/// is free text.
pub fn parse_text(text: &str) -> EventKind {
    let trimmed = text.trim();
    if let Some(rest) = trimmed.strip_prefix('/') {
        let mut parts = rest.splitn(2, char::is_whitespace);
        let token = parts.next().unwrap_or_default();
        let name = token.split('@').next().unwrap_or_default().to_string();
        let args = parts.next().unwrap_or_default().trim().to_string();
        if !name.is_empty() {
            return EventKind::Command { name, args };
        }
    }
    EventKind::Text(trimmed.to_string())
}

/// Converts a Telegram message into an inbound event. Returns `None` for
/// non-DM chats, senderless posts, and non-text content.
pub fn message_event(msg: &Message) -> Option<InboundEvent> {
    if !is_dm(msg) {
        return None;
    }
    let user = msg.from.as_ref()?;
    let text = msg.text()?;
    Some(InboundEvent {
        user: UserId(user.id.0 as i64),
        chat: ChatRef(msg.chat.id.0),
        kind: parse_text(text),
    })
}

/// Converts a callback query into a button event. The message the
/// keyboard was attached to is carried along for edit-in-place, when
/// Telegram still exposes it.
pub fn callback_event(q: &CallbackQuery) -> Option<InboundEvent> {
    let payload = q.data.clone()?;
    let (chat, message) = match q.message.as_ref() {
        Some(m) => (ChatRef(m.chat().id.0), Some(MessageRef(m.id().0))),
        None => (ChatRef(q.from.id.0 as i64), None),
    };
    Some(InboundEvent {
        user: UserId(q.from.id.0 as i64),
        chat,
        kind: EventKind::Button { payload, message },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a mock private chat message from JSON, matching the Telegram
    /// Bot API structure.
    fn make_private_message(user_id: u64, text: &str) -> Message {
        let json = serde_json::json!({
            "message_id": 7,
            "date": 1700000000i64,
            "chat": {
                "id": user_id as i64,
                "type": "private",
                "first_name": "Test",
            },
            "from": {
                "id": user_id,
                "is_bot": false,
                "first_name": "Test",
            },
            "text": text,
        });
        serde_json::from_value(json).expect("failed to deserialize mock message")
    }

    fn make_group_message(text: &str) -> Message {
        let json = serde_json::json!({
            "message_id": 7,
            "date": 1700000000i64,
            "chat": {
                "id": -100123i64,
                "type": "supergroup",
                "title": "Test Group",
            },
            "from": {
                "id": 12345u64,
                "is_bot": false,
                "first_name": "Test",
            },
            "text": text,
        });
        serde_json::from_value(json).expect("failed to deserialize mock group message")
    }

    #[test]
    fn command_with_args_is_parsed() {
        let kind = parse_text("/status 000000123");
        assert_eq!(
            kind,
            EventKind::Command {
                name: "status".into(),
                args: "000000123".into(),
            }
        );
    }

    #[test]
    fn command_without_args_has_empty_args() {
        let kind = parse_text("/neworder");
        assert_eq!(
            kind,
            EventKind::Command {
                name: "neworder".into(),
                args: String::new(),
            }
        );
    }

    #[test]
    fn botname_suffix_is_stripped() {
        let kind = parse_text("/login@lavka_bot");
        assert_eq!(
            kind,
            EventKind::Command {
                name: "login".into(),
                args: String::new(),
            }
        );
    }

    #[test]
    fn newclient_args_keep_internal_spaces() {
        let kind = parse_text("/newclient Иван +79991234567 ул. Мира, 5");
        assert_eq!(
            kind,
            EventKind::Command {
                name: "newclient".into(),
                args: "Иван +79991234567 ул. Мира, 5".into(),
            }
        );
    }

    #[test]
    fn plain_text_is_text() {
        assert_eq!(parse_text("  +79991234567  "), EventKind::Text("+79991234567".into()));
    }

    #[test]
    fn lone_slash_is_text() {
        assert_eq!(parse_text("/"), EventKind::Text("/".into()));
    }

    #[test]
    fn private_message_maps_user_and_chat() {
        let msg = make_private_message(12345, "/cart");
        let event = message_event(&msg).unwrap();
        assert_eq!(event.user, UserId(12345));
        assert_eq!(event.chat, ChatRef(12345));
        assert!(matches!(event.kind, EventKind::Command { ref name, .. } if name == "cart"));
    }

    #[test]
    fn group_message_is_ignored() {
        let msg = make_group_message("/cart");
        assert!(message_event(&msg).is_none());
    }

    #[test]
    fn callback_query_becomes_button_event() {
        let json = serde_json::json!({
            "id": "q1",
            "from": {
                "id": 12345u64,
                "is_bot": false,
                "first_name": "Test",
            },
            "chat_instance": "ci",
            "data": "product_p1",
            "message": {
                "message_id": 9,
                "date": 1700000000i64,
                "chat": {
                    "id": 12345i64,
                    "type": "private",
                    "first_name": "Test",
                },
                "text": "📦 Выберите товары:",
            },
        });
        let q: CallbackQuery = serde_json::from_value(json).expect("mock callback query");
        let event = callback_event(&q).unwrap();
        assert_eq!(event.user, UserId(12345));
        assert_eq!(event.chat, ChatRef(12345));
        assert_eq!(
            event.kind,
            EventKind::Button {
                payload: "product_p1".into(),
                message: Some(MessageRef(9)),
            }
        );
    }

    #[test]
    fn callback_query_without_data_is_ignored() {
        let json = serde_json::json!({
            "id": "q1",
            "from": {
                "id": 12345u64,
                "is_bot": false,
                "first_name": "Test",
            },
            "chat_instance": "ci",
        });
        let q: CallbackQuery = serde_json::from_value(json).expect("mock callback query");
        assert!(callback_event(&q).is_none());
    }
}
