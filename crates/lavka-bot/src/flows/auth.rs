// SPDX-FileCopyrightText: 2026 Lavka Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Authentication by phone, registration, and logout.

use std::sync::LazyLock;

use lavka_core::{LavkaError, Session};
use lavka_odata::NewClientRecord;
use regex::Regex;
use tracing::info;

use crate::dispatch::Ctx;
use crate::state::ConversationState;
use crate::text;

static PHONE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?\d{10,12}$").expect("phone pattern compiles"));

/// A `+`-optional run of 10-12 digits.
pub(crate) fn valid_phone(input: &str) -> bool {
    PHONE_PATTERN.is_match(input)
}

/// `/login`: prompt for the phone number.
pub(crate) async fn login_start(cx: &Ctx<'_>) -> Result<(), LavkaError> {
    cx.reply(text::login_prompt()).await?;
    cx.states.set(cx.user, ConversationState::EnteringPhone);
    Ok(())
}

/// Phone number received while in `EnteringPhone`.
///
/// Invalid input reprompts and keeps the state; an unknown phone aborts
/// with a "register instead" message. Upstream failures propagate, which
/// clears the state at the dispatcher (fail closed, no retry).
pub(crate) async fn phone_entered(cx: &Ctx<'_>, input: &str) -> Result<(), LavkaError> {
    let phone = input.trim();
    if !valid_phone(phone) {
        cx.reply(text::bad_phone_retry()).await?;
        return Ok(());
    }

    let client = match cx.odata.find_client(phone, &cx.user.0.to_string()).await {
        Ok(client) => client,
        Err(err) => {
            cx.states.clear(cx.user);
            return Err(err);
        }
    };

    cx.states.clear(cx.user);
    let Some(client) = client else {
        return cx.reply(text::client_not_found()).await;
    };

    let is_admin = cx.admin_phone == Some(phone);
    info!(user = cx.user.0, client = %client.key, is_admin, "login successful");
    cx.sessions.insert(
        cx.user,
        Session {
            client_key: client.key,
            phone: phone.to_string(),
            name: client.name.clone(),
            address: client.address,
            is_admin,
        },
    );
    cx.reply(text::login_ok(&client.name, is_admin)).await
}

/// `/newclient <name> <phone> <address>`: register and log in at once.
pub(crate) async fn register(cx: &Ctx<'_>, args: &str) -> Result<(), LavkaError> {
    let mut parts = args.trim().splitn(3, char::is_whitespace);
    let (Some(name), Some(phone), Some(address)) = (parts.next(), parts.next(), parts.next())
    else {
        return cx.reply(text::newclient_usage()).await;
    };
    let address = address.trim();
    if !valid_phone(phone) {
        return cx.reply(text::bad_phone()).await;
    }

    let record = NewClientRecord {
        name: name.to_string(),
        // Catalog code: the last six digits of the phone.
        code: phone[phone.len().saturating_sub(6)..].to_string(),
        phone: phone.to_string(),
        address: address.to_string(),
        telegram_id: cx.user.0.to_string(),
    };
    let created = cx.odata.register_client(&record).await?;

    let is_admin = cx.admin_phone == Some(phone);
    info!(user = cx.user.0, client = %created.key, "client registered");
    cx.sessions.insert(
        cx.user,
        Session {
            client_key: created.key,
            phone: phone.to_string(),
            name: name.to_string(),
            address: address.to_string(),
            is_admin,
        },
    );
    cx.reply(text::client_registered(name)).await
}

/// `/logout`: drop the session.
pub(crate) async fn logout(cx: &Ctx<'_>) -> Result<(), LavkaError> {
    match cx.sessions.remove(cx.user) {
        Some(session) => cx.reply(text::logout_ok(&session.name)).await,
        None => cx.reply(text::not_logged_in()).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phone_pattern_accepts_10_to_12_digits() {
        assert!(valid_phone("+79991234567"));
        assert!(valid_phone("79991234567"));
        assert!(valid_phone("1234567890"));
        assert!(valid_phone("123456789012"));
    }

    #[test]
    fn phone_pattern_rejects_malformed_input() {
        assert!(!valid_phone(""));
        assert!(!valid_phone("123456789")); // 9 digits
        assert!(!valid_phone("1234567890123")); // 13 digits
        assert!(!valid_phone("+7 999 123 45 67")); // spaces
        assert!(!valid_phone("8-999-123-45-67"));
        assert!(!valid_phone("phone"));
        assert!(!valid_phone("++79991234567"));
    }
}
