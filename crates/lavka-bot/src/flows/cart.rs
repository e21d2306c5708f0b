// SPDX-FileCopyrightText: 2026 Lavka Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cart viewing and clearing.

use lavka_core::{Button, Keyboard, LavkaError, MessageRef, OutboundMessage};

use crate::dispatch::{Ctx, payloads};
use crate::text;

/// `/cart`: itemized view with a clear button.
pub(crate) async fn view(cx: &Ctx<'_>) -> Result<(), LavkaError> {
    if cx.authenticated().await?.is_none() {
        return Ok(());
    }

    let items = cx.carts.items(cx.user);
    if items.is_empty() {
        return cx.reply(text::cart_empty()).await;
    }

    for item in &items {
        if let Some(url) = &item.image_url {
            cx.send(OutboundMessage::photo(cx.chat, url.clone(), item.name.clone()))
                .await?;
        }
    }

    cx.send(
        OutboundMessage::text(cx.chat, text::cart_view(&items)).keyboard(Keyboard::row([
            Button::new("🗑 Очистить", payloads::CLEAR_CART),
        ])),
    )
    .await
}

/// `clear_cart` button: valid from any state.
pub(crate) async fn clear(cx: &Ctx<'_>, message: Option<MessageRef>) -> Result<(), LavkaError> {
    cx.carts.clear(cx.user);
    cx.send(OutboundMessage::text(cx.chat, text::cart_cleared()).edit_of(message))
        .await
}
