// SPDX-FileCopyrightText: 2026 Lavka Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Order history and combined order/delivery status lookup.

use lavka_core::{Button, Keyboard, LavkaError, MessageRef, OutboundMessage};

use crate::dispatch::{Ctx, payloads};
use crate::text;

/// `/orders`: the ten most recent orders, newest first, as buttons.
pub(crate) async fn orders(cx: &Ctx<'_>) -> Result<(), LavkaError> {
    let Some(session) = cx.authenticated().await? else {
        return Ok(());
    };

    let orders = cx.odata.orders_for_client(&session.client_key).await?;
    if orders.is_empty() {
        return cx.reply(text::no_orders_yet()).await;
    }

    let buttons = orders.iter().map(|order| {
        Button::new(
            text::order_button_label(order),
            format!("{}{}", payloads::ORDER_PREFIX, order.key),
        )
    });
    cx.send(
        OutboundMessage::text(cx.chat, text::orders_title()).keyboard(Keyboard::column(buttons)),
    )
    .await
}

/// An `order_<key>` button: expand the order with its line items.
pub(crate) async fn order_details(
    cx: &Ctx<'_>,
    order_key: &str,
    message: Option<MessageRef>,
) -> Result<(), LavkaError> {
    match cx.odata.order_details(order_key).await {
        Ok(order) => {
            cx.send(OutboundMessage::text(cx.chat, text::order_details(&order)).edit_of(message))
                .await
        }
        Err(err) if err.is_not_found() => {
            cx.send(OutboundMessage::text(cx.chat, text::order_not_found()).edit_of(message))
                .await
        }
        Err(err) => Err(err),
    }
}

/// `/status <number>`: order by human-readable number, then its courier
/// assignment. Missing records render messages, never raise.
pub(crate) async fn status(cx: &Ctx<'_>, args: &str) -> Result<(), LavkaError> {
    let number = args.trim();
    if number.is_empty() {
        return cx.reply(text::status_usage()).await;
    }

    let Some(order) = cx.odata.order_by_number(number).await? else {
        return cx.reply(text::order_not_found()).await;
    };
    let assignment = cx.odata.assignment_for_order(&order.key).await?;
    cx.reply(text::status_text(&order, assignment.as_ref())).await
}
