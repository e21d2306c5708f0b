// SPDX-FileCopyrightText: 2026 Lavka Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The order-building flow.
//!
//! `/neworder` walks `SelectingProducts -> EnteringQuantity ->
//! SelectingProducts (loop) -> SelectingPayment -> EnteringAddress ->
//! ConfirmingOrder`. Confirmation submits the order document, runs courier
//! allocation, and clears cart and state no matter how submission went.

use lavka_core::{
    Button, CartItem, Keyboard, LavkaError, MessageRef, OutboundMessage, cart_total,
};
use lavka_odata::{NewOrderLine, NewOrderRecord, OrderStatus, PaymentMethod};
use tracing::{info, warn};
use uuid::Uuid;

use crate::allocation::{self, Allocation};
use crate::dispatch::{Ctx, payloads};
use crate::flows::now_wire;
use crate::state::ConversationState;
use crate::text;

/// `/neworder`: requires a session, resets the cart, shows the picker.
pub(crate) async fn start(cx: &Ctx<'_>) -> Result<(), LavkaError> {
    if cx.authenticated().await?.is_none() {
        return Ok(());
    }
    cx.carts.start(cx.user);
    send_product_picker(cx).await
}

/// Renders all non-deleted products as buttons plus the finish button,
/// and (re)enters `SelectingProducts`.
async fn send_product_picker(cx: &Ctx<'_>) -> Result<(), LavkaError> {
    let products = cx.odata.list_products(None).await?;
    if products.is_empty() {
        return cx.reply(text::no_products()).await;
    }

    let mut buttons: Vec<Button> = products
        .iter()
        .map(|p| {
            Button::new(
                text::product_button_label(p),
                format!("{}{}", payloads::PRODUCT_PREFIX, p.key),
            )
        })
        .collect();
    buttons.push(Button::new("🛒 Завершить выбор", payloads::FINISH_SELECTION));

    cx.send(
        OutboundMessage::text(cx.chat, text::pick_products()).keyboard(Keyboard::column(buttons)),
    )
    .await?;
    cx.states.set(cx.user, ConversationState::SelectingProducts);
    Ok(())
}

/// A product button pressed while picking: remember it, ask the quantity.
pub(crate) async fn product_selected(cx: &Ctx<'_>, product_key: &str) -> Result<(), LavkaError> {
    cx.states.set(
        cx.user,
        ConversationState::EnteringQuantity {
            product_key: product_key.to_string(),
        },
    );
    cx.reply(text::ask_quantity()).await
}

/// Quantity text received. Non-numeric or non-positive input reprompts
/// without a state change; a valid quantity fetches the product's current
/// price, appends the cart line, shows the running total, and loops back
/// to the picker.
pub(crate) async fn quantity_entered(
    cx: &Ctx<'_>,
    product_key: &str,
    input: &str,
) -> Result<(), LavkaError> {
    let quantity = match input.trim().parse::<i64>() {
        Err(_) => return cx.reply(text::quantity_not_a_number()).await,
        Ok(q) if q <= 0 => return cx.reply(text::quantity_must_be_positive()).await,
        Ok(q) => u32::try_from(q).unwrap_or(u32::MAX),
    };

    let product = cx.odata.product(product_key).await?;
    cx.carts.push(
        cx.user,
        CartItem {
            product_key: product_key.to_string(),
            name: product.name.clone(),
            unit_price: product.price,
            quantity,
            image_url: product.image_url.clone(),
        },
    );
    cx.reply(text::item_added(&product.name, quantity)).await?;
    cx.reply(text::running_cart(&cx.carts.items(cx.user))).await?;
    send_product_picker(cx).await
}

/// "Finish selection" pressed. An empty cart aborts the flow; otherwise
/// the payment choice is offered.
pub(crate) async fn finish_selection(
    cx: &Ctx<'_>,
    message: Option<MessageRef>,
) -> Result<(), LavkaError> {
    if cx.carts.items(cx.user).is_empty() {
        cx.send(OutboundMessage::text(cx.chat, text::cart_empty()).edit_of(message))
            .await?;
        cx.states.clear(cx.user);
        return Ok(());
    }

    let keyboard = Keyboard::row([
        Button::new("💳 Наличные", payloads::PAYMENT_CASH),
        Button::new("💸 Карта", payloads::PAYMENT_CARD),
    ]);
    cx.send(
        OutboundMessage::text(cx.chat, text::choose_payment())
            .keyboard(keyboard)
            .edit_of(message),
    )
    .await?;
    cx.states.set(cx.user, ConversationState::SelectingPayment);
    Ok(())
}

/// Payment method chosen; ask for the delivery address, suggesting the
/// session's default.
pub(crate) async fn payment_selected(
    cx: &Ctx<'_>,
    payment: PaymentMethod,
    message: Option<MessageRef>,
) -> Result<(), LavkaError> {
    let default_address = cx.session().map(|s| s.address).unwrap_or_default();
    cx.send(
        OutboundMessage::text(cx.chat, text::ask_address(&default_address)).edit_of(message),
    )
    .await?;
    cx.states
        .set(cx.user, ConversationState::EnteringAddress { payment });
    Ok(())
}

/// Address text received. Blank input reprompts; otherwise the summary
/// with confirm/cancel buttons is shown.
pub(crate) async fn address_entered(
    cx: &Ctx<'_>,
    payment: PaymentMethod,
    input: &str,
) -> Result<(), LavkaError> {
    let address = input.trim();
    if address.is_empty() {
        return cx.reply(text::address_empty()).await;
    }

    let items = cx.carts.items(cx.user);
    // Product photos accompany the summary; failures are the adapter's
    // problem (it degrades to text).
    for item in &items {
        if let Some(url) = &item.image_url {
            cx.send(OutboundMessage::photo(cx.chat, url.clone(), item.name.clone()))
                .await?;
        }
    }

    let keyboard = Keyboard::row([
        Button::new("✅ Подтвердить", payloads::CONFIRM_ORDER),
        Button::new("❌ Отменить", payloads::CANCEL_ORDER),
    ]);
    cx.send(
        OutboundMessage::text(cx.chat, text::confirm_summary(&items, payment, address))
            .keyboard(keyboard),
    )
    .await?;
    cx.states.set(
        cx.user,
        ConversationState::ConfirmingOrder {
            payment,
            address: address.to_string(),
        },
    );
    Ok(())
}

/// "Confirm" pressed: submit the order, allocate a courier, report.
///
/// Cart and state are cleared whether submission succeeded or not.
pub(crate) async fn confirm(
    cx: &Ctx<'_>,
    payment: PaymentMethod,
    address: &str,
    message: Option<MessageRef>,
) -> Result<(), LavkaError> {
    let result = submit_order(cx, payment, address, message).await;
    cx.carts.clear(cx.user);
    cx.states.clear(cx.user);
    result
}

async fn submit_order(
    cx: &Ctx<'_>,
    payment: PaymentMethod,
    address: &str,
    message: Option<MessageRef>,
) -> Result<(), LavkaError> {
    let Some(session) = cx.session() else {
        // The session evaporated mid-flow (logout or restart).
        return cx
            .send(OutboundMessage::text(cx.chat, text::auth_required()).edit_of(message))
            .await;
    };

    let items = cx.carts.items(cx.user);
    let total = cart_total(&items);
    let order = NewOrderRecord {
        date: now_wire(),
        client_key: session.client_key,
        total: text::money(total),
        payment_method: payment,
        status: OrderStatus::New,
        address: address.to_string(),
        items: items
            .iter()
            .enumerate()
            .map(|(idx, item)| NewOrderLine {
                key: Uuid::new_v4().to_string(),
                line_number: idx as u32 + 1,
                product_key: item.product_key.clone(),
                quantity: item.quantity,
            })
            .collect(),
    };

    let created = cx.odata.create_order(&order).await?;
    info!(
        user = cx.user.0,
        order = %created.key,
        number = %created.number,
        total = %order.total,
        "order created"
    );

    let allocation = allocation::assign_courier(cx, &created.key, address).await;
    if let Allocation::Assigned { courier_key, .. } = &allocation {
        // The assignment exists either way; a failed order patch leaves the
        // order in "Новый" with a courier already bound to it. Logged only.
        if let Err(err) = cx.odata.assign_order_courier(&created.key, courier_key).await {
            warn!(order = %created.key, error = %err, "failed to patch order with courier");
        }
    }

    let courier_name = match &allocation {
        Allocation::Assigned { courier_name, .. } => Some(courier_name.as_str()),
        Allocation::Unassigned => None,
    };
    cx.send(
        OutboundMessage::text(
            cx.chat,
            text::order_created(&created.number, address, total, courier_name),
        )
        .edit_of(message),
    )
    .await
}

/// "Cancel" pressed: drop cart and state, notify.
pub(crate) async fn cancel(cx: &Ctx<'_>, message: Option<MessageRef>) -> Result<(), LavkaError> {
    cx.carts.clear(cx.user);
    cx.states.clear(cx.user);
    cx.send(OutboundMessage::text(cx.chat, text::order_cancelled()).edit_of(message))
        .await
}
