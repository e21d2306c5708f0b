// SPDX-FileCopyrightText: 2026 Lavka Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Catalog browsing: product cards and the courier list.

use lavka_core::{LavkaError, OutboundMessage};

use crate::dispatch::Ctx;
use crate::text;

/// `/products`: one card per product, as a photo when the record carries
/// an image (the adapter falls back to text if the photo is rejected).
pub(crate) async fn products(cx: &Ctx<'_>) -> Result<(), LavkaError> {
    let products = cx.odata.list_products(Some(20)).await?;
    if products.is_empty() {
        return cx.reply(text::no_products()).await;
    }

    for product in &products {
        let card = text::product_card(product);
        match &product.image_url {
            Some(url) => {
                cx.send(OutboundMessage::photo(cx.chat, url.clone(), card)).await?;
            }
            None => cx.reply(card).await?,
        }
    }
    Ok(())
}

/// `/couriers`: the courier list, capped at 10.
pub(crate) async fn couriers(cx: &Ctx<'_>) -> Result<(), LavkaError> {
    let couriers = cx.odata.list_couriers().await?;
    if couriers.is_empty() {
        return cx.reply(text::no_couriers_found()).await;
    }
    cx.reply(text::couriers_list(&couriers)).await
}
