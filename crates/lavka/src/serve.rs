// SPDX-FileCopyrightText: 2026 Lavka Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `lavka serve` command implementation.
//!
//! Wires the OData client, the in-memory stores, the Telegram channel,
//! and the conversation loop together, then runs until ctrl-c.

use std::sync::Arc;

use lavka_bot::BotLoop;
use lavka_config::LavkaConfig;
use lavka_core::{ChatChannel, LavkaError};
use lavka_odata::ODataClient;
use lavka_telegram::TelegramChannel;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

pub async fn run_serve(config: LavkaConfig) -> Result<(), LavkaError> {
    init_tracing(&config.log.level);
    info!(odata_url = config.odata.base_url.as_str(), "starting lavka");

    let odata = Arc::new(ODataClient::new(&config.odata)?);

    let mut telegram = TelegramChannel::new(config.telegram.clone())?;
    telegram.connect().await?;
    let channel: Arc<dyn ChatChannel> = Arc::new(telegram);

    let bot = BotLoop::new(channel, odata, config.admin.phone.clone());

    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("ctrl-c received, shutting down");
            signal_cancel.cancel();
        }
    });

    bot.run(cancel).await
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
