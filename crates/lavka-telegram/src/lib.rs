// SPDX-FileCopyrightText: 2026 Lavka Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Telegram channel adapter for the Lavka bot.
//!
//! Implements [`ChatChannel`] for the Telegram Bot API via teloxide:
//! long polling, command/callback extraction, inline keyboards, HTML
//! formatting, photo delivery with text fallback, and command-menu
//! registration.

pub mod handler;

use async_trait::async_trait;
use lavka_config::TelegramConfig;
use lavka_core::{ChatChannel, InboundEvent, Keyboard, LavkaError, OutboundMessage};
use teloxide::dptree;
use teloxide::prelude::*;
use teloxide::types::{
    BotCommand, CallbackQuery, ChatId, InlineKeyboardButton, InlineKeyboardMarkup, InputFile,
    ParseMode,
};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Telegram channel implementing [`ChatChannel`].
///
/// Connects via long polling; messages and callback queries are filtered,
/// converted into [`InboundEvent`]s, and queued for the bot loop.
pub struct TelegramChannel {
    bot: Bot,
    config: TelegramConfig,
    inbound_rx: tokio::sync::Mutex<mpsc::Receiver<InboundEvent>>,
    inbound_tx: mpsc::Sender<InboundEvent>,
    polling_handle: Option<tokio::task::JoinHandle<()>>,
}

impl TelegramChannel {
    /// Creates the adapter. Requires `config.bot_token` -- its absence is
    /// the fatal startup condition.
    pub fn new(config: TelegramConfig) -> Result<Self, LavkaError> {
        let token = config.bot_token.as_deref().ok_or_else(|| {
            LavkaError::Config("telegram.bot_token is required to start the bot".into())
        })?;
        if token.is_empty() {
            return Err(LavkaError::Config("telegram.bot_token cannot be empty".into()));
        }

        let bot = Bot::new(token);
        let (inbound_tx, inbound_rx) = mpsc::channel(100);

        Ok(Self {
            bot,
            config,
            inbound_rx: tokio::sync::Mutex::new(inbound_rx),
            inbound_tx,
            polling_handle: None,
        })
    }

    /// Starts long polling and registers the command menu.
    pub async fn connect(&mut self) -> Result<(), LavkaError> {
        if self.polling_handle.is_some() {
            return Ok(()); // Already connected
        }

        if self.config.command_menu {
            if let Err(e) = self.bot.set_my_commands(command_menu()).await {
                warn!(error = %e, "failed to register command menu");
            }
        }

        let bot = self.bot.clone();
        let tx = self.inbound_tx.clone();
        let callback_tx = self.inbound_tx.clone();

        info!("starting Telegram long polling");

        let handle = tokio::spawn(async move {
            let message_branch = Update::filter_message().endpoint(move |msg: Message| {
                let tx = tx.clone();
                async move {
                    match handler::message_event(&msg) {
                        Some(event) => {
                            if tx.send(event).await.is_err() {
                                warn!("inbound queue closed, dropping message");
                            }
                        }
                        None => {
                            debug!(chat_id = msg.chat.id.0, "ignoring unsupported message");
                        }
                    }
                    respond(())
                }
            });

            let callback_branch =
                Update::filter_callback_query().endpoint(move |bot: Bot, q: CallbackQuery| {
                    let tx = callback_tx.clone();
                    async move {
                        // Stop the client-side spinner right away.
                        if let Err(e) = bot.answer_callback_query(q.id.clone()).await {
                            debug!(error = %e, "failed to answer callback query");
                        }
                        match handler::callback_event(&q) {
                            Some(event) => {
                                if tx.send(event).await.is_err() {
                                    warn!("inbound queue closed, dropping callback");
                                }
                            }
                            None => {
                                debug!("ignoring callback query without payload");
                            }
                        }
                        respond(())
                    }
                });

            Dispatcher::builder(
                bot,
                dptree::entry().branch(message_branch).branch(callback_branch),
            )
            .default_handler(|_| async {}) // Silently ignore other update kinds
            .build()
            .dispatch()
            .await;
        });

        self.polling_handle = Some(handle);
        Ok(())
    }

    /// Returns a reference to the underlying teloxide Bot.
    pub fn bot(&self) -> &Bot {
        &self.bot
    }
}

impl Drop for TelegramChannel {
    fn drop(&mut self) {
        if let Some(handle) = self.polling_handle.take() {
            handle.abort();
        }
    }
}

#[async_trait]
impl ChatChannel for TelegramChannel {
    async fn send(&self, msg: OutboundMessage) -> Result<(), LavkaError> {
        let chat = ChatId(msg.chat.0);
        let markup = msg.keyboard.as_ref().map(to_markup);

        // Photo with caption; Telegram rejecting the URL degrades to text.
        if let Some(url) = &msg.photo_url {
            match reqwest::Url::parse(url) {
                Ok(parsed) => {
                    let result = self
                        .bot
                        .send_photo(chat, InputFile::url(parsed))
                        .caption(msg.body.as_str())
                        .parse_mode(ParseMode::Html)
                        .await;
                    match result {
                        Ok(_) => return Ok(()),
                        Err(e) => {
                            warn!(error = %e, "photo send failed, falling back to text");
                        }
                    }
                }
                Err(e) => {
                    warn!(url, error = %e, "invalid image URL, falling back to text");
                }
            }
        }

        // Edit in place when requested; a failed edit degrades to a send.
        if let Some(edit) = msg.edit {
            let request = self
                .bot
                .edit_message_text(chat, teloxide::types::MessageId(edit.0), msg.body.as_str())
                .parse_mode(ParseMode::Html);
            let result = match markup.clone() {
                Some(kb) => request.reply_markup(kb).await,
                None => request.await,
            };
            match result {
                Ok(_) => return Ok(()),
                Err(e) => {
                    debug!(error = %e, "edit failed, sending a fresh message");
                }
            }
        }

        let request = self
            .bot
            .send_message(chat, msg.body.as_str())
            .parse_mode(ParseMode::Html);
        let result = match markup {
            Some(kb) => request.reply_markup(kb).await,
            None => request.await,
        };
        result.map_err(|e| {
            error!(error = %e, chat = msg.chat.0, "failed to send message");
            LavkaError::Channel {
                message: format!("failed to send message: {e}"),
                source: Some(Box::new(e)),
            }
        })?;
        Ok(())
    }

    async fn recv(&self) -> Result<InboundEvent, LavkaError> {
        let mut rx = self.inbound_rx.lock().await;
        rx.recv().await.ok_or_else(|| LavkaError::Channel {
            message: "Telegram inbound queue closed".into(),
            source: None,
        })
    }
}

/// Inline keyboard conversion: every core button becomes a callback
/// button carrying its opaque payload.
fn to_markup(keyboard: &Keyboard) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(keyboard.rows.iter().map(|row| {
        row.iter()
            .map(|b| InlineKeyboardButton::callback(b.label.clone(), b.payload.clone()))
            .collect::<Vec<_>>()
    }))
}

/// The command menu shown by the Telegram client.
fn command_menu() -> Vec<BotCommand> {
    vec![
        BotCommand::new("start", "Запуск бота"),
        BotCommand::new("help", "Помощь"),
        BotCommand::new("login", "Авторизация"),
        BotCommand::new("newclient", "Регистрация"),
        BotCommand::new("products", "Список товаров"),
        BotCommand::new("neworder", "Создать заказ"),
        BotCommand::new("cart", "Корзина"),
        BotCommand::new("orders", "Мои заказы"),
        BotCommand::new("status", "Статус заказа"),
        BotCommand::new("couriers", "Курьеры"),
        BotCommand::new("logout", "Выход"),
        BotCommand::new("reports", "Отчеты (для администраторов)"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use lavka_core::Button;

    fn config(token: Option<&str>) -> TelegramConfig {
        TelegramConfig {
            bot_token: token.map(String::from),
            command_menu: true,
        }
    }

    #[test]
    fn new_requires_bot_token() {
        assert!(TelegramChannel::new(config(None)).is_err());
    }

    #[test]
    fn new_rejects_empty_token() {
        assert!(TelegramChannel::new(config(Some(""))).is_err());
    }

    #[test]
    fn new_accepts_valid_token() {
        let channel = TelegramChannel::new(config(Some(
            "123456:ABC-DEF1234ghIkl-zyx57W2v1u123ew11",
        )));
        assert!(channel.is_ok());
    }

    #[test]
    fn markup_preserves_rows_and_payloads() {
        let keyboard = Keyboard {
            rows: vec![
                vec![Button::new("A", "product_a")],
                vec![Button::new("Готово", "finish_selection")],
            ],
        };
        let markup = to_markup(&keyboard);
        assert_eq!(markup.inline_keyboard.len(), 2);
        assert_eq!(markup.inline_keyboard[0][0].text, "A");
    }

    #[test]
    fn command_menu_covers_the_chat_interface() {
        let menu = command_menu();
        let names: Vec<&str> = menu.iter().map(|c| c.command.as_str()).collect();
        for expected in [
            "start", "help", "login", "newclient", "products", "neworder", "cart", "orders",
            "status", "couriers", "logout", "reports",
        ] {
            assert!(names.contains(&expected), "missing command {expected}");
        }
    }
}
