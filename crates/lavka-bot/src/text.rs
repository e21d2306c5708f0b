// SPDX-FileCopyrightText: 2026 Lavka Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User-facing message rendering.
//!
//! The bot speaks Russian to its customers; every string the user sees is
//! built here, with Telegram-HTML markup (`<b>`, `<i>`). Flows never
//! format text inline.

use chrono::NaiveDateTime;
use lavka_core::{CartItem, cart_total};
use lavka_odata::{AssignmentRecord, CourierRecord, OrderRecord, PaymentMethod, ProductRecord};

/// Wire timestamp format of the business-data service.
pub(crate) const WIRE_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Two-decimal money rendering, used everywhere an amount is shown.
pub fn money(value: f64) -> String {
    format!("{value:.2}")
}

/// `dd.mm.yyyy` from a wire timestamp; unparsable input renders as-is.
pub fn short_date(wire: &str) -> String {
    NaiveDateTime::parse_from_str(wire, WIRE_DATE_FORMAT)
        .map(|dt| dt.format("%d.%m.%Y").to_string())
        .unwrap_or_else(|_| wire.to_string())
}

/// `dd.mm.yyyy HH:MM` from a wire timestamp; unparsable input renders as-is.
pub fn long_date(wire: &str) -> String {
    NaiveDateTime::parse_from_str(wire, WIRE_DATE_FORMAT)
        .map(|dt| dt.format("%d.%m.%Y %H:%M").to_string())
        .unwrap_or_else(|_| wire.to_string())
}

fn payment_label(payment: PaymentMethod) -> &'static str {
    match payment {
        PaymentMethod::Cash => "Наличные",
        PaymentMethod::Card => "Карта",
    }
}

fn or_placeholder(value: &str, placeholder: &str) -> String {
    if value.is_empty() {
        placeholder.to_string()
    } else {
        value.to_string()
    }
}

// --- General ---

pub fn help(is_admin: bool) -> String {
    let admin_commands = if is_admin {
        "\n/reports - Просмотр отчетов (только для администраторов)"
    } else {
        ""
    };
    format!(
        "<b>🤖 Бот доставки продуктов</b>\n\n\
         Добро пожаловать! Я помогу вам заказать продукты с доставкой.\n\n\
         <b>Команды:</b>\n\
         /login - Авторизация по номеру телефона\n\
         /newclient [имя телефон адрес] - Регистрация\n\
         /products - Список товаров\n\
         /neworder - Создать заказ\n\
         /cart - Посмотреть корзину\n\
         /orders - Список заказов\n\
         /status [номер_заказа] - Статус доставки\n\
         /couriers - Список курьеров\n\
         /logout - Выход{admin_commands}\n\n\
         <b>Как использовать:</b>\n\
         1. Зарегистрируйтесь или авторизуйтесь\n\
         2. Просмотрите товары (/products)\n\
         3. Создайте заказ (/neworder)\n\
         4. Отслеживайте статус (/status)"
    )
}

pub fn generic_error() -> String {
    "⚠️ Произошла ошибка, попробуйте позже".to_string()
}

pub fn auth_required() -> String {
    "🔐 Пожалуйста, авторизуйтесь с помощью /login\nИли зарегистрируйтесь с помощью /newclient"
        .to_string()
}

// --- Authentication / registration ---

pub fn login_prompt() -> String {
    "📱 Введите номер телефона:".to_string()
}

pub fn bad_phone_retry() -> String {
    "❌ Неверный формат номера телефона. Попробуйте снова:".to_string()
}

pub fn bad_phone() -> String {
    "❌ Неверный формат номера телефона".to_string()
}

pub fn client_not_found() -> String {
    "❌ Клиент с таким номером телефона не найден. Зарегистрируйтесь с помощью /newclient"
        .to_string()
}

pub fn login_ok(name: &str, is_admin: bool) -> String {
    let admin_hint = if is_admin {
        " Вы вошли как администратор. Для отчетов введите команду /reports"
    } else {
        ""
    };
    format!("✅ Успешная авторизация, {name}!{admin_hint}")
}

pub fn newclient_usage() -> String {
    "❌ Формат: /newclient [имя] [телефон] [адрес]".to_string()
}

pub fn client_registered(name: &str) -> String {
    format!("✅ Клиент <b>{name}</b> успешно зарегистрирован(а)! Вы автоматически авторизованы.")
}

pub fn logout_ok(name: &str) -> String {
    let name = or_placeholder(name, "Пользователь");
    format!("👋 {name}, вы успешно вышли из аккаунта!")
}

pub fn not_logged_in() -> String {
    "ℹ️ Вы не авторизованы.".to_string()
}

// --- Catalog ---

pub fn no_products() -> String {
    "🛍️ Товаров не найдено".to_string()
}

pub fn product_card(product: &ProductRecord) -> String {
    format!(
        "<b>{}</b>\n\
         💰 <i>Цена:</i> {} руб.\n\
         📝 <i>Описание:</i> {}\n\
         ⚖️ <i>Масса:</i> {}\n\
         🏭 <i>Производитель:</i> {}\n\
         📅 <i>Срок годности:</i> {}\n\
         #️⃣ <i>Код:</i> {}",
        product.name,
        money(product.price),
        product.description.as_deref().unwrap_or("Нет"),
        product.weight.as_deref().unwrap_or("Не указана"),
        product.manufacturer.as_deref().unwrap_or("Не указан"),
        product.expiry.as_deref().unwrap_or("Не указан"),
        product.code,
    )
}

pub fn no_couriers_found() -> String {
    "🚴 Курьеров не найдено".to_string()
}

pub fn couriers_list(couriers: &[CourierRecord]) -> String {
    let mut out = String::from("<b>🚴 Доступные курьеры:</b>\n\n");
    for courier in couriers.iter().take(10) {
        out.push_str(&format!(
            "<b>{}</b>\n📞 <i>{}</i>\n🛵 <i>{}</i>\n\n",
            or_placeholder(&courier.name, "Без имени"),
            or_placeholder(&courier.phone, "не указан"),
            or_placeholder(&courier.status, "не указан"),
        ));
    }
    out.trim_end().to_string()
}

// --- Order building ---

pub fn pick_products() -> String {
    "📦 Выберите товары:".to_string()
}

pub fn product_button_label(product: &ProductRecord) -> String {
    format!("{} ({} руб.)", product.name, money(product.price))
}

pub fn ask_quantity() -> String {
    "📏 Введите количество (например, 2):".to_string()
}

pub fn quantity_not_a_number() -> String {
    "❌ Введите число".to_string()
}

pub fn quantity_must_be_positive() -> String {
    "❌ Количество должно быть больше 0".to_string()
}

pub fn item_added(name: &str, quantity: u32) -> String {
    format!("✅ Добавлено: {name} x{quantity}")
}

pub fn running_cart(items: &[CartItem]) -> String {
    let mut out = String::from("<b>🛒 Текущая корзина:</b>\n\n");
    for item in items {
        out.push_str(&format!(
            "▪ {} x{} = {} руб.\n",
            item.name,
            item.quantity,
            money(item.subtotal())
        ));
    }
    out.push_str(&format!("\n<b>💰 Итого: {} руб.</b>", money(cart_total(items))));
    out
}

pub fn cart_empty() -> String {
    "🛒 Корзина пуста".to_string()
}

pub fn cart_view(items: &[CartItem]) -> String {
    let mut out = String::from("<b>🛒 Ваша корзина:</b>\n\n");
    for item in items {
        out.push_str(&format!(
            "{} x{} = {} руб.\n",
            item.name,
            item.quantity,
            money(item.subtotal())
        ));
    }
    out.push_str(&format!("\n💰 <b>Итого:</b> {} руб.", money(cart_total(items))));
    out
}

pub fn cart_cleared() -> String {
    "🛒 Корзина очищена".to_string()
}

pub fn choose_payment() -> String {
    "💰 Выберите метод оплаты:".to_string()
}

pub fn ask_address(default_address: &str) -> String {
    format!("📍 Введите адрес доставки\n(Текущий адрес: {default_address}):")
}

pub fn address_empty() -> String {
    "❌ Адрес не может быть пустым".to_string()
}

pub fn confirm_summary(items: &[CartItem], payment: PaymentMethod, address: &str) -> String {
    let mut out = String::from("<b>🛒 Подтверждение заказа:</b>\n\n");
    for item in items {
        out.push_str(&format!(
            "{} x{} = {} руб.\n",
            item.name,
            item.quantity,
            money(item.subtotal())
        ));
    }
    out.push_str(&format!("\n💰 <b>Итого:</b> {} руб.\n", money(cart_total(items))));
    out.push_str(&format!("💳 <b>Оплата:</b> {}\n", payment_label(payment)));
    out.push_str(&format!("📍 <b>Адрес:</b> {address}"));
    out
}

pub fn order_created(number: &str, address: &str, total: f64, courier: Option<&str>) -> String {
    format!(
        "✅ Заказ №{number} создан!\n\
         📍 Адрес доставки: {address}\n\
         💰 Сумма: {} руб.\n\
         🚴 Курьер: {}",
        money(total),
        courier.unwrap_or("будет назначен"),
    )
}

pub fn order_cancelled() -> String {
    "❌ Заказ отменен".to_string()
}

// --- Courier allocation ---

pub fn no_free_couriers() -> String {
    "⚠️ Нет свободных курьеров, доставка будет назначена позже".to_string()
}

pub fn courier_assigned(name: &str) -> String {
    format!("🚴 Курьер {name} назначен на ваш заказ!")
}

pub fn allocation_failed() -> String {
    "⚠️ Ошибка при назначении курьера".to_string()
}

// --- Reporting ---

#[cfg(feature = "reports")]
pub fn admin_only() -> String {
    "❌ Доступ запрещен. Эта команда только для администраторов.".to_string()
}

#[cfg(feature = "reports")]
pub fn reports_title() -> String {
    "📊 Выберите отчет:".to_string()
}

#[cfg(feature = "reports")]
pub fn generating_report() -> String {
    "🔄 Генерируем отчет...".to_string()
}

#[cfg(feature = "reports")]
pub fn no_report_data() -> String {
    "❌ Нет данных для отчета".to_string()
}

#[cfg(feature = "reports")]
pub fn average_check(value: f64) -> String {
    format!("📊 Средний чек: {} руб", money(value))
}

// --- Status / history ---

pub fn no_orders_yet() -> String {
    "🛒 У вас пока нет заказов".to_string()
}

pub fn orders_title() -> String {
    "📋 Ваши заказы:".to_string()
}

pub fn order_button_label(order: &OrderRecord) -> String {
    format!(
        "№{} от {} - {}",
        or_placeholder(&order.number, "N/A"),
        short_date(&order.date),
        order.status,
    )
}

pub fn order_details(order: &OrderRecord) -> String {
    let mut products_text = String::new();
    for line in &order.items {
        let name = line
            .product
            .as_ref()
            .map(|p| p.name.as_str())
            .filter(|n| !n.is_empty())
            .unwrap_or("N/A");
        products_text.push_str(&format!(
            "- {} x{} = {} руб.\n",
            name,
            line.quantity,
            money(line.amount)
        ));
    }
    format!(
        "<b>📄 Заказ №{}</b>\n\
         📅 <i>Дата:</i> {}\n\
         💰 <i>Сумма:</i> {} руб.\n\
         🛒 <i>Статус:</i> {}\n\
         📍 <i>Адрес:</i> {}\n\
         📦 <i>Товары:</i>\n{}",
        or_placeholder(&order.number, "N/A"),
        long_date(&order.date),
        money(order.total),
        or_placeholder(&order.status, "N/A"),
        or_placeholder(&order.address, "N/A"),
        products_text,
    )
}

pub fn status_usage() -> String {
    "❌ Формат: /status [номер_заказа]".to_string()
}

pub fn order_not_found() -> String {
    "📋 Заказ не найден".to_string()
}

pub fn status_text(order: &OrderRecord, assignment: Option<&AssignmentRecord>) -> String {
    let delivery_status = assignment
        .map(|a| or_placeholder(&a.delivery_status, "Не назначен"))
        .unwrap_or_else(|| "Не назначен".to_string());
    let courier_name = assignment
        .and_then(|a| a.courier.as_ref())
        .map(|c| or_placeholder(&c.name, "Неизвестный курьер"))
        .unwrap_or_else(|| "Не назначен".to_string());
    format!(
        "<b>📄 Заказ №{}</b>\n\
         📅 Дата: {}\n\
         🛒 Статус заказа: {}\n\
         🚴 Курьер: {}\n\
         📦 Статус доставки: {}\n\
         📍 Адрес: {}\n\
         💰 Сумма: {} руб.",
        order.number,
        long_date(&order.date),
        or_placeholder(&order.status, "Неизвестно"),
        courier_name,
        delivery_status,
        or_placeholder(&order.address, "Не указан"),
        money(order.total),
    )
}
