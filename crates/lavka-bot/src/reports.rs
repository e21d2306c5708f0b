// SPDX-FileCopyrightText: 2026 Lavka Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Admin reporting: fetch, aggregate client-side, render.
//!
//! Seven fixed reports over orders and courier assignments. Aggregates
//! are rendered as monospace bar rows or percentage breakdowns -- chart
//! images are outside this bot's responsibilities, the text block is the
//! delivery format. Access is gated on the session's admin flag.

use std::collections::BTreeMap;

use lavka_core::{Button, Keyboard, LavkaError, MessageRef, OutboundMessage};
use lavka_odata::{AssignmentRecord, OrderRecord, Query, collections};

use crate::dispatch::{Ctx, payloads};
use crate::text;

struct ReportDef {
    name: &'static str,
    title: &'static str,
}

const REPORTS: [ReportDef; 7] = [
    ReportDef {
        name: "orders_by_customer",
        title: "Заказы по клиентам",
    },
    ReportDef {
        name: "order_statuses",
        title: "Статусы заказов",
    },
    ReportDef {
        name: "payment_methods",
        title: "Методы оплаты",
    },
    ReportDef {
        name: "average_order_value",
        title: "Средний чек",
    },
    ReportDef {
        name: "courier_load",
        title: "Нагрузка на курьеров",
    },
    ReportDef {
        name: "delivery_statuses",
        title: "Статусы доставок",
    },
    ReportDef {
        name: "active_customers",
        title: "Активные клиенты",
    },
];

/// `/reports`: the report menu. Session + admin flag required.
pub(crate) async fn menu(cx: &Ctx<'_>) -> Result<(), LavkaError> {
    let Some(session) = cx.authenticated().await? else {
        return Ok(());
    };
    if !session.is_admin {
        return cx.reply(text::admin_only()).await;
    }

    let buttons = REPORTS.iter().map(|report| {
        Button::new(
            report.title,
            format!("{}{}", payloads::REPORT_PREFIX, report.name),
        )
    });
    cx.send(
        OutboundMessage::text(cx.chat, text::reports_title()).keyboard(Keyboard::column(buttons)),
    )
    .await
}

/// A `report_<name>` button.
pub(crate) async fn run(
    cx: &Ctx<'_>,
    name: &str,
    message: Option<MessageRef>,
) -> Result<(), LavkaError> {
    if !cx.session().map(|s| s.is_admin).unwrap_or(false) {
        return cx
            .send(OutboundMessage::text(cx.chat, text::admin_only()).edit_of(message))
            .await;
    }

    cx.send(OutboundMessage::text(cx.chat, text::generating_report()).edit_of(message))
        .await?;

    let body = match name {
        "orders_by_customer" => orders_by_customer(cx).await?,
        "order_statuses" => order_statuses(cx).await?,
        "payment_methods" => payment_methods(cx).await?,
        "average_order_value" => average_order_value(cx).await?,
        "courier_load" => courier_load(cx).await?,
        "delivery_statuses" => delivery_statuses(cx).await?,
        "active_customers" => active_customers(cx).await?,
        _ => return Ok(()),
    };
    cx.reply(body).await
}

// --- Report builders ---

async fn orders_by_customer(cx: &Ctx<'_>) -> Result<String, LavkaError> {
    let orders: Vec<OrderRecord> = cx
        .odata
        .list(
            collections::ORDERS,
            &Query::new()
                .expand("Клиенты")
                .select("Клиенты/Description,Number,Date,СуммаЗаказов"),
        )
        .await?;
    if orders.is_empty() {
        return Ok(text::no_report_data());
    }
    let counts = count_by(orders.iter().map(client_name));
    Ok(render_bar(
        "Количество заказов по клиентам",
        &sorted_desc(counts),
    ))
}

async fn order_statuses(cx: &Ctx<'_>) -> Result<String, LavkaError> {
    let orders: Vec<OrderRecord> = cx
        .odata
        .list(collections::ORDERS, &Query::new().select("СтатусЗаказа"))
        .await?;
    if orders.is_empty() {
        return Ok(text::no_report_data());
    }
    let counts = count_by(orders.iter().map(|o| labeled(&o.status)));
    Ok(render_pie(
        "Распределение статусов заказов",
        &sorted_desc(counts),
    ))
}

async fn payment_methods(cx: &Ctx<'_>) -> Result<String, LavkaError> {
    let orders: Vec<OrderRecord> = cx
        .odata
        .list(collections::ORDERS, &Query::new().select("МетодОплаты"))
        .await?;
    if orders.is_empty() {
        return Ok(text::no_report_data());
    }
    let counts = count_by(orders.iter().map(|o| labeled(&o.payment_method)));
    Ok(render_bar(
        "Распределение методов оплаты",
        &sorted_desc(counts),
    ))
}

async fn average_order_value(cx: &Ctx<'_>) -> Result<String, LavkaError> {
    let orders: Vec<OrderRecord> = cx
        .odata
        .list(collections::ORDERS, &Query::new().select("СуммаЗаказов"))
        .await?;
    if orders.is_empty() {
        return Ok(text::no_report_data());
    }
    let mean = orders.iter().map(|o| o.total).sum::<f64>() / orders.len() as f64;
    Ok(text::average_check(mean))
}

async fn courier_load(cx: &Ctx<'_>) -> Result<String, LavkaError> {
    let assignments: Vec<AssignmentRecord> = cx
        .odata
        .list(
            collections::ASSIGNMENTS,
            &Query::new()
                .expand("Курьер")
                .select("Курьер/Description,Date"),
        )
        .await?;
    if assignments.is_empty() {
        return Ok(text::no_report_data());
    }
    let counts = count_by(assignments.iter().map(courier_name));
    Ok(render_bar(
        "Нагрузка на курьеров (количество назначений)",
        &sorted_desc(counts),
    ))
}

async fn delivery_statuses(cx: &Ctx<'_>) -> Result<String, LavkaError> {
    let assignments: Vec<AssignmentRecord> = cx
        .odata
        .list(
            collections::ASSIGNMENTS,
            &Query::new().select("СтатусДоставки"),
        )
        .await?;
    if assignments.is_empty() {
        return Ok(text::no_report_data());
    }
    let counts = count_by(assignments.iter().map(|a| labeled(&a.delivery_status)));
    Ok(render_pie(
        "Распределение статусов доставок",
        &sorted_desc(counts),
    ))
}

async fn active_customers(cx: &Ctx<'_>) -> Result<String, LavkaError> {
    let orders: Vec<OrderRecord> = cx
        .odata
        .list(
            collections::ORDERS,
            &Query::new()
                .expand("Клиенты")
                .select("Клиенты/Description,Number"),
        )
        .await?;
    if orders.is_empty() {
        return Ok(text::no_report_data());
    }
    let mut rows = sorted_desc(count_by(orders.iter().map(client_name)));
    rows.truncate(10);
    Ok(render_bar("Топ-10 активных клиентов", &rows))
}

// --- Aggregation helpers ---

fn client_name(order: &OrderRecord) -> String {
    order
        .client
        .as_ref()
        .map(|c| c.name.clone())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "Без имени".to_string())
}

fn courier_name(assignment: &AssignmentRecord) -> String {
    assignment
        .courier
        .as_ref()
        .map(|c| c.name.clone())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "Без имени".to_string())
}

fn labeled(value: &str) -> String {
    if value.is_empty() {
        "Не указан".to_string()
    } else {
        value.to_string()
    }
}

fn count_by(keys: impl Iterator<Item = String>) -> BTreeMap<String, u64> {
    let mut counts = BTreeMap::new();
    for key in keys {
        *counts.entry(key).or_insert(0) += 1;
    }
    counts
}

/// Highest count first; ties break on the label for stable rendering.
fn sorted_desc(counts: BTreeMap<String, u64>) -> Vec<(String, u64)> {
    let mut rows: Vec<(String, u64)> = counts.into_iter().collect();
    rows.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    rows
}

const BAR_WIDTH: usize = 20;

fn render_bar(title: &str, rows: &[(String, u64)]) -> String {
    let max = rows.iter().map(|(_, count)| *count).max().unwrap_or(1).max(1);
    let label_width = rows
        .iter()
        .map(|(label, _)| label.chars().count())
        .max()
        .unwrap_or(0);

    let mut out = format!("<b>📊 {title}</b>\n<pre>");
    for (label, count) in rows {
        let bar_len =
            (((*count as f64 / max as f64) * BAR_WIDTH as f64).round() as usize).max(1);
        out.push_str(&format!(
            "{label:<label_width$} │{} {count}\n",
            "█".repeat(bar_len)
        ));
    }
    out.push_str("</pre>");
    out
}

fn render_pie(title: &str, rows: &[(String, u64)]) -> String {
    let total: u64 = rows.iter().map(|(_, count)| *count).sum();
    let total = total.max(1);

    let mut out = format!("<b>📊 {title}</b>\n");
    for (label, count) in rows {
        let share = *count as f64 / total as f64 * 100.0;
        out.push_str(&format!("▪ {label} — {share:.1}% ({count})\n"));
    }
    out.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_by_groups_and_counts() {
        let counts = count_by(
            ["Иван", "Мария", "Иван"]
                .into_iter()
                .map(str::to_string),
        );
        assert_eq!(counts["Иван"], 2);
        assert_eq!(counts["Мария"], 1);
    }

    #[test]
    fn sorted_desc_orders_by_count_then_label() {
        let mut counts = BTreeMap::new();
        counts.insert("b".to_string(), 1u64);
        counts.insert("a".to_string(), 1u64);
        counts.insert("c".to_string(), 5u64);
        let rows = sorted_desc(counts);
        assert_eq!(rows[0].0, "c");
        assert_eq!(rows[1].0, "a");
        assert_eq!(rows[2].0, "b");
    }

    #[test]
    fn render_bar_scales_to_widest_row() {
        let rows = vec![("Иван".to_string(), 10u64), ("Мария".to_string(), 5u64)];
        let rendered = render_bar("Тест", &rows);
        assert!(rendered.contains(&"█".repeat(20)));
        assert!(rendered.contains(&"█".repeat(10)));
        assert!(rendered.contains("10"));
        assert!(rendered.starts_with("<b>📊 Тест</b>"));
    }

    #[test]
    fn render_bar_never_draws_empty_bars() {
        let rows = vec![("a".to_string(), 1000u64), ("b".to_string(), 1u64)];
        let rendered = render_bar("Тест", &rows);
        assert!(rendered.contains("b │█ 1"));
    }

    #[test]
    fn render_pie_shows_percentages() {
        let rows = vec![("Новый".to_string(), 3u64), ("В обработке".to_string(), 1u64)];
        let rendered = render_pie("Статусы", &rows);
        assert!(rendered.contains("Новый — 75.0% (3)"));
        assert!(rendered.contains("В обработке — 25.0% (1)"));
    }

    #[test]
    fn labeled_substitutes_empty_values() {
        assert_eq!(labeled(""), "Не указан");
        assert_eq!(labeled("Новый"), "Новый");
    }
}
