// SPDX-FileCopyrightText: 2026 Lavka Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed views of the business-data service's catalogs and documents.
//!
//! Field names on the wire are the service's own (`НомерТелефона`,
//! `СуммаЗаказов`, ...) and are mapped with serde renames. Read records
//! default every field because `$select` projections omit the rest, and
//! numeric fields arrive as either JSON numbers or strings depending on
//! the publication settings -- hence the lenient deserializers.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use strum::{Display, EnumString};

/// Number-or-string to `f64`; anything unparsable reads as `0.0`.
fn flexible_f64<'de, D: Deserializer<'de>>(de: D) -> Result<f64, D::Error> {
    let value = Value::deserialize(de)?;
    Ok(match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    })
}

/// Number-or-string to `u32`, truncating fractional quantities.
fn flexible_u32<'de, D: Deserializer<'de>>(de: D) -> Result<u32, D::Error> {
    let value = Value::deserialize(de)?;
    let n = match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    };
    Ok(if n.is_sign_negative() { 0 } else { n as u32 })
}

/// Any scalar to display text; null and empty strings read as `None`.
fn scalar_string<'de, D: Deserializer<'de>>(de: D) -> Result<Option<String>, D::Error> {
    let value = Option::<Value>::deserialize(de)?;
    Ok(value.and_then(|v| match v {
        Value::String(s) if !s.is_empty() => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }))
}

// --- Wire-status enums ---

/// Payment method stored on an order document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
pub enum PaymentMethod {
    #[strum(serialize = "Наличные")]
    #[serde(rename = "Наличные")]
    Cash,
    #[strum(serialize = "Карта")]
    #[serde(rename = "Карта")]
    Card,
}

/// Order document status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
pub enum OrderStatus {
    #[strum(serialize = "Новый")]
    #[serde(rename = "Новый")]
    New,
    #[strum(serialize = "В обработке")]
    #[serde(rename = "В обработке")]
    Processing,
}

/// Courier availability status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
pub enum CourierStatus {
    #[strum(serialize = "Свободен")]
    #[serde(rename = "Свободен")]
    Free,
    #[strum(serialize = "Занят")]
    #[serde(rename = "Занят")]
    Busy,
}

/// Delivery status on a courier-assignment document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
pub enum DeliveryStatus {
    #[strum(serialize = "Назначен")]
    #[serde(rename = "Назначен")]
    Assigned,
}

// --- Catalog records (reads) ---

/// `Catalog_Клиенты` row.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClientRecord {
    #[serde(rename = "Ref_Key", default)]
    pub key: String,
    #[serde(rename = "Description", default)]
    pub name: String,
    #[serde(rename = "Code", default)]
    pub code: String,
    #[serde(rename = "НомерТелефона", default)]
    pub phone: String,
    // The catalog attribute is spelled with a doubled `с` on the service
    // side; the rename pins that spelling in one place.
    #[serde(rename = "АдрессДоставки", default)]
    pub address: String,
    #[serde(rename = "telegram_id", default)]
    pub telegram_id: String,
}

/// `Catalog_Товары` row.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductRecord {
    #[serde(rename = "Ref_Key", default)]
    pub key: String,
    #[serde(rename = "Description", default)]
    pub name: String,
    #[serde(rename = "Code", default)]
    pub code: String,
    #[serde(rename = "Цена", default, deserialize_with = "flexible_f64")]
    pub price: f64,
    #[serde(rename = "Описание", default, deserialize_with = "scalar_string")]
    pub description: Option<String>,
    #[serde(rename = "Масса", default, deserialize_with = "scalar_string")]
    pub weight: Option<String>,
    #[serde(rename = "Производитель", default, deserialize_with = "scalar_string")]
    pub manufacturer: Option<String>,
    #[serde(rename = "СрокГодности", default, deserialize_with = "scalar_string")]
    pub expiry: Option<String>,
    #[serde(rename = "Изображение", default, deserialize_with = "scalar_string")]
    pub image_url: Option<String>,
}

/// `Catalog_Курьеры` row.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CourierRecord {
    #[serde(rename = "Ref_Key", default)]
    pub key: String,
    #[serde(rename = "Description", default)]
    pub name: String,
    #[serde(rename = "НомерТелефона", default)]
    pub phone: String,
    /// Kept as the raw wire string so unknown statuses still render.
    #[serde(rename = "Статус", default)]
    pub status: String,
}

// --- Document records (reads) ---

/// `Document_ЗаказКлиента` row, optionally with its `Товары` tabular
/// section and an expanded `Клиенты` client.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderRecord {
    #[serde(rename = "Ref_Key", default)]
    pub key: String,
    #[serde(rename = "Number", default)]
    pub number: String,
    #[serde(rename = "Date", default)]
    pub date: String,
    #[serde(rename = "Клиенты_Key", default)]
    pub client_key: String,
    #[serde(rename = "СуммаЗаказов", default, deserialize_with = "flexible_f64")]
    pub total: f64,
    #[serde(rename = "МетодОплаты", default)]
    pub payment_method: String,
    #[serde(rename = "СтатусЗаказа", default)]
    pub status: String,
    #[serde(rename = "АдресДоставки", default)]
    pub address: String,
    #[serde(rename = "Товары", default)]
    pub items: Vec<OrderLineRecord>,
    #[serde(rename = "Клиенты", default)]
    pub client: Option<ClientRecord>,
}

/// One `Товары` row of an order, optionally with the expanded product.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderLineRecord {
    #[serde(rename = "Продукты_Key", default)]
    pub product_key: String,
    #[serde(rename = "Количество", default, deserialize_with = "flexible_u32")]
    pub quantity: u32,
    #[serde(rename = "Сумма", default, deserialize_with = "flexible_f64")]
    pub amount: f64,
    #[serde(rename = "Продукты", default)]
    pub product: Option<ProductRecord>,
}

/// `Document_НазначениеКурьера` row, optionally with the expanded courier.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssignmentRecord {
    #[serde(rename = "Ref_Key", default)]
    pub key: String,
    #[serde(rename = "Date", default)]
    pub date: String,
    #[serde(rename = "Заказ_Key", default)]
    pub order_key: String,
    #[serde(rename = "Курьер_Key", default)]
    pub courier_key: String,
    #[serde(rename = "СтатусДоставки", default)]
    pub delivery_status: String,
    #[serde(rename = "АдресДоставки", default)]
    pub address: String,
    #[serde(rename = "Курьер", default)]
    pub courier: Option<CourierRecord>,
}

// --- Write payloads ---

/// New `Catalog_Клиенты` row (registration).
#[derive(Debug, Clone, Serialize)]
pub struct NewClientRecord {
    #[serde(rename = "Description")]
    pub name: String,
    #[serde(rename = "Code")]
    pub code: String,
    #[serde(rename = "НомерТелефона")]
    pub phone: String,
    #[serde(rename = "АдрессДоставки")]
    pub address: String,
    #[serde(rename = "telegram_id")]
    pub telegram_id: String,
}

/// New `Document_ЗаказКлиента` (order confirmation).
#[derive(Debug, Clone, Serialize)]
pub struct NewOrderRecord {
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Клиенты_Key")]
    pub client_key: String,
    /// The service stores the total as a string.
    #[serde(rename = "СуммаЗаказов")]
    pub total: String,
    #[serde(rename = "МетодОплаты")]
    pub payment_method: PaymentMethod,
    #[serde(rename = "СтатусЗаказа")]
    pub status: OrderStatus,
    #[serde(rename = "АдресДоставки")]
    pub address: String,
    #[serde(rename = "Товары")]
    pub items: Vec<NewOrderLine>,
}

/// One line of a new order's `Товары` tabular section.
#[derive(Debug, Clone, Serialize)]
pub struct NewOrderLine {
    #[serde(rename = "Ref_Key")]
    pub key: String,
    #[serde(rename = "LineNumber")]
    pub line_number: u32,
    #[serde(rename = "Продукты_Key")]
    pub product_key: String,
    #[serde(rename = "Количество")]
    pub quantity: u32,
}

/// New `Document_НазначениеКурьера` (courier allocation).
#[derive(Debug, Clone, Serialize)]
pub struct NewAssignmentRecord {
    #[serde(rename = "Ref_Key")]
    pub key: String,
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "DeletionMark")]
    pub deletion_mark: bool,
    #[serde(rename = "Posted")]
    pub posted: bool,
    #[serde(rename = "Заказ_Key")]
    pub order_key: String,
    #[serde(rename = "Курьер_Key")]
    pub courier_key: String,
    #[serde(rename = "СтатусДоставки")]
    pub delivery_status: DeliveryStatus,
    #[serde(rename = "АдресДоставки")]
    pub address: String,
}

/// Patch binding an order to its courier and moving it to processing.
#[derive(Debug, Clone, Serialize)]
pub struct OrderCourierPatch {
    #[serde(rename = "Курьер_Key")]
    pub courier_key: String,
    #[serde(rename = "СтатусЗаказа")]
    pub status: OrderStatus,
}

/// Patch flipping a courier's availability.
#[derive(Debug, Clone, Serialize)]
pub struct CourierStatusPatch {
    #[serde(rename = "Статус")]
    pub status: CourierStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_price_accepts_number_and_string() {
        let from_number: ProductRecord =
            serde_json::from_value(serde_json::json!({"Ref_Key": "p1", "Цена": 100.5})).unwrap();
        assert_eq!(from_number.price, 100.5);

        let from_string: ProductRecord =
            serde_json::from_value(serde_json::json!({"Ref_Key": "p1", "Цена": "100.5"})).unwrap();
        assert_eq!(from_string.price, 100.5);

        let from_null: ProductRecord =
            serde_json::from_value(serde_json::json!({"Ref_Key": "p1", "Цена": null})).unwrap();
        assert_eq!(from_null.price, 0.0);
    }

    #[test]
    fn selected_projection_leaves_defaults() {
        // A `$select`-narrowed row carries only the requested fields.
        let order: OrderRecord =
            serde_json::from_value(serde_json::json!({"СтатусЗаказа": "Новый"})).unwrap();
        assert_eq!(order.status, "Новый");
        assert!(order.key.is_empty());
        assert!(order.items.is_empty());
    }

    #[test]
    fn order_with_expanded_lines_decodes() {
        let order: OrderRecord = serde_json::from_value(serde_json::json!({
            "Ref_Key": "o1",
            "Number": "000000123",
            "Date": "2026-08-01T12:30:00",
            "СуммаЗаказов": "250.00",
            "Товары": [
                {"Продукты_Key": "p1", "Количество": 2, "Сумма": 200.0,
                 "Продукты": {"Ref_Key": "p1", "Description": "Молоко"}},
                {"Продукты_Key": "p2", "Количество": 1, "Сумма": 50.0}
            ]
        }))
        .unwrap();
        assert_eq!(order.total, 250.0);
        assert_eq!(order.items.len(), 2);
        assert_eq!(order.items[0].product.as_ref().unwrap().name, "Молоко");
        assert_eq!(order.items[1].quantity, 1);
    }

    #[test]
    fn status_enums_round_trip_wire_strings() {
        assert_eq!(PaymentMethod::Cash.to_string(), "Наличные");
        assert_eq!(OrderStatus::Processing.to_string(), "В обработке");
        assert_eq!(CourierStatus::Free.to_string(), "Свободен");
        assert_eq!(DeliveryStatus::Assigned.to_string(), "Назначен");

        let patch = CourierStatusPatch {
            status: CourierStatus::Busy,
        };
        assert_eq!(
            serde_json::to_value(&patch).unwrap(),
            serde_json::json!({"Статус": "Занят"})
        );
    }

    #[test]
    fn new_order_serializes_service_field_names() {
        let order = NewOrderRecord {
            date: "2026-08-01T12:30:00".into(),
            client_key: "c1".into(),
            total: "250.00".into(),
            payment_method: PaymentMethod::Card,
            status: OrderStatus::New,
            address: "ул. Ленина, 1".into(),
            items: vec![NewOrderLine {
                key: "11111111-2222-3333-4444-555555555555".into(),
                line_number: 1,
                product_key: "p1".into(),
                quantity: 2,
            }],
        };
        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(json["МетодОплаты"], "Карта");
        assert_eq!(json["СтатусЗаказа"], "Новый");
        assert_eq!(json["СуммаЗаказов"], "250.00");
        assert_eq!(json["Товары"][0]["LineNumber"], 1);
        assert_eq!(json["Товары"][0]["Количество"], 2);
    }

    #[test]
    fn scalar_fields_render_numbers_as_text() {
        let product: ProductRecord =
            serde_json::from_value(serde_json::json!({"Ref_Key": "p1", "Масса": 1.5})).unwrap();
        assert_eq!(product.weight.as_deref(), Some("1.5"));
    }
}
