// SPDX-FileCopyrightText: 2026 Lavka Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the business-data service.
//!
//! Speaks the service's OData dialect: collection GETs with `$`-parameters,
//! document POSTs signalled by HTTP 201, attribute PATCHes signalled by
//! HTTP 200, and JSON bodies prefixed with a UTF-8 byte-order mark that
//! must be stripped before parsing. Nothing is retried; every failure maps
//! into the closed [`LavkaError`] taxonomy.

use std::time::Duration;

use lavka_config::OdataConfig;
use lavka_core::LavkaError;
use reqwest::StatusCode;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::query::{Query, guid, quote};
use crate::records::{
    AssignmentRecord, ClientRecord, CourierRecord, CourierStatus, CourierStatusPatch,
    NewAssignmentRecord, NewClientRecord, NewOrderRecord, OrderCourierPatch, OrderRecord,
    OrderStatus, ProductRecord,
};

/// Collection names on the service side.
pub mod collections {
    pub const CLIENTS: &str = "Catalog_Клиенты";
    pub const PRODUCTS: &str = "Catalog_Товары";
    pub const COURIERS: &str = "Catalog_Курьеры";
    pub const ORDERS: &str = "Document_ЗаказКлиента";
    pub const ASSIGNMENTS: &str = "Document_НазначениеКурьера";
}

/// The collection envelope every OData list response is wrapped in.
#[derive(serde::Deserialize)]
struct ValueEnvelope<T> {
    #[serde(default = "Vec::new")]
    value: Vec<T>,
}

/// Client for the OData business-data endpoint.
///
/// Cheap to clone is not needed; the bot shares one instance behind an
/// `Arc`. Read calls use the configured read deadline, document creation
/// uses the longer write deadline.
#[derive(Debug)]
pub struct ODataClient {
    http: reqwest::Client,
    base_url: String,
    write_timeout: Duration,
}

impl ODataClient {
    pub fn new(config: &OdataConfig) -> Result<Self, LavkaError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LavkaError::Internal(format!("failed to build HTTP client: {e}")))?;

        let mut base_url = config.base_url.trim().to_string();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }

        Ok(Self {
            http,
            base_url,
            write_timeout: Duration::from_secs(config.write_timeout_secs),
        })
    }

    fn collection_url(&self, collection: &str) -> String {
        format!("{}{}", self.base_url, collection)
    }

    fn entity_url(&self, collection: &str, key: &str) -> String {
        format!("{}{}(guid'{}')", self.base_url, collection, key)
    }

    /// GET a collection and decode its `value` array.
    pub async fn list<T: DeserializeOwned>(
        &self,
        collection: &str,
        query: &Query,
    ) -> Result<Vec<T>, LavkaError> {
        let response = self
            .http
            .get(self.collection_url(collection))
            .query(&query.params())
            .send()
            .await
            .map_err(|e| request_error(collection, e))?;

        let status = response.status();
        debug!(collection, status = %status, "collection fetched");
        if !status.is_success() {
            return Err(status_error(collection, status, response).await);
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| request_error(collection, e))?;
        let envelope: ValueEnvelope<T> = decode(collection, &bytes)?;
        Ok(envelope.value)
    }

    /// GET a single entity by its `Ref_Key`. A 404 maps to `NotFound`.
    pub async fn fetch<T: DeserializeOwned>(
        &self,
        collection: &str,
        key: &str,
        query: &Query,
    ) -> Result<T, LavkaError> {
        let response = self
            .http
            .get(self.entity_url(collection, key))
            .query(&query.params())
            .send()
            .await
            .map_err(|e| request_error(collection, e))?;

        let status = response.status();
        debug!(collection, key, status = %status, "entity fetched");
        if status == StatusCode::NOT_FOUND {
            return Err(LavkaError::NotFound(format!("{collection} {key}")));
        }
        if !status.is_success() {
            return Err(status_error(collection, status, response).await);
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| request_error(collection, e))?;
        decode(collection, &bytes)
    }

    /// POST a new document or catalog row. The service signals success with
    /// HTTP 201 and, thanks to `Prefer: return=representation`, echoes the
    /// created record back.
    pub async fn create<B: Serialize, T: DeserializeOwned>(
        &self,
        collection: &str,
        body: &B,
    ) -> Result<T, LavkaError> {
        let response = self
            .http
            .post(self.collection_url(collection))
            .timeout(self.write_timeout)
            .json(body)
            .header(CONTENT_TYPE, "application/json; charset=utf-8")
            .header(ACCEPT, "application/json")
            .header("Prefer", "return=representation")
            .send()
            .await
            .map_err(|e| request_error(collection, e))?;

        let status = response.status();
        debug!(collection, status = %status, "document created");
        if status != StatusCode::CREATED {
            return Err(status_error(collection, status, response).await);
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| request_error(collection, e))?;
        decode(collection, &bytes)
    }

    /// PATCH attributes of an existing entity. Success is HTTP 200.
    pub async fn patch<B: Serialize>(
        &self,
        collection: &str,
        key: &str,
        body: &B,
    ) -> Result<(), LavkaError> {
        let response = self
            .http
            .patch(self.entity_url(collection, key))
            .json(body)
            .header(CONTENT_TYPE, "application/json; charset=utf-8")
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| request_error(collection, e))?;

        let status = response.status();
        debug!(collection, key, status = %status, "entity patched");
        if status != StatusCode::OK {
            return Err(status_error(collection, status, response).await);
        }
        Ok(())
    }
}

// --- Domain operations ---

impl ODataClient {
    /// Looks up the client registered with this phone for this chat user.
    pub async fn find_client(
        &self,
        phone: &str,
        telegram_id: &str,
    ) -> Result<Option<ClientRecord>, LavkaError> {
        let query = Query::new().filter(format!(
            "НомерТелефона eq {} and telegram_id eq {}",
            quote(phone),
            quote(telegram_id)
        ));
        let mut clients = self.list::<ClientRecord>(collections::CLIENTS, &query).await?;
        Ok(if clients.is_empty() {
            None
        } else {
            Some(clients.remove(0))
        })
    }

    /// Creates a client catalog row (registration).
    pub async fn register_client(
        &self,
        client: &NewClientRecord,
    ) -> Result<ClientRecord, LavkaError> {
        self.create(collections::CLIENTS, client).await
    }

    /// Non-deleted products, optionally capped.
    pub async fn list_products(&self, top: Option<u32>) -> Result<Vec<ProductRecord>, LavkaError> {
        let mut query = Query::new().filter("DeletionMark eq false");
        if let Some(top) = top {
            query = query.top(top);
        }
        self.list(collections::PRODUCTS, &query).await
    }

    /// One product by key, for the current price/name/image.
    pub async fn product(&self, key: &str) -> Result<ProductRecord, LavkaError> {
        self.fetch(collections::PRODUCTS, key, &Query::new()).await
    }

    /// Non-deleted couriers.
    pub async fn list_couriers(&self) -> Result<Vec<CourierRecord>, LavkaError> {
        let query = Query::new().filter("DeletionMark eq false");
        self.list(collections::COURIERS, &query).await
    }

    /// One free courier, service-default ordering (the tie-break is
    /// deliberately arbitrary).
    pub async fn next_free_courier(&self) -> Result<Option<CourierRecord>, LavkaError> {
        let query = Query::new()
            .filter(format!(
                "DeletionMark eq false and Статус eq {}",
                quote(&CourierStatus::Free.to_string())
            ))
            .top(1);
        let mut couriers = self.list::<CourierRecord>(collections::COURIERS, &query).await?;
        Ok(if couriers.is_empty() {
            None
        } else {
            Some(couriers.remove(0))
        })
    }

    /// Creates the order document; the echoed record carries the
    /// service-assigned `Ref_Key` and human-readable `Number`.
    pub async fn create_order(&self, order: &NewOrderRecord) -> Result<OrderRecord, LavkaError> {
        self.create(collections::ORDERS, order).await
    }

    /// Binds a courier to an order and moves it to processing.
    pub async fn assign_order_courier(
        &self,
        order_key: &str,
        courier_key: &str,
    ) -> Result<(), LavkaError> {
        let patch = OrderCourierPatch {
            courier_key: courier_key.to_string(),
            status: OrderStatus::Processing,
        };
        self.patch(collections::ORDERS, order_key, &patch).await
    }

    /// Creates the courier-assignment document.
    pub async fn create_assignment(
        &self,
        assignment: &NewAssignmentRecord,
    ) -> Result<AssignmentRecord, LavkaError> {
        self.create(collections::ASSIGNMENTS, assignment).await
    }

    /// Flips a courier's availability status.
    pub async fn set_courier_status(
        &self,
        courier_key: &str,
        status: CourierStatus,
    ) -> Result<(), LavkaError> {
        self.patch(
            collections::COURIERS,
            courier_key,
            &CourierStatusPatch { status },
        )
        .await
    }

    /// The client's most recent orders, newest first, capped at 10.
    pub async fn orders_for_client(&self, client_key: &str) -> Result<Vec<OrderRecord>, LavkaError> {
        let query = Query::new()
            .filter(format!("Клиенты_Key eq {}", guid(client_key)))
            .orderby("Date desc")
            .top(10);
        self.list(collections::ORDERS, &query).await
    }

    /// Order lookup by its human-readable number.
    pub async fn order_by_number(&self, number: &str) -> Result<Option<OrderRecord>, LavkaError> {
        let query = Query::new().filter(format!("Number eq {}", quote(number)));
        let mut orders = self.list::<OrderRecord>(collections::ORDERS, &query).await?;
        Ok(if orders.is_empty() {
            None
        } else {
            Some(orders.remove(0))
        })
    }

    /// One order with its line items and their products expanded.
    pub async fn order_details(&self, key: &str) -> Result<OrderRecord, LavkaError> {
        let query = Query::new().expand("Товары($expand=Продукты)");
        self.fetch(collections::ORDERS, key, &query).await
    }

    /// The courier assignment for an order, courier expanded.
    pub async fn assignment_for_order(
        &self,
        order_key: &str,
    ) -> Result<Option<AssignmentRecord>, LavkaError> {
        let query = Query::new()
            .filter(format!("Заказ_Key eq {}", guid(order_key)))
            .expand("Курьер");
        let mut assignments = self
            .list::<AssignmentRecord>(collections::ASSIGNMENTS, &query)
            .await?;
        Ok(if assignments.is_empty() {
            None
        } else {
            Some(assignments.remove(0))
        })
    }
}

/// Strip the service's UTF-8 byte-order mark, then parse.
fn decode<T: DeserializeOwned>(collection: &str, bytes: &[u8]) -> Result<T, LavkaError> {
    let bytes = bytes.strip_prefix(b"\xef\xbb\xbf").unwrap_or(bytes);
    serde_json::from_slice(bytes).map_err(|e| LavkaError::Upstream {
        message: format!("{collection}: malformed JSON: {e}"),
        source: Some(Box::new(e)),
    })
}

fn request_error(collection: &str, err: reqwest::Error) -> LavkaError {
    let message = format!("{collection}: request failed: {err}");
    LavkaError::Upstream {
        message,
        source: Some(Box::new(err)),
    }
}

async fn status_error(
    collection: &str,
    status: StatusCode,
    response: reqwest::Response,
) -> LavkaError {
    let body = response.text().await.unwrap_or_default();
    LavkaError::upstream(format!("{collection}: HTTP {status}: {body}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{DeliveryStatus, NewOrderLine, PaymentMethod};
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(server: &MockServer) -> ODataClient {
        let config = OdataConfig {
            base_url: format!("{}/", server.uri()),
            timeout_secs: 2,
            write_timeout_secs: 2,
        };
        ODataClient::new(&config).unwrap()
    }

    /// Percent-encoded request path for a collection, matching what
    /// reqwest puts on the wire for the Cyrillic collection names.
    fn enc_path(tail: &str) -> String {
        reqwest::Url::parse(&format!("http://host/{tail}"))
            .unwrap()
            .path()
            .to_string()
    }

    #[tokio::test]
    async fn list_strips_byte_order_mark() {
        let server = MockServer::start().await;
        let mut body = b"\xef\xbb\xbf".to_vec();
        body.extend_from_slice(
            br#"{"value": [{"Ref_Key": "p1", "Description": "Milk", "Price": 1}]}"#,
        );

        Mock::given(method("GET"))
            .and(path(enc_path(collections::PRODUCTS)))
            .and(query_param("$filter", "DeletionMark eq false"))
            .and(query_param("$format", "json"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(body, "application/json"))
            .mount(&server)
            .await;

        let products = test_client(&server).list_products(None).await.unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].key, "p1");
    }

    #[tokio::test]
    async fn list_maps_http_error_to_upstream() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let err = test_client(&server).list_products(None).await.unwrap_err();
        assert!(matches!(err, LavkaError::Upstream { .. }), "got: {err}");
        assert!(err.to_string().contains("500"));
    }

    #[tokio::test]
    async fn fetch_missing_entity_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = test_client(&server).product("nope").await.unwrap_err();
        assert!(err.is_not_found(), "got: {err}");
    }

    #[tokio::test]
    async fn find_client_filters_by_phone_and_chat_identity() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(enc_path(collections::CLIENTS)))
            .and(query_param(
                "$filter",
                "НомерТелефона eq '+79991234567' and telegram_id eq '42'",
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "value": [{"Ref_Key": "c1", "Description": "Иван", "АдрессДоставки": "ул. Мира, 5"}]
            })))
            .mount(&server)
            .await;

        let client = test_client(&server)
            .find_client("+79991234567", "42")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(client.key, "c1");
        assert_eq!(client.address, "ул. Мира, 5");
    }

    #[tokio::test]
    async fn find_client_zero_matches_is_none_not_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"value": []})),
            )
            .mount(&server)
            .await;

        let client = test_client(&server)
            .find_client("+79991234567", "42")
            .await
            .unwrap();
        assert!(client.is_none());
    }

    #[tokio::test]
    async fn next_free_courier_asks_for_one_free() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(enc_path(collections::COURIERS)))
            .and(query_param(
                "$filter",
                "DeletionMark eq false and Статус eq 'Свободен'",
            ))
            .and(query_param("$top", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "value": [{"Ref_Key": "k1", "Description": "Пётр", "Статус": "Свободен"}]
            })))
            .mount(&server)
            .await;

        let courier = test_client(&server).next_free_courier().await.unwrap().unwrap();
        assert_eq!(courier.key, "k1");
    }

    #[tokio::test]
    async fn create_order_requires_201() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(enc_path(collections::ORDERS)))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let order = NewOrderRecord {
            date: "2026-08-01T10:00:00".into(),
            client_key: "c1".into(),
            total: "100.00".into(),
            payment_method: PaymentMethod::Cash,
            status: OrderStatus::New,
            address: "ул. Мира, 5".into(),
            items: vec![NewOrderLine {
                key: "k".into(),
                line_number: 1,
                product_key: "p1".into(),
                quantity: 1,
            }],
        };
        let err = test_client(&server).create_order(&order).await.unwrap_err();
        assert!(matches!(err, LavkaError::Upstream { .. }), "got: {err}");
    }

    #[tokio::test]
    async fn create_order_parses_echoed_representation() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(enc_path(collections::ORDERS)))
            .and(wiremock::matchers::header("Prefer", "return=representation"))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "Ref_Key": "o1", "Number": "000000123", "СтатусЗаказа": "Новый"
            })))
            .mount(&server)
            .await;

        let order = NewOrderRecord {
            date: "2026-08-01T10:00:00".into(),
            client_key: "c1".into(),
            total: "100.00".into(),
            payment_method: PaymentMethod::Cash,
            status: OrderStatus::New,
            address: "ул. Мира, 5".into(),
            items: vec![],
        };
        let created = test_client(&server).create_order(&order).await.unwrap();
        assert_eq!(created.key, "o1");
        assert_eq!(created.number, "000000123");
    }

    #[tokio::test]
    async fn patch_requires_200() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .respond_with(ResponseTemplate::new(409).set_body_string("conflict"))
            .mount(&server)
            .await;

        let err = test_client(&server)
            .set_courier_status("k1", CourierStatus::Busy)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("409"));
    }

    #[tokio::test]
    async fn patch_200_is_ok() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path(enc_path(&format!("{}(guid'k1')", collections::COURIERS))))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        test_client(&server)
            .set_courier_status("k1", CourierStatus::Busy)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn assignment_create_sends_wire_fields() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(enc_path(collections::ASSIGNMENTS)))
            .and(wiremock::matchers::body_partial_json(serde_json::json!({
                "Заказ_Key": "o1",
                "Курьер_Key": "k1",
                "СтатусДоставки": "Назначен",
                "Posted": true
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "Ref_Key": "a1"
            })))
            .mount(&server)
            .await;

        let assignment = NewAssignmentRecord {
            key: "a1".into(),
            date: "2026-08-01T10:00:00".into(),
            deletion_mark: false,
            posted: true,
            order_key: "o1".into(),
            courier_key: "k1".into(),
            delivery_status: DeliveryStatus::Assigned,
            address: "ул. Мира, 5".into(),
        };
        let created = test_client(&server)
            .create_assignment(&assignment)
            .await
            .unwrap();
        assert_eq!(created.key, "a1");
    }

    #[tokio::test]
    async fn orders_for_client_orders_and_caps() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(enc_path(collections::ORDERS)))
            .and(query_param("$filter", "Клиенты_Key eq guid'c1'"))
            .and(query_param("$orderby", "Date desc"))
            .and(query_param("$top", "10"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "value": [{"Ref_Key": "o2", "Number": "000000124"},
                          {"Ref_Key": "o1", "Number": "000000123"}]
            })))
            .mount(&server)
            .await;

        let orders = test_client(&server).orders_for_client("c1").await.unwrap();
        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0].key, "o2");
    }

    #[tokio::test]
    async fn assignment_for_order_expands_courier() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(enc_path(collections::ASSIGNMENTS)))
            .and(query_param("$filter", "Заказ_Key eq guid'o1'"))
            .and(query_param("$expand", "Курьер"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "value": [{
                    "Ref_Key": "a1",
                    "СтатусДоставки": "Назначен",
                    "Курьер": {"Ref_Key": "k1", "Description": "Пётр"}
                }]
            })))
            .mount(&server)
            .await;

        let assignment = test_client(&server)
            .assignment_for_order("o1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(assignment.delivery_status, "Назначен");
        assert_eq!(assignment.courier.unwrap().name, "Пётр");
    }

    #[tokio::test]
    async fn malformed_json_is_upstream_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
            .mount(&server)
            .await;

        let err = test_client(&server).list_products(None).await.unwrap_err();
        assert!(err.to_string().contains("malformed JSON"), "got: {err}");
    }
}
