// SPDX-FileCopyrightText: 2026 Lavka Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Business-data client for the Lavka bot.
//!
//! All clients, products, orders, couriers, and courier assignments live in
//! an external 1C-style OData service. This crate owns everything about
//! talking to it: query construction, the typed record views with their
//! service-side field names, and the status-code contracts for reads,
//! creates, and patches.

pub mod client;
pub mod query;
pub mod records;

pub use client::{ODataClient, collections};
pub use query::{Query, guid, quote};
pub use records::{
    AssignmentRecord, ClientRecord, CourierRecord, CourierStatus, CourierStatusPatch,
    DeliveryStatus, NewAssignmentRecord, NewClientRecord, NewOrderLine, NewOrderRecord,
    OrderCourierPatch, OrderLineRecord, OrderRecord, OrderStatus, PaymentMethod, ProductRecord,
};
