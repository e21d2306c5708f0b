// SPDX-FileCopyrightText: 2026 Lavka Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Courier allocation: pick one free courier and bind it to an order.
//!
//! The binding is a two-step write (create the assignment document, patch
//! the courier to busy) with no transaction and no compensating rollback;
//! a partial failure is logged and reported, and the order simply stays
//! unassigned from the caller's point of view.

use lavka_core::LavkaError;
use lavka_odata::{CourierStatus, DeliveryStatus, NewAssignmentRecord};
use tracing::{error, info};
use uuid::Uuid;

use crate::dispatch::Ctx;
use crate::flows::now_wire;
use crate::text;

/// Outcome of an allocation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Allocation {
    Assigned {
        courier_key: String,
        courier_name: String,
    },
    /// No free courier, or the allocation writes failed. The order stays
    /// in its initial status -- explicitly not an error.
    Unassigned,
}

/// Allocates a courier for a freshly created order and tells the user
/// what happened. Never fails the surrounding order flow.
pub(crate) async fn assign_courier(cx: &Ctx<'_>, order_key: &str, address: &str) -> Allocation {
    match try_assign(cx, order_key, address).await {
        Ok(allocation) => allocation,
        Err(err) => {
            error!(order = order_key, error = %err, "courier allocation failed");
            if let Err(send_err) = cx.reply(text::allocation_failed()).await {
                error!(error = %send_err, "failed to report allocation error");
            }
            Allocation::Unassigned
        }
    }
}

async fn try_assign(
    cx: &Ctx<'_>,
    order_key: &str,
    address: &str,
) -> Result<Allocation, LavkaError> {
    let Some(courier) = cx.odata.next_free_courier().await? else {
        cx.reply(text::no_free_couriers()).await?;
        return Ok(Allocation::Unassigned);
    };

    let courier_name = if courier.name.is_empty() {
        "Неизвестный курьер".to_string()
    } else {
        courier.name.clone()
    };

    let assignment = NewAssignmentRecord {
        key: Uuid::new_v4().to_string(),
        date: now_wire(),
        deletion_mark: false,
        posted: true,
        order_key: order_key.to_string(),
        courier_key: courier.key.clone(),
        delivery_status: DeliveryStatus::Assigned,
        address: address.to_string(),
    };
    cx.odata.create_assignment(&assignment).await?;
    cx.odata
        .set_courier_status(&courier.key, CourierStatus::Busy)
        .await?;

    info!(
        order = order_key,
        courier = %courier.key,
        "courier assigned"
    );
    cx.reply(text::courier_assigned(&courier_name)).await?;
    Ok(Allocation::Assigned {
        courier_key: courier.key,
        courier_name,
    })
}
