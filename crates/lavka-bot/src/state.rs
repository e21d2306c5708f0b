// SPDX-FileCopyrightText: 2026 Lavka Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The conversation state machine's state type.
//!
//! Every multi-turn flow position is one variant; the transient data a
//! step needs (chosen product, payment method, address) rides inside the
//! variant instead of a separate data bag. Idle is the absence of an
//! entry in the state map. The transition table lives in `dispatch`.

use lavka_odata::PaymentMethod;

/// Position of one chat user inside a multi-turn flow.
///
/// Order building walks
/// `SelectingProducts -> EnteringQuantity -> SelectingProducts (loop)
/// -> SelectingPayment -> EnteringAddress -> ConfirmingOrder`,
/// authentication is the single `EnteringPhone` step.
#[derive(Debug, Clone, PartialEq)]
pub enum ConversationState {
    /// `/login` issued, waiting for a phone number.
    EnteringPhone,
    /// Product picker shown, waiting for a product or "finish" button.
    SelectingProducts,
    /// Product chosen, waiting for a quantity.
    EnteringQuantity { product_key: String },
    /// Cart closed, waiting for the payment-method button.
    SelectingPayment,
    /// Payment chosen, waiting for a delivery address.
    EnteringAddress { payment: PaymentMethod },
    /// Summary shown, waiting for confirm/cancel.
    ConfirmingOrder {
        payment: PaymentMethod,
        address: String,
    },
}

impl std::fmt::Display for ConversationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ConversationState::EnteringPhone => "entering_phone",
            ConversationState::SelectingProducts => "selecting_products",
            ConversationState::EnteringQuantity { .. } => "entering_quantity",
            ConversationState::SelectingPayment => "selecting_payment",
            ConversationState::EnteringAddress { .. } => "entering_address",
            ConversationState::ConfirmingOrder { .. } => "confirming_order",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_are_stable() {
        assert_eq!(ConversationState::EnteringPhone.to_string(), "entering_phone");
        assert_eq!(
            ConversationState::ConfirmingOrder {
                payment: PaymentMethod::Cash,
                address: "x".into(),
            }
            .to_string(),
            "confirming_order"
        );
    }
}
