//! # Order
//!
//! Orders belong to the order subsystem. Credential issuance only reads the
//! merchant and the payment status.

use std::fmt;

use serde::{Deserialize, Serialize};
use tokenmint_core::{MerchantId, OrderId, Timestamp};

/// Payment status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Created, awaiting payment.
    Pending,
    /// Payment settled.
    Paid,
    /// Paid and the goods delivered.
    Fulfilled,
    /// Abandoned or refunded.
    Canceled,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Fulfilled => "fulfilled",
            Self::Canceled => "canceled",
        };
        f.write_str(s)
    }
}

/// An order as seen by credential issuance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub merchant_id: MerchantId,
    pub status: OrderStatus,
    pub created_at: Timestamp,
}

impl Order {
    /// A new order in the given status, stamped now.
    pub fn new(merchant_id: MerchantId, status: OrderStatus) -> Self {
        Self {
            id: OrderId::new(),
            merchant_id,
            status,
            created_at: Timestamp::now(),
        }
    }

    /// Whether payment for this order has settled.
    pub fn is_paid(&self) -> bool {
        matches!(self.status, OrderStatus::Paid | OrderStatus::Fulfilled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(status: OrderStatus) -> Order {
        Order::new(MerchantId::new("M1").unwrap(), status)
    }

    #[test]
    fn paid_and_fulfilled_count_as_paid() {
        assert!(order(OrderStatus::Paid).is_paid());
        assert!(order(OrderStatus::Fulfilled).is_paid());
    }

    #[test]
    fn pending_and_canceled_are_unpaid() {
        assert!(!order(OrderStatus::Pending).is_paid());
        assert!(!order(OrderStatus::Canceled).is_paid());
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::Fulfilled).unwrap(),
            "\"fulfilled\""
        );
    }
}
