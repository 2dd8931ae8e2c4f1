//! Order model and status state machine
//!
//! `OrderStatus` is a closed enum; every transition goes through the
//! transition table below, so an unrepresentable status or an unchecked
//! transition cannot exist. Unit prices on items are snapshots taken at
//! order creation and never change afterwards; totals are always derived
//! from the stored snapshots, never from live product prices.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// =============================================================================
// Order Status
// =============================================================================

/// Order status enum
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Paid,
    Cancelled,
}

/// Outcome of applying a lifecycle action to an order status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Move to the new status
    Apply(OrderStatus),
    /// Already in the requested terminal state; return current state unchanged
    NoOp,
    /// The transition is not allowed from the current state
    Rejected,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Paid => "PAID",
            Self::Cancelled => "CANCELLED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(Self::Pending),
            "PAID" => Some(Self::Paid),
            "CANCELLED" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Transition table for the `pay` action.
    ///
    /// Paying an already-paid order is idempotent; a cancelled order can
    /// never be paid.
    pub fn next_on_pay(self) -> Transition {
        match self {
            Self::Pending => Transition::Apply(Self::Paid),
            Self::Paid => Transition::NoOp,
            Self::Cancelled => Transition::Rejected,
        }
    }

    /// Transition table for the `cancel` action.
    ///
    /// Both PENDING and PAID orders may be cancelled (the caller restocks
    /// reserved inventory in the same transaction). Re-cancelling is
    /// idempotent.
    pub fn next_on_cancel(self) -> Transition {
        match self {
            Self::Pending | Self::Paid => Transition::Apply(Self::Cancelled),
            Self::Cancelled => Transition::NoOp,
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// API Request Types
// =============================================================================

/// Create order payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCreate {
    pub customer_id: i64,
    pub items: Vec<OrderItemInput>,
}

/// One requested line of an order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItemInput {
    pub product_id: i64,
    pub quantity: i64,
}

// =============================================================================
// API Response Types
// =============================================================================

/// Order item with its frozen unit price
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItemDetail {
    pub id: i64,
    pub product_id: i64,
    pub product_name: String,
    pub quantity: i64,
    /// Price snapshot taken when the order was created
    pub unit_price: Decimal,
    pub subtotal: Decimal,
}

/// Full order with items and derived total
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDetail {
    pub id: i64,
    pub customer_id: i64,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub items: Vec<OrderItemDetail>,
    pub total_amount: Decimal,
}

/// Order summary for list views
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderSummary {
    pub id: i64,
    pub customer_id: i64,
    pub customer_email: String,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub items_count: i64,
    pub total_amount: Decimal,
}

/// Subtotal of one line: frozen unit price times quantity
pub fn subtotal(unit_price: Decimal, quantity: i64) -> Decimal {
    unit_price * Decimal::from(quantity)
}

/// Derived order total: the sum of item subtotals
pub fn order_total(items: &[OrderItemDetail]) -> Decimal {
    items.iter().map(|i| i.subtotal).sum()
}
