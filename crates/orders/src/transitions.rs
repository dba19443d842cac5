//! The canonical order transition table.
//!
//! Every status change, whether issued from a dashboard button or a direct API
//! call, is checked against [`OrderStatus::can_transition_to`]. The action
//! buttons a dashboard renders are derived from the same table.

use serde::{Deserialize, Serialize};

/// Order fulfilment status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// The single forward step on the happy path, if any.
    pub fn next_forward(&self) -> Option<OrderStatus> {
        match self {
            OrderStatus::Pending => Some(OrderStatus::Processing),
            OrderStatus::Processing => Some(OrderStatus::Shipped),
            OrderStatus::Shipped => Some(OrderStatus::Delivered),
            OrderStatus::Delivered | OrderStatus::Cancelled => None,
        }
    }

    /// Forward-only single steps, plus cancellation from any non-terminal state.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        if next == OrderStatus::Cancelled {
            return !self.is_terminal();
        }
        self.next_forward() == Some(next)
    }

    pub fn allowed_next(&self) -> Vec<OrderStatus> {
        OrderStatus::ALL
            .into_iter()
            .filter(|next| self.can_transition_to(*next))
            .collect()
    }
}

impl core::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payment side-flag. Refunds live here, never in [`OrderStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Refunded => "refunded",
        }
    }
}

impl core::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An action button on the order detail / order table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderAction {
    /// pending → processing
    Process,
    /// processing → shipped
    Ship,
    /// shipped → delivered
    Deliver,
    Cancel,
    Refund,
}

/// Cancellation is offered while the order is neither cancelled nor delivered.
pub fn can_cancel(status: OrderStatus) -> bool {
    status.can_transition_to(OrderStatus::Cancelled)
}

/// Refunds need a captured payment on an order that is still open.
pub fn can_refund(status: OrderStatus, payment: PaymentStatus) -> bool {
    payment == PaymentStatus::Paid && !status.is_terminal()
}

/// Actions to render for an order in the given state.
pub fn available_actions(status: OrderStatus, payment: PaymentStatus) -> Vec<OrderAction> {
    let mut actions = Vec::new();
    match status.next_forward() {
        Some(OrderStatus::Processing) => actions.push(OrderAction::Process),
        Some(OrderStatus::Shipped) => actions.push(OrderAction::Ship),
        Some(OrderStatus::Delivered) => actions.push(OrderAction::Deliver),
        _ => {}
    }
    if can_cancel(status) {
        actions.push(OrderAction::Cancel);
    }
    if can_refund(status, payment) {
        actions.push(OrderAction::Refund);
    }
    actions
}
