//! Orders domain module: fulfilment lifecycle, payment side-flags, commission
//! and dashboard reporting.
//!
//! Pure, deterministic domain logic (no IO, no HTTP, no storage).

pub mod commission;
pub mod filter;
pub mod order;
pub mod reporting;
pub mod transitions;

pub use commission::CommissionSchedule;
pub use filter::OrderFilter;
pub use order::{
    CancelOrder, MarkDelivered, MarkShipped, Order, OrderCommand, OrderEvent, OrderId, OrderLine,
    OrderRecord, PlaceOrder, ProcessRefund, RecordPayment, ShippingAddress, UpdateOrderStatus,
};
pub use reporting::{AnalyticsSummary, FinancialSummary};
pub use transitions::{
    OrderAction, OrderStatus, PaymentStatus, available_actions, can_cancel, can_refund,
};
