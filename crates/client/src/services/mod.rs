//! Dashboard actions with client-side pre-checks.
//!
//! Each action validates form input, the acting principal's permission and
//! the record's current state before issuing a single request.

pub mod order_fulfillment;
pub mod product_approval;

pub use order_fulfillment::OrderFulfillmentService;
pub use product_approval::ProductApprovalService;

use crate::error::{ClientResult, Notice};

/// Toast for the outcome of an action.
pub fn outcome_notice<T>(result: &ClientResult<T>, success: &str, action: &str) -> Notice {
    match result {
        Ok(_) => Notice::success(success),
        Err(err) => err.notice(action),
    }
}

/// Log a failed action at the call site and pass the result through.
pub(crate) fn logged<T>(result: ClientResult<T>, action: &'static str) -> ClientResult<T> {
    if let Err(err) = &result {
        tracing::warn!(action, error = %err, client_side = err.is_client_side(), "action failed");
    }
    result
}
