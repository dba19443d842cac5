use std::sync::Arc;

use bazaar_auth::{Permission, Principal, RolePolicy, ensure_vendor_scope};
use bazaar_orders::{OrderId, OrderRecord, OrderStatus, can_cancel, can_refund};

use crate::api::{MarketplaceApi, OrderStatusUpdate};
use crate::error::{ClientError, ClientResult};
use crate::services::logged;

/// Order status changes and refunds, checked against the transition table
/// before the request is sent.
///
/// The convenience actions are last-write-wins. [`Self::apply`] sends an
/// [`OrderStatusUpdate`] as built by the caller, so an update carrying the
/// version the caller loaded fails with [`ClientError::Stale`] when the order
/// has moved on since.
pub struct OrderFulfillmentService {
    api: Arc<dyn MarketplaceApi>,
    principal: Principal,
    policy: RolePolicy,
}

impl OrderFulfillmentService {
    pub fn new(api: Arc<dyn MarketplaceApi>, principal: Principal) -> Self {
        Self {
            api,
            principal,
            policy: RolePolicy::default(),
        }
    }

    /// Send a prepared status update, including its expected version.
    pub async fn apply(&self, id: OrderId, update: OrderStatusUpdate) -> ClientResult<OrderRecord> {
        logged(self.change_status(id, update).await, "update order status")
    }

    pub async fn update_status(
        &self,
        id: OrderId,
        next: OrderStatus,
        tracking_number: Option<String>,
    ) -> ClientResult<OrderRecord> {
        logged(
            self.change_status(id, OrderStatusUpdate::to(next).with_tracking(tracking_number))
                .await,
            "update order status",
        )
    }

    pub async fn cancel(&self, id: OrderId, reason: Option<String>) -> ClientResult<OrderRecord> {
        logged(
            self.change_status(
                id,
                OrderStatusUpdate::to(OrderStatus::Cancelled).with_reason(reason),
            )
            .await,
            "cancel order",
        )
    }

    /// processing → shipped.
    pub async fn mark_shipped(
        &self,
        id: OrderId,
        tracking_number: Option<String>,
    ) -> ClientResult<OrderRecord> {
        logged(
            self.change_status(
                id,
                OrderStatusUpdate::to(OrderStatus::Shipped).with_tracking(tracking_number),
            )
            .await,
            "mark order shipped",
        )
    }

    /// shipped → delivered.
    pub async fn mark_delivered(&self, id: OrderId) -> ClientResult<OrderRecord> {
        logged(
            self.change_status(id, OrderStatusUpdate::to(OrderStatus::Delivered))
                .await,
            "mark order delivered",
        )
    }

    /// Flip the payment to refunded. The order status is left alone.
    pub async fn process_refund(&self, id: OrderId) -> ClientResult<OrderRecord> {
        let result: ClientResult<OrderRecord> = async {
            self.policy
                .authorize(&self.principal, &Permission::ORDERS_REFUND)?;
            let current = self.api.get_order(id).await?;
            if !can_refund(current.status, current.payment_status) {
                return Err(ClientError::InvalidTransition(format!(
                    "refund requires a paid, open order (status: {}, payment: {})",
                    current.status, current.payment_status
                )));
            }
            let record = self.api.refund_order(id).await?;
            tracing::info!(order_id = %id, order_number = %record.order_number, "order refunded");
            Ok(record)
        }
        .await;
        logged(result, "process refund")
    }

    async fn change_status(
        &self,
        id: OrderId,
        update: OrderStatusUpdate,
    ) -> ClientResult<OrderRecord> {
        self.policy
            .authorize(&self.principal, &Permission::ORDERS_FULFIL)?;

        let current = self.api.get_order(id).await?;
        ensure_vendor_scope(&self.principal, current.vendor_id)?;
        if let Some(expected) = update.expected_version.filter(|v| *v != current.version) {
            return Err(ClientError::Stale(format!(
                "order {} is at version {}, expected {expected}",
                current.order_number, current.version
            )));
        }

        let next = update.status;
        if next == OrderStatus::Cancelled && !can_cancel(current.status) {
            return Err(ClientError::InvalidTransition(format!(
                "{} orders cannot be cancelled",
                current.status
            )));
        }
        if !current.status.can_transition_to(next) {
            return Err(ClientError::InvalidTransition(format!(
                "illegal order transition {} -> {next}",
                current.status
            )));
        }

        let record = self.api.update_order_status(id, &update).await?;
        tracing::info!(
            order_id = %id,
            from = %current.status,
            to = %record.status,
            "order status updated"
        );
        Ok(record)
    }
}
