use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bazaar_core::{
    Aggregate, AggregateId, AggregateRoot, CustomerId, DomainError, Money, VendorId,
};
use bazaar_events::Event;
use bazaar_products::ProductId;

use crate::transitions::{OrderAction, OrderStatus, PaymentStatus, available_actions, can_refund};

/// Order identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub AggregateId);

impl OrderId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }

    pub fn generate() -> Self {
        Self(AggregateId::new())
    }
}

impl core::fmt::Display for OrderId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl core::str::FromStr for OrderId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

/// Order line: product, quantity, unit price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub product_id: ProductId,
    pub product_name: String,
    /// Category drives the platform commission rate.
    pub category: String,
    pub quantity: u32,
    pub unit_price: Money,
}

impl OrderLine {
    pub fn subtotal(&self) -> Result<Money, DomainError> {
        self.unit_price.checked_mul(u64::from(self.quantity))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub recipient: String,
    pub line1: String,
    #[serde(default)]
    pub line2: Option<String>,
    pub city: String,
    pub postal_code: String,
    pub country: String,
}

/// Aggregate root: Order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    id: OrderId,
    order_number: String,
    customer_id: Option<CustomerId>,
    customer_name: String,
    vendor_id: Option<VendorId>,
    lines: Vec<OrderLine>,
    total: Option<Money>,
    status: OrderStatus,
    payment_status: PaymentStatus,
    shipping_address: Option<ShippingAddress>,
    tracking_number: Option<String>,
    cancellation_reason: Option<String>,
    placed_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
    version: u64,
    created: bool,
}

impl Order {
    /// Create an empty, not-yet-created aggregate instance for rehydration.
    pub fn empty(id: OrderId) -> Self {
        Self {
            id,
            order_number: String::new(),
            customer_id: None,
            customer_name: String::new(),
            vendor_id: None,
            lines: Vec::new(),
            total: None,
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Pending,
            shipping_address: None,
            tracking_number: None,
            cancellation_reason: None,
            placed_at: None,
            updated_at: None,
            version: 0,
            created: false,
        }
    }

    pub fn id_typed(&self) -> OrderId {
        self.id
    }

    pub fn order_number(&self) -> &str {
        &self.order_number
    }

    pub fn vendor_id(&self) -> Option<VendorId> {
        self.vendor_id
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn payment_status(&self) -> PaymentStatus {
        self.payment_status
    }

    pub fn lines(&self) -> &[OrderLine] {
        &self.lines
    }

    pub fn total(&self) -> Option<&Money> {
        self.total.as_ref()
    }

    pub fn tracking_number(&self) -> Option<&str> {
        self.tracking_number.as_deref()
    }

    pub fn exists(&self) -> bool {
        self.created
    }

    pub fn available_actions(&self) -> Vec<OrderAction> {
        available_actions(self.status, self.payment_status)
    }

    /// Read-side snapshot for listings and the wire.
    pub fn record(&self) -> Option<OrderRecord> {
        if !self.created {
            return None;
        }
        Some(OrderRecord {
            id: self.id,
            order_number: self.order_number.clone(),
            customer_id: self.customer_id?,
            customer_name: self.customer_name.clone(),
            vendor_id: self.vendor_id?,
            lines: self.lines.clone(),
            total: self.total.clone()?,
            status: self.status,
            payment_status: self.payment_status,
            shipping_address: self.shipping_address.clone()?,
            tracking_number: self.tracking_number.clone(),
            cancellation_reason: self.cancellation_reason.clone(),
            placed_at: self.placed_at?,
            updated_at: self.updated_at,
            version: self.version,
        })
    }
}

impl AggregateRoot for Order {
    type Id = OrderId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Flat order row as listed by the dashboards and exchanged over the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRecord {
    pub id: OrderId,
    pub order_number: String,
    pub customer_id: CustomerId,
    pub customer_name: String,
    pub vendor_id: VendorId,
    pub lines: Vec<OrderLine>,
    pub total: Money,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub shipping_address: ShippingAddress,
    #[serde(default)]
    pub tracking_number: Option<String>,
    #[serde(default)]
    pub cancellation_reason: Option<String>,
    pub placed_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub version: u64,
}

impl OrderRecord {
    pub fn available_actions(&self) -> Vec<OrderAction> {
        available_actions(self.status, self.payment_status)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Commands
// ─────────────────────────────────────────────────────────────────────────────

/// Command: PlaceOrder (checkout).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceOrder {
    pub order_id: OrderId,
    pub order_number: String,
    pub customer_id: CustomerId,
    pub customer_name: String,
    pub vendor_id: VendorId,
    pub lines: Vec<OrderLine>,
    pub shipping_address: ShippingAddress,
    pub payment_status: PaymentStatus,
    pub occurred_at: DateTime<Utc>,
}

/// Command: UpdateOrderStatus (generic status change, checked against the transition table).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateOrderStatus {
    pub order_id: OrderId,
    pub status: OrderStatus,
    pub tracking_number: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: MarkShipped (processing → shipped).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkShipped {
    pub order_id: OrderId,
    pub tracking_number: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: MarkDelivered (shipped → delivered).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkDelivered {
    pub order_id: OrderId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: CancelOrder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelOrder {
    pub order_id: OrderId,
    pub reason: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ProcessRefund (payment paid → refunded; order status unchanged).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessRefund {
    pub order_id: OrderId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RecordPayment (payment pending/failed → paid).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordPayment {
    pub order_id: OrderId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderCommand {
    PlaceOrder(PlaceOrder),
    UpdateOrderStatus(UpdateOrderStatus),
    MarkShipped(MarkShipped),
    MarkDelivered(MarkDelivered),
    CancelOrder(CancelOrder),
    ProcessRefund(ProcessRefund),
    RecordPayment(RecordPayment),
}

impl OrderCommand {
    pub fn order_id(&self) -> OrderId {
        match self {
            OrderCommand::PlaceOrder(c) => c.order_id,
            OrderCommand::UpdateOrderStatus(c) => c.order_id,
            OrderCommand::MarkShipped(c) => c.order_id,
            OrderCommand::MarkDelivered(c) => c.order_id,
            OrderCommand::CancelOrder(c) => c.order_id,
            OrderCommand::ProcessRefund(c) => c.order_id,
            OrderCommand::RecordPayment(c) => c.order_id,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Events
// ─────────────────────────────────────────────────────────────────────────────

/// Event: OrderPlaced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPlaced {
    pub order_id: OrderId,
    pub order_number: String,
    pub customer_id: CustomerId,
    pub customer_name: String,
    pub vendor_id: VendorId,
    pub lines: Vec<OrderLine>,
    pub total: Money,
    pub shipping_address: ShippingAddress,
    pub payment_status: PaymentStatus,
    pub occurred_at: DateTime<Utc>,
}

/// Event: OrderStatusChanged (forward step).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderStatusChanged {
    pub order_id: OrderId,
    pub from: OrderStatus,
    pub to: OrderStatus,
    pub tracking_number: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: OrderCancelled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCancelled {
    pub order_id: OrderId,
    pub reason: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: PaymentRecorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRecorded {
    pub order_id: OrderId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: OrderRefunded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRefunded {
    pub order_id: OrderId,
    pub amount: Money,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderEvent {
    OrderPlaced(OrderPlaced),
    OrderStatusChanged(OrderStatusChanged),
    OrderCancelled(OrderCancelled),
    PaymentRecorded(PaymentRecorded),
    OrderRefunded(OrderRefunded),
}

impl Event for OrderEvent {
    fn event_type(&self) -> &'static str {
        match self {
            OrderEvent::OrderPlaced(_) => "orders.order.placed",
            OrderEvent::OrderStatusChanged(_) => "orders.order.status_changed",
            OrderEvent::OrderCancelled(_) => "orders.order.cancelled",
            OrderEvent::PaymentRecorded(_) => "orders.order.payment_recorded",
            OrderEvent::OrderRefunded(_) => "orders.order.refunded",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            OrderEvent::OrderPlaced(e) => e.occurred_at,
            OrderEvent::OrderStatusChanged(e) => e.occurred_at,
            OrderEvent::OrderCancelled(e) => e.occurred_at,
            OrderEvent::PaymentRecorded(e) => e.occurred_at,
            OrderEvent::OrderRefunded(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Order {
    type Command = OrderCommand;
    type Event = OrderEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            OrderEvent::OrderPlaced(e) => {
                self.id = e.order_id;
                self.order_number = e.order_number.clone();
                self.customer_id = Some(e.customer_id);
                self.customer_name = e.customer_name.clone();
                self.vendor_id = Some(e.vendor_id);
                self.lines = e.lines.clone();
                self.total = Some(e.total.clone());
                self.status = OrderStatus::Pending;
                self.payment_status = e.payment_status;
                self.shipping_address = Some(e.shipping_address.clone());
                self.placed_at = Some(e.occurred_at);
                self.created = true;
            }
            OrderEvent::OrderStatusChanged(e) => {
                self.status = e.to;
                if e.tracking_number.is_some() {
                    self.tracking_number = e.tracking_number.clone();
                }
                self.updated_at = Some(e.occurred_at);
            }
            OrderEvent::OrderCancelled(e) => {
                self.status = OrderStatus::Cancelled;
                self.cancellation_reason = e.reason.clone();
                self.updated_at = Some(e.occurred_at);
            }
            OrderEvent::PaymentRecorded(e) => {
                self.payment_status = PaymentStatus::Paid;
                self.updated_at = Some(e.occurred_at);
            }
            OrderEvent::OrderRefunded(e) => {
                self.payment_status = PaymentStatus::Refunded;
                self.updated_at = Some(e.occurred_at);
            }
        }

        // Deterministic version tracking: +1 per applied event.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        if let OrderCommand::PlaceOrder(cmd) = command {
            return self.handle_place(cmd);
        }

        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_order_id(command.order_id())?;

        match command {
            OrderCommand::PlaceOrder(_) => Err(DomainError::conflict("order already exists")),
            OrderCommand::UpdateOrderStatus(cmd) => {
                self.transition(cmd.status, cmd.tracking_number.clone(), None, cmd.occurred_at)
            }
            OrderCommand::MarkShipped(cmd) => {
                self.ensure_status(OrderStatus::Processing, "shipped")?;
                self.transition(
                    OrderStatus::Shipped,
                    cmd.tracking_number.clone(),
                    None,
                    cmd.occurred_at,
                )
            }
            OrderCommand::MarkDelivered(cmd) => {
                self.ensure_status(OrderStatus::Shipped, "delivered")?;
                self.transition(OrderStatus::Delivered, None, None, cmd.occurred_at)
            }
            OrderCommand::CancelOrder(cmd) => self.transition(
                OrderStatus::Cancelled,
                None,
                cmd.reason.clone(),
                cmd.occurred_at,
            ),
            OrderCommand::ProcessRefund(cmd) => self.handle_refund(cmd),
            OrderCommand::RecordPayment(cmd) => self.handle_record_payment(cmd),
        }
    }
}

impl Order {
    fn ensure_order_id(&self, order_id: OrderId) -> Result<(), DomainError> {
        if self.id != order_id {
            return Err(DomainError::invariant("order_id mismatch"));
        }
        Ok(())
    }

    fn ensure_status(&self, expected: OrderStatus, action: &str) -> Result<(), DomainError> {
        if self.status != expected {
            return Err(DomainError::invariant(format!(
                "only {expected} orders can be marked {action} (current: {})",
                self.status
            )));
        }
        Ok(())
    }

    fn handle_place(&self, cmd: &PlaceOrder) -> Result<Vec<OrderEvent>, DomainError> {
        if self.created {
            return Err(DomainError::conflict("order already exists"));
        }
        if cmd.order_number.trim().is_empty() {
            return Err(DomainError::validation("order number cannot be empty"));
        }
        if cmd.lines.is_empty() {
            return Err(DomainError::validation("cannot place an order without lines"));
        }
        if !matches!(cmd.payment_status, PaymentStatus::Pending | PaymentStatus::Paid) {
            return Err(DomainError::validation(
                "orders are placed with payment pending or paid",
            ));
        }

        let mut lines = cmd.lines.iter();
        let first = lines
            .next()
            .ok_or_else(|| DomainError::validation("cannot place an order without lines"))?;
        let mut total = Money::zero(first.unit_price.currency.clone());
        for line in cmd.lines.iter() {
            if line.quantity == 0 {
                return Err(DomainError::validation("quantity must be positive"));
            }
            if line.unit_price.is_zero() {
                return Err(DomainError::validation("unit_price must be positive"));
            }
            total = total.checked_add(&line.subtotal()?)?;
        }

        Ok(vec![OrderEvent::OrderPlaced(OrderPlaced {
            order_id: cmd.order_id,
            order_number: cmd.order_number.trim().to_string(),
            customer_id: cmd.customer_id,
            customer_name: cmd.customer_name.clone(),
            vendor_id: cmd.vendor_id,
            lines: cmd.lines.clone(),
            total,
            shipping_address: cmd.shipping_address.clone(),
            payment_status: cmd.payment_status,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn transition(
        &self,
        next: OrderStatus,
        tracking_number: Option<String>,
        reason: Option<String>,
        occurred_at: DateTime<Utc>,
    ) -> Result<Vec<OrderEvent>, DomainError> {
        if self.status == next {
            return Err(DomainError::conflict(format!("order is already {next}")));
        }
        if !self.status.can_transition_to(next) {
            return Err(DomainError::invariant(format!(
                "illegal order transition {} -> {next}",
                self.status
            )));
        }

        if next == OrderStatus::Cancelled {
            return Ok(vec![OrderEvent::OrderCancelled(OrderCancelled {
                order_id: self.id,
                reason: reason.map(|r| r.trim().to_string()).filter(|r| !r.is_empty()),
                occurred_at,
            })]);
        }

        let tracking_number = tracking_number
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());

        Ok(vec![OrderEvent::OrderStatusChanged(OrderStatusChanged {
            order_id: self.id,
            from: self.status,
            to: next,
            tracking_number,
            occurred_at,
        })])
    }

    fn handle_refund(&self, cmd: &ProcessRefund) -> Result<Vec<OrderEvent>, DomainError> {
        if self.payment_status == PaymentStatus::Refunded {
            return Err(DomainError::conflict("order is already refunded"));
        }
        if !can_refund(self.status, self.payment_status) {
            return Err(DomainError::invariant(format!(
                "refund requires a paid, open order (status: {}, payment: {})",
                self.status, self.payment_status
            )));
        }
        let amount = self
            .total
            .clone()
            .ok_or_else(|| DomainError::invariant("order has no total"))?;

        Ok(vec![OrderEvent::OrderRefunded(OrderRefunded {
            order_id: cmd.order_id,
            amount,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_record_payment(&self, cmd: &RecordPayment) -> Result<Vec<OrderEvent>, DomainError> {
        match self.payment_status {
            PaymentStatus::Pending | PaymentStatus::Failed => {}
            PaymentStatus::Paid => return Err(DomainError::conflict("order is already paid")),
            PaymentStatus::Refunded => {
                return Err(DomainError::invariant("refunded orders cannot take new payments"));
            }
        }
        if self.status == OrderStatus::Cancelled {
            return Err(DomainError::invariant("cancelled orders cannot take payments"));
        }

        Ok(vec![OrderEvent::PaymentRecorded(PaymentRecorded {
            order_id: cmd.order_id,
            occurred_at: cmd.occurred_at,
        })])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_time() -> DateTime<Utc> {
        Utc::now()
    }

    fn address() -> ShippingAddress {
        ShippingAddress {
            recipient: "Kofi Mensah".to_string(),
            line1: "12 Harbour Road".to_string(),
            line2: None,
            city: "Accra".to_string(),
            postal_code: "GA-100".to_string(),
            country: "GH".to_string(),
        }
    }

    fn line(quantity: u32, cents: u64) -> OrderLine {
        OrderLine {
            product_id: ProductId::generate(),
            product_name: "Shea butter".to_string(),
            category: "beauty".to_string(),
            quantity,
            unit_price: Money::usd(cents),
        }
    }

    fn place(payment_status: PaymentStatus) -> Order {
        let order_id = OrderId::generate();
        let mut order = Order::empty(order_id);
        order
            .execute(&OrderCommand::PlaceOrder(PlaceOrder {
                order_id,
                order_number: "ORD-1001".to_string(),
                customer_id: CustomerId::new(),
                customer_name: "Kofi Mensah".to_string(),
                vendor_id: VendorId::new(),
                lines: vec![line(2, 1_250), line(1, 500)],
                shipping_address: address(),
                payment_status,
                occurred_at: test_time(),
            }))
            .unwrap();
        order
    }

    fn update(order: &Order, status: OrderStatus) -> OrderCommand {
        OrderCommand::UpdateOrderStatus(UpdateOrderStatus {
            order_id: order.id_typed(),
            status,
            tracking_number: None,
            occurred_at: test_time(),
        })
    }

    fn cancel(order: &Order) -> OrderCommand {
        OrderCommand::CancelOrder(CancelOrder {
            order_id: order.id_typed(),
            reason: Some("customer request".to_string()),
            occurred_at: test_time(),
        })
    }

    fn refund(order: &Order) -> OrderCommand {
        OrderCommand::ProcessRefund(ProcessRefund {
            order_id: order.id_typed(),
            occurred_at: test_time(),
        })
    }

    #[test]
    fn place_order_computes_total() {
        let order = place(PaymentStatus::Paid);
        assert_eq!(order.status(), OrderStatus::Pending);
        assert_eq!(order.total(), Some(&Money::usd(3_000)));
        assert_eq!(order.version(), 1);
    }

    #[test]
    fn place_order_rejects_empty_or_zero_lines() {
        let order_id = OrderId::generate();
        let order = Order::empty(order_id);
        for lines in [vec![], vec![line(0, 100)], vec![line(1, 0)]] {
            let err = order
                .handle(&OrderCommand::PlaceOrder(PlaceOrder {
                    order_id,
                    order_number: "ORD-1".to_string(),
                    customer_id: CustomerId::new(),
                    customer_name: "X".to_string(),
                    vendor_id: VendorId::new(),
                    lines,
                    shipping_address: address(),
                    payment_status: PaymentStatus::Pending,
                    occurred_at: test_time(),
                }))
                .unwrap_err();
            assert!(matches!(err, DomainError::Validation(_)));
        }
    }

    #[test]
    fn full_lifecycle_pending_to_delivered() {
        let mut order = place(PaymentStatus::Paid);
        order.execute(&update(&order, OrderStatus::Processing)).unwrap();
        order
            .execute(&OrderCommand::MarkShipped(MarkShipped {
                order_id: order.id_typed(),
                tracking_number: Some(" TRK-778 ".to_string()),
                occurred_at: test_time(),
            }))
            .unwrap();
        assert_eq!(order.status(), OrderStatus::Shipped);
        assert_eq!(order.tracking_number(), Some("TRK-778"));

        order
            .execute(&OrderCommand::MarkDelivered(MarkDelivered {
                order_id: order.id_typed(),
                occurred_at: test_time(),
            }))
            .unwrap();
        assert_eq!(order.status(), OrderStatus::Delivered);
        assert!(order.available_actions().is_empty());
    }

    #[test]
    fn skipping_a_step_is_illegal() {
        let order = place(PaymentStatus::Paid);
        let err = order.handle(&update(&order, OrderStatus::Delivered)).unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));

        let err = order
            .handle(&OrderCommand::MarkShipped(MarkShipped {
                order_id: order.id_typed(),
                tracking_number: None,
                occurred_at: test_time(),
            }))
            .unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
    }

    #[test]
    fn cancel_from_any_open_state_but_not_after_delivery() {
        let mut order = place(PaymentStatus::Pending);
        order.execute(&update(&order, OrderStatus::Processing)).unwrap();
        order.execute(&cancel(&order)).unwrap();
        assert_eq!(order.status(), OrderStatus::Cancelled);

        let err = order.handle(&cancel(&order)).unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));

        let mut delivered = place(PaymentStatus::Paid);
        for next in [OrderStatus::Processing, OrderStatus::Shipped, OrderStatus::Delivered] {
            delivered.execute(&update(&delivered, next)).unwrap();
        }
        let err = delivered.handle(&cancel(&delivered)).unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
    }

    #[test]
    fn refund_changes_payment_status_only() {
        let mut order = place(PaymentStatus::Paid);
        order.execute(&update(&order, OrderStatus::Processing)).unwrap();
        order.execute(&refund(&order)).unwrap();

        assert_eq!(order.status(), OrderStatus::Processing);
        assert_eq!(order.payment_status(), PaymentStatus::Refunded);

        let err = order.handle(&refund(&order)).unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[test]
    fn refund_requires_paid_open_order() {
        let unpaid = place(PaymentStatus::Pending);
        assert!(matches!(
            unpaid.handle(&refund(&unpaid)).unwrap_err(),
            DomainError::InvariantViolation(_)
        ));

        let mut cancelled = place(PaymentStatus::Paid);
        cancelled.execute(&cancel(&cancelled)).unwrap();
        assert!(matches!(
            cancelled.handle(&refund(&cancelled)).unwrap_err(),
            DomainError::InvariantViolation(_)
        ));
    }

    #[test]
    fn payment_can_be_recorded_once() {
        let mut order = place(PaymentStatus::Pending);
        let record = OrderCommand::RecordPayment(RecordPayment {
            order_id: order.id_typed(),
            occurred_at: test_time(),
        });
        order.execute(&record).unwrap();
        assert_eq!(order.payment_status(), PaymentStatus::Paid);
        assert!(matches!(order.handle(&record).unwrap_err(), DomainError::Conflict(_)));
    }

    #[test]
    fn unknown_order_is_not_found() {
        let order = Order::empty(OrderId::generate());
        assert_eq!(order.handle(&cancel(&order)).unwrap_err(), DomainError::NotFound);
    }

    #[test]
    fn record_serializes_wire_values() {
        let order = place(PaymentStatus::Paid);
        let json = serde_json::to_value(order.record().unwrap()).unwrap();
        assert_eq!(json["status"], "pending");
        assert_eq!(json["paymentStatus"], "paid");
        assert_eq!(json["orderNumber"], "ORD-1001");
    }

    #[test]
    fn apply_is_deterministic() {
        let mut source = place(PaymentStatus::Paid);
        let mut events = Vec::new();
        events.extend(source.execute(&update(&source, OrderStatus::Processing)).unwrap());
        events.extend(source.execute(&refund(&source)).unwrap());

        let start = place(PaymentStatus::Paid);
        let mut a = start.clone();
        let mut b = start;
        for event in &events {
            a.apply(event);
            b.apply(event);
        }
        assert_eq!(a, b);
        assert_eq!(a.status(), OrderStatus::Processing);
        assert_eq!(a.payment_status(), PaymentStatus::Refunded);
        assert_eq!(a.version(), 3);
    }
}
