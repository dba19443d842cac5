use serde::{Deserialize, Serialize};

use bazaar_core::{Filter, VendorId, matches_search};

use crate::order::OrderRecord;
use crate::transitions::{OrderStatus, PaymentStatus};

/// Order table filter. Search covers order number and customer name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderFilter {
    pub search: Option<String>,
    pub status: Option<OrderStatus>,
    pub payment_status: Option<PaymentStatus>,
    pub vendor_id: Option<VendorId>,
}

impl OrderFilter {
    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn status(mut self, status: OrderStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn payment_status(mut self, payment_status: PaymentStatus) -> Self {
        self.payment_status = Some(payment_status);
        self
    }

    pub fn vendor(mut self, vendor_id: VendorId) -> Self {
        self.vendor_id = Some(vendor_id);
        self
    }
}

impl Filter<OrderRecord> for OrderFilter {
    fn matches(&self, order: &OrderRecord) -> bool {
        matches_search(
            self.search.as_deref(),
            &[&order.order_number, &order.customer_name],
        ) && self.status.is_none_or(|s| order.status == s)
            && self.payment_status.is_none_or(|p| order.payment_status == p)
            && self.vendor_id.is_none_or(|v| order.vendor_id == v)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::commission::fixtures::{line, record};

    fn seeded() -> Vec<OrderRecord> {
        vec![
            record(
                "ORD-1001",
                "Ama Owusu",
                vec![line("home", 1, 900)],
                OrderStatus::Pending,
                PaymentStatus::Paid,
            ),
            record(
                "ORD-1002",
                "Bola Ade",
                vec![line("home", 2, 450)],
                OrderStatus::Shipped,
                PaymentStatus::Paid,
            ),
            record(
                "ORD-1003",
                "Chidi Obi",
                vec![line("beauty", 1, 300)],
                OrderStatus::Pending,
                PaymentStatus::Pending,
            ),
            record(
                "ORD-2001",
                "Ama Mensah",
                vec![line("beauty", 3, 120)],
                OrderStatus::Cancelled,
                PaymentStatus::Refunded,
            ),
        ]
    }

    #[test]
    fn search_matches_order_number_or_customer() {
        let orders = seeded();
        assert_eq!(OrderFilter::default().search("ord-100").select(&orders).len(), 3);
        let amas = OrderFilter::default().search("ama").select(&orders);
        assert_eq!(amas.len(), 2);
    }

    #[test]
    fn status_and_payment_combine() {
        let orders = seeded();
        let hits = OrderFilter::default()
            .status(OrderStatus::Pending)
            .payment_status(PaymentStatus::Paid)
            .select(&orders);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].order_number, "ORD-1001");
    }

    #[test]
    fn vendor_scope_limits_results() {
        let orders = seeded();
        let vendor = orders[2].vendor_id;
        let hits = OrderFilter::default().vendor(vendor).select(&orders);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].order_number, "ORD-1003");
    }

    fn arb_status() -> impl Strategy<Value = Option<OrderStatus>> {
        prop::option::of(prop::sample::select(OrderStatus::ALL.to_vec()))
    }

    fn arb_payment() -> impl Strategy<Value = Option<PaymentStatus>> {
        prop::option::of(prop::sample::select(vec![
            PaymentStatus::Pending,
            PaymentStatus::Paid,
            PaymentStatus::Failed,
            PaymentStatus::Refunded,
        ]))
    }

    proptest! {
        /// Property: the combined filter equals the intersection of each single criterion.
        #[test]
        fn combined_filter_is_intersection(
            status in arb_status(),
            payment in arb_payment(),
            search in prop::option::of(
                prop::sample::select(vec!["ama", "ORD-2", "bola", "zzz", ""]),
            ),
        ) {
            let orders = seeded();
            let combined = OrderFilter {
                search: search.map(str::to_string),
                status,
                payment_status: payment,
                vendor_id: None,
            };
            let by_search = OrderFilter {
                search: search.map(str::to_string),
                ..Default::default()
            };
            let by_status = OrderFilter { status, ..Default::default() };
            let by_payment = OrderFilter { payment_status: payment, ..Default::default() };

            for order in &orders {
                let expected = by_search.matches(order)
                    && by_status.matches(order)
                    && by_payment.matches(order);
                prop_assert_eq!(combined.matches(order), expected);
            }
        }
    }
}
