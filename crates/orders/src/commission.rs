use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use bazaar_core::{DomainError, DomainResult, Money};

use crate::order::OrderRecord;

/// Platform commission per product category, in basis points.
///
/// Categories are matched case-insensitively; anything not listed pays
/// `default_bps`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommissionSchedule {
    pub default_bps: u32,
    #[serde(default)]
    pub by_category: BTreeMap<String, u32>,
}

impl Default for CommissionSchedule {
    fn default() -> Self {
        Self {
            default_bps: Self::DEFAULT_BPS,
            by_category: BTreeMap::new(),
        }
    }
}

impl CommissionSchedule {
    /// 10%.
    pub const DEFAULT_BPS: u32 = 1_000;

    pub fn new(default_bps: u32) -> DomainResult<Self> {
        ensure_rate(default_bps)?;
        Ok(Self {
            default_bps,
            by_category: BTreeMap::new(),
        })
    }

    pub fn with_category(mut self, category: &str, bps: u32) -> DomainResult<Self> {
        ensure_rate(bps)?;
        self.by_category.insert(category.trim().to_lowercase(), bps);
        Ok(self)
    }

    pub fn rate_for(&self, category: &str) -> u32 {
        self.by_category
            .get(&category.trim().to_lowercase())
            .copied()
            .unwrap_or(self.default_bps)
    }

    /// Platform cut of the order, computed line by line.
    pub fn commission_for(&self, order: &OrderRecord) -> DomainResult<Money> {
        let mut commission = Money::zero(order.total.currency.clone());
        for line in &order.lines {
            let subtotal = line.subtotal()?;
            let rate = self.rate_for(&line.category);
            commission = commission.checked_add(&subtotal.basis_points(rate))?;
        }
        Ok(commission)
    }

    /// What the vendor keeps after commission.
    pub fn vendor_payout(&self, order: &OrderRecord) -> DomainResult<Money> {
        order.total.checked_sub(&self.commission_for(order)?)
    }
}

fn ensure_rate(bps: u32) -> DomainResult<()> {
    if bps > 10_000 {
        return Err(DomainError::validation(format!(
            "commission rate {bps} bps exceeds 100%"
        )));
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::{TimeZone, Utc};

    use bazaar_core::{AggregateId, CustomerId, Money, VendorId};
    use bazaar_products::ProductId;

    use crate::order::{OrderId, OrderLine, OrderRecord, ShippingAddress};
    use crate::transitions::{OrderStatus, PaymentStatus};

    pub fn line(category: &str, quantity: u32, cents: u64) -> OrderLine {
        OrderLine {
            product_id: ProductId::new(AggregateId::new()),
            product_name: format!("{category} item"),
            category: category.to_string(),
            quantity,
            unit_price: Money::usd(cents),
        }
    }

    pub fn record(
        number: &str,
        customer: &str,
        lines: Vec<OrderLine>,
        status: OrderStatus,
        payment_status: PaymentStatus,
    ) -> OrderRecord {
        let total = lines.iter().fold(Money::usd(0), |acc, l| {
            acc.checked_add(&l.subtotal().unwrap()).unwrap()
        });
        OrderRecord {
            id: OrderId::generate(),
            order_number: number.to_string(),
            customer_id: CustomerId::new(),
            customer_name: customer.to_string(),
            vendor_id: VendorId::new(),
            lines,
            total,
            status,
            payment_status,
            shipping_address: ShippingAddress {
                recipient: customer.to_string(),
                line1: "1 Market Street".to_string(),
                line2: None,
                city: "Lagos".to_string(),
                postal_code: "100001".to_string(),
                country: "NG".to_string(),
            },
            tracking_number: None,
            cancellation_reason: None,
            placed_at: Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap(),
            updated_at: None,
            version: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::{line, record};
    use super::*;
    use crate::transitions::{OrderStatus, PaymentStatus};

    #[test]
    fn category_rates_override_default() {
        let schedule = CommissionSchedule::new(1_000)
            .unwrap()
            .with_category("Electronics", 500)
            .unwrap();
        assert_eq!(schedule.rate_for("electronics"), 500);
        assert_eq!(schedule.rate_for(" ELECTRONICS "), 500);
        assert_eq!(schedule.rate_for("fashion"), 1_000);
    }

    #[test]
    fn commission_is_summed_per_line() {
        let schedule = CommissionSchedule::default()
            .with_category("electronics", 500)
            .unwrap();
        let order = record(
            "ORD-1",
            "Ama",
            vec![line("electronics", 1, 20_000), line("fashion", 2, 2_500)],
            OrderStatus::Delivered,
            PaymentStatus::Paid,
        );
        // 5% of 200.00 + 10% of 50.00
        assert_eq!(schedule.commission_for(&order).unwrap(), Money::usd(1_500));
        assert_eq!(schedule.vendor_payout(&order).unwrap(), Money::usd(23_500));
    }

    #[test]
    fn rates_above_one_hundred_percent_are_rejected() {
        assert!(CommissionSchedule::new(10_001).is_err());
        assert!(CommissionSchedule::default().with_category("x", 20_000).is_err());
    }
}
