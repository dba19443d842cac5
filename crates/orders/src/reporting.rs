//! Admin dashboard summaries (`GET /admin/financial`, `GET /admin/analytics`).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use bazaar_core::{DomainResult, Money};

use crate::commission::CommissionSchedule;
use crate::order::OrderRecord;
use crate::transitions::{OrderStatus, PaymentStatus};

/// Revenue figures over a set of orders.
///
/// Gross sales count orders whose payment was captured and kept (paid and not
/// cancelled). Refunded payments are reported separately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialSummary {
    pub gross_sales: Money,
    pub platform_commission: Money,
    pub vendor_payouts: Money,
    pub refunded: Money,
    pub order_count: u64,
}

impl FinancialSummary {
    pub fn empty(currency: &str) -> Self {
        Self {
            gross_sales: Money::zero(currency),
            platform_commission: Money::zero(currency),
            vendor_payouts: Money::zero(currency),
            refunded: Money::zero(currency),
            order_count: 0,
        }
    }

    pub fn compute<'a>(
        orders: impl IntoIterator<Item = &'a OrderRecord>,
        schedule: &CommissionSchedule,
        currency: &str,
    ) -> DomainResult<Self> {
        let mut summary = Self::empty(currency);
        for order in orders {
            match order.payment_status {
                PaymentStatus::Paid if order.status != OrderStatus::Cancelled => {
                    let commission = schedule.commission_for(order)?;
                    summary.gross_sales = summary.gross_sales.checked_add(&order.total)?;
                    summary.platform_commission =
                        summary.platform_commission.checked_add(&commission)?;
                    summary.vendor_payouts = summary
                        .vendor_payouts
                        .checked_add(&order.total.checked_sub(&commission)?)?;
                    summary.order_count += 1;
                }
                PaymentStatus::Refunded => {
                    summary.refunded = summary.refunded.checked_add(&order.total)?;
                }
                _ => {}
            }
        }
        Ok(summary)
    }
}

/// Order counts and average basket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    pub orders_by_status: BTreeMap<OrderStatus, u64>,
    pub total_orders: u64,
    pub average_order_value: Money,
}

impl AnalyticsSummary {
    pub fn compute<'a>(
        orders: impl IntoIterator<Item = &'a OrderRecord>,
        currency: &str,
    ) -> DomainResult<Self> {
        let mut orders_by_status: BTreeMap<OrderStatus, u64> =
            OrderStatus::ALL.into_iter().map(|s| (s, 0)).collect();
        let mut total_orders = 0u64;
        let mut value = Money::zero(currency);

        for order in orders {
            *orders_by_status.entry(order.status).or_default() += 1;
            total_orders += 1;
            value = value.checked_add(&order.total)?;
        }

        let average = value
            .amount
            .checked_div(total_orders)
            .unwrap_or_default();

        Ok(Self {
            orders_by_status,
            total_orders,
            average_order_value: Money::new(average, currency),
        })
    }
}
