//! Value objects: equality by value, not identity.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Marker trait for value objects (immutable, compared by value).
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}

/// Monetary amount in the smallest currency unit (e.g. cents).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Money {
    pub amount: u64,
    /// ISO currency code (e.g. "USD").
    pub currency: String,
}

impl ValueObject for Money {}

impl Money {
    pub const DEFAULT_CURRENCY: &'static str = "USD";

    pub fn new(amount: u64, currency: impl Into<String>) -> Self {
        Self {
            amount,
            currency: currency.into(),
        }
    }

    /// Amount in the marketplace default currency.
    pub fn usd(amount: u64) -> Self {
        Self::new(amount, Self::DEFAULT_CURRENCY)
    }

    pub fn zero(currency: impl Into<String>) -> Self {
        Self::new(0, currency)
    }

    pub fn is_zero(&self) -> bool {
        self.amount == 0
    }

    pub fn checked_add(&self, other: &Money) -> DomainResult<Money> {
        self.ensure_same_currency(other)?;
        let amount = self
            .amount
            .checked_add(other.amount)
            .ok_or_else(|| DomainError::validation("money amount overflow"))?;
        Ok(Money::new(amount, self.currency.clone()))
    }

    pub fn checked_sub(&self, other: &Money) -> DomainResult<Money> {
        self.ensure_same_currency(other)?;
        let amount = self
            .amount
            .checked_sub(other.amount)
            .ok_or_else(|| DomainError::validation("money amount underflow"))?;
        Ok(Money::new(amount, self.currency.clone()))
    }

    pub fn checked_mul(&self, factor: u64) -> DomainResult<Money> {
        let amount = self
            .amount
            .checked_mul(factor)
            .ok_or_else(|| DomainError::validation("money amount overflow"))?;
        Ok(Money::new(amount, self.currency.clone()))
    }

    /// Share of this amount expressed in basis points (1/100 of a percent),
    /// rounded half up to the nearest minor unit.
    pub fn basis_points(&self, bps: u32) -> Money {
        let scaled = u128::from(self.amount) * u128::from(bps);
        let rounded = (scaled + 5_000) / 10_000;
        Money::new(
            u64::try_from(rounded).unwrap_or(u64::MAX),
            self.currency.clone(),
        )
    }

    fn ensure_same_currency(&self, other: &Money) -> DomainResult<()> {
        if self.currency != other.currency {
            return Err(DomainError::validation(format!(
                "currency mismatch ({} vs {})",
                self.currency, other.currency
            )));
        }
        Ok(())
    }
}

impl core::fmt::Display for Money {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}.{:02} {}", self.amount / 100, self.amount % 100, self.currency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn addition_requires_matching_currency() {
        let usd = Money::usd(1_000);
        let eur = Money::new(500, "EUR");
        assert!(matches!(usd.checked_add(&eur), Err(DomainError::Validation(_))));
        assert_eq!(usd.checked_add(&Money::usd(250)).unwrap(), Money::usd(1_250));
    }

    #[test]
    fn subtraction_rejects_underflow() {
        assert!(Money::usd(100).checked_sub(&Money::usd(101)).is_err());
        assert_eq!(Money::usd(100).checked_sub(&Money::usd(40)).unwrap().amount, 60);
    }

    #[test]
    fn basis_points_round_half_up() {
        // 10% of $19.99 = 199.9 cents
        assert_eq!(Money::usd(1_999).basis_points(1_000).amount, 200);
        // 12.5% of $1.00
        assert_eq!(Money::usd(100).basis_points(1_250).amount, 13);
        assert_eq!(Money::usd(0).basis_points(1_500).amount, 0);
    }

    #[test]
    fn displays_major_and_minor_units() {
        assert_eq!(Money::usd(12_345).to_string(), "123.45 USD");
        assert_eq!(Money::usd(7).to_string(), "0.07 USD");
    }
}
