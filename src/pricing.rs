//! Order pricing: money rounding, shipping tiers and the final quote.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use validator::ValidationError;

/// Largest amount a `NUMERIC(12, 2)` money column holds.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xD4A5_0FFF, 0xE8, 0, false, 2);

/// Money is kept at two fractional digits, halves rounded away from zero.
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Validator for submitted money fields: within `0..=MAX_AMOUNT`.
pub(crate) fn valid_amount(amount: &Decimal) -> Result<(), ValidationError> {
    if amount.is_sign_negative() {
        return Err(ValidationError::new("negative_amount"));
    }
    if *amount > MAX_AMOUNT {
        return Err(ValidationError::new("amount_too_large"));
    }
    Ok(())
}

/// Where checkout takes unit prices from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PriceSource {
    /// Re-price every line from the product's current catalog price.
    #[default]
    Catalog,
    /// Use the unit price submitted by the client.
    Client,
}

/// Flat shipping below a subtotal threshold, free at or above it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShippingPolicy {
    pub free_threshold: Decimal,
    pub flat_cost: Decimal,
}

impl ShippingPolicy {
    pub fn cost_for(&self, subtotal: Decimal) -> Decimal {
        if subtotal < self.free_threshold { round_money(self.flat_cost) } else { Decimal::ZERO }
    }
}

impl Default for ShippingPolicy {
    fn default() -> Self {
        Self { free_threshold: Decimal::from(50_000), flat_cost: Decimal::from(5_000) }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PricingPolicy {
    pub shipping: ShippingPolicy,
    pub price_source: PriceSource,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Quote {
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub shipping_cost: Decimal,
    pub total: Decimal,
}

impl Quote {
    pub fn new(subtotal: Decimal, discount: Decimal, shipping_cost: Decimal) -> Self {
        let (subtotal, discount, shipping_cost) = (round_money(subtotal), round_money(discount), round_money(shipping_cost));
        Self { subtotal, discount, shipping_cost, total: subtotal - discount + shipping_cost }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_shipping_threshold() {
        let policy = ShippingPolicy::default();
        assert_eq!(policy.cost_for(dec!(3000)), dec!(5000));
        assert_eq!(policy.cost_for(dec!(49999.99)), dec!(5000));
        assert_eq!(policy.cost_for(dec!(50000)), Decimal::ZERO);
        assert_eq!(policy.cost_for(dec!(120000)), Decimal::ZERO);
    }

    #[test]
    fn test_quote_total() {
        let quote = Quote::new(dec!(3000), dec!(300), dec!(5000));
        assert_eq!(quote.total, dec!(7700));
        assert_eq!(quote.total, quote.subtotal - quote.discount + quote.shipping_cost);
    }

    #[test]
    fn test_max_amount_matches_schema() {
        assert_eq!(MAX_AMOUNT, dec!(9999999999.99));
        assert!(valid_amount(&MAX_AMOUNT).is_ok());
        assert!(valid_amount(&(MAX_AMOUNT + dec!(0.01))).is_err());
        assert!(valid_amount(&dec!(-0.01)).is_err());
    }

    #[test]
    fn test_round_money() {
        assert_eq!(round_money(dec!(10.005)), dec!(10.01));
        assert_eq!(round_money(dec!(33.3333)), dec!(33.33));
    }
}
