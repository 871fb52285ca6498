//! Cart Aggregate
//!
//! The lines a checkout is priced from.

use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::pricing::{round_money, valid_amount};

/// One line as submitted by the client.
#[derive(Clone, Debug, Deserialize, Validate)]
pub struct CartLine {
    #[serde(alias = "id")]
    pub product_id: Uuid,
    #[validate(range(min = 1, message = "quantity must be at least 1"))]
    pub quantity: i32,
    #[validate(custom = "valid_amount")]
    pub price: Decimal,
}

/// A resolved line: the unit price is the one the order is charged at.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PricedLine {
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price: Decimal,
}

impl PricedLine {
    /// `None` when the product does not fit in a `Decimal`.
    pub fn line_total(&self) -> Option<Decimal> { self.unit_price.checked_mul(Decimal::from(self.quantity)) }
}

#[derive(Clone, Debug, Default)]
pub struct Cart {
    lines: Vec<PricedLine>,
}

impl Cart {
    pub fn new() -> Self { Self::default() }

    pub fn lines(&self) -> &[PricedLine] { &self.lines }

    /// Lines are kept as submitted, one per request line, even when a
    /// product repeats.
    pub fn push(&mut self, line: PricedLine) { self.lines.push(line); }

    /// Units of `product_id` already claimed by lines in this cart.
    pub fn reserved(&self, product_id: Uuid) -> i64 {
        self.lines.iter().filter(|l| l.product_id == product_id).map(|l| i64::from(l.quantity)).sum()
    }

    /// Sum of line totals, or `None` on arithmetic overflow.
    pub fn subtotal(&self) -> Option<Decimal> {
        self.lines
            .iter()
            .try_fold(Decimal::ZERO, |acc, line| acc.checked_add(line.line_total()?))
            .map(round_money)
    }
}
