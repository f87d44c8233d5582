//! Cart and order arithmetic.
//!
//! All amounts stay exact [`Decimal`]s; rounding to cents happens only when a value is
//! presented, through [`display`].

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

/// Flat shipping fee added to every cart and order.
pub const SHIPPING_FEE: Decimal = Decimal::from_parts(5, 0, 0, false, 0);

pub const EXPECTED_DELIVERY: &str = "3-5 business days";

/// Anything with a unit price and a quantity.
pub trait Priced {
    fn unit_price(&self) -> Decimal;
    fn quantity(&self) -> i32;

    fn line_total(&self) -> Decimal {
        line_total(self.unit_price(), self.quantity())
    }
}

pub fn line_total(price: Decimal, quantity: i32) -> Decimal {
    price * Decimal::from(quantity)
}

pub fn subtotal<'a, P, I>(lines: I) -> Decimal
where
    P: Priced + 'a,
    I: IntoIterator<Item = &'a P>,
{
    lines.into_iter().map(Priced::line_total).sum()
}

/// Rounds to cents, half away from zero.
pub fn display(amount: Decimal) -> Decimal {
    let mut rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub shipping: Decimal,
    pub grand_total: Decimal,
}

impl Totals {
    /// The grand total is not floored: a discount larger than the subtotal plus shipping
    /// yields a negative amount.
    pub fn new(subtotal: Decimal, discount: Decimal, shipping: Decimal) -> Self {
        Self {
            subtotal,
            discount,
            shipping,
            grand_total: subtotal - discount + shipping,
        }
    }

    pub fn compute<'a, P, I>(lines: I, discount: Decimal) -> Self
    where
        P: Priced + 'a,
        I: IntoIterator<Item = &'a P>,
    {
        Self::new(subtotal(lines), discount, SHIPPING_FEE)
    }

    pub fn rounded(&self) -> Self {
        Self {
            subtotal: display(self.subtotal),
            discount: display(self.discount),
            shipping: display(self.shipping),
            grand_total: display(self.grand_total),
        }
    }
}
