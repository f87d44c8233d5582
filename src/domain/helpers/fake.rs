use fake::{Dummy, Fake};
use rust_decimal::Decimal;

/// Prices between 0.10 and 9.99.
pub struct Price;

impl Dummy<Price> for Decimal {
    fn dummy_with_rng<R: fake::Rng + ?Sized>(_config: &Price, rng: &mut R) -> Self {
        let value: i64 = (10..1000).fake_with_rng(rng);
        Decimal::new(value, 2)
    }
}

/// Cart quantities between 1 and 9.
pub struct Quantity;

impl Dummy<Quantity> for i32 {
    fn dummy_with_rng<R: fake::Rng + ?Sized>(_config: &Quantity, rng: &mut R) -> Self {
        (1..10).fake_with_rng(rng)
    }
}
