use serde::{Deserialize, Serialize};

/// Lifecycle of an order. Only `Pending` orders can be reviewed.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum_macros::Display,
    strum_macros::EnumString,
)]
pub enum OrderStatus {
    Pending,
    Accepted,
    Rejected,
}

/// Reads the status column.
impl TryFrom<String> for OrderStatus {
    type Error = strum::ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
