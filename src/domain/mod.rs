pub mod accounts;
pub mod cart;
pub mod catalog;
mod helpers;
mod ids;
pub mod orders;
pub mod session;

pub use helpers::{Decision, fake};
pub use ids::*;
pub use session::ShopSession;
