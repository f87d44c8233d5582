mod decision;
pub mod fake;
#[cfg(test)]
pub mod harness;
mod macros;

pub use decision::Decision;
