//! Coupon registry.

use std::str::FromStr;

use anyhow::Context;
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;

use crate::domain::CouponId;

const MAX_CODE_LENGTH: usize = 50;

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Coupon {
    pub coupon_id: CouponId,
    pub code: String,
    pub discount_amount: Decimal,
    pub active: bool,
}

/// Trims the code; blank input means "no coupon".
pub fn normalize_code(raw: &str) -> Option<&str> {
    let code = raw.trim();
    (!code.is_empty()).then_some(code)
}

/// Parses the `CODE=AMOUNT` command line argument.
pub fn parse_coupon_arg(arg: &str) -> Result<(String, Decimal), anyhow::Error> {
    let (code, amount) = arg
        .split_once('=')
        .context("Coupon must be given as CODE=AMOUNT.")?;
    let code = normalize_code(code).context("Coupon code cannot be blank.")?;
    if code.chars().count() > MAX_CODE_LENGTH {
        anyhow::bail!("Coupon code must be at most {MAX_CODE_LENGTH} characters.");
    }
    let amount = Decimal::from_str(amount.trim())
        .with_context(|| format!("Coupon amount {amount} is not a number."))?;
    if amount < Decimal::ZERO {
        anyhow::bail!("Coupon amount cannot be negative.");
    }
    Ok((code.to_owned(), amount))
}

//--------------------------- SQL -------------------------------

/// Looks up an active coupon, ignoring case. Unknown and inactive codes are both `None`.
pub async fn resolve_coupon(pool: &PgPool, raw_code: &str) -> Result<Option<Coupon>, anyhow::Error> {
    let Some(code) = normalize_code(raw_code) else {
        return Ok(None);
    };

    sqlx::query_as::<_, Coupon>(
        r#"SELECT coupon_id, code, discount_amount, active
           FROM coupons
           WHERE lower(code) = lower($1) AND active"#,
    )
    .bind(code)
    .fetch_optional(pool)
    .await
    .with_context(|| format!("Problem in resolve_coupon({code})."))
}

/// Creates the coupon, or updates the amount of an existing one with the same code and
/// re-activates it.
pub async fn upsert_coupon(pool: &PgPool, code: &str, amount: Decimal) -> Result<Coupon, anyhow::Error> {
    sqlx::query_as::<_, Coupon>(
        r#"INSERT INTO coupons (coupon_id, code, discount_amount, active)
           VALUES ($1, $2, $3, true)
           ON CONFLICT ((lower(code)))
           DO UPDATE SET discount_amount = EXCLUDED.discount_amount, active = true
           RETURNING coupon_id, code, discount_amount, active"#,
    )
    .bind(CouponId::new())
    .bind(code)
    .bind(amount)
    .fetch_one(pool)
    .await
    .with_context(|| format!("Problem in upsert_coupon({code})."))
}
