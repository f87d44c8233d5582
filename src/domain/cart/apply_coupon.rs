//! Apply Coupon slice

use axum::{Json, extract::State, response::Redirect};
use sqlx::PgPool;
use tracing::info;

use crate::{
    domain::{ShopSession, accounts::Authenticated, session::AppliedCoupon},
    infra::ClientError,
};

use super::{
    cart_lines::CART_PATH,
    coupons::{Coupon, resolve_coupon},
};

#[derive(Debug, Clone, serde::Deserialize)]
pub struct ApplyCouponPayload {
    #[serde(default)]
    pub coupon_code: String,
}

/// Unknown or inactive codes reset the applied coupon instead of failing.
pub async fn apply_coupon_endpoint(
    State(pool): State<PgPool>,
    session: ShopSession,
    Authenticated(user): Authenticated,
    Json(payload): Json<ApplyCouponPayload>,
) -> Result<Redirect, ClientError> {
    let coupon = resolve_coupon(&pool, &payload.coupon_code).await?;
    let applied = applied_coupon(coupon.as_ref());

    match applied.code() {
        Some(code) => info!("{} applied coupon {code}", user.username),
        None => info!("{} cleared the applied coupon", user.username),
    }
    session.set_coupon(&applied).await?;

    Ok(Redirect::to(CART_PATH))
}

pub fn applied_coupon(coupon: Option<&Coupon>) -> AppliedCoupon {
    coupon
        .map(|coupon| AppliedCoupon::new(coupon.code.clone(), coupon.discount_amount))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::domain::CouponId;

    #[test]
    fn resolved_coupon_stores_its_canonical_code() {
        let coupon = Coupon {
            coupon_id: CouponId::new(),
            code: "SAVE10".to_owned(),
            discount_amount: Decimal::TEN,
            active: true,
        };

        assert_eq!(
            applied_coupon(Some(&coupon)),
            AppliedCoupon::new("SAVE10", Decimal::TEN)
        );
    }

    #[test]
    fn no_coupon_resets_to_nothing() {
        assert_eq!(applied_coupon(None), AppliedCoupon::default());
    }
}
