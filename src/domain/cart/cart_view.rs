//! Cart view slice

use axum::{Json, extract::State};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;

use crate::{
    domain::{ProductId, ShopSession, accounts::Authenticated},
    infra::ClientError,
};

use super::{
    cart_lines::{CartLine, list_lines},
    pricing::{EXPECTED_DELIVERY, Priced, Totals, display},
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartLineView {
    pub product_id: ProductId,
    pub name: String,
    pub image: Option<String>,
    pub price: Decimal,
    pub quantity: i32,
    pub line_total: Decimal,
}

impl From<&CartLine> for CartLineView {
    fn from(line: &CartLine) -> Self {
        Self {
            product_id: line.product_id,
            name: line.name.clone(),
            image: line.image.clone(),
            price: display(line.price),
            quantity: line.quantity,
            line_total: display(line.line_total()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartView {
    pub lines: Vec<CartLineView>,
    pub coupon_code: Option<String>,
    pub totals: Totals,
    pub expected_delivery: &'static str,
}

impl CartView {
    pub fn new(lines: &[CartLine], coupon_code: Option<&str>, discount: Decimal) -> Self {
        Self {
            lines: lines.iter().map(CartLineView::from).collect(),
            coupon_code: coupon_code.map(str::to_owned),
            totals: Totals::compute(lines, discount).rounded(),
            expected_delivery: EXPECTED_DELIVERY,
        }
    }
}

pub async fn cart_view(
    State(pool): State<PgPool>,
    session: ShopSession,
    Authenticated(user): Authenticated,
) -> Result<Json<CartView>, ClientError> {
    let mut conn = pool.acquire().await.map_err(anyhow::Error::new)?;
    let lines = list_lines(&mut conn, &user.user_id).await?;
    let coupon = session.coupon().await?;

    Ok(Json(CartView::new(&lines, coupon.code(), coupon.discount)))
}
