//! Decrease Item slice

use axum::{
    extract::{Path, State},
    response::Redirect,
};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    domain::{Decision, ProductId, UserId, accounts::Authenticated},
    infra::ClientError,
};

use super::{
    CartError,
    cart_lines::{CART_PATH, LineChange, LineState, decide_line_change},
};

//------------------------- Web API ----------------------------

pub async fn decrease_item_endpoint(
    State(pool): State<PgPool>,
    Authenticated(user): Authenticated,
    Path(product_uuid): Path<Uuid>,
) -> Result<Redirect, ClientError> {
    let command = DecreaseItemCommand {
        user_id: user.user_id,
        product_id: product_uuid.try_into()?,
    };
    decide_line_change(&pool, &command.user_id, &command.product_id, &command).await?;
    Ok(Redirect::to(CART_PATH))
}

//------------------------- Command ----------------------------

#[derive(Debug, Clone)]
pub struct DecreaseItemCommand {
    pub user_id: UserId,
    pub product_id: ProductId,
}

impl Decision for DecreaseItemCommand {
    type State = LineState;
    type Change = LineChange;
    type Error = CartError;

    /// A line never reaches zero: decreasing the last unit removes it.
    fn process(&self, state: &LineState) -> Result<LineChange, CartError> {
        match state.quantity {
            None => Err(CartError::LineDoesNotExist(self.product_id)),
            Some(quantity) if quantity > 1 => Ok(LineChange::Update {
                quantity: quantity - 1,
            }),
            Some(_) => Ok(LineChange::Delete),
        }
    }
}

//-------------------------- Tests -------------------------------
