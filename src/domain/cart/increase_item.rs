//! Increase Item slice

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

pub async fn increase_item_endpoint(
    State(pool): State<PgPool>,
    Authenticated(user): Authenticated,
    Path(product_uuid): Path<Uuid>,
) -> Result<Redirect, ClientError> {
    let command = IncreaseItemCommand {
        user_id: user.user_id,
        product_id: product_uuid.try_into()?,
    };
    decide_line_change(&pool, &command.user_id, &command.product_id, &command).await?;
    Ok(Redirect::to(CART_PATH))
}

//------------------------- Command ----------------------------

#[derive(Debug, Clone)]
pub struct IncreaseItemCommand {
    pub user_id: UserId,
    pub product_id: ProductId,
}

impl Decision for IncreaseItemCommand {
    type State = LineState;
    type Change = LineChange;
    type Error = CartError;

    fn process(&self, state: &LineState) -> Result<LineChange, CartError> {
        let quantity = state
            .quantity
            .ok_or(CartError::LineDoesNotExist(self.product_id))?;
        Ok(LineChange::Update {
            quantity: quantity + 1,
        })
    }
}

//-------------------------- Tests -------------------------------
