//! Checkout slice
//!
//! Turns the user's cart into a Pending order in a single transaction: the cart lines are
//! locked, an order with the same idempotency key is replayed instead of duplicated, and
//! the order, its items and the emptied cart are committed together. The session coupon is
//! cleared only once the commit succeeded.

use anyhow::Context;
use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{PgConnection, PgPool};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    domain::{
        Decision, OrderId, OrderItemId, ProductId, ShopSession, UserId,
        accounts::Authenticated,
        cart::{
            CartError, CartLine, CartView,
            cart_lines::list_lines,
            pricing::{SHIPPING_FEE, Totals},
        },
        session::AppliedCoupon,
    },
    infra::ClientError,
};

use super::{OrderError, OrderStatus};

pub const DEFAULT_PAYMENT_METHOD: &str = "cash";
const MAX_PAYMENT_METHOD_LENGTH: usize = 50;

//------------------------- Web API ----------------------------

#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct CheckoutPayload {
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub idempotency_key: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderConfirmation {
    pub order_id: OrderId,
    pub replayed: bool,
}

pub async fn checkout_page(
    State(pool): State<PgPool>,
    session: ShopSession,
    Authenticated(user): Authenticated,
) -> Result<Json<CartView>, ClientError> {
    let mut conn = pool.acquire().await.context("Problem acquiring a connection.")?;
    let lines = list_lines(&mut conn, &user.user_id).await?;
    if lines.is_empty() {
        return Err(CartError::CannotCheckoutEmptyCart.into());
    }
    let coupon = session.coupon().await?;

    Ok(Json(CartView::new(&lines, coupon.code(), coupon.discount)))
}

pub async fn checkout_endpoint(
    State(pool): State<PgPool>,
    session: ShopSession,
    Authenticated(user): Authenticated,
    Json(payload): Json<CheckoutPayload>,
) -> Result<Response, ClientError> {
    let coupon = session.coupon().await?;
    let command = PlaceOrderCommand::new(OrderId::new(), user.user_id, payload, coupon)?;

    let placed = place_order(&pool, &command).await?;

    match placed {
        CheckoutChange::Replay(order_id) => {
            info!("{} replayed checkout of order {order_id}", user.username);
            Ok(Json(OrderConfirmation {
                order_id,
                replayed: true,
            })
            .into_response())
        }
        CheckoutChange::Place(order) => {
            Ok(placed_order_response(&session, &user.username, &order).await)
        }
    }
}

/// Answers for a committed order. Clearing the coupon is best effort from here on.
async fn placed_order_response(
    session: &ShopSession,
    username: &str,
    order: &NewOrder,
) -> Response {
    if let Err(e) = session.clear_coupon().await {
        warn!(
            "Could not clear the coupon of {username} after placing order {}: {e}",
            order.order_id
        );
    }
    info!(
        "{username} placed order {} with {} items",
        order.order_id,
        order.items.len()
    );

    let confirmation = OrderConfirmation {
        order_id: order.order_id,
        replayed: false,
    };
    (StatusCode::CREATED, Json(confirmation)).into_response()
}

//------------------------- Command ----------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct PlaceOrderCommand {
    pub order_id: OrderId,
    pub user_id: UserId,
    pub payment_method: String,
    pub coupon: AppliedCoupon,
    pub idempotency_key: Option<Uuid>,
}

impl PlaceOrderCommand {
    pub fn new(
        order_id: OrderId,
        user_id: UserId,
        payload: CheckoutPayload,
        coupon: AppliedCoupon,
    ) -> Result<Self, OrderError> {
        Ok(Self {
            order_id,
            user_id,
            payment_method: payment_method(payload.payment_method.as_deref())?,
            coupon,
            idempotency_key: payload.idempotency_key,
        })
    }
}

/// Blank or missing methods default to cash.
pub fn payment_method(raw: Option<&str>) -> Result<String, OrderError> {
    let method = raw.map(str::trim).unwrap_or_default();
    if method.is_empty() {
        return Ok(DEFAULT_PAYMENT_METHOD.to_owned());
    }
    if method.chars().count() > MAX_PAYMENT_METHOD_LENGTH {
        return Err(OrderError::InvalidPaymentMethod);
    }
    Ok(method.to_owned())
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CheckoutState {
    pub lines: Vec<CartLine>,
    /// Order already placed with the command's idempotency key.
    pub existing_order: Option<OrderId>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CheckoutChange {
    Place(NewOrder),
    Replay(OrderId),
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub order_id: OrderId,
    pub user_id: UserId,
    pub payment_method: String,
    pub coupon_code: Option<String>,
    pub discount: Decimal,
    pub shipping: Decimal,
    pub idempotency_key: Option<Uuid>,
    pub items: Vec<NewOrderItem>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewOrderItem {
    pub order_item_id: OrderItemId,
    pub product_id: ProductId,
    pub quantity: i32,
}

impl Decision for PlaceOrderCommand {
    type State = CheckoutState;
    type Change = CheckoutChange;
    type Error = CartError;

    fn process(&self, state: &CheckoutState) -> Result<CheckoutChange, CartError> {
        if let Some(order_id) = state.existing_order {
            return Ok(CheckoutChange::Replay(order_id));
        }
        if state.lines.is_empty() {
            return Err(CartError::CannotCheckoutEmptyCart);
        }

        let totals = Totals::compute(&state.lines, self.coupon.discount);
        Ok(CheckoutChange::Place(NewOrder {
            order_id: self.order_id,
            user_id: self.user_id,
            payment_method: self.payment_method.clone(),
            coupon_code: self.coupon.code().map(str::to_owned),
            discount: totals.discount,
            shipping: totals.shipping,
            idempotency_key: self.idempotency_key,
            items: state
                .lines
                .iter()
                .map(|line| NewOrderItem {
                    order_item_id: OrderItemId::new(),
                    product_id: line.product_id,
                    quantity: line.quantity,
                })
                .collect(),
        }))
    }
}

/// Runs the whole checkout in one transaction. Nothing is written on failure.
pub async fn place_order(
    pool: &PgPool,
    command: &PlaceOrderCommand,
) -> Result<CheckoutChange, ClientError> {
    let mut tx = pool
        .begin()
        .await
        .context("Problem starting checkout transaction.")?;

    lock_cart(&mut tx, &command.user_id).await?;
    let existing_order = match command.idempotency_key {
        Some(key) => find_by_idempotency_key(&mut tx, &command.user_id, key).await?,
        None => None,
    };
    let lines = list_lines(&mut tx, &command.user_id).await?;

    let change = command.process(&CheckoutState {
        lines,
        existing_order,
    })?;

    if let CheckoutChange::Place(order) = &change {
        insert_order(&mut tx, order).await?;
        clear_cart(&mut tx, &order.user_id).await?;
        tx.commit()
            .await
            .context("Problem committing checkout transaction.")?;
    }

    Ok(change)
}

//--------------------------- SQL -------------------------------

async fn lock_cart(conn: &mut PgConnection, user_id: &UserId) -> Result<(), anyhow::Error> {
    sqlx::query("SELECT product_id FROM cart_lines WHERE user_id = $1 FOR UPDATE")
        .bind(user_id)
        .fetch_all(&mut *conn)
        .await
        .with_context(|| format!("Problem locking cart of {user_id}."))?;
    Ok(())
}

async fn find_by_idempotency_key(
    conn: &mut PgConnection,
    user_id: &UserId,
    key: Uuid,
) -> Result<Option<OrderId>, anyhow::Error> {
    sqlx::query_scalar::<_, OrderId>(
        "SELECT order_id FROM orders WHERE user_id = $1 AND idempotency_key = $2",
    )
    .bind(user_id)
    .bind(key)
    .fetch_optional(&mut *conn)
    .await
    .with_context(|| format!("Problem in find_by_idempotency_key(user: {user_id}, key: {key})."))
}

async fn insert_order(conn: &mut PgConnection, order: &NewOrder) -> Result<(), anyhow::Error> {
    sqlx::query(
        r#"INSERT INTO orders
               (order_id, user_id, payment_method, status, coupon_code, discount, shipping,
                idempotency_key)
           VALUES ($1, $2, $3, $4, $5, $6, $7, $8)"#,
    )
    .bind(order.order_id)
    .bind(order.user_id)
    .bind(&order.payment_method)
    .bind(OrderStatus::Pending.to_string())
    .bind(&order.coupon_code)
    .bind(order.discount)
    .bind(order.shipping)
    .bind(order.idempotency_key)
    .execute(&mut *conn)
    .await
    .with_context(|| format!("Problem inserting order {}.", order.order_id))?;

    for item in &order.items {
        sqlx::query(
            r#"INSERT INTO order_items (order_item_id, order_id, product_id, quantity)
               VALUES ($1, $2, $3, $4)"#,
        )
        .bind(item.order_item_id)
        .bind(order.order_id)
        .bind(item.product_id)
        .bind(item.quantity)
        .execute(&mut *conn)
        .await
        .with_context(|| format!("Problem inserting items of order {}.", order.order_id))?;
    }
    Ok(())
}

async fn clear_cart(conn: &mut PgConnection, user_id: &UserId) -> Result<(), anyhow::Error> {
    sqlx::query("DELETE FROM cart_lines WHERE user_id = $1")
        .bind(user_id)
        .execute(&mut *conn)
        .await
        .with_context(|| format!("Problem clearing cart of {user_id}."))?;
    Ok(())
}

//-------------------------- Tests -------------------------------
