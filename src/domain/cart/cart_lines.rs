//! Cart line store.
//!
//! Every cart mutation is a [`Decision`] over the [`LineState`] of one (user, product) pair.
//! [`decide_line_change`] loads that state inside a transaction, lets the command decide,
//! and persists the resulting [`LineChange`].

use anyhow::Context;
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{PgConnection, PgPool};

use crate::{
    domain::{Decision, ProductId, UserId},
    infra::ClientError,
};

use super::{CartError, pricing::Priced};

pub const CART_PATH: &str = "/shop/cart";

/// A cart line joined with the live product it refers to.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct CartLine {
    pub product_id: ProductId,
    pub name: String,
    pub image: Option<String>,
    pub price: Decimal,
    pub quantity: i32,
}

impl Priced for CartLine {
    fn unit_price(&self) -> Decimal {
        self.price
    }

    fn quantity(&self) -> i32 {
        self.quantity
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineState {
    pub product_exists: bool,
    pub quantity: Option<i32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineChange {
    Insert { quantity: i32 },
    Update { quantity: i32 },
    Delete,
}

/// Runs a cart command against the current line and stores its outcome.
pub async fn decide_line_change<D>(
    pool: &PgPool,
    user_id: &UserId,
    product_id: &ProductId,
    decision: &D,
) -> Result<LineChange, ClientError>
where
    D: Decision<State = LineState, Change = LineChange, Error = CartError>,
{
    let mut tx = pool
        .begin()
        .await
        .context("Problem starting cart transaction.")?;

    let state = load_line_state(&mut tx, user_id, product_id).await?;
    let change = decision.process(&state)?;
    apply_line_change(&mut tx, user_id, product_id, change).await?;

    tx.commit()
        .await
        .context("Problem committing cart transaction.")?;
    Ok(change)
}

//--------------------------- SQL -------------------------------

async fn load_line_state(
    conn: &mut PgConnection,
    user_id: &UserId,
    product_id: &ProductId,
) -> Result<LineState, anyhow::Error> {
    let product_exists =
        sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM products WHERE product_id = $1)")
            .bind(product_id)
            .fetch_one(&mut *conn)
            .await
            .with_context(|| format!("Problem checking product {product_id}."))?;

    let quantity = sqlx::query_scalar::<_, i32>(
        r#"SELECT quantity
           FROM cart_lines
           WHERE user_id = $1 AND product_id = $2
           FOR UPDATE"#,
    )
    .bind(user_id)
    .bind(product_id)
    .fetch_optional(&mut *conn)
    .await
    .with_context(|| format!("Problem in load_line_state(user: {user_id}, product: {product_id})."))?;

    Ok(LineState {
        product_exists,
        quantity,
    })
}

async fn apply_line_change(
    conn: &mut PgConnection,
    user_id: &UserId,
    product_id: &ProductId,
    change: LineChange,
) -> Result<(), anyhow::Error> {
    let query = match change {
        LineChange::Insert { quantity } => sqlx::query(
            r#"INSERT INTO cart_lines (user_id, product_id, quantity)
               VALUES ($1, $2, $3)
               ON CONFLICT (user_id, product_id) DO UPDATE SET quantity = EXCLUDED.quantity"#,
        )
        .bind(user_id)
        .bind(product_id)
        .bind(quantity),
        LineChange::Update { quantity } => sqlx::query(
            "UPDATE cart_lines SET quantity = $3 WHERE user_id = $1 AND product_id = $2",
        )
        .bind(user_id)
        .bind(product_id)
        .bind(quantity),
        LineChange::Delete => {
            sqlx::query("DELETE FROM cart_lines WHERE user_id = $1 AND product_id = $2")
                .bind(user_id)
                .bind(product_id)
        }
    };

    query
        .execute(&mut *conn)
        .await
        .with_context(|| format!("Problem applying {change:?} to cart of {user_id}."))?;
    Ok(())
}

/// The user's cart ordered by product name.
pub async fn list_lines(conn: &mut PgConnection, user_id: &UserId) -> Result<Vec<CartLine>, anyhow::Error> {
    sqlx::query_as::<_, CartLine>(
        r#"SELECT p.product_id, p.name, p.image, p.price, c.quantity
           FROM cart_lines c
           JOIN products p ON p.product_id = c.product_id
           WHERE c.user_id = $1
           ORDER BY p.name, p.product_id"#,
    )
    .bind(user_id)
    .fetch_all(&mut *conn)
    .await
    .with_context(|| format!("Problem in list_lines({user_id})."))
}

//-------------------------- Tests -------------------------------
