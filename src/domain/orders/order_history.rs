//! Order read models.
//!
//! Order items keep only the product reference and quantity; names and prices are read
//! live from the catalog, while the discount and shipping captured at checkout come from
//! the order itself.

use std::collections::HashMap;

use anyhow::Context;
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{
    OrderId, ProductId, UserId,
    cart::pricing::{Priced, Totals, display, subtotal},
};

use super::OrderStatus;

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct OrderLine {
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub quantity: i32,
}

impl Priced for OrderLine {
    fn unit_price(&self) -> Decimal {
        self.price
    }

    fn quantity(&self) -> i32 {
        self.quantity
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub order_id: OrderId,
    pub user_id: UserId,
    pub username: String,
    pub payment_method: String,
    pub status: OrderStatus,
    pub coupon_code: Option<String>,
    pub created_at: jiff::Timestamp,
    pub lines: Vec<OrderLine>,
    pub totals: Totals,
}

/// An order as listed to clients and staff, amounts rounded to cents.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderView {
    pub order_id: OrderId,
    pub username: String,
    pub payment_method: String,
    pub status: OrderStatus,
    pub coupon_code: Option<String>,
    pub created_at: jiff::Timestamp,
    pub lines: Vec<OrderLineView>,
    pub totals: Totals,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderLineView {
    pub product_id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub quantity: i32,
    pub line_total: Decimal,
}

impl From<&Order> for OrderView {
    fn from(order: &Order) -> Self {
        Self {
            order_id: order.order_id,
            username: order.username.clone(),
            payment_method: order.payment_method.clone(),
            status: order.status,
            coupon_code: order.coupon_code.clone(),
            created_at: order.created_at,
            lines: order
                .lines
                .iter()
                .map(|line| OrderLineView {
                    product_id: line.product_id,
                    name: line.name.clone(),
                    price: display(line.price),
                    quantity: line.quantity,
                    line_total: display(line.line_total()),
                })
                .collect(),
            totals: order.totals.rounded(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OrderCounts {
    pub total: i64,
    pub pending: i64,
}

#[derive(sqlx::FromRow)]
struct OrderRow {
    order_id: OrderId,
    user_id: UserId,
    username: String,
    payment_method: String,
    #[sqlx(try_from = "String")]
    status: OrderStatus,
    coupon_code: Option<String>,
    discount: Decimal,
    shipping: Decimal,
    created_at: jiff_sqlx::Timestamp,
}

impl OrderRow {
    fn into_order(self, lines: Vec<OrderLine>) -> Order {
        let totals = Totals::new(subtotal(&lines), self.discount, self.shipping);
        Order {
            order_id: self.order_id,
            user_id: self.user_id,
            username: self.username,
            payment_method: self.payment_method,
            status: self.status,
            coupon_code: self.coupon_code,
            created_at: self.created_at.to_jiff(),
            lines,
            totals,
        }
    }
}

//--------------------------- SQL -------------------------------

const ORDER_SELECT: &str = r#"SELECT o.order_id, o.user_id, u.username, o.payment_method, o.status,
                                    o.coupon_code, o.discount, o.shipping, o.created_at
                             FROM orders o
                             JOIN users u ON u.user_id = o.user_id"#;

/// Orders of one user, newest first.
pub async fn orders_for_user(pool: &PgPool, user_id: &UserId) -> Result<Vec<Order>, anyhow::Error> {
    let rows = sqlx::query_as::<_, OrderRow>(&format!(
        "{ORDER_SELECT} WHERE o.user_id = $1 ORDER BY o.created_at DESC, o.order_id DESC"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await
    .with_context(|| format!("Problem in orders_for_user({user_id})."))?;

    attach_lines(pool, rows).await
}

/// Every order, newest first.
pub async fn all_orders(pool: &PgPool) -> Result<Vec<Order>, anyhow::Error> {
    let rows = sqlx::query_as::<_, OrderRow>(&format!(
        "{ORDER_SELECT} ORDER BY o.created_at DESC, o.order_id DESC"
    ))
    .fetch_all(pool)
    .await
    .context("Problem in all_orders.")?;

    attach_lines(pool, rows).await
}

/// Finds an order only if it belongs to `user_id`.
pub async fn find_owned_order(
    pool: &PgPool,
    order_id: &OrderId,
    user_id: &UserId,
) -> Result<Option<Order>, anyhow::Error> {
    let row = sqlx::query_as::<_, OrderRow>(&format!(
        "{ORDER_SELECT} WHERE o.order_id = $1 AND o.user_id = $2"
    ))
    .bind(order_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await
    .with_context(|| format!("Problem in find_owned_order({order_id})."))?;

    let Some(row) = row else {
        return Ok(None);
    };
    Ok(attach_lines(pool, vec![row]).await?.pop())
}

pub async fn order_counts(pool: &PgPool) -> Result<OrderCounts, anyhow::Error> {
    let (total, pending) = sqlx::query_as::<_, (i64, i64)>(
        r#"SELECT count(*), count(*) FILTER (WHERE status = 'Pending')
           FROM orders"#,
    )
    .fetch_one(pool)
    .await
    .context("Problem in order_counts.")?;

    Ok(OrderCounts { total, pending })
}

async fn attach_lines(pool: &PgPool, rows: Vec<OrderRow>) -> Result<Vec<Order>, anyhow::Error> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }
    let order_ids: Vec<Uuid> = rows.iter().map(|row| Uuid::from(row.order_id)).collect();

    let lines = sqlx::query_as::<_, OrderLine>(
        r#"SELECT i.order_id, p.product_id, p.name, p.price, i.quantity
           FROM order_items i
           JOIN products p ON p.product_id = i.product_id
           WHERE i.order_id = ANY($1)
           ORDER BY p.name, i.order_item_id"#,
    )
    .bind(&order_ids)
    .fetch_all(pool)
    .await
    .context("Problem loading order lines.")?;

    let mut by_order: HashMap<OrderId, Vec<OrderLine>> = HashMap::new();
    for line in lines {
        by_order.entry(line.order_id).or_default().push(line);
    }

    Ok(rows
        .into_iter()
        .map(|row| {
            let lines = by_order.remove(&row.order_id).unwrap_or_default();
            row.into_order(lines)
        })
        .collect())
}
