//! Review Order slice

use anyhow::Context;
use axum::{
    extract::{Path, State},
    response::Redirect,
};
use sqlx::{PgConnection, PgPool};
use tracing::info;
use uuid::Uuid;

use crate::{
    domain::{Decision, OrderId, accounts::StaffOnly},
    infra::ClientError,
};

use super::{ADMIN_ORDERS_PATH, OrderError, OrderStatus};

//------------------------- Web API ----------------------------

pub async fn accept_order_endpoint(
    State(pool): State<PgPool>,
    StaffOnly(user): StaffOnly,
    Path(order_uuid): Path<Uuid>,
) -> Result<Redirect, ClientError> {
    review(&pool, &user.username, order_uuid, Verdict::Accept).await
}

pub async fn reject_order_endpoint(
    State(pool): State<PgPool>,
    StaffOnly(user): StaffOnly,
    Path(order_uuid): Path<Uuid>,
) -> Result<Redirect, ClientError> {
    review(&pool, &user.username, order_uuid, Verdict::Reject).await
}

async fn review(
    pool: &PgPool,
    reviewer: &str,
    order_uuid: Uuid,
    verdict: Verdict,
) -> Result<Redirect, ClientError> {
    let command = ReviewOrderCommand {
        order_id: order_uuid.try_into()?,
        verdict,
    };
    let status = review_order(pool, &command).await?;
    info!("{reviewer} marked order {} as {status}", command.order_id);
    Ok(Redirect::to(ADMIN_ORDERS_PATH))
}

//------------------------- Command ----------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accept,
    Reject,
}

#[derive(Debug, Clone)]
pub struct ReviewOrderCommand {
    pub order_id: OrderId,
    pub verdict: Verdict,
}

impl Decision for ReviewOrderCommand {
    /// Current status, `None` when the order does not exist.
    type State = Option<OrderStatus>;
    type Change = OrderStatus;
    type Error = OrderError;

    fn process(&self, state: &Option<OrderStatus>) -> Result<OrderStatus, OrderError> {
        match state {
            None => Err(OrderError::OrderDoesNotExist(self.order_id)),
            Some(OrderStatus::Pending) => Ok(match self.verdict {
                Verdict::Accept => OrderStatus::Accepted,
                Verdict::Reject => OrderStatus::Rejected,
            }),
            Some(status) => Err(OrderError::AlreadyReviewed {
                order_id: self.order_id,
                status: *status,
            }),
        }
    }
}

pub async fn review_order(
    pool: &PgPool,
    command: &ReviewOrderCommand,
) -> Result<OrderStatus, ClientError> {
    let mut tx = pool
        .begin()
        .await
        .context("Problem starting review transaction.")?;

    let current = lock_status(&mut tx, &command.order_id).await?;
    let status = command.process(&current)?;
    update_status(&mut tx, &command.order_id, status).await?;

    tx.commit()
        .await
        .context("Problem committing review transaction.")?;
    Ok(status)
}

//--------------------------- SQL -------------------------------

async fn lock_status(
    conn: &mut PgConnection,
    order_id: &OrderId,
) -> Result<Option<OrderStatus>, anyhow::Error> {
    let status = sqlx::query_scalar::<_, String>(
        "SELECT status FROM orders WHERE order_id = $1 FOR UPDATE",
    )
    .bind(order_id)
    .fetch_optional(&mut *conn)
    .await
    .with_context(|| format!("Problem in lock_status({order_id})."))?;

    status.map(|status| status.parse()).transpose().map_err(anyhow::Error::new)
}

async fn update_status(
    conn: &mut PgConnection,
    order_id: &OrderId,
    status: OrderStatus,
) -> Result<(), anyhow::Error> {
    sqlx::query("UPDATE orders SET status = $2 WHERE order_id = $1")
        .bind(order_id)
        .bind(status.to_string())
        .execute(&mut *conn)
        .await
        .with_context(|| format!("Problem in update_status({order_id}, {status})."))?;
    Ok(())
}

//-------------------------- Tests -------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::helpers::harness::TestHarness;

    fn command(verdict: Verdict) -> ReviewOrderCommand {
        ReviewOrderCommand {
            order_id: OrderId::new(),
            verdict,
        }
    }

    #[test]
    fn pending_order_can_be_accepted() {
        TestHarness::given(Some(OrderStatus::Pending))
            .when(command(Verdict::Accept))
            .then(OrderStatus::Accepted);
    }

    #[test]
    fn pending_order_can_be_rejected() {
        TestHarness::given(Some(OrderStatus::Pending))
            .when(command(Verdict::Reject))
            .then(OrderStatus::Rejected);
    }

    #[test]
    fn reviewed_order_cannot_be_reviewed_again() {
        let command = command(Verdict::Reject);
        let order_id = command.order_id;
        TestHarness::given(Some(OrderStatus::Accepted))
            .when(command)
            .then_err(OrderError::AlreadyReviewed {
                order_id,
                status: OrderStatus::Accepted,
            });
    }

    #[test]
    fn unknown_order_is_not_found() {
        let command = command(Verdict::Accept);
        let order_id = command.order_id;
        TestHarness::given(None)
            .when(command)
            .then_err(OrderError::OrderDoesNotExist(order_id));
    }
}
