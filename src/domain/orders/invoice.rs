//! Invoice slice

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::{
    domain::{OrderId, accounts::Authenticated, cart::pricing::Priced},
    infra::ClientError,
};

use super::{
    OrderError,
    invoice_renderer::{InvoiceLine, InvoiceRecord, InvoiceRenderer},
    order_history::{Order, find_owned_order},
};

pub async fn invoice_endpoint(
    State(pool): State<PgPool>,
    State(renderer): State<Arc<dyn InvoiceRenderer>>,
    Authenticated(user): Authenticated,
    Path(order_uuid): Path<Uuid>,
) -> Result<impl IntoResponse, ClientError> {
    let order_id: OrderId = order_uuid.try_into()?;
    // Orders of other users are reported as missing.
    let order = find_owned_order(&pool, &order_id, &user.user_id)
        .await?
        .ok_or(OrderError::OrderDoesNotExist(order_id))?;

    let pdf = renderer.render(&InvoiceRecord::from(&order))?;
    info!("{} downloaded the invoice of order {order_id}", user.username);

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_owned()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"invoice_{order_id}.pdf\""),
            ),
        ],
        pdf,
    ))
}

impl From<&Order> for InvoiceRecord {
    fn from(order: &Order) -> Self {
        Self {
            order_id: order.order_id,
            username: order.username.clone(),
            lines: order
                .lines
                .iter()
                .map(|line| InvoiceLine {
                    product_name: line.name.clone(),
                    quantity: line.quantity,
                    subtotal: line.line_total(),
                })
                .collect(),
            grand_total: order.totals.grand_total,
        }
    }
}
