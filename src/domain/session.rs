//! Per-browser-session shopping context.
//!
//! Everything the storefront remembers between requests without persisting it in its own
//! tables lives here: the signed-in identity, the recently viewed products and the coupon
//! applied to the cart. Handlers take a [`ShopSession`] and pass the values they need into
//! the pricing and catalog functions explicitly.

use axum::{extract::FromRequestParts, http::request::Parts};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tower_sessions::{Session, session};

use super::{ProductId, accounts::CurrentUser};

pub mod keys {
    pub const CURRENT_USER: &str = "current_user";
    pub const RECENTLY_VIEWED: &str = "recently_viewed";
    pub const COUPON_CODE: &str = "coupon_code";
    pub const COUPON_DISCOUNT: &str = "coupon_discount";
}

pub const RECENTLY_VIEWED_LIMIT: usize = 6;

/// Most-recent-first list of viewed products without duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentlyViewed(Vec<ProductId>);

impl RecentlyViewed {
    pub fn record(&mut self, product_id: ProductId) {
        self.0.retain(|viewed| *viewed != product_id);
        self.0.insert(0, product_id);
        self.0.truncate(RECENTLY_VIEWED_LIMIT);
    }

    pub fn ids(&self) -> &[ProductId] {
        &self.0
    }
}

/// The coupon currently applied to the cart. The default value means "no coupon".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedCoupon {
    pub code: String,
    pub discount: Decimal,
}

impl AppliedCoupon {
    pub fn new(code: impl Into<String>, discount: Decimal) -> Self {
        Self {
            code: code.into(),
            discount,
        }
    }

    /// The stored code, or `None` when no coupon is applied.
    pub fn code(&self) -> Option<&str> {
        (!self.code.is_empty()).then_some(self.code.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct ShopSession {
    session: Session,
}

impl ShopSession {
    pub fn new(session: Session) -> Self {
        Self { session }
    }

    pub async fn current_user(&self) -> Result<Option<CurrentUser>, session::Error> {
        self.session.get(keys::CURRENT_USER).await
    }

    /// Stores the identity under a fresh session id.
    pub async fn sign_in(&self, user: &CurrentUser) -> Result<(), session::Error> {
        self.session.cycle_id().await?;
        self.session.insert(keys::CURRENT_USER, user).await
    }

    pub async fn sign_out(&self) -> Result<(), session::Error> {
        self.session.flush().await
    }

    pub async fn recently_viewed(&self) -> Result<RecentlyViewed, session::Error> {
        Ok(self
            .session
            .get(keys::RECENTLY_VIEWED)
            .await?
            .unwrap_or_default())
    }

    pub async fn record_view(&self, product_id: ProductId) -> Result<RecentlyViewed, session::Error> {
        let mut recently_viewed = self.recently_viewed().await?;
        recently_viewed.record(product_id);
        self.session
            .insert(keys::RECENTLY_VIEWED, &recently_viewed)
            .await?;
        Ok(recently_viewed)
    }

    pub async fn coupon(&self) -> Result<AppliedCoupon, session::Error> {
        let code: Option<String> = self.session.get(keys::COUPON_CODE).await?;
        let discount: Option<Decimal> = self.session.get(keys::COUPON_DISCOUNT).await?;
        Ok(AppliedCoupon {
            code: code.unwrap_or_default(),
            discount: discount.unwrap_or_default(),
        })
    }

    pub async fn set_coupon(&self, coupon: &AppliedCoupon) -> Result<(), session::Error> {
        self.session.insert(keys::COUPON_CODE, &coupon.code).await?;
        self.session
            .insert(keys::COUPON_DISCOUNT, coupon.discount)
            .await
    }

    pub async fn clear_coupon(&self) -> Result<(), session::Error> {
        self.set_coupon(&AppliedCoupon::default()).await
    }
}

impl<S> FromRequestParts<S> for ShopSession
where
    S: Send + Sync,
{
    type Rejection = <Session as FromRequestParts<S>>::Rejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Session::from_request_parts(parts, state)
            .await
            .map(ShopSession::new)
    }
}
