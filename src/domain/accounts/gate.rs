//! Authorization gate.
//!
//! Every gated handler receives the signed-in [`CurrentUser`] through one of the extractors
//! below. The extractor classifies the route into an [`Area`] and asks [`gate`] whether the
//! user's [`Role`] may enter: misrouted page views are redirected to the right dashboard,
//! staff actions requested by clients are denied before the handler runs.

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{
    domain::{ShopSession, UserId},
    infra::ClientError,
};

pub const LOGIN_PATH: &str = "/accounts/login";
pub const CLIENT_DASHBOARD_PATH: &str = "/accounts/client/dashboard";
pub const STAFF_DASHBOARD_PATH: &str = "/accounts/admin/dashboard";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
pub enum Role {
    Client,
    Staff,
}

impl Role {
    pub fn from_staff_flag(is_staff: bool) -> Self {
        if is_staff { Role::Staff } else { Role::Client }
    }

    pub fn is_staff(self) -> bool {
        self == Role::Staff
    }

    pub fn dashboard(self) -> &'static str {
        match self {
            Role::Client => CLIENT_DASHBOARD_PATH,
            Role::Staff => STAFF_DASHBOARD_PATH,
        }
    }
}

/// Identity stored in the session at sign-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub user_id: UserId,
    pub username: String,
    pub role: Role,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Area {
    /// Any signed-in user: catalog, cart, checkout, profile, invoices.
    Shared,
    /// Client dashboard pages.
    ClientPage,
    /// Staff dashboard pages.
    StaffPage,
    /// Staff mutations and listings.
    StaffAction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    Allow,
    Redirect(&'static str),
    Deny,
}

pub fn gate(role: Role, area: Area) -> Gate {
    match (role, area) {
        (Role::Staff, Area::ClientPage) => Gate::Redirect(STAFF_DASHBOARD_PATH),
        (Role::Client, Area::StaffPage) => Gate::Redirect(CLIENT_DASHBOARD_PATH),
        (Role::Client, Area::StaffAction) => Gate::Deny,
        _ => Gate::Allow,
    }
}

#[derive(Debug)]
pub enum GateRejection {
    SignInRequired,
    Misrouted(&'static str),
    Denied,
    Session(ClientError),
}

impl IntoResponse for GateRejection {
    fn into_response(self) -> Response {
        match self {
            GateRejection::SignInRequired => ClientError::Unauthenticated.into_response(),
            GateRejection::Misrouted(path) => Redirect::to(path).into_response(),
            GateRejection::Denied => ClientError::Forbidden.into_response(),
            GateRejection::Session(client_error) => client_error.into_response(),
        }
    }
}

async fn admit<S>(parts: &mut Parts, state: &S, area: Area) -> Result<CurrentUser, GateRejection>
where
    S: Send + Sync,
{
    let session = ShopSession::from_request_parts(parts, state)
        .await
        .map_err(|(_, message)| {
            GateRejection::Session(ClientError::Internal(anyhow::anyhow!(message)))
        })?;

    let user = session
        .current_user()
        .await
        .map_err(|e| GateRejection::Session(e.into()))?
        .ok_or(GateRejection::SignInRequired)?;

    match gate(user.role, area) {
        Gate::Allow => Ok(user),
        Gate::Redirect(path) => Err(GateRejection::Misrouted(path)),
        Gate::Deny => {
            warn!("User {} denied access to {}", user.username, parts.uri);
            Err(GateRejection::Denied)
        }
    }
}

macro_rules! gated_extractor {
    ($(#[$meta:meta])* $name:ident, $area:expr) => {
        $(#[$meta])*
        pub struct $name(pub CurrentUser);

        impl<S> FromRequestParts<S> for $name
        where
            S: Send + Sync,
        {
            type Rejection = GateRejection;

            async fn from_request_parts(
                parts: &mut Parts,
                state: &S,
            ) -> Result<Self, Self::Rejection> {
                admit(parts, state, $area).await.map($name)
            }
        }
    };
}

gated_extractor!(
    /// Any signed-in user.
    Authenticated,
    Area::Shared
);
gated_extractor!(
    /// Client pages. Staff are redirected to the admin dashboard.
    ClientPage,
    Area::ClientPage
);
gated_extractor!(
    /// Staff pages. Clients are redirected to the client dashboard.
    StaffPage,
    Area::StaffPage
);
gated_extractor!(
    /// Staff mutations and listings. Clients are refused with 403.
    StaffOnly,
    Area::StaffAction
);
