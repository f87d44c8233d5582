//! Login and logout slices

use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use sqlx::PgPool;
use tracing::{info, warn};

use crate::{domain::ShopSession, infra::ClientError};

use super::{AccountError, CurrentUser, FormPage, LOGIN_PATH, passwords::verify_password, users::find_credentials};

//------------------------- Web API ----------------------------

#[derive(Debug, Clone, serde::Deserialize)]
pub struct LoginPayload {
    pub username: String,
    pub password: String,
}

pub async fn login_page(session: ShopSession) -> Result<Response, ClientError> {
    if let Some(user) = session.current_user().await? {
        return Ok(Redirect::to(user.role.dashboard()).into_response());
    }
    Ok(Json(FormPage {
        form: "login",
        fields: &["username", "password"],
    })
    .into_response())
}

pub async fn login_endpoint(
    State(pool): State<PgPool>,
    session: ShopSession,
    Json(payload): Json<LoginPayload>,
) -> Result<Redirect, ClientError> {
    let username = payload.username.trim();
    let Some((user, password_hash)) = find_credentials(&pool, username).await? else {
        warn!("Login attempt for unknown user {username}");
        return Err(AccountError::InvalidCredentials.into());
    };

    if !verify_password(&payload.password, &password_hash) {
        warn!("Login attempt with a wrong password for {username}");
        return Err(AccountError::InvalidCredentials.into());
    }

    session
        .sign_in(&CurrentUser {
            user_id: user.user_id,
            username: user.username,
            role: user.role,
        })
        .await?;
    info!("User {username} signed in");

    Ok(Redirect::to(user.role.dashboard()))
}

pub async fn logout_endpoint(session: ShopSession) -> Result<Redirect, ClientError> {
    session.sign_out().await?;
    Ok(Redirect::to(LOGIN_PATH))
}
