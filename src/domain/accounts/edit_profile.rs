//! Edit profile slice

use axum::{Json, extract::State, response::Redirect};
use serde::Serialize;
use sqlx::PgPool;
use tracing::info;

use crate::{
    domain::{ShopSession, UserId},
    infra::ClientError,
};

use super::{
    AccountError, Authenticated, CurrentUser, Role,
    register::{validate_email, validate_username},
    users::{find_by_id, update_profile},
};

//------------------------- Web API ----------------------------

#[derive(Debug, Serialize)]
pub struct ProfileView {
    pub username: String,
    pub email: String,
    pub role: Role,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct EditProfilePayload {
    pub username: String,
    pub email: String,
}

pub async fn edit_profile_page(
    State(pool): State<PgPool>,
    Authenticated(user): Authenticated,
) -> Result<Json<ProfileView>, ClientError> {
    let profile = find_by_id(&pool, &user.user_id)
        .await?
        .ok_or(AccountError::UserDoesNotExist(user.user_id))?;

    Ok(Json(ProfileView {
        username: profile.username,
        email: profile.email,
        role: profile.role,
    }))
}

pub async fn edit_profile_endpoint(
    State(pool): State<PgPool>,
    session: ShopSession,
    Authenticated(user): Authenticated,
    Json(payload): Json<EditProfilePayload>,
) -> Result<Redirect, ClientError> {
    let command = EditProfileCommand::new(user.user_id, payload)?;

    let updated = update_profile(&pool, &command.user_id, &command.username, &command.email)
        .await??;
    info!("User {} updated their profile", updated.username);

    session
        .sign_in(&CurrentUser {
            user_id: updated.user_id,
            username: updated.username,
            role: updated.role,
        })
        .await?;

    Ok(Redirect::to(updated.role.dashboard()))
}

//------------------------- Command ----------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct EditProfileCommand {
    pub user_id: UserId,
    pub username: String,
    pub email: String,
}

impl EditProfileCommand {
    pub fn new(user_id: UserId, payload: EditProfilePayload) -> Result<Self, AccountError> {
        Ok(Self {
            user_id,
            username: validate_username(&payload.username)?,
            email: validate_email(&payload.email)?,
        })
    }
}

//-------------------------- Tests -------------------------------
