//! Register slice

use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use sqlx::PgPool;
use tracing::info;

use crate::{
    domain::{ShopSession, UserId},
    infra::ClientError,
};

use super::{
    AccountError, CurrentUser, FormPage, Role,
    passwords::{hash_password, validate_password},
    users::{NewUser, insert_user},
};

const MAX_USERNAME_LENGTH: usize = 150;

//------------------------- Web API ----------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistrationRole {
    #[default]
    Client,
    Admin,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct RegisterPayload {
    pub username: String,
    pub email: String,
    pub password1: String,
    pub password2: String,
    #[serde(default)]
    pub role: RegistrationRole,
}

pub async fn register_page(session: ShopSession) -> Result<Response, ClientError> {
    if let Some(user) = session.current_user().await? {
        return Ok(Redirect::to(user.role.dashboard()).into_response());
    }
    Ok(Json(FormPage {
        form: "register",
        fields: &["username", "email", "password1", "password2", "role"],
    })
    .into_response())
}

pub async fn register_endpoint(
    State(pool): State<PgPool>,
    session: ShopSession,
    Json(payload): Json<RegisterPayload>,
) -> Result<Redirect, ClientError> {
    let command: RegisterCommand = payload.try_into()?;
    let password_hash = hash_password(&command.password)?;

    let new_user = NewUser {
        user_id: UserId::new(),
        username: command.username.clone(),
        email: command.email,
        password_hash,
        role: command.role,
    };
    let user = insert_user(&pool, &new_user)
        .await?
        .ok_or(AccountError::UsernameTaken(command.username))?;

    info!("Registered {} user {}", user.role, user.username);

    session
        .sign_in(&CurrentUser {
            user_id: user.user_id,
            username: user.username,
            role: user.role,
        })
        .await?;

    Ok(Redirect::to(user.role.dashboard()))
}

//------------------------- Command ----------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct RegisterCommand {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

impl TryFrom<RegisterPayload> for RegisterCommand {
    type Error = AccountError;

    fn try_from(payload: RegisterPayload) -> Result<Self, Self::Error> {
        let username = validate_username(&payload.username)?;
        let email = validate_email(&payload.email)?;
        validate_password(&payload.password1, &payload.password2)?;
        let role = match payload.role {
            RegistrationRole::Client => Role::Client,
            RegistrationRole::Admin => Role::Staff,
        };
        Ok(Self {
            username,
            email,
            password: payload.password1,
            role,
        })
    }
}

pub fn validate_username(raw: &str) -> Result<String, AccountError> {
    let username = raw.trim();
    if username.is_empty() {
        return Err(AccountError::Validation("Username is required.".to_owned()));
    }
    if username.chars().count() > MAX_USERNAME_LENGTH {
        return Err(AccountError::Validation(format!(
            "Username must be at most {MAX_USERNAME_LENGTH} characters."
        )));
    }
    if username.chars().any(char::is_whitespace) {
        return Err(AccountError::Validation(
            "Username cannot contain spaces.".to_owned(),
        ));
    }
    Ok(username.to_owned())
}

pub fn validate_email(raw: &str) -> Result<String, AccountError> {
    let email = raw.trim();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain
                    .split_once('.')
                    .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
        }
        None => false,
    };
    if !valid || email.chars().any(char::is_whitespace) {
        return Err(AccountError::Validation(
            "Enter a valid email address.".to_owned(),
        ));
    }
    Ok(email.to_owned())
}

//-------------------------- Tests -------------------------------
