//! User store.

use anyhow::Context;
use serde::Serialize;
use sqlx::PgPool;

use crate::domain::UserId;

use super::{AccountError, Role};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub user_id: UserId,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub created_at: jiff::Timestamp,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub user_id: UserId,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

#[derive(sqlx::FromRow)]
struct UserRow {
    user_id: UserId,
    username: String,
    email: String,
    is_staff: bool,
    created_at: jiff_sqlx::Timestamp,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            user_id: row.user_id,
            username: row.username,
            email: row.email,
            role: Role::from_staff_flag(row.is_staff),
            created_at: row.created_at.to_jiff(),
        }
    }
}

//--------------------------- SQL -------------------------------

/// Returns `None` when the username is already taken.
pub async fn insert_user(pool: &PgPool, new_user: &NewUser) -> Result<Option<User>, anyhow::Error> {
    let row = sqlx::query_as::<_, UserRow>(
        r#"INSERT INTO users (user_id, username, email, password_hash, is_staff)
           VALUES ($1, $2, $3, $4, $5)
           ON CONFLICT (username) DO NOTHING
           RETURNING user_id, username, email, is_staff, created_at"#,
    )
    .bind(new_user.user_id)
    .bind(&new_user.username)
    .bind(&new_user.email)
    .bind(&new_user.password_hash)
    .bind(new_user.role.is_staff())
    .fetch_optional(pool)
    .await
    .with_context(|| format!("Problem in insert_user(username: {}).", new_user.username))?;

    Ok(row.map(Into::into))
}

/// Finds a user together with their password hash.
pub async fn find_credentials(
    pool: &PgPool,
    username: &str,
) -> Result<Option<(User, String)>, anyhow::Error> {
    #[derive(sqlx::FromRow)]
    struct CredentialsRow {
        #[sqlx(flatten)]
        user: UserRow,
        password_hash: String,
    }

    let row = sqlx::query_as::<_, CredentialsRow>(
        r#"SELECT user_id, username, email, is_staff, created_at, password_hash
           FROM users
           WHERE username = $1"#,
    )
    .bind(username)
    .fetch_optional(pool)
    .await
    .with_context(|| format!("Problem in find_credentials(username: {username})."))?;

    Ok(row.map(|row| (row.user.into(), row.password_hash)))
}

pub async fn find_by_id(pool: &PgPool, user_id: &UserId) -> Result<Option<User>, anyhow::Error> {
    let row = sqlx::query_as::<_, UserRow>(
        r#"SELECT user_id, username, email, is_staff, created_at
           FROM users
           WHERE user_id = $1"#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await
    .with_context(|| format!("Problem in find_by_id({user_id})."))?;

    Ok(row.map(Into::into))
}

pub async fn update_profile(
    pool: &PgPool,
    user_id: &UserId,
    username: &str,
    email: &str,
) -> Result<Result<User, AccountError>, anyhow::Error> {
    let result = sqlx::query_as::<_, UserRow>(
        r#"UPDATE users
           SET username = $2, email = $3
           WHERE user_id = $1
           RETURNING user_id, username, email, is_staff, created_at"#,
    )
    .bind(user_id)
    .bind(username)
    .bind(email)
    .fetch_optional(pool)
    .await;

    match result {
        Ok(Some(row)) => Ok(Ok(row.into())),
        Ok(None) => Ok(Err(AccountError::UserDoesNotExist(*user_id))),
        Err(sqlx::Error::Database(db_error)) if db_error.is_unique_violation() => {
            Ok(Err(AccountError::UsernameTaken(username.to_owned())))
        }
        Err(e) => Err(anyhow::Error::new(e)
            .context(format!("Problem in update_profile(user_id: {user_id})."))),
    }
}

pub async fn list_users(pool: &PgPool) -> Result<Vec<User>, anyhow::Error> {
    let rows = sqlx::query_as::<_, UserRow>(
        r#"SELECT user_id, username, email, is_staff, created_at
           FROM users
           ORDER BY username"#,
    )
    .fetch_all(pool)
    .await
    .context("Problem in list_users.")?;

    Ok(rows.into_iter().map(Into::into).collect())
}

pub async fn count_users(pool: &PgPool) -> Result<i64, anyhow::Error> {
    sqlx::query_scalar::<_, i64>("SELECT count(*) FROM users")
        .fetch_one(pool)
        .await
        .context("Problem in count_users.")
}

//-------------------------- Tests -------------------------------
