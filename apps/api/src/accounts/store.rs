use anyhow::Result;
use sqlx::SqlitePool;
use tracing::info;

use crate::accounts::password::{hash_password, verify_password};
use crate::errors::AppError;
use crate::models::user::UserRow;

/// Inserts a new non-admin user. A taken username is a `Conflict`.
pub async fn create_user(
    pool: &SqlitePool,
    username: &str,
    password: &str,
    is_admin: bool,
) -> Result<UserRow, AppError> {
    let password_hash = hash_password(password)?;
    let inserted = sqlx::query_as::<_, UserRow>(
        "INSERT INTO users (username, password_hash, is_admin) VALUES (?, ?, ?) RETURNING *",
    )
    .bind(username)
    .bind(&password_hash)
    .bind(is_admin)
    .fetch_one(pool)
    .await;

    match inserted {
        Ok(user) => Ok(user),
        Err(e) if AppError::is_unique_violation(&e) => {
            Err(AppError::Conflict("Username already exists!".into()))
        }
        Err(e) => Err(AppError::Database(e)),
    }
}

pub async fn find_by_username(pool: &SqlitePool, username: &str) -> Result<Option<UserRow>, sqlx::Error> {
    sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE username = ?")
        .bind(username)
        .fetch_optional(pool)
        .await
}

/// Returns the user only when the password matches.
pub async fn authenticate(
    pool: &SqlitePool,
    username: &str,
    password: &str,
) -> Result<Option<UserRow>, sqlx::Error> {
    Ok(find_by_username(pool, username)
        .await?
        .filter(|user| verify_password(password, &user.password_hash)))
}

/// Creates the configured admin account on first start.
pub async fn seed_admin(pool: &SqlitePool, username: &str, password: &str) -> Result<()> {
    if find_by_username(pool, username).await?.is_some() {
        return Ok(());
    }
    match create_user(pool, username, password, true).await {
        Ok(_) => {
            info!("Seeded admin user '{username}'");
            Ok(())
        }
        // Another process seeded it between the check and the insert.
        Err(AppError::Conflict(_)) => Ok(()),
        Err(e) => Err(anyhow::anyhow!("Failed to seed admin user: {e}")),
    }
}
