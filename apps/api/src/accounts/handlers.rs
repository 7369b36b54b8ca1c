//! Axum route handlers for accounts.

use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::accounts::store::{authenticate, create_user};
use crate::errors::AppError;
use crate::session::{removal_cookie, session_cookie, MaybeSession, Session};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct WhoAmI {
    pub authenticated: bool,
    pub username: Option<String>,
    pub is_admin: bool,
    /// Where a client should go next.
    pub next: &'static str,
}

#[derive(Debug, Serialize)]
pub struct AccountResponse {
    pub user_id: i64,
    pub username: String,
    pub is_admin: bool,
}

fn landing_for(is_admin: bool) -> &'static str {
    if is_admin {
        "/dashboard"
    } else {
        "/user_dashboard"
    }
}

/// GET /
pub async fn handle_index(MaybeSession(auth): MaybeSession) -> Json<WhoAmI> {
    Json(match auth {
        Some(auth) => WhoAmI {
            authenticated: true,
            username: Some(auth.session.username),
            is_admin: auth.session.is_admin,
            next: landing_for(auth.session.is_admin),
        },
        None => WhoAmI {
            authenticated: false,
            username: None,
            is_admin: false,
            next: "/login",
        },
    })
}

/// POST /register
pub async fn handle_register(
    State(state): State<AppState>,
    Json(req): Json<Credentials>,
) -> Result<(StatusCode, Json<AccountResponse>), AppError> {
    let username = req.username.trim();
    if username.is_empty() || req.password.is_empty() {
        return Err(AppError::Validation(
            "username and password are required".to_string(),
        ));
    }

    let user = create_user(&state.db, username, &req.password, false).await?;
    info!("Registered user '{}' ({})", user.username, user.id);

    Ok((
        StatusCode::CREATED,
        Json(AccountResponse {
            user_id: user.id,
            username: user.username,
            is_admin: user.is_admin,
        }),
    ))
}

/// POST /login
pub async fn handle_login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<Credentials>,
) -> Result<(CookieJar, Json<WhoAmI>), AppError> {
    let user = authenticate(&state.db, req.username.trim(), &req.password)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid credentials!".into()))?;

    let session_id = state
        .sessions
        .create(Session {
            user_id: user.id,
            username: user.username.clone(),
            is_admin: user.is_admin,
            pending: None,
        })
        .await;
    info!("User '{}' logged in", user.username);

    Ok((
        jar.add(session_cookie(session_id)),
        Json(WhoAmI {
            authenticated: true,
            username: Some(user.username),
            is_admin: user.is_admin,
            next: landing_for(user.is_admin),
        }),
    ))
}

/// POST /logout
pub async fn handle_logout(
    State(state): State<AppState>,
    MaybeSession(auth): MaybeSession,
    jar: CookieJar,
) -> (CookieJar, StatusCode) {
    if let Some(auth) = auth {
        state.sessions.remove(auth.id).await;
        info!("User '{}' logged out", auth.session.username);
    }
    (jar.remove(removal_cookie()), StatusCode::NO_CONTENT)
}
