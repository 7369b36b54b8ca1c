//! Cookie-keyed, in-memory session state.
//!
//! The cookie carries only an opaque id; everything else (who is logged in and
//! the application in progress) lives server-side in [`SessionStore`].

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::debug;
use uuid::Uuid;

use crate::applications::PendingApplication;
use crate::errors::AppError;
use crate::state::AppState;

pub const SESSION_COOKIE: &str = "sid";

#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: i64,
    pub username: String,
    pub is_admin: bool,
    /// Set by `/apply`, consumed by the quiz submission.
    pub pending: Option<PendingApplication>,
}

struct Entry {
    session: Session,
    last_seen: Instant,
}

/// Sessions idle for longer than the TTL are dropped.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<Uuid, Entry>>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::default(),
            ttl,
        }
    }

    /// Sweeps expired sessions, then stores `session` under a fresh id.
    pub async fn create(&self, session: Session) -> Uuid {
        let id = Uuid::new_v4();
        let now = Instant::now();
        let mut sessions = self.inner.write().await;

        let before = sessions.len();
        sessions.retain(|_, entry| now.duration_since(entry.last_seen) <= self.ttl);
        if sessions.len() < before {
            debug!("Swept {} expired sessions", before - sessions.len());
        }

        sessions.insert(
            id,
            Entry {
                session,
                last_seen: now,
            },
        );
        id
    }

    /// Live session for `id`; each hit extends its lifetime.
    pub async fn get(&self, id: Uuid) -> Option<Session> {
        let now = Instant::now();
        let mut sessions = self.inner.write().await;
        let entry = sessions.get_mut(&id)?;
        if now.duration_since(entry.last_seen) > self.ttl {
            sessions.remove(&id);
            return None;
        }
        entry.last_seen = now;
        Some(entry.session.clone())
    }

    pub async fn remove(&self, id: Uuid) -> Option<Session> {
        self.inner.write().await.remove(&id).map(|entry| entry.session)
    }

    pub async fn set_pending(&self, id: Uuid, pending: PendingApplication) -> Result<(), AppError> {
        let mut sessions = self.inner.write().await;
        let entry = sessions
            .get_mut(&id)
            .ok_or_else(|| AppError::Unauthorized("Session expired".into()))?;
        entry.session.pending = Some(pending);
        Ok(())
    }

    /// Removes and returns the pending application, so two concurrent
    /// submissions cannot both claim it.
    pub async fn take_pending(&self, id: Uuid) -> Option<PendingApplication> {
        self.inner
            .write()
            .await
            .get_mut(&id)
            .and_then(|entry| entry.session.pending.take())
    }

    /// Puts a pending application back after a submission failed before persisting.
    pub async fn restore_pending(&self, id: Uuid, pending: PendingApplication) {
        if let Some(entry) = self.inner.write().await.get_mut(&id) {
            entry.session.pending.get_or_insert(pending);
        }
    }
}

pub fn session_cookie(id: Uuid) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, id.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

pub fn removal_cookie() -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE).path("/").build()
}

/// Extractor for a logged-in session. Rejects with 401 when absent.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub id: Uuid,
    pub session: Session,
}

impl AuthSession {
    /// Candidate-only routes.
    pub fn require_candidate(&self) -> Result<(), AppError> {
        if self.session.is_admin {
            return Err(AppError::Forbidden);
        }
        Ok(())
    }

    pub fn require_admin(&self) -> Result<(), AppError> {
        if !self.session.is_admin {
            return Err(AppError::Forbidden);
        }
        Ok(())
    }
}

/// Resolves the session referenced by the request's cookie, if any.
pub async fn lookup(parts: &Parts, sessions: &SessionStore) -> Option<AuthSession> {
    let jar = CookieJar::from_headers(&parts.headers);
    let id = jar
        .get(SESSION_COOKIE)
        .and_then(|c| Uuid::parse_str(c.value()).ok())?;
    let session = sessions.get(id).await?;
    Some(AuthSession { id, session })
}

#[async_trait]
impl FromRequestParts<AppState> for AuthSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        lookup(parts, &state.sessions)
            .await
            .ok_or_else(|| AppError::Unauthorized("Login required".into()))
    }
}

/// Like [`AuthSession`] but never rejects.
#[derive(Debug, Clone)]
pub struct MaybeSession(pub Option<AuthSession>);

#[async_trait]
impl FromRequestParts<AppState> for MaybeSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(MaybeSession(lookup(parts, &state.sessions).await))
    }
}
