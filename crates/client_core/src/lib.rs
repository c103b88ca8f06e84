//! Client-side session management for the developer portal.
//!
//! [`SessionClient`] is the single source of truth for "who is logged in":
//! it owns the bearer token and the cached [`UserIdentity`], persists the
//! token across restarts through a pluggable [`TokenStore`], and exposes the
//! login/register/logout/profile operations every portal screen gates on.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use shared::{
    domain::Role,
    protocol::{AuthResponse, LoginRequest, ProfileUpdateRequest, RegisterRequest, UserIdentity},
};
use tokio::sync::broadcast;
use tracing::{debug, warn};
use url::Url;

pub mod error;
pub mod token;
pub mod transport;
pub mod types;

pub use error::SessionError;
pub use types::{SessionEvent, SessionPhase, SessionSnapshot};

use transport::RestTransport;

/// Durable slot for the persisted bearer token. The session client is the
/// only writer; implementations hold exactly one token.
#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn load_token(&self) -> Result<Option<String>>;
    async fn save_token(&self, token: &str) -> Result<()>;
    async fn clear_token(&self) -> Result<()>;
}

struct SessionState {
    phase: SessionPhase,
    user: Option<UserIdentity>,
    token: Option<String>,
}

impl SessionState {
    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            phase: self.phase,
            user: self.user.clone(),
        }
    }
}

pub struct SessionClient {
    transport: RestTransport,
    token_store: Arc<dyn TokenStore>,
    // Guards in-memory session state. Never held across an await: every
    // operation reads state, performs at most one network call, then applies
    // the result atomically.
    inner: Mutex<SessionState>,
    events: broadcast::Sender<SessionEvent>,
}

impl SessionClient {
    pub fn new(base_url: Url, token_store: Arc<dyn TokenStore>) -> Arc<Self> {
        let (events, _) = broadcast::channel(64);
        Arc::new(Self {
            transport: RestTransport::new(base_url),
            token_store,
            inner: Mutex::new(SessionState {
                phase: SessionPhase::Uninitialized,
                user: None,
                token: None,
            }),
            events,
        })
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Restores a persisted session, once, at startup.
    ///
    /// A missing token leaves the session empty. A token whose expiry claim
    /// is already past (or that cannot be decoded at all) is discarded
    /// without a network call. A live-looking token is held provisionally
    /// while the profile is fetched; any fetch failure degrades to signed-out
    /// rather than surfacing an error. Calling this again after the first
    /// completion is a no-op returning the current snapshot.
    pub async fn restore(&self) -> SessionSnapshot {
        {
            let mut guard = self.inner.lock();
            if guard.phase != SessionPhase::Uninitialized {
                return guard.snapshot();
            }
            guard.phase = SessionPhase::Restoring;
        }

        let stored = match self.token_store.load_token().await {
            Ok(stored) => stored,
            Err(err) => {
                warn!("token store read failed during restore: {err:#}");
                None
            }
        };

        let Some(token) = stored else {
            return self.finish_restore(None, None).await;
        };

        if !token::is_live(&token, Utc::now()) {
            debug!("discarding expired or undecodable persisted token");
            self.clear_persisted_token().await;
            return self.finish_restore(None, None).await;
        }

        match self
            .transport
            .get_json::<UserIdentity>("/auth/me", Some(&token))
            .await
        {
            Ok(user) => self.finish_restore(Some(user), Some(token)).await,
            Err(err) => {
                debug!("persisted token rejected during restore: {err}");
                self.clear_persisted_token().await;
                self.finish_restore(None, None).await
            }
        }
    }

    async fn finish_restore(
        &self,
        user: Option<UserIdentity>,
        token: Option<String>,
    ) -> SessionSnapshot {
        let authenticated = user.is_some();
        let snapshot = {
            let mut guard = self.inner.lock();
            guard.user = user;
            guard.token = token;
            guard.phase = if authenticated {
                SessionPhase::Authenticated
            } else {
                SessionPhase::Unauthenticated
            };
            guard.snapshot()
        };
        let _ = self.events.send(SessionEvent::Restored { authenticated });
        snapshot
    }

    /// Exchanges credentials for a session. On success the token is persisted
    /// and `user` + `token` are set together; on any failure the session is
    /// left exactly as it was.
    pub async fn login(&self, email: &str, password: &str) -> Result<UserIdentity, SessionError> {
        validate_email(email)?;
        validate_required(password, "password")?;

        let request = LoginRequest {
            email: email.trim().to_string(),
            password: password.to_string(),
        };
        let response: AuthResponse = self
            .transport
            .post_json("/auth/login", &request, None)
            .await
            .map_err(|err| match err {
                SessionError::Unauthorized => SessionError::InvalidCredentials,
                other => other,
            })?;
        self.adopt_session(response).await
    }

    /// Self-registration: creates an account and signs the caller in, with
    /// the same contract as [`Self::login`]. Rejected while a session is
    /// already live; provisioning additional accounts from a signed-in admin
    /// goes through [`Self::create_account`] instead, which can never clobber
    /// the caller's own session.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
        role: Role,
    ) -> Result<UserIdentity, SessionError> {
        if self.inner.lock().phase == SessionPhase::Authenticated {
            return Err(SessionError::AlreadyAuthenticated);
        }
        validate_required(username, "username")?;
        validate_email(email)?;
        validate_required(password, "password")?;

        let request = RegisterRequest {
            username: username.trim().to_string(),
            email: email.trim().to_string(),
            password: password.to_string(),
            role,
        };
        let response: AuthResponse = self
            .transport
            .post_json("/auth/register", &request, None)
            .await?;
        self.adopt_session(response).await
    }

    /// Creates an account on behalf of the signed-in caller (admin flow).
    /// The credentials returned for the new account are discarded; only the
    /// created identity is returned and the caller's session is untouched.
    pub async fn create_account(
        &self,
        username: &str,
        email: &str,
        password: &str,
        role: Role,
    ) -> Result<UserIdentity, SessionError> {
        let bearer = self
            .bearer_token()
            .ok_or(SessionError::AuthenticationRequired)?;
        validate_required(username, "username")?;
        validate_email(email)?;
        validate_required(password, "password")?;

        let request = RegisterRequest {
            username: username.trim().to_string(),
            email: email.trim().to_string(),
            password: password.to_string(),
            role,
        };
        let response: AuthResponse = self
            .transport
            .post_json("/auth/register", &request, Some(&bearer))
            .await?;
        Ok(response.user)
    }

    /// Signs out. The server is notified best-effort; local state and the
    /// persisted token are cleared unconditionally, so repeated calls and
    /// unreachable servers both converge on an empty session.
    pub async fn logout(&self) {
        let token = { self.inner.lock().token.clone() };
        if let Some(token) = &token {
            if let Err(err) = self.transport.post_empty("/auth/logout", Some(token)).await {
                warn!("server logout failed; clearing local session anyway: {err}");
            }
        }
        self.clear_session().await;
    }

    /// Re-fetches the profile with the current token. Any failure — expiry,
    /// 401, transport — degrades to a silent sign-out and `None`; there is no
    /// user-initiated action to report an error against.
    pub async fn refresh_profile(&self) -> Option<UserIdentity> {
        let token = self.bearer_token()?;
        match self
            .transport
            .get_json::<UserIdentity>("/auth/me", Some(&token))
            .await
        {
            Ok(user) => {
                if !self.apply_profile(&token, user.clone()) {
                    // logout raced us; the converged state wins
                    return None;
                }
                let _ = self
                    .events
                    .send(SessionEvent::ProfileUpdated { user: user.clone() });
                Some(user)
            }
            Err(err) => {
                debug!("profile refresh failed; treating session as signed out: {err}");
                self.clear_session().await;
                None
            }
        }
    }

    /// Pushes a partial profile update. Fails fast without touching the
    /// network when no session is live; on success the returned identity
    /// replaces the cached one.
    pub async fn update_profile(
        &self,
        update: ProfileUpdateRequest,
    ) -> Result<UserIdentity, SessionError> {
        let bearer = self
            .bearer_token()
            .ok_or(SessionError::AuthenticationRequired)?;
        if update.is_empty() {
            return Err(SessionError::validation("profile", "no fields to update"));
        }
        if let Some(email) = &update.email {
            validate_email(email)?;
        }

        let user: UserIdentity = self
            .transport
            .put_json("/auth/profile", &update, Some(&bearer))
            .await?;
        if self.apply_profile(&bearer, user.clone()) {
            let _ = self
                .events
                .send(SessionEvent::ProfileUpdated { user: user.clone() });
        }
        Ok(user)
    }

    /// Pure role gate: false without a user, otherwise membership of the
    /// current user's role in `allowed_roles`.
    pub fn has_permission(&self, allowed_roles: &[Role]) -> bool {
        self.inner
            .lock()
            .user
            .as_ref()
            .is_some_and(|user| allowed_roles.contains(&user.role))
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.inner.lock().snapshot()
    }

    pub fn phase(&self) -> SessionPhase {
        self.inner.lock().phase
    }

    pub fn current_user(&self) -> Option<UserIdentity> {
        self.inner.lock().user.clone()
    }

    /// True until [`Self::restore`] has run to completion.
    pub fn is_loading(&self) -> bool {
        matches!(
            self.phase(),
            SessionPhase::Uninitialized | SessionPhase::Restoring
        )
    }

    fn bearer_token(&self) -> Option<String> {
        self.inner.lock().token.clone()
    }

    /// Applies a freshly fetched identity, but only if `token` is still the
    /// live session token. Returns whether it was applied.
    fn apply_profile(&self, token: &str, user: UserIdentity) -> bool {
        let mut guard = self.inner.lock();
        if guard.token.as_deref() != Some(token) {
            return false;
        }
        guard.user = Some(user);
        true
    }

    async fn adopt_session(&self, response: AuthResponse) -> Result<UserIdentity, SessionError> {
        self.token_store
            .save_token(&response.token)
            .await
            .map_err(SessionError::Storage)?;

        let user = response.user;
        {
            let mut guard = self.inner.lock();
            guard.user = Some(user.clone());
            guard.token = Some(response.token);
            guard.phase = SessionPhase::Authenticated;
        }
        let _ = self.events.send(SessionEvent::SignedIn { user: user.clone() });
        Ok(user)
    }

    async fn clear_persisted_token(&self) {
        if let Err(err) = self.token_store.clear_token().await {
            warn!("failed to clear persisted token: {err:#}");
        }
    }

    async fn clear_session(&self) {
        self.clear_persisted_token().await;
        let was_authenticated = {
            let mut guard = self.inner.lock();
            let was = guard.user.is_some();
            guard.user = None;
            guard.token = None;
            guard.phase = SessionPhase::Unauthenticated;
            was
        };
        if was_authenticated {
            let _ = self.events.send(SessionEvent::SignedOut);
        }
    }
}

fn validate_required(value: &str, field: &'static str) -> Result<(), SessionError> {
    if value.trim().is_empty() {
        return Err(SessionError::validation(field, "must not be empty"));
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<(), SessionError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(SessionError::validation("email", "must not be empty"));
    }
    let Some((local, domain)) = email.split_once('@') else {
        return Err(SessionError::validation("email", "missing '@'"));
    };
    if local.is_empty() || domain.is_empty() {
        return Err(SessionError::validation(
            "email",
            "must have text before and after '@'",
        ));
    }
    Ok(())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
