use shared::protocol::UserIdentity;

/// Lifecycle of the client-side session.
///
/// `Restoring` is entered exactly once, when [`crate::SessionClient::restore`]
/// runs at startup, and is never re-entered afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Uninitialized,
    Restoring,
    Authenticated,
    Unauthenticated,
}

/// Read-only view of the session handed to consumers. The bearer token itself
/// is never exposed here; it stays owned by the session client.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub phase: SessionPhase,
    pub user: Option<UserIdentity>,
}

impl SessionSnapshot {
    pub fn is_authenticated(&self) -> bool {
        self.phase == SessionPhase::Authenticated
    }
}

/// Explicit observer contract for session changes, in place of a reactive UI
/// framework's implicit re-render.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    Restored { authenticated: bool },
    SignedIn { user: UserIdentity },
    ProfileUpdated { user: UserIdentity },
    SignedOut,
}
