use shared::error::ApiError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("network request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("the server rejected the session token")]
    Unauthorized,
    #[error("authentication required")]
    AuthenticationRequired,
    #[error("already signed in; use create_account to provision additional users")]
    AlreadyAuthenticated,
    #[error("invalid {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },
    #[error("server error: {0}")]
    Api(#[from] ApiError),
    #[error("credential storage failed: {0}")]
    Storage(anyhow::Error),
}

impl SessionError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }
}
