use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{ResourceId, Role, UserId};

/// The authenticated identity as returned by `/auth/me` and the auth
/// endpoints. The session client owns the authoritative copy; every other
/// consumer receives a clone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favorite_projects: Option<Vec<ResourceId>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favorite_guidelines: Option<Vec<ResourceId>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favorite_components: Option<Vec<ResourceId>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favorite_pages: Option<Vec<ResourceId>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

/// Successful login/register response: the identity plus a bearer token whose
/// expiry claim is locally inspectable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub user: UserIdentity,
    pub token: String,
}

/// Partial profile update sent to `PUT /auth/profile`. Absent fields are left
/// unchanged server-side.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileUpdateRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favorite_projects: Option<Vec<ResourceId>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favorite_guidelines: Option<Vec<ResourceId>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favorite_components: Option<Vec<ResourceId>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favorite_pages: Option<Vec<ResourceId>>,
}

impl ProfileUpdateRequest {
    pub fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.email.is_none()
            && self.favorite_projects.is_none()
            && self.favorite_guidelines.is_none()
            && self.favorite_components.is_none()
            && self.favorite_pages.is_none()
    }
}
