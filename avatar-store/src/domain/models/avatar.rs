use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::{AvatarId, UserId};

pub const DEFAULT_AVATAR_NAME: &str = "My Avatar";

/// One row of the `avatars` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Avatar {
    pub id: AvatarId,
    pub user_id: UserId,
    pub avatar_url: String,
    pub name: String,
    pub is_active: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Caller-supplied fields of a new avatar. Ownership and the active flag are
/// filled in by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAvatar {
    pub avatar_url: String,
    pub name: String,
}

impl NewAvatar {
    pub fn new(avatar_url: impl Into<String>, name: Option<&str>) -> Self {
        Self {
            avatar_url: avatar_url.into(),
            name: name.unwrap_or(DEFAULT_AVATAR_NAME).to_string(),
        }
    }
}

/// The identity behind the current session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserIdentity {
    pub id: UserId,
    pub email: Option<String>,
}

impl UserIdentity {
    pub fn new(id: impl Into<UserId>) -> Self {
        Self {
            id: id.into(),
            email: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}
