use thiserror::Error;

use super::models::AvatarId;

/// Errors that can occur during avatar operations.
#[derive(Debug, Error)]
pub enum AvatarError {
    #[error("not authenticated")]
    NotAuthenticated,
    #[error("avatar url is required")]
    MissingUrl,
    #[error("avatar not found: {0}")]
    NotFound(AvatarId),
    #[error("storage error: {0}")]
    Storage(String),
}

impl AvatarError {
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }
}

impl From<supabase::SupabaseError> for AvatarError {
    fn from(err: supabase::SupabaseError) -> Self {
        match err {
            supabase::SupabaseError::Unauthorized => Self::NotAuthenticated,
            other => Self::Storage(other.to_string()),
        }
    }
}

#[derive(Debug, Error)]
pub enum LocalStoreError {
    #[error("local store io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("local store is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
    #[error("local store lock poisoned")]
    Poisoned,
}
