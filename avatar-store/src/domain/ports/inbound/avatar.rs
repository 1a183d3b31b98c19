use async_trait::async_trait;

use crate::domain::{
    models::{Avatar, AvatarId},
    AvatarError,
};

/// Avatar operations for the user behind the current session.
///
/// Every remote operation resolves the session first and fails with
/// [`AvatarError::NotAuthenticated`] before touching storage when there is none.
#[async_trait]
pub trait AvatarService: Send + Sync + 'static {
    /// Inserts a new, active avatar. `None` stores the default name.
    async fn create_avatar(
        &self,
        avatar_url: &str,
        name: Option<&str>,
    ) -> Result<Avatar, AvatarError>;

    /// `Ok(None)` means the user has no active avatar.
    async fn active_avatar(&self) -> Result<Option<Avatar>, AvatarError>;

    /// Newest first.
    async fn list_avatars(&self) -> Result<Vec<Avatar>, AvatarError>;

    /// Makes `avatar_id` the user's only active avatar.
    async fn activate_avatar(&self, avatar_id: &AvatarId) -> Result<Avatar, AvatarError>;

    /// Last known active avatar URL from the local cache.
    fn cached_avatar_url(&self) -> Option<String>;

    fn shared_avatar_url(&self) -> Option<String>;

    fn set_shared_avatar_url(&self, url: &str);
}
