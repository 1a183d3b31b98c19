use async_trait::async_trait;

use crate::domain::{
    models::{Avatar, AvatarId, NewAvatar, UserId},
    AvatarError,
};

/// Remote avatar storage. Every method is scoped to `user_id`; an
/// implementation never reads or writes another user's rows.
#[async_trait]
pub trait AvatarRepository: Send + Sync + 'static {
    /// Inserts an active row owned by `user_id` and returns it as stored.
    async fn insert(&self, user_id: &UserId, avatar: &NewAvatar) -> Result<Avatar, AvatarError>;

    /// The newest row flagged active, if any.
    async fn find_active(&self, user_id: &UserId) -> Result<Option<Avatar>, AvatarError>;

    /// All rows, `created_at` descending.
    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Avatar>, AvatarError>;

    /// Flags `avatar_id` active and every other row of the user inactive.
    ///
    /// Returns `None`, leaving all rows untouched, when no row with that id
    /// belongs to the user.
    async fn activate(
        &self,
        user_id: &UserId,
        avatar_id: &AvatarId,
    ) -> Result<Option<Avatar>, AvatarError>;
}
