use async_trait::async_trait;
use serde::Serialize;
use supabase::{RestQuery, SupabaseClient};

use crate::domain::{
    models::{Avatar, AvatarId, NewAvatar, UserId},
    ports::outbound::AvatarRepository,
    AvatarError,
};

pub const DEFAULT_AVATAR_TABLE: &str = "avatars";

/// Avatar rows in a PostgREST table.
pub struct SupabaseAvatarRepository {
    client: SupabaseClient,
    table: String,
    activate_rpc: Option<String>,
}

#[derive(Debug, Serialize)]
struct AvatarInsert<'a> {
    user_id: &'a str,
    avatar_url: &'a str,
    name: &'a str,
    is_active: bool,
}

#[derive(Debug, Serialize)]
struct ActivePatch {
    is_active: bool,
}

#[derive(Debug, Serialize)]
struct ActivateParams<'a> {
    avatar_id: &'a str,
}

impl SupabaseAvatarRepository {
    pub fn new(client: SupabaseClient) -> Self {
        Self {
            client,
            table: DEFAULT_AVATAR_TABLE.to_string(),
            activate_rpc: None,
        }
    }

    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    /// Use a database function taking `avatar_id` and returning the activated
    /// rows, so the switch happens in one statement.
    pub fn with_activate_rpc(mut self, function: impl Into<String>) -> Self {
        self.activate_rpc = Some(function.into());
        self
    }

    fn owned_by(&self, user_id: &UserId) -> RestQuery {
        RestQuery::table(&self.table).eq("user_id", user_id)
    }

    async fn activate_two_step(
        &self,
        user_id: &UserId,
        avatar_id: &AvatarId,
    ) -> Result<Option<Avatar>, AvatarError> {
        // Flag the target first: an id the user doesn't own matches nothing and
        // the current active avatar stays as it is.
        let activated: Vec<Avatar> = self
            .client
            .update(
                &self.owned_by(user_id).eq("id", avatar_id),
                &ActivePatch { is_active: true },
            )
            .await?;

        let Some(avatar) = activated.into_iter().next() else {
            return Ok(None);
        };

        self.client
            .update::<_, Avatar>(
                &self
                    .owned_by(user_id)
                    .neq("id", avatar_id)
                    .eq("is_active", true),
                &ActivePatch { is_active: false },
            )
            .await
            .map_err(|err| {
                tracing::error!(
                    %user_id,
                    %avatar_id,
                    error = %err,
                    "failed to deactivate previous avatars; more than one row stays active"
                );
                AvatarError::from(err)
            })?;

        Ok(Some(avatar))
    }
}

#[async_trait]
impl AvatarRepository for SupabaseAvatarRepository {
    async fn insert(&self, user_id: &UserId, avatar: &NewAvatar) -> Result<Avatar, AvatarError> {
        let row = AvatarInsert {
            user_id: user_id.as_str(),
            avatar_url: &avatar.avatar_url,
            name: &avatar.name,
            is_active: true,
        };

        let inserted: Vec<Avatar> = self.client.insert(&self.table, &row).await?;
        inserted
            .into_iter()
            .next()
            .ok_or_else(|| AvatarError::storage("insert returned no row"))
    }

    async fn find_active(&self, user_id: &UserId) -> Result<Option<Avatar>, AvatarError> {
        let query = self
            .owned_by(user_id)
            .eq("is_active", true)
            .order_desc("created_at");

        Ok(self.client.maybe_single(&query).await?)
    }

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Avatar>, AvatarError> {
        let query = self.owned_by(user_id).order_desc("created_at");

        Ok(self.client.select(&query).await?)
    }

    async fn activate(
        &self,
        user_id: &UserId,
        avatar_id: &AvatarId,
    ) -> Result<Option<Avatar>, AvatarError> {
        let Some(function) = self.activate_rpc.as_deref() else {
            return self.activate_two_step(user_id, avatar_id).await;
        };

        let rows: Vec<Avatar> = self
            .client
            .rpc(
                function,
                &ActivateParams {
                    avatar_id: avatar_id.as_str(),
                },
            )
            .await?;

        Ok(rows.into_iter().find(|a| &a.id == avatar_id && &a.user_id == user_id))
    }
}
