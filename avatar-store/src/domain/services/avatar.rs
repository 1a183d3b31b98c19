use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{
    models::{Avatar, AvatarId, NewAvatar, UserIdentity},
    ports::{
        inbound::AvatarService,
        outbound::{AvatarRepository, LocalStore, SessionProvider},
    },
    AvatarError, AvatarUrlCache,
};

pub struct AvatarServiceImpl<S, R, L> {
    session: Arc<S>,
    repository: Arc<R>,
    cache: AvatarUrlCache<L>,
}

impl<S, R, L: LocalStore> AvatarServiceImpl<S, R, L> {
    pub fn new(session: Arc<S>, repository: Arc<R>, local_store: Arc<L>) -> Self {
        Self {
            session,
            repository,
            cache: AvatarUrlCache::new(local_store),
        }
    }
}

impl<S: SessionProvider, R, L> AvatarServiceImpl<S, R, L> {
    async fn require_user(&self) -> Result<UserIdentity, AvatarError> {
        match self.session.current_user().await {
            Some(user) => {
                tracing::Span::current().record("user_id", tracing::field::display(&user.id));
                Ok(user)
            }
            None => {
                tracing::debug!("no active session");
                Err(AvatarError::NotAuthenticated)
            }
        }
    }
}

#[async_trait]
impl<S, R, L> AvatarService for AvatarServiceImpl<S, R, L>
where
    S: SessionProvider,
    R: AvatarRepository,
    L: LocalStore,
{
    #[tracing::instrument(skip(self), fields(user_id = tracing::field::Empty))]
    async fn create_avatar(
        &self,
        avatar_url: &str,
        name: Option<&str>,
    ) -> Result<Avatar, AvatarError> {
        if avatar_url.trim().is_empty() {
            return Err(AvatarError::MissingUrl);
        }

        let user = self.require_user().await?;
        let avatar = self
            .repository
            .insert(&user.id, &NewAvatar::new(avatar_url, name))
            .await?;

        tracing::debug!(avatar_id = %avatar.id, "avatar created");
        self.cache.remember_active(&avatar.avatar_url);

        Ok(avatar)
    }

    #[tracing::instrument(skip(self), fields(user_id = tracing::field::Empty))]
    async fn active_avatar(&self) -> Result<Option<Avatar>, AvatarError> {
        let user = self.require_user().await?;
        let active = self.repository.find_active(&user.id).await?;

        if let Some(avatar) = active.as_ref().filter(|a| !a.avatar_url.is_empty()) {
            self.cache.remember_active(&avatar.avatar_url);
        }

        Ok(active)
    }

    #[tracing::instrument(skip(self), fields(user_id = tracing::field::Empty))]
    async fn list_avatars(&self) -> Result<Vec<Avatar>, AvatarError> {
        let user = self.require_user().await?;
        self.repository.list_for_user(&user.id).await
    }

    #[tracing::instrument(skip(self), fields(user_id = tracing::field::Empty))]
    async fn activate_avatar(&self, avatar_id: &AvatarId) -> Result<Avatar, AvatarError> {
        let user = self.require_user().await?;
        let avatar = self
            .repository
            .activate(&user.id, avatar_id)
            .await?
            .ok_or_else(|| AvatarError::NotFound(avatar_id.clone()))?;

        tracing::debug!(%avatar_id, "avatar activated");
        self.cache.remember_active(&avatar.avatar_url);

        Ok(avatar)
    }

    fn cached_avatar_url(&self) -> Option<String> {
        self.cache.active_url()
    }

    fn shared_avatar_url(&self) -> Option<String> {
        self.cache.shared_url()
    }

    fn set_shared_avatar_url(&self, url: &str) {
        self.cache.set_shared_url(url);
    }
}
