use std::sync::Arc;

use crate::domain::{
    models::{Avatar, AvatarId},
    ports::inbound::AvatarService,
    AvatarError,
};

/// The lenient surface: every failure, including a missing session, collapses
/// into `None`, an empty list or `false` after being logged.
///
/// Use [`AvatarService`] directly to tell "nothing there" from "call failed".
pub struct AvatarClient<S: ?Sized> {
    service: Arc<S>,
}

impl<S: ?Sized> Clone for AvatarClient<S> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
        }
    }
}

impl<S: AvatarService + ?Sized> AvatarClient<S> {
    pub fn new(service: Arc<S>) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub async fn create(&self, avatar_url: &str, name: Option<&str>) -> Option<Avatar> {
        self.service
            .create_avatar(avatar_url, name)
            .await
            .map_err(|err| log_collapsed("create", err))
            .ok()
    }

    pub async fn get_active(&self) -> Option<Avatar> {
        self.service
            .active_avatar()
            .await
            .map_err(|err| log_collapsed("get_active", err))
            .ok()
            .flatten()
    }

    pub async fn list_all(&self) -> Vec<Avatar> {
        self.service
            .list_avatars()
            .await
            .map_err(|err| log_collapsed("list_all", err))
            .unwrap_or_default()
    }

    pub async fn activate(&self, avatar_id: &str) -> bool {
        self.service
            .activate_avatar(&AvatarId::new(avatar_id))
            .await
            .map_err(|err| log_collapsed("activate", err))
            .is_ok()
    }

    pub fn cached_avatar_url(&self) -> Option<String> {
        self.service.cached_avatar_url()
    }

    pub fn shared_avatar_url(&self) -> Option<String> {
        self.service.shared_avatar_url()
    }

    pub fn set_shared_avatar_url(&self, url: &str) {
        self.service.set_shared_avatar_url(url);
    }
}

fn log_collapsed(operation: &str, err: AvatarError) {
    match err {
        AvatarError::NotAuthenticated => {
            tracing::debug!(operation, "skipped: not authenticated");
        }
        err => tracing::error!(operation, error = %err, "avatar operation failed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::outbound::{
        InMemoryAvatarRepository, MemoryLocalStore, StaticSessionProvider,
    };
    use crate::domain::{models::UserIdentity, services::AvatarServiceImpl};

    type Service =
        AvatarServiceImpl<StaticSessionProvider, InMemoryAvatarRepository, MemoryLocalStore>;

    fn client(
        signed_in: bool,
    ) -> (
        AvatarClient<Service>,
        Arc<StaticSessionProvider>,
        Arc<InMemoryAvatarRepository>,
    ) {
        let session = Arc::new(if signed_in {
            StaticSessionProvider::signed_in(UserIdentity::new("user-a"))
        } else {
            StaticSessionProvider::signed_out()
        });
        let repository = Arc::new(InMemoryAvatarRepository::new());
        let service = AvatarServiceImpl::new(
            Arc::clone(&session),
            Arc::clone(&repository),
            Arc::new(MemoryLocalStore::new()),
        );

        (AvatarClient::new(Arc::new(service)), session, repository)
    }

    #[tokio::test]
    async fn signed_out_returns_sentinels() {
        let (client, _, repository) = client(false);

        assert_eq!(client.create("https://cdn/a.png", None).await, None);
        assert_eq!(client.get_active().await, None);
        assert!(client.list_all().await.is_empty());
        assert!(!client.activate("avatar-1").await);
        assert_eq!(repository.call_count(), 0);
    }

    #[tokio::test]
    async fn failures_and_absence_look_the_same() {
        let (client, _, repository) = client(true);

        assert_eq!(client.get_active().await, None);

        client.create("https://cdn/a.png", None).await.unwrap();
        repository.set_failing(true);
        assert_eq!(client.get_active().await, None);
        assert!(client.list_all().await.is_empty());
        assert!(
            client.service().active_avatar().await.is_err(),
            "the typed service still reports the failure"
        );
    }

    #[tokio::test]
    async fn activate_reports_success_as_bool() {
        let (client, _, _) = client(true);
        let red = client.create("u1", Some("Red")).await.unwrap();
        client.create("u2", Some("Blue")).await.unwrap();

        assert!(client.activate(red.id.as_str()).await);
        assert!(!client.activate("no-such-avatar").await);
        assert_eq!(client.get_active().await.map(|a| a.name), Some("Red".to_string()));
        assert_eq!(client.cached_avatar_url().as_deref(), Some("u1"));
    }

    #[tokio::test]
    async fn shared_url_round_trips_without_session() {
        let (client, session, _) = client(true);
        session.sign_out();

        client.set_shared_avatar_url("https://cdn/shared.png");
        assert_eq!(
            client.shared_avatar_url().as_deref(),
            Some("https://cdn/shared.png")
        );
    }
}
