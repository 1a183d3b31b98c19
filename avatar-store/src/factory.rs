//! Composition root — the only place that picks concrete adapters.

use std::sync::Arc;

use supabase::{SupabaseClient, SupabaseError};
use thiserror::Error;

use crate::{
    adapters::{
        inbound::AvatarClient,
        outbound::{
            supabase::{SupabaseAvatarRepository, SupabaseSessionProvider},
            FileLocalStore,
        },
    },
    config::{Settings, SupabaseSettings},
    domain::services::AvatarServiceImpl,
};

pub type SupabaseAvatarService =
    AvatarServiceImpl<SupabaseSessionProvider, SupabaseAvatarRepository, FileLocalStore>;

#[derive(Debug, Error)]
pub enum SetupError {
    #[error("invalid supabase settings: {0}")]
    Client(#[from] SupabaseError),
    #[error("cannot determine a location for the local avatar cache")]
    NoCacheLocation,
}

pub fn supabase_client(
    settings: &SupabaseSettings,
    access_token: Option<&str>,
) -> Result<SupabaseClient, SupabaseError> {
    let client = SupabaseClient::new(&settings.url, settings.anon_key.clone())?;
    Ok(match access_token {
        Some(token) => client.with_access_token(token),
        None => client,
    })
}

/// Session lookups and table requests share one client, so both run as the
/// user behind `access_token`.
pub fn avatar_service(
    settings: &Settings,
    access_token: Option<&str>,
) -> Result<SupabaseAvatarService, SetupError> {
    let client = supabase_client(&settings.supabase, access_token)?;

    let mut repository =
        SupabaseAvatarRepository::new(client.clone()).with_table(&settings.avatars.table);
    if let Some(function) = settings.avatars.activate_rpc.as_deref() {
        repository = repository.with_activate_rpc(function);
    }

    let cache_path = settings
        .cache
        .resolved_path()
        .ok_or(SetupError::NoCacheLocation)?;

    tracing::debug!(project = %client.project_url(), cache = %cache_path.display(), "avatar service ready");

    Ok(AvatarServiceImpl::new(
        Arc::new(SupabaseSessionProvider::new(client)),
        Arc::new(repository),
        Arc::new(FileLocalStore::new(cache_path)),
    ))
}

pub fn avatar_client(
    settings: &Settings,
    access_token: Option<&str>,
) -> Result<AvatarClient<SupabaseAvatarService>, SetupError> {
    Ok(AvatarClient::new(Arc::new(avatar_service(
        settings,
        access_token,
    )?)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::{AvatarSettings, CacheSettings},
        AvatarService,
    };

    fn settings(url: &str, cache: &std::path::Path) -> Settings {
        Settings {
            supabase: SupabaseSettings {
                url: url.into(),
                anon_key: "anon".into(),
            },
            avatars: AvatarSettings::default(),
            cache: CacheSettings {
                path: Some(cache.to_path_buf()),
            },
        }
    }

    #[test]
    fn bad_project_url_fails_setup() {
        let dir = tempfile::tempdir().unwrap();
        let err = avatar_service(&settings("::nope::", &dir.path().join("c.json")), None)
            .err()
            .unwrap();
        assert!(matches!(err, SetupError::Client(_)));
    }

    #[tokio::test]
    async fn service_without_token_is_signed_out() {
        let dir = tempfile::tempdir().unwrap();
        let client = avatar_client(
            &settings("http://127.0.0.1:9", &dir.path().join("c.json")),
            None,
        )
        .unwrap();

        assert!(client.list_all().await.is_empty());
        assert!(!client.activate("avatar-1").await);

        client.set_shared_avatar_url("https://cdn/shared.png");
        assert_eq!(
            client.service().shared_avatar_url().as_deref(),
            Some("https://cdn/shared.png")
        );
    }
}
