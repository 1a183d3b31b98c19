use std::sync::Arc;

use super::ports::outbound::LocalStore;

pub const ACTIVE_AVATAR_URL_KEY: &str = "avatarUrl";
pub const SHARED_AVATAR_URL_KEY: &str = "sharedAvatarUrl";

/// Non-authoritative mirror of avatar URLs in local storage.
///
/// The active URL and the shared URL live under independent keys and are
/// never derived from each other. Reads and writes never fail the caller:
/// storage errors are logged and treated as a miss.
pub struct AvatarUrlCache<L> {
    store: Arc<L>,
}

impl<L> Clone for AvatarUrlCache<L> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<L: LocalStore> AvatarUrlCache<L> {
    pub fn new(store: Arc<L>) -> Self {
        Self { store }
    }

    pub fn active_url(&self) -> Option<String> {
        self.read(ACTIVE_AVATAR_URL_KEY)
    }

    pub fn remember_active(&self, url: &str) {
        self.write(ACTIVE_AVATAR_URL_KEY, url);
    }

    pub fn shared_url(&self) -> Option<String> {
        self.read(SHARED_AVATAR_URL_KEY)
    }

    pub fn set_shared_url(&self, url: &str) {
        self.write(SHARED_AVATAR_URL_KEY, url);
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.store.get(key) {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(key, error = %err, "failed to read local avatar cache");
                None
            }
        }
    }

    fn write(&self, key: &str, value: &str) {
        if let Err(err) = self.store.set(key, value) {
            tracing::warn!(key, error = %err, "failed to write local avatar cache");
        }
    }
}
