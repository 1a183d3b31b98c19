use async_trait::async_trait;
use supabase::SupabaseClient;

use crate::domain::{models::UserIdentity, ports::outbound::SessionProvider};

/// Session lookup against the hosted auth server, using the access token the
/// client was built with.
pub struct SupabaseSessionProvider {
    client: SupabaseClient,
}

impl SupabaseSessionProvider {
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SessionProvider for SupabaseSessionProvider {
    async fn current_user(&self) -> Option<UserIdentity> {
        match self.client.get_user().await {
            Ok(Some(user)) => Some(UserIdentity {
                id: user.id.into(),
                email: user.email,
            }),
            Ok(None) => None,
            Err(err) => {
                tracing::warn!(error = %err, "session lookup failed");
                None
            }
        }
    }
}
