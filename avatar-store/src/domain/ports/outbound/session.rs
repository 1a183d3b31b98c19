use async_trait::async_trait;

use crate::domain::models::UserIdentity;

/// Resolves the identity behind the ambient session.
///
/// Called fresh for every operation. Lookup failures are reported as absence.
#[async_trait]
pub trait SessionProvider: Send + Sync + 'static {
    async fn current_user(&self) -> Option<UserIdentity>;
}
