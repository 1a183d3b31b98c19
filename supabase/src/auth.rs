use serde::{Deserialize, Serialize};

use crate::{SupabaseClient, SupabaseError};

/// The subset of the auth server's user object this client reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Tokens returned by a successful sign-in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
    pub user: AuthUser,
}

#[derive(Debug, Serialize)]
struct PasswordGrant<'a> {
    email: &'a str,
    password: &'a str,
}

impl SupabaseClient {
    /// Looks up the user behind the current access token.
    ///
    /// No token, or a token the auth server rejects, is `Ok(None)`.
    pub async fn get_user(&self) -> Result<Option<AuthUser>, SupabaseError> {
        if self.access_token().is_none() {
            return Ok(None);
        }

        let url = self.endpoint("auth/v1/user")?;
        match self
            .send::<AuthUser>(self.http().get(url), "get_user")
            .await
        {
            Ok(user) => Ok(Some(user)),
            Err(SupabaseError::Unauthorized) => Ok(None),
            Err(SupabaseError::Api { status: 400, .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, SupabaseError> {
        let mut url = self.endpoint("auth/v1/token")?;
        url.query_pairs_mut().append_pair("grant_type", "password");

        let request = self
            .http()
            .post(url)
            .json(&PasswordGrant { email, password });
        self.send(request, "sign_in_with_password").await
    }
}
