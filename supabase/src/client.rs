use reqwest::{RequestBuilder, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::RestQuery;

/// A handle on one hosted project: its REST and auth endpoints plus the
/// public API key and, once signed in, the user's access token.
#[derive(Debug, Clone)]
pub struct SupabaseClient {
    http: reqwest::Client,
    project_url: Url,
    api_key: String,
    access_token: Option<String>,
}

impl SupabaseClient {
    pub fn new(project_url: &str, api_key: impl Into<String>) -> Result<Self, SupabaseError> {
        let mut project_url =
            Url::parse(project_url).map_err(|e| SupabaseError::InvalidUrl(e.to_string()))?;
        if !project_url.path().ends_with('/') {
            let path = format!("{}/", project_url.path());
            project_url.set_path(&path);
        }

        Ok(Self {
            http: reqwest::Client::new(),
            project_url,
            api_key: api_key.into(),
            access_token: None,
        })
    }

    pub fn with_access_token(mut self, access_token: impl Into<String>) -> Self {
        self.access_token = Some(access_token.into());
        self
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    pub fn project_url(&self) -> &Url {
        &self.project_url
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub(crate) fn endpoint(&self, path: &str) -> Result<Url, SupabaseError> {
        self.project_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| SupabaseError::InvalidUrl(e.to_string()))
    }

    fn rest_base(&self) -> Result<Url, SupabaseError> {
        self.endpoint("rest/v1/")
    }

    /// Attaches the project key and the bearer token. Requests made before
    /// sign-in run as the anonymous role.
    pub(crate) fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let bearer = self.access_token.as_deref().unwrap_or(&self.api_key);
        request.header("apikey", &self.api_key).bearer_auth(bearer)
    }

    pub(crate) async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        call_name: &str,
    ) -> Result<T, SupabaseError> {
        let resp = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| SupabaseError::ResponseError(format!("{call_name}: {e}")))?;

        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(SupabaseError::Unauthorized);
        }

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            tracing::debug!(call = call_name, %status, body, "supabase call failed");
            return Err(SupabaseError::Api {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        resp.json::<T>().await.map_err(|e| {
            SupabaseError::ParsingError(format!("Failed to parse {call_name} response: {e}"))
        })
    }

    pub async fn select<T: DeserializeOwned>(
        &self,
        query: &RestQuery,
    ) -> Result<Vec<T>, SupabaseError> {
        let url = query.to_url(&self.rest_base()?)?;
        self.send(self.http.get(url), query.table_name()).await
    }

    /// Zero or one row. An empty result is `None`, not an error.
    pub async fn maybe_single<T: DeserializeOwned>(
        &self,
        query: &RestQuery,
    ) -> Result<Option<T>, SupabaseError> {
        let rows = self.select::<T>(&query.clone().limit(1)).await?;
        Ok(rows.into_iter().next())
    }

    pub async fn insert<B, T>(&self, table: &str, body: &B) -> Result<Vec<T>, SupabaseError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = RestQuery::table(table).to_filter_url(&self.rest_base()?)?;
        let request = self
            .http
            .post(url)
            .header("Prefer", "return=representation")
            .json(body);
        self.send(request, table).await
    }

    /// Applies `patch` to every row matching the query's filters and returns
    /// the updated rows.
    pub async fn update<B, T>(&self, query: &RestQuery, patch: &B) -> Result<Vec<T>, SupabaseError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = query.to_filter_url(&self.rest_base()?)?;
        let request = self
            .http
            .patch(url)
            .header("Prefer", "return=representation")
            .json(patch);
        self.send(request, query.table_name()).await
    }

    pub async fn rpc<B, T>(&self, function: &str, params: &B) -> Result<T, SupabaseError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(&format!("rest/v1/rpc/{function}"))?;
        self.send(self.http.post(url).json(params), function).await
    }
}

#[derive(Error, Debug)]
pub enum SupabaseError {
    #[error("Unauthorized")]
    Unauthorized,
    #[error("ResponseError: {0}")]
    ResponseError(String),
    #[error("ApiError ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("ParsingError: {0}")]
    ParsingError(String),
    #[error("InvalidUrl: {0}")]
    InvalidUrl(String),
}

/// Error bodies differ between PostgREST (`message`) and the auth server
/// (`msg`, `error_description`).
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
    msg: Option<String>,
    error_description: Option<String>,
}

fn error_message(body: &str) -> String {
    serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .and_then(|b| b.message.or(b.error_description).or(b.msg))
        .unwrap_or_else(|| body.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_url_gets_trailing_slash() {
        let client = SupabaseClient::new("https://abc.supabase.co", "anon").unwrap();
        assert_eq!(
            client.endpoint("rest/v1/avatars").unwrap().as_str(),
            "https://abc.supabase.co/rest/v1/avatars"
        );

        let client = SupabaseClient::new("http://localhost:54321/base", "anon").unwrap();
        assert_eq!(
            client.endpoint("/auth/v1/user").unwrap().as_str(),
            "http://localhost:54321/base/auth/v1/user"
        );
    }

    #[test]
    fn invalid_project_url_is_rejected() {
        let err = SupabaseClient::new("not a url", "anon").unwrap_err();
        assert!(matches!(err, SupabaseError::InvalidUrl(_)));
    }

    #[test]
    fn access_token_is_optional() {
        let client = SupabaseClient::new("https://abc.supabase.co", "anon").unwrap();
        assert_eq!(client.access_token(), None);

        let client = client.with_access_token("jwt");
        assert_eq!(client.access_token(), Some("jwt"));
    }

    #[test]
    fn error_message_prefers_structured_fields() {
        assert_eq!(
            error_message(r#"{"code":"23502","message":"null value in column \"avatar_url\""}"#),
            "null value in column \"avatar_url\""
        );
        assert_eq!(
            error_message(r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#),
            "Invalid login credentials"
        );
        assert_eq!(error_message(r#"{"msg":"bad jwt"}"#), "bad jwt");
        assert_eq!(error_message("  upstream timeout \n"), "upstream timeout");
    }
}
