//! REST client wrapper.

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::credentials::Credentials;
use crate::error::{RestError, Result};

/// HTTP client bound to one Google API endpoint.
#[derive(Debug, Clone)]
pub struct RestClient {
    http: reqwest::Client,
    endpoint: String,
    credentials: Credentials,
}

impl RestClient {
    /// Create a client for `endpoint` (e.g. `https://pubsub.googleapis.com`).
    pub fn new(endpoint: impl Into<String>, credentials: Credentials) -> Result<Self> {
        let endpoint = endpoint.into();
        if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
            return Err(RestError::InvalidConfig(format!(
                "endpoint must start with http:// or https://, got '{endpoint}'"
            )));
        }

        let http = reqwest::Client::builder().build()?;

        tracing::debug!("REST client for {endpoint} created with {credentials:?}");

        Ok(Self {
            http,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.endpoint, path.trim_start_matches('/'))
    }

    async fn authorize(&self, request: reqwest::RequestBuilder) -> Result<reqwest::RequestBuilder> {
        Ok(match self.credentials.bearer_token().await? {
            Some(token) => request.bearer_auth(token),
            None => request,
        })
    }

    /// POST a JSON body and decode the JSON response.
    ///
    /// Any non-2xx status becomes [`RestError::Status`] carrying the
    /// response body, which Google APIs fill with a JSON error description.
    pub async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = self.url(path);
        tracing::trace!("POST {url}");

        let request = self.authorize(self.http.post(&url).json(body)).await?;
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RestError::Status {
                method: "POST",
                url,
                status,
                body,
            });
        }

        Ok(response.json::<R>().await?)
    }

    /// GET a resource and report only the status code.
    pub async fn get_status(&self, path: &str) -> Result<StatusCode> {
        let url = self.url(path);
        tracing::trace!("GET {url}");

        let request = self.authorize(self.http.get(&url)).await?;
        let response = request.send().await?;
        Ok(response.status())
    }
}
