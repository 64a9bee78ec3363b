//! Bearer token sources.

use std::fmt;
use std::sync::Arc;

use gcp_auth::TokenProvider;

use crate::error::Result;

/// OAuth scope that covers both Bigtable data writes and Pub/Sub publishing.
pub const CLOUD_PLATFORM_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";

/// Where the `Authorization: Bearer` token comes from.
#[derive(Clone)]
pub enum Credentials {
    /// Send no token (emulators, local mocks)
    None,
    /// A fixed access token, e.g. from `gcloud auth print-access-token`
    BearerToken(String),
    /// Application Default Credentials resolved by `gcp_auth`
    ApplicationDefault(Arc<dyn TokenProvider>),
}

impl Credentials {
    /// Resolve Application Default Credentials from the environment
    /// (service account key, metadata server, or gcloud user credentials).
    pub async fn application_default() -> Result<Self> {
        let provider = gcp_auth::provider().await?;
        Ok(Self::ApplicationDefault(provider))
    }

    /// Current bearer token, if any.
    pub async fn bearer_token(&self) -> Result<Option<String>> {
        match self {
            Self::None => Ok(None),
            Self::BearerToken(token) => Ok(Some(token.clone())),
            Self::ApplicationDefault(provider) => {
                let token = provider.token(&[CLOUD_PLATFORM_SCOPE]).await?;
                Ok(Some(token.as_str().to_string()))
            }
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "Credentials::None"),
            Self::BearerToken(_) => write!(f, "Credentials::BearerToken(<redacted>)"),
            Self::ApplicationDefault(_) => write!(f, "Credentials::ApplicationDefault"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_no_credentials_yield_no_token() {
        assert_eq!(Credentials::None.bearer_token().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_static_token() {
        let credentials = Credentials::BearerToken("ya29.token".to_string());
        assert_eq!(
            credentials.bearer_token().await.unwrap().as_deref(),
            Some("ya29.token")
        );
    }

    #[test]
    fn test_debug_redacts_token() {
        let credentials = Credentials::BearerToken("secret".to_string());
        assert!(!format!("{credentials:?}").contains("secret"));
    }
}
