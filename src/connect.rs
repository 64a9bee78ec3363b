use anyhow::Context;
use bigtable_sink::{BigtableSink, BigtableTable};
use gcp_rest::{Credentials, RestClient};
use pubsub_publisher::PubsubPublisher;

use crate::{BigtableOpts, GcpOpts, PubsubOpts};

// Resolve how requests to Google Cloud are authenticated
pub async fn resolve_credentials(gcp: &GcpOpts) -> anyhow::Result<Credentials> {
    if gcp.no_auth {
        tracing::info!("Sending requests without credentials");
        return Ok(Credentials::None);
    }
    if let Some(token) = &gcp.access_token {
        return Ok(Credentials::BearerToken(token.clone()));
    }
    Credentials::application_default()
        .await
        .context("Failed to resolve Application Default Credentials")
}

fn project_id(gcp: &GcpOpts) -> anyhow::Result<&str> {
    gcp.gcp_project_id
        .as_deref()
        .context("--gcp-project-id (GCP_PROJECT_ID) is required unless --dry-run is set")
}

// Connect to the Bigtable table; a missing table is logged, not fatal
pub async fn connect_bigtable(
    gcp: &GcpOpts,
    opts: &BigtableOpts,
    credentials: Credentials,
) -> anyhow::Result<BigtableSink> {
    let instance = opts
        .bigtable_instance
        .as_deref()
        .context("--bigtable-instance (BIGTABLE_INSTANCE_NAME) is required")?;
    let table = opts
        .bigtable_table
        .as_deref()
        .context("--bigtable-table (BIGTABLE_TABLE_NAME) is required")?;

    let data = RestClient::new(&opts.bigtable_endpoint, credentials.clone())
        .context("Invalid Bigtable endpoint")?;
    let admin = RestClient::new(&opts.bigtable_admin_endpoint, credentials)
        .context("Invalid Bigtable admin endpoint")?;

    let table = BigtableTable::new(project_id(gcp)?, instance, table);
    Ok(BigtableSink::connect(data, admin, table).await)
}

pub fn connect_pubsub(
    gcp: &GcpOpts,
    opts: &PubsubOpts,
    credentials: Credentials,
) -> anyhow::Result<PubsubPublisher> {
    let client = RestClient::new(&opts.pubsub_endpoint, credentials)
        .context("Invalid Pub/Sub endpoint")?;
    Ok(PubsubPublisher::new(client, project_id(gcp)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gcp(project: Option<&str>) -> GcpOpts {
        GcpOpts {
            gcp_project_id: project.map(str::to_string),
            access_token: None,
            no_auth: true,
        }
    }

    fn pubsub(endpoint: &str) -> PubsubOpts {
        PubsubOpts {
            pubsub_topic: "relay".to_string(),
            pubsub_endpoint: endpoint.to_string(),
        }
    }

    #[tokio::test]
    async fn test_no_auth_wins() {
        let mut opts = gcp(Some("p"));
        opts.access_token = Some("token".to_string());
        let credentials = resolve_credentials(&opts).await.unwrap();
        assert!(matches!(credentials, Credentials::None));
    }

    #[tokio::test]
    async fn test_access_token_is_used() {
        let mut opts = gcp(Some("p"));
        opts.no_auth = false;
        opts.access_token = Some("token".to_string());
        let credentials = resolve_credentials(&opts).await.unwrap();
        assert_eq!(
            credentials.bearer_token().await.unwrap().as_deref(),
            Some("token")
        );
    }

    #[test]
    fn test_publisher_requires_project() {
        let err = connect_pubsub(&gcp(None), &pubsub("http://localhost:8085"), Credentials::None)
            .unwrap_err();
        assert!(err.to_string().contains("--gcp-project-id"));
    }

    #[test]
    fn test_publisher_rejects_bad_endpoint() {
        let err = connect_pubsub(&gcp(Some("p")), &pubsub("localhost:8085"), Credentials::None)
            .unwrap_err();
        assert!(err.to_string().contains("Invalid Pub/Sub endpoint"));
    }

    #[tokio::test]
    async fn test_bigtable_requires_instance_and_table() {
        let opts = BigtableOpts {
            bigtable_instance: Some("i".to_string()),
            bigtable_table: None,
            bigtable_endpoint: "http://localhost:8086".to_string(),
            bigtable_admin_endpoint: "http://localhost:8086".to_string(),
        };
        let err = connect_bigtable(&gcp(Some("p")), &opts, Credentials::None)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("--bigtable-table"));
    }
}
