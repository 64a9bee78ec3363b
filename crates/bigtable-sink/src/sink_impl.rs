//! Implementation of RowSink for Cloud Bigtable.

use anyhow::Context;
use gcp_rest::{RestClient, StatusCode};
use relay_types::{ColumnFamily, DATA_FAMILY, META_FAMILY};
use row_sink::{format_family, RowSink};

use crate::mutation::MutateRowRequest;

/// Fully qualified location of a Bigtable table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BigtableTable {
    pub project_id: String,
    pub instance_name: String,
    pub table_name: String,
}

impl BigtableTable {
    pub fn new(
        project_id: impl Into<String>,
        instance_name: impl Into<String>,
        table_name: impl Into<String>,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            instance_name: instance_name.into(),
            table_name: table_name.into(),
        }
    }

    /// Resource name: `projects/{p}/instances/{i}/tables/{t}`.
    pub fn resource_name(&self) -> String {
        format!(
            "projects/{}/instances/{}/tables/{}",
            self.project_id, self.instance_name, self.table_name
        )
    }
}

/// Row sink writing to one Bigtable table.
///
/// Rows go through the data API (`bigtable.googleapis.com`); the optional
/// admin client (`bigtableadmin.googleapis.com`) is only used to check that
/// the table exists.
#[derive(Debug, Clone)]
pub struct BigtableSink {
    data: RestClient,
    admin: Option<RestClient>,
    table: BigtableTable,
}

impl BigtableSink {
    /// Create a sink without contacting Bigtable.
    pub fn new(data: RestClient, table: BigtableTable) -> Self {
        Self {
            data,
            admin: None,
            table,
        }
    }

    /// Create a sink and check through the admin API that the table exists.
    ///
    /// A missing table only produces a warning and a failed check is only
    /// logged: writes will report their own errors later.
    pub async fn connect(data: RestClient, admin: RestClient, table: BigtableTable) -> Self {
        tracing::info!(
            "Initializing connection to Bigtable instance: {}, table: {}",
            table.instance_name,
            table.table_name
        );

        let sink = Self {
            data,
            admin: Some(admin),
            table,
        };
        match sink.table_exists().await {
            Ok(true) => {
                tracing::info!("Connected to Bigtable table: {}", sink.table.table_name);
            }
            Ok(false) => {
                tracing::warn!(
                    "Table {} does not exist - please ensure it is created",
                    sink.table.table_name
                );
            }
            Err(e) => {
                tracing::error!("Failed to initialize Bigtable connection: {e:#}");
            }
        }
        sink
    }

    pub fn table(&self) -> &BigtableTable {
        &self.table
    }

    /// Whether the table is visible through the admin API.
    pub async fn table_exists(&self) -> anyhow::Result<bool> {
        let admin = self
            .admin
            .as_ref()
            .context("No Bigtable admin endpoint configured")?;
        let path = format!("v2/{}?view=NAME_ONLY", self.table.resource_name());
        let status = admin
            .get_status(&path)
            .await
            .context("Failed to look up Bigtable table")?;

        if status.is_success() {
            Ok(true)
        } else if status == StatusCode::NOT_FOUND {
            Ok(false)
        } else {
            anyhow::bail!("Bigtable table lookup returned status {status}")
        }
    }

    async fn try_insert(
        &self,
        row_key: &str,
        data: &ColumnFamily,
        meta: &ColumnFamily,
    ) -> anyhow::Result<()> {
        let meta = format_family(meta);
        let data = format_family(data);
        let request = MutateRowRequest::new(row_key, &[(META_FAMILY, &meta), (DATA_FAMILY, &data)]);

        let path = format!("v2/{}:mutateRow", self.table.resource_name());
        let _: serde_json::Value = self
            .data
            .post_json(&path, &request)
            .await
            .with_context(|| format!("mutateRow failed for row key {row_key}"))?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl RowSink for BigtableSink {
    async fn insert_event(&self, row_key: &str, data: &ColumnFamily, meta: &ColumnFamily) -> bool {
        match self.try_insert(row_key, data, meta).await {
            Ok(()) => {
                tracing::info!("Event saved to Bigtable with row key: {row_key}");
                true
            }
            Err(e) => {
                tracing::error!("Error saving event to Bigtable: {e}");
                tracing::debug!("Bigtable write failure detail: {e:?}");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Bytes;
    use axum::extract::State;
    use axum::http::{Method, StatusCode as AxumStatus, Uri};
    use axum::response::{IntoResponse, Response};
    use axum::Router;
    use base64::Engine;
    use gcp_rest::Credentials;
    use relay_types::ColumnValue;
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};
    use tokio::net::TcpListener;

    #[derive(Clone, Default)]
    struct MockBigtable {
        requests: Arc<Mutex<Vec<(Method, String, Value)>>>,
        fail_writes: bool,
        table_exists: bool,
    }

    async fn handle(
        State(mock): State<MockBigtable>,
        method: Method,
        uri: Uri,
        body: Bytes,
    ) -> Response {
        let body: Value = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).unwrap()
        };
        mock.requests
            .lock()
            .unwrap()
            .push((method.clone(), uri.to_string(), body));

        if method == Method::GET {
            if mock.table_exists {
                return axum::Json(json!({"name": "projects/p/instances/i/tables/events"}))
                    .into_response();
            }
            return AxumStatus::NOT_FOUND.into_response();
        }
        if mock.fail_writes {
            return (AxumStatus::SERVICE_UNAVAILABLE, "unavailable").into_response();
        }
        axum::Json(json!({})).into_response()
    }

    async fn start_mock(mock: MockBigtable) -> RestClient {
        let app = Router::new().fallback(handle).with_state(mock);
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        RestClient::new(format!("http://{addr}"), Credentials::None).unwrap()
    }

    fn table() -> BigtableTable {
        BigtableTable::new("p", "i", "events")
    }

    fn families() -> (ColumnFamily, ColumnFamily) {
        let mut data = ColumnFamily::new();
        data.insert("eventId".to_string(), ColumnValue::from("E1"));
        data.insert("eventBody".to_string(), ColumnValue::Json(json!({"x": 1})));
        let mut meta = ColumnFamily::new();
        meta.insert("status".to_string(), ColumnValue::from("PENDING"));
        (data, meta)
    }

    fn decode(value: &Value) -> String {
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(value.as_str().unwrap())
            .unwrap();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_resource_name() {
        assert_eq!(table().resource_name(), "projects/p/instances/i/tables/events");
    }

    #[tokio::test]
    async fn test_insert_event_writes_both_families() {
        let mock = MockBigtable::default();
        let requests = Arc::clone(&mock.requests);
        let sink = BigtableSink::new(start_mock(mock).await, table());
        let (data, meta) = families();

        assert!(sink.insert_event("E1-1700000000000", &data, &meta).await);

        let requests = requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        let (method, path, body) = &requests[0];
        assert_eq!(*method, Method::POST);
        assert_eq!(path, "/v2/projects/p/instances/i/tables/events:mutateRow");
        assert_eq!(decode(&body["rowKey"]), "E1-1700000000000");

        let cells: Vec<(String, String, String)> = body["mutations"]
            .as_array()
            .unwrap()
            .iter()
            .map(|m| {
                let cell = &m["setCell"];
                (
                    cell["familyName"].as_str().unwrap().to_string(),
                    decode(&cell["columnQualifier"]),
                    decode(&cell["value"]),
                )
            })
            .collect();
        assert_eq!(
            cells,
            vec![
                ("meta".to_string(), "status".to_string(), "PENDING".to_string()),
                ("data".to_string(), "eventBody".to_string(), r#"{"x":1}"#.to_string()),
                ("data".to_string(), "eventId".to_string(), "E1".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_insert_event_failure_returns_false() {
        let mock = MockBigtable {
            fail_writes: true,
            ..Default::default()
        };
        let sink = BigtableSink::new(start_mock(mock).await, table());
        let (data, meta) = families();

        assert!(!sink.insert_event("E1-1", &data, &meta).await);
    }

    #[tokio::test]
    async fn test_insert_event_unreachable_store_returns_false() {
        let client = RestClient::new("http://127.0.0.1:1", Credentials::None).unwrap();
        let sink = BigtableSink::new(client, table());
        let (data, meta) = families();

        assert!(!sink.insert_event("E1-1", &data, &meta).await);
    }

    #[tokio::test]
    async fn test_connect_checks_existing_table() {
        let mock = MockBigtable {
            table_exists: true,
            ..Default::default()
        };
        let requests = Arc::clone(&mock.requests);
        let client = start_mock(mock).await;
        let sink = BigtableSink::connect(client.clone(), client, table()).await;

        assert!(sink.table_exists().await.unwrap());
        let requests = requests.lock().unwrap();
        assert_eq!(
            requests[0].1,
            "/v2/projects/p/instances/i/tables/events?view=NAME_ONLY"
        );
    }

    #[tokio::test]
    async fn test_missing_table_is_not_fatal() {
        let client = start_mock(MockBigtable::default()).await;
        let sink = BigtableSink::connect(client.clone(), client, table()).await;

        assert!(!sink.table_exists().await.unwrap());
        assert_eq!(sink.table().table_name, "events");
    }

    #[tokio::test]
    async fn test_table_exists_requires_admin_client() {
        let client = start_mock(MockBigtable::default()).await;
        let sink = BigtableSink::new(client, table());

        assert!(sink.table_exists().await.is_err());
    }
}
