//! Cloud Pub/Sub publisher over the REST API (`topics.publish`).

use base64::Engine;
use gcp_rest::RestClient;
use relay_types::Attributes;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{PublishError, Result};
use crate::traits::RelayPublisher;

#[derive(Debug, Serialize)]
struct PublishRequest<'a> {
    messages: Vec<OutgoingMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct OutgoingMessage<'a> {
    data: String,
    attributes: &'a Attributes,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PublishResponse {
    #[serde(default)]
    message_ids: Vec<String>,
}

/// Full topic resource name for `topic` in `project_id`.
///
/// Names that are already fully qualified (`projects/.../topics/...`) are
/// returned unchanged.
pub fn topic_path(project_id: &str, topic: &str) -> String {
    if topic.starts_with("projects/") {
        topic.to_string()
    } else {
        format!("projects/{project_id}/topics/{topic}")
    }
}

/// Publisher bound to one Google Cloud project.
#[derive(Debug, Clone)]
pub struct PubsubPublisher {
    client: RestClient,
    project_id: String,
}

impl PubsubPublisher {
    pub fn new(client: RestClient, project_id: impl Into<String>) -> Self {
        Self {
            client,
            project_id: project_id.into(),
        }
    }

    async fn try_publish(&self, topic: &str, data: &Value, attributes: &Attributes) -> Result<String> {
        let encoded = serde_json::to_vec(data)?;
        let request = PublishRequest {
            messages: vec![OutgoingMessage {
                data: base64::engine::general_purpose::STANDARD.encode(encoded),
                attributes,
            }],
        };

        let path = format!("v1/{}:publish", topic_path(&self.project_id, topic));
        let response: PublishResponse = self.client.post_json(&path, &request).await?;

        response
            .message_ids
            .into_iter()
            .next()
            .ok_or_else(|| PublishError::MissingMessageId {
                topic: topic.to_string(),
            })
    }
}

#[async_trait::async_trait]
impl RelayPublisher for PubsubPublisher {
    async fn publish_message(
        &self,
        topic: &str,
        data: &Value,
        attributes: &Attributes,
    ) -> Result<String> {
        match self.try_publish(topic, data, attributes).await {
            Ok(message_id) => {
                tracing::debug!("📤 Message published to {topic}: {message_id}");
                Ok(message_id)
            }
            Err(e) => {
                tracing::error!("Failed to publish message to {topic}: {e}");
                tracing::debug!("Publish failure detail: {e:?}");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Bytes;
    use axum::extract::State;
    use axum::http::{StatusCode, Uri};
    use axum::response::{IntoResponse, Response};
    use axum::Router;
    use gcp_rest::Credentials;
    use serde_json::json;
    use std::sync::{Arc, Mutex};
    use tokio::net::TcpListener;

    #[derive(Clone)]
    struct MockPubsub {
        requests: Arc<Mutex<Vec<(String, Value)>>>,
        response: (StatusCode, Value),
    }

    impl MockPubsub {
        fn replying(status: StatusCode, body: Value) -> Self {
            Self {
                requests: Arc::new(Mutex::new(Vec::new())),
                response: (status, body),
            }
        }
    }

    async fn handle(State(mock): State<MockPubsub>, uri: Uri, body: Bytes) -> Response {
        let body: Value = serde_json::from_slice(&body).unwrap();
        mock.requests.lock().unwrap().push((uri.to_string(), body));
        let (status, body) = mock.response.clone();
        (status, axum::Json(body)).into_response()
    }

    async fn start_mock(mock: MockPubsub) -> RestClient {
        let app = Router::new().fallback(handle).with_state(mock);
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        RestClient::new(format!("http://{addr}"), Credentials::None).unwrap()
    }

    fn attributes() -> Attributes {
        let mut attributes = Attributes::new();
        attributes.insert("eventId".to_string(), "E1".to_string());
        attributes.insert("source".to_string(), "billing".to_string());
        attributes
    }

    #[test]
    fn test_topic_path() {
        assert_eq!(topic_path("p", "events"), "projects/p/topics/events");
        assert_eq!(
            topic_path("p", "projects/other/topics/events"),
            "projects/other/topics/events"
        );
    }

    #[tokio::test]
    async fn test_publish_message_returns_message_id() {
        let mock = MockPubsub::replying(StatusCode::OK, json!({"messageIds": ["1234"]}));
        let requests = Arc::clone(&mock.requests);
        let publisher = PubsubPublisher::new(start_mock(mock).await, "p");

        let id = publisher
            .publish_message("events", &json!({"eventId": "E1", "x": 1}), &attributes())
            .await
            .unwrap();

        assert_eq!(id, "1234");
        let requests = requests.lock().unwrap();
        assert_eq!(requests[0].0, "/v1/projects/p/topics/events:publish");

        let message = &requests[0].1["messages"][0];
        assert_eq!(message["attributes"], json!({"eventId": "E1", "source": "billing"}));
        let data = base64::engine::general_purpose::STANDARD
            .decode(message["data"].as_str().unwrap())
            .unwrap();
        let data: Value = serde_json::from_slice(&data).unwrap();
        assert_eq!(data, json!({"eventId": "E1", "x": 1}));
    }

    #[tokio::test]
    async fn test_publish_failure_propagates() {
        let mock = MockPubsub::replying(
            StatusCode::NOT_FOUND,
            json!({"error": {"code": 404, "message": "Resource not found"}}),
        );
        let publisher = PubsubPublisher::new(start_mock(mock).await, "p");

        let err = publisher
            .publish_message("missing", &json!({}), &Attributes::new())
            .await
            .unwrap_err();

        assert!(matches!(err, PublishError::Rest(_)));
        assert!(err.to_string().contains("404"));
    }

    #[tokio::test]
    async fn test_empty_message_ids_is_an_error() {
        let mock = MockPubsub::replying(StatusCode::OK, json!({}));
        let publisher = PubsubPublisher::new(start_mock(mock).await, "p");

        let err = publisher
            .publish_message("events", &json!({}), &Attributes::new())
            .await
            .unwrap_err();

        assert!(matches!(err, PublishError::MissingMessageId { .. }));
    }
}
