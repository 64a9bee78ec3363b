use thiserror::Error;

#[derive(Error, Debug)]
pub enum PublishError {
    #[error("Failed to serialize message data: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Pub/Sub request failed: {0}")]
    Rest(#[from] gcp_rest::RestError),

    #[error("Pub/Sub returned no message id for topic {topic}")]
    MissingMessageId { topic: String },

    #[error("Publishing to {topic} was rejected: {reason}")]
    Rejected { topic: String, reason: String },
}

pub type Result<T> = std::result::Result<T, PublishError>;
