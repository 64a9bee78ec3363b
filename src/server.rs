//! HTTP server for push deliveries.
//!
//! - `POST /pubsub/push` takes the push wrapper and answers 500 on a failed
//!   relay so the subscription redelivers the message
//! - `POST /pubsub/test` takes a bare message, for manual testing

use std::sync::Arc;

use anyhow::Context;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use pubsub_publisher::RelayPublisher;
use pubsub_source::MessageProcessor;
use relay_types::Envelope;
use row_sink::RowSink;
use serde_json::{json, Value};
use tokio::net::TcpListener;

use crate::trigger::{envelope_from_event, log_raw_event, process_event};
use crate::ServerOpts;

type SharedProcessor<S, P> = Arc<MessageProcessor<S, P>>;

pub fn router<S, P>(processor: SharedProcessor<S, P>) -> Router
where
    S: RowSink + 'static,
    P: RelayPublisher + 'static,
{
    Router::new()
        .route("/pubsub/push", post(handle_push::<S, P>))
        .route("/pubsub/test", post(handle_test::<S, P>))
        .with_state(processor)
}

fn internal_server_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({"statusCode": 500, "message": "Internal Server Error"})),
    )
        .into_response()
}

async fn handle_push<S, P>(
    State(processor): State<SharedProcessor<S, P>>,
    Json(event): Json<Value>,
) -> Response
where
    S: RowSink + 'static,
    P: RelayPublisher + 'static,
{
    log_raw_event(&event);

    let envelope = match envelope_from_event(event) {
        Ok(envelope) => envelope,
        Err(e) => {
            tracing::warn!("Ignoring push request that is not a Pub/Sub message: {e}");
            return StatusCode::BAD_REQUEST.into_response();
        }
    };

    match process_event(&*processor, &envelope).await {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(_) => internal_server_error(),
    }
}

async fn handle_test<S, P>(
    State(processor): State<SharedProcessor<S, P>>,
    Json(envelope): Json<Envelope>,
) -> Response
where
    S: RowSink + 'static,
    P: RelayPublisher + 'static,
{
    match processor.handle_message(&envelope).await {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => {
            tracing::error!("Error handling Pub/Sub event: {e}");
            tracing::debug!("Pub/Sub event failure detail: {e:?}");
            internal_server_error()
        }
    }
}

/// Serve until Ctrl+C.
pub async fn serve<S, P>(processor: SharedProcessor<S, P>, opts: &ServerOpts) -> anyhow::Result<()>
where
    S: RowSink + 'static,
    P: RelayPublisher + 'static,
{
    let addr = format!("{}:{}", opts.host, opts.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    tracing::info!(
        "Listening on {} (relaying to {})",
        listener.local_addr()?,
        processor.topic_name()
    );

    axum::serve(listener, router(processor))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Received Ctrl+C, shutting down"),
        Err(e) => tracing::warn!("Failed to listen for Ctrl+C: {e}"),
    }
}
