//! pubsub-relay library
//!
//! Receives Pub/Sub messages, stores each JSON event as a Bigtable row and
//! republishes it to a downstream topic.
//!
//! # Pipeline Crates
//!
//! - `pubsub_source` - decoding and the per-message pipeline
//! - `row_sink` / `bigtable_sink` - row store abstraction and the Bigtable writer
//! - `pubsub_publisher` - downstream topic publishing
//! - `gcp_rest` - authenticated REST client shared by both Google integrations
//!
//! # CLI Usage
//!
//! ```bash
//! # Serve push deliveries on :8080
//! pubsub-relay serve --gcp-project-id my-project \
//!   --bigtable-instance events --bigtable-table events \
//!   --pubsub-topic processed-events
//!
//! # Process a single envelope from a file without touching Google Cloud
//! pubsub-relay process --file envelope.json --pubsub-topic processed-events --dry-run
//! ```

use clap::Parser;

pub mod connect;
pub mod server;
pub mod trigger;

#[derive(Parser, Clone, Debug)]
pub struct GcpOpts {
    /// Google Cloud project that owns the Bigtable instance and the topic
    #[arg(long, env = "GCP_PROJECT_ID")]
    pub gcp_project_id: Option<String>,

    /// Static OAuth access token (e.g. from `gcloud auth print-access-token`)
    #[arg(long, env = "GOOGLE_OAUTH_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: Option<String>,

    /// Send requests without credentials (emulators)
    #[arg(long, conflicts_with = "access_token")]
    pub no_auth: bool,
}

#[derive(Parser, Clone, Debug)]
pub struct BigtableOpts {
    /// Bigtable instance name
    #[arg(long, env = "BIGTABLE_INSTANCE_NAME")]
    pub bigtable_instance: Option<String>,

    /// Bigtable table the events are written to
    #[arg(long, env = "BIGTABLE_TABLE_NAME")]
    pub bigtable_table: Option<String>,

    /// Bigtable Data API endpoint
    #[arg(
        long,
        default_value = "https://bigtable.googleapis.com",
        env = "BIGTABLE_ENDPOINT"
    )]
    pub bigtable_endpoint: String,

    /// Bigtable Admin API endpoint, used to check that the table exists
    #[arg(
        long,
        default_value = "https://bigtableadmin.googleapis.com",
        env = "BIGTABLE_ADMIN_ENDPOINT"
    )]
    pub bigtable_admin_endpoint: String,
}

#[derive(Parser, Clone, Debug)]
pub struct PubsubOpts {
    /// Topic every relayed event is published to (short or fully qualified name)
    #[arg(long, env = "PUBSUB_TOPIC_NAME")]
    pub pubsub_topic: String,

    /// Pub/Sub API endpoint
    #[arg(
        long,
        default_value = "https://pubsub.googleapis.com",
        env = "PUBSUB_ENDPOINT"
    )]
    pub pubsub_endpoint: String,
}

#[derive(Parser, Clone, Debug)]
pub struct ServerOpts {
    /// Address to listen on
    #[arg(long, default_value = "0.0.0.0", env = "HOST")]
    pub host: String,

    /// Port to listen on
    #[arg(long, default_value = "8080", env = "PORT")]
    pub port: u16,
}

/// Everything needed to build a message processor.
#[derive(Parser, Clone, Debug)]
pub struct RelayOpts {
    #[command(flatten)]
    pub gcp: GcpOpts,

    #[command(flatten)]
    pub bigtable: BigtableOpts,

    #[command(flatten)]
    pub pubsub: PubsubOpts,

    /// Dry run mode - keep rows and published messages in memory
    #[arg(long)]
    pub dry_run: bool,
}
