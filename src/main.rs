//! Command-line interface for pubsub-relay
//!
//! # Usage Examples
//!
//! ## Serve push deliveries
//! ```bash
//! pubsub-relay serve \
//!   --gcp-project-id my-project \
//!   --bigtable-instance events --bigtable-table events \
//!   --pubsub-topic processed-events --port 8080
//! ```
//!
//! ## Process one message
//! ```bash
//! # From a file, against local emulators
//! pubsub-relay process --file envelope.json --no-auth \
//!   --gcp-project-id local \
//!   --bigtable-instance events --bigtable-table events \
//!   --bigtable-endpoint http://localhost:8086 \
//!   --bigtable-admin-endpoint http://localhost:8086 \
//!   --pubsub-topic processed-events --pubsub-endpoint http://localhost:8085
//!
//! # From stdin, keeping everything in memory
//! cat envelope.json | pubsub-relay process --pubsub-topic processed-events --dry-run
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use pubsub_publisher::{MemoryPublisher, RelayPublisher};
use pubsub_relay::{connect, server, trigger, RelayOpts, ServerOpts};
use pubsub_source::MessageProcessor;
use row_sink::{MemoryRowSink, RowSink};

#[derive(Parser)]
#[command(name = "pubsub-relay")]
#[command(about = "Store Pub/Sub events in Bigtable and relay them to another topic")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve Pub/Sub push deliveries over HTTP
    Serve {
        #[command(flatten)]
        relay: RelayOpts,

        #[command(flatten)]
        server: ServerOpts,
    },

    /// Process a single message read from a file or stdin
    Process {
        #[command(flatten)]
        relay: RelayOpts,

        /// Event JSON file (bare message or push wrapper); stdin when omitted
        #[arg(long, value_name = "PATH")]
        file: Option<PathBuf>,
    },
}

enum Action {
    Serve(ServerOpts),
    Process(Option<PathBuf>),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let (relay, action) = match cli.command {
        Commands::Serve { relay, server } => (relay, Action::Serve(server)),
        Commands::Process { relay, file } => (relay, Action::Process(file)),
    };
    let topic = relay.pubsub.pubsub_topic.clone();

    if relay.dry_run {
        tracing::info!("Running in dry-run mode - nothing will be written to Bigtable or Pub/Sub");
        let processor = MessageProcessor::new(
            Arc::new(MemoryRowSink::new()),
            Arc::new(MemoryPublisher::new()),
            topic,
        );
        return dispatch(action, processor).await;
    }

    let credentials = connect::resolve_credentials(&relay.gcp).await?;
    let sink = connect::connect_bigtable(&relay.gcp, &relay.bigtable, credentials.clone()).await?;
    let publisher = connect::connect_pubsub(&relay.gcp, &relay.pubsub, credentials)?;

    let processor = MessageProcessor::new(Arc::new(sink), Arc::new(publisher), topic);
    dispatch(action, processor).await
}

async fn dispatch<S, P>(action: Action, processor: MessageProcessor<S, P>) -> anyhow::Result<()>
where
    S: RowSink + 'static,
    P: RelayPublisher + 'static,
{
    match action {
        Action::Serve(opts) => server::serve(Arc::new(processor), &opts).await,
        Action::Process(file) => {
            trigger::run_once(&processor, file.as_deref()).await?;
            Ok(())
        }
    }
}
