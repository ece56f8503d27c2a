//! aemula-server: publish and resolve articles over HTTP or from the shell
//!
//! Without a subcommand the HTTP API is served. The other subcommands run a
//! single pipeline operation against the configured backend and print JSON.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use aemula::store::ContentStore;
use aemula::{
    ArticleDraft, ContentAddress, PublishPipeline, ResolutionPipeline, StaticAddressSource,
};
use aemula_server::{create_router, log_filter, AppState, Backend, Config};
use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

#[derive(Parser)]
#[command(name = "aemula-server")]
#[command(about = "Publish articles as content-addressed blobs and resolve them back")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, env = "AEMULA_CONFIG", default_value = "aemula.toml")]
    config: PathBuf,

    /// Storage backend (overrides config file)
    #[arg(long, value_enum)]
    backend: Option<Backend>,

    /// Pinning API token (overrides config file)
    #[arg(long, env = "PINATA_JWT", hide_env_values = true)]
    jwt: Option<String>,

    /// IPFS gateway host (overrides config file)
    #[arg(long, env = "PINATA_GATEWAY")]
    gateway: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the HTTP API
    Serve {
        /// Listen address (overrides config file)
        #[arg(long, env = "AEMULA_LISTEN")]
        listen: Option<SocketAddr>,
    },
    /// Publish a draft read from a JSON file (`-` for stdin)
    Publish {
        file: PathBuf,
        /// Read the blob back and check it after publishing
        #[arg(long)]
        verify: bool,
    },
    /// Resolve content addresses into article records
    Resolve {
        #[arg(required = true)]
        cids: Vec<String>,
        #[arg(long)]
        max_concurrency: Option<usize>,
    },
    /// Resolve the configured feed
    Feed,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so subcommand output stays pipeable
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(
            std::env::var(tracing_subscriber::EnvFilter::DEFAULT_ENV)
                .ok()
                .as_deref(),
        ))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = Config::load(&cli.config)?;

    // Apply CLI overrides
    if let Some(backend) = cli.backend {
        config.store.backend = backend;
    }
    if let Some(jwt) = cli.jwt {
        config.store.jwt = Some(jwt);
    }
    if let Some(gateway) = cli.gateway {
        config.store.gateway = Some(gateway);
    }

    let store = config.build_store()?;
    let pipeline = config.pipeline.to_pipeline_config();
    info!(backend = store.backend(), "store ready");

    match cli.command.unwrap_or(Command::Serve { listen: None }) {
        Command::Serve { listen } => {
            let addr = listen.unwrap_or(config.server.listen);
            let feed = Arc::new(StaticAddressSource::new(config.feed.cids.clone()));
            let app = create_router(AppState::new(store, pipeline, feed));

            let listener = tokio::net::TcpListener::bind(addr)
                .await
                .with_context(|| format!("binding {}", addr))?;
            info!("API listening on http://{}", addr);
            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal())
                .await?;
        }
        Command::Publish { file, verify } => {
            let draft = read_draft(&file)?;
            let publisher = PublishPipeline::new(store, pipeline);
            let cid = publisher.publish(draft.clone()).await?;
            if verify {
                let record = publisher.verify(&cid, draft).await?;
                println!("{}", serde_json::to_string_pretty(&record)?);
            } else {
                println!("{}", serde_json::json!({ "cid": cid }));
            }
        }
        Command::Resolve {
            cids,
            max_concurrency,
        } => {
            let cids: Vec<ContentAddress> = cids.into_iter().map(ContentAddress::new).collect();
            let records = ResolutionPipeline::new(store, pipeline)
                .resolve_batch(&cids, max_concurrency)
                .await;
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
        Command::Feed => {
            let source = StaticAddressSource::new(config.feed.cids.clone());
            let records = ResolutionPipeline::new(store, pipeline)
                .resolve_feed(&source)
                .await?;
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
    }

    Ok(())
}

fn read_draft(file: &Path) -> anyhow::Result<ArticleDraft> {
    let content = if file.as_os_str() == "-" {
        std::io::read_to_string(std::io::stdin())?
    } else {
        std::fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))?
    };
    serde_json::from_str(&content).context("draft must be a JSON object")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
