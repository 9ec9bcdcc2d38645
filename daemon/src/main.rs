//! Hushcom daemon: runs the server engine.
//!
//! The relay substrate is external. This binary bridges it over stdio:
//! inbound frames arrive as base64 lines on stdin, and outbound deliveries
//! leave as JSON lines on stdout. Logs go to stderr.

use std::path::PathBuf;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use clap::Parser;
use hushcom_node::{
    init_logging, run_dispatch_loop, InboundQueue, MailboxRelay, NodeConfig, ShutdownController,
};
use hushcom_relay::{Delivery, Route};
use hushcom_server::ServerEngine;
use hushcom_types::SystemClock;
use serde::Serialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;

#[derive(Parser)]
#[command(name = "hushcomd", about = "Hushcom server daemon")]
struct Cli {
    /// Nickname the server answers as.
    #[arg(long, env = "HUSHCOM_SERVER_NAME")]
    server_name: Option<String>,

    /// Base64 secret of the server content key.
    #[arg(long, env = "HUSHCOM_CONTENT_KEY", hide_env_values = true)]
    content_key: Option<String>,

    /// Bound of the inbound frame queue.
    #[arg(long, env = "HUSHCOM_QUEUE_CAPACITY")]
    queue_capacity: Option<usize>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "HUSHCOM_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "HUSHCOM_LOG_FORMAT")]
    log_format: Option<String>,

    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Subcommand.
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Run the server.
    #[command(name = "server")]
    Server {
        #[command(subcommand)]
        action: ServerAction,
    },
    /// Print a fresh key pair in base64.
    Keygen,
}

#[derive(clap::Subcommand)]
enum ServerAction {
    /// Run the server engine on stdio.
    Run,
}

/// One outbound delivery, as written to stdout.
#[derive(Serialize)]
struct OutboundLine<'a> {
    route: &'static str,
    to: &'a str,
    frame: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    dest_key: Option<String>,
}

impl<'a> From<&'a Delivery> for OutboundLine<'a> {
    fn from(delivery: &'a Delivery) -> Self {
        let (route, to) = match &delivery.route {
            Route::Direct(nick) => ("direct", nick.as_str()),
            Route::Channel(name) => ("channel", name.as_str()),
        };
        Self {
            route,
            to,
            frame: BASE64.encode(&delivery.frame),
            dest_key: delivery.dest_key.as_ref().map(|k| k.to_b64()),
        }
    }
}

fn merge_config(cli: &Cli) -> anyhow::Result<NodeConfig> {
    let file_config = match &cli.config {
        Some(path) => NodeConfig::from_toml_file(path)?,
        None => NodeConfig::default(),
    };
    let config = NodeConfig {
        server_name: cli
            .server_name
            .clone()
            .unwrap_or(file_config.server_name.clone()),
        content_key: cli.content_key.clone().or(file_config.content_key.clone()),
        inbound_queue_capacity: cli
            .queue_capacity
            .unwrap_or(file_config.inbound_queue_capacity),
        log_level: cli.log_level.clone().unwrap_or(file_config.log_level.clone()),
        log_format: cli
            .log_format
            .clone()
            .unwrap_or(file_config.log_format.clone()),
    };
    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Keygen => {
            let pair = hushcom_crypto::generate_keypair()?;
            println!("public: {}", pair.public.to_b64());
            println!("secret: {}", pair.secret.to_b64());
            Ok(())
        }
        Command::Server { ref action } => match action {
            ServerAction::Run => {
                let config = merge_config(&cli)?;
                init_logging(config.log_format(), &config.log_level)?;
                if let Some(path) = &cli.config {
                    tracing::info!("loaded config from {}", path.display());
                }
                run_server(config).await
            }
        },
    }
}

async fn run_server(config: NodeConfig) -> anyhow::Result<()> {
    let (content, generated) = config.content_keypair()?;
    if generated {
        tracing::warn!("no content key configured, generated an ephemeral one");
    }
    tracing::info!(content_key = %content.public, "public content key");

    let (relay, outbound) = MailboxRelay::new(
        content.public.clone(),
        content.public.clone(),
        config.inbound_queue_capacity,
    );
    let mut engine = ServerEngine::new(relay, config.server_name.clone(), Arc::new(SystemClock));
    let (queue, inbound) = InboundQueue::bounded(config.inbound_queue_capacity);

    let shutdown = Arc::new(ShutdownController::new());
    let dispatch_shutdown = shutdown.subscribe();

    let signals = {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if let Err(e) = shutdown.wait_for_signal().await {
                tracing::error!("failed to install signal handlers: {e}");
            }
        })
    };
    let writer = tokio::spawn(write_outbound(outbound));
    let reader = tokio::spawn(read_inbound(
        BufReader::new(tokio::io::stdin()),
        queue,
        shutdown.subscribe(),
    ));

    tracing::info!(
        server = %config.server_name,
        queue = config.inbound_queue_capacity,
        "Hushcom server running"
    );
    let stats = run_dispatch_loop(&mut engine, inbound, dispatch_shutdown).await;

    // Dropping the engine drops the relay, which closes the outbound queue.
    drop(engine);
    signals.abort();
    shutdown.shutdown();
    let read_result = reader.await?;
    writer.await??;
    read_result?;

    tracing::info!(
        handled = stats.handled,
        failed = stats.failed,
        "Hushcom daemon exited cleanly"
    );
    Ok(())
}

/// Read base64 frames, one per line, until EOF or shutdown.
///
/// Lines that are not UTF-8 or not base64 are skipped with a warning.
async fn read_inbound<R: AsyncBufRead + Unpin>(
    mut input: R,
    queue: InboundQueue,
    mut shutdown: tokio::sync::broadcast::Receiver<()>,
) -> anyhow::Result<()> {
    let mut line = Vec::new();
    loop {
        line.clear();
        let read = tokio::select! {
            _ = shutdown.recv() => break,
            read = input.read_until(b'\n', &mut line) => read?,
        };
        if read == 0 {
            tracing::info!("stdin closed");
            break;
        }
        let Some(frame) = decode_line(&line) else {
            continue;
        };
        if queue.push(frame).await.is_err() {
            tracing::debug!("inbound queue closed, reader stopping");
            break;
        }
    }
    Ok(())
}

fn decode_line(line: &[u8]) -> Option<Vec<u8>> {
    let line = match std::str::from_utf8(line) {
        Ok(line) => line.trim(),
        Err(e) => {
            tracing::warn!("skipping inbound line that is not UTF-8: {e}");
            return None;
        }
    };
    if line.is_empty() {
        return None;
    }
    match BASE64.decode(line) {
        Ok(frame) => Some(frame),
        Err(e) => {
            tracing::warn!("skipping inbound line that is not base64: {e}");
            None
        }
    }
}

/// Write each outbound delivery to stdout as one JSON line.
async fn write_outbound(mut outbound: mpsc::Receiver<Delivery>) -> anyhow::Result<()> {
    let mut stdout = tokio::io::stdout();
    while let Some(delivery) = outbound.recv().await {
        let mut line = serde_json::to_vec(&OutboundLine::from(&delivery))?;
        line.push(b'\n');
        stdout.write_all(&line).await?;
        stdout.flush().await?;
    }
    Ok(())
}
