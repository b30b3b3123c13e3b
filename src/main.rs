//! pushview binary
//!
//! Serves the live view and reads triggers from standard input, one per line:
//! `a` (or `analyze`) captures and analyzes, `b` (or `optimize`) improves the
//! previous answer. A global hotkey tool can drive it by writing to the pipe.
//!
//! ```text
//! pushview --capture-cmd 'screencapture -x /tmp/s.png && tesseract /tmp/s.png -' \
//!          --analyze-cmd 'llm -s "$PUSHVIEW_SYSTEM_PROMPT"'
//! ```

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing_subscriber::EnvFilter;

use pushview::hub::config::{
    DEFAULT_KEEPALIVE_INTERVAL, DEFAULT_QUEUE_CAPACITY, DEFAULT_SEND_TIMEOUT,
};
use pushview::producer::{Analyzer, CommandAnalyzer, CommandSource, PassThrough, TextSource};
use pushview::server::local_ip;
use pushview::{
    BroadcastHub, HttpServer, HubConfig, Pipeline, ProducerConfig, ServerConfig, Trigger,
    TriggerRunner,
};

#[derive(Parser, Debug)]
#[command(name = "pushview", version)]
#[command(about = "Push the latest analysis result to every connected browser")]
struct Cli {
    /// Address to serve the live view on
    #[arg(long, env = "PUSHVIEW_BIND", default_value = "0.0.0.0:8000")]
    bind: SocketAddr,

    /// Pending messages per viewer before new ones are dropped
    #[arg(long, env = "PUSHVIEW_QUEUE_CAPACITY", default_value_t = DEFAULT_QUEUE_CAPACITY)]
    queue_capacity: usize,

    /// Idle seconds before a keep-alive ping is sent
    #[arg(
        long,
        env = "PUSHVIEW_KEEPALIVE_SECS",
        default_value_t = DEFAULT_KEEPALIVE_INTERVAL.as_secs()
    )]
    keepalive_secs: u64,

    /// Seconds a single write to a viewer may take
    #[arg(
        long,
        env = "PUSHVIEW_SEND_TIMEOUT_SECS",
        default_value_t = DEFAULT_SEND_TIMEOUT.as_secs()
    )]
    send_timeout_secs: u64,

    /// Maximum concurrent viewers (0 = unlimited)
    #[arg(long, env = "PUSHVIEW_MAX_SUBSCRIBERS", default_value_t = 0)]
    max_subscribers: usize,

    /// Shell command printing the recognized screen text
    #[arg(long, env = "PUSHVIEW_CAPTURE_CMD")]
    capture_cmd: Option<String>,

    /// Shell command reading a prompt on stdin and printing the answer
    #[arg(long, env = "PUSHVIEW_ANALYZE_CMD")]
    analyze_cmd: Option<String>,

    /// Triggers processed at the same time
    #[arg(long, env = "PUSHVIEW_WORKERS", default_value_t = 1)]
    workers: usize,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("pushview=debug".parse()?))
        .init();

    let hub_config = HubConfig::default()
        .queue_capacity(cli.queue_capacity)
        .keepalive_interval(Duration::from_secs(cli.keepalive_secs))
        .send_timeout(Duration::from_secs(cli.send_timeout_secs))
        .max_subscribers(cli.max_subscribers);
    hub_config.validate()?;

    let mut producer_config = ProducerConfig::default().workers(cli.workers);
    if let Some(command) = cli.capture_cmd {
        producer_config = producer_config.capture_command(command);
    }
    if let Some(command) = cli.analyze_cmd {
        producer_config = producer_config.analyze_command(command);
    }

    let hub = Arc::new(BroadcastHub::with_config(hub_config));

    let source = producer_config
        .capture_command
        .as_deref()
        .map(|command| Box::new(CommandSource::new(command)) as Box<dyn TextSource>);
    let analyzer: Box<dyn Analyzer> = match producer_config.analyze_command.as_deref() {
        Some(command) => Box::new(CommandAnalyzer::new(command)),
        None => Box::new(PassThrough),
    };
    if source.is_none() {
        tracing::warn!("No capture command configured; analyze triggers will publish a diagnostic");
    }

    let pipeline = Arc::new(Pipeline::new(Arc::clone(&hub), source, analyzer));
    let (trigger_tx, trigger_rx) = mpsc::channel(producer_config.trigger_buffer);
    let producer = tokio::spawn(TriggerRunner::new(pipeline, &producer_config).run(trigger_rx));
    tokio::spawn(read_triggers(trigger_tx));

    let server_config = ServerConfig::with_addr(cli.bind);
    let port = server_config.bind_addr.port();

    println!("Live view:  http://{}:{}/", local_ip(), port);
    println!("Local:      http://localhost:{}/", port);
    println!();
    println!("Type 'a' + Enter to analyze the screen, 'b' + Enter to optimize the last answer.");
    println!();

    let server = HttpServer::new(server_config, hub);
    let result = server
        .run_until(async {
            let _ = tokio::signal::ctrl_c().await;
            println!("\nShutting down...");
        })
        .await;

    producer.abort();
    result?;

    Ok(())
}

/// Forward trigger lines from standard input until it closes
///
/// Triggers arriving while the buffer is full are dropped.
async fn read_triggers(triggers: mpsc::Sender<Trigger>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        match lines.next_line().await {
            Ok(Some(line)) if line.trim().is_empty() => continue,
            Ok(Some(line)) => match line.parse::<Trigger>() {
                Ok(trigger) => match triggers.try_send(trigger) {
                    Ok(()) => {}
                    Err(TrySendError::Full(trigger)) => {
                        tracing::warn!(trigger = %trigger, "Producer busy, trigger dropped");
                    }
                    Err(TrySendError::Closed(_)) => break,
                },
                Err(e) => tracing::warn!(error = %e, "Ignoring input"),
            },
            Ok(None) => break,
            Err(e) => {
                tracing::error!(error = %e, "Failed to read triggers");
                break;
            }
        }
    }

    tracing::debug!("Trigger input closed");
}
