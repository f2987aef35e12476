//! Serves orchestrator actions against a live browser.
//!
//! Binds the bridge server, waits for the extension, then reads one JSON
//! action per line from stdin and prints each reply.
//!
//! Usage:
//!   cargo run --example bridge
//!   cargo run --example bridge -- --port 9321 --debug
//!
//! Then type, for example:
//!   {"name": "getAllTabsInfo"}
//!   {"name": "clickElement", "input": {"selector": "#login"}}

// ============================================================================
// Imports
// ============================================================================

use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;

use tabpilot::{Action, ContentPart, Driver, RemoteHost, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

// ============================================================================
// Constants
// ============================================================================

const DEFAULT_PORT: u16 = 9321;

// ============================================================================
// Args
// ============================================================================

#[derive(Debug, Clone)]
struct Args {
    debug: bool,
    port: u16,
}

impl Args {
    fn parse() -> Self {
        let args: Vec<String> = std::env::args().collect();
        let port = args
            .iter()
            .position(|a| a == "--port")
            .and_then(|i| args.get(i + 1))
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_PORT);
        Self {
            debug: args.iter().any(|a| a == "--debug"),
            port,
        }
    }
}

fn init_logging(debug: bool) {
    let filter = if debug { "tabpilot=debug" } else { "tabpilot=info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_logging(args.debug);

    if let Err(e) = run(args).await {
        eprintln!("\n[ERROR] {e}");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    eprintln!("=== tabpilot bridge on ws://127.0.0.1:{} ===\n", args.port);

    let (host, ready) = RemoteHost::listen(IpAddr::V4(Ipv4Addr::LOCALHOST), args.port).await?;
    eprintln!("[Ready] extension {}\n", ready.extension_version);

    let driver = Driver::builder().host(Arc::new(host.clone())).build()?;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let action: Action = match serde_json::from_str(line) {
            Ok(action) => action,
            Err(e) => {
                eprintln!("[Skip] not an action: {e}");
                continue;
            }
        };

        let content = driver.handle(action).await;
        for part in content.parts() {
            match part {
                ContentPart::Text { text } => println!("{text}"),
                ContentPart::Image { image_url } => {
                    println!("[image] {} bytes of data URL", image_url.url.len());
                }
            }
        }
        println!();
    }

    host.shutdown();
    Ok(())
}
