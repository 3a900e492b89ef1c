//! Komtrax Processor CLI
//!
//! Usage:
//! - `komtrax-processor`                 single scheduled invocation (API poll)
//! - `komtrax-processor event.json`      one invocation with the message read from a file
//! - `komtrax-processor -`               same, reading the message from stdin
//!
//! `KOMTRAX_POLL_INTERVAL_SECS` turns the scheduled mode into a polling loop.

use anyhow::{Context, Result};
use komtrax_processor::{
    ConsoleDisplay, EquipmentEventHandler, InboundEvent, KomtraxClient, ProcessorConfig,
};
use serde_json::Value;
use std::path::Path;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::time::interval;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_logger() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("komtrax_processor=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Read the message of an invocation; `-` reads stdin
async fn read_message(source: &str) -> Result<Value> {
    let content = if source == "-" {
        let mut buf = String::new();
        tokio::io::stdin()
            .read_to_string(&mut buf)
            .await
            .context("Failed to read event from stdin")?;
        buf
    } else {
        tokio::fs::read_to_string(Path::new(source))
            .await
            .with_context(|| format!("Failed to read event file {}", source))?
    };

    serde_json::from_str(&content).with_context(|| format!("Invalid event JSON in {}", source))
}

fn poll_interval() -> Result<Option<Duration>> {
    match std::env::var("KOMTRAX_POLL_INTERVAL_SECS") {
        Ok(secs) => {
            let secs: u64 = secs
                .trim()
                .parse()
                .context("KOMTRAX_POLL_INTERVAL_SECS must be a whole number of seconds")?;
            Ok(Some(Duration::from_secs(secs.max(1))))
        }
        Err(_) => Ok(None),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env is optional
    dotenvy::dotenv().ok();
    init_logger();

    let config = ProcessorConfig::load()
        .await
        .context("Failed to load processor configuration")?;

    let mut handler = EquipmentEventHandler::new(config, KomtraxClient::new(), ConsoleDisplay::new());

    if let Some(source) = std::env::args().nth(1) {
        let message = read_message(&source).await?;
        handler.handle(InboundEvent::from_message(Some(message))).await;
        return Ok(());
    }

    match poll_interval()? {
        Some(period) => {
            info!("Polling Komtrax API every {}s", period.as_secs());
            let mut ticker = interval(period);
            loop {
                ticker.tick().await;
                handler.handle(InboundEvent::Tick).await;
            }
        }
        None => {
            handler.handle(InboundEvent::Tick).await;
            Ok(())
        }
    }
}
