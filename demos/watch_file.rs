//! Example watching a file and printing each new version.
//!
//! This example shows how to:
//! - Build a watcher with a custom polling interval
//! - React to content changes with a callback
//! - Stop the reconciliation loop cleanly on Ctrl+C
//!
//! Run with: RUST_LOG=swapwatch=debug cargo run --example watch_file -- /path/to/file
//!
//! To reproduce a ConfigMap-style update, watch `dir/file` where
//! `dir/file -> ..data/file` and `..data -> ..data_1`, then repoint `..data`
//! at a new directory and delete the old one.

use std::time::Duration;
use swapwatch::prelude::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "/var/run/secrets/kubernetes.io/serviceaccount/ca.crt".to_string());

    let watcher = FileWatcher::builder(&path)
        .with_interval(Duration::from_secs(5))
        .with_on_change(|content| {
            println!("[Event] content changed, {} bytes", content.len());
        })
        .build()
        .await?;

    let (content, info) = watcher.get_with_metadata();
    println!("Watching {} ({} bytes, modified {:?})", info.name(), content.len(), info.modified());
    println!("Press Ctrl+C to exit\n");

    let token = CancellationToken::new();
    let task = watcher.spawn(token.clone());

    let _ = tokio::signal::ctrl_c().await;
    token.cancel();

    task.await.expect("watcher task panicked")
}
