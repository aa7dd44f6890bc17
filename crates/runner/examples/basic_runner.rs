//! Basic example of using brisa_runner
//!
//! This example demonstrates:
//! - Running multiple named processes concurrently
//! - Graceful shutdown on SIGTERM/SIGINT (Ctrl+C)
//! - Cleanup with closers
//!
//! Run with: cargo run --example basic_runner

use brisa_runner::Runner;
use std::time::Duration;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Starting runner example, press Ctrl+C for graceful shutdown");

    Runner::new()
        // Counter that increments every second
        .with_named_process("counter", |ctx| async move {
            let mut count = 0;
            loop {
                tokio::select! {
                    _ = ctx.cancelled() => {
                        tracing::info!("counter stopping at {}", count);
                        break;
                    }
                    _ = tokio::time::sleep(Duration::from_secs(1)) => {
                        count += 1;
                        tracing::info!("count: {}", count);
                    }
                }
            }
            Ok(())
        })
        // Fails after 30 seconds to show failure-triggered shutdown
        .with_named_process("flaky", |ctx| async move {
            tokio::select! {
                _ = ctx.cancelled() => Ok(()),
                _ = tokio::time::sleep(Duration::from_secs(30)) => {
                    Err(anyhow::anyhow!("gave up after 30 seconds"))
                }
            }
        })
        .with_closer(|| async move {
            tracing::info!("flushing buffers");
            tokio::time::sleep(Duration::from_millis(300)).await;
            Ok(())
        })
        .with_closer_timeout(Duration::from_secs(5))
        .run()
        .await;
}
