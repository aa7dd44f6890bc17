//! A concurrent process supervisor with graceful shutdown.
//!
//! Runs named long-running processes concurrently, cancels all of them when
//! any one fails or a shutdown signal (SIGINT/SIGTERM) arrives, then runs
//! cleanup closers within a configurable timeout before exiting.
//!
//! # Example
//!
//! ```no_run
//! use brisa_runner::Runner;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     Runner::new()
//!         .with_named_process("ticker", |ctx| async move {
//!             loop {
//!                 tokio::select! {
//!                     _ = ctx.cancelled() => break,
//!                     _ = tokio::time::sleep(Duration::from_secs(1)) => {
//!                         tracing::info!("tick");
//!                     }
//!                 }
//!             }
//!             Ok(())
//!         })
//!         .with_closer(|| async move {
//!             tracing::info!("cleaning up");
//!             Ok(())
//!         })
//!         .with_closer_timeout(Duration::from_secs(5))
//!         .run()
//!         .await;
//! }
//! ```

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

type BoxFuture = Pin<Box<dyn Future<Output = Result<(), anyhow::Error>> + Send>>;

/// A long-running process driven by a cancellation token.
pub type AppProcess = Box<dyn FnOnce(CancellationToken) -> BoxFuture + Send>;

/// Cleanup function executed after every process has stopped.
pub type Closer = Box<dyn FnOnce() -> BoxFuture + Send>;

struct NamedProcess {
    name: String,
    process: AppProcess,
}

/// Supervisor for a set of named processes and their cleanup closers.
pub struct Runner {
    processes: Vec<NamedProcess>,
    closers: Vec<Closer>,
    closer_timeout: Duration,
    cancellation_token: CancellationToken,
}

impl Default for Runner {
    fn default() -> Self {
        Self::new()
    }
}

impl Runner {
    pub fn new() -> Self {
        Self {
            processes: Vec::new(),
            closers: Vec::new(),
            closer_timeout: Duration::from_secs(10),
            cancellation_token: CancellationToken::new(),
        }
    }

    /// Adds a named process. Every process receives a child of the runner's
    /// cancellation token and is expected to return promptly once the token
    /// is cancelled.
    pub fn with_named_process<N, F, Fut>(mut self, name: N, process: F) -> Self
    where
        N: Into<String>,
        F: FnOnce(CancellationToken) -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), anyhow::Error>> + Send + 'static,
    {
        self.processes.push(NamedProcess {
            name: name.into(),
            process: Box::new(|token| Box::pin(process(token))),
        });
        self
    }

    /// Adds a closer, executed after all processes have stopped regardless
    /// of how they stopped.
    pub fn with_closer<F, Fut>(mut self, closer: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), anyhow::Error>> + Send + 'static,
    {
        self.closers.push(Box::new(|| Box::pin(closer())));
        self
    }

    /// Sets the maximum time the closers may take as a group.
    pub fn with_closer_timeout(mut self, timeout: Duration) -> Self {
        self.closer_timeout = timeout;
        self
    }

    /// Replaces the cancellation token, allowing external shutdown control.
    pub fn with_cancellation_token(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = token;
        self
    }

    /// Runs every process until completion, a failure, or a shutdown
    /// signal; then runs the closers and exits the host process.
    pub async fn run(self) {
        let token = self.cancellation_token;
        let closers = self.closers;
        let closer_timeout = self.closer_timeout;

        spawn_signal_handlers(token.clone());

        let first_error = supervise(self.processes, token).await;

        if !closers.is_empty() {
            info!(timeout_secs = closer_timeout.as_secs(), "running closers");
            match tokio::time::timeout(closer_timeout, run_closers(closers)).await {
                Ok(()) => info!("all closers completed"),
                Err(_) => error!("closers timed out"),
            }
        }

        match first_error {
            Some(err) => {
                error!("exiting with error: {:#}", err);
                std::process::exit(1);
            }
            None => {
                info!("exiting normally");
                std::process::exit(0);
            }
        }
    }
}

/// Drives all processes to completion, cancelling the rest as soon as one
/// fails or panics. Returns the first error observed.
async fn supervise(
    processes: Vec<NamedProcess>,
    token: CancellationToken,
) -> Option<anyhow::Error> {
    let mut join_set = JoinSet::new();

    for NamedProcess { name, process } in processes {
        let process_token = token.clone();
        join_set.spawn(async move {
            debug!(process = %name, "process starting");
            let result = process(process_token).await;
            (name, result)
        });
    }

    let mut first_error = None;
    while let Some(joined) = join_set.join_next().await {
        match joined {
            Ok((name, Ok(()))) => {
                info!(process = %name, "process completed");
            }
            Ok((name, Err(err))) => {
                error!(process = %name, "process failed: {:#}", err);
                if first_error.is_none() {
                    first_error = Some(err);
                }
                token.cancel();
            }
            Err(err) => {
                error!("process panicked: {}", err);
                if first_error.is_none() {
                    first_error = Some(anyhow::anyhow!("process panicked: {err}"));
                }
                token.cancel();
            }
        }
    }

    first_error
}

async fn run_closers(closers: Vec<Closer>) {
    let mut closer_set = JoinSet::new();

    for closer in closers {
        closer_set.spawn(closer());
    }

    while let Some(result) = closer_set.join_next().await {
        match result {
            Ok(Ok(())) => debug!("closer completed"),
            Ok(Err(err)) => error!("closer failed: {:#}", err),
            Err(err) => error!("closer panicked: {}", err),
        }
    }
}

fn spawn_signal_handlers(token: CancellationToken) {
    let interrupt_token = token.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("received interrupt signal");
                interrupt_token.cancel();
            }
            Err(err) => error!(error = %err, "failed to install interrupt handler"),
        }
    });

    #[cfg(unix)]
    tokio::spawn(async move {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
                info!("received SIGTERM");
                token.cancel();
            }
            Err(err) => error!(error = %err, "failed to install SIGTERM handler"),
        }
    });
}
