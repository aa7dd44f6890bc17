use crate::reconciler::Reconciler;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Periodic driver for the reconciler.
///
/// Runs one pass, sleeps the configured interval, repeats. At most one
/// pass is in flight at a time; a failed pass is logged and the loop
/// carries on.
pub struct SyncWorker {
    reconciler: Reconciler,
    interval: Duration,
}

impl SyncWorker {
    pub fn new(reconciler: Reconciler, interval: Duration) -> Self {
        Self {
            reconciler,
            interval,
        }
    }

    pub async fn run(self, ctx: CancellationToken) -> anyhow::Result<()> {
        info!(interval_secs = self.interval.as_secs(), "starting sync worker");

        loop {
            if ctx.is_cancelled() {
                break;
            }

            if let Err(e) = self.reconciler.run_pass().await {
                error!(error = %e, "reconciliation pass failed");
            }

            tokio::select! {
                _ = ctx.cancelled() => break,
                _ = tokio::time::sleep(self.interval) => {}
            }
        }

        info!("sync worker stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brisa_domain::{
        DomainError, MockCatalogClient, MockMeasurementForwarder, MockStagedReadingStore,
    };
    use std::sync::Arc;

    fn worker_with(store: MockStagedReadingStore) -> SyncWorker {
        let reconciler = Reconciler::new(
            Arc::new(store),
            Arc::new(MockCatalogClient::new()),
            Arc::new(MockMeasurementForwarder::new()),
            10,
        );
        SyncWorker::new(reconciler, Duration::from_millis(10))
    }

    #[tokio::test]
    async fn test_worker_runs_passes_until_cancelled() {
        let mut store = MockStagedReadingStore::new();
        store
            .expect_list_unprocessed()
            .times(2..)
            .returning(|| Ok(vec![]));

        let worker = worker_with(store);
        let token = CancellationToken::new();

        let handle = tokio::spawn(worker.run(token.clone()));
        tokio::time::sleep(Duration::from_millis(50)).await;
        token.cancel();

        handle.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_failed_pass_does_not_stop_worker() {
        let mut store = MockStagedReadingStore::new();
        store
            .expect_list_unprocessed()
            .times(2..)
            .returning(|| Err(DomainError::RepositoryError(anyhow::anyhow!("pool closed"))));

        let worker = worker_with(store);
        let token = CancellationToken::new();

        let handle = tokio::spawn(worker.run(token.clone()));
        tokio::time::sleep(Duration::from_millis(50)).await;
        token.cancel();

        handle.await.unwrap().unwrap();
    }
}
