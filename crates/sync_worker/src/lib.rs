//! Reconciliation worker: periodically scans the staging store, resolves
//! each reading against the downstream catalog, forwards measurements, and
//! records partial-success accounting.

pub mod reconciler;
pub mod sync_worker;

pub use reconciler::{PassSummary, Reconciler};
pub use sync_worker::SyncWorker;
