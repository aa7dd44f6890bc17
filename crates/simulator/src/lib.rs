//! Synthetic telemetry generator for exercising the pipeline without
//! station hardware.

pub mod simulator_worker;

pub use simulator_worker::SimulatorWorker;
