//! Batch worker: runs a sequence job file against the configured provider
//! and produces a JSON [`RunReport`](report::RunReport).

pub mod error;
pub mod job;
pub mod report;
pub mod runner;

pub use error::WorkerError;
pub use job::{JobSpec, ShotSpec};
pub use report::RunReport;
pub use runner::{run_job, RunnerSettings};
