pub mod aggregate;
pub mod decide;
pub mod dedup;
pub mod job;
pub mod scheduler;
#[cfg(test)]
pub mod testing;

pub use job::{RiskMonitorJob, RunOutcome};
