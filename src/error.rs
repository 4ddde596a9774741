//! Failure taxonomy of the monitoring engine.
//!
//! Every variant here is recovered locally by the job; only a failed
//! subscriber read-all aborts a run, and nothing aborts the process.

/// The marine data API could not produce readings for one coordinate.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("marine API request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("marine API returned status {0}")]
    Status(u16),

    #[error("malformed marine API response: {0}")]
    Malformed(String),
}

/// A fetch succeeded but yielded no usable hourly readings.
#[derive(Debug, thiserror::Error)]
#[error("no hourly readings available")]
pub struct NoDataError;

/// Why a coordinate produced no peak this run. Either way it is skipped
/// and picked up again by the next run.
#[derive(Debug, thiserror::Error)]
pub enum LocationError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    NoData(#[from] NoDataError),
}

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    #[error("email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("email build error: {0}")]
    Build(String),
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("no subscriber with email {0}")]
    NotFound(String),
}
