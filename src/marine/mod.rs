use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::FetchError;
use crate::models::{Coordinate, DailyReading};

pub mod open_meteo;

pub use open_meteo::OpenMeteoFetcher;

/// Source of hourly marine readings.
///
/// Implementations are treated as untrusted and fallible: a failure for one
/// coordinate must not affect any other.
#[async_trait]
pub trait MarineDataFetcher: Send + Sync {
    /// Readings for `date` at `coordinate`, ordered by hour.
    async fn fetch(
        &self,
        coordinate: &Coordinate,
        date: NaiveDate,
    ) -> Result<Vec<DailyReading>, FetchError>;
}
