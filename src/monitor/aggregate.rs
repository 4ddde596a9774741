//! Reduce one day of hourly readings to its worst level.

use crate::error::NoDataError;
use crate::models::risk::classify;
use crate::models::{DailyReading, RiskLevel};

/// Outcome of one coordinate's day.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyPeak {
    /// Highest level classified across all hours.
    pub peak_level: RiskLevel,
    /// The day's first reading. Its values are quoted in notifications even
    /// when a later hour produced `peak_level`.
    pub representative: DailyReading,
}

pub fn aggregate(readings: &[DailyReading]) -> Result<DailyPeak, NoDataError> {
    let first = readings.first().ok_or(NoDataError)?;

    let mut peak = RiskLevel::Low;
    for r in readings {
        peak = peak.max(classify(r.wave_height, r.wind_wave_height));
        if peak == RiskLevel::High {
            break;
        }
    }

    Ok(DailyPeak {
        peak_level: peak,
        representative: first.clone(),
    })
}
