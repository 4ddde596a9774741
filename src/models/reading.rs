use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One hourly marine reading. Produced per fetch, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyReading {
    pub hour: NaiveDateTime,
    /// Significant wave height, metres.
    pub wave_height: f64,
    /// Wind-wave height, metres.
    pub wind_wave_height: f64,
}
