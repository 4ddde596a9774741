//! Open-Meteo marine API client.
//!
//! Requests hourly `wave_height` and `wind_wave_height` for a single day in
//! the location's own timezone and turns the parallel arrays of the answer
//! into [`DailyReading`]s.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, trace};

use super::MarineDataFetcher;
use crate::error::FetchError;
use crate::models::{Coordinate, DailyReading};

const HOURLY_FIELDS: &str = "wave_height,wind_wave_height";

#[derive(Debug, Deserialize)]
struct MarineResponse {
    hourly: Option<Hourly>,
}

#[derive(Debug, Deserialize)]
struct Hourly {
    time: Vec<String>,
    wave_height: Vec<Option<f64>>,
    wind_wave_height: Vec<Option<f64>>,
}

#[derive(Clone, Debug)]
pub struct OpenMeteoFetcher {
    client: Client,
    base_url: String,
}

impl OpenMeteoFetcher {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }
}

#[async_trait]
impl MarineDataFetcher for OpenMeteoFetcher {
    async fn fetch(
        &self,
        coordinate: &Coordinate,
        date: NaiveDate,
    ) -> Result<Vec<DailyReading>, FetchError> {
        let day = date.format("%Y-%m-%d").to_string();
        debug!("Fetching marine data for {} on {}", coordinate, day);

        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("latitude", coordinate.latitude.to_string()),
                ("longitude", coordinate.longitude.to_string()),
                ("hourly", HOURLY_FIELDS.to_string()),
                ("start_date", day.clone()),
                ("end_date", day),
                ("timezone", "auto".to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        trace!("Marine API answered {} bytes for {}", body.len(), coordinate);

        let parsed: MarineResponse =
            serde_json::from_str(&body).map_err(|e| FetchError::Malformed(e.to_string()))?;
        let hourly = parsed
            .hourly
            .ok_or_else(|| FetchError::Malformed("missing hourly block".to_string()))?;

        readings_from_hourly(hourly)
    }
}

fn parse_hour(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S"))
        .ok()
}

/// Zip the parallel hourly arrays, dropping hours with a missing value.
fn readings_from_hourly(hourly: Hourly) -> Result<Vec<DailyReading>, FetchError> {
    let n = hourly.time.len();
    if hourly.wave_height.len() != n || hourly.wind_wave_height.len() != n {
        return Err(FetchError::Malformed(format!(
            "hourly arrays differ in length: time={}, wave_height={}, wind_wave_height={}",
            n,
            hourly.wave_height.len(),
            hourly.wind_wave_height.len()
        )));
    }

    let mut readings = Vec::with_capacity(n);
    for ((time, wave), wind_wave) in hourly
        .time
        .iter()
        .zip(hourly.wave_height)
        .zip(hourly.wind_wave_height)
    {
        let hour = parse_hour(time)
            .ok_or_else(|| FetchError::Malformed(format!("invalid hour '{}'", time)))?;

        match (wave, wind_wave) {
            (Some(wave_height), Some(wind_wave_height)) => readings.push(DailyReading {
                hour,
                wave_height,
                wind_wave_height,
            }),
            _ => trace!("Dropping {} with missing values", time),
        }
    }

    readings.sort_by_key(|r| r.hour);
    Ok(readings)
}
