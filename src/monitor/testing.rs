//! Scripted collaborators for job and decider tests.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;

use crate::error::{FetchError, NotifyError};
use crate::marine::MarineDataFetcher;
use crate::models::{Coordinate, DailyReading};
use crate::notify::{Notifier, RiskNotification};

pub fn day(values: &[(f64, f64)]) -> Vec<DailyReading> {
    let date = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
    values
        .iter()
        .enumerate()
        .map(|(i, &(wave_height, wind_wave_height))| DailyReading {
            hour: NaiveDateTime::new(date, chrono::NaiveTime::from_hms_opt(i as u32, 0, 0).unwrap()),
            wave_height,
            wind_wave_height,
        })
        .collect()
}

#[derive(Default)]
pub struct FakeFetcher {
    readings: Mutex<HashMap<Coordinate, Vec<DailyReading>>>,
    failing: Mutex<Vec<Coordinate>>,
    calls: Mutex<Vec<Coordinate>>,
    gate: Option<Arc<Semaphore>>,
}

impl FakeFetcher {
    /// A fetcher whose calls block until `gate` hands out a permit.
    pub fn gated(gate: Arc<Semaphore>) -> Self {
        Self {
            gate: Some(gate),
            ..Default::default()
        }
    }

    pub fn set(&self, coordinate: Coordinate, readings: Vec<DailyReading>) {
        self.readings.lock().unwrap().insert(coordinate, readings);
    }

    pub fn fail(&self, coordinate: Coordinate) {
        self.failing.lock().unwrap().push(coordinate);
    }

    pub fn calls(&self) -> Vec<Coordinate> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl MarineDataFetcher for FakeFetcher {
    async fn fetch(
        &self,
        coordinate: &Coordinate,
        _date: NaiveDate,
    ) -> Result<Vec<DailyReading>, FetchError> {
        self.calls.lock().unwrap().push(*coordinate);
        if let Some(gate) = &self.gate {
            gate.acquire().await.unwrap().forget();
        }
        if self.failing.lock().unwrap().contains(coordinate) {
            return Err(FetchError::Status(503));
        }
        Ok(self
            .readings
            .lock()
            .unwrap()
            .get(coordinate)
            .cloned()
            .unwrap_or_default())
    }
}

#[derive(Default)]
pub struct FakeNotifier {
    sent: Mutex<Vec<RiskNotification>>,
    attempts: Mutex<usize>,
    failing: AtomicBool,
}

impl FakeNotifier {
    pub fn fail(&self, fail: bool) {
        self.failing.store(fail, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<RiskNotification> {
        self.sent.lock().unwrap().clone()
    }

    pub fn attempts(&self) -> usize {
        *self.attempts.lock().unwrap()
    }
}

#[async_trait]
impl Notifier for FakeNotifier {
    async fn send(&self, notification: &RiskNotification) -> Result<(), NotifyError> {
        *self.attempts.lock().unwrap() += 1;
        if self.failing.load(Ordering::SeqCst) {
            return Err(NotifyError::Build("mailbox unavailable".to_string()));
        }
        self.sent.lock().unwrap().push(notification.clone());
        Ok(())
    }
}
