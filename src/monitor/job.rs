//! One monitoring run: dedupe, fetch, aggregate, decide.

use chrono::{NaiveDate, Utc};
use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

use super::aggregate::{aggregate, DailyPeak};
use super::decide::{Decision, NotificationDecider};
use super::dedup::dedupe;
use crate::db::SubscriberStore;
use crate::error::{LocationError, StoreError};
use crate::marine::MarineDataFetcher;
use crate::models::Coordinate;
use crate::notify::Notifier;

/// Counters for one completed run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub subscribers: usize,
    pub coordinates: usize,
    pub fetched: usize,
    pub failed_coordinates: usize,
    pub pairs_evaluated: usize,
    pub notified: usize,
    pub send_failures: usize,
    pub save_failures: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Another run was still in progress.
    Skipped,
    /// Nothing to monitor.
    Idle,
    Completed(RunReport),
}

pub struct RiskMonitorJob {
    store: Arc<dyn SubscriberStore>,
    fetcher: Arc<dyn MarineDataFetcher>,
    notifier: Arc<dyn Notifier>,
    fetch_concurrency: usize,
    running: Mutex<()>,
}

impl RiskMonitorJob {
    pub fn new(
        store: Arc<dyn SubscriberStore>,
        fetcher: Arc<dyn MarineDataFetcher>,
        notifier: Arc<dyn Notifier>,
        fetch_concurrency: usize,
    ) -> Self {
        Self {
            store,
            fetcher,
            notifier,
            fetch_concurrency: fetch_concurrency.max(1),
            running: Mutex::new(()),
        }
    }

    /// Run for the current UTC day.
    pub async fn run(&self) -> Result<RunOutcome, StoreError> {
        self.run_for(Utc::now().date_naive()).await
    }

    /// Run for `date`. Returns `Skipped` at once if a run is in progress.
    ///
    /// Only a failed subscriber read is an error; fetch, send and save
    /// failures are counted in the report and retried by the next run.
    pub async fn run_for(&self, date: NaiveDate) -> Result<RunOutcome, StoreError> {
        let Ok(_guard) = self.running.try_lock() else {
            warn!("Previous risk check still running, skipping this tick");
            return Ok(RunOutcome::Skipped);
        };

        let subscribers = self.store.find_all().await?;
        if subscribers.is_empty() {
            info!("No active subscriptions found. Skipping risk check.");
            return Ok(RunOutcome::Idle);
        }

        let index = dedupe(&subscribers);
        if index.is_empty() {
            info!("Subscribers watch no locations. Skipping risk check.");
            return Ok(RunOutcome::Idle);
        }

        let mut report = RunReport {
            subscribers: subscribers.len(),
            coordinates: index.len(),
            ..Default::default()
        };

        let peaks = self.assess_all(index.coordinates().collect(), date).await;

        let decider = NotificationDecider::new(self.notifier.as_ref(), self.store.as_ref());
        for bucket in index.buckets() {
            let peak = match peaks.get(&bucket.coordinate) {
                Some(Ok(peak)) => peak,
                Some(Err(e)) => {
                    warn!(
                        "Skipping {} ({}) this run: {}",
                        bucket.representative.display_name, bucket.coordinate, e
                    );
                    report.failed_coordinates += 1;
                    continue;
                }
                None => continue,
            };
            report.fetched += 1;

            for watcher in &bucket.watchers {
                report.pairs_evaluated += 1;
                match decider
                    .evaluate(watcher.subscriber, watcher.location, peak)
                    .await
                {
                    Decision::Unchanged => {}
                    Decision::Notified => report.notified += 1,
                    Decision::SendFailed => report.send_failures += 1,
                    Decision::SaveFailed => {
                        report.notified += 1;
                        report.save_failures += 1;
                    }
                }
            }
        }

        info!(
            "Risk check done: {} subscribers, {} locations ({} failed), {} notified, {} send failures, {} save failures",
            report.subscribers,
            report.coordinates,
            report.failed_coordinates,
            report.notified,
            report.send_failures,
            report.save_failures
        );

        Ok(RunOutcome::Completed(report))
    }

    /// Fetch and aggregate every coordinate, at most `fetch_concurrency` at
    /// a time. Each coordinate's failure is kept in its own slot.
    async fn assess_all(
        &self,
        coordinates: Vec<Coordinate>,
        date: NaiveDate,
    ) -> HashMap<Coordinate, Result<DailyPeak, LocationError>> {
        stream::iter(coordinates)
            .map(|coordinate| async move {
                let peak = self.assess(&coordinate, date).await;
                (coordinate, peak)
            })
            .buffer_unordered(self.fetch_concurrency)
            .collect()
            .await
    }

    async fn assess(
        &self,
        coordinate: &Coordinate,
        date: NaiveDate,
    ) -> Result<DailyPeak, LocationError> {
        let readings = self.fetcher.fetch(coordinate, date).await?;
        Ok(aggregate(&readings)?)
    }
}
