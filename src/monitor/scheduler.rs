use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio::time::MissedTickBehavior;
use tracing::{error, info};

use super::{RiskMonitorJob, RunOutcome};

/// Trigger a run every `every` until `shutdown` resolves.
///
/// Each run is spawned so a slow run never delays the timer; the job's own
/// guard turns ticks that land during a run into no-ops. Once `shutdown`
/// resolves no new run starts, and a run already in flight is awaited before
/// this returns.
pub async fn run<F>(job: Arc<RiskMonitorJob>, every: Duration, shutdown: F)
where
    F: Future<Output = ()>,
{
    info!("Risk scheduler started, checking every {}s", every.as_secs());

    let mut interval = tokio::time::interval(every);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    tokio::pin!(shutdown);

    let mut runs = JoinSet::new();

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("Risk scheduler stopping");
                break;
            }
            Some(joined) = runs.join_next(), if !runs.is_empty() => {
                if let Err(e) = joined {
                    error!("Risk check task failed: {}", e);
                }
            }
            _ = interval.tick() => {
                info!("Running scheduled coastal risk checks...");
                let job = job.clone();
                runs.spawn(async move {
                    match job.run().await {
                        Ok(RunOutcome::Completed(_)) | Ok(RunOutcome::Idle) => {}
                        Ok(RunOutcome::Skipped) => info!("Tick skipped, a run is in progress"),
                        Err(e) => error!("Risk check aborted: {}", e),
                    }
                });
            }
        }
    }

    if !runs.is_empty() {
        info!("Waiting for {} in-flight risk check(s)", runs.len());
    }
    while let Some(joined) = runs.join_next().await {
        if let Err(e) = joined {
            error!("Risk check task failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::MemorySubscriberStore;
    use crate::models::{Subscriber, WatchedLocation};
    use crate::monitor::testing::{day, FakeFetcher, FakeNotifier};
    use tokio::sync::Semaphore;

    #[tokio::test(start_paused = true)]
    async fn test_ticks_until_shutdown() {
        let store = Arc::new(MemorySubscriberStore::default());
        let job = Arc::new(RiskMonitorJob::new(
            store.clone(),
            Arc::new(FakeFetcher::default()),
            Arc::new(FakeNotifier::default()),
            2,
        ));

        // Ticks at 0, 10 and 20 minutes.
        run(
            job,
            Duration::from_secs(600),
            tokio::time::sleep(Duration::from_secs(1500)),
        )
        .await;
        tokio::task::yield_now().await;

        assert_eq!(store.find_all_calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_waits_for_in_flight_run() {
        let mut subscriber = Subscriber::new("Asha", "asha@example.com");
        let mumbai = WatchedLocation::new("Mumbai", 19.07, 72.87);
        subscriber.watch(mumbai.clone());

        let gate = Arc::new(Semaphore::new(0));
        let fetcher = Arc::new(FakeFetcher::gated(gate.clone()));
        fetcher.set(mumbai.coordinate, day(&[(3.0, 0.1)]));
        let notifier = Arc::new(FakeNotifier::default());
        let job = Arc::new(RiskMonitorJob::new(
            Arc::new(MemorySubscriberStore::with(vec![subscriber])),
            fetcher,
            notifier.clone(),
            2,
        ));

        // The first run is still fetching when shutdown fires at 5s.
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(10)).await;
            gate.add_permits(1);
        });
        run(
            job,
            Duration::from_secs(600),
            tokio::time::sleep(Duration::from_secs(5)),
        )
        .await;

        assert_eq!(notifier.sent().len(), 1);
    }
}
