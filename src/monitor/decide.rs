//! Notify-on-change for one subscriber and one location.
//!
//! The stored level only advances after the notifier accepted the message,
//! so a failed send is retried by the next run simply because the levels
//! still differ. There is no other retry mechanism.

use tracing::{debug, error, info};

use super::aggregate::DailyPeak;
use crate::db::SubscriberStore;
use crate::models::{Subscriber, WatchedLocation};
use crate::notify::{Notifier, RiskNotification};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Level equals the last one notified; nothing sent.
    Unchanged,
    /// Sent and the new level recorded.
    Notified,
    /// Send failed; stored level left as it was.
    SendFailed,
    /// Sent, but recording the new level failed. The next run will send
    /// again.
    SaveFailed,
}

pub struct NotificationDecider<'a> {
    notifier: &'a dyn Notifier,
    store: &'a dyn SubscriberStore,
}

impl<'a> NotificationDecider<'a> {
    pub fn new(notifier: &'a dyn Notifier, store: &'a dyn SubscriberStore) -> Self {
        Self { notifier, store }
    }

    /// The notification owed to `subscriber` for `location`, if any.
    pub fn pending(
        subscriber: &Subscriber,
        location: &WatchedLocation,
        peak: &DailyPeak,
    ) -> Option<RiskNotification> {
        if subscriber.last_notified_level(&location.coordinate) == peak.peak_level {
            return None;
        }
        Some(RiskNotification {
            email: subscriber.email.clone(),
            name: subscriber.name.clone(),
            location_name: location.display_name.clone(),
            wave_height: peak.representative.wave_height,
            wind_wave_height: peak.representative.wind_wave_height,
            level: peak.peak_level,
        })
    }

    pub async fn evaluate(
        &self,
        subscriber: &Subscriber,
        location: &WatchedLocation,
        peak: &DailyPeak,
    ) -> Decision {
        let Some(notification) = Self::pending(subscriber, location, peak) else {
            debug!(
                "{} at {} unchanged ({})",
                subscriber.email, location.display_name, peak.peak_level
            );
            return Decision::Unchanged;
        };

        let previous = subscriber.last_notified_level(&location.coordinate);

        if let Err(e) = self.notifier.send(&notification).await {
            error!(
                "Failed to notify {} about {} ({} -> {}): {}",
                subscriber.email, location.display_name, previous, peak.peak_level, e
            );
            return Decision::SendFailed;
        }

        match self
            .store
            .record_notified_level(subscriber, &location.coordinate, peak.peak_level)
            .await
        {
            Ok(()) => {
                info!(
                    "Notified {} about {}: {} -> {}",
                    subscriber.email, location.display_name, previous, peak.peak_level
                );
                Decision::Notified
            }
            Err(e) => {
                error!(
                    "Notified {} about {} but could not record {}: {}",
                    subscriber.email, location.display_name, peak.peak_level, e
                );
                Decision::SaveFailed
            }
        }
    }
}
