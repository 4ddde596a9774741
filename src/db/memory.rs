//! In-memory store used by the job tests.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use super::{SubscriberStore, UnwatchOutcome, WatchOutcome};
use crate::error::StoreError;
use crate::models::{Coordinate, RiskLevel, Subscriber, WatchedLocation};

#[derive(Default)]
pub struct MemorySubscriberStore {
    subscribers: Mutex<Vec<Subscriber>>,
    fail_find_all: AtomicBool,
    failing_saves: Mutex<HashSet<String>>,
    saves: AtomicUsize,
    find_all_calls: AtomicUsize,
}

impl MemorySubscriberStore {
    pub fn with(subscribers: Vec<Subscriber>) -> Self {
        Self {
            subscribers: Mutex::new(subscribers),
            ..Default::default()
        }
    }

    pub fn fail_find_all(&self, fail: bool) {
        self.fail_find_all.store(fail, Ordering::SeqCst);
    }

    /// Make every `record_notified_level` for `email` fail.
    pub fn fail_saves_for(&self, email: &str) {
        self.failing_saves.lock().unwrap().insert(email.to_string());
    }

    pub fn find_all_calls(&self) -> usize {
        self.find_all_calls.load(Ordering::SeqCst)
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn level(&self, email: &str, coordinate: &Coordinate) -> Option<RiskLevel> {
        self.subscribers
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.email == email)
            .map(|s| s.last_notified_level(coordinate))
    }

    pub fn len(&self) -> usize {
        self.subscribers.lock().unwrap().len()
    }
}

#[async_trait]
impl SubscriberStore for MemorySubscriberStore {
    async fn find_all(&self) -> Result<Vec<Subscriber>, StoreError> {
        self.find_all_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_find_all.load(Ordering::SeqCst) {
            return Err(StoreError::Database(sqlx::Error::PoolClosed));
        }
        Ok(self.subscribers.lock().unwrap().clone())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Subscriber>, StoreError> {
        Ok(self
            .subscribers
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.email == email)
            .cloned())
    }

    async fn record_notified_level(
        &self,
        subscriber: &Subscriber,
        coordinate: &Coordinate,
        level: RiskLevel,
    ) -> Result<(), StoreError> {
        if self.failing_saves.lock().unwrap().contains(&subscriber.email) {
            return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
        }
        self.saves.fetch_add(1, Ordering::SeqCst);

        let mut subscribers = self.subscribers.lock().unwrap();
        if let Some(stored) = subscribers.iter_mut().find(|s| s.id == subscriber.id) {
            if stored.is_watching(coordinate) {
                stored.set_last_notified_level(*coordinate, level);
            }
        }
        Ok(())
    }

    async fn watch(
        &self,
        name: &str,
        email: &str,
        location: &WatchedLocation,
    ) -> Result<WatchOutcome, StoreError> {
        let mut subscribers = self.subscribers.lock().unwrap();
        match subscribers.iter_mut().find(|s| s.email == email) {
            Some(existing) => Ok(if existing.watch(location.clone()) {
                WatchOutcome::Added
            } else {
                WatchOutcome::AlreadyWatched
            }),
            None => {
                let mut subscriber = Subscriber::new(name, email);
                subscriber.watch(location.clone());
                subscribers.push(subscriber);
                Ok(WatchOutcome::Created)
            }
        }
    }

    async fn unwatch(
        &self,
        email: &str,
        coordinate: &Coordinate,
    ) -> Result<UnwatchOutcome, StoreError> {
        let mut subscribers = self.subscribers.lock().unwrap();
        let idx = subscribers
            .iter()
            .position(|s| s.email == email)
            .ok_or_else(|| StoreError::NotFound(email.to_string()))?;

        if !subscribers[idx].is_watching(coordinate) {
            return Ok(UnwatchOutcome::NotWatched);
        }
        if subscribers[idx].unwatch(coordinate) {
            subscribers.remove(idx);
            return Ok(UnwatchOutcome::SubscriberDeleted);
        }
        Ok(UnwatchOutcome::Removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscription_lifecycle() {
        let store = MemorySubscriberStore::default();
        let mumbai = WatchedLocation::new("Mumbai", 19.07, 72.87);
        let goa = WatchedLocation::new("Goa", 15.49, 73.82);

        assert_eq!(
            store.watch("Asha", "asha@example.com", &mumbai).await.unwrap(),
            WatchOutcome::Created
        );
        assert_eq!(
            store.watch("Asha", "asha@example.com", &mumbai).await.unwrap(),
            WatchOutcome::AlreadyWatched
        );
        assert_eq!(
            store.watch("Asha", "asha@example.com", &goa).await.unwrap(),
            WatchOutcome::Added
        );

        assert_eq!(
            store
                .unwatch("asha@example.com", &Coordinate::new(0.0, 0.0))
                .await
                .unwrap(),
            UnwatchOutcome::NotWatched
        );
        assert_eq!(
            store
                .unwatch("asha@example.com", &mumbai.coordinate)
                .await
                .unwrap(),
            UnwatchOutcome::Removed
        );
        assert_eq!(
            store.unwatch("asha@example.com", &goa.coordinate).await.unwrap(),
            UnwatchOutcome::SubscriberDeleted
        );
        assert_eq!(store.len(), 0);

        assert!(matches!(
            store.unwatch("asha@example.com", &goa.coordinate).await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_signed_zero_is_already_watched() {
        let store = MemorySubscriberStore::default();
        let equator = WatchedLocation::new("Null Island", 0.0, 0.0);
        let negative = WatchedLocation::new("Null Island", -0.0, -0.0);

        store.watch("Asha", "asha@example.com", &equator).await.unwrap();
        assert_eq!(
            store.watch("Asha", "asha@example.com", &negative).await.unwrap(),
            WatchOutcome::AlreadyWatched
        );
    }
}
