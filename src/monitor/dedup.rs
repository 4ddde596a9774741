//! Collapse every subscriber's watched locations into distinct points.

use std::collections::HashMap;

use crate::models::{Coordinate, Subscriber, WatchedLocation};

/// One subscriber watching one location.
#[derive(Debug, Clone, Copy)]
pub struct Watcher<'a> {
    pub subscriber: &'a Subscriber,
    pub location: &'a WatchedLocation,
}

/// Every watcher of one distinct coordinate.
#[derive(Debug)]
pub struct Bucket<'a> {
    pub coordinate: Coordinate,
    /// First location seen at this coordinate, used for logging.
    pub representative: &'a WatchedLocation,
    pub watchers: Vec<Watcher<'a>>,
}

/// Distinct coordinates with a reverse index back to their watchers.
///
/// Buckets keep first-seen order; nothing downstream depends on it.
#[derive(Debug, Default)]
pub struct LocationIndex<'a> {
    buckets: Vec<Bucket<'a>>,
    by_coordinate: HashMap<Coordinate, usize>,
}

impl<'a> LocationIndex<'a> {
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn coordinates(&self) -> impl Iterator<Item = Coordinate> + '_ {
        self.buckets.iter().map(|b| b.coordinate)
    }

    pub fn buckets(&self) -> &[Bucket<'a>] {
        &self.buckets
    }
}

/// Group every (subscriber, location) pair by exact coordinate.
pub fn dedupe(subscribers: &[Subscriber]) -> LocationIndex<'_> {
    let mut index = LocationIndex::default();

    for subscriber in subscribers {
        for location in &subscriber.locations {
            let watcher = Watcher {
                subscriber,
                location,
            };
            match index.by_coordinate.get(&location.coordinate) {
                Some(&i) => index.buckets[i].watchers.push(watcher),
                None => {
                    index
                        .by_coordinate
                        .insert(location.coordinate, index.buckets.len());
                    index.buckets.push(Bucket {
                        coordinate: location.coordinate,
                        representative: location,
                        watchers: vec![watcher],
                    });
                }
            }
        }
    }

    index
}
