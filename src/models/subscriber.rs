use sqlx::FromRow;
use std::collections::HashMap;
use uuid::Uuid;

use super::{Coordinate, RiskLevel, WatchedLocation};

/// A person receiving alerts, with every location they watch and the last
/// level they were notified of for each one.
#[derive(Debug, Clone)]
pub struct Subscriber {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub locations: Vec<WatchedLocation>,
    pub last_notified: HashMap<Coordinate, RiskLevel>,
}

impl Subscriber {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            email: email.into(),
            locations: Vec::new(),
            last_notified: HashMap::new(),
        }
    }

    /// Last level notified for `coordinate`; Low if never notified.
    pub fn last_notified_level(&self, coordinate: &Coordinate) -> RiskLevel {
        self.last_notified
            .get(coordinate)
            .copied()
            .unwrap_or_default()
    }

    pub fn set_last_notified_level(&mut self, coordinate: Coordinate, level: RiskLevel) {
        self.last_notified.insert(coordinate, level);
    }

    pub fn is_watching(&self, coordinate: &Coordinate) -> bool {
        self.locations.iter().any(|l| l.coordinate == *coordinate)
    }

    /// Append `location` with a Low baseline. Returns false when that exact
    /// coordinate is already watched.
    pub fn watch(&mut self, location: WatchedLocation) -> bool {
        if self.is_watching(&location.coordinate) {
            return false;
        }
        self.last_notified
            .entry(location.coordinate)
            .or_insert(RiskLevel::Low);
        self.locations.push(location);
        true
    }

    /// Drop the location at `coordinate` together with its level entry.
    /// Returns true when no location is left and the record should go.
    pub fn unwatch(&mut self, coordinate: &Coordinate) -> bool {
        self.locations.retain(|l| l.coordinate != *coordinate);
        self.last_notified.remove(coordinate);
        self.locations.is_empty()
    }

    /// Group flat join rows into subscribers, keeping row order.
    pub fn from_rows(rows: Vec<SubscriberLocationRow>) -> Vec<Subscriber> {
        let mut subscribers: Vec<Subscriber> = Vec::new();
        let mut index: HashMap<Uuid, usize> = HashMap::new();

        for row in rows {
            let idx = *index.entry(row.subscriber_id).or_insert_with(|| {
                subscribers.push(Subscriber {
                    id: row.subscriber_id,
                    name: row.name.clone(),
                    email: row.email.clone(),
                    locations: Vec::new(),
                    last_notified: HashMap::new(),
                });
                subscribers.len() - 1
            });

            let level = match row.last_notified_level.parse::<RiskLevel>() {
                Ok(level) => level,
                Err(e) => {
                    tracing::warn!("{} for {}, treating as Low", e, row.email);
                    RiskLevel::Low
                }
            };

            let location = WatchedLocation::new(row.display_name, row.latitude, row.longitude);
            let subscriber = &mut subscribers[idx];
            subscriber.set_last_notified_level(location.coordinate, level);
            subscriber.locations.push(location);
        }

        subscribers
    }
}

/// One row of the subscriber/location join.
#[derive(Debug, FromRow)]
pub struct SubscriberLocationRow {
    pub subscriber_id: Uuid,
    pub name: String,
    pub email: String,
    pub latitude: f64,
    pub longitude: f64,
    pub display_name: String,
    pub last_notified_level: String,
}
