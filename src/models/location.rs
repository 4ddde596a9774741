use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// A monitored point, keyed by its exact latitude/longitude as supplied.
///
/// Equality and hashing compare the `f64` bits: two subscriptions that
/// differ by any amount, however small, are distinct points and are fetched
/// separately. No rounding or snapping is applied. `-0.0` is folded into
/// `0.0`, matching how the store compares `float8` columns.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude: unsigned_zero(latitude),
            longitude: unsigned_zero(longitude),
        }
    }

    fn key(&self) -> (u64, u64) {
        (
            unsigned_zero(self.latitude).to_bits(),
            unsigned_zero(self.longitude).to_bits(),
        )
    }
}

/// Adding `0.0` turns `-0.0` into `0.0` and leaves every other value as is.
fn unsigned_zero(v: f64) -> f64 {
    v + 0.0
}

impl PartialEq for Coordinate {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Coordinate {}

impl Hash for Coordinate {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}

/// A named coordinate a subscriber wants alerts for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchedLocation {
    pub coordinate: Coordinate,
    pub display_name: String,
}

impl WatchedLocation {
    pub fn new(display_name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            coordinate: Coordinate::new(latitude, longitude),
            display_name: display_name.into(),
        }
    }
}
