pub mod location;
pub mod reading;
pub mod risk;
pub mod subscriber;

pub use location::{Coordinate, WatchedLocation};
pub use reading::DailyReading;
pub use risk::RiskLevel;
pub use subscriber::Subscriber;
