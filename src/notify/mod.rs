use async_trait::async_trait;

use crate::error::NotifyError;
use crate::models::RiskLevel;

pub mod email;

pub use email::SmtpNotifier;

/// Everything a notifier needs to tell one subscriber about one location.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskNotification {
    pub email: String,
    pub name: String,
    pub location_name: String,
    /// Wave height of the day's first hourly reading, not of the peak hour.
    pub wave_height: f64,
    /// Wind-wave height of the day's first hourly reading.
    pub wind_wave_height: f64,
    pub level: RiskLevel,
}

/// Delivers risk notifications. `Ok` means the message was accepted.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, notification: &RiskNotification) -> Result<(), NotifyError>;
}
