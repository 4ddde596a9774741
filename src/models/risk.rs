use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Wave height above which conditions are High, metres.
pub const HIGH_WAVE_HEIGHT: f64 = 2.5;
/// Wind-wave height above which conditions are High, metres.
pub const HIGH_WIND_WAVE_HEIGHT: f64 = 1.2;
/// Wave height above which conditions are Moderate, metres.
pub const MODERATE_WAVE_HEIGHT: f64 = 1.2;
/// Wind-wave height above which conditions are Moderate, metres.
pub const MODERATE_WIND_WAVE_HEIGHT: f64 = 0.6;

/// Ordinal hazard level. Variant order is the severity order.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum RiskLevel {
    #[default]
    Low,
    Moderate,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Moderate => "Moderate",
            RiskLevel::High => "High",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown risk level: {0}")]
pub struct UnknownRiskLevel(pub String);

impl FromStr for RiskLevel {
    type Err = UnknownRiskLevel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(RiskLevel::Low),
            "moderate" => Ok(RiskLevel::Moderate),
            "high" => Ok(RiskLevel::High),
            _ => Err(UnknownRiskLevel(s.to_string())),
        }
    }
}

/// Classify one reading.
///
/// High when either height exceeds its high threshold, Moderate when either
/// exceeds its moderate threshold, Low otherwise. NaN compares false against
/// every threshold and therefore classifies as Low.
pub fn classify(wave_height: f64, wind_wave_height: f64) -> RiskLevel {
    if wave_height > HIGH_WAVE_HEIGHT || wind_wave_height > HIGH_WIND_WAVE_HEIGHT {
        RiskLevel::High
    } else if wave_height > MODERATE_WAVE_HEIGHT || wind_wave_height > MODERATE_WIND_WAVE_HEIGHT {
        RiskLevel::Moderate
    } else {
        RiskLevel::Low
    }
}
