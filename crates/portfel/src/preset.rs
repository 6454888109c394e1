//! Named window lengths.

use std::fmt;
use std::str::FromStr;

use portfel_traits::PortfelError;
use serde::{Deserialize, Serialize};

/// Look-back windows offered by name, in calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WindowPreset {
    /// 90 days
    ThreeMonths,
    /// 180 days
    SixMonths,
    /// 360 days
    OneYear,
    /// 720 days
    TwoYears,
    /// 1080 days
    ThreeYears,
    /// 1440 days
    FourYears,
    /// 1800 days
    FiveYears,
}

impl WindowPreset {
    /// Every preset, shortest first.
    pub const ALL: [Self; 7] = [
        Self::ThreeMonths,
        Self::SixMonths,
        Self::OneYear,
        Self::TwoYears,
        Self::ThreeYears,
        Self::FourYears,
        Self::FiveYears,
    ];

    /// Window length in calendar days.
    pub const fn days(self) -> u32 {
        match self {
            Self::ThreeMonths => 90,
            Self::SixMonths => 180,
            Self::OneYear => 360,
            Self::TwoYears => 720,
            Self::ThreeYears => 1080,
            Self::FourYears => 1440,
            Self::FiveYears => 1800,
        }
    }

    /// Short code accepted by [`FromStr`].
    pub const fn code(self) -> &'static str {
        match self {
            Self::ThreeMonths => "3m",
            Self::SixMonths => "6m",
            Self::OneYear => "1y",
            Self::TwoYears => "2y",
            Self::ThreeYears => "3y",
            Self::FourYears => "4y",
            Self::FiveYears => "5y",
        }
    }
}

impl fmt::Display for WindowPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for WindowPreset {
    type Err = PortfelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|preset| preset.code() == code)
            .ok_or_else(|| {
                PortfelError::InvalidWindow(format!(
                    "unknown window '{s}', expected one of 3m, 6m, 1y, 2y, 3y, 4y, 5y"
                ))
            })
    }
}

/// Parses a window given either as a preset code or as a number of days.
///
/// # Errors
///
/// Returns [`PortfelError::InvalidWindow`] for anything else, including zero days.
pub fn parse_window_days(s: &str) -> Result<u32, PortfelError> {
    if let Ok(days) = s.trim().parse::<u32>() {
        if days == 0 {
            return Err(PortfelError::InvalidWindow(
                "window must be at least one day".to_string(),
            ));
        }
        return Ok(days);
    }
    s.parse::<WindowPreset>().map(WindowPreset::days)
}
