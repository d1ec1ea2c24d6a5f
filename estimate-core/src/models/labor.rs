use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RateType {
    #[default]
    Hourly,
    Fixed,
}

impl RateType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hourly => "hourly",
            Self::Fixed => "fixed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hourly" => Some(Self::Hourly),
            "fixed" => Some(Self::Fixed),
            _ => None,
        }
    }

    pub fn to_long_str(&self) -> &'static str {
        match self {
            Self::Hourly => "Hourly Rate",
            Self::Fixed => "Fixed Price",
        }
    }
}

impl fmt::Display for RateType {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Labor charge of an estimate.
///
/// `rate` is per hour for [`RateType::Hourly`] and a flat price for
/// [`RateType::Fixed`]. `hours` only counts for hourly labor; a fixed labor
/// may still carry hours (e.g. after the user switched the rate type) and
/// they are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Labor {
    pub rate_type: RateType,
    pub rate: Decimal,
    pub hours: Option<Decimal>,
}

impl Labor {
    pub fn hourly(
        rate: Decimal,
        hours: Decimal,
    ) -> Self {
        Self {
            rate_type: RateType::Hourly,
            rate,
            hours: Some(hours),
        }
    }

    pub fn fixed(rate: Decimal) -> Self {
        Self {
            rate_type: RateType::Fixed,
            rate,
            hours: None,
        }
    }

    /// Unrounded labor cost. Missing hours count as zero. `None` on overflow.
    pub fn cost(&self) -> Option<Decimal> {
        match self.rate_type {
            RateType::Hourly => self.hours.unwrap_or(Decimal::ZERO).checked_mul(self.rate),
            RateType::Fixed => Some(self.rate),
        }
    }
}
