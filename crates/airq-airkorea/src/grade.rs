//! Numeric value to [`Grade`] classification.
//!
//! Bands are inclusive upper bounds: a value at or below `good` is Good, at
//! or below `normal` is Normal, at or below `bad` is Bad, anything above is
//! Awful.

use serde::{Deserialize, Serialize};

use crate::types::{Grade, PollutantKind};

/// Upper bounds of the Good / Normal / Bad bands for one pollutant
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub good: f64,
    pub normal: f64,
    pub bad: f64,
}

impl Thresholds {
    pub const fn new(good: f64, normal: f64, bad: f64) -> Self {
        Self { good, normal, bad }
    }

    /// True if the bounds are finite, non-negative and strictly ascending
    pub fn is_ascending(&self) -> bool {
        [self.good, self.normal, self.bad].iter().all(|b| b.is_finite())
            && self.good >= 0.0
            && self.good < self.normal
            && self.normal < self.bad
    }

    pub fn grade(&self, value: f64) -> Grade {
        if !value.is_finite() || value < 0.0 {
            Grade::Unknown
        } else if value <= self.good {
            Grade::Good
        } else if value <= self.normal {
            Grade::Normal
        } else if value <= self.bad {
            Grade::Bad
        } else {
            Grade::Awful
        }
    }
}

/// Per-pollutant threshold table.
///
/// Defaults to the Korean Comprehensive Air-quality Index breakpoints.
/// Pollutants missing from a deserialized table keep their default bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdTable {
    pub pm10: Thresholds,
    pub pm25: Thresholds,
    pub so2: Thresholds,
    pub co: Thresholds,
    pub o3: Thresholds,
    pub no2: Thresholds,
    pub khai: Thresholds,
}

impl Default for ThresholdTable {
    fn default() -> Self {
        Self {
            pm10: Thresholds::new(30.0, 80.0, 150.0),
            pm25: Thresholds::new(15.0, 35.0, 75.0),
            so2: Thresholds::new(0.02, 0.05, 0.15),
            co: Thresholds::new(2.0, 9.0, 15.0),
            o3: Thresholds::new(0.03, 0.09, 0.15),
            no2: Thresholds::new(0.03, 0.06, 0.2),
            khai: Thresholds::new(50.0, 100.0, 250.0),
        }
    }
}

impl ThresholdTable {
    pub fn get(&self, kind: PollutantKind) -> &Thresholds {
        match kind {
            PollutantKind::Pm10 => &self.pm10,
            PollutantKind::Pm25 => &self.pm25,
            PollutantKind::So2 => &self.so2,
            PollutantKind::Co => &self.co,
            PollutantKind::O3 => &self.o3,
            PollutantKind::No2 => &self.no2,
            PollutantKind::Khai => &self.khai,
        }
    }

    /// Pollutants whose bounds are not strictly ascending
    pub fn invalid_kinds(&self) -> Vec<PollutantKind> {
        PollutantKind::ALL
            .into_iter()
            .filter(|kind| !self.get(*kind).is_ascending())
            .collect()
    }
}

/// Classify a pollutant value. A missing value is `Unknown`.
pub fn classify(table: &ThresholdTable, kind: PollutantKind, value: Option<f64>) -> Grade {
    match value {
        Some(v) => table.get(kind).grade(v),
        None => Grade::Unknown,
    }
}
