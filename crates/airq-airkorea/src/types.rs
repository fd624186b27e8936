use std::cmp::Ordering;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::grade::{classify, ThresholdTable};

/// Geographic location (WGS84)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// A monitoring station picked from the nearby-station directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitoringStation {
    pub name: String,
    pub address: String,
    pub distance_meters: Option<f64>,
}

/// Pollutants reported by the real-time measurement service.
///
/// `Khai` is the combined index rather than a single pollutant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PollutantKind {
    Pm10,
    Pm25,
    So2,
    Co,
    O3,
    No2,
    Khai,
}

impl PollutantKind {
    pub const ALL: [PollutantKind; 7] = [
        Self::Pm10,
        Self::Pm25,
        Self::So2,
        Self::Co,
        Self::O3,
        Self::No2,
        Self::Khai,
    ];

    pub fn unit(&self) -> &'static str {
        match self {
            Self::Pm10 | Self::Pm25 => "㎍/㎥",
            Self::So2 | Self::Co | Self::O3 | Self::No2 => "ppm",
            Self::Khai => "",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Pm10 => "PM10",
            Self::Pm25 => "PM2.5",
            Self::So2 => "SO2",
            Self::Co => "CO",
            Self::O3 => "O3",
            Self::No2 => "NO2",
            Self::Khai => "KHAI",
        }
    }
}

/// Air quality grade.
///
/// Known grades are ordered by severity. `Unknown` only compares equal to
/// itself, so `partial_cmp` against a known grade yields `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Grade {
    Good,
    Normal,
    Bad,
    Awful,
    #[default]
    Unknown,
}

impl Grade {
    /// Severity rank, `None` for `Unknown`
    pub fn severity(&self) -> Option<u8> {
        match self {
            Self::Good => Some(0),
            Self::Normal => Some(1),
            Self::Bad => Some(2),
            Self::Awful => Some(3),
            Self::Unknown => None,
        }
    }

    pub fn is_known(&self) -> bool {
        self.severity().is_some()
    }

    /// Parse the service's grade code ("1".."4")
    pub fn from_code(code: &str) -> Self {
        match code.trim() {
            "1" => Self::Good,
            "2" => Self::Normal,
            "3" => Self::Bad,
            "4" => Self::Awful,
            _ => Self::Unknown,
        }
    }

    /// Most severe known grade, or `Unknown` when none is known
    pub fn worst<I>(grades: I) -> Self
    where
        I: IntoIterator<Item = Grade>,
    {
        grades
            .into_iter()
            .filter(Grade::is_known)
            .max_by_key(|g| g.severity())
            .unwrap_or(Grade::Unknown)
    }
}

impl PartialOrd for Grade {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self.severity(), other.severity()) {
            (Some(a), Some(b)) => Some(a.cmp(&b)),
            (None, None) => Some(Ordering::Equal),
            _ => None,
        }
    }
}

/// One pollutant value and the grade derived from it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Reading {
    pub value: Option<f64>,
    pub grade: Grade,
}

/// Raw numeric values of a single reading, before grading
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PollutantValues {
    pub pm10: Option<f64>,
    pub pm25: Option<f64>,
    pub so2: Option<f64>,
    pub co: Option<f64>,
    pub o3: Option<f64>,
    pub no2: Option<f64>,
    pub khai: Option<f64>,
}

impl PollutantValues {
    pub fn get(&self, kind: PollutantKind) -> Option<f64> {
        match kind {
            PollutantKind::Pm10 => self.pm10,
            PollutantKind::Pm25 => self.pm25,
            PollutantKind::So2 => self.so2,
            PollutantKind::Co => self.co,
            PollutantKind::O3 => self.o3,
            PollutantKind::No2 => self.no2,
            PollutantKind::Khai => self.khai,
        }
    }
}

/// A graded measurement for one station.
///
/// Grades are computed once in [`MeasuredValue::new`] and cannot drift from
/// the values afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeasuredValue {
    measured_at: Option<NaiveDateTime>,
    pm10: Reading,
    pm25: Reading,
    so2: Reading,
    co: Reading,
    o3: Reading,
    no2: Reading,
    khai: Reading,
}

impl MeasuredValue {
    /// Grade every value against `table`.
    ///
    /// The combined grade comes from the numeric KHAI value when present,
    /// falling back to the service-reported `khai_code`.
    pub fn new(
        values: PollutantValues,
        khai_code: Option<&str>,
        measured_at: Option<NaiveDateTime>,
        table: &ThresholdTable,
    ) -> Self {
        let read = |kind: PollutantKind| {
            let value = values.get(kind);
            Reading {
                value,
                grade: classify(table, kind, value),
            }
        };

        let mut khai = read(PollutantKind::Khai);
        if khai.value.is_none() {
            khai.grade = khai_code.map(Grade::from_code).unwrap_or_default();
        }

        Self {
            measured_at,
            pm10: read(PollutantKind::Pm10),
            pm25: read(PollutantKind::Pm25),
            so2: read(PollutantKind::So2),
            co: read(PollutantKind::Co),
            o3: read(PollutantKind::O3),
            no2: read(PollutantKind::No2),
            khai,
        }
    }

    pub fn reading(&self, kind: PollutantKind) -> Reading {
        match kind {
            PollutantKind::Pm10 => self.pm10,
            PollutantKind::Pm25 => self.pm25,
            PollutantKind::So2 => self.so2,
            PollutantKind::Co => self.co,
            PollutantKind::O3 => self.o3,
            PollutantKind::No2 => self.no2,
            PollutantKind::Khai => self.khai,
        }
    }

    pub fn value(&self, kind: PollutantKind) -> Option<f64> {
        self.reading(kind).value
    }

    pub fn grade(&self, kind: PollutantKind) -> Grade {
        self.reading(kind).grade
    }

    /// Combined (KHAI) grade
    pub fn combined_grade(&self) -> Grade {
        self.khai.grade
    }

    pub fn measured_at(&self) -> Option<NaiveDateTime> {
        self.measured_at
    }
}
