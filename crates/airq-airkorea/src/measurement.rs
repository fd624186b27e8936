//! Real-time measurement records and newest-reading selection.

use std::cmp::Reverse;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::AirQualityError;
use crate::grade::ThresholdTable;
use crate::types::{MeasuredValue, MonitoringStation, PollutantValues};
use crate::wire::{parse_number, string_or_number};

const DATA_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// One time-stamped reading as the service encodes it.
///
/// Values stay string-encoded until [`MeasurementRecord::into_measured`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasurementRecord {
    pub data_time: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub pm10_value: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub pm25_value: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub so2_value: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub co_value: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub o3_value: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub no2_value: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub khai_value: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub khai_grade: Option<String>,
}

impl MeasurementRecord {
    /// Reading time. The service reports midnight as `24:00` of the
    /// previous day.
    pub fn measured_at(&self) -> Option<NaiveDateTime> {
        let raw = self.data_time.as_deref()?.trim();
        if let Ok(t) = NaiveDateTime::parse_from_str(raw, DATA_TIME_FORMAT) {
            return Some(t);
        }
        let (date, time) = raw.split_once(' ')?;
        if time.trim() != "24:00" {
            return None;
        }
        NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .ok()?
            .succ_opt()?
            .and_hms_opt(0, 0, 0)
    }

    pub fn values(&self) -> PollutantValues {
        PollutantValues {
            pm10: parse_number(self.pm10_value.as_deref()),
            pm25: parse_number(self.pm25_value.as_deref()),
            so2: parse_number(self.so2_value.as_deref()),
            co: parse_number(self.co_value.as_deref()),
            o3: parse_number(self.o3_value.as_deref()),
            no2: parse_number(self.no2_value.as_deref()),
            khai: parse_number(self.khai_value.as_deref()),
        }
    }

    pub fn into_measured(self, table: &ThresholdTable) -> MeasuredValue {
        MeasuredValue::new(
            self.values(),
            self.khai_grade.as_deref(),
            self.measured_at(),
            table,
        )
    }
}

/// Fetches the latest graded reading for a station
#[async_trait]
pub trait MeasurementFetcher: Send + Sync {
    async fn fetch_latest_measurement(
        &self,
        station: &MonitoringStation,
    ) -> Result<MeasuredValue, AirQualityError>;
}

/// Pick the newest reading by `dataTime`.
///
/// Readings without a parseable time rank after timed ones; ties keep the
/// service's order.
pub fn select_latest(records: Vec<MeasurementRecord>) -> Option<MeasurementRecord> {
    let mut records: Vec<(Option<NaiveDateTime>, MeasurementRecord)> = records
        .into_iter()
        .map(|r| (r.measured_at(), r))
        .collect();
    // Reverse(Some) sorts newest first; Reverse(None) sorts last
    records.sort_by_key(|(t, _)| Reverse(*t));
    records.into_iter().next().map(|(_, r)| r)
}
